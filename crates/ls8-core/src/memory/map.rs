/// Number of entries in the interrupt vector table.
pub const INTERRUPT_VECTOR_COUNT: u8 = 8;

/// Default address of the interrupt vector table (`0xF8..=0xFF`).
pub const DEFAULT_INTERRUPT_VECTOR_BASE: u8 = 0xF8;

/// Address of the vector entry for interrupt `number`.
///
/// Returns `None` when `number` is outside the vector table.
#[must_use]
pub const fn interrupt_vector_address(base: u8, number: u8) -> Option<u8> {
    if number < INTERRUPT_VECTOR_COUNT {
        Some(base.wrapping_add(number))
    } else {
        None
    }
}
