//! Operand helpers shared by the instruction handlers.

use crate::decoder::DecodedInstruction;
use crate::state::GeneralRegister;
use crate::Fault;

/// Registers saved by `INT` and restored by `IRET`, in push order.
pub const INTERRUPT_SAVED_REGISTERS: [GeneralRegister; 7] = [
    GeneralRegister::R0,
    GeneralRegister::R1,
    GeneralRegister::R2,
    GeneralRegister::R3,
    GeneralRegister::R4,
    GeneralRegister::R5,
    GeneralRegister::R6,
];

/// Interprets an operand byte of `instr` as a register index.
///
/// # Errors
///
/// Returns [`Fault::RegisterOutOfRange`] when `operand` is not `0..=7`.
pub const fn register_operand(
    instr: &DecodedInstruction,
    operand: u8,
) -> Result<GeneralRegister, Fault> {
    match GeneralRegister::from_u8(operand) {
        Some(reg) => Ok(reg),
        None => Err(Fault::RegisterOutOfRange {
            pc: instr.pc,
            opcode: instr.descriptor.byte,
            index: operand,
        }),
    }
}

/// Decode fault for `instr`, used when an opcode reaches a handler that
/// does not implement it.
pub const fn illegal_opcode(instr: &DecodedInstruction) -> Fault {
    Fault::IllegalOpcode {
        pc: instr.pc,
        opcode: instr.descriptor.byte,
    }
}
