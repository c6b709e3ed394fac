//! Architectural CPU state model primitives.

/// Register file types and storage model.
pub mod registers;
/// Running/halted/faulted state machine.
pub mod run_state;

pub use registers::{
    GeneralRegister, RegisterFile, DEFAULT_STACK_POINTER, FLAGS_COMPARE_MASK, FLAG_E, FLAG_G,
    FLAG_L, GENERAL_REGISTER_COUNT,
};
pub use run_state::RunState;
