//! Core fetch-decode-execute engine for the LS-8 8-bit machine.

/// Flat 256-byte memory image and fixed address map.
pub mod memory;
pub use memory::{
    interrupt_vector_address, Memory, MemoryError, DEFAULT_INTERRUPT_VECTOR_BASE,
    INTERRUPT_VECTOR_COUNT, MEMORY_BYTES,
};

/// Architectural register file and run-state model.
pub mod state;
pub use state::{
    GeneralRegister, RegisterFile, RunState, DEFAULT_STACK_POINTER, FLAGS_COMPARE_MASK, FLAG_E,
    FLAG_G, FLAG_L, GENERAL_REGISTER_COUNT,
};

/// Fault taxonomy for decode, addressing and numeric failures.
pub mod fault;
pub use fault::{Fault, FaultClass, FaultCode};

/// Opcode table and bit-field descriptors.
pub mod encoding;
pub use encoding::{
    classify, Opcode, OpcodeDescriptor, ALU_BIT, IDENTIFIER_MASK, OPCODE_TABLE,
    OPERAND_COUNT_SHIFT, SETS_FLAGS_BIT,
};

/// Instruction fetch and operand extraction.
pub mod decoder;
pub use decoder::{DecodedInstruction, Decoder};

/// Pure arithmetic/logic unit.
pub mod alu;
pub use alu::{AluError, AluOp, AluOutput};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CaptureOutput, CoreConfig, CoreSnapshot, CoreState, OutputDevice, RunOutcome, RunStop,
    SnapshotVersion, StepOutcome,
};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, run, step_one, ExecuteState, OutputEvent,
    INTERRUPT_SAVED_REGISTERS,
};

/// Memory disassembly for traces and listings.
pub mod disasm;
pub use disasm::{disassemble, disassemble_one, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use serde_json as _;
