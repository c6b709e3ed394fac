use thiserror::Error;

/// Fault classes used to group faults for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Opcode byte matched no instruction.
    Decode,
    /// Memory address or register index outside its valid range.
    Addressing,
    /// Arithmetic that has no defined result.
    Numeric,
}

/// Stable fault codes with a one-byte wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Opcode byte is not in the instruction table.
    #[error("illegal opcode")]
    IllegalOpcode = 0x01,
    /// Operand fetch ran past the last memory address.
    #[error("operand fetch past end of memory")]
    OperandOutOfRange = 0x02,
    /// Operand named a register outside `R0..R7`.
    #[error("register index out of range")]
    RegisterOutOfRange = 0x03,
    /// `INT` named an interrupt outside the vector table.
    #[error("interrupt number out of range")]
    InterruptOutOfRange = 0x04,
    /// `DIV` or `MOD` with a zero divisor.
    #[error("division by zero")]
    DivideByZero = 0x05,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::IllegalOpcode),
            0x02 => Some(Self::OperandOutOfRange),
            0x03 => Some(Self::RegisterOutOfRange),
            0x04 => Some(Self::InterruptOutOfRange),
            0x05 => Some(Self::DivideByZero),
            _ => None,
        }
    }

    /// Returns the reporting class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::IllegalOpcode => FaultClass::Decode,
            Self::OperandOutOfRange | Self::RegisterOutOfRange | Self::InterruptOutOfRange => {
                FaultClass::Addressing
            }
            Self::DivideByZero => FaultClass::Numeric,
        }
    }
}

/// A fatal fault together with the instruction that raised it.
///
/// Every variant records the address (`pc`) and opcode byte of the faulting
/// instruction. Addressing faults also carry the offending address or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// Opcode byte matched no instruction.
    #[error("illegal opcode {opcode:#010b} at address {pc:#04x}")]
    IllegalOpcode {
        /// Address of the opcode byte.
        pc: u8,
        /// The unrecognised byte.
        opcode: u8,
    },
    /// Operand fetch ran past the last memory address.
    #[error("operand fetch at address {address:#05x} runs past end of memory ({opcode:#010b} at {pc:#04x})")]
    OperandOutOfRange {
        /// Address of the opcode byte.
        pc: u8,
        /// Opcode byte of the instruction.
        opcode: u8,
        /// First address that could not be read.
        address: u16,
    },
    /// Operand named a register outside `R0..R7`.
    #[error("register index {index} out of range ({opcode:#010b} at {pc:#04x})")]
    RegisterOutOfRange {
        /// Address of the opcode byte.
        pc: u8,
        /// Opcode byte of the instruction.
        opcode: u8,
        /// The operand byte used as a register index.
        index: u8,
    },
    /// `INT` named an interrupt outside the vector table.
    #[error("interrupt number {number} out of range ({opcode:#010b} at {pc:#04x})")]
    InterruptOutOfRange {
        /// Address of the opcode byte.
        pc: u8,
        /// Opcode byte of the instruction.
        opcode: u8,
        /// Interrupt number taken from the operand register.
        number: u8,
    },
    /// `DIV` or `MOD` with a zero divisor.
    #[error("division by zero ({opcode:#010b} at {pc:#04x})")]
    DivideByZero {
        /// Address of the opcode byte.
        pc: u8,
        /// Opcode byte of the instruction.
        opcode: u8,
    },
}

impl Fault {
    /// Returns the stable fault code for this fault.
    #[must_use]
    pub const fn code(self) -> FaultCode {
        match self {
            Self::IllegalOpcode { .. } => FaultCode::IllegalOpcode,
            Self::OperandOutOfRange { .. } => FaultCode::OperandOutOfRange,
            Self::RegisterOutOfRange { .. } => FaultCode::RegisterOutOfRange,
            Self::InterruptOutOfRange { .. } => FaultCode::InterruptOutOfRange,
            Self::DivideByZero { .. } => FaultCode::DivideByZero,
        }
    }

    /// Returns the reporting class for this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        self.code().class()
    }

    /// Address of the instruction that raised the fault.
    #[must_use]
    pub const fn pc(self) -> u8 {
        match self {
            Self::IllegalOpcode { pc, .. }
            | Self::OperandOutOfRange { pc, .. }
            | Self::RegisterOutOfRange { pc, .. }
            | Self::InterruptOutOfRange { pc, .. }
            | Self::DivideByZero { pc, .. } => pc,
        }
    }

    /// Opcode byte of the instruction that raised the fault.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::IllegalOpcode { opcode, .. }
            | Self::OperandOutOfRange { opcode, .. }
            | Self::RegisterOutOfRange { opcode, .. }
            | Self::InterruptOutOfRange { opcode, .. }
            | Self::DivideByZero { opcode, .. } => opcode,
        }
    }
}
