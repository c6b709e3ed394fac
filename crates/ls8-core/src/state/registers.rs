/// Number of general-purpose registers (`R0..R7`).
pub const GENERAL_REGISTER_COUNT: usize = 8;
/// Power-on value of the stack pointer (`R7`).
pub const DEFAULT_STACK_POINTER: u8 = 0xF4;
/// `FL` bit: operands compared equal.
pub const FLAG_E: u8 = 1 << 0;
/// `FL` bit: first operand greater than second.
pub const FLAG_G: u8 = 1 << 1;
/// `FL` bit: first operand less than second.
pub const FLAG_L: u8 = 1 << 2;
/// Mask of the `FL` bits written by `CMP`.
pub const FLAGS_COMPARE_MASK: u8 = FLAG_E | FLAG_G | FLAG_L;

/// General-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl GeneralRegister {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// `R7` doubles as the stack pointer.
    pub const SP: Self = Self::R7;

    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes an operand byte into a register.
    ///
    /// `None` means the byte does not name a register.
    #[must_use]
    pub const fn from_u8(operand: u8) -> Option<Self> {
        match operand {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }
}

/// Register file: `R0..R7` plus the `PC` and `FL` special registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    gpr: [u8; GENERAL_REGISTER_COUNT],
    pc: u8,
    fl: u8,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::with_stack_pointer(DEFAULT_STACK_POINTER)
    }
}

impl RegisterFile {
    /// Power-on register file with `SP` set to `stack_pointer`.
    #[must_use]
    pub const fn with_stack_pointer(stack_pointer: u8) -> Self {
        let mut gpr = [0; GENERAL_REGISTER_COUNT];
        gpr[GeneralRegister::SP.index()] = stack_pointer;
        Self { gpr, pc: 0, fl: 0 }
    }

    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> u8 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: GeneralRegister, value: u8) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the stack pointer (`R7`).
    #[must_use]
    pub const fn sp(&self) -> u8 {
        self.gpr(GeneralRegister::SP)
    }

    /// Writes the stack pointer (`R7`).
    pub const fn set_sp(&mut self, value: u8) {
        self.set_gpr(GeneralRegister::SP, value);
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u8 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u8) {
        self.pc = value;
    }

    /// Reads the `FL` register.
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.fl
    }

    /// Writes the `FL` register.
    ///
    /// Bits outside `L`, `G` and `E` are kept as written so that `IRET`
    /// restores exactly what was pushed.
    pub const fn set_flags(&mut self, value: u8) {
        self.fl = value;
    }

    /// Returns `true` when a specific `FL` bit is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u8) -> bool {
        (self.fl & flag) != 0
    }
}
