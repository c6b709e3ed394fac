//! Opcode table and bit-field descriptors.
//!
//! Every opcode byte carries its own shape:
//!
//! | Bits | Meaning                                   |
//! |------|-------------------------------------------|
//! | 7-6  | operand bytes following the opcode (0..2) |
//! | 5    | handled by the ALU                        |
//! | 4    | instruction sets flags                    |
//! | 3-0  | identifier within its class               |

/// Shift that moves the operand-count field to the low bits.
pub const OPERAND_COUNT_SHIFT: u8 = 6;
/// Opcode bit marking ALU instructions.
pub const ALU_BIT: u8 = 1 << 5;
/// Opcode bit marking instructions that set flags.
pub const SETS_FLAGS_BIT: u8 = 1 << 4;
/// Mask of the identifier field.
pub const IDENTIFIER_MASK: u8 = 0x0F;

/// Instruction identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Opcode {
    Add,
    And,
    Call,
    Cmp,
    Dec,
    Div,
    Hlt,
    Inc,
    Int,
    Iret,
    Jeq,
    Jgt,
    Jlt,
    Jmp,
    Jne,
    Ld,
    Ldi,
    Mod,
    Mul,
    Nop,
    Not,
    Or,
    Pop,
    Pra,
    Prn,
    Push,
    Ret,
    St,
    Sub,
    Xor,
}

/// Every assigned instruction. Any byte not produced by one of these is illegal.
pub const OPCODE_TABLE: [Opcode; 30] = [
    Opcode::Add,
    Opcode::And,
    Opcode::Call,
    Opcode::Cmp,
    Opcode::Dec,
    Opcode::Div,
    Opcode::Hlt,
    Opcode::Inc,
    Opcode::Int,
    Opcode::Iret,
    Opcode::Jeq,
    Opcode::Jgt,
    Opcode::Jlt,
    Opcode::Jmp,
    Opcode::Jne,
    Opcode::Ld,
    Opcode::Ldi,
    Opcode::Mod,
    Opcode::Mul,
    Opcode::Nop,
    Opcode::Not,
    Opcode::Or,
    Opcode::Pop,
    Opcode::Pra,
    Opcode::Prn,
    Opcode::Push,
    Opcode::Ret,
    Opcode::St,
    Opcode::Sub,
    Opcode::Xor,
];

impl Opcode {
    /// Encoded opcode byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Add => 0b1010_1000,
            Self::And => 0b1011_0011,
            Self::Call => 0b0100_1000,
            Self::Cmp => 0b1010_0000,
            Self::Dec => 0b0111_1001,
            Self::Div => 0b1010_1011,
            Self::Hlt => 0b0000_0001,
            Self::Inc => 0b0111_1000,
            Self::Int => 0b0100_1010,
            Self::Iret => 0b0000_1011,
            Self::Jeq => 0b0101_0001,
            Self::Jgt => 0b0101_0100,
            Self::Jlt => 0b0101_0011,
            Self::Jmp => 0b0101_0000,
            Self::Jne => 0b0101_0010,
            Self::Ld => 0b1001_1000,
            Self::Ldi => 0b1001_1001,
            Self::Mod => 0b1010_1100,
            Self::Mul => 0b1010_1010,
            Self::Nop => 0b0000_0000,
            Self::Not => 0b0111_0000,
            Self::Or => 0b1011_0001,
            Self::Pop => 0b0100_1100,
            Self::Pra => 0b0100_0010,
            Self::Prn => 0b0100_0011,
            Self::Push => 0b0100_1101,
            Self::Ret => 0b0000_1001,
            Self::St => 0b1001_1010,
            Self::Sub => 0b1010_1001,
            Self::Xor => 0b1011_0010,
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::And => "AND",
            Self::Call => "CALL",
            Self::Cmp => "CMP",
            Self::Dec => "DEC",
            Self::Div => "DIV",
            Self::Hlt => "HLT",
            Self::Inc => "INC",
            Self::Int => "INT",
            Self::Iret => "IRET",
            Self::Jeq => "JEQ",
            Self::Jgt => "JGT",
            Self::Jlt => "JLT",
            Self::Jmp => "JMP",
            Self::Jne => "JNE",
            Self::Ld => "LD",
            Self::Ldi => "LDI",
            Self::Mod => "MOD",
            Self::Mul => "MUL",
            Self::Nop => "NOP",
            Self::Not => "NOT",
            Self::Or => "OR",
            Self::Pop => "POP",
            Self::Pra => "PRA",
            Self::Prn => "PRN",
            Self::Push => "PUSH",
            Self::Ret => "RET",
            Self::St => "ST",
            Self::Sub => "SUB",
            Self::Xor => "XOR",
        }
    }

    /// Returns `true` for instructions that may assign `PC` themselves.
    #[must_use]
    pub const fn is_control_transfer(self) -> bool {
        matches!(
            self,
            Self::Call
                | Self::Ret
                | Self::Int
                | Self::Iret
                | Self::Jmp
                | Self::Jeq
                | Self::Jne
                | Self::Jgt
                | Self::Jlt
        )
    }

    /// Returns `true` when the second operand byte is an immediate value
    /// rather than a register index.
    #[must_use]
    pub const fn has_immediate_operand(self) -> bool {
        matches!(self, Self::Ldi)
    }
}

/// Immutable shape of one opcode, derived from its bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeDescriptor {
    /// Instruction identity.
    pub opcode: Opcode,
    /// Encoded opcode byte.
    pub byte: u8,
    /// Operand bytes following the opcode (bits 7-6).
    pub operand_count: u8,
    /// Handled by the ALU (bit 5).
    pub is_alu: bool,
    /// Sets flags (bit 4).
    pub sets_flags: bool,
    /// Identifier within the class (bits 3-0).
    pub identifier: u8,
}

impl OpcodeDescriptor {
    /// Builds the descriptor for an opcode from its encoded byte.
    #[must_use]
    pub const fn new(opcode: Opcode) -> Self {
        let byte = opcode.byte();
        Self {
            opcode,
            byte,
            operand_count: byte >> OPERAND_COUNT_SHIFT,
            is_alu: (byte & ALU_BIT) != 0,
            sets_flags: (byte & SETS_FLAGS_BIT) != 0,
            identifier: byte & IDENTIFIER_MASK,
        }
    }

    /// Total encoded length in bytes, opcode included.
    #[must_use]
    pub const fn encoded_len(self) -> u8 {
        self.operand_count + 1
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        self.opcode.mnemonic()
    }
}

const DESCRIPTORS: [Option<OpcodeDescriptor>; 256] = build_descriptor_table();

const fn build_descriptor_table() -> [Option<OpcodeDescriptor>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < OPCODE_TABLE.len() {
        let opcode = OPCODE_TABLE[i];
        table[opcode.byte() as usize] = Some(OpcodeDescriptor::new(opcode));
        i += 1;
    }
    table
}

/// Looks up the descriptor for an opcode byte.
///
/// `None` means the byte is not an assigned instruction.
#[must_use]
pub const fn classify(byte: u8) -> Option<OpcodeDescriptor> {
    DESCRIPTORS[byte as usize]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{classify, Opcode, OPCODE_TABLE};

    #[test]
    fn table_contains_unique_bytes_and_mnemonics() {
        let bytes: HashSet<_> = OPCODE_TABLE.iter().map(|op| op.byte()).collect();
        let names: HashSet<_> = OPCODE_TABLE.iter().map(|op| op.mnemonic()).collect();
        assert_eq!(bytes.len(), OPCODE_TABLE.len());
        assert_eq!(names.len(), OPCODE_TABLE.len());
    }

    #[test]
    fn every_table_entry_resolves_via_lookup() {
        for opcode in OPCODE_TABLE {
            let descriptor = classify(opcode.byte()).expect("assigned opcode");
            assert_eq!(descriptor.opcode, opcode);
            assert_eq!(descriptor.byte, opcode.byte());
        }
    }

    #[test]
    fn unassigned_bytes_do_not_classify() {
        let assigned: HashSet<_> = OPCODE_TABLE.iter().map(|op| op.byte()).collect();
        for byte in 0_u8..=u8::MAX {
            assert_eq!(classify(byte).is_some(), assigned.contains(&byte));
        }
        assert!(classify(0xFF).is_none());
    }

    #[test]
    fn descriptor_fields_follow_bit_layout() {
        let add = classify(0b1010_1000).expect("ADD");
        assert_eq!(add.opcode, Opcode::Add);
        assert_eq!(add.operand_count, 2);
        assert!(add.is_alu);
        assert!(!add.sets_flags);
        assert_eq!(add.identifier, 0b1000);
        assert_eq!(add.encoded_len(), 3);

        let inc = classify(0b0111_1000).expect("INC");
        assert_eq!(inc.operand_count, 1);
        assert!(inc.is_alu);
        assert!(inc.sets_flags);

        let hlt = classify(0b0000_0001).expect("HLT");
        assert_eq!(hlt.operand_count, 0);
        assert!(!hlt.is_alu);
        assert_eq!(hlt.encoded_len(), 1);
    }

    #[test]
    fn alu_bit_marks_exactly_the_arithmetic_logic_set() {
        let alu: HashSet<_> = OPCODE_TABLE
            .iter()
            .filter(|op| classify(op.byte()).is_some_and(|d| d.is_alu))
            .map(|op| op.mnemonic())
            .collect();
        let expected: HashSet<_> = [
            "ADD", "SUB", "MUL", "DIV", "MOD", "INC", "DEC", "CMP", "AND", "OR", "XOR", "NOT",
        ]
        .into_iter()
        .collect();
        assert_eq!(alu, expected);
    }

    #[test]
    fn no_assigned_opcode_claims_three_operands() {
        for opcode in OPCODE_TABLE {
            assert!(opcode.byte() >> 6 <= 2, "{}", opcode.mnemonic());
        }
    }
}
