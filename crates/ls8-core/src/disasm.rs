//! Instruction disassembly for traces and listings.

use std::fmt;

use crate::decoder::{DecodedInstruction, Decoder};
use crate::memory::Memory;
use crate::Fault;

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Address of the first byte.
    pub address: u8,
    /// Raw bytes of the instruction, opcode first.
    pub bytes: Vec<u8>,
    /// Instruction mnemonic (e.g. `"LDI"`), or `".byte"` for illegal bytes.
    pub mnemonic: String,
    /// Formatted operands (e.g. `"R0, 8"`).
    pub operands: String,
    /// Whether the row is an illegal or truncated encoding.
    pub is_illegal: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        write!(f, "{:02X}: {:<9} {}", self.address, hex.join(" "), self.mnemonic)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands)?;
        }
        if self.is_illegal {
            write!(f, " ; ILLEGAL")?;
        }
        Ok(())
    }
}

fn format_operands(instr: &DecodedInstruction) -> String {
    let register = |byte: u8| {
        if usize::from(byte) < crate::GENERAL_REGISTER_COUNT {
            format!("R{byte}")
        } else {
            format!("R?{byte:#04x}")
        }
    };

    let [a, b] = instr.operands;
    match instr.descriptor.operand_count {
        0 => String::new(),
        1 => register(a),
        _ if instr.opcode().has_immediate_operand() => format!("{}, {b}", register(a)),
        _ => format!("{}, {}", register(a), register(b)),
    }
}

/// Disassembles the instruction at `address`.
///
/// Unassigned opcodes and instructions cut off by the end of memory are
/// rendered as a single `.byte` row.
#[must_use]
pub fn disassemble_one(address: u8, memory: &Memory) -> DisassemblyRow {
    match Decoder::decode(memory, address) {
        Ok(instr) => {
            let mut bytes = vec![instr.descriptor.byte];
            bytes.extend_from_slice(instr.operand_bytes());
            DisassemblyRow {
                address,
                bytes,
                mnemonic: instr.descriptor.mnemonic().to_string(),
                operands: format_operands(&instr),
                is_illegal: false,
            }
        }
        Err(Fault::IllegalOpcode { opcode, .. } | Fault::OperandOutOfRange { opcode, .. }) => {
            illegal_row(address, opcode)
        }
        Err(_) => illegal_row(address, memory.read(address)),
    }
}

fn illegal_row(address: u8, byte: u8) -> DisassemblyRow {
    DisassemblyRow {
        address,
        bytes: vec![byte],
        mnemonic: ".byte".to_string(),
        operands: format!("{byte:#010b}"),
        is_illegal: true,
    }
}

/// Disassembles up to `count` consecutive instructions starting at `start`.
///
/// Stops early at the end of memory.
#[must_use]
pub fn disassemble(memory: &Memory, start: u8, count: usize) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(count);
    let mut address = usize::from(start);

    while rows.len() < count {
        let Ok(pc) = u8::try_from(address) else {
            break;
        };
        let row = disassemble_one(pc, memory);
        address += row.bytes.len();
        rows.push(row);
    }

    rows
}
