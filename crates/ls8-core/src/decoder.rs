//! Instruction fetch and decode.
//!
//! The decoder reads the opcode at `PC`, classifies it against the opcode
//! table and then reads exactly as many operand bytes as the opcode's
//! operand-count field announces.

use crate::encoding::{classify, Opcode, OpcodeDescriptor};
use crate::memory::Memory;
use crate::Fault;

/// One fetched instruction: opcode descriptor plus its raw operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Address of the opcode byte.
    pub pc: u8,
    /// Shape and identity of the opcode.
    pub descriptor: OpcodeDescriptor,
    /// Operand bytes in fetch order; unused slots are zero.
    pub operands: [u8; 2],
}

impl DecodedInstruction {
    /// Instruction identity.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.descriptor.opcode
    }

    /// First operand byte.
    #[must_use]
    pub const fn operand_a(&self) -> u8 {
        self.operands[0]
    }

    /// Second operand byte.
    #[must_use]
    pub const fn operand_b(&self) -> u8 {
        self.operands[1]
    }

    /// Operand bytes actually encoded by this instruction.
    #[must_use]
    pub fn operand_bytes(&self) -> &[u8] {
        &self.operands[..usize::from(self.descriptor.operand_count)]
    }

    /// Address of the instruction that follows this one.
    #[must_use]
    pub const fn next_pc(&self) -> u8 {
        self.pc.wrapping_add(self.descriptor.encoded_len())
    }
}

/// Instruction decoder.
pub struct Decoder;

impl Decoder {
    /// Fetches and decodes the instruction at `pc`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::IllegalOpcode`] when the byte at `pc` is not an
    /// assigned instruction, and [`Fault::OperandOutOfRange`] when an operand
    /// byte would be read past the end of memory.
    pub fn decode(memory: &Memory, pc: u8) -> Result<DecodedInstruction, Fault> {
        let opcode = memory.read(pc);
        let descriptor = classify(opcode).ok_or(Fault::IllegalOpcode { pc, opcode })?;

        let mut operands = [0; 2];
        for (offset, slot) in (1_u16..)
            .zip(operands.iter_mut())
            .take(usize::from(descriptor.operand_count))
        {
            let address = u16::from(pc) + offset;
            *slot = memory.fetch(address).ok_or(Fault::OperandOutOfRange {
                pc,
                opcode,
                address,
            })?;
        }

        Ok(DecodedInstruction {
            pc,
            descriptor,
            operands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::encoding::Opcode;
    use crate::memory::Memory;
    use crate::Fault;

    fn memory_with(at: u8, bytes: &[u8]) -> Memory {
        let mut memory = Memory::default();
        let mut address = at;
        for byte in bytes {
            memory.write(address, *byte);
            address = address.wrapping_add(1);
        }
        memory
    }

    #[test]
    fn decode_two_operand_instruction() {
        let memory = memory_with(0, &[Opcode::Ldi.byte(), 3, 42]);
        let instr = Decoder::decode(&memory, 0).expect("LDI decodes");

        assert_eq!(instr.opcode(), Opcode::Ldi);
        assert_eq!(instr.operand_a(), 3);
        assert_eq!(instr.operand_b(), 42);
        assert_eq!(instr.operand_bytes(), &[3, 42]);
        assert_eq!(instr.next_pc(), 3);
    }

    #[test]
    fn decode_reads_only_announced_operands() {
        let memory = memory_with(0x10, &[Opcode::Prn.byte(), 1, 0x99]);
        let instr = Decoder::decode(&memory, 0x10).expect("PRN decodes");

        assert_eq!(instr.operands, [1, 0]);
        assert_eq!(instr.operand_bytes(), &[1]);
        assert_eq!(instr.next_pc(), 0x12);
    }

    #[test]
    fn unknown_opcode_is_decode_fault_with_location() {
        let memory = memory_with(0x20, &[0xFF]);
        assert_eq!(
            Decoder::decode(&memory, 0x20),
            Err(Fault::IllegalOpcode {
                pc: 0x20,
                opcode: 0xFF
            })
        );
    }

    #[test]
    fn operand_read_past_end_of_memory_faults() {
        let memory = memory_with(0xFE, &[Opcode::Ldi.byte(), 0]);
        assert_eq!(
            Decoder::decode(&memory, 0xFE),
            Err(Fault::OperandOutOfRange {
                pc: 0xFE,
                opcode: Opcode::Ldi.byte(),
                address: 0x100
            })
        );
    }

    #[test]
    fn zero_operand_instruction_at_last_address_decodes() {
        let memory = memory_with(0xFF, &[Opcode::Hlt.byte()]);
        let instr = Decoder::decode(&memory, 0xFF).expect("HLT decodes");
        assert_eq!(instr.opcode(), Opcode::Hlt);
        assert_eq!(instr.next_pc(), 0x00);
    }
}
