//! Instruction execution pipeline.
//!
//! Execution runs in two phases:
//! 1. [`execute_instruction`] reads operands and computes every side effect
//!    of one instruction into an [`ExecuteState`], leaving the machine
//!    untouched.
//! 2. [`commit_execution`] applies the staged registers, memory writes and
//!    output.
//!
//! A faulting instruction never reaches the commit phase, so faults leave
//! memory, registers, `FL` and `PC` exactly as they were.

mod helpers;

pub use helpers::INTERRUPT_SAVED_REGISTERS;

use helpers::{illegal_opcode, register_operand};

use crate::alu::{self, AluError, AluOp, AluOutput};
use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::Opcode;
use crate::memory::{interrupt_vector_address, Memory};
use crate::state::{RegisterFile, RunState, FLAG_E, FLAG_G, FLAG_L};
use crate::{CoreConfig, CoreState, Fault, OutputDevice, RunOutcome, RunStop, StepOutcome};

/// Output staged by `PRN` or `PRA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    /// Decimal rendering of a register value.
    Decimal(u8),
    /// Character rendering of a register value.
    Char(u8),
}

/// Side effects of one instruction, staged until commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteState {
    /// Register file as it will be after the instruction, `PC` included.
    pub registers: RegisterFile,
    /// Memory writes in program order as `(address, value)`.
    pub memory_writes: Vec<(u8, u8)>,
    /// `PC` assigned by a control transfer; `None` falls through.
    pub jump_target: Option<u8>,
    /// Output to emit on commit.
    pub output: Option<OutputEvent>,
    /// Whether the machine halts after this instruction.
    pub halt: bool,
}

impl ExecuteState {
    /// Starts staging from the current register file.
    #[must_use]
    pub const fn new(registers: RegisterFile) -> Self {
        Self {
            registers,
            memory_writes: Vec::new(),
            jump_target: None,
            output: None,
            halt: false,
        }
    }

    /// Reads memory as seen by this instruction, staged writes included.
    #[must_use]
    pub fn read(&self, memory: &Memory, address: u8) -> u8 {
        self.memory_writes
            .iter()
            .rev()
            .find(|(staged, _)| *staged == address)
            .map_or_else(|| memory.read(address), |(_, value)| *value)
    }

    /// Stages a memory write.
    pub fn write(&mut self, address: u8, value: u8) {
        self.memory_writes.push((address, value));
    }

    /// Decrements `SP` and stages `value` at the new top of stack.
    pub fn push(&mut self, value: u8) {
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        self.write(sp, value);
    }

    /// Reads the top of stack and increments `SP`.
    pub fn pop(&mut self, memory: &Memory) -> u8 {
        let sp = self.registers.sp();
        let value = self.read(memory, sp);
        self.registers.set_sp(sp.wrapping_add(1));
        value
    }
}

/// Computes the side effects of one decoded instruction.
///
/// `PC` in the returned register file is already advanced: to the jump
/// target when the instruction assigned one, otherwise past the instruction
/// by `operand_count + 1` bytes.
///
/// # Errors
///
/// Returns the [`Fault`] raised by the instruction. No state has been
/// modified in that case.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    state: &CoreState,
    config: &CoreConfig,
) -> Result<ExecuteState, Fault> {
    let mut exec = ExecuteState::new(state.registers);

    if instr.descriptor.is_alu {
        execute_alu(instr, &mut exec)?;
    } else {
        execute_direct(instr, &state.memory, config, &mut exec)?;
    }

    let next_pc = exec.jump_target.unwrap_or_else(|| instr.next_pc());
    exec.registers.set_pc(next_pc);

    Ok(exec)
}

/// Applies staged side effects to the machine and emits staged output.
pub fn commit_execution(state: &mut CoreState, exec: &ExecuteState, output: &mut dyn OutputDevice) {
    state.registers = exec.registers;

    for (address, value) in &exec.memory_writes {
        state.memory.write(*address, *value);
    }

    match exec.output {
        Some(OutputEvent::Decimal(value)) => output.write_decimal(value),
        Some(OutputEvent::Char(value)) => output.write_char(value),
        None => {}
    }

    if exec.halt {
        state.run_state = RunState::Halted;
    }
}

fn execute_alu(instr: &DecodedInstruction, exec: &mut ExecuteState) -> Result<(), Fault> {
    let op = AluOp::from_opcode(instr.opcode()).ok_or_else(|| illegal_opcode(instr))?;

    let dest = register_operand(instr, instr.operand_a())?;
    let src = if op.is_unary() {
        0
    } else {
        exec.registers
            .gpr(register_operand(instr, instr.operand_b())?)
    };

    match alu::apply(op, exec.registers.gpr(dest), src) {
        Ok(AluOutput::Register(value)) => exec.registers.set_gpr(dest, value),
        Ok(AluOutput::Flags(flags)) => exec.registers.set_flags(flags),
        Err(AluError::DivideByZero) => {
            return Err(Fault::DivideByZero {
                pc: instr.pc,
                opcode: instr.descriptor.byte,
            })
        }
    }

    Ok(())
}

fn execute_direct(
    instr: &DecodedInstruction,
    memory: &Memory,
    config: &CoreConfig,
    exec: &mut ExecuteState,
) -> Result<(), Fault> {
    match instr.opcode() {
        Opcode::Nop => {}
        Opcode::Hlt => exec.halt = true,
        Opcode::Ldi => {
            let dest = register_operand(instr, instr.operand_a())?;
            exec.registers.set_gpr(dest, instr.operand_b());
        }
        Opcode::Ld => {
            let dest = register_operand(instr, instr.operand_a())?;
            let addr = register_operand(instr, instr.operand_b())?;
            let address = exec.registers.gpr(addr);
            let value = exec.read(memory, address);
            exec.registers.set_gpr(dest, value);
        }
        Opcode::St => {
            let addr = register_operand(instr, instr.operand_a())?;
            let src = register_operand(instr, instr.operand_b())?;
            let (address, value) = (exec.registers.gpr(addr), exec.registers.gpr(src));
            exec.write(address, value);
        }
        Opcode::Prn => {
            let src = register_operand(instr, instr.operand_a())?;
            exec.output = Some(OutputEvent::Decimal(exec.registers.gpr(src)));
        }
        Opcode::Pra => {
            let src = register_operand(instr, instr.operand_a())?;
            exec.output = Some(OutputEvent::Char(exec.registers.gpr(src)));
        }
        Opcode::Push => {
            let src = register_operand(instr, instr.operand_a())?;
            let value = exec.registers.gpr(src);
            exec.push(value);
        }
        Opcode::Pop => {
            let dest = register_operand(instr, instr.operand_a())?;
            let value = exec.pop(memory);
            exec.registers.set_gpr(dest, value);
        }
        Opcode::Call => {
            let target = register_operand(instr, instr.operand_a())?;
            let target = exec.registers.gpr(target);
            exec.push(instr.next_pc());
            exec.jump_target = Some(target);
        }
        Opcode::Ret => {
            exec.jump_target = Some(exec.pop(memory));
        }
        Opcode::Int => execute_int(instr, memory, config, exec)?,
        Opcode::Iret => {
            for reg in INTERRUPT_SAVED_REGISTERS.iter().rev() {
                let value = exec.pop(memory);
                exec.registers.set_gpr(*reg, value);
            }
            let flags = exec.pop(memory);
            exec.registers.set_flags(flags);
            exec.jump_target = Some(exec.pop(memory));
        }
        Opcode::Jmp | Opcode::Jeq | Opcode::Jne | Opcode::Jgt | Opcode::Jlt => {
            let target = register_operand(instr, instr.operand_a())?;
            if jump_taken(instr.opcode(), &exec.registers) {
                exec.jump_target = Some(exec.registers.gpr(target));
            }
        }
        // ALU class; routed by the descriptor's ALU bit before this match.
        Opcode::Add
        | Opcode::Sub
        | Opcode::Mul
        | Opcode::Div
        | Opcode::Mod
        | Opcode::Inc
        | Opcode::Dec
        | Opcode::Cmp
        | Opcode::And
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Not => return Err(illegal_opcode(instr)),
    }

    Ok(())
}

fn execute_int(
    instr: &DecodedInstruction,
    memory: &Memory,
    config: &CoreConfig,
    exec: &mut ExecuteState,
) -> Result<(), Fault> {
    let src = register_operand(instr, instr.operand_a())?;
    let number = exec.registers.gpr(src);
    let vector = interrupt_vector_address(config.interrupt_vector_base, number).ok_or(
        Fault::InterruptOutOfRange {
            pc: instr.pc,
            opcode: instr.descriptor.byte,
            number,
        },
    )?;
    let handler = exec.read(memory, vector);

    exec.push(instr.next_pc());
    let flags = exec.registers.flags();
    exec.push(flags);
    for reg in INTERRUPT_SAVED_REGISTERS {
        let value = exec.registers.gpr(reg);
        exec.push(value);
    }

    exec.jump_target = Some(handler);
    Ok(())
}

/// Whether a jump opcode transfers control given the current flags.
const fn jump_taken(opcode: Opcode, registers: &RegisterFile) -> bool {
    match opcode {
        Opcode::Jeq => registers.flag_is_set(FLAG_E),
        Opcode::Jne => !registers.flag_is_set(FLAG_E),
        Opcode::Jgt => registers.flag_is_set(FLAG_G),
        Opcode::Jlt => registers.flag_is_set(FLAG_L),
        _ => true, // JMP
    }
}

fn latch_fault(state: &mut CoreState, fault: Fault) -> StepOutcome {
    log::warn!("fault latched: {fault}");
    state.run_state = RunState::Faulted(fault);
    StepOutcome::Fault(fault)
}

/// Executes exactly one instruction.
///
/// A halted or faulted machine does not execute; the terminal outcome is
/// reported again.
pub fn step_one(
    state: &mut CoreState,
    output: &mut dyn OutputDevice,
    config: &CoreConfig,
) -> StepOutcome {
    match state.run_state {
        RunState::Running => {}
        RunState::Halted => return StepOutcome::Halted,
        RunState::Faulted(fault) => return StepOutcome::Fault(fault),
    }

    let pc = state.registers.pc();
    let instr = match Decoder::decode(&state.memory, pc) {
        Ok(instr) => instr,
        Err(fault) => return latch_fault(state, fault),
    };

    let exec = match execute_instruction(&instr, state, config) {
        Ok(exec) => exec,
        Err(fault) => return latch_fault(state, fault),
    };

    log::trace!(
        "{pc:#04x}: {} {:?}",
        instr.descriptor.mnemonic(),
        instr.operand_bytes()
    );
    commit_execution(state, &exec, output);

    if exec.halt {
        log::debug!("halted at {pc:#04x}");
        StepOutcome::Halted
    } else {
        StepOutcome::Retired {
            pc,
            opcode: instr.opcode(),
        }
    }
}

/// Steps until the machine halts, faults, or reaches
/// [`CoreConfig::step_limit`].
pub fn run(
    state: &mut CoreState,
    output: &mut dyn OutputDevice,
    config: &CoreConfig,
) -> RunOutcome {
    let mut steps = 0_u64;

    loop {
        match state.run_state {
            RunState::Running => {}
            RunState::Halted => {
                return RunOutcome {
                    steps,
                    stop: RunStop::Halted,
                }
            }
            RunState::Faulted(fault) => {
                return RunOutcome {
                    steps,
                    stop: RunStop::Fault(fault),
                }
            }
        }

        if config.step_limit.is_some_and(|limit| steps >= limit) {
            return RunOutcome {
                steps,
                stop: RunStop::StepLimit,
            };
        }

        if let StepOutcome::Retired { .. } | StepOutcome::Halted = step_one(state, output, config) {
            steps += 1;
        }
    }
}
