//! Public host-facing API contracts for embedding the emulator core.

use crate::encoding::Opcode;
use crate::memory::{Memory, MemoryError, DEFAULT_INTERRUPT_VECTOR_BASE};
use crate::state::{RegisterFile, RunState, DEFAULT_STACK_POINTER};
use crate::Fault;

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Value loaded into `SP` at power-on and reset.
    pub initial_stack_pointer: u8,
    /// Address of the eight-entry interrupt vector table.
    pub interrupt_vector_base: u8,
    /// Upper bound on instructions executed by one [`crate::run`] call.
    pub step_limit: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            initial_stack_pointer: DEFAULT_STACK_POINTER,
            interrupt_vector_base: DEFAULT_INTERRUPT_VECTOR_BASE,
            step_limit: None,
        }
    }
}

/// Complete machine state: registers, memory and run state.
///
/// Each instance owns all of its state, so independent machines can run side
/// by side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Register file including `PC` and `FL`.
    pub registers: RegisterFile,
    /// Flat 256-byte memory image.
    pub memory: Memory,
    /// Current execution state.
    pub run_state: RunState,
}

impl CoreState {
    /// Creates a power-on state using the configured stack pointer.
    #[must_use]
    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            registers: RegisterFile::with_stack_pointer(config.initial_stack_pointer),
            memory: Memory::default(),
            run_state: RunState::Running,
        }
    }

    /// Creates a power-on state with `image` loaded at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::ImageTooLarge`] when the image does not fit.
    pub fn with_program(config: &CoreConfig, image: &[u8]) -> Result<Self, MemoryError> {
        let mut state = Self::with_config(config);
        state.memory.load(image)?;
        Ok(state)
    }

    /// Restores power-on registers and resumes at address 0.
    ///
    /// Memory is preserved so a loaded program can be re-run.
    pub fn reset(&mut self, config: &CoreConfig) {
        self.registers = RegisterFile::with_stack_pointer(config.initial_stack_pointer);
        self.run_state = RunState::Running;
        log::debug!("core reset, SP={:#04x}", config.initial_stack_pointer);
    }
}

/// Sink for `PRN` and `PRA` output.
pub trait OutputDevice {
    /// Receives a `PRN` value, to be shown as a decimal integer.
    fn write_decimal(&mut self, value: u8);

    /// Receives a `PRA` value, to be shown as a single character.
    fn write_char(&mut self, value: u8);
}

/// Output device that records everything in memory.
///
/// `PRN` values are recorded as decimal text followed by a newline; `PRA`
/// values as the character with code point `value`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureOutput {
    text: String,
}

impl CaptureOutput {
    /// Everything written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the device and returns the recorded text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl OutputDevice for CaptureOutput {
    fn write_decimal(&mut self, value: u8) {
        self.text.push_str(&value.to_string());
        self.text.push('\n');
    }

    fn write_char(&mut self, value: u8) {
        self.text.push(char::from(value));
    }
}

/// Result of one [`crate::step_one`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// An instruction executed and the machine is still running.
    Retired {
        /// Address the instruction was fetched from.
        pc: u8,
        /// Instruction that executed.
        opcode: Opcode,
    },
    /// The machine is halted (by this step or an earlier one).
    Halted,
    /// The machine is faulted (by this step or an earlier one).
    Fault(Fault),
}

/// Why a [`crate::run`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStop {
    /// Stopped by `HLT`.
    Halted,
    /// Stopped by a fault.
    Fault(Fault),
    /// [`CoreConfig::step_limit`] instructions executed without a terminal state.
    StepLimit,
}

/// Aggregated outcome from running until a stop condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Instructions executed during this call, the halting `HLT` included.
    pub steps: u64,
    /// Stop condition that ended the run.
    pub stop: RunStop,
}

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Versioned full-state snapshot for export, import and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Full machine state.
    pub state: CoreState,
}

impl CoreSnapshot {
    /// Captures the current machine state.
    #[must_use]
    pub fn capture(state: &CoreState) -> Self {
        Self {
            version: SnapshotVersion::V1,
            state: state.clone(),
        }
    }

    /// Returns the captured machine state.
    #[must_use]
    pub fn restore(self) -> CoreState {
        self.state
    }
}
