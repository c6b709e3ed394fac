use crate::Fault;

/// Execution state machine: one running state and two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// Stopped cleanly by `HLT`.
    Halted,
    /// Stopped by a fatal fault; no further progress without reset.
    Faulted(Fault),
}

impl RunState {
    /// Returns the latched fault, if this state is faulted.
    #[must_use]
    pub const fn latched_fault(self) -> Option<Fault> {
        match self {
            Self::Faulted(fault) => Some(fault),
            Self::Running | Self::Halted => None,
        }
    }

    /// Returns `true` once the machine has halted or faulted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::Fault;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
        assert!(!RunState::Running.is_terminal());
    }

    #[test]
    fn latched_fault_accessor_reports_only_faulted_variant() {
        let fault = Fault::DivideByZero {
            pc: 4,
            opcode: 0b1010_1011,
        };

        assert_eq!(RunState::Running.latched_fault(), None);
        assert_eq!(RunState::Halted.latched_fault(), None);
        assert_eq!(RunState::Faulted(fault).latched_fault(), Some(fault));
        assert!(RunState::Halted.is_terminal());
        assert!(RunState::Faulted(fault).is_terminal());
    }
}
