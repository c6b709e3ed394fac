//! Fixed-cadence driver for single-step execution.
//!
//! The core never sleeps or reads a clock. [`PacedRunner`] calls
//! [`ls8_core::step_one`] once per tick and stops on a terminal state, a step
//! limit, or when its stop flag is raised from another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ls8_core::{step_one, CoreConfig, CoreState, OutputDevice, RunState, RunStop, StepOutcome};
use thiserror::Error;

/// Invalid pacing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PacingError {
    /// A clock rate of zero never ticks.
    #[error("clock rate must be at least 1 Hz")]
    ZeroRate,
}

/// Why a paced run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacedStop {
    /// The core stopped on its own: halt, fault or step limit.
    Core(RunStop),
    /// The stop flag was raised.
    Cancelled,
}

/// Outcome of [`PacedRunner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacedOutcome {
    /// Instructions executed, the halting `HLT` included.
    pub steps: u64,
    /// Stop condition that ended the run.
    pub stop: PacedStop,
}

/// Calls the core's step operation at a fixed interval.
#[derive(Debug, Clone)]
pub struct PacedRunner {
    interval: Duration,
    stop: Arc<AtomicBool>,
}

impl PacedRunner {
    /// Runner ticking `hz` times per second.
    ///
    /// # Errors
    ///
    /// Returns [`PacingError::ZeroRate`] when `hz` is zero.
    pub fn from_hz(hz: u32) -> Result<Self, PacingError> {
        if hz == 0 {
            return Err(PacingError::ZeroRate);
        }
        Ok(Self {
            interval: Duration::from_secs(1) / hz,
            stop: Arc::default(),
        })
    }

    /// Runner that steps back to back without sleeping.
    #[must_use]
    pub fn unpaced() -> Self {
        Self {
            interval: Duration::ZERO,
            stop: Arc::default(),
        }
    }

    /// Time between steps.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Shared flag that cancels the run when set.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Steps `state` until it halts, faults, reaches
    /// [`CoreConfig::step_limit`] or is cancelled.
    ///
    /// `before_step` sees the state ahead of every instruction.
    pub fn run(
        &self,
        state: &mut CoreState,
        output: &mut dyn OutputDevice,
        config: &CoreConfig,
        mut before_step: impl FnMut(&CoreState),
    ) -> PacedOutcome {
        let mut steps = 0_u64;
        let mut next_tick = Instant::now();

        loop {
            let finished = |stop| PacedOutcome {
                steps,
                stop: PacedStop::Core(stop),
            };

            match state.run_state {
                RunState::Running => {}
                RunState::Halted => return finished(RunStop::Halted),
                RunState::Faulted(fault) => return finished(RunStop::Fault(fault)),
            }

            if self.stop.load(Ordering::Relaxed) {
                log::debug!("paced run cancelled after {steps} steps");
                return PacedOutcome {
                    steps,
                    stop: PacedStop::Cancelled,
                };
            }

            if config.step_limit.is_some_and(|limit| steps >= limit) {
                return finished(RunStop::StepLimit);
            }

            before_step(state);
            if let StepOutcome::Retired { .. } | StepOutcome::Halted = step_one(state, output, config) {
                steps += 1;
            }

            if !self.interval.is_zero() && !state.run_state.is_terminal() {
                next_tick += self.interval;
                if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
                    thread::sleep(wait);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use ls8_core::{CaptureOutput, CoreConfig, CoreState, Fault, Opcode, RunStop};

    use super::{PacedRunner, PacedStop, PacingError};

    fn machine(program: &[u8]) -> CoreState {
        CoreState::with_program(&CoreConfig::default(), program).expect("program fits")
    }

    fn print8() -> CoreState {
        machine(&[
            Opcode::Ldi.byte(),
            0,
            8,
            Opcode::Prn.byte(),
            0,
            Opcode::Hlt.byte(),
        ])
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert_eq!(PacedRunner::from_hz(0).err(), Some(PacingError::ZeroRate));
    }

    #[test]
    fn rate_sets_interval() {
        let runner = PacedRunner::from_hz(1_000).expect("valid rate");
        assert_eq!(runner.interval(), Duration::from_millis(1));
        assert_eq!(PacedRunner::unpaced().interval(), Duration::ZERO);
    }

    #[test]
    fn paced_run_reaches_halt() {
        let runner = PacedRunner::from_hz(10_000).expect("valid rate");
        let mut state = print8();
        let mut output = CaptureOutput::default();
        let mut seen = Vec::new();

        let outcome = runner.run(&mut state, &mut output, &CoreConfig::default(), |s| {
            seen.push(s.registers.pc());
        });

        assert_eq!(outcome.stop, PacedStop::Core(RunStop::Halted));
        assert_eq!(outcome.steps, 3);
        assert_eq!(seen, vec![0, 3, 5]);
        assert_eq!(output.as_str(), "8\n");
    }

    #[test]
    fn raised_stop_flag_cancels_before_stepping() {
        let runner = PacedRunner::unpaced();
        runner.stop_handle().store(true, Ordering::Relaxed);
        let mut state = print8();
        let mut output = CaptureOutput::default();

        let outcome = runner.run(&mut state, &mut output, &CoreConfig::default(), |_| {});

        assert_eq!(outcome.stop, PacedStop::Cancelled);
        assert_eq!(outcome.steps, 0);
        assert_eq!(state.registers.pc(), 0);
    }

    #[test]
    fn stop_flag_from_callback_ends_endless_loop() {
        let runner = PacedRunner::unpaced();
        let stop = runner.stop_handle();
        let mut state = machine(&[Opcode::Ldi.byte(), 0, 0, Opcode::Jmp.byte(), 0]);
        let mut output = CaptureOutput::default();
        let mut calls = 0;

        let outcome = runner.run(&mut state, &mut output, &CoreConfig::default(), |_| {
            calls += 1;
            if calls == 10 {
                stop.store(true, Ordering::Relaxed);
            }
        });

        assert_eq!(outcome.stop, PacedStop::Cancelled);
        assert_eq!(outcome.steps, 10);
    }

    #[test]
    fn step_limit_is_honoured() {
        let config = CoreConfig {
            step_limit: Some(5),
            ..CoreConfig::default()
        };
        let mut state = machine(&[Opcode::Ldi.byte(), 0, 0, Opcode::Jmp.byte(), 0]);
        let mut output = CaptureOutput::default();

        let outcome = PacedRunner::unpaced().run(&mut state, &mut output, &config, |_| {});

        assert_eq!(outcome.stop, PacedStop::Core(RunStop::StepLimit));
        assert_eq!(outcome.steps, 5);
    }

    #[test]
    fn fault_ends_run_without_counting_faulting_instruction() {
        let mut state = machine(&[Opcode::Nop.byte(), 0xFF]);
        let mut output = CaptureOutput::default();

        let outcome =
            PacedRunner::unpaced().run(&mut state, &mut output, &CoreConfig::default(), |_| {});

        assert_eq!(
            outcome.stop,
            PacedStop::Core(RunStop::Fault(Fault::IllegalOpcode {
                pc: 1,
                opcode: 0xFF
            }))
        );
        assert_eq!(outcome.steps, 1);
    }
}
