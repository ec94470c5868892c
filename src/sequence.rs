//! Stepwise test sequences built from configuration.

use embedded_hal::delay::DelayNs;

use crate::config::{DeferredSequenceConfig, SequenceConfig, Settings, StepKind};
use crate::error::{ConfigError, CoordinationError, Error, MAX_DEFERRED_AXES};
use crate::motion::{Harness, MoveRequest};
use crate::pv::{Axis, DeferGate, PvAccess};
use crate::report::TestStatus;

/// Where a sequence stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    /// Failing step, or `None` if setup before the first step failed.
    pub index: Option<usize>,
    /// What went wrong.
    pub error: Error,
}

/// Result of running a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReport {
    /// Steps that passed.
    pub completed: usize,
    /// Steps in the sequence.
    pub total: usize,
    /// First failure; no later step was run.
    pub failure: Option<StepFailure>,
}

impl SequenceReport {
    fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            failure: None,
        }
    }

    fn fail(mut self, index: Option<usize>, error: Error) -> Self {
        self.failure = Some(StepFailure { index, error });
        self
    }

    /// Whether every step passed.
    #[inline]
    pub fn passed(&self) -> bool {
        self.failure.is_none() && self.completed == self.total
    }

    /// Overall status for [`test_complete`](crate::report::test_complete).
    pub fn status(&self) -> TestStatus {
        if self.passed() {
            TestStatus::Complete
        } else {
            TestStatus::Failed
        }
    }
}

/// Sequence name for diagnostics, cut at a character boundary to fit.
fn label(name: &str) -> heapless::String<32> {
    let mut label = heapless::String::new();
    for c in name.chars() {
        if label.push(c).is_err() {
            break;
        }
    }
    label
}

impl<P, D> Harness<P, D>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Visit each position of `sequence` on `axis`, stopping at the first
    /// failure.
    ///
    /// A configured post-move delay is written before the first step. Each
    /// passing step is followed by the configured settle pause.
    pub fn run_sequence(&mut self, axis: &Axis, sequence: &SequenceConfig, settings: &Settings) -> SequenceReport {
        let mut report = SequenceReport::new(sequence.len());
        info!("{} sequence of {} steps", axis.base(), sequence.len());

        if let Some(delay) = sequence.post_move_delay {
            let seconds = f64::from(delay.value());
            if let Err(e) = self.set_post_move_delay(axis, seconds, settings.timeout) {
                error!("{} sequence setup failed: {}", axis.base(), e);
                return report.fail(None, e);
            }
        }

        for (index, &position) in sequence.positions.iter().enumerate() {
            let outcome = match sequence.kind {
                StepKind::Move => self.move_to(axis, position, settings.timeout),
                StepKind::SetPosition => self.set_position(axis, position, settings.timeout),
            };

            if let Err(e) = outcome {
                error!("{} step {} ({}) failed: {}", axis.base(), index, position, e);
                return report.fail(Some(index), e);
            }

            report.completed += 1;
            self.pause(sequence.settle_ms.to_duration());
        }

        report
    }

    /// Run one deferred move per target row of `sequence`, stopping at the
    /// first failure.
    ///
    /// `axes` are matched to target columns by position. `name` labels the
    /// sequence in logs and errors.
    pub fn run_deferred_sequence(
        &mut self,
        name: &str,
        axes: &[Axis],
        gate: &DeferGate,
        sequence: &DeferredSequenceConfig,
        settings: &Settings,
    ) -> SequenceReport {
        let mut report = SequenceReport::new(sequence.len());
        info!("{}: deferred sequence of {} steps on {} axes", name, sequence.len(), axes.len());

        if axes.len() > MAX_DEFERRED_AXES {
            return report.fail(None, CoordinationError::TooManyAxes(axes.len()).into());
        }

        for (index, row) in sequence.targets.iter().enumerate() {
            if row.len() != axes.len() {
                let mismatch = ConfigError::TargetCountMismatch {
                    sequence: label(name),
                    expected: axes.len(),
                    found: row.len(),
                };
                error!("{}: step {}: {}", name, index, mismatch);
                return report.fail(Some(index), mismatch.into());
            }

            let requests: heapless::Vec<MoveRequest<'_>, MAX_DEFERRED_AXES> = axes
                .iter()
                .zip(row.iter())
                .map(|(axis, &target)| MoveRequest::new(axis, target))
                .collect();

            if let Err(e) = self.deferred_move(&requests, gate, settings.timeout, &settings.poll) {
                error!("{}: deferred step {} failed: {}", name, index, e);
                return report.fail(Some(index), e);
            }

            report.completed += 1;
        }

        report
    }
}
