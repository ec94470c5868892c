//! Synchronized multi-axis moves through a controller defer gate.
//!
//! The sequence is: hold the gate, write every target without waiting,
//! release the gate, then poll until all axes report done in the same poll.
//! Each step is a type-state transition, so targets cannot be written before
//! the gate is held and completion cannot be polled before release.

use core::marker::PhantomData;
use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::config::PollPolicy;
use crate::error::{CoordinationError, Error, MotionOutcome, Result, MAX_DEFERRED_AXES};
use crate::pv::{Axis, Completion, DeferGate, Field, PvAccess};

use super::controller::Harness;
use super::phase::{Done, GateReleased, GateSet, Idle, Phase, TargetsWritten};

/// `.DMOV` value once motion has finished.
const DONE_MOVING: f64 = 1.0;

/// One axis and where it should end up.
#[derive(Debug, Clone, Copy)]
pub struct MoveRequest<'a> {
    /// Axis to move.
    pub axis: &'a Axis,
    /// Absolute target position.
    pub target: f64,
}

impl<'a> MoveRequest<'a> {
    /// Create a move request.
    #[inline]
    pub fn new(axis: &'a Axis, target: f64) -> Self {
        Self { axis, target }
    }
}

/// Bounded done-flag polling state.
///
/// Ends either when every axis reports done within one attempt or when the
/// attempt count exceeds `max_attempts`. At least one attempt always runs,
/// so a budget of `n` allows `n + 1` polls.
#[derive(Debug, Clone)]
pub struct PollLoop {
    attempts: u32,
    max_attempts: u32,
    done: heapless::Vec<bool, MAX_DEFERRED_AXES>,
}

impl PollLoop {
    /// Create a loop over `axes` axes (capped at [`MAX_DEFERRED_AXES`]).
    pub fn new(axes: usize, max_attempts: u32) -> Self {
        let mut done = heapless::Vec::new();
        for _ in 0..axes.min(MAX_DEFERRED_AXES) {
            let _ = done.push(false);
        }
        Self {
            attempts: 0,
            max_attempts,
            done,
        }
    }

    /// Start the next attempt, clearing the done flags.
    ///
    /// Returns `false` once the attempt budget is spent.
    pub fn begin_attempt(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.attempts += 1;
        for flag in self.done.iter_mut() {
            *flag = false;
        }
        true
    }

    /// Record one axis's done flag for the current attempt.
    #[inline]
    pub fn record(&mut self, index: usize, done: bool) {
        if let Some(flag) = self.done.get_mut(index) {
            *flag = done;
        }
    }

    /// Whether every axis reported done in the current attempt.
    #[inline]
    pub fn all_done(&self) -> bool {
        !self.done.is_empty() && self.done.iter().all(|d| *d)
    }

    /// Whether no attempts remain.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.attempts > self.max_attempts
    }

    /// Attempts made so far.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Indices of axes not done in the current attempt.
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.done
            .iter()
            .enumerate()
            .filter(|(_, d)| !**d)
            .map(|(i, _)| i)
    }
}

/// A deferred move in phase `S`.
pub struct DeferredMove<'h, 'r, P, D, S>
where
    P: PvAccess,
    D: DelayNs,
    S: Phase,
{
    harness: &'h mut Harness<P, D>,
    requests: &'r [MoveRequest<'r>],
    gate: &'r DeferGate,
    timeout: Duration,
    _phase: PhantomData<S>,
}

impl<'h, 'r, P, D, S> DeferredMove<'h, 'r, P, D, S>
where
    P: PvAccess,
    D: DelayNs,
    S: Phase,
{
    /// Current phase name.
    #[inline]
    pub fn phase(&self) -> &'static str {
        S::name()
    }

    fn advance<T: Phase>(self) -> DeferredMove<'h, 'r, P, D, T> {
        debug!("deferred move via {}: {} -> {}", self.gate.pv().as_str(), S::name(), T::name());
        DeferredMove {
            harness: self.harness,
            requests: self.requests,
            gate: self.gate,
            timeout: self.timeout,
            _phase: PhantomData,
        }
    }
}

impl<'h, 'r, P, D> DeferredMove<'h, 'r, P, D, Idle>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Prepare a deferred move. Blocking writes use `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if `requests` is empty or longer than
    /// [`MAX_DEFERRED_AXES`].
    pub fn new(
        harness: &'h mut Harness<P, D>,
        requests: &'r [MoveRequest<'r>],
        gate: &'r DeferGate,
        timeout: Duration,
    ) -> Result<Self> {
        if requests.is_empty() {
            return Err(CoordinationError::NoAxes.into());
        }
        if requests.len() > MAX_DEFERRED_AXES {
            return Err(CoordinationError::TooManyAxes(requests.len()).into());
        }

        Ok(Self {
            harness,
            requests,
            gate,
            timeout,
            _phase: PhantomData,
        })
    }

    /// Hold the gate so subsequent commands are buffered.
    pub fn hold(self) -> Result<DeferredMove<'h, 'r, P, D, GateSet>> {
        let timeout = self.timeout;
        self.harness
            .put(self.gate.pv(), DeferGate::DEFER, Completion::Wait(timeout))?;
        Ok(self.advance())
    }
}

impl<'h, 'r, P, D> DeferredMove<'h, 'r, P, D, GateSet>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Write every target, in request order, without waiting.
    ///
    /// If a write fails the gate is released once before returning, so the
    /// controller is not left holding commands.
    pub fn write_targets(self) -> Result<DeferredMove<'h, 'r, P, D, TargetsWritten>> {
        for request in self.requests {
            let val = request.axis.field(Field::Val);
            if let Err(e) = self.harness.put(&val, request.target, Completion::NoWait) {
                error!("deferred target {} = {} failed: {}", val.as_str(), request.target, e);
                let release = Completion::Wait(self.timeout);
                if self
                    .harness
                    .put(self.gate.pv(), DeferGate::EXECUTE, release)
                    .is_err()
                {
                    warn!("{} may still be deferring", self.gate.pv().as_str());
                }
                return Err(e);
            }
        }
        Ok(self.advance())
    }
}

impl<'h, 'r, P, D> DeferredMove<'h, 'r, P, D, TargetsWritten>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Release the gate; all axes start moving together.
    pub fn release(self) -> Result<DeferredMove<'h, 'r, P, D, GateReleased>> {
        let timeout = self.timeout;
        self.harness
            .put(self.gate.pv(), DeferGate::EXECUTE, Completion::Wait(timeout))?;
        Ok(self.advance())
    }
}

impl<'h, 'r, P, D> DeferredMove<'h, 'r, P, D, GateReleased>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Poll every axis's done flag until all are set in the same attempt.
    ///
    /// # Errors
    ///
    /// Returns `PollTimeout` naming the axes still moving once the poll
    /// count exceeds `policy.max_attempts`, or a transport error. The
    /// pending axes are surveyed and logged before returning.
    pub fn wait_done(self, policy: &PollPolicy) -> Result<DeferredMove<'h, 'r, P, D, Done>> {
        let mut poll = PollLoop::new(self.requests.len(), policy.max_attempts);

        while poll.begin_attempt() {
            for (index, request) in self.requests.iter().enumerate() {
                let dmov = self.harness.get(&request.axis.field(Field::Dmov))?;
                poll.record(index, dmov == DONE_MOVING);
            }

            if poll.all_done() {
                info!("moves finished after {} polls", poll.attempts());
                return Ok(self.advance());
            }

            if !poll.is_exhausted() {
                self.harness.pause(policy.interval);
            }
        }

        let pending = poll
            .pending()
            .map(|i| self.requests[i].axis.name().clone())
            .collect::<heapless::Vec<_, MAX_DEFERRED_AXES>>();
        error!(
            "moves did not complete after {} polls ({} axes still moving)",
            poll.attempts(),
            pending.len()
        );
        for index in poll.pending() {
            self.harness.report_diagnostics(self.requests[index].axis);
        }

        Err(CoordinationError::PollTimeout {
            attempts: poll.attempts(),
            pending,
        }
        .into())
    }
}

impl<'h, 'r, P, D> DeferredMove<'h, 'r, P, D, Done>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Check every axis's final position against its target.
    ///
    /// All axes are checked; the first failure is returned.
    pub fn verify(self) -> MotionOutcome {
        let mut first: Option<Error> = None;

        for request in self.requests {
            if let Err(e) = self.harness.verify_position(request.axis, request.target) {
                first.get_or_insert(e);
            }
        }

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<P, D> Harness<P, D>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Move several axes together through a defer gate.
    ///
    /// Blocking gate writes use `timeout`; completion polling is bounded by
    /// `poll`. Success requires every axis done in the same poll and within
    /// its deadband of its target. A single request is a valid synchronized
    /// move.
    ///
    /// # Errors
    ///
    /// - `NoAxes` / `TooManyAxes` for a malformed request list
    /// - Transport error from any gate, target or poll access
    /// - `PollTimeout` if the axes do not all finish in time
    /// - `DeadbandViolation` for the first axis off target
    pub fn deferred_move(
        &mut self,
        requests: &[MoveRequest<'_>],
        gate: &DeferGate,
        timeout: Duration,
        poll: &PollPolicy,
    ) -> MotionOutcome {
        info!("deferred move of {} axes via {}", requests.len(), gate.pv().as_str());

        DeferredMove::new(self, requests, gate, timeout)?
            .hold()?
            .write_targets()?
            .release()?
            .wait_done(poll)?
            .verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_loop_bounded() {
        let mut poll = PollLoop::new(2, 3);
        let mut attempts = 0;
        while poll.begin_attempt() {
            attempts += 1;
            poll.record(0, true);
        }
        assert_eq!(attempts, 4);
        assert!(poll.is_exhausted());
        assert!(!poll.all_done());
        assert_eq!(poll.pending().collect::<heapless::Vec<_, 8>>().as_slice(), &[1]);
    }

    #[test]
    fn test_poll_loop_requires_same_attempt() {
        let mut poll = PollLoop::new(2, 10);

        assert!(poll.begin_attempt());
        poll.record(0, true);
        assert!(!poll.all_done());

        // Flags reset each attempt: axis 0 must report again.
        assert!(poll.begin_attempt());
        poll.record(1, true);
        assert!(!poll.all_done());

        assert!(poll.begin_attempt());
        poll.record(0, true);
        poll.record(1, true);
        assert!(poll.all_done());
        assert_eq!(poll.attempts(), 3);
    }

    #[test]
    fn test_zero_budget_still_polls_once() {
        let mut poll = PollLoop::new(1, 0);
        assert!(poll.begin_attempt());
        poll.record(0, true);
        assert!(poll.all_done());
        assert_eq!(poll.attempts(), 1);
        assert!(!poll.begin_attempt());
    }

    #[test]
    fn test_empty_poll_loop_never_done() {
        let mut poll = PollLoop::new(0, 1);
        assert!(poll.begin_attempt());
        assert!(!poll.all_done());
    }
}
