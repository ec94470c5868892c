//! In-memory motor controller for tests and demos (std only).
//!
//! [`SimController`] implements [`PvAccess`] over a set of simulated motor
//! records, defer gates and auxiliary controls. It models just enough of the
//! motor record for the harness to be exercised end to end:
//!
//! - readback is `dial + offset`
//! - a move settles at `target + settle_error`
//! - in set mode a `.DVAL` write redefines the dial while `.VAL` stays put,
//!   which shifts `.OFF`
//! - while a gate is held `.VAL` writes are buffered and start on release
//! - a move stays in progress for `move_polls` reads of `.DMOV`
//! - a stuck motor never finishes, and a blocking write to it times out
//! - `:AutoEnable` / `:AutoDisable` drive `.CNEN` around each move
//!
//! Faults can be injected per PV, and every access is journaled so tests can
//! assert on ordering.
//!
//! # Example
//!
//! ```rust
//! use axis_harness::sim::{SimController, SimMotor};
//! use axis_harness::pv::{Completion, PvAccess};
//!
//! let mut sim = SimController::new();
//! sim.add_motor("BL99:Mot:P6K1", SimMotor::new().with_offset(0.5));
//!
//! sim.write("BL99:Mot:P6K1.VAL", 2.0, Completion::NoWait).unwrap();
//! assert_eq!(sim.read("BL99:Mot:P6K1.DMOV").unwrap(), 1.0);
//! assert_eq!(sim.read("BL99:Mot:P6K1.RBV").unwrap(), 2.0);
//! ```

use std::collections::HashMap;
use std::string::{String, ToString};
use std::vec::Vec;

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::pv::{AuxField, Completion, ErrorType, Field, PvAccess, TransportErrorKind};

/// Deadband of a freshly created motor.
const DEFAULT_DEADBAND: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Motion {
    target: f64,
    remaining: u32,
}

/// One simulated motor record.
#[derive(Debug, Clone)]
pub struct SimMotor {
    fields: HashMap<Field, f64>,
    dial: f64,
    settle_error: f64,
    move_polls: u32,
    motion: Option<Motion>,
    stuck: bool,
    dial_limits: Option<(f64, f64)>,
    auto_enable: bool,
    auto_disable: bool,
}

impl Default for SimMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimMotor {
    /// A settled, enabled motor at zero with no offset.
    pub fn new() -> Self {
        let mut fields: HashMap<Field, f64> = Field::ALL.iter().map(|f| (*f, 0.0)).collect();
        fields.insert(Field::Dmov, 1.0);
        fields.insert(Field::Cnen, 1.0);
        fields.insert(Field::Rdbd, DEFAULT_DEADBAND);

        Self {
            fields,
            dial: 0.0,
            settle_error: 0.0,
            move_polls: 0,
            motion: None,
            stuck: false,
            dial_limits: None,
            auto_enable: false,
            auto_disable: false,
        }
    }

    /// Set the retry deadband `.RDBD`.
    pub fn with_deadband(mut self, deadband: f64) -> Self {
        self.fields.insert(Field::Rdbd, deadband);
        self
    }

    /// Land every move this far from its target.
    pub fn with_settle_error(mut self, error: f64) -> Self {
        self.settle_error = error;
        self
    }

    /// Set the user offset, keeping the dial position.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.fields.insert(Field::Off, offset);
        self.fields.insert(Field::Val, self.dial + offset);
        self
    }

    /// Start at a user position.
    pub fn with_position(mut self, position: f64) -> Self {
        self.dial = position - self.offset();
        self.fields.insert(Field::Val, position);
        self
    }

    /// Keep each non-blocking move in progress for `polls` reads of `.DMOV`.
    pub fn with_move_polls(mut self, polls: u32) -> Self {
        self.move_polls = polls;
        self
    }

    /// Refuse dial targets outside `[low, high]`, raising `.LVIO`.
    pub fn with_dial_limits(mut self, low: f64, high: f64) -> Self {
        self.dial_limits = Some((low, high));
        self
    }

    /// Never finish a move.
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Readback in user coordinates.
    #[inline]
    pub fn readback(&self) -> f64 {
        self.dial + self.offset()
    }

    /// Dial position.
    #[inline]
    pub fn dial(&self) -> f64 {
        self.dial
    }

    /// Whether a move is in progress.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// Current value of `field`, without side effects.
    pub fn field(&self, field: Field) -> f64 {
        match field {
            Field::Rbv => self.readback(),
            Field::Dval => self.dial,
            _ => self.fields.get(&field).copied().unwrap_or(0.0),
        }
    }

    /// Force `field` to `value`, bypassing record behaviour.
    pub fn set_field(&mut self, field: Field, value: f64) {
        match field {
            Field::Rbv => self.dial = value - self.offset(),
            Field::Dval => self.dial = value,
            _ => {
                self.fields.insert(field, value);
            }
        }
    }

    fn offset(&self) -> f64 {
        self.fields.get(&Field::Off).copied().unwrap_or(0.0)
    }

    fn in_set_mode(&self) -> bool {
        self.field(Field::Set) != 0.0
    }

    fn within_limits(&self, dial: f64) -> bool {
        match self.dial_limits {
            Some((low, high)) => dial >= low && dial <= high,
            None => true,
        }
    }

    fn read(&mut self, field: Field) -> f64 {
        match field {
            Field::Dmov => self.poll_done(),
            _ => self.field(field),
        }
    }

    fn poll_done(&mut self) -> f64 {
        let Some(motion) = self.motion else {
            return self.field(Field::Dmov);
        };

        if self.stuck {
            0.0
        } else if motion.remaining == 0 {
            self.finish();
            1.0
        } else {
            self.motion = Some(Motion {
                remaining: motion.remaining - 1,
                ..motion
            });
            0.0
        }
    }

    fn write(&mut self, field: Field, value: f64, blocking: bool) -> Result<(), TransportErrorKind> {
        match field {
            Field::Val => self.command(value, blocking),
            Field::Dval if self.in_set_mode() => {
                self.redefine(value);
                Ok(())
            }
            Field::Dval => self.command(value + self.offset(), blocking),
            Field::Off => {
                self.fields.insert(Field::Off, value);
                self.fields.insert(Field::Val, self.dial + value);
                Ok(())
            }
            Field::Set | Field::Rdbd | Field::Cnen => {
                self.fields.insert(field, value);
                Ok(())
            }
            _ => Err(TransportErrorKind::Rejected),
        }
    }

    fn command(&mut self, target: f64, blocking: bool) -> Result<(), TransportErrorKind> {
        if !self.within_limits(target - self.offset()) {
            self.fields.insert(Field::Lvio, 1.0);
            return Ok(());
        }

        self.fields.insert(Field::Lvio, 0.0);
        self.fields.insert(Field::Val, target);
        if self.auto_enable {
            self.fields.insert(Field::Cnen, 1.0);
        }
        self.fields.insert(Field::Dmov, 0.0);
        self.fields.insert(Field::Movn, 1.0);
        self.motion = Some(Motion {
            target,
            remaining: self.move_polls,
        });

        if !blocking {
            return Ok(());
        }
        if self.stuck {
            return Err(TransportErrorKind::Timeout);
        }
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        if let Some(motion) = self.motion.take() {
            self.dial = motion.target + self.settle_error - self.offset();
        }
        self.fields.insert(Field::Dmov, 1.0);
        self.fields.insert(Field::Movn, 0.0);
        if self.auto_disable {
            self.fields.insert(Field::Cnen, 0.0);
        }
    }

    fn redefine(&mut self, dial: f64) {
        if !self.within_limits(dial) {
            self.fields.insert(Field::Lvio, 1.0);
            return;
        }

        self.fields.insert(Field::Lvio, 0.0);
        self.dial = dial;
        // User VAL is held fixed, so the offset absorbs the change.
        let val = self.field(Field::Val);
        self.fields.insert(Field::Off, val - dial);
    }

    fn set_aux(&mut self, aux: AuxField, value: f64) {
        match aux {
            AuxField::AutoEnable => self.auto_enable = value != 0.0,
            AuxField::AutoDisable => self.auto_disable = value != 0.0,
            _ => {}
        }
    }
}

/// One journaled PV access.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A read of `pv`.
    Read {
        /// PV name
        pv: String,
    },
    /// A write of `value` to `pv`.
    Write {
        /// PV name
        pv: String,
        /// Value written
        value: f64,
        /// Whether the write waited for completion
        wait: bool,
    },
}

impl SimEvent {
    /// PV accessed.
    pub fn pv(&self) -> &str {
        match self {
            SimEvent::Read { pv } | SimEvent::Write { pv, .. } => pv.as_str(),
        }
    }

    /// Whether this is a write.
    pub fn is_write(&self) -> bool {
        matches!(self, SimEvent::Write { .. })
    }
}

#[derive(Debug, Clone, Default)]
struct SimGate {
    members: Vec<String>,
    held: bool,
    buffered: Vec<(String, f64)>,
}

enum Target<'a> {
    Gate,
    Field(&'a str, Field),
    Aux(&'a str, AuxField),
}

/// Simulated motor controller.
#[derive(Debug, Clone, Default)]
pub struct SimController {
    motors: HashMap<String, SimMotor>,
    gates: HashMap<String, SimGate>,
    aux: HashMap<String, f64>,
    faults: HashMap<String, TransportErrorKind>,
    journal: Vec<SimEvent>,
}

impl SimController {
    /// An empty controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a motor record at `base`.
    pub fn add_motor(&mut self, base: &str, motor: SimMotor) {
        self.motors.insert(base.to_string(), motor);
    }

    /// Add a defer gate at `pv` that buffers moves of the given motors.
    pub fn add_defer_gate(&mut self, pv: &str, members: &[&str]) {
        let gate = SimGate {
            members: members.iter().map(|m| m.to_string()).collect(),
            ..SimGate::default()
        };
        self.gates.insert(pv.to_string(), gate);
    }

    /// Get a motor by base name.
    pub fn motor(&self, base: &str) -> Option<&SimMotor> {
        self.motors.get(base)
    }

    /// Get a motor by base name mutably.
    pub fn motor_mut(&mut self, base: &str) -> Option<&mut SimMotor> {
        self.motors.get_mut(base)
    }

    /// Make every access to `pv` fail with `kind`.
    pub fn fail_pv(&mut self, pv: &str, kind: TransportErrorKind) {
        self.faults.insert(pv.to_string(), kind);
    }

    /// Remove an injected fault.
    pub fn clear_fault(&mut self, pv: &str) {
        self.faults.remove(pv);
    }

    /// Every access so far, oldest first.
    pub fn journal(&self) -> &[SimEvent] {
        &self.journal
    }

    /// Forget the journal.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Position of the first journal entry writing `value` to `pv`.
    pub fn write_index(&self, pv: &str, value: f64) -> Option<usize> {
        self.journal.iter().position(|e| match e {
            SimEvent::Write { pv: p, value: v, .. } => p.as_str() == pv && *v == value,
            SimEvent::Read { .. } => false,
        })
    }

    /// Current value of `pv` without journaling or side effects.
    pub fn value(&self, pv: &str) -> Option<f64> {
        match self.resolve(pv)? {
            Target::Gate => self.gates.get(pv).map(|g| if g.held { 1.0 } else { 0.0 }),
            Target::Field(base, field) => self.motors.get(base).map(|m| m.field(field)),
            Target::Aux(..) => self.aux.get(pv).copied(),
        }
    }

    fn resolve<'a>(&self, pv: &'a str) -> Option<Target<'a>> {
        if self.gates.contains_key(pv) {
            return Some(Target::Gate);
        }
        if let Some((base, suffix)) = pv.rsplit_once('.') {
            if self.motors.contains_key(base) {
                return Field::from_suffix(suffix).map(|f| Target::Field(base, f));
            }
        }
        if let Some((base, name)) = pv.rsplit_once(':') {
            if self.motors.contains_key(base) {
                return AuxField::from_name(name).map(|a| Target::Aux(base, a));
            }
        }
        None
    }

    fn is_deferred(&self, base: &str) -> bool {
        self.gates
            .values()
            .any(|g| g.held && g.members.iter().any(|m| m == base))
    }

    fn holding_gate(&mut self, base: &str) -> Option<&mut SimGate> {
        self.gates
            .values_mut()
            .find(|g| g.held && g.members.iter().any(|m| m == base))
    }

    fn set_gate(&mut self, pv: &str, value: f64) {
        let Some(gate) = self.gates.get_mut(pv) else {
            return;
        };

        if value != 0.0 {
            gate.held = true;
            return;
        }

        gate.held = false;
        let buffered = core::mem::take(&mut gate.buffered);
        debug!("{} released {} buffered moves", pv, buffered.len());
        for (base, target) in buffered {
            if let Some(motor) = self.motors.get_mut(&base) {
                let _ = motor.write(Field::Val, target, false);
            }
        }
    }

    fn check_fault(&self, pv: &str) -> Result<(), TransportErrorKind> {
        match self.faults.get(pv) {
            Some(kind) => Err(*kind),
            None => Ok(()),
        }
    }
}

impl ErrorType for SimController {
    type Error = TransportErrorKind;
}

impl PvAccess for SimController {
    fn read(&mut self, pv: &str) -> Result<f64, Self::Error> {
        self.journal.push(SimEvent::Read { pv: pv.to_string() });
        self.check_fault(pv)?;

        match self.resolve(pv) {
            Some(Target::Gate) => Ok(self.value(pv).unwrap_or(0.0)),
            Some(Target::Field(base, field)) => self
                .motors
                .get_mut(base)
                .map(|m| m.read(field))
                .ok_or(TransportErrorKind::Disconnected),
            Some(Target::Aux(..)) => Ok(self.aux.get(pv).copied().unwrap_or(0.0)),
            None => Err(TransportErrorKind::Disconnected),
        }
    }

    fn write(&mut self, pv: &str, value: f64, completion: Completion) -> Result<(), Self::Error> {
        self.journal.push(SimEvent::Write {
            pv: pv.to_string(),
            value,
            wait: completion.is_blocking(),
        });
        self.check_fault(pv)?;

        match self.resolve(pv) {
            Some(Target::Gate) => {
                self.set_gate(pv, value);
                Ok(())
            }
            Some(Target::Field(base, Field::Val)) if self.is_deferred(base) => {
                if let Some(gate) = self.holding_gate(base) {
                    gate.buffered.push((base.to_string(), value));
                }
                Ok(())
            }
            Some(Target::Field(base, field)) => match self.motors.get_mut(base) {
                Some(motor) => motor.write(field, value, completion.is_blocking()),
                None => Err(TransportErrorKind::Disconnected),
            },
            Some(Target::Aux(base, aux)) => {
                self.aux.insert(pv.to_string(), value);
                if let Some(motor) = self.motors.get_mut(base) {
                    motor.set_aux(aux, value);
                }
                Ok(())
            }
            None => Err(TransportErrorKind::Disconnected),
        }
    }
}

/// Delay provider that records requested delays instead of sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimDelay {
    calls: u32,
    total_ns: u64,
}

impl SimDelay {
    /// A delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of delays requested.
    #[inline]
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Total time requested.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.total_ns)
    }

    fn record(&mut self, ns: u64) {
        self.calls += 1;
        self.total_ns = self.total_ns.saturating_add(ns);
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms) * 1_000_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M1: &str = "SIM:M1";
    const GATE: &str = "SIM:Defer";

    #[test]
    fn test_readback_includes_offset() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new().with_offset(0.5).with_position(1.0));

        assert_eq!(sim.read("SIM:M1.RBV").unwrap(), 1.0);
        assert_eq!(sim.read("SIM:M1.DVAL").unwrap(), 0.5);
    }

    #[test]
    fn test_redefine_shifts_offset() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new());
        let wait = Completion::Wait(Duration::from_secs(1));

        sim.write("SIM:M1.SET", 1.0, wait).unwrap();
        sim.write("SIM:M1.DVAL", 3.0, wait).unwrap();

        let motor = sim.motor(M1).unwrap();
        assert_eq!(motor.dial(), 3.0);
        assert_eq!(motor.field(Field::Off), -3.0);
        assert_eq!(motor.readback(), 0.0);
        assert!(!motor.is_moving());
    }

    #[test]
    fn test_gate_buffers_moves() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new().with_move_polls(1));
        sim.add_defer_gate(GATE, &[M1]);

        sim.write(GATE, 1.0, Completion::NoWait).unwrap();
        sim.write("SIM:M1.VAL", 2.0, Completion::NoWait).unwrap();
        assert!(!sim.motor(M1).unwrap().is_moving());

        sim.write(GATE, 0.0, Completion::NoWait).unwrap();
        assert!(sim.motor(M1).unwrap().is_moving());

        assert_eq!(sim.read("SIM:M1.DMOV").unwrap(), 0.0);
        assert_eq!(sim.read("SIM:M1.DMOV").unwrap(), 1.0);
        assert_eq!(sim.motor(M1).unwrap().readback(), 2.0);
    }

    #[test]
    fn test_stuck_motor_times_out() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new().stuck());

        let result = sim.write("SIM:M1.VAL", 1.0, Completion::Wait(Duration::from_secs(1)));
        assert_eq!(result, Err(TransportErrorKind::Timeout));
        assert_eq!(sim.read("SIM:M1.DMOV").unwrap(), 0.0);
    }

    #[test]
    fn test_auto_power_cycles_drive() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new());
        sim.write("SIM:M1:AutoDisable", 1.0, Completion::NoWait).unwrap();

        sim.write("SIM:M1.VAL", 1.0, Completion::NoWait).unwrap();
        assert_eq!(sim.value("SIM:M1.CNEN"), Some(1.0));
        assert_eq!(sim.read("SIM:M1.DMOV").unwrap(), 1.0);
        assert_eq!(sim.value("SIM:M1.CNEN"), Some(0.0));
    }

    #[test]
    fn test_dial_limits_raise_lvio() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new().with_dial_limits(-1.0, 1.0));

        sim.write("SIM:M1.VAL", 5.0, Completion::NoWait).unwrap();
        assert_eq!(sim.value("SIM:M1.LVIO"), Some(1.0));
        assert_eq!(sim.motor(M1).unwrap().readback(), 0.0);
    }

    #[test]
    fn test_unknown_and_faulted_pvs() {
        let mut sim = SimController::new();
        sim.add_motor(M1, SimMotor::new());
        sim.fail_pv("SIM:M1.RBV", TransportErrorKind::Other);

        assert_eq!(sim.read("SIM:M2.RBV"), Err(TransportErrorKind::Disconnected));
        assert_eq!(sim.read("SIM:M1.EGU"), Err(TransportErrorKind::Disconnected));
        assert_eq!(sim.read("SIM:M1.RBV"), Err(TransportErrorKind::Other));
        assert_eq!(sim.journal().len(), 3);

        sim.clear_fault("SIM:M1.RBV");
        assert!(sim.read("SIM:M1.RBV").is_ok());
    }

    #[test]
    fn test_delay_accounting() {
        let mut delay = SimDelay::new();
        delay.delay_ms(100);
        delay.delay_us(500);
        assert_eq!(delay.calls(), 2);
        assert_eq!(delay.elapsed(), Duration::from_micros(100_500));
    }
}
