//! Hardware seams for the response collector.
//!
//! The collector never touches peripherals directly; firmware and host
//! targets supply implementations of these traits. `Noop` variants exist for
//! targets that have no physical counterpart to drive.

use crate::time::Timestamp;

/// One combined reading of the tap sensor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SensorSample {
    /// Analog magnitude from the sensor channel.
    pub level: u16,
    /// True when any digital tap input reports active. Checked before the
    /// analog comparison every poll cycle.
    pub switch_active: bool,
}

impl SensorSample {
    /// Builds a sample with both channels populated.
    #[must_use]
    pub const fn new(level: u16, switch_active: bool) -> Self {
        Self {
            level,
            switch_active,
        }
    }

    /// Analog-only sample with the digital inputs idle.
    #[must_use]
    pub const fn analog(level: u16) -> Self {
        Self::new(level, false)
    }
}

/// Abstraction over the tap sensor inputs.
pub trait Sensor {
    /// Reads the analog channel and digital inputs once.
    fn sample(&mut self) -> SensorSample;
}

impl<S: Sensor + ?Sized> Sensor for &mut S {
    fn sample(&mut self) -> SensorSample {
        (**self).sample()
    }
}

/// Operator-facing readiness output. Purely observational; nothing reads it
/// back.
pub trait Indicator {
    /// Asserts or clears the readiness output.
    fn set_ready(&mut self, on: bool);
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn set_ready(&mut self, on: bool) {
        (**self).set_ready(on);
    }
}

/// Indicator that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopIndicator;

impl NoopIndicator {
    /// Creates a new no-op indicator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Indicator for NoopIndicator {
    fn set_ready(&mut self, _: bool) {}
}

/// Injectable diagnostics hook for trial progress.
///
/// Every method is a provided no-op, so the collector can run without any
/// logging backend while firmware routes these through `defmt`.
pub trait TrialObserver {
    /// Debounce completed; the collector is now watching for a tap.
    fn detect_armed(&mut self, _at: Timestamp) {}

    /// A tap was recorded as response number `index` (1-based).
    fn tap_recorded(&mut self, _index: usize, _at: Timestamp) {}

    /// The trial deadline passed before the target count was reached.
    fn deadline_expired(&mut self, _at: Timestamp) {}
}

impl<O: TrialObserver + ?Sized> TrialObserver for &mut O {
    fn detect_armed(&mut self, at: Timestamp) {
        (**self).detect_armed(at);
    }

    fn tap_recorded(&mut self, index: usize, at: Timestamp) {
        (**self).tap_recorded(index, at);
    }

    fn deadline_expired(&mut self, at: Timestamp) {
        (**self).deadline_expired(at);
    }
}

/// Observer that discards every notification.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl NoopObserver {
    /// Creates a new no-op observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TrialObserver for NoopObserver {}
