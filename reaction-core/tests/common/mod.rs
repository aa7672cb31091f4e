//! Scripted clock and sensor rig shared by the integration suites.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use reaction_core::sensor::{Sensor, SensorSample};
use reaction_core::time::{Clock, Timestamp};

/// Last timestamp issued by the clock, shared with the sensor so samples are
/// evaluated at the same virtual instant.
#[derive(Clone, Default)]
pub struct Timeline(Rc<Cell<u32>>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u32 {
        self.0.get()
    }
}

/// Virtual clock advancing a fixed step per reading.
pub struct ScriptClock {
    timeline: Timeline,
    next: u32,
    step: u32,
}

impl ScriptClock {
    pub fn new(timeline: &Timeline, start_us: u32, step_us: u32) -> Self {
        Self {
            timeline: timeline.clone(),
            next: start_us,
            step: step_us,
        }
    }
}

impl Clock for ScriptClock {
    fn now(&mut self) -> Timestamp {
        let issued = self.next;
        self.next = issued.wrapping_add(self.step);
        self.timeline.0.set(issued);
        Timestamp::from_micros(issued)
    }
}

/// One stretch of sensor behavior, active from `from_us` (absolute virtual
/// time) until the next segment begins.
#[derive(Copy, Clone, Debug)]
pub struct Segment {
    pub from_us: u32,
    pub level: u16,
    pub switch_active: bool,
}

impl Segment {
    pub const fn analog(from_us: u32, level: u16) -> Self {
        Self {
            from_us,
            level,
            switch_active: false,
        }
    }
}

/// Sensor replaying a segment script against the shared timeline.
pub struct ScriptSensor {
    timeline: Timeline,
    script: Vec<Segment>,
}

impl ScriptSensor {
    /// `script` must be ordered by `from_us` and must not straddle a counter
    /// wrap; the rig compares absolute virtual times directly.
    pub fn new(timeline: &Timeline, script: Vec<Segment>) -> Self {
        Self {
            timeline: timeline.clone(),
            script,
        }
    }

    /// Sensor that reports the same sample forever.
    pub fn constant(timeline: &Timeline, level: u16, switch_active: bool) -> Self {
        Self::new(
            timeline,
            vec![Segment {
                from_us: 0,
                level,
                switch_active,
            }],
        )
    }
}

impl Sensor for ScriptSensor {
    fn sample(&mut self) -> SensorSample {
        let now = self.timeline.current();
        let segment = self
            .script
            .iter()
            .rev()
            .find(|segment| segment.from_us <= now)
            .or_else(|| self.script.first())
            .copied()
            .unwrap_or(Segment::analog(0, 0));
        SensorSample::new(segment.level, segment.switch_active)
    }
}

/// Indicator that records every transition for assertion.
#[derive(Default)]
pub struct RecordingIndicator {
    pub transitions: Vec<bool>,
}

impl reaction_core::sensor::Indicator for RecordingIndicator {
    fn set_ready(&mut self, on: bool) {
        self.transitions.push(on);
    }
}
