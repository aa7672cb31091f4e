use std::cell::Cell;
use std::fmt::Write as _;
use std::rc::Rc;

use reaction_core::collector::{CollectorConfig, Trial, collect_responses};
use reaction_core::params::parse_trial_request;
use reaction_core::report::report_line;
use reaction_core::sensor::{NoopIndicator, Sensor, SensorSample, TrialObserver};
use reaction_core::time::{Clock, Timestamp};

// Mirror of the board calibration so emulated trials behave like hardware.
const EMULATED_CALIBRATION: CollectorConfig = CollectorConfig::new(300, 25, 60_000);

/// Virtual microseconds that pass between consecutive clock readings.
const POLL_STEP_US: u32 = 500;

/// Sensor timeline selected on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptProfile {
    /// Analog pulses above the high threshold every 150 ms.
    Taps,
    /// Sensor stays silent; every trial times out empty.
    Quiet,
}

impl ScriptProfile {
    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("taps") {
            Ok(Self::Taps)
        } else if tag.eq_ignore_ascii_case("quiet") {
            Ok(Self::Quiet)
        } else {
            Err(format!("Unknown script profile `{tag}`"))
        }
    }
}

/// Clock advancing a fixed virtual step per reading. The timeline cell holds
/// the most recently issued microsecond count so the scripted sensor can
/// produce the reading for the same instant.
struct SimClock {
    timeline: Rc<Cell<u32>>,
    next_us: u32,
}

impl SimClock {
    fn new(timeline: Rc<Cell<u32>>) -> Self {
        Self {
            timeline,
            next_us: 0,
        }
    }
}

impl Clock for SimClock {
    fn now(&mut self) -> Timestamp {
        let issued = self.next_us;
        self.next_us = issued.wrapping_add(POLL_STEP_US);
        self.timeline.set(issued);
        Timestamp::from_micros(issued)
    }
}

/// Sensor computing its reading from the shared virtual timeline.
struct ScriptedSensor {
    profile: ScriptProfile,
    timeline: Rc<Cell<u32>>,
}

impl ScriptedSensor {
    const FIRST_PULSE_US: u32 = 100_000;
    const PULSE_PERIOD_US: u32 = 150_000;
    const PULSE_WIDTH_US: u32 = 1_000;
    const PULSE_LEVEL: u16 = 400;

    fn new(profile: ScriptProfile, timeline: Rc<Cell<u32>>) -> Self {
        Self { profile, timeline }
    }

    fn level_at(&self, at_us: u32) -> u16 {
        match self.profile {
            ScriptProfile::Quiet => 0,
            ScriptProfile::Taps => {
                if at_us >= Self::FIRST_PULSE_US
                    && (at_us - Self::FIRST_PULSE_US) % Self::PULSE_PERIOD_US < Self::PULSE_WIDTH_US
                {
                    Self::PULSE_LEVEL
                } else {
                    0
                }
            }
        }
    }
}

impl Sensor for ScriptedSensor {
    fn sample(&mut self) -> SensorSample {
        SensorSample::analog(self.level_at(self.timeline.get()))
    }
}

/// Collector hook recording trial progress for narration.
#[derive(Default)]
struct EventLog {
    events: Vec<TrialEvent>,
}

enum TrialEvent {
    Armed(Timestamp),
    Tap(usize, Timestamp),
    Deadline(Timestamp),
}

impl TrialObserver for EventLog {
    fn detect_armed(&mut self, at: Timestamp) {
        self.events.push(TrialEvent::Armed(at));
    }

    fn tap_recorded(&mut self, index: usize, at: Timestamp) {
        self.events.push(TrialEvent::Tap(index, at));
    }

    fn deadline_expired(&mut self, at: Timestamp) {
        self.events.push(TrialEvent::Deadline(at));
    }
}

pub struct Session {
    profile: ScriptProfile,
    timeline: Rc<Cell<u32>>,
    clock: SimClock,
    trial_count: usize,
}

impl Session {
    pub fn new(profile: ScriptProfile) -> Self {
        let timeline = Rc::new(Cell::new(0));
        let clock = SimClock::new(Rc::clone(&timeline));
        Self {
            profile,
            timeline,
            clock,
            trial_count: 0,
        }
    }

    /// Runs one trial against the scripted sensor and returns the narration
    /// plus the record the firmware would emit.
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        let mut bytes = line.as_bytes().to_vec();
        // The line feed the transport would deliver doubles as the final
        // terminator for bare `<count>,<limit>` input.
        bytes.push(b'\n');

        let request = match parse_trial_request(&bytes) {
            Ok(request) => request,
            Err(err) => return vec![format!("ERR params {err}")],
        };
        let params = request.clamp();
        self.trial_count += 1;

        let mut lines = vec![format!(
            "# trial {} target={} limit={}ms",
            self.trial_count, params.target_count, params.time_limit_ms
        )];

        let mut sensor = ScriptedSensor::new(self.profile, Rc::clone(&self.timeline));
        let mut log = EventLog::default();
        let trial = collect_responses(
            &params,
            EMULATED_CALIBRATION,
            &mut self.clock,
            &mut sensor,
            &mut NoopIndicator::new(),
            &mut log,
        );

        for event in &log.events {
            lines.push(narrate(event, &trial));
        }

        let record = report_line(&trial, self.clock.now());
        lines.push(record.trim_end().to_string());
        lines
    }
}

fn narrate(event: &TrialEvent, trial: &Trial) -> String {
    let mut line = String::from("# ");
    match event {
        TrialEvent::Armed(at) => {
            let _ = write!(
                line,
                "detection armed at +{}us",
                at.elapsed_since(trial.started_at)
            );
        }
        TrialEvent::Tap(index, at) => {
            let _ = write!(
                line,
                "tap {} at +{}us",
                index,
                at.elapsed_since(trial.started_at)
            );
        }
        TrialEvent::Deadline(at) => {
            let _ = write!(
                line,
                "deadline expired at +{}us",
                at.elapsed_since(trial.started_at)
            );
        }
    }
    line
}
