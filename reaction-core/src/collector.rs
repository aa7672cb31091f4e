//! Per-trial response collection state machine.
//!
//! Each collection attempt runs two phases. ARMED waits for the sensor to
//! sit strictly below the low threshold for the full debounce duration; any
//! reading at or above it restarts the window. DETECTING waits for a tap
//! (digital input active, checked first, or analog level at or above the
//! high threshold) or for the trial deadline. A detected tap rearms the
//! machine for the next attempt; the deadline ends the whole trial.

use heapless::Vec as HeaplessVec;

use crate::MAX_RESPONSES;
use crate::params::TrialParams;
use crate::sensor::{Indicator, Sensor, SensorSample, TrialObserver};
use crate::time::{Clock, Timestamp};

/// Calibration values for a specific sensor and circuit revision.
///
/// These are data, not design invariants: the board layer supplies them and
/// tests use synthetic values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CollectorConfig {
    /// Analog level at or above which a tap is detected.
    pub high_threshold: u16,
    /// Analog level at or above which the debounce window restarts.
    pub low_threshold: u16,
    /// Uninterrupted below-low interval required before detection begins.
    pub debounce_us: u32,
}

impl CollectorConfig {
    /// Builds a configuration from explicit calibration values.
    #[must_use]
    pub const fn new(high_threshold: u16, low_threshold: u16, debounce_us: u32) -> Self {
        Self {
            high_threshold,
            low_threshold,
            debounce_us,
        }
    }
}

/// Phase of the current collection attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttemptPhase {
    /// Debouncing; `low_since` is the start of the current uninterrupted
    /// below-low interval.
    Armed { low_since: Timestamp },
    /// Watching for a tap or the trial deadline.
    Detecting,
}

/// Outcome of one poll iteration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// Neither a tap nor the deadline was observed.
    Waiting,
    /// Tap detected at the given timestamp.
    Tap(Timestamp),
    /// The trial deadline passed; collection must stop immediately.
    DeadlineExpired,
}

/// Detection state machine for one trial.
///
/// Pure logic: no clock, sensor, or indicator access. Callers feed it one
/// `(now, sample)` pair per iteration and interpret the [`PollOutcome`].
#[derive(Clone, Debug)]
pub struct ResponseCollector {
    config: CollectorConfig,
    started_at: Timestamp,
    time_limit_us: u32,
    phase: AttemptPhase,
}

impl ResponseCollector {
    /// Starts a collector for a trial beginning at `started_at`.
    #[must_use]
    pub const fn new(config: CollectorConfig, started_at: Timestamp, time_limit_us: u32) -> Self {
        Self {
            config,
            started_at,
            time_limit_us,
            phase: AttemptPhase::Armed {
                low_since: started_at,
            },
        }
    }

    /// Returns the current attempt phase.
    #[must_use]
    pub const fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Returns `true` while the attempt is debouncing.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self.phase, AttemptPhase::Armed { .. })
    }

    /// Restarts the debounce phase for the next attempt.
    pub fn rearm(&mut self, now: Timestamp) {
        self.phase = AttemptPhase::Armed { low_since: now };
    }

    /// Advances the machine by one poll iteration.
    ///
    /// A tap observed at or before the deadline instant is reported; a tap
    /// first seen after the deadline is not, the deadline expiry ends the
    /// trial instead. Every recorded timestamp therefore satisfies
    /// `elapsed_since(trial start) <= time limit`.
    pub fn poll(&mut self, now: Timestamp, sample: SensorSample) -> PollOutcome {
        match self.phase {
            AttemptPhase::Armed { low_since } => {
                if sample.level >= self.config.low_threshold {
                    // At-or-above the low threshold restarts the window.
                    self.phase = AttemptPhase::Armed { low_since: now };
                } else if now.elapsed_since(low_since) >= self.config.debounce_us {
                    self.phase = AttemptPhase::Detecting;
                }
                PollOutcome::Waiting
            }
            AttemptPhase::Detecting => {
                let elapsed = now.elapsed_since(self.started_at);
                if (sample.switch_active || sample.level >= self.config.high_threshold)
                    && elapsed <= self.time_limit_us
                {
                    return PollOutcome::Tap(now);
                }
                if elapsed >= self.time_limit_us {
                    return PollOutcome::DeadlineExpired;
                }
                PollOutcome::Waiting
            }
        }
    }
}

/// One completed trial: parameters, start timestamp, and the responses
/// gathered before the target count or the deadline was reached.
#[derive(Clone, Debug)]
pub struct Trial {
    pub params: TrialParams,
    pub started_at: Timestamp,
    pub responses: HeaplessVec<Timestamp, MAX_RESPONSES>,
}

impl Trial {
    /// Number of responses actually collected.
    #[must_use]
    pub fn collected(&self) -> usize {
        self.responses.len()
    }
}

/// Runs the collection loop for one trial.
///
/// Polls the clock and sensor until `params.target_count` responses were
/// recorded or the deadline expired, asserting the indicator during each
/// debounce phase. The response buffer is owned by the returned [`Trial`];
/// nothing is carried between trials.
pub fn collect_responses<C, S, I, O>(
    params: &TrialParams,
    config: CollectorConfig,
    clock: &mut C,
    sensor: &mut S,
    indicator: &mut I,
    observer: &mut O,
) -> Trial
where
    C: Clock,
    S: Sensor,
    I: Indicator,
    O: TrialObserver,
{
    let started_at = clock.now();
    let mut collector = ResponseCollector::new(config, started_at, params.time_limit_us);
    let mut responses = HeaplessVec::new();

    indicator.set_ready(true);

    while responses.len() < params.target_count {
        let now = clock.now();
        let sample = sensor.sample();
        let was_armed = collector.is_armed();

        match collector.poll(now, sample) {
            PollOutcome::Waiting => {
                if was_armed && !collector.is_armed() {
                    indicator.set_ready(false);
                    observer.detect_armed(now);
                }
            }
            PollOutcome::Tap(at) => {
                // The clamp guarantees capacity for target_count pushes.
                if responses.push(at).is_err() {
                    break;
                }
                observer.tap_recorded(responses.len(), at);
                if responses.len() < params.target_count {
                    collector.rearm(now);
                    indicator.set_ready(true);
                }
            }
            PollOutcome::DeadlineExpired => {
                observer.deadline_expired(now);
                break;
            }
        }
    }

    indicator.set_ready(false);

    Trial {
        params: *params,
        started_at,
        responses,
    }
}
