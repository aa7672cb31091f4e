//! Board calibration for the tap sensor circuit.
//!
//! These values are tied to the specific sensor and divider fitted on the
//! current board revision and have changed with past rework. They are data
//! handed to the collector, not invariants of the detection logic.

#![allow(dead_code)]

use reaction_core::collector::CollectorConfig;

/// ADC reading at or above which a tap registers.
pub const TAP_HIGH_THRESHOLD: u16 = 300;

/// ADC reading at or above which the debounce window restarts.
pub const SETTLE_LOW_THRESHOLD: u16 = 25;

/// Uninterrupted quiet interval required before detection arms.
pub const DEBOUNCE_US: u32 = 60_000;

/// Collector configuration for the fitted sensor.
pub const SENSOR_CALIBRATION: CollectorConfig =
    CollectorConfig::new(TAP_HIGH_THRESHOLD, SETTLE_LOW_THRESHOLD, DEBOUNCE_US);

/// Serial link rate to the experiment host.
pub const HOST_UART_BAUD: u32 = 115_200;
