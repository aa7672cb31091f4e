//! Adapters that bridge the MCU peripherals with `reaction-core`.
//!
//! The collector only sees the core traits; everything STM32-specific lives
//! here. The analog pad and the digital tap inputs are combined into one
//! [`Sensor`], the ready LED implements [`Indicator`], and trial progress is
//! routed to `defmt` through [`DefmtObserver`].

use embassy_stm32::Peri;
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Input, Output};
use embassy_stm32::peripherals::{ADC1, PA0};
use embassy_time::Instant;

use reaction_core::sensor::{Indicator, Sensor, SensorSample, TrialObserver};
use reaction_core::time::{Clock, Timestamp};

/// Number of digital tap inputs wired on the board.
pub const SWITCH_INPUTS: usize = 2;

/// Clock over the embassy time driver.
///
/// The report protocol carries 32-bit microsecond values, so readings are
/// truncated to the low word; elapsed-time arithmetic in the core tolerates
/// the resulting wrap.
pub struct McuClock;

impl Clock for McuClock {
    fn now(&mut self) -> Timestamp {
        #[allow(clippy::cast_possible_truncation)]
        Timestamp::from_micros(Instant::now().as_micros() as u32)
    }
}

/// Tap sensor: one ADC channel plus the digital switch inputs.
pub struct AdcSensor<'d> {
    adc: Adc<'d, ADC1>,
    analog: Peri<'d, PA0>,
    switches: [Input<'d>; SWITCH_INPUTS],
}

impl<'d> AdcSensor<'d> {
    /// Wraps the configured ADC and input pins.
    pub fn new(
        adc: Adc<'d, ADC1>,
        analog: Peri<'d, PA0>,
        switches: [Input<'d>; SWITCH_INPUTS],
    ) -> Self {
        Self {
            adc,
            analog,
            switches,
        }
    }
}

impl Sensor for AdcSensor<'_> {
    fn sample(&mut self) -> SensorSample {
        // Digital inputs first; the collector checks them ahead of the
        // analog comparison.
        let switch_active = self.switches.iter().any(Input::is_high);
        let level = self.adc.blocking_read(&mut self.analog);
        SensorSample::new(level, switch_active)
    }
}

/// Ready LED driven while waiting for parameters and during each debounce
/// phase.
pub struct ReadyLed<'d> {
    output: Output<'d>,
}

impl<'d> ReadyLed<'d> {
    /// Wraps the configured LED output.
    pub fn new(output: Output<'d>) -> Self {
        Self { output }
    }
}

impl Indicator for ReadyLed<'_> {
    fn set_ready(&mut self, on: bool) {
        if on {
            self.output.set_high();
        } else {
            self.output.set_low();
        }
    }
}

/// Trial observer backed by `defmt`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefmtObserver;

impl TrialObserver for DefmtObserver {
    fn detect_armed(&mut self, at: Timestamp) {
        defmt::debug!("trial: detection armed at {=u32}us", at.as_micros());
    }

    fn tap_recorded(&mut self, index: usize, at: Timestamp) {
        defmt::info!("trial: tap {=usize} at {=u32}us", index, at.as_micros());
    }

    fn deadline_expired(&mut self, at: Timestamp) {
        defmt::info!("trial: deadline expired at {=u32}us", at.as_micros());
    }
}
