use embassy_stm32::usart::BufferedUart;
use embassy_time::{Duration, Timer};
use embedded_io::ReadReady;
use embedded_io_async::{Read, Write};

use reaction_core::collector::collect_responses;
use reaction_core::params::{ParamReader, TrialRequest};
use reaction_core::report::report_line;
use reaction_core::sensor::Indicator;
use reaction_core::time::Clock;

use crate::calibration::SENSOR_CALIBRATION;
use crate::hw::{AdcSensor, DefmtObserver, McuClock, ReadyLed};
use crate::link::{self, READ_CHUNK};

/// Runs trials forever: read parameters, collect responses, report.
///
/// One trial per loop iteration; nothing except the capacity constant is
/// carried between iterations.
#[embassy_executor::task]
pub async fn run(
    uart: BufferedUart<'static>,
    mut sensor: AdcSensor<'static>,
    mut indicator: ReadyLed<'static>,
) -> ! {
    let (mut tx, mut rx) = uart.split();
    let mut clock = McuClock;
    let mut observer = DefmtObserver;

    loop {
        // Ready for the operator while the host decides on parameters.
        indicator.set_ready(true);
        let request = read_request(&mut rx).await;
        let params = request.clamp();
        defmt::info!(
            "trial: target={=usize} limit={=u32}ms",
            params.target_count,
            params.time_limit_ms
        );

        let trial = collect_responses(
            &params,
            SENSOR_CALIBRATION,
            &mut clock,
            &mut sensor,
            &mut indicator,
            &mut observer,
        );

        let line = report_line(&trial, clock.now());
        send_report(&mut tx, line.as_bytes()).await;
    }
}

/// Pumps transport bytes into a fresh [`ParamReader`] until a request
/// completes. Anything still buffered from before this trial is drained
/// first; leading non-digit noise within the request is discarded by the
/// reader itself.
async fn read_request<R: Read + ReadReady>(rx: &mut R) -> TrialRequest {
    link::drain_stale(rx).await;

    let mut reader = ParamReader::new();
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match rx.read(&mut chunk).await {
            Ok(count) if count > 0 => {
                for &byte in &chunk[..count] {
                    if let Some(request) = reader.push(byte) {
                        return request;
                    }
                }
            }
            Ok(_) => {}
            Err(_) => {
                defmt::warn!("serial: read error");
                Timer::after(Duration::from_millis(5)).await;
            }
        }
    }
}

async fn send_report<W: Write>(tx: &mut W, data: &[u8]) {
    let mut written = 0usize;

    while written < data.len() {
        match tx.write(&data[written..]).await {
            Ok(count) if count > 0 => {
                written += count;
            }
            Ok(_) => {}
            Err(_) => {
                defmt::warn!("serial: write error");
                Timer::after(Duration::from_millis(5)).await;
                return;
            }
        }
    }

    if tx.flush().await.is_err() {
        defmt::warn!("serial: flush error");
    }
}
