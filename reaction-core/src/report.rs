//! Outbound result record.
//!
//! One space-separated line the host parses positionally: target count, time
//! limit in milliseconds, trial start timestamp, collected count, each
//! response as trial-relative microseconds, a final timestamp sampled at
//! report time, then the sentinel and a line break. Pure formatting; every
//! decision was made by the collector.

use core::fmt::{self, Write};

use heapless::String as HeaplessString;

use crate::MAX_RESPONSES;
use crate::collector::Trial;
use crate::time::Timestamp;

/// Terminator the host scans for at the end of each record.
pub const REPORT_SENTINEL: char = '.';

/// Worst case: five u32 header/footer fields plus `MAX_RESPONSES` relative
/// values, all space-separated, plus sentinel and newline.
pub const MAX_REPORT_LEN: usize = (5 + MAX_RESPONSES) * 11 + 2;

/// Bounded buffer holding one formatted record.
pub type ReportLine = HeaplessString<MAX_REPORT_LEN>;

/// Writes the record for `trial` to `out`.
///
/// `ended_at` is the absolute timestamp sampled when reporting begins.
pub fn write_report<W: Write>(out: &mut W, trial: &Trial, ended_at: Timestamp) -> fmt::Result {
    write!(
        out,
        "{} {} {} {}",
        trial.params.target_count,
        trial.params.time_limit_ms,
        trial.started_at.as_micros(),
        trial.collected(),
    )?;

    for response in &trial.responses {
        write!(out, " {}", response.elapsed_since(trial.started_at))?;
    }

    writeln!(out, " {}{REPORT_SENTINEL}", ended_at.as_micros())
}

/// Formats the record into an owned [`ReportLine`].
///
/// The buffer is sized for the worst-case record, so formatting cannot
/// overflow it.
#[must_use]
pub fn report_line(trial: &Trial, ended_at: Timestamp) -> ReportLine {
    let mut line = ReportLine::new();
    // Infallible: MAX_REPORT_LEN covers the longest possible record.
    let _ = write_report(&mut line, trial, ended_at);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TrialRequest;

    fn trial_with(responses: &[u32], start: u32) -> Trial {
        let params = TrialRequest {
            target_count: u32::try_from(responses.len().max(1)).expect("test count fits"),
            time_limit_ms: 500,
        }
        .clamp();

        let mut trial = Trial {
            params,
            started_at: Timestamp::from_micros(start),
            responses: heapless::Vec::new(),
        };
        for &offset in responses {
            trial
                .responses
                .push(Timestamp::from_micros(start.wrapping_add(offset)))
                .expect("test response capacity");
        }
        trial
    }

    #[test]
    fn formats_fields_in_host_order() {
        let trial = trial_with(&[50_000, 120_000, 300_000], 1_000);
        let line = report_line(&trial, Timestamp::from_micros(400_000));
        assert_eq!(line.as_str(), "3 500 1000 3 50000 120000 300000 400000.\n");
    }

    #[test]
    fn empty_series_still_produces_valid_record() {
        let mut trial = trial_with(&[], 2_000);
        trial.params.target_count = 10;
        let line = report_line(&trial, Timestamp::from_micros(502_000));
        assert_eq!(line.as_str(), "10 500 2000 0 502000.\n");
    }

    #[test]
    fn relative_values_survive_counter_wrap() {
        // Response raw value wraps past zero; the relative field must not.
        let start = u32::MAX - 40_000;
        let trial = trial_with(&[50_000], start);
        let line = report_line(&trial, Timestamp::from_micros(60_000));
        assert_eq!(line.as_str(), "1 500 4294927295 1 50000 60000.\n");
    }
}
