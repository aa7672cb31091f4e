//! Inbound trial-parameter protocol.
//!
//! A trial request is two ASCII-decimal integers, in order target response
//! count then time limit in milliseconds, each terminated by any non-digit
//! byte. There is no other framing. [`ParamReader`] accumulates bytes from
//! the transport and re-runs the `winnow` grammar until it completes; stale
//! bytes ahead of the first digit are discarded.

use core::fmt;

use heapless::Vec as HeaplessVec;
use winnow::Partial;
use winnow::ascii::digit1;
use winnow::combinator::preceded;
use winnow::error::{EmptyError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_till};

use crate::MAX_RESPONSES;

/// Upper bound on buffered request bytes: two full `u32` literals, their
/// terminators, and inter-field noise.
const MAX_REQUEST_BYTES: usize = 40;

/// Trial parameters exactly as parsed from the transport, pre-clamp.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TrialRequest {
    pub target_count: u32,
    pub time_limit_ms: u32,
}

impl TrialRequest {
    /// Clamps the target count to [`MAX_RESPONSES`] and converts the limit to
    /// microseconds. The clamp is silent: over-capacity requests are
    /// corrected, never rejected.
    #[must_use]
    pub fn clamp(self) -> TrialParams {
        let requested = usize::try_from(self.target_count).unwrap_or(usize::MAX);
        TrialParams {
            target_count: requested.min(MAX_RESPONSES),
            time_limit_ms: self.time_limit_ms,
            time_limit_us: self.time_limit_ms.saturating_mul(1_000),
        }
    }
}

/// Effective per-trial parameters, immutable once captured.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TrialParams {
    /// Number of responses to collect, already clamped to capacity.
    pub target_count: usize,
    /// Time limit as requested by the host, echoed back in the report.
    pub time_limit_ms: u32,
    /// Time limit in the clock domain's unit.
    pub time_limit_us: u32,
}

/// Error surfaced when parsing a complete request buffer.
///
/// The grammar skips leading junk and accepts any non-digit byte as a
/// terminator, so every byte sequence is a prefix of some valid request;
/// the only possible failure is the buffer ending before both integers and
/// their terminators arrived.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IncompleteRequest;

impl fmt::Display for IncompleteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request truncated before both integers")
    }
}

type Stream<'i> = Partial<&'i [u8]>;

/// Digits folded with saturation. No upper bound is enforced while parsing;
/// the clamp happens in [`TrialRequest::clamp`].
fn fold_digits(digits: &[u8]) -> u32 {
    digits.iter().fold(0u32, |acc, byte| {
        acc.saturating_mul(10).saturating_add(u32::from(byte - b'0'))
    })
}

fn integer<'i>(input: &mut Stream<'i>) -> ModalResult<u32, EmptyError> {
    preceded(
        take_till(0.., |byte: u8| byte.is_ascii_digit()),
        digit1.map(fold_digits),
    )
    .parse_next(input)
}

fn terminator(input: &mut Stream<'_>) -> ModalResult<(), EmptyError> {
    one_of(|byte: u8| !byte.is_ascii_digit())
        .void()
        .parse_next(input)
}

fn trial_request(input: &mut Stream<'_>) -> ModalResult<TrialRequest, EmptyError> {
    let target_count = integer(input)?;
    terminator(input)?;
    let time_limit_ms = integer(input)?;
    terminator(input)?;
    Ok(TrialRequest {
        target_count,
        time_limit_ms,
    })
}

/// Parses one complete request from `bytes`, ignoring leading non-digits.
pub fn parse_trial_request(bytes: &[u8]) -> Result<TrialRequest, IncompleteRequest> {
    let mut input = Stream::new(bytes);
    trial_request(&mut input).map_err(|_| IncompleteRequest)
}

/// Incremental reader fed one transport byte at a time.
///
/// Returns the completed request from [`push`](Self::push) as soon as the
/// second terminator byte arrives, then rearms for the next trial. The
/// transport's own timeout policy covers streams that never terminate.
#[derive(Clone, Debug, Default)]
pub struct ParamReader {
    buffer: HeaplessVec<u8, MAX_REQUEST_BYTES>,
}

impl ParamReader {
    /// Creates a reader with an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: HeaplessVec::new(),
        }
    }

    /// Discards any partially accumulated request.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Feeds one byte, returning the request once it completes.
    pub fn push(&mut self, byte: u8) -> Option<TrialRequest> {
        if self.buffer.is_empty() && !byte.is_ascii_digit() {
            // Stale input ahead of the request is discarded.
            return None;
        }

        if self.buffer.push(byte).is_err() {
            // Degenerate input overran the frame buffer; treat it as stale.
            self.buffer.clear();
            return None;
        }

        let mut input = Stream::new(self.buffer.as_slice());
        match trial_request(&mut input) {
            Ok(request) => {
                self.buffer.clear();
                Some(request)
            }
            Err(ErrMode::Incomplete(_)) => None,
            Err(_) => {
                self.buffer.clear();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(reader: &mut ParamReader, bytes: &[u8]) -> Option<TrialRequest> {
        bytes.iter().find_map(|&byte| reader.push(byte))
    }

    #[test]
    fn parses_comma_terminated_pair() {
        let request = parse_trial_request(b"3,500,").expect("request should parse");
        assert_eq!(request.target_count, 3);
        assert_eq!(request.time_limit_ms, 500);
    }

    #[test]
    fn truncated_pair_reports_incomplete() {
        assert_eq!(parse_trial_request(b"3,500"), Err(IncompleteRequest));
        assert_eq!(parse_trial_request(b"3,"), Err(IncompleteRequest));
    }

    #[test]
    fn digit_free_buffer_is_an_unfinished_prefix() {
        // Junk is skipped, never rejected: a buffer with no digits at all is
        // just a request whose integers have not arrived yet.
        assert_eq!(parse_trial_request(b"hello\r\n"), Err(IncompleteRequest));
        assert_eq!(parse_trial_request(b""), Err(IncompleteRequest));
    }

    #[test]
    fn reader_completes_on_second_terminator() {
        let mut reader = ParamReader::new();
        let request = feed(&mut reader, b"10 2000\n").expect("request should complete");
        assert_eq!(request.target_count, 10);
        assert_eq!(request.time_limit_ms, 2_000);
    }

    #[test]
    fn reader_discards_stale_leading_bytes() {
        let mut reader = ParamReader::new();
        let request = feed(&mut reader, b"garbage\r\n7;250;").expect("request should complete");
        assert_eq!(request.target_count, 7);
        assert_eq!(request.time_limit_ms, 250);
    }

    #[test]
    fn reader_rearms_after_each_request() {
        let mut reader = ParamReader::new();
        let first = feed(&mut reader, b"1,100,").expect("first request");
        let second = feed(&mut reader, b"2,200,").expect("second request");
        assert_eq!(first.target_count, 1);
        assert_eq!(second.target_count, 2);
    }

    #[test]
    fn oversized_digit_run_saturates() {
        let request =
            parse_trial_request(b"99999999999999999999,100,").expect("request should parse");
        assert_eq!(request.target_count, u32::MAX);
    }

    #[test]
    fn clamp_bounds_target_and_converts_limit() {
        let params = TrialRequest {
            target_count: 5_000,
            time_limit_ms: 750,
        }
        .clamp();
        assert_eq!(params.target_count, MAX_RESPONSES);
        assert_eq!(params.time_limit_ms, 750);
        assert_eq!(params.time_limit_us, 750_000);
    }

    #[test]
    fn clamp_preserves_in_range_requests() {
        let params = TrialRequest {
            target_count: 3,
            time_limit_ms: 500,
        }
        .clamp();
        assert_eq!(params.target_count, 3);
        assert_eq!(params.time_limit_us, 500_000);
    }
}
