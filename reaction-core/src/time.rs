//! Wrap-tolerant timestamp arithmetic over a free-running microsecond counter.
//!
//! The counter wraps at 2^32, so absolute readings must never be compared
//! with `<`/`>`. The only legal operation between two timestamps is
//! [`Timestamp::elapsed_since`], which stays correct as long as the two
//! readings are separated by at most one full wrap.

/// Absolute reading from the monotonic microsecond counter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Timestamp(u32);

impl Timestamp {
    /// Wraps a raw counter reading.
    #[must_use]
    pub const fn from_micros(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value, as reported to the host.
    #[must_use]
    pub const fn as_micros(self) -> u32 {
        self.0
    }

    /// Microseconds elapsed since `earlier`, modulo the counter width.
    ///
    /// Correct across exactly one wrap; callers guarantee the two readings
    /// are never more than one wrap apart.
    #[must_use]
    pub const fn elapsed_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Source of [`Timestamp`] readings.
///
/// Firmware backs this with the embassy time driver, the emulator with a
/// virtual counter, and tests with scripted sequences.
pub trait Clock {
    /// Samples the current counter value.
    fn now(&mut self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Timestamp {
        (**self).now()
    }
}
