//! Host-link transport helpers shared by the trial task.

#![allow(dead_code)]

use embedded_io::ReadReady;
use embedded_io_async::Read;

/// Transport read granularity.
pub const READ_CHUNK: usize = 16;

/// Discards every byte the transport has already buffered.
///
/// Run before accumulating a request: leftover digits from an aborted
/// request would otherwise be concatenated into the next request's first
/// integer.
pub async fn drain_stale<R: Read + ReadReady>(rx: &mut R) {
    let mut chunk = [0u8; READ_CHUNK];
    while rx.read_ready().unwrap_or(false) {
        match rx.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use reaction_core::params::ParamReader;

    /// Reader over a fixed byte buffer, ready until the buffer is consumed.
    struct StaleBuffer {
        data: &'static [u8],
        pos: usize,
    }

    impl StaleBuffer {
        fn new(data: &'static [u8]) -> Self {
            Self { data, pos: 0 }
        }
    }

    impl embedded_io::ErrorType for StaleBuffer {
        type Error = core::convert::Infallible;
    }

    impl ReadReady for StaleBuffer {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(self.pos < self.data.len())
        }
    }

    impl Read for StaleBuffer {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let count = buf.len().min(self.data.len() - self.pos);
            buf[..count].copy_from_slice(&self.data[self.pos..self.pos + count]);
            self.pos += count;
            Ok(count)
        }
    }

    #[test]
    fn drains_every_buffered_byte() {
        let mut rx = StaleBuffer::new(b"12junk 99 leftover from a dead host session");
        block_on(drain_stale(&mut rx));
        assert_eq!(rx.read_ready(), Ok(false));
    }

    #[test]
    fn stale_digits_do_not_reach_the_next_request() {
        // An aborted "12" sits in the buffer; without the drain it would
        // concatenate into the next target count as "123".
        let mut rx = StaleBuffer::new(b"12");
        block_on(drain_stale(&mut rx));
        assert_eq!(rx.read_ready(), Ok(false));

        let mut reader = ParamReader::new();
        let request = b"3,500,"
            .iter()
            .find_map(|&byte| reader.push(byte))
            .expect("request should complete");
        assert_eq!(request.target_count, 3);
        assert_eq!(request.time_limit_ms, 500);
    }
}
