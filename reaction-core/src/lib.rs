#![no_std]

// Shared logic for the reaction timer feature set.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library and reaching hardware only through the traits in
// `sensor` and `time`.

pub mod collector;
pub mod params;
pub mod report;
pub mod sensor;
pub mod time;

/// Compile-time upper bound on responses recorded per trial. Requests above
/// it are clamped, never rejected.
pub const MAX_RESPONSES: usize = 256;
