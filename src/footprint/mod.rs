// Footprint hashing for the binary differ.
//
// This module provides:
// - Differ configuration with validated ranges
// - The Karp-Rabin rolling footprint hash
// - The fixed-size footprint table tagged by stream side

pub mod config;
pub mod rolling;
pub mod table;

pub use config::DiffOptions;
pub use rolling::Footprint;
pub use table::{FootprintTable, Side, Slot};
