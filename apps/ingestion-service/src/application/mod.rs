//! Application Layer
//!
//! Use cases that drive a payload from raw bytes to committed rows, and the
//! ports through which they reach the store.

pub mod ports;
pub mod use_cases;

pub use ports::*;
pub use use_cases::*;
