//! Utility functions module
//!
//! Signal handling and countdown display helpers shared by the API and state layers.

pub mod signals;
pub mod time_format;

// Re-export main functions
pub use signals::shutdown_signal;
pub use time_format::{format_duration, format_time, parse_time};
