//! Sliding Window
//!
//! Provides an inline, fixed-capacity FIFO used for per-frame history.

mod buffer;

pub use buffer::SlidingWindow;
