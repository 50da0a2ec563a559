//! Background tracker that decides whether a user is working or on a break from idle time and
//! the foreground window, and keeps a remote store of time entries and window usage up to date.
//!

pub mod daemon;
pub mod sampler;
pub mod utils;
