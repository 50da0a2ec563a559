//! Everything between the platform sampler and the session: deciding whether the user is away and
//! driving ticks at a fixed cadence.

pub mod afk;
pub mod poll_loop;
