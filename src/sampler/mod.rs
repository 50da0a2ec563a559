//! Contains logic for sampling user activity from different environments.
//! [SamplerAdapter] is the main artifact of this module: it turns the fallible platform
//! queries of an [ActivitySampler] into a [SampleOutcome] that never fails.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::sync::Arc;

use anyhow::Result;
#[cfg(test)]
use mockall::automock;

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, automock)]
pub trait ActivitySampler {
    /// Title of the foreground window. For example 'Drawing1.dwg - AutoCAD 2024'. Empty when no
    /// window has focus.
    fn foreground_window_title(&mut self) -> Result<String>;

    /// Retrieve amount of time user has been inactive in milliseconds
    fn idle_time(&mut self) -> Result<u32>;
}

/// Milliseconds elapsed between two readings of a 32-bit millisecond tick counter.
///
/// Platform counters wrap around (every ~49.7 days for `GetTickCount`), so the difference is
/// taken modulo 2^32. A last-input tick taken just before the wrap and a current tick taken just
/// after it still produce the small, correct value.
pub fn idle_since(now_tick: u32, last_input_tick: u32) -> u32 {
    now_tick.wrapping_sub(last_input_tick)
}

/// One reading of user activity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sample {
    pub idle_ms: u32,
    pub window_title: Arc<str>,
}

/// Result of a single sampling attempt. Failed platform queries degrade to zero idle time and an
/// empty title, the reasons are kept so the caller can report them.
#[derive(Debug)]
pub enum SampleOutcome {
    Complete(Sample),
    Degraded {
        sample: Sample,
        reasons: Vec<anyhow::Error>,
    },
}

impl SampleOutcome {
    pub fn sample(&self) -> &Sample {
        match self {
            SampleOutcome::Complete(sample) => sample,
            SampleOutcome::Degraded { sample, .. } => sample,
        }
    }

    pub fn into_sample(self) -> Sample {
        match self {
            SampleOutcome::Complete(sample) => sample,
            SampleOutcome::Degraded { sample, .. } => sample,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SampleOutcome::Degraded { .. })
    }
}

/// Wraps a platform [ActivitySampler]. Holds no state of its own.
pub struct SamplerAdapter {
    inner: Box<dyn ActivitySampler>,
}

impl SamplerAdapter {
    pub fn new(inner: Box<dyn ActivitySampler>) -> Self {
        Self { inner }
    }

    pub fn sample(&mut self) -> SampleOutcome {
        let mut reasons = vec![];

        let idle_ms = self.inner.idle_time().unwrap_or_else(|e| {
            reasons.push(e.context("Failed to query idle time"));
            0
        });
        let window_title = self.inner.foreground_window_title().unwrap_or_else(|e| {
            reasons.push(e.context("Failed to query foreground window"));
            String::new()
        });

        let sample = Sample {
            idle_ms,
            window_title: window_title.into(),
        };
        if reasons.is_empty() {
            SampleOutcome::Complete(sample)
        } else {
            SampleOutcome::Degraded { sample, reasons }
        }
    }
}

/// Serves as a cross-compatible ActivitySampler implementation.
pub struct GenericSampler {
    inner: Box<dyn ActivitySampler>,
}

impl GenericSampler {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsSampler;
                Ok(Self {
                    inner: Box::new(WindowsSampler::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::X11Sampler;
                Ok(Self {
                    inner: Box::new(X11Sampler::new()?),
                })
            }
            else {
                Err(anyhow::anyhow!(
                    "No activity sampler backend was compiled in, enable the `win` or `x11` feature"
                ))
            }
        }
    }
}

impl ActivitySampler for GenericSampler {
    fn foreground_window_title(&mut self) -> Result<String> {
        self.inner.foreground_window_title()
    }

    fn idle_time(&mut self) -> Result<u32> {
        self.inner.idle_time()
    }
}
