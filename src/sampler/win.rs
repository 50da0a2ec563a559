use anyhow::{Result, anyhow};
use tracing::{debug, error};
use windows::Win32::{
    System::SystemInformation::GetTickCount,
    UI::{
        Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO},
        WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW},
    },
};

use super::{ActivitySampler, idle_since};

#[tracing::instrument]
pub fn get_foreground_title() -> Result<String> {
    let window = unsafe { GetForegroundWindow() };

    // Happens on the lock screen and while focus is switching.
    if window.is_invalid() {
        debug!("No foreground window");
        return Ok(String::new());
    }

    let mut text: [u16; 4096] = [0; 4096];
    let len = unsafe { GetWindowTextW(window, &mut text) };
    Ok(String::from_utf16_lossy(&text[..len.max(0) as usize]))
}

/// Reads the idle time using the 32-bit tick counter, the same width `LASTINPUTINFO::dwTime` is
/// stored in.
pub fn get_idle_time() -> Result<u32> {
    let mut last: LASTINPUTINFO = LASTINPUTINFO {
        cbSize: size_of::<LASTINPUTINFO>() as u32,
        dwTime: 0,
    };
    let is_success = unsafe { GetLastInputInfo(&mut last) };
    if !is_success.as_bool() {
        return Err(anyhow!("Failed to retrieve user idle time"));
    }

    let tick_count = unsafe { GetTickCount() };
    Ok(idle_since(tick_count, last.dwTime))
}

pub struct WindowsSampler {}

impl WindowsSampler {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivitySampler for WindowsSampler {
    fn foreground_window_title(&mut self) -> Result<String> {
        get_foreground_title().inspect_err(|e| error!("Failed to get foreground window {e:?}"))
    }

    fn idle_time(&mut self) -> Result<u32> {
        get_idle_time().inspect_err(|e| error!("Failed to get idle time {e:?}"))
    }
}
