/// Idle time after which the user is treated as away, in seconds.
pub const DEFAULT_AFK_THRESHOLD_SECONDS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy)]
pub struct AfkEvaluator {
    threshold_ms: u32,
}

impl AfkEvaluator {
    pub fn from_seconds(threshold_s: u32) -> Self {
        Self {
            threshold_ms: threshold_s.saturating_mul(1000),
        }
    }

    pub fn is_afk(&self, idle_ms: u32) -> bool {
        self.threshold_ms < idle_ms
    }
}

impl Default for AfkEvaluator {
    fn default() -> Self {
        Self::from_seconds(DEFAULT_AFK_THRESHOLD_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::AfkEvaluator;

    #[test]
    fn threshold_is_exclusive() {
        let afk = AfkEvaluator::default();
        assert!(!afk.is_afk(0));
        assert!(!afk.is_afk(300_000));
        assert!(afk.is_afk(300_001));
    }

    #[test]
    fn wrapped_counter_values_are_just_large_idle_times() {
        assert!(AfkEvaluator::from_seconds(1).is_afk(u32::MAX));
    }
}
