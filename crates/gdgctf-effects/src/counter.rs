//! Hero stat counters that count up to their target once.

/// Frames a counter takes to reach its target.
const FRAMES_TO_TARGET: f64 = 120.0;

/// Smallest increment per frame, so tiny targets still finish.
const MIN_STEP: f64 = 0.1;

/// Count-up animation for a single `data-count` value.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAnimation {
    target: f64,
    current: f64,
    step: f64,
    done: bool,
}

impl CounterAnimation {
    /// Parses a raw `data-count` attribute. Unparseable or non-finite
    /// values render as `0` on the first frame.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.trim().parse().unwrap_or(f64::NAN))
    }

    pub fn new(target: f64) -> Self {
        Self {
            target,
            current: 0.0,
            step: (target / FRAMES_TO_TARGET).max(MIN_STEP),
            done: false,
        }
    }

    /// Text for the next frame, or `None` once the target was shown.
    pub fn next_frame(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        if !self.target.is_finite() {
            self.done = true;
            return Some("0".to_string());
        }

        self.current += self.step;
        if self.current < self.target {
            Some((self.current.floor() as i64).to_string())
        } else {
            self.done = true;
            Some(self.target.to_string())
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Starts the page's counters at most once.
///
/// Both the visibility observer and the fallback timer try to start the
/// counters; whichever fires second gets `None`.
#[derive(Debug, Default)]
pub struct StatCounters {
    started: bool,
}

impl StatCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<'a, I>(&mut self, raw_targets: I) -> Option<Vec<CounterAnimation>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.started {
            return None;
        }
        let counters: Vec<CounterAnimation> =
            raw_targets.into_iter().map(CounterAnimation::parse).collect();
        if counters.is_empty() {
            return None;
        }
        self.started = true;
        tracing::debug!(count = counters.len(), "stat counters started");
        Some(counters)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(mut counter: CounterAnimation) -> Vec<String> {
        std::iter::from_fn(|| counter.next_frame()).collect()
    }

    #[test]
    fn test_counter_ends_on_exact_target() {
        let frames = run_to_end(CounterAnimation::new(500.0));
        assert_eq!(frames.len(), 120);
        assert_eq!(frames.last().map(String::as_str), Some("500"));
        assert_eq!(frames[0], "4");
    }

    #[test]
    fn test_counter_small_target_uses_min_step() {
        let frames = run_to_end(CounterAnimation::new(1.0));
        // 0.1 accumulates below 1.0 after ten steps.
        assert_eq!(frames.len(), 11);
        assert_eq!(frames[0], "0");
        assert_eq!(frames.last().map(String::as_str), Some("1"));
    }

    #[test]
    fn test_counter_invalid_target_renders_zero_once() {
        let frames = run_to_end(CounterAnimation::parse("lots"));
        assert_eq!(frames, vec!["0".to_string()]);
    }

    #[test]
    fn test_stat_counters_start_only_once() {
        let mut counters = StatCounters::new();
        let first = counters.start(["50", "1200"]);
        assert_eq!(first.map(|c| c.len()), Some(2));
        assert!(counters.start(["50"]).is_none());
        assert!(counters.is_started());
    }

    #[test]
    fn test_stat_counters_without_targets_do_not_latch() {
        let mut counters = StatCounters::new();
        assert!(counters.start(std::iter::empty()).is_none());
        assert!(!counters.is_started());
    }
}
