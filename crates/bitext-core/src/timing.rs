//! Scoped timing of matching and alignment work.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Accumulated durations per named section.
#[derive(Debug, Default)]
pub struct Timings {
    sections: Mutex<BTreeMap<&'static str, Vec<Duration>>>,
}

/// Total time spent in one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTiming {
    pub section: &'static str,
    pub calls: usize,
    pub total: Duration,
}

impl fmt::Display for SectionTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.3}s over {} call(s)",
            self.section,
            self.total.as_secs_f64(),
            self.calls
        )
    }
}

impl Timings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing `section`; the elapsed time is recorded when the
    /// returned guard is dropped or finished.
    #[must_use]
    pub fn start(&self, section: &'static str) -> ScopedTimer<'_> {
        ScopedTimer {
            timings: self,
            section,
            started: Instant::now(),
        }
    }

    /// Records a duration directly.
    pub fn record(&self, section: &'static str, elapsed: Duration) {
        self.lock().entry(section).or_default().push(elapsed);
    }

    /// Per-section totals, ordered by section name.
    #[must_use]
    pub fn summary(&self) -> Vec<SectionTiming> {
        self.lock()
            .iter()
            .map(|(&section, durations)| SectionTiming {
                section,
                calls: durations.len(),
                total: durations.iter().sum(),
            })
            .collect()
    }

    /// Logs every section total at info level.
    pub fn log_summary(&self) {
        for timing in self.summary() {
            info!(
                section = timing.section,
                calls = timing.calls,
                seconds = timing.total.as_secs_f64(),
                "time spent"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<&'static str, Vec<Duration>>> {
        self.sections.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Guard returned by [`Timings::start`].
pub struct ScopedTimer<'a> {
    timings: &'a Timings,
    section: &'static str,
    started: Instant,
}

impl ScopedTimer<'_> {
    /// Stops the timer and logs the duration together with an outcome.
    pub fn finish(self, outcome: impl fmt::Display) -> Duration {
        let elapsed = self.started.elapsed();
        info!(
            section = self.section,
            %outcome,
            seconds = elapsed.as_secs_f64(),
            "finished"
        );
        // Drop records the duration.
        elapsed
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        debug!(section = self.section, seconds = elapsed.as_secs_f64(), "timer stopped");
        self.timings.record(self.section, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_accumulate_per_section() {
        let timings = Timings::new();
        {
            let _t = timings.start("align_chapter");
        }
        timings.start("align_chapter").finish("aligned");
        timings.start("match_chapters").finish("3 matched");

        let summary = timings.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].section, "align_chapter");
        assert_eq!(summary[0].calls, 2);
        assert_eq!(summary[1].section, "match_chapters");
        assert_eq!(summary[1].calls, 1);
    }

    #[test]
    fn record_adds_durations() {
        let timings = Timings::new();
        timings.record("x", Duration::from_millis(5));
        timings.record("x", Duration::from_millis(7));
        let summary = timings.summary();
        assert_eq!(summary[0].total, Duration::from_millis(12));
        assert!(summary[0].to_string().starts_with("x: 0.012s"));
    }
}
