//! Weighted multi-phase progress.
//!
//! Overall progress is a weighted sum of per-phase completion ratios. Phases
//! run in order and never overlap.

use tracing::debug;

/// Export phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Decoding images and loading audio.
    Media,
    /// Flattening entity animations.
    Animations,
    /// Encoding sheets and writing the container.
    Write,
}

impl Phase {
    /// Share of overall progress covered by this phase.
    pub fn weight(self) -> f64 {
        match self {
            Phase::Media => 0.30,
            Phase::Animations => 0.69,
            Phase::Write => 0.01,
        }
    }

    /// Combined weight of all phases before this one.
    pub fn start(self) -> f64 {
        match self {
            Phase::Media => 0.0,
            Phase::Animations => Phase::Media.weight(),
            Phase::Write => Phase::Media.weight() + Phase::Animations.weight(),
        }
    }
}

/// Overall percentage after `done` of `total` units of `phase`.
///
/// A phase with no units counts as complete.
pub fn overall_percent(phase: Phase, done: usize, total: usize) -> u8 {
    let ratio = if total == 0 {
        1.0
    } else {
        (done.min(total) as f64) / (total as f64)
    };
    let percent = (100.0 * (phase.start() + phase.weight() * ratio)).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Forwards progress to a sink, never going backwards.
///
/// Checkpoints may repeat the previous value.
pub struct ProgressReporter<'a> {
    sink: Box<dyn FnMut(u8) + 'a>,
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: impl FnMut(u8) + 'a) -> Self {
        Self {
            sink: Box::new(sink),
            last: 0,
        }
    }

    /// A reporter that discards everything.
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Last emitted percentage.
    pub fn last(&self) -> u8 {
        self.last
    }

    /// Report a checkpoint within a phase.
    pub fn report(&mut self, phase: Phase, done: usize, total: usize) {
        self.emit(overall_percent(phase, done, total));
    }

    /// Report the end of the export.
    pub fn complete(&mut self) {
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        let percent = percent.max(self.last);
        self.last = percent;
        debug!(percent, "progress");
        (self.sink)(percent);
    }
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("last", &self.last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_weights_sum_to_one() {
        let total = Phase::Media.weight() + Phase::Animations.weight() + Phase::Write.weight();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overall_percent() {
        assert_eq!(overall_percent(Phase::Media, 0, 10), 0);
        assert_eq!(overall_percent(Phase::Media, 5, 10), 15);
        assert_eq!(overall_percent(Phase::Media, 10, 10), 30);
        assert_eq!(overall_percent(Phase::Animations, 1, 4), 47);
        assert_eq!(overall_percent(Phase::Animations, 2, 2), 99);
        assert_eq!(overall_percent(Phase::Write, 1, 1), 100);
    }

    #[test]
    fn test_empty_phase_is_complete() {
        assert_eq!(overall_percent(Phase::Media, 0, 0), 30);
        assert_eq!(overall_percent(Phase::Animations, 0, 0), 99);
    }

    #[test]
    fn test_reporter_is_monotonic() {
        let mut seen = Vec::new();
        {
            let mut reporter = ProgressReporter::new(|p| seen.push(p));
            reporter.report(Phase::Animations, 1, 4);
            reporter.report(Phase::Media, 1, 10);
            reporter.report(Phase::Animations, 1, 4);
            reporter.complete();
        }
        assert_eq!(seen, vec![47, 47, 47, 100]);
    }
}
