//! Sample-indexed playback over a completed run.
//!
//! [`Playback`] walks the run's sample indices in order. Primary watches
//! decide when a snapshot is due; debounce watches run alongside and emit
//! their own event lines.
//!
//! ```text
//! Idle --resolve--> Resolved --play--> Running --last sample--> Done
//!   ^                                                            |
//!   +---------------------- resolve (next run) ------------------+
//! ```

use spicetb_config::{BenchConfig, DebounceConfig};
use tracing::debug;

use crate::debounce::DebounceWatch;
use crate::error::BenchError;
use crate::levels::LogicLevels;
use crate::report::{ReportSink, Snapshot};
use crate::results::ResultVectors;
use crate::watch::{TimeWatch, VectorWatch};

/// Lifecycle of a playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Watches are configured but not bound to a run.
    Idle,
    /// Every watch has resolved against a run.
    Resolved,
    /// Samples are being evaluated.
    Running,
    /// Every sample of the run has been evaluated.
    Done,
}

/// Counts from one completed playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Sample indices evaluated.
    pub samples: usize,
    /// Snapshot lines emitted.
    pub snapshots: usize,
    /// Debounce event lines emitted.
    pub events: usize,
}

/// Replays a run's result vectors through a set of watches.
pub struct Playback {
    levels: LogicLevels,
    debounce: DebounceConfig,
    time: TimeWatch,
    watches: Vec<VectorWatch>,
    debounce_watches: Vec<DebounceWatch>,
    state: PlaybackState,
}

impl Playback {
    /// Creates an idle playback with no watches.
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            levels: LogicLevels::from_supply(&config.supply),
            debounce: config.debounce,
            time: TimeWatch::new(),
            watches: Vec::new(),
            debounce_watches: Vec::new(),
            state: PlaybackState::Idle,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns the primary watches in the order they were added.
    pub fn watches(&self) -> &[VectorWatch] {
        &self.watches
    }

    /// Returns the time watch.
    pub fn time(&self) -> &TimeWatch {
        &self.time
    }

    /// Watches a single vector under `label`.
    pub fn add_watch(&mut self, label: &str, net: &str) -> Result<(), BenchError> {
        self.add_vector_watch(label, 1, vec![net.to_string()])
    }

    /// Watches `names` as one `width`-bit value, the first name being bit 0.
    pub fn add_vector_watch(
        &mut self,
        label: &str,
        width: u32,
        names: Vec<String>,
    ) -> Result<(), BenchError> {
        let watch = VectorWatch::new(label, width, names, self.levels)?;
        self.watches.push(watch);
        self.state = PlaybackState::Idle;
        Ok(())
    }

    /// Watches the `width` vectors `<prefix><i><suffix>` for
    /// `i in start..start + width`.
    pub fn add_range_watch(
        &mut self,
        label: &str,
        width: u32,
        prefix: &str,
        start: u32,
        suffix: &str,
    ) -> Result<(), BenchError> {
        let end = start
            .checked_add(width)
            .ok_or_else(|| BenchError::InvalidWidth {
                name: label.to_string(),
            })?;
        let names = (start..end)
            .map(|i| format!("{prefix}{i}{suffix}"))
            .collect();
        self.add_vector_watch(label, width, names)
    }

    /// Adds a debounce watch over `net` using the configured band.
    pub fn add_debounce_watch(&mut self, label: &str, net: &str) {
        self.debounce_watches
            .push(DebounceWatch::new(label, net, self.debounce));
        self.state = PlaybackState::Idle;
    }

    /// Binds every watch to a new run.
    pub fn resolve(&mut self, run: &ResultVectors) {
        self.time.resolve(run);
        for watch in &mut self.watches {
            watch.resolve(run);
        }
        for watch in &mut self.debounce_watches {
            watch.resolve(run);
        }
        debug!(
            samples = self.time.sample_count(),
            watches = self.watches.len(),
            debounce = self.debounce_watches.len(),
            "playback resolved"
        );
        self.state = PlaybackState::Resolved;
    }

    /// Evaluates every sample of the resolved run.
    ///
    /// A snapshot (time followed by every primary watch) is emitted at each
    /// index where a primary watch changed. Debounce events are emitted as
    /// they happen. Any fatal error leaves the playback in `Running`.
    pub fn play<R: ReportSink>(
        &mut self,
        run: &ResultVectors,
        sink: &mut R,
    ) -> Result<PlaybackSummary, BenchError> {
        if self.state != PlaybackState::Resolved {
            return Err(BenchError::NotResolved);
        }
        self.state = PlaybackState::Running;
        let mut summary = PlaybackSummary::default();
        for index in 0..self.time.sample_count() {
            let mut changed = false;
            for watch in &mut self.watches {
                changed |= watch.evaluate(run, index)?;
            }
            if changed {
                self.time.evaluate(run, index)?;
                sink.snapshot(&self.snapshot())?;
                summary.snapshots += 1;
            }
            for watch in &mut self.debounce_watches {
                if let Some(event) = watch.evaluate(run, index)? {
                    sink.event(&event)?;
                    summary.events += 1;
                }
            }
            summary.samples += 1;
        }
        sink.flush()?;
        self.state = PlaybackState::Done;
        Ok(summary)
    }

    /// Resolves against `run` and plays it.
    pub fn run<R: ReportSink>(
        &mut self,
        run: &ResultVectors,
        sink: &mut R,
    ) -> Result<PlaybackSummary, BenchError> {
        self.resolve(run);
        self.play(run, sink)
    }

    /// Builds the current snapshot: time, then every primary watch.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        self.time.report(&mut snapshot);
        for watch in &self.watches {
            watch.report(&mut snapshot);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TextReporter;

    fn run() -> ResultVectors {
        [
            ("time", vec![0.0, 1e-9, 2e-9, 3e-9]),
            ("a", vec![0.0, 1.8, 1.8, 0.0]),
            ("b", vec![0.0, 0.0, 0.0, 0.0]),
        ]
        .into_iter()
        .collect()
    }

    fn text(reporter: TextReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn state_transitions() {
        let mut p = Playback::new(&BenchConfig::default());
        assert_eq!(p.state(), PlaybackState::Idle);
        p.add_watch("a", "a").unwrap();
        let run = run();
        p.resolve(&run);
        assert_eq!(p.state(), PlaybackState::Resolved);
        let mut sink = TextReporter::new(Vec::new());
        p.play(&run, &mut sink).unwrap();
        assert_eq!(p.state(), PlaybackState::Done);
        assert!(matches!(
            p.play(&run, &mut sink),
            Err(BenchError::NotResolved)
        ));
    }

    #[test]
    fn play_without_resolve_fails() {
        let mut p = Playback::new(&BenchConfig::default());
        let mut sink = TextReporter::new(Vec::new());
        assert!(matches!(
            p.play(&run(), &mut sink),
            Err(BenchError::NotResolved)
        ));
    }

    #[test]
    fn snapshots_on_change_only() {
        let mut p = Playback::new(&BenchConfig {
            supply: spicetb_config::SupplyConfig {
                vdd: 1.8,
                threshold_fraction: 0.5,
            },
            ..BenchConfig::default()
        });
        p.add_watch("a", "a").unwrap();
        p.add_watch("b", "b").unwrap();
        let mut sink = TextReporter::new(Vec::new());
        let summary = p.run(&run(), &mut sink).unwrap();
        assert_eq!(
            summary,
            PlaybackSummary {
                samples: 4,
                snapshots: 3,
                events: 0
            }
        );
        assert_eq!(
            text(sink),
            "time=0.000000e+00 a=0 b=0\n\
             time=1.000000e-09 a=1 b=0\n\
             time=3.000000e-09 a=0 b=0\n"
        );
    }

    #[test]
    fn range_watch_names() {
        let mut p = Playback::new(&BenchConfig::default());
        p.add_range_watch("q", 3, "x1.q", 4, "_n").unwrap();
        assert_eq!(p.watches()[0].names(), ["x1.q4_n", "x1.q5_n", "x1.q6_n"]);
    }

    #[test]
    fn range_watch_past_index_limit_rejected() {
        let mut p = Playback::new(&BenchConfig::default());
        assert!(matches!(
            p.add_range_watch("q", 2, "q", u32::MAX, ""),
            Err(BenchError::InvalidWidth { .. })
        ));
        assert!(p.watches().is_empty());
    }

    #[test]
    fn debounce_events_do_not_trigger_snapshots() {
        let run: ResultVectors = [
            ("time", vec![0.0, 1.0, 2.0, 3.0, 4.0]),
            ("a", vec![0.0; 5]),
            ("m", vec![0.5, 0.5, 0.5, 0.0, 0.0]),
        ]
        .into_iter()
        .collect();
        let mut p = Playback::new(&BenchConfig::default());
        p.add_watch("a", "a").unwrap();
        p.add_debounce_watch("mid", "m");
        let mut sink = TextReporter::new(Vec::new());
        let summary = p.run(&run, &mut sink).unwrap();
        assert_eq!(summary.snapshots, 1);
        assert_eq!(summary.events, 2);
        assert_eq!(
            text(sink),
            "time=0.000000e+00 a=0\n\
             mid=1 index=2 raw=5.000000e-01\n\
             mid=0 index=3 raw=0.000000e+00\n"
        );
    }

    #[test]
    fn rerun_reports_initial_snapshot_again() {
        let mut p = Playback::new(&BenchConfig::default());
        p.add_watch("b", "b").unwrap();
        let run = run();
        let mut sink = TextReporter::new(Vec::new());
        assert_eq!(p.run(&run, &mut sink).unwrap().snapshots, 1);
        assert_eq!(p.run(&run, &mut sink).unwrap().snapshots, 1);
    }

    #[test]
    fn short_watch_vector_aborts_run() {
        let run: ResultVectors = [("time", vec![0.0, 1.0]), ("a", vec![0.0])]
            .into_iter()
            .collect();
        let mut p = Playback::new(&BenchConfig::default());
        p.add_watch("a", "a").unwrap();
        let mut sink = TextReporter::new(Vec::new());
        assert!(matches!(
            p.run(&run, &mut sink),
            Err(BenchError::IndexOutOfRange { .. })
        ));
        assert_eq!(p.state(), PlaybackState::Running);
    }
}
