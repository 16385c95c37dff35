//! Real-time frame loop driving the simulation.
//!
//! Each frame measures the real time since the previous one, scales it by
//! the configured time scale, and feeds it to [`Simulation::advance_clock`].
//! The loop also polls the constants file and stops on Ctrl-C or once the
//! tick limit is reached.

use std::path::Path;
use std::time::Duration;

use starmarket_core::{EngineSettings, Simulation};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::watch::ConstantsWatcher;

/// Why the frame loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured tick limit was reached.
    MaxTicks,
    /// The process received Ctrl-C.
    Interrupted,
}

/// Result of a frame loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Why the loop ended.
    pub reason: EndReason,
    /// Frames processed.
    pub frames: u64,
    /// Clock elapsed-tick counter at the end of the run.
    pub elapsed_ticks: u64,
}

/// Interval period for a millisecond setting; zero is raised to one.
const fn period_from_millis(millis: u64) -> Duration {
    Duration::from_millis(if millis == 0 { 1 } else { millis })
}

/// Apply the time scale to a real frame duration.
///
/// A non-finite or negative scale freezes simulated time; a product too
/// large for a [`Duration`] saturates.
pub fn scale_frame(real: Duration, time_scale: f64) -> Duration {
    if !time_scale.is_finite() || time_scale <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(real.as_secs_f64() * time_scale).unwrap_or(Duration::MAX)
}

/// Reload constants when the watched file changed.
///
/// Returns the new constants version when a reload happened. A failed
/// reload keeps the previous snapshot; the simulation logs the failure.
pub fn poll_constants(simulation: &mut Simulation, watcher: &mut ConstantsWatcher) -> Option<u64> {
    if !watcher.poll() {
        return None;
    }
    let version = simulation.reload_constants().ok()?;
    info!(
        path = %watcher.path().display(),
        version,
        tick_period = ?simulation.clock().period(),
        "constants file reloaded"
    );
    Some(version)
}

/// Drive `simulation` in real time until Ctrl-C or the tick limit.
///
/// The clock is started on entry and stopped on exit.
pub async fn run(
    simulation: &mut Simulation,
    settings: &EngineSettings,
    mut watcher: Option<ConstantsWatcher>,
) -> RunOutcome {
    let mut frames = time::interval(period_from_millis(settings.frame_interval_ms));
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls = time::interval(period_from_millis(settings.constants_poll_interval_ms));
    polls.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut shutdown_armed = true;

    info!(
        frame_interval_ms = settings.frame_interval_ms,
        time_scale = settings.time_scale,
        max_ticks = settings.max_ticks,
        "frame loop starting"
    );
    simulation.start();

    let mut last_frame = Instant::now();
    let mut frame_count: u64 = 0;
    let reason = loop {
        tokio::select! {
            result = &mut shutdown, if shutdown_armed => {
                match result {
                    Ok(()) => break EndReason::Interrupted,
                    Err(error) => {
                        warn!(error = %error, "cannot listen for Ctrl-C");
                        shutdown_armed = false;
                    }
                }
            }
            _ = polls.tick(), if watcher.is_some() => {
                if let Some(watcher) = watcher.as_mut() {
                    poll_constants(simulation, watcher);
                }
            }
            now = frames.tick() => {
                let real = now.saturating_duration_since(last_frame);
                last_frame = now;
                frame_count = frame_count.saturating_add(1);
                if let Some(summary) = simulation.advance_clock(scale_frame(real, settings.time_scale)) {
                    debug!(
                        frame = frame_count,
                        tick_count = summary.tick_count,
                        elapsed_ticks = summary.elapsed_ticks,
                        "frame advanced the clock"
                    );
                }
                if settings.max_ticks > 0 && simulation.clock().elapsed_ticks() >= settings.max_ticks {
                    break EndReason::MaxTicks;
                }
            }
        }
    };

    simulation.stop();
    let outcome = RunOutcome {
        reason,
        frames: frame_count,
        elapsed_ticks: simulation.clock().elapsed_ticks(),
    };
    info!(
        reason = ?outcome.reason,
        frames = outcome.frames,
        elapsed_ticks = outcome.elapsed_ticks,
        "frame loop ended"
    );
    outcome
}

/// Write the simulation snapshot as pretty-printed JSON.
pub async fn write_snapshot(simulation: &Simulation, path: &Path) -> Result<(), EngineError> {
    let json = serde_json::to_string_pretty(&simulation.snapshot())?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| EngineError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "snapshot written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::SystemTime;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use starmarket_catalog::{RecipeCatalog, ResourceCatalog};
    use starmarket_core::{JsonFileConstants, StaticConstants};
    use starmarket_types::SimulationConstants;

    use super::*;

    fn one_second_ticks() -> Simulation {
        let constants = SimulationConstants {
            seconds_per_tick: Decimal::ONE,
            ..SimulationConstants::default()
        };
        Simulation::new(
            ResourceCatalog::default(),
            RecipeCatalog::default(),
            Box::new(StaticConstants(constants)),
        )
    }

    #[test]
    fn time_scale_multiplies_frames() {
        let frame = Duration::from_millis(100);
        assert_eq!(scale_frame(frame, 1.0), frame);
        assert_eq!(scale_frame(frame, 10.0), Duration::from_secs(1));
        assert_eq!(scale_frame(frame, 0.5), Duration::from_millis(50));
    }

    #[test]
    fn invalid_time_scale_freezes_time() {
        let frame = Duration::from_millis(100);
        assert_eq!(scale_frame(frame, 0.0), Duration::ZERO);
        assert_eq!(scale_frame(frame, -2.0), Duration::ZERO);
        assert_eq!(scale_frame(frame, f64::NAN), Duration::ZERO);
        assert_eq!(scale_frame(frame, f64::INFINITY), Duration::ZERO);
        assert_eq!(scale_frame(Duration::MAX, 1e30), Duration::MAX);
    }

    #[test]
    fn zero_period_is_raised() {
        assert_eq!(period_from_millis(0), Duration::from_millis(1));
        assert_eq!(period_from_millis(250), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn run_stops_at_tick_limit() {
        let mut sim = one_second_ticks();
        let settings = EngineSettings {
            frame_interval_ms: 1,
            time_scale: 500.0,
            max_ticks: 5,
            snapshot_path: None,
            ..EngineSettings::default()
        };
        let outcome = run(&mut sim, &settings, None).await;
        assert_eq!(outcome.reason, EndReason::MaxTicks);
        assert!(outcome.elapsed_ticks >= 5);
        assert!(outcome.frames >= 1);
        assert!(!sim.is_running());
    }

    #[tokio::test]
    async fn snapshot_file_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let sim = one_second_ticks();
        write_snapshot(&sim, &path).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json.get("elapsed_ticks"), Some(&serde_json::json!(0)));
        assert!(json.get("planets").is_some());
    }

    #[test]
    fn changed_constants_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constants.json");
        std::fs::write(&path, r#"[{"name": "seconds_per_tick", "value": 1}]"#).unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH).unwrap();

        let mut sim = Simulation::new(
            ResourceCatalog::default(),
            RecipeCatalog::default(),
            Box::new(JsonFileConstants::new(&path)),
        );
        let mut watcher = ConstantsWatcher::new(&path);
        assert_eq!(poll_constants(&mut sim, &mut watcher), None);

        std::fs::write(&path, r#"[{"name": "seconds_per_tick", "value": 3}]"#).unwrap();
        let later = SystemTime::UNIX_EPOCH
            .checked_add(Duration::from_secs(5))
            .unwrap();
        file.set_modified(later).unwrap();

        assert_eq!(poll_constants(&mut sim, &mut watcher), Some(2));
        assert_eq!(sim.constants().seconds_per_tick, dec!(3));
        assert_eq!(sim.clock().period(), Some(Duration::from_secs(3)));
    }
}
