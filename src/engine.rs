use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::detector::TransitionDetector;
use crate::models::Status;
use crate::prober::Probe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RoundInFlight,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u64,
    pub checked: usize,
    pub up: usize,
    pub down: usize,
    /// Probe tasks that panicked; their targets keep the previous status.
    pub failed: usize,
}

/// Round-based scheduler: every tick probes all targets in parallel and
/// waits for all of them before the next round may start.
pub struct Monitor {
    targets: Vec<String>,
    period: Duration,
    prober: Arc<dyn Probe>,
    detector: Arc<TransitionDetector>,
    rounds: AtomicU64,
    in_flight: AtomicBool,
}

impl Monitor {
    /// Repeated targets are probed once per round.
    pub fn new(
        mut targets: Vec<String>,
        period: Duration,
        prober: Arc<dyn Probe>,
        detector: Arc<TransitionDetector>,
    ) -> Self {
        let mut seen = HashSet::new();
        targets.retain(|t| seen.insert(t.clone()));
        Self {
            targets,
            period,
            prober,
            detector,
            rounds: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.load(Ordering::Acquire) {
            Phase::RoundInFlight
        } else {
            Phase::Idle
        }
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds.load(Ordering::Acquire)
    }

    /// Runs forever. The first round starts immediately; a round that
    /// overruns the period delays the next one instead of overlapping it.
    pub async fn run(self: Arc<Self>) {
        info!(
            targets = self.targets.len(),
            period_secs = self.period.as_secs(),
            "Uptime monitoring active"
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_round().await;
        }
    }

    /// Probes every target once and returns after all probes completed.
    pub async fn run_round(&self) -> RoundSummary {
        self.in_flight.store(true, Ordering::Release);
        let round = self.rounds.load(Ordering::Acquire) + 1;
        let start_time = Utc::now();
        info!(round, "--- New check cycle ---");

        let mut tasks = FuturesUnordered::new();
        for target in &self.targets {
            let prober = Arc::clone(&self.prober);
            let detector = Arc::clone(&self.detector);
            let target = target.clone();
            tasks.push(tokio::spawn(async move {
                let outcome = prober.probe(&target).await;
                detector.apply(&target, &outcome).await
            }));
        }

        let mut summary = RoundSummary { round, ..Default::default() };
        while let Some(join_res) = tasks.next().await {
            summary.checked += 1;
            match join_res {
                Ok(Status::Up) => summary.up += 1,
                Ok(Status::Down) => summary.down += 1,
                Ok(Status::Unknown) => {}
                Err(e) => {
                    summary.failed += 1;
                    error!(round, error = %e, "Probe task failed");
                }
            }
        }

        let duration = Utc::now() - start_time;
        info!(
            round,
            checked = summary.checked,
            up = summary.up,
            down = summary.down,
            "Check cycle completed in {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );

        self.rounds.store(round, Ordering::Release);
        self.in_flight.store(false, Ordering::Release);
        summary
    }
}
