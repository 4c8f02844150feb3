use rocket_prometheus::prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::{checkin::CheckInReceipt, error::CheckInError, sweep::SweepReport};

/// Counters exported next to the HTTP metrics on `/metrics`.
#[derive(Clone)]
pub struct Metrics {
    check_ins: IntCounterVec,
    streaks_reset: IntCounter,
}

impl Metrics {
    pub fn register(registry: &Registry) -> anyhow::Result<Self> {
        let check_ins = IntCounterVec::new(
            Opts::new("checkin_outcomes_total", "Check-in attempts by outcome"),
            &["outcome"],
        )?;
        let streaks_reset =
            IntCounter::new("streaks_reset_total", "Streaks set back to zero by the sweep")?;

        registry.register(Box::new(check_ins.clone()))?;
        registry.register(Box::new(streaks_reset.clone()))?;

        Ok(Self {
            check_ins,
            streaks_reset,
        })
    }

    pub fn observe_check_in(&self, result: &Result<CheckInReceipt, CheckInError>) {
        let outcome = match result {
            Ok(_) => "success",
            Err(e) => e.label(),
        };
        self.check_ins.with_label_values(&[outcome]).inc();
    }

    pub fn observe_sweep(&self, report: &SweepReport) {
        self.streaks_reset.inc_by(report.streaks_reset as u64);
    }

    pub fn check_ins(&self, outcome: &str) -> u64 {
        self.check_ins.with_label_values(&[outcome]).get()
    }
}
