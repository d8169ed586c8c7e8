use lightsout_core::{Outcome, TrialRecord};
use serde::Serialize;
use std::io::Write;

/// Aggregates over a session's finished trials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub attempts: usize,
    pub completed: usize,
    pub faults: usize,
    pub best_ms: Option<u64>,
    pub mean_ms: Option<f64>,
}

/// Finished trials in the order they ended
#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<TrialRecord>,
}

#[derive(Serialize)]
struct SessionExport<'a> {
    summary: SessionSummary,
    trials: &'a [TrialRecord],
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: TrialRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TrialRecord> {
        self.records.last()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        let times: Vec<u64> = self
            .records
            .iter()
            .filter_map(TrialRecord::reaction_time_ms)
            .collect();
        let faults = self
            .records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Faulted { .. }))
            .count();
        let mean_ms = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<u64>() as f64 / times.len() as f64)
        };

        SessionSummary {
            attempts: self.records.len(),
            completed: times.len(),
            faults,
            best_ms: times.iter().min().copied(),
            mean_ms,
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        let export = SessionExport {
            summary: self.summary(),
            trials: &self.records,
        };
        serde_json::to_writer_pretty(writer, &export)
    }
}
