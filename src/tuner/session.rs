use super::best::BestTracker;
use super::params::Snapshot;
use crate::error::TunerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// What happened in one SPSA iteration. Never modified after it is logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub score_plus: f64,
    pub score_minus: f64,
    pub best_score: f64,
    pub best_iteration: u32,
    /// Parameter values after this iteration's update.
    pub params: Snapshot,
}

/// Append-only history of a tuning session.
#[derive(Debug, Clone)]
pub struct SessionLog {
    initial_params: Snapshot,
    final_params: Snapshot,
    best_params: Snapshot,
    best_score: f64,
    best_iteration: u32,
    history: Vec<IterationRecord>,
}

impl SessionLog {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            final_params: initial.clone(),
            best_params: initial.clone(),
            initial_params: initial,
            best_score: 0.5,
            best_iteration: 0,
            history: Vec::new(),
        }
    }

    pub fn append(&mut self, record: IterationRecord, best: &BestTracker) {
        debug_assert!(
            self.history
                .last()
                .is_none_or(|last| last.iteration < record.iteration)
        );

        self.final_params = record.params.clone();
        self.best_params = best.params.clone();
        self.best_score = best.score;
        self.best_iteration = best.iteration;
        self.history.push(record);
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn final_params(&self) -> &Snapshot {
        &self.final_params
    }

    pub fn best_params(&self) -> &Snapshot {
        &self.best_params
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn best_iteration(&self) -> u32 {
        self.best_iteration
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            summary: Summary {
                total_iterations: self.history.last().map_or(0, |r| r.iteration),
                best_score: (self.best_score * 10_000.0).round() / 10_000.0,
                best_iteration: self.best_iteration,
            },
            final_params: to_integers(&self.final_params),
            best_params: to_integers(&self.best_params),
            initial_params: to_integers(&self.initial_params),
            history: self.history.clone(),
        }
    }

    /// Writes the session as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TunerError> {
        let json = serde_json::to_string_pretty(&self.report())?;
        fs::write(path.as_ref(), json)?;
        log::debug!("Session written to {}", path.as_ref().display());
        Ok(())
    }
}

fn to_integers(snapshot: &Snapshot) -> BTreeMap<String, i64> {
    snapshot
        .iter()
        .map(|(name, &value)| (name.clone(), value as i64))
        .collect()
}

// ============================================================================
// Persisted Form
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_iterations: u32,
    pub best_score: f64,
    pub best_iteration: u32,
}

/// The JSON artifact written at the end of (and periodically during) a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub summary: Summary,
    pub final_params: BTreeMap<String, i64>,
    pub best_params: BTreeMap<String, i64>,
    pub initial_params: BTreeMap<String, i64>,
    pub history: Vec<IterationRecord>,
}

impl SessionReport {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TunerError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Commented constant declarations for pasting the best values back into the engine.
    pub fn constants_snippet(&self) -> String {
        let rule = format!("// {}", "=".repeat(76));
        let mut lines = vec![
            rule.clone(),
            "// SPSA Tuned Values (Best Parameters)".to_string(),
            format!(
                "// Best Score: {:.4} at iteration {}",
                self.summary.best_score, self.summary.best_iteration
            ),
            rule,
            String::new(),
        ];

        for (name, value) in &self.best_params {
            lines.push(format!("// constexpr int {} = {};", name, value));
        }

        lines.join("\n")
    }
}
