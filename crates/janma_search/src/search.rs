//! Coarse-to-fine grid search over candidate birth times.
//!
//! Offsets are whole seconds from the recorded instant. A pass evaluates
//! its whole grid before anything is selected, so the winner does not
//! depend on evaluation order.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use janma_metrics::{Event, MetricContext, MetricSettings, ProcessedBirthData};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::{ConfidenceAggregator, Evaluation, select_candidate};
use crate::cache::{CacheStats, CachedCharts};
use crate::config::SearchConfig;
use crate::error::{ChartError, RectifyError, RectifyResult};
use crate::provider::ChartProvider;

/// Where the engine is in its pass sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Init,
    Coarse,
    Fine,
    Done,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateOutcome {
    Evaluated(Evaluation),
    Discarded {
        #[serde(serialize_with = "serialize_display")]
        error: ChartError,
    },
}

fn serialize_display<S: serde::Serializer>(error: &ChartError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    pub offset_seconds: i64,
    pub at: DateTime<Utc>,
    pub outcome: CandidateOutcome,
}

impl CandidateRecord {
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match &self.outcome {
            CandidateOutcome::Evaluated(e) => Some(e),
            CandidateOutcome::Discarded { .. } => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        self.evaluation().map(|e| e.confidence)
    }
}

/// Winner and bookkeeping of a finished search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub best: CandidateRecord,
    pub records: BTreeMap<i64, CandidateRecord>,
    pub evaluated: usize,
    pub failed: usize,
    pub cache: CacheStats,
}

/// Offsets `-k*step..=k*step` with `k*step <= window`, all in seconds.
pub fn grid(center: i64, half_width: i64, step: i64, bound: i64) -> Vec<i64> {
    let step = step.max(1);
    let k = half_width.max(0) / step;
    (-k..=k)
        .map(|i| center + i * step)
        .filter(|o| o.abs() <= bound)
        .collect()
}

fn minutes_to_seconds(minutes: f64) -> i64 {
    (minutes * 60.0).round() as i64
}

/// One rectification search. Owns the candidate records.
pub struct TimeSearchEngine<'a, P> {
    charts: &'a CachedCharts<P>,
    aggregator: &'a ConfidenceAggregator,
    birth: &'a ProcessedBirthData,
    events: &'a [Event],
    config: SearchConfig,
    settings: MetricSettings,
    phase: SearchPhase,
    records: BTreeMap<i64, CandidateRecord>,
}

impl<'a, P: ChartProvider> TimeSearchEngine<'a, P> {
    pub fn new(
        charts: &'a CachedCharts<P>,
        aggregator: &'a ConfidenceAggregator,
        birth: &'a ProcessedBirthData,
        events: &'a [Event],
        config: SearchConfig,
        settings: MetricSettings,
    ) -> Self {
        Self {
            charts,
            aggregator,
            birth,
            events,
            config,
            settings,
            phase: SearchPhase::Init,
            records: BTreeMap::new(),
        }
    }

    /// Pre-load an already evaluated candidate so no pass repeats it.
    pub fn seed(&mut self, record: CandidateRecord) {
        self.records.insert(record.offset_seconds, record);
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn records(&self) -> &BTreeMap<i64, CandidateRecord> {
        &self.records
    }

    /// Evaluate one candidate. None when the instant is not representable.
    pub fn evaluate_offset(&self, offset_seconds: i64) -> Option<CandidateRecord> {
        let at = self
            .birth
            .utc()
            .checked_add_signed(Duration::try_seconds(offset_seconds)?)?;
        let snapshot = self.charts.snapshot(
            at,
            self.birth.latitude(),
            self.birth.longitude(),
            self.birth.altitude(),
        );
        let outcome = match snapshot {
            Ok(chart) => {
                let ctx = MetricContext::new(self.birth, &chart, self.events, self.settings);
                CandidateOutcome::Evaluated(self.aggregator.evaluate(&ctx))
            }
            Err(error) => {
                warn!(offset_seconds, error = %error, "discarding candidate");
                CandidateOutcome::Discarded { error }
            }
        };
        Some(CandidateRecord {
            offset_seconds,
            at,
            outcome,
        })
    }

    fn run_pass(&mut self, pass: SearchPhase, offsets: Vec<i64>) {
        let pending: Vec<i64> = offsets
            .into_iter()
            .filter(|o| !self.records.contains_key(o))
            .collect();
        info!(pass = ?pass, candidates = pending.len(), "search pass started");

        let this = &*self;
        let results: Vec<CandidateRecord> = if self.config.parallel {
            pending
                .par_iter()
                .filter_map(|&o| this.evaluate_offset(o))
                .collect()
        } else {
            pending
                .iter()
                .filter_map(|&o| this.evaluate_offset(o))
                .collect()
        };

        for record in results {
            self.records.insert(record.offset_seconds, record);
        }
        info!(
            pass = ?pass,
            best = ?self.current_best(),
            evaluated = self.records.len(),
            "search pass finished"
        );
    }

    /// Offset currently winning under the selection rule.
    pub fn current_best(&self) -> Option<i64> {
        select_candidate(
            self.records
                .iter()
                .filter_map(|(o, r)| r.confidence().map(|c| (*o, c))),
            self.config.tie_epsilon,
        )
    }

    fn best_or_error(&self) -> RectifyResult<i64> {
        if let Some(best) = self.current_best() {
            return Ok(best);
        }
        if self.records.is_empty() {
            return Err(RectifyError::NoCandidates);
        }
        let last_error = self
            .records
            .values()
            .rev()
            .find_map(|r| match &r.outcome {
                CandidateOutcome::Discarded { error } => Some(error.clone()),
                CandidateOutcome::Evaluated(_) => None,
            })
            .unwrap_or_else(|| ChartError::Unavailable("no chart returned".to_string()));
        Err(RectifyError::ExternalComputation {
            failed: self.records.len(),
            last_error,
        })
    }

    /// Advance by one pass and return the new phase.
    pub fn step(&mut self) -> RectifyResult<SearchPhase> {
        let window = minutes_to_seconds(self.config.window_minutes);
        let coarse = minutes_to_seconds(self.config.coarse_step_minutes).max(1);
        self.phase = match self.phase {
            SearchPhase::Init => {
                self.run_pass(SearchPhase::Coarse, grid(0, window, coarse, window));
                self.best_or_error()?;
                SearchPhase::Coarse
            }
            SearchPhase::Coarse => match self.config.fine_step_minutes {
                Some(fine) => {
                    let center = self.best_or_error()?;
                    let fine = minutes_to_seconds(fine).max(1);
                    self.run_pass(SearchPhase::Fine, grid(center, coarse, fine, window));
                    SearchPhase::Fine
                }
                None => SearchPhase::Done,
            },
            SearchPhase::Fine | SearchPhase::Done => SearchPhase::Done,
        };
        Ok(self.phase)
    }

    /// Run the remaining passes and select the winner.
    pub fn run(mut self) -> RectifyResult<SearchOutcome> {
        while self.step()? != SearchPhase::Done {}
        let best_offset = self.best_or_error()?;
        let best = self
            .records
            .get(&best_offset)
            .cloned()
            .ok_or(RectifyError::NoCandidates)?;
        let evaluated = self
            .records
            .values()
            .filter(|r| r.evaluation().is_some())
            .count();
        let failed = self.records.len() - evaluated;
        Ok(SearchOutcome {
            best,
            evaluated,
            failed,
            cache: self.charts.cache().stats(),
            records: self.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_grid_is_symmetric_and_includes_zero() {
        let g = grid(0, 7200, 300, 7200);
        assert_eq!(g.len(), 49);
        assert_eq!(g.first(), Some(&-7200));
        assert!(g.contains(&0));
    }

    #[test]
    fn fine_grid_is_clipped_to_window() {
        let g = grid(7200, 300, 60, 7200);
        assert_eq!(g, vec![6900, 6960, 7020, 7080, 7140, 7200]);
    }

    #[test]
    fn zero_window_is_single_candidate() {
        assert_eq!(grid(0, 0, 300, 0), vec![0]);
    }

    #[test]
    fn minutes_round_to_seconds() {
        assert_eq!(minutes_to_seconds(2.5), 150);
        assert_eq!(minutes_to_seconds(0.001), 0);
    }
}
