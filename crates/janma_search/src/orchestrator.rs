//! Rectification entry point.
//!
//! [`Rectifier::rectify`] runs preprocessing, the baseline chart, the
//! search, aggregation and result assembly in one call. [`Rectifier::run`]
//! exposes the same sequence as a lazy iterator of progress events.

use std::sync::Arc;

use janma_metrics::{BirthData, Event, ProcessedBirthData};
use tracing::info;

use crate::aggregator::{ConfidenceAggregator, Evaluation, MetricWeights};
use crate::cache::{CachedCharts, ChartCache};
use crate::config::RectificationConfig;
use crate::error::{RectifyError, RectifyResult, ValidationError};
use crate::preprocess::preprocess;
use crate::progress::{ProgressEvent, Stage};
use crate::provider::ChartProvider;
use crate::result::{RectificationResult, assemble};
use crate::search::{CandidateRecord, SearchOutcome, TimeSearchEngine};

/// Analysis of the recorded time, reused by the search.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub record: CandidateRecord,
    cache: Arc<ChartCache>,
}

impl Baseline {
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.record.evaluation()
    }
}

/// Owns the chart collaborator, configuration and calculators.
pub struct Rectifier<P> {
    provider: P,
    config: RectificationConfig,
    aggregator: ConfidenceAggregator,
    shared_cache: Option<Arc<ChartCache>>,
}

impl<P: ChartProvider> Rectifier<P> {
    /// Validates `config` and registers every built-in calculator.
    pub fn new(provider: P, config: RectificationConfig) -> RectifyResult<Self> {
        config
            .validate()
            .map_err(|e| RectifyError::InvalidConfig(e.to_string()))?;
        let weights = MetricWeights::with_overrides(&config.weights)?;
        Ok(Self {
            provider,
            aggregator: ConfidenceAggregator::with_default_calculators(weights),
            config,
            shared_cache: None,
        })
    }

    /// Replace the calculator set. The aggregator's weights are used as is.
    pub fn with_aggregator(mut self, aggregator: ConfidenceAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Share one chart cache across requests at the same place.
    pub fn with_cache(mut self, cache: Arc<ChartCache>) -> Self {
        self.shared_cache = Some(cache);
        self
    }

    pub fn config(&self) -> &RectificationConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &ConfidenceAggregator {
        &self.aggregator
    }

    pub fn preprocess(&self, birth: &BirthData) -> Result<ProcessedBirthData, ValidationError> {
        preprocess(birth)
    }

    fn engine<'a>(
        &'a self,
        charts: &'a CachedCharts<&'a P>,
        birth: &'a ProcessedBirthData,
        events: &'a [Event],
    ) -> TimeSearchEngine<'a, &'a P> {
        TimeSearchEngine::new(
            charts,
            &self.aggregator,
            birth,
            events,
            self.config.search,
            self.config.metric_settings(),
        )
    }

    /// Chart and metrics at the recorded time.
    ///
    /// A chart failure here is recorded, not raised; the search may still
    /// find usable candidates.
    pub fn preliminary_analysis(
        &self,
        birth: &ProcessedBirthData,
        events: &[Event],
    ) -> RectifyResult<Baseline> {
        let cache = self.shared_cache.clone().unwrap_or_default();
        let charts = CachedCharts::new(&self.provider, Arc::clone(&cache));
        let record = self
            .engine(&charts, birth, events)
            .evaluate_offset(0)
            .ok_or(RectifyError::NoCandidates)?;
        info!(
            confidence = ?record.confidence(),
            "baseline analysis finished"
        );
        Ok(Baseline { record, cache })
    }

    /// Search around the recorded time.
    pub fn search(
        &self,
        baseline: &Baseline,
        birth: &ProcessedBirthData,
        events: &[Event],
    ) -> RectifyResult<SearchOutcome> {
        let charts = CachedCharts::new(&self.provider, Arc::clone(&baseline.cache));
        let mut engine = self.engine(&charts, birth, events);
        engine.seed(baseline.record.clone());
        let outcome = engine.run()?;
        info!(
            offset_seconds = outcome.best.offset_seconds,
            confidence = ?outcome.best.confidence(),
            evaluated = outcome.evaluated,
            failed = outcome.failed,
            cache_hits = outcome.cache.hits,
            "search finished"
        );
        Ok(outcome)
    }

    /// Search from a baseline and assemble the result.
    pub fn comprehensive_analysis(
        &self,
        baseline: &Baseline,
        birth: &ProcessedBirthData,
        events: &[Event],
    ) -> RectifyResult<RectificationResult> {
        let outcome = self.search(baseline, birth, events)?;
        Ok(assemble(birth, &outcome))
    }

    pub fn rectify(&self, birth: &BirthData, events: &[Event]) -> RectifyResult<RectificationResult> {
        self.run(birth, events).finish()
    }

    /// Staged run, one stage per call to `next`.
    pub fn run<'a>(&'a self, birth: &'a BirthData, events: &'a [Event]) -> RectificationRun<'a, P> {
        RectificationRun {
            rectifier: self,
            birth,
            events,
            state: RunState::default(),
        }
    }
}

impl<P> std::fmt::Debug for Rectifier<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rectifier")
            .field("config", &self.config)
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct RunState {
    next: Option<Stage>,
    started: bool,
    processed: Option<ProcessedBirthData>,
    baseline: Option<Baseline>,
    search: Option<SearchOutcome>,
    result: Option<RectificationResult>,
    error: Option<RectifyError>,
}

/// Lazy staged rectification. Each item is the completion of one stage.
///
/// After a failure the iterator yields the error once and then ends.
/// [`RectificationRun::restart`] discards all progress.
pub struct RectificationRun<'a, P> {
    rectifier: &'a Rectifier<P>,
    birth: &'a BirthData,
    events: &'a [Event],
    state: RunState,
}

impl<'a, P: ChartProvider> RectificationRun<'a, P> {
    pub fn restart(&mut self) {
        self.state = RunState::default();
    }

    /// Drive the remaining stages and return the result.
    pub fn finish(mut self) -> RectifyResult<RectificationResult> {
        while self.next().is_some() {}
        if let Some(e) = self.state.error.take() {
            return Err(e);
        }
        self.state.result.take().ok_or(RectifyError::NoCandidates)
    }

    fn upcoming(&self) -> Option<Stage> {
        if self.state.started {
            self.state.next
        } else {
            Some(Stage::Preprocess)
        }
    }

    fn execute(&mut self, stage: Stage) -> RectifyResult<()> {
        let r = self.rectifier;
        let missing = || RectifyError::NoCandidates;
        match stage {
            Stage::Preprocess => {
                self.state.processed = Some(r.preprocess(self.birth)?);
            }
            Stage::PreliminaryAnalysis => {
                let processed = self.state.processed.as_ref().ok_or_else(missing)?;
                self.state.baseline = Some(r.preliminary_analysis(processed, self.events)?);
            }
            Stage::Search => {
                let processed = self.state.processed.as_ref().ok_or_else(missing)?;
                let baseline = self.state.baseline.as_ref().ok_or_else(missing)?;
                self.state.search = Some(r.search(baseline, processed, self.events)?);
            }
            Stage::Aggregation => {
                let processed = self.state.processed.as_ref().ok_or_else(missing)?;
                let search = self.state.search.as_ref().ok_or_else(missing)?;
                self.state.result = Some(assemble(processed, search));
            }
            Stage::Finalization => {
                self.state.baseline = None;
                self.state.search = None;
            }
        }
        Ok(())
    }
}

impl<'a, P: ChartProvider> Iterator for RectificationRun<'a, P> {
    type Item = RectifyResult<ProgressEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.error.is_some() {
            return None;
        }
        let stage = self.upcoming()?;
        self.state.started = true;
        match self.execute(stage) {
            Ok(()) => {
                info!(stage = %stage, percent = stage.percent(), "stage complete");
                self.state.next = stage.next();
                Some(Ok(ProgressEvent::from(stage)))
            }
            Err(e) => {
                self.state.next = None;
                self.state.error = Some(e.clone());
                Some(Err(e))
            }
        }
    }
}
