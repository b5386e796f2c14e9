//! Birth-time rectification: confidence aggregation, candidate search and
//! orchestration over an external chart collaborator.
//!
//! ```ignore
//! let rectifier = Rectifier::new(provider, RectificationConfig::default())?;
//! let result = rectifier.rectify(&birth, &events)?;
//! ```

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod preprocess;
pub mod progress;
pub mod provider;
pub mod result;
pub mod search;

pub use aggregator::{BASE_WEIGHTS, ConfidenceAggregator, Evaluation, MetricWeights, select_candidate};
pub use cache::{CacheStats, CachedCharts, ChartCache};
pub use config::{MAX_WINDOW_MINUTES, RectificationConfig, SearchConfig};
pub use error::{ChartError, RectifyError, RectifyResult, ValidationError};
pub use orchestrator::{Baseline, RectificationRun, Rectifier};
pub use preprocess::preprocess;
pub use progress::{ALL_STAGES, ProgressEvent, Stage};
pub use provider::{ChartProvider, fetch_snapshot, validate_chart};
pub use result::{MetricReport, RectificationResult};
pub use search::{CandidateOutcome, CandidateRecord, SearchOutcome, SearchPhase, TimeSearchEngine};
