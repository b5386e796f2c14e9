//! Stage-level progress of a rectification run.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preprocess,
    PreliminaryAnalysis,
    Search,
    Aggregation,
    Finalization,
}

pub const ALL_STAGES: [Stage; 5] = [
    Stage::Preprocess,
    Stage::PreliminaryAnalysis,
    Stage::Search,
    Stage::Aggregation,
    Stage::Finalization,
];

impl Stage {
    /// Overall completion once this stage is done.
    pub const fn percent(self) -> u8 {
        match self {
            Self::Preprocess => 10,
            Self::PreliminaryAnalysis => 25,
            Self::Search => 85,
            Self::Aggregation => 95,
            Self::Finalization => 100,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Preprocess => "preprocess",
            Self::PreliminaryAnalysis => "preliminary analysis",
            Self::Search => "search",
            Self::Aggregation => "aggregation",
            Self::Finalization => "finalization",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Preprocess => Some(Self::PreliminaryAnalysis),
            Self::PreliminaryAnalysis => Some(Self::Search),
            Self::Search => Some(Self::Aggregation),
            Self::Aggregation => Some(Self::Finalization),
            Self::Finalization => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Emitted after a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub percent: u8,
}

impl From<Stage> for ProgressEvent {
    fn from(stage: Stage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
        }
    }
}
