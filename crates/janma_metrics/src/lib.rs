//! Chart data model and the six rectification metrics.
//!
//! Every calculator implements [`MetricCalculator`] and returns either a
//! bounded [`MetricScore`] or [`MetricOutcome::Unavailable`]. Each also
//! exposes a typed analysis function for explanation and testing.

pub mod birth;
pub mod calculator;
pub mod chart;
pub mod elemental;
pub mod error;
pub mod event;
pub mod event_timing;
pub mod period;
pub mod physical;
pub mod quality;
pub mod score;
pub mod strength;

pub use birth::{BirthData, PhysicalTraits, ProcessedBirthData};
pub use calculator::{MetricCalculator, MetricContext, MetricSettings};
pub use chart::{ChartSnapshot, DivisionalChart, HouseCusps, PlanetPosition, PlanetaryPositions};
pub use elemental::{ElementalBalanceCalculator, TattwaAnalysis, analyze_tattwa};
pub use error::ModelError;
pub use event::{ALL_EVENT_CATEGORIES, Event, EventCategory};
pub use event_timing::{EventTimingAnalysis, EventTimingCalculator, event_timing};
pub use period::{PeriodVerification, PeriodVerificationCalculator, verify_periods};
pub use physical::{PhysicalCorrelation, PhysicalCorrelationCalculator, physical_correlation};
pub use quality::{QualityBalanceCalculator, QualityHierarchy, quality_hierarchy};
pub use score::{ALL_METRICS, MetricName, MetricOutcome, MetricScore};
pub use strength::{RelativeStrengthCalculator, RelativeStrengths, relative_strengths};

/// One instance of every calculator, in metric order.
pub fn default_calculators() -> Vec<Box<dyn MetricCalculator>> {
    vec![
        Box::new(ElementalBalanceCalculator),
        Box::new(QualityBalanceCalculator),
        Box::new(PeriodVerificationCalculator),
        Box::new(RelativeStrengthCalculator),
        Box::new(PhysicalCorrelationCalculator),
        Box::new(EventTimingCalculator),
    ]
}
