//! The calculator seam and the per-candidate context it reads.

use std::sync::OnceLock;

use janma_base::{DashaHierarchy, Graha, vimshottari_hierarchy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::birth::ProcessedBirthData;
use crate::chart::ChartSnapshot;
use crate::event::Event;
use crate::score::{MetricName, MetricOutcome};

/// Tunables shared by the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSettings {
    /// Deepest dasha level (0-based) to materialize.
    pub dasha_max_level: u8,
    /// Events closer than this many days fall in one timing cluster.
    pub cluster_gap_days: f64,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            dasha_max_level: 3,
            cluster_gap_days: 730.0,
        }
    }
}

/// Everything a calculator may read for one candidate time.
///
/// The dasha hierarchy is built on first use and shared by every
/// calculator evaluating the same candidate.
pub struct MetricContext<'a> {
    pub birth: &'a ProcessedBirthData,
    pub chart: &'a ChartSnapshot,
    pub events: &'a [Event],
    pub settings: MetricSettings,
    dasha: OnceLock<Option<DashaHierarchy>>,
}

impl<'a> MetricContext<'a> {
    pub fn new(
        birth: &'a ProcessedBirthData,
        chart: &'a ChartSnapshot,
        events: &'a [Event],
        settings: MetricSettings,
    ) -> Self {
        Self {
            birth,
            chart,
            events,
            settings,
            dasha: OnceLock::new(),
        }
    }

    /// Vimshottari hierarchy from the candidate instant and the Moon.
    ///
    /// None when the Moon's longitude is unusable.
    pub fn dasha(&self) -> Option<&DashaHierarchy> {
        self.dasha
            .get_or_init(|| {
                let Some(moon) = self.chart.positions.longitude(Graha::Chandra) else {
                    debug!(jd = self.chart.jd_ut, "no usable moon longitude, dasha skipped");
                    return None;
                };
                match vimshottari_hierarchy(self.chart.jd_ut, moon, self.settings.dasha_max_level) {
                    Ok(h) => Some(h),
                    Err(error) => {
                        debug!(jd = self.chart.jd_ut, %error, "dasha hierarchy unavailable");
                        None
                    }
                }
            })
            .as_ref()
    }
}

/// A metric scorer.
pub trait MetricCalculator: Send + Sync {
    fn name(&self) -> MetricName;

    /// Score the candidate. Never panics on malformed chart values.
    fn compute(&self, ctx: &MetricContext<'_>) -> MetricOutcome;
}
