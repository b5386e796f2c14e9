//! Proportional sub-period generation.

use super::types::{DashaLevel, DashaPeriod};
use crate::graha::Graha;

/// Snap the last child's end to the parent's end to absorb floating-point drift.
pub fn snap_last_child_end(children: &mut [DashaPeriod], parent_end_jd: f64) {
    if let Some(last) = children.last_mut() {
        last.end_jd = parent_end_jd;
    }
}

/// Children of `parent`, each lasting `years / total_years` of the parent.
///
/// `sequence` is the full cyclic order of (graha, years); children start
/// with the parent's own graha.
pub fn proportional_children(
    parent: &DashaPeriod,
    sequence: &[(Graha, f64)],
    total_years: f64,
    child_level: DashaLevel,
    parent_idx: u32,
) -> Vec<DashaPeriod> {
    let n = sequence.len();
    let start = sequence
        .iter()
        .position(|(g, _)| *g == parent.graha)
        .unwrap_or(0);
    let parent_duration = parent.duration_days();

    let mut children = Vec::with_capacity(n);
    let mut cursor = parent.start_jd;
    for i in 0..n {
        let (graha, years) = sequence[(start + i) % n];
        let end = cursor + years / total_years * parent_duration;
        children.push(DashaPeriod {
            graha,
            start_jd: cursor,
            end_jd: end,
            level: child_level,
            order: i as u16 + 1,
            parent_idx,
        });
        cursor = end;
    }

    snap_last_child_end(&mut children, parent.end_jd);
    children
}
