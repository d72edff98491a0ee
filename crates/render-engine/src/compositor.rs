//! Timeline planner: where each clip lands in the composite.
//!
//! Pure arithmetic shared by the transition composer (video offsets and
//! audio delays) and the concat fallback (hard cuts), so both paths agree on
//! clip placement and total length.

use reelsmith_scene_model::TransitionStyle;
use serde::{Deserialize, Serialize};

/// The join between two adjacent clips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Outgoing style of the earlier clip.
    pub style: TransitionStyle,

    /// Seconds the two clips overlap; always 0 for [`TransitionStyle::None`].
    pub overlap_secs: f64,
}

impl Boundary {
    pub fn new(style: TransitionStyle, overlap_secs: f64) -> Self {
        let overlap_secs = if style.is_overlap() && overlap_secs.is_finite() {
            overlap_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            style,
            overlap_secs,
        }
    }

    pub fn hard_cut() -> Self {
        Self::new(TransitionStyle::None, 0.0)
    }

    /// Whether this boundary blends the clips instead of cutting.
    pub fn is_overlap(&self) -> bool {
        self.overlap_secs > 0.0
    }
}

/// One clip's position in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlacement {
    /// Position in the surviving clip list.
    pub index: usize,

    /// Composite time the clip starts at.
    pub start_secs: f64,

    /// Realized clip duration.
    pub duration_secs: f64,

    /// The boundary leading into this clip; `None` for the first clip.
    pub entry: Option<Boundary>,
}

impl ClipPlacement {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// Delay applied to this clip's audio so it starts with its video.
    pub fn audio_delay_ms(&self) -> u64 {
        (self.start_secs * 1000.0).round().max(0.0) as u64
    }
}

/// Placement of every clip plus the composite length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlan {
    pub placements: Vec<ClipPlacement>,
    pub total_secs: f64,
}

impl TimelinePlan {
    /// Whether any boundary overlaps.
    pub fn has_overlap(&self) -> bool {
        self.placements
            .iter()
            .filter_map(|p| p.entry)
            .any(|b| b.is_overlap())
    }
}

/// Place clips joined by `boundaries`.
///
/// `boundaries[i]` joins clip `i` to clip `i + 1`; missing entries are hard
/// cuts. An overlap never exceeds either clip it joins. Each later clip
/// starts at `max(0, previous_end - overlap)`.
pub fn plan_transitions(durations: &[f64], boundaries: &[Boundary]) -> TimelinePlan {
    let mut placements = Vec::with_capacity(durations.len());
    let mut clip_end = 0.0_f64;
    let mut previous_secs = 0.0_f64;

    for (index, &duration_secs) in durations.iter().enumerate() {
        let (start_secs, entry) = if index == 0 {
            (0.0, None)
        } else {
            let mut boundary = boundaries
                .get(index - 1)
                .copied()
                .unwrap_or_else(Boundary::hard_cut);
            boundary.overlap_secs = boundary
                .overlap_secs
                .min(previous_secs)
                .min(duration_secs)
                .max(0.0);
            ((clip_end - boundary.overlap_secs).max(0.0), Some(boundary))
        };
        previous_secs = duration_secs;

        clip_end = start_secs + duration_secs;
        placements.push(ClipPlacement {
            index,
            start_secs,
            duration_secs,
            entry,
        });
    }

    TimelinePlan {
        placements,
        total_secs: clip_end,
    }
}

/// Place clips back to back.
pub fn plan_hard_cuts(durations: &[f64]) -> TimelinePlan {
    plan_transitions(durations, &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fades(overlap: f64, count: usize) -> Vec<Boundary> {
        vec![Boundary::new(TransitionStyle::Fade, overlap); count]
    }

    #[test]
    fn test_three_clips_with_constant_overlap() {
        let plan = plan_transitions(&[5.0, 7.0, 3.0], &fades(0.5, 2));
        let starts: Vec<f64> = plan.placements.iter().map(|p| p.start_secs).collect();
        assert_eq!(starts, vec![0.0, 4.5, 11.0]);
        assert!((plan.total_secs - 14.0).abs() < 1e-9);
        assert!(plan.has_overlap());
    }

    #[test]
    fn test_audio_delay_matches_video_offset() {
        let plan = plan_transitions(&[5.0, 7.0, 3.0], &fades(0.5, 2));
        let delays: Vec<u64> = plan.placements.iter().map(|p| p.audio_delay_ms()).collect();
        assert_eq!(delays, vec![0, 4500, 11000]);
    }

    #[test]
    fn test_none_boundary_has_no_overlap() {
        let boundary = Boundary::new(TransitionStyle::None, 2.0);
        assert_eq!(boundary.overlap_secs, 0.0);

        let plan = plan_transitions(
            &[4.0, 4.0, 4.0],
            &[boundary, Boundary::new(TransitionStyle::Dissolve, 1.0)],
        );
        let starts: Vec<f64> = plan.placements.iter().map(|p| p.start_secs).collect();
        assert_eq!(starts, vec![0.0, 4.0, 7.0]);
        assert!((plan.total_secs - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_longer_than_clip_is_clamped() {
        let plan = plan_transitions(&[0.3, 5.0], &fades(1.0, 1));
        assert_eq!(plan.placements[1].start_secs, 0.0);
        assert!((plan.total_secs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_clamped_to_short_incoming_clip() {
        let plan = plan_transitions(&[5.0, 0.3, 5.0], &fades(0.5, 2));
        let starts: Vec<f64> = plan.placements.iter().map(|p| p.start_secs).collect();
        assert!((starts[1] - 4.7).abs() < 1e-9);
        assert!((starts[2] - 4.7).abs() < 1e-9);
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        let entry = plan.placements[1].entry.unwrap();
        assert!((entry.overlap_secs - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_hard_cuts_sum_durations() {
        let plan = plan_hard_cuts(&[5.0, 7.0, 3.0]);
        assert!((plan.total_secs - 15.0).abs() < 1e-9);
        assert!(!plan.has_overlap());
        assert_eq!(plan.placements[2].start_secs, 12.0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(plan_hard_cuts(&[]).total_secs, 0.0);
        let single = plan_transitions(&[6.0], &[]);
        assert_eq!(single.placements.len(), 1);
        assert!(single.placements[0].entry.is_none());
        assert_eq!(single.total_secs, 6.0);
    }
}
