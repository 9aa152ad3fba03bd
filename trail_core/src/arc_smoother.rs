//! The "ARC" Engine - circumcircle-fitted trail smoothing
//!
//! Raw samples of a fast-moving anchor form a jagged polyline. For every
//! interval between two consecutive samples this module inserts
//! `subdivisions` interior points bowed onto an arc fitted through the
//! neighbouring samples, while the interval endpoints stay exactly at the
//! raw sample positions.
//!
//! # Arc fitting
//!
//! For sample `i` (newest side of the interval), its older neighbour `n1`
//! and the one before that `n2`, each channel (base and tip separately) gets:
//!
//! ```text
//! far    = base(i) + (base(i) - tip(i)) * 0.3
//! center = circumcenter(p(i), p(n1), p(n2)) * 0.1 + far * 0.9
//! ```
//!
//! `far` sits behind the base on the tip->base axis, roughly where the pivot
//! of a swinging anchor is, and is shared by both channels. A raw
//! circumcenter of three nearly collinear samples flies off towards infinity;
//! pulling it 90% towards `far` keeps the arc tight and stable.
//!
//! Centers and radii telescope: the end arc of one interval is the start arc
//! of the next, and interior points blend between the two, so curvature is
//! continuous across sample boundaries.

use crate::circumcircle::circumcenter;
use crate::segment_history::{Segment, SegmentHistory};
use nalgebra::Vector3;

/// How far behind the base the stabilization anchor sits, as a fraction
/// of the anchor length.
pub const FAR_POINT_EXTENSION: f64 = 0.3;

/// Weight of the stabilization anchor in the biased arc center.
pub const FAR_POINT_WEIGHT: f64 = 0.9;

/// Transient smoothed trail, newest segment first.
///
/// Allocated once at its maximum length and refilled in place every tick.
#[derive(Debug, Clone, Default)]
pub struct SmoothedSequence {
    segments: Vec<Segment>,
}

impl SmoothedSequence {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
        }
    }
    
    pub fn len(&self) -> usize {
        self.segments.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
    
    pub fn capacity(&self) -> usize {
        self.segments.capacity()
    }
    
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }
    
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }
    
    pub fn clear(&mut self) {
        self.segments.clear();
    }
    
    fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
}

/// Which anchor point an arc is fitted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Base,
    Tip,
}

impl Channel {
    fn position(self, segment: &Segment) -> &Vector3<f64> {
        match self {
            Channel::Base => &segment.base_position,
            Channel::Tip => &segment.tip_position,
        }
    }
    
    /// Biased arc center for the triple (i, n1, n2) on this channel.
    fn biased_center(self, i: &Segment, n1: &Segment, n2: &Segment) -> Vector3<f64> {
        let raw = circumcenter(self.position(i), self.position(n1), self.position(n2));
        raw * (1.0 - FAR_POINT_WEIGHT) + far_point(i) * FAR_POINT_WEIGHT
    }
}

/// Stabilization anchor of a sample, extrapolated behind the base.
fn far_point(segment: &Segment) -> Vector3<f64> {
    let base = &segment.base_position;
    base + (base - segment.tip_position) * FAR_POINT_EXTENSION
}

/// Arc at one end of an interval.
#[derive(Debug, Clone, Copy)]
struct ArcEnd {
    center: Vector3<f64>,
    radius: f64,
}

impl ArcEnd {
    fn through(center: Vector3<f64>, point: &Vector3<f64>) -> Self {
        Self {
            center,
            radius: (center - point).norm(),
        }
    }
}

/// Start and end arcs of the interval being subdivided, for one channel.
#[derive(Debug, Clone, Copy)]
struct ArcSpan {
    start: ArcEnd,
    end: ArcEnd,
}

impl ArcSpan {
    /// First interval: both ends share the same center.
    fn first(center: Vector3<f64>, start: &Vector3<f64>, end: &Vector3<f64>) -> Self {
        Self {
            start: ArcEnd::through(center, start),
            end: ArcEnd::through(center, end),
        }
    }
    
    /// Next interval: the previous end arc becomes the new start arc.
    fn advance(&self, center: Vector3<f64>, end: &Vector3<f64>) -> Self {
        Self {
            start: self.end,
            end: ArcEnd::through(center, end),
        }
    }
    
    /// Pushes a straight-line point onto the blended arc at parameter `t`.
    fn project(&self, linear: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let radius = self.start.radius * (1.0 - t) + self.end.radius * t;
        let center = self.start.center.lerp(&self.end.center, t);
        // A point sitting exactly on the center has no direction; it stays put.
        let direction = (linear - center)
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        center + direction * radius
    }
}

/// Arc-fitting smoother over a [`SegmentHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcSmoother {
    subdivisions: usize,
}

impl ArcSmoother {
    /// Creates a smoother inserting `subdivisions` points per interval.
    pub fn new(subdivisions: usize) -> Self {
        Self { subdivisions }
    }
    
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }
    
    /// Length of the smoothed output for `live` raw samples.
    pub fn output_len(&self, live: usize) -> usize {
        match live {
            0 => 0,
            n => n + (n - 1) * self.subdivisions,
        }
    }
    
    /// Smooths `history` into a freshly allocated sequence.
    pub fn smooth(&self, history: &SegmentHistory) -> SmoothedSequence {
        let mut out = SmoothedSequence::with_capacity(self.output_len(history.len()));
        self.smooth_into(history, &mut out);
        out
    }
    
    /// Smooths `history` into `out`, reusing its allocation.
    ///
    /// Output is newest first. Raw samples appear unmodified at indices that
    /// are multiples of `subdivisions + 1`.
    pub fn smooth_into(&self, history: &SegmentHistory, out: &mut SmoothedSequence) {
        out.clear();
        
        let live = history.len();
        if live == 0 {
            return;
        }
        
        out.push(history[0]);
        if live == 1 {
            return;
        }
        
        let oldest = live - 1;
        let mut i = 0;
        let mut n1 = 1;
        let mut n2 = (n1 + 1).min(oldest);
        
        let mut base = ArcSpan::first(
            Channel::Base.biased_center(&history[i], &history[n1], &history[n2]),
            &history[i].base_position,
            &history[n1].base_position,
        );
        let mut tip = ArcSpan::first(
            Channel::Tip.biased_center(&history[i], &history[n1], &history[n2]),
            &history[i].tip_position,
            &history[n1].tip_position,
        );
        
        let step = 1.0 / (self.subdivisions + 1) as f64;
        
        loop {
            let from = &history[i];
            let to = &history[n1];
            
            for j in 1..=self.subdivisions {
                let t = step * j as f64;
                let linear = from.lerp(to, t);
                out.push(Segment::new(
                    base.project(&linear.base_position, t),
                    tip.project(&linear.tip_position, t),
                    linear.time_created,
                ));
            }
            
            out.push(*to);
            
            if n1 == oldest {
                return;
            }
            
            i = n1;
            n1 = n2;
            n2 = (n2 + 1).min(oldest);
            
            base = base.advance(
                Channel::Base.biased_center(&history[i], &history[n1], &history[n2]),
                &history[n1].base_position,
            );
            tip = tip.advance(
                Channel::Tip.biased_center(&history[i], &history[n1], &history[n2]),
                &history[n1].tip_position,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    
    fn line_history(count: usize) -> SegmentHistory {
        let mut history = SegmentHistory::new(count + 1);
        for k in 0..count {
            let x = k as f64;
            history.sample(Vector3::new(x, 0.0, 0.0), Vector3::new(x, 1.0, 0.0), x);
        }
        history
    }
    
    /// Anchor rotating about the origin, base at radius 1, tip at radius 3.
    fn swing_history(count: usize, step: f64) -> SegmentHistory {
        let mut history = SegmentHistory::new(count + 1);
        for k in 0..count {
            let angle = k as f64 * step;
            let dir = Vector3::new(angle.cos(), angle.sin(), 0.0);
            history.sample(dir, dir * 3.0, k as f64 * 0.1);
        }
        history
    }
    
    #[test]
    fn test_empty_history() {
        let history = SegmentHistory::new(4);
        let out = ArcSmoother::new(3).smooth(&history);
        assert!(out.is_empty());
    }
    
    #[test]
    fn test_single_sample_is_identity() {
        let history = line_history(1);
        let out = ArcSmoother::new(4).smooth(&history);
        assert_eq!(out.len(), 1);
        assert_eq!(out.as_slice()[0], history[0]);
    }
    
    #[test]
    fn test_zero_subdivisions_is_raw_history() {
        let history = swing_history(5, 0.4);
        let out = ArcSmoother::new(0).smooth(&history);
        let raw: Vec<Segment> = history.iter().copied().collect();
        assert_eq!(out.as_slice(), raw.as_slice());
    }
    
    #[test]
    fn test_two_samples() {
        let history = swing_history(2, 0.5);
        let out = ArcSmoother::new(3).smooth(&history);
        assert_eq!(out.len(), 5);
        assert_eq!(out.as_slice()[0], history[0]);
        assert_eq!(out.as_slice()[4], history[1]);
    }
    
    #[test]
    fn test_collinear_interior_stays_near_line() {
        let history = line_history(3);
        let out = ArcSmoother::new(1).smooth(&history);
        assert_eq!(out.len(), 5);
        
        let s = out.as_slice();
        for (k, raw) in [(0, 2.0), (2, 1.0), (4, 0.0)] {
            assert_eq!(s[k].time_created, raw);
            assert_eq!(s[k].base_position, Vector3::new(raw, 0.0, 0.0));
        }
        
        for k in [1, 3] {
            let newer = s[k - 1].base_position.x;
            let older = s[k + 1].base_position.x;
            let seg = &s[k];
            assert!(seg.base_position.x < newer && seg.base_position.x > older);
            assert!(seg.base_position.y.abs() < 0.2);
            assert!((seg.tip_position.y - 1.0).abs() < 0.2);
            assert_relative_eq!(seg.base_position.z, 0.0, epsilon = 1e-12);
            assert_relative_eq!(seg.time_created, (newer + older) / 2.0, epsilon = 1e-12);
        }
    }
    
    #[test]
    fn test_first_interval_projection() {
        // Newest interval of the straight line: base from (2,0,0) to (1,0,0)
        // with a collinear circumcenter, so center = 0.9 * far = (1.8, -0.27, 0).
        let history = line_history(3);
        let out = ArcSmoother::new(1).smooth(&history);
        
        let center = Vector3::new(1.8, -0.27, 0.0);
        let r1 = (center - Vector3::new(2.0, 0.0, 0.0)).norm();
        let r2 = (center - Vector3::new(1.0, 0.0, 0.0)).norm();
        let dir = (Vector3::new(1.5, 0.0, 0.0) - center).normalize();
        let expected = center + dir * (r1 + r2) / 2.0;
        
        assert_relative_eq!(out.as_slice()[1].base_position, expected, epsilon = 1e-12);
    }
    
    #[test]
    fn test_swing_bows_outward() {
        // Samples on circles about the origin: the chord midpoint is inside
        // the circle, the arc-projected point is pushed back outward.
        let history = swing_history(4, 0.6);
        let out = ArcSmoother::new(1).smooth(&history);
        
        for k in [1, 3, 5] {
            let seg = &out.as_slice()[k];
            let newer = &out.as_slice()[k - 1];
            let older = &out.as_slice()[k + 1];
            let chord_mid = (newer.tip_position + older.tip_position) / 2.0;
            assert!(seg.tip_position.norm() > chord_mid.norm());
            assert!(seg.tip_position.norm() < 3.2);
            assert!(seg.tip_position.iter().all(|v| v.is_finite()));
        }
    }
    
    #[test]
    fn test_curvature_carries_across_intervals() {
        // Symmetric swing: the blended arc of the second interval is centered
        // near the pivot, so its interior tip lands close to radius 3.
        let history = swing_history(4, 0.6);
        let out = ArcSmoother::new(1).smooth(&history);
        let interior = out.as_slice()[3].tip_position;
        assert!((interior.norm() - 3.0).abs() < 0.1);
    }
    
    #[test]
    fn test_second_interval_starts_from_previous_end_arc() {
        // Interval 2 runs from sample 1 to sample 2. Its start arc is the end
        // arc of interval 1 (center from triple 0,1,2 through sample 1); its
        // end arc uses the center from triple 1,2,3 through sample 2.
        let history = swing_history(4, 0.6);
        let out = ArcSmoother::new(1).smooth(&history);
        
        let far = |k: usize| {
            let s = &history[k];
            s.base_position + (s.base_position - s.tip_position) * FAR_POINT_EXTENSION
        };
        
        for (channel, literal) in [
            (Channel::Base, Vector3::new(0.606249242869, 0.778575280441, 0.0)),
            (Channel::Tip, Vector3::new(1.849469179411, 2.345229099695, 0.0)),
        ] {
            let p = |k: usize| *channel.position(&history[k]);
            let center = |i: usize, n1: usize, n2: usize| {
                circumcenter(&p(i), &p(n1), &p(n2)) * (1.0 - FAR_POINT_WEIGHT) + far(i) * FAR_POINT_WEIGHT
            };
            let mid = (p(1) + p(2)) / 2.0;
            
            let start_center = center(0, 1, 2);
            let end_center = center(1, 2, 3);
            let radius = ((start_center - p(1)).norm() + (end_center - p(2)).norm()) / 2.0;
            let blended = (start_center + end_center) / 2.0;
            let expected = blended + (mid - blended).normalize() * radius;
            
            // Same interval with its start arc refitted around the new center
            let refit_radius = ((end_center - p(1)).norm() + (end_center - p(2)).norm()) / 2.0;
            let refit = end_center + (mid - end_center).normalize() * refit_radius;
            
            let actual = *channel.position(&out.as_slice()[3]);
            assert_relative_eq!(actual, expected, epsilon = 1e-12);
            assert_relative_eq!(actual, literal, epsilon = 1e-9);
            assert!((actual - refit).norm() > 0.02);
        }
    }
    
    #[test]
    fn test_smooth_into_reuses_allocation() {
        let smoother = ArcSmoother::new(2);
        let mut out = SmoothedSequence::with_capacity(smoother.output_len(8));
        let capacity = out.capacity();
        
        smoother.smooth_into(&swing_history(8, 0.2), &mut out);
        assert_eq!(out.len(), 22);
        smoother.smooth_into(&swing_history(3, 0.2), &mut out);
        assert_eq!(out.len(), 7);
        assert_eq!(out.capacity(), capacity);
    }
    
    #[test]
    fn test_coincident_samples_stay_finite() {
        let mut history = SegmentHistory::new(8);
        for t in 0..4 {
            history.sample(Vector3::zeros(), Vector3::zeros(), t as f64);
        }
        let out = ArcSmoother::new(3).smooth(&history);
        assert_eq!(out.len(), 4 + 3 * 3);
        for seg in out.iter() {
            assert!(seg.base_position.iter().all(|v| v.is_finite()));
            assert!(seg.tip_position.iter().all(|v| v.is_finite()));
        }
    }
    
    proptest! {
        #[test]
        fn prop_length_law_and_endpoints(
            count in 1usize..20,
            subdivisions in 0usize..6,
            step in 0.05f64..1.5,
        ) {
            let history = swing_history(count, step);
            let smoother = ArcSmoother::new(subdivisions);
            let out = smoother.smooth(&history);
            
            let expected = count + (count - 1) * subdivisions;
            prop_assert_eq!(out.len(), expected);
            prop_assert_eq!(smoother.output_len(count), expected);
            
            for k in 0..count {
                prop_assert_eq!(out.as_slice()[k * (subdivisions + 1)], history[k]);
            }
            
            // Timestamps never increase from head to tail
            let times: Vec<f64> = out.iter().map(|s| s.time_created).collect();
            prop_assert!(times.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
