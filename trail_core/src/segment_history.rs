//! Bounded ring buffer of timestamped anchor samples.
//!
//! Each sample is a [`Segment`]: the base and tip of the anchor at one
//! instant. The buffer never grows. When it is full the newest sample keeps
//! overwriting the current write slot (which is outside the live range) until
//! expiry frees room, so under sustained overflow the trail simply stops
//! extending instead of dropping its oldest part.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Upper bound, in seconds, on the number of samples that fit in one
/// lifetime window: capacity assumes at most this many samples per lifetime.
pub const SAMPLE_WINDOW_SECS: f64 = 60.0;

/// Upper bound on history slots (a life time of about 1ms).
pub const MAX_HISTORY_CAPACITY: usize = 65_536;

/// One sample of the two-point anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Anchor base (e.g. the hilt) in world space
    pub base_position: Vector3<f64>,
    
    /// Anchor tip (e.g. the point of the blade) in world space
    pub tip_position: Vector3<f64>,
    
    /// Host timestamp when the sample was taken (seconds)
    pub time_created: f64,
}

impl Segment {
    pub fn new(base_position: Vector3<f64>, tip_position: Vector3<f64>, time_created: f64) -> Self {
        Self {
            base_position,
            tip_position,
            time_created,
        }
    }
    
    /// Straight-line interpolation of both positions and the timestamp.
    ///
    /// `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn lerp(&self, other: &Segment, t: f64) -> Segment {
        Segment {
            base_position: self.base_position.lerp(&other.base_position, t),
            tip_position: self.tip_position.lerp(&other.tip_position, t),
            time_created: self.time_created * (1.0 - t) + other.time_created * t,
        }
    }
    
    /// Distance from base to tip.
    pub fn width(&self) -> f64 {
        (self.tip_position - self.base_position).norm()
    }
    
    /// Seconds elapsed since this sample was taken.
    pub fn age(&self, now: f64) -> f64 {
        now - self.time_created
    }
}

/// Capacity of a history whose samples live `life_time` seconds.
///
/// `floor(60 / life_time) + 1`, never below 2: with the stalling write a
/// single slot could never hold a live sample.
pub fn capacity_for(life_time: f64) -> usize {
    let samples = (SAMPLE_WINDOW_SECS / life_time).floor();
    (samples as usize).saturating_add(1).max(2)
}

/// Fixed-capacity circular history of samples.
///
/// Live samples occupy `[read_index, write_index)` circularly, oldest first.
/// `read_index == write_index` means empty.
#[derive(Debug, Clone)]
pub struct SegmentHistory {
    /// Backing slots, allocated once
    slots: Vec<Segment>,
    
    /// Next slot to write
    write_index: usize,
    
    /// Oldest live slot
    read_index: usize,
}

impl SegmentHistory {
    /// Creates an empty history with `capacity` slots (at least 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Segment::default(); capacity.max(2)],
            write_index: 0,
            read_index: 0,
        }
    }
    
    /// Creates a history sized for samples living `life_time` seconds.
    ///
    /// The capacity is capped at [`MAX_HISTORY_CAPACITY`].
    pub fn with_life_time(life_time: f64) -> Self {
        Self::new(capacity_for(life_time).min(MAX_HISTORY_CAPACITY))
    }
    
    /// Records a new anchor sample.
    ///
    /// The write index advances unless that would collide with the read
    /// index; in that case the same slot is overwritten on the next call.
    pub fn sample(&mut self, base_position: Vector3<f64>, tip_position: Vector3<f64>, now: f64) {
        self.slots[self.write_index] = Segment::new(base_position, tip_position, now);
        
        let next = self.next_index(self.write_index);
        if next != self.read_index {
            self.write_index = next;
        }
    }
    
    /// Evicts samples older than `life_time` from the tail.
    ///
    /// Returns the number of evicted samples. Stops at the write index, so a
    /// history whose samples have all expired ends up empty.
    pub fn expire(&mut self, now: f64, life_time: f64) -> usize {
        let mut evicted = 0;
        while self.read_index != self.write_index
            && now - self.slots[self.read_index].time_created > life_time
        {
            self.read_index = self.next_index(self.read_index);
            evicted += 1;
        }
        evicted
    }
    
    /// Number of live samples.
    pub fn len(&self) -> usize {
        (self.write_index + self.capacity() - self.read_index) % self.capacity()
    }
    
    pub fn is_empty(&self) -> bool {
        self.read_index == self.write_index
    }
    
    /// Number of slots. At most `capacity() - 1` samples are live at once.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    
    pub fn read_index(&self) -> usize {
        self.read_index
    }
    
    pub fn write_index(&self) -> usize {
        self.write_index
    }
    
    /// Returns the `k`-th newest live sample (0 = newest).
    pub fn get_newest(&self, k: usize) -> Option<&Segment> {
        if k >= self.len() {
            return None;
        }
        let idx = (self.write_index + self.capacity() - 1 - k) % self.capacity();
        Some(&self.slots[idx])
    }
    
    /// Most recent live sample.
    pub fn newest(&self) -> Option<&Segment> {
        self.get_newest(0)
    }
    
    /// Oldest live sample.
    pub fn oldest(&self) -> Option<&Segment> {
        if self.is_empty() {
            None
        } else {
            Some(&self.slots[self.read_index])
        }
    }
    
    /// Iterates live samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
        (0..self.len()).filter_map(move |k| self.get_newest(k))
    }
    
    /// Drops every live sample without touching the allocation.
    pub fn clear(&mut self) {
        self.read_index = self.write_index;
    }
    
    fn next_index(&self, idx: usize) -> usize {
        (idx + 1) % self.capacity()
    }
}

impl std::ops::Index<usize> for SegmentHistory {
    type Output = Segment;
    
    /// Indexes live samples newest-first. Panics if `k >= len()`.
    fn index(&self, k: usize) -> &Segment {
        match self.get_newest(k) {
            Some(segment) => segment,
            None => panic!("history index {} out of range for {} live samples", k, self.len()),
        }
    }
}
