// src/partition.rs
//! Interleaved assignment of candidate indices to worker lanes.
//!
//! Lane `t` of `threads` owns every index `i` with `i % threads == t`. Sorted
//! wordlists tend to cluster hits, so round-robin keeps lanes evenly loaded
//! where contiguous blocks would not.

use crate::types::SifError;
use std::iter::StepBy;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    threads: usize,
}

impl Partitioner {
    pub fn new(threads: usize) -> Result<Self, SifError> {
        if threads == 0 {
            return Err(SifError::Config(
                "Thread count must be at least 1".to_string(),
            ));
        }
        Ok(Self { threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Indices owned by `lane` in a list of `len` candidates. Lanes at or
    /// beyond `len` get an empty iterator.
    pub fn lane(&self, lane: usize, len: usize) -> StepBy<Range<usize>> {
        let start = lane.min(len);
        (start..len).step_by(self.threads)
    }

    pub fn lanes(&self, len: usize) -> impl Iterator<Item = StepBy<Range<usize>>> + '_ {
        (0..self.threads).map(move |lane| self.lane(lane, len))
    }
}
