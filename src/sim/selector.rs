//! Probability-weighted group of object pools
//!
//! Decides which kind of item spawns; the pools decide how many exist.

use super::pool::{ObjectPool, Poolable};
use crate::error::PoolError;

/// Several pools behind cumulative weight boundaries covering [0, 1)
#[derive(Debug, Clone)]
pub struct WeightedPoolSelector<T> {
    pools: Vec<ObjectPool<T>>,
    /// Upper bound (exclusive) of each pool's range; last entry is 1.0
    cumulative: Vec<f32>,
}

impl<T: Poolable> WeightedPoolSelector<T> {
    /// Build one pool of `capacity` items per `(kind, weight)` entry.
    ///
    /// Weights are normalized by their sum. Negative or non-finite weights
    /// are rejected; an all-zero weight list yields a selector that never
    /// selects anything.
    pub fn new<K>(
        entries: &[(K, f32)],
        capacity: usize,
        mut make: impl FnMut(&K) -> T,
    ) -> Result<Self, PoolError> {
        for (index, (_, weight)) in entries.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(PoolError::InvalidWeight {
                    index,
                    weight: *weight,
                });
            }
        }

        let total: f32 = entries.iter().map(|(_, w)| w).sum();
        let mut cumulative = Vec::with_capacity(entries.len());
        let mut acc = 0.0;
        for (_, weight) in entries {
            if total > 0.0 {
                acc += weight / total;
            }
            cumulative.push(acc);
        }
        // Close the last non-empty range exactly at 1.0 so rounding leaves no gap
        if total > 0.0 {
            if let Some(last) = entries.iter().rposition(|(_, w)| *w > 0.0) {
                for bound in &mut cumulative[last..] {
                    *bound = 1.0;
                }
            }
        }

        let pools = entries
            .iter()
            .map(|(kind, _)| ObjectPool::new(capacity, |_| make(kind)))
            .collect();

        Ok(Self { pools, cumulative })
    }

    /// Index of the pool whose range contains `sample`, if any
    pub fn pool_index(&self, sample: f32) -> Option<usize> {
        if !(0.0..1.0).contains(&sample) {
            return None;
        }
        let index = self.cumulative.partition_point(|&bound| bound <= sample);
        (index < self.pools.len()).then_some(index)
    }

    /// Map a uniform sample in [0, 1) to one of the pools
    pub fn get_pool(&mut self, sample: f32) -> Option<&mut ObjectPool<T>> {
        let index = self.pool_index(sample)?;
        self.pools.get_mut(index)
    }

    pub fn pool(&self, index: usize) -> Option<&ObjectPool<T>> {
        self.pools.get(index)
    }

    pub fn pool_mut(&mut self, index: usize) -> Option<&mut ObjectPool<T>> {
        self.pools.get_mut(index)
    }

    pub fn pools(&self) -> &[ObjectPool<T>] {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut [ObjectPool<T>] {
        &mut self.pools
    }

    pub fn active_count(&self) -> usize {
        self.pools.iter().map(ObjectPool::active_count).sum()
    }

    pub fn pool_all(&mut self) {
        for pool in &mut self.pools {
            pool.pool_all_items();
        }
    }
}
