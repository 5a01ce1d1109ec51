// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Decoder cache
//!
//! Solving is the dominant one-time cost of a build, so decoders are cached by
//! (population, target, source slice). The transform is applied after
//! decoding and is not part of the key.
//!
//! Each key maps to its own `OnceCell`: concurrent requests for the same key
//! block on a single solve, while distinct keys solve independently. The
//! per-population regression factorization is cached the same way.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;

use critter_neural::{ConnectionId, Decoder, FunctionId, PopulationId, RegressionSystem};

/// Target half of a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Identity,
    Function(FunctionId),
    /// Sample-defined decoders belong to a single connection
    Samples(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecoderKey {
    pub population: PopulationId,
    pub target: TargetKey,
    pub source_slice: Vec<usize>,
}

type Slot<T> = Arc<OnceCell<Arc<T>>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderCacheStats {
    pub entries: usize,
    pub solves: u64,
    pub hits: u64,
    pub invalidated: u64,
}

#[derive(Debug, Default)]
pub struct DecoderCache {
    decoders: RwLock<AHashMap<DecoderKey, Slot<Decoder>>>,
    systems: RwLock<AHashMap<PopulationId, Slot<RegressionSystem>>>,
    solves: AtomicU64,
    hits: AtomicU64,
    invalidated: AtomicU64,
}

impl DecoderCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot<K, T>(map: &RwLock<AHashMap<K, Slot<T>>>, key: &K) -> Slot<T>
    where
        K: Clone + Eq + std::hash::Hash,
    {
        if let Some(slot) = map.read().get(key) {
            return Arc::clone(slot);
        }
        let mut write = map.write();
        Arc::clone(write.entry(key.clone()).or_default())
    }

    /// Cached decoder for `key`, solving with `solve` on first use
    ///
    /// A failed solve leaves the slot empty so a later build can retry.
    pub fn get_or_solve<E, F>(&self, key: &DecoderKey, solve: F) -> Result<Arc<Decoder>, E>
    where
        F: FnOnce() -> Result<Decoder, E>,
    {
        let slot = Self::slot(&self.decoders, key);
        let mut solved = false;
        let decoder = slot.get_or_try_init(|| {
            solved = true;
            solve().map(Arc::new)
        })?;
        if solved {
            self.solves.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(Arc::clone(decoder))
    }

    /// Cached regression system for `population`
    pub fn system_or_prepare<F>(&self, population: PopulationId, prepare: F) -> Arc<RegressionSystem>
    where
        F: FnOnce() -> RegressionSystem,
    {
        let slot = Self::slot(&self.systems, &population);
        Arc::clone(slot.get_or_init(|| Arc::new(prepare())))
    }

    pub fn get(&self, key: &DecoderKey) -> Option<Arc<Decoder>> {
        self.decoders
            .read()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Drop every decoder computed for `function`; returns the number removed
    pub fn invalidate_function(&self, function: FunctionId) -> usize {
        let mut decoders = self.decoders.write();
        let before = decoders.len();
        decoders.retain(|key, _| key.target != TargetKey::Function(function));
        let removed = before - decoders.len();
        self.invalidated.fetch_add(removed as u64, Ordering::Relaxed);
        debug!(
            target: "critter-engine",
            "[DECODER-CACHE] invalidated {} decoder(s) for {}",
            removed,
            function
        );
        removed
    }

    pub fn len(&self) -> usize {
        self.decoders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.decoders.write().clear();
        self.systems.write().clear();
    }

    pub fn stats(&self) -> DecoderCacheStats {
        DecoderCacheStats {
            entries: self.len(),
            solves: self.solves.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::atomic::AtomicUsize;

    fn key(population: u32, target: TargetKey) -> DecoderKey {
        DecoderKey {
            population: PopulationId(population),
            target,
            source_slice: vec![0],
        }
    }

    #[test]
    fn test_same_key_solved_once() {
        let cache = DecoderCache::new();
        let calls = AtomicUsize::new(0);
        let k = key(0, TargetKey::Identity);

        (0..16).into_par_iter().for_each(|_| {
            let decoder = cache
                .get_or_solve::<(), _>(&k, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Decoder::zeros(1, 4))
                })
                .unwrap();
            assert_eq!(decoder.n_neurons(), 4);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.solves, 1);
        assert_eq!(stats.hits, 15);
    }

    #[test]
    fn test_failed_solve_is_retried() {
        let cache = DecoderCache::new();
        let k = key(0, TargetKey::Function(FunctionId(0)));
        assert!(cache.get_or_solve(&k, || Err("bad")).is_err());
        assert!(cache.get(&k).is_none());
        assert!(cache
            .get_or_solve::<&str, _>(&k, || Ok(Decoder::zeros(2, 3)))
            .is_ok());
    }

    #[test]
    fn test_invalidate_only_that_function() {
        let cache = DecoderCache::new();
        let solve = || Ok::<_, ()>(Decoder::zeros(1, 1));
        cache.get_or_solve(&key(0, TargetKey::Identity), solve).unwrap();
        cache.get_or_solve(&key(0, TargetKey::Function(FunctionId(1))), solve).unwrap();
        cache.get_or_solve(&key(1, TargetKey::Function(FunctionId(1))), solve).unwrap();
        cache.get_or_solve(&key(1, TargetKey::Function(FunctionId(2))), solve).unwrap();

        assert_eq!(cache.invalidate_function(FunctionId(1)), 2);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(0, TargetKey::Identity)).is_some());
        assert!(cache.get(&key(1, TargetKey::Function(FunctionId(2)))).is_some());
    }
}
