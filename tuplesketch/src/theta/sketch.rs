// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Theta sketch implementation
//!
//! This module provides ThetaSketch, a mutable sketch for distinct counting that retains hash
//! values only. It can stand in as an operand of every tuple set operation.

use std::hash::Hash;

use crate::common::NumStdDev;
use crate::common::ResizeFactor;
use crate::common::bounds;
use crate::common::canonical_double;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::hash_key;
use crate::theta::hash_table::DEFAULT_LG_K;
use crate::theta::hash_table::MAX_LG_K;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::MIN_LG_K;
use crate::theta::hash_table::QuickSelectTable;

/// Mutable theta sketch for building from input data
#[derive(Debug, Clone)]
pub struct ThetaSketch {
    table: QuickSelectTable<()>,
    seed: u64,
}

impl ThetaSketch {
    /// Create a new builder for ThetaSketch
    ///
    /// # Examples
    ///
    /// ```
    /// # use tuplesketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().lg_k(10).build();
    /// sketch.update("apple");
    /// sketch.update("apple");
    /// assert_eq!(sketch.estimate(), 1.0);
    /// ```
    pub fn builder() -> ThetaSketchBuilder {
        ThetaSketchBuilder::default()
    }

    /// Update the sketch with a hashable value
    pub fn update<T: Hash>(&mut self, value: T) {
        let key = hash_key(value, self.seed);
        if key == 0 {
            return;
        }
        self.table.upsert(key, |slot| {
            slot.get_or_insert(());
        });
    }

    /// Update the sketch with a f64 value
    pub fn update_f64(&mut self, value: f64) {
        self.update(canonical_double(value));
    }

    /// Update the sketch with a f32 value
    pub fn update_f32(&mut self, value: f32) {
        self.update_f64(value as f64);
    }

    /// Return cardinality estimate
    pub fn estimate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.num_retained() as f64 / self.theta()
    }

    /// Returns the approximate lower error bound given the number of standard deviations.
    pub fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        bounds::lower_bound(self.num_retained() as u64, self.theta(), num_std_dev)
    }

    /// Returns the approximate upper error bound given the number of standard deviations.
    pub fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        bounds::upper_bound(self.num_retained() as u64, self.theta(), num_std_dev)
    }

    /// Return theta as a fraction (0.0 to 1.0)
    pub fn theta(&self) -> f64 {
        self.table.theta() as f64 / MAX_THETA as f64
    }

    /// Return theta as u64
    pub fn theta64(&self) -> u64 {
        self.table.theta()
    }

    /// Check if sketch is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check if sketch is in estimation mode
    pub fn is_estimation_mode(&self) -> bool {
        !self.is_empty() && self.table.theta() < MAX_THETA
    }

    /// Return number of retained entries
    pub fn num_retained(&self) -> usize {
        self.table.num_entries()
    }

    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// Trim the sketch to nominal size k
    pub fn trim(&mut self) {
        self.table.trim();
    }

    /// Reset the sketch to empty state
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Return iterator over hash values
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.table.entries().map(|(key, _)| key)
    }

    /// Raw hash table slots and their log2 size, for probing by the set operations.
    pub(crate) fn key_table(&self) -> (&[u64], u8) {
        (self.table.keys(), self.table.lg_cur_size())
    }
}

/// Builder for ThetaSketch
#[derive(Debug)]
pub struct ThetaSketchBuilder {
    lg_k: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,
    seed: u64,
}

impl Default for ThetaSketchBuilder {
    fn default() -> Self {
        Self {
            lg_k: DEFAULT_LG_K,
            resize_factor: ResizeFactor::X8,
            sampling_probability: 1.0,
            seed: DEFAULT_UPDATE_SEED,
        }
    }
}

impl ThetaSketchBuilder {
    /// Set lg_k (log2 of nominal size k).
    ///
    /// # Panics
    ///
    /// If lg_k is not in range [4, 26]
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        assert!(
            (MIN_LG_K..=MAX_LG_K).contains(&lg_k),
            "lg_k must be in [{MIN_LG_K}, {MAX_LG_K}], got {lg_k}"
        );
        self.lg_k = lg_k;
        self
    }

    /// Set resize factor.
    pub fn resize_factor(mut self, factor: ResizeFactor) -> Self {
        self.resize_factor = factor;
        self
    }

    /// Set sampling probability p.
    ///
    /// # Panics
    ///
    /// If p is not in range (0.0, 1.0]
    pub fn sampling_probability(mut self, probability: f32) -> Self {
        assert!(
            probability > 0.0 && probability <= 1.0,
            "p must be in (0.0, 1.0], got {probability}"
        );
        self.sampling_probability = probability;
        self
    }

    /// Set hash seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the ThetaSketch.
    pub fn build(self) -> ThetaSketch {
        let table = QuickSelectTable::new(
            self.lg_k,
            self.resize_factor,
            self.sampling_probability,
        );

        ThetaSketch {
            table,
            seed: self.seed,
        }
    }
}
