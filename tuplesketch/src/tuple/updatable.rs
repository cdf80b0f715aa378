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

use std::fmt;
use std::hash::Hash;

use crate::common::ResizeFactor;
use crate::common::canonical_double;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::hash_key;
use crate::theta::DEFAULT_LG_K;
use crate::theta::MAX_LG_K;
use crate::theta::MIN_LG_K;
use crate::theta::hash_table::QuickSelectTable;
use crate::tuple::Summary;
use crate::tuple::SummaryFactory;
use crate::tuple::sketch::Iter;
use crate::tuple::sketch::Sketch;
use crate::tuple::sketch::private;

/// Type alias for the value type a sketch's summaries are updated with.
type ValueOf<F> = <<F as SummaryFactory>::Summary as Summary>::Value;

/// Mutable tuple sketch for building from input data.
///
/// Keys are hashed into a hash table that grows by the resize factor until it reaches
/// `2 * k` slots. From then on, whenever the table fills up, the k-th smallest hash becomes the
/// new theta and only the k smaller entries are kept.
///
/// # Examples
///
/// ```
/// # use tuplesketch::tuple::DoubleSummaryFactory;
/// # use tuplesketch::tuple::DoubleSummaryMode;
/// # use tuplesketch::tuple::Sketch;
/// # use tuplesketch::tuple::UpdatableSketch;
/// let mut sketch = UpdatableSketch::builder(DoubleSummaryFactory::new(DoubleSummaryMode::Sum))
///     .lg_k(10)
///     .build();
/// sketch.update("apple", 1.0);
/// sketch.update("apple", 2.0);
/// sketch.update("pear", 1.0);
/// assert_eq!(sketch.estimate(), 2.0);
/// ```
pub struct UpdatableSketch<F: SummaryFactory> {
    table: QuickSelectTable<F::Summary>,
    factory: F,
    seed: u64,
}

impl<F: SummaryFactory> UpdatableSketch<F> {
    /// Create a new builder for UpdatableSketch, creating summaries with `factory`.
    pub fn builder(factory: F) -> UpdatableSketchBuilder<F> {
        UpdatableSketchBuilder::new(factory)
    }

    /// Update the sketch with a hashable key and a value for its summary.
    pub fn update<T: Hash>(&mut self, key: T, value: ValueOf<F>) {
        let key = hash_key(key, self.seed);
        if key == 0 {
            return;
        }
        let factory = &self.factory;
        self.table.upsert(key, |slot| {
            slot.get_or_insert_with(|| factory.new_summary())
                .update(value);
        });
    }

    /// Update the sketch with a f64 key
    pub fn update_f64(&mut self, key: f64, value: ValueOf<F>) {
        self.update(canonical_double(key), value);
    }

    /// Update the sketch with a f32 key
    pub fn update_f32(&mut self, key: f32, value: ValueOf<F>) {
        self.update_f64(key as f64, value);
    }

    /// Trim the sketch to nominal size k
    pub fn trim(&mut self) {
        self.table.trim();
    }

    /// Reset the sketch to empty state
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// Return the nominal number of entries k
    pub fn nominal_entries(&self) -> usize {
        1 << self.table.lg_nom_size()
    }

    /// Return the configured sampling probability
    pub fn sampling_probability(&self) -> f32 {
        self.table.sampling_probability()
    }

    /// Return the configured resize factor
    pub fn resize_factor(&self) -> ResizeFactor {
        self.table.resize_factor()
    }
}

impl<F: SummaryFactory> private::Sealed for UpdatableSketch<F> {
    fn key_table(&self) -> Option<(&[u64], u8)> {
        Some((self.table.keys(), self.table.lg_cur_size()))
    }
}

impl<F: SummaryFactory> Sketch<F::Summary> for UpdatableSketch<F> {
    fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn theta64(&self) -> u64 {
        self.table.theta()
    }

    fn num_retained(&self) -> usize {
        self.table.num_entries()
    }

    fn iter(&self) -> Iter<'_, F::Summary> {
        Iter::table(self.table.entries())
    }
}

impl<F> fmt::Debug for UpdatableSketch<F>
where
    F: SummaryFactory + fmt::Debug,
    F::Summary: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdatableSketch")
            .field("table", &self.table)
            .field("factory", &self.factory)
            .field("seed", &self.seed)
            .finish()
    }
}

impl<F> Clone for UpdatableSketch<F>
where
    F: SummaryFactory + Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            factory: self.factory.clone(),
            seed: self.seed,
        }
    }
}

/// Builder for UpdatableSketch
#[derive(Debug)]
pub struct UpdatableSketchBuilder<F> {
    factory: F,
    lg_k: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,
    seed: u64,
}

impl<F: SummaryFactory> UpdatableSketchBuilder<F> {
    fn new(factory: F) -> Self {
        Self {
            factory,
            lg_k: DEFAULT_LG_K,
            resize_factor: ResizeFactor::X8,
            sampling_probability: 1.0,
            seed: DEFAULT_UPDATE_SEED,
        }
    }

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
    /// The sketch starts with theta at `p`, so only about a fraction `p` of the distinct keys are
    /// ever retained.
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

    /// Build the UpdatableSketch.
    pub fn build(self) -> UpdatableSketch<F> {
        UpdatableSketch {
            table: QuickSelectTable::new(
                self.lg_k,
                self.resize_factor,
                self.sampling_probability,
            ),
            factory: self.factory,
            seed: self.seed,
        }
    }
}
