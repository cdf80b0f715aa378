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

use crate::common::ResizeFactor;
use crate::theta::DEFAULT_LG_K;
use crate::theta::MAX_LG_K;
use crate::theta::MAX_THETA;
use crate::theta::MIN_LG_K;
use crate::theta::ThetaSketch;
use crate::theta::hash_table::QuickSelectTable;
use crate::tuple::CompactSketch;
use crate::tuple::SummarySetOperations;
use crate::tuple::sketch::Sketch;

/// Accumulating union of tuple sketches.
///
/// Every operand is merged into an internal hash table of nominal size `k`; the summaries of a
/// key seen by several operands are combined with [`SummarySetOperations::union`]. The result
/// theta is the smallest theta of all operands, even of those that contributed no entries.
///
/// # Examples
///
/// ```
/// # use tuplesketch::tuple::DoubleSummaryFactory;
/// # use tuplesketch::tuple::DoubleSummaryMode;
/// # use tuplesketch::tuple::DoubleSummarySetOperations;
/// # use tuplesketch::tuple::Sketch;
/// # use tuplesketch::tuple::Union;
/// # use tuplesketch::tuple::UpdatableSketch;
/// let factory = DoubleSummaryFactory::new(DoubleSummaryMode::Sum);
/// let mut a = UpdatableSketch::builder(factory).build();
/// a.update(1, 1.0);
/// let mut b = UpdatableSketch::builder(factory).build();
/// b.update(1, 1.0);
/// b.update(2, 1.0);
///
/// let mut union = Union::new(DoubleSummarySetOperations::new(DoubleSummaryMode::Sum));
/// union.update(Some(&a));
/// union.update(Some(&b));
/// let result = union.get_result();
/// assert_eq!(result.estimate(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Union<O: SummarySetOperations> {
    table: QuickSelectTable<O::Summary>,
    theta: u64,
    is_empty: bool,
    ops: O,
}

impl<O: SummarySetOperations> Union<O> {
    /// Create a union with the default nominal size `2^12`.
    pub fn new(ops: O) -> Self {
        Self::with_lg_k(DEFAULT_LG_K, ops)
    }

    /// Create a union with nominal size `2^lg_k`.
    ///
    /// # Panics
    ///
    /// If lg_k is not in range [4, 26]
    pub fn with_lg_k(lg_k: u8, ops: O) -> Self {
        assert!(
            (MIN_LG_K..=MAX_LG_K).contains(&lg_k),
            "lg_k must be in [{MIN_LG_K}, {MAX_LG_K}], got {lg_k}"
        );
        Self {
            table: QuickSelectTable::new(lg_k, ResizeFactor::X8, 1.0),
            theta: MAX_THETA,
            is_empty: true,
            ops,
        }
    }

    /// Merges a tuple sketch into the union. `None` stands for the empty sketch.
    pub fn update(&mut self, sketch: Option<&dyn Sketch<O::Summary>>) {
        // absent operands are the canonical empty sketch, which leaves the union unchanged
        let Some(sketch) = sketch else {
            return;
        };
        self.merge(sketch.is_empty(), sketch.theta64(), sketch.iter());
    }

    /// Merges a theta sketch into the union, attaching `default_summary` to every key it
    /// contributes. `None` stands for the empty sketch.
    pub fn update_theta(&mut self, sketch: Option<&ThetaSketch>, default_summary: &O::Summary) {
        let Some(sketch) = sketch else {
            return;
        };
        let entries = sketch.iter().map(|key| (key, default_summary));
        self.merge(sketch.is_empty(), sketch.theta64(), entries);
    }

    fn merge<'a>(
        &mut self,
        is_empty: bool,
        theta: u64,
        entries: impl Iterator<Item = (u64, &'a O::Summary)>,
    ) where
        O::Summary: 'a,
    {
        self.is_empty &= is_empty;
        self.theta = self.theta.min(theta);

        let ops = &self.ops;
        for (key, summary) in entries {
            if key >= self.theta {
                continue;
            }
            self.table.upsert(key, |slot| match slot {
                Some(existing) => {
                    let merged = ops.union(existing, summary);
                    *existing = merged;
                }
                None => *slot = Some(summary.clone()),
            });
        }
        self.theta = self.theta.min(self.table.theta());
    }

    /// Returns the union of every operand seen so far.
    ///
    /// At most `k` entries are returned: when more are retained, the k-th smallest key becomes
    /// the result theta. The union itself is left untouched and keeps accumulating.
    pub fn get_result(&self) -> CompactSketch<O::Summary> {
        let mut theta = self.theta.min(self.table.theta());
        let mut entries: Vec<(u64, O::Summary)> = self
            .table
            .entries()
            .filter(|(key, _)| *key < theta)
            .map(|(key, summary)| (key, summary.clone()))
            .collect();

        let k = 1usize << self.table.lg_nom_size();
        if entries.len() > k {
            let (_, kth, _) = entries.select_nth_unstable_by_key(k, |(key, _)| *key);
            theta = kth.0;
            entries.truncate(k);
        }

        let (keys, summaries) = entries.into_iter().unzip();
        CompactSketch::new(theta, keys, summaries, self.is_empty)
    }

    /// Reset the union to its initial empty state
    pub fn reset(&mut self) {
        self.table.reset();
        self.theta = MAX_THETA;
        self.is_empty = true;
    }
}
