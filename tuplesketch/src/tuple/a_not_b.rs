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

use std::borrow::Cow;

use crate::common::ceiling_power_of_2;
use crate::theta::ThetaSketch;
use crate::theta::hash_table::REBUILD_THRESHOLD;
use crate::theta::hash_table::insert_all;
use crate::theta::hash_table::search;
use crate::tuple::CompactSketch;
use crate::tuple::sketch::Sketch;
use crate::tuple::sketch::key_table;

/// Smallest probe table built over a compact operand, in log2 of slots
const MIN_LG_PROBE_SIZE: u32 = 4;

/// Set difference of two tuple sketches: the entries of `a` whose keys are not in `b`.
///
/// This operation does not accumulate. Every [`update`](AnotB::update) replaces the pending
/// result of the previous one.
///
/// # Examples
///
/// ```
/// # use tuplesketch::tuple::AnotB;
/// # use tuplesketch::tuple::DoubleSummary;
/// # use tuplesketch::tuple::DoubleSummaryFactory;
/// # use tuplesketch::tuple::Sketch;
/// # use tuplesketch::tuple::UpdatableSketch;
/// let mut a = UpdatableSketch::builder(DoubleSummaryFactory::default()).build();
/// a.update(1, 1.0);
/// a.update(2, 1.0);
/// let mut b = UpdatableSketch::builder(DoubleSummaryFactory::default()).build();
/// b.update(2, 1.0);
///
/// let mut a_not_b = AnotB::<DoubleSummary>::new();
/// a_not_b.update(Some(&a), Some(&b));
/// assert_eq!(a_not_b.get_result().num_retained(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AnotB<S> {
    pending: Option<CompactSketch<S>>,
}

impl<S> Default for AnotB<S> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<S: Clone> AnotB<S> {
    /// Create a set difference operation with no pending result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes `a` minus `b`, replacing any pending result. `None` stands for the empty sketch.
    ///
    /// The result keeps the empty flag of `a` and the smaller theta of both operands.
    pub fn update(&mut self, a: Option<&dyn Sketch<S>>, b: Option<&dyn Sketch<S>>) {
        let empty = CompactSketch::empty();
        let a = a.unwrap_or(&empty);
        let b = b.unwrap_or(&empty);
        let theta = a.theta64().min(b.theta64());

        let probe = match key_table(b) {
            Some((keys, lg_size)) => ProbeTable {
                keys: Cow::Borrowed(keys),
                lg_size,
            },
            None => ProbeTable::build(b.iter().map(|(key, _)| key), b.num_retained(), theta),
        };
        self.pending = Some(difference(a, b.num_retained(), probe, theta));
    }

    /// Computes `a` minus the keys of a theta sketch, replacing any pending result. `None` stands
    /// for the empty sketch.
    pub fn update_theta(&mut self, a: Option<&dyn Sketch<S>>, b: Option<&ThetaSketch>) {
        let empty = CompactSketch::empty();
        let a = a.unwrap_or(&empty);
        let (theta_b, probe, num_retained_b) = match b {
            Some(b) => {
                let (keys, lg_size) = b.key_table();
                let probe = ProbeTable {
                    keys: Cow::Borrowed(keys),
                    lg_size,
                };
                (b.theta64(), probe, b.num_retained())
            }
            None => (empty.theta64(), ProbeTable::default(), 0),
        };
        let theta = a.theta64().min(theta_b);
        self.pending = Some(difference(a, num_retained_b, probe, theta));
    }

    /// Returns the pending result and clears it, so the operation can be reused.
    ///
    /// Without a preceding update the result is the empty sketch.
    pub fn get_result(&mut self) -> CompactSketch<S> {
        self.pending.take().unwrap_or_else(CompactSketch::empty)
    }
}

/// Keys of `b` laid out for probing.
#[derive(Debug, Default)]
struct ProbeTable<'a> {
    keys: Cow<'a, [u64]>,
    lg_size: u8,
}

impl ProbeTable<'_> {
    /// Build a probe table of `count` keys, discarding those not below `theta`.
    fn build(keys: impl Iterator<Item = u64>, count: usize, theta: u64) -> Self {
        let size = ceiling_power_of_2((count as f64 / REBUILD_THRESHOLD).ceil() as usize)
            .max(1 << MIN_LG_PROBE_SIZE);
        let lg_size = size.trailing_zeros() as u8;
        let source: Vec<u64> = keys.collect();
        let mut table = vec![0u64; size];
        insert_all(&source, &mut table, lg_size, theta);
        Self {
            keys: Cow::Owned(table),
            lg_size,
        }
    }

    fn contains(&self, key: u64) -> bool {
        search(&self.keys, self.lg_size, key).is_some()
    }
}

fn difference<S: Clone>(
    a: &dyn Sketch<S>,
    num_retained_b: usize,
    probe: ProbeTable<'_>,
    theta: u64,
) -> CompactSketch<S> {
    let is_empty = a.is_empty();
    if a.num_retained() == 0 {
        return CompactSketch::new(theta, Vec::new(), Vec::new(), is_empty);
    }

    let (keys, summaries) = if num_retained_b == 0 {
        a.iter()
            .map(|(key, summary)| (key, summary.clone()))
            .unzip()
    } else {
        a.iter()
            .filter(|(key, _)| *key != 0 && *key < theta && !probe.contains(*key))
            .map(|(key, summary)| (key, summary.clone()))
            .unzip()
    };
    CompactSketch::new(theta, keys, summaries, is_empty)
}
