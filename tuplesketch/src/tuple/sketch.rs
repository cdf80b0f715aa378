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

use std::iter::Zip;
use std::slice;

use crate::common::NumStdDev;
use crate::common::bounds;
use crate::theta::MAX_THETA;
use crate::theta::hash_table::Entries;
use crate::tuple::CompactSketch;

pub(crate) mod private {
    // Sealed trait to prevent external implementations of Sketch.
    pub trait Sealed {
        /// Raw hash table slots and their log2 size, when the sketch is hash table backed.
        fn key_table(&self) -> Option<(&[u64], u8)>;
    }
}

/// Read-only view shared by the tuple sketches of this crate.
///
/// Set operations accept any sketch through `Option<&dyn Sketch<S>>`, so updatable and compact
/// sketches can be mixed freely as operands.
pub trait Sketch<S>: private::Sealed {
    /// Returns true if this sketch has never seen an update.
    ///
    /// A sketch can be non-empty and still retain no entries: every key it saw may have been
    /// rejected by theta.
    fn is_empty(&self) -> bool;

    /// Returns theta as a 64-bit threshold. Only keys below it are retained.
    fn theta64(&self) -> u64;

    /// Returns the number of retained entries.
    fn num_retained(&self) -> usize;

    /// Returns an iterator over the retained `(key, summary)` pairs.
    fn iter(&self) -> Iter<'_, S>;

    /// Returns theta as a fraction (0.0 to 1.0)
    fn theta(&self) -> f64 {
        self.theta64() as f64 / MAX_THETA as f64
    }

    /// Returns true if the sketch is in estimation mode, i.e. some keys may have been discarded.
    fn is_estimation_mode(&self) -> bool {
        !self.is_empty() && self.theta64() < MAX_THETA
    }

    /// Returns the estimated number of distinct keys.
    fn estimate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.num_retained() as f64 / self.theta()
    }

    /// Returns the approximate lower error bound given the number of standard deviations.
    fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        bounds::lower_bound(self.num_retained() as u64, self.theta(), num_std_dev)
    }

    /// Returns the approximate upper error bound given the number of standard deviations.
    fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        bounds::upper_bound(self.num_retained() as u64, self.theta(), num_std_dev)
    }

    /// Returns an immutable snapshot of this sketch.
    fn compact(&self) -> CompactSketch<S>
    where
        S: Clone,
    {
        let (keys, summaries) = self
            .iter()
            .map(|(key, summary)| (key, summary.clone()))
            .unzip();
        CompactSketch::new(self.theta64(), keys, summaries, self.is_empty())
    }
}

/// Iterator over the retained entries of a [`Sketch`], yielding `(key, &summary)` pairs.
#[derive(Debug, Clone)]
pub struct Iter<'a, S> {
    inner: IterInner<'a, S>,
}

#[derive(Debug, Clone)]
enum IterInner<'a, S> {
    Table(Entries<'a, S>),
    Compact(Zip<slice::Iter<'a, u64>, slice::Iter<'a, S>>),
}

impl<'a, S> Iter<'a, S> {
    pub(crate) fn table(entries: Entries<'a, S>) -> Self {
        Iter {
            inner: IterInner::Table(entries),
        }
    }

    pub(crate) fn compact(keys: &'a [u64], summaries: &'a [S]) -> Self {
        Iter {
            inner: IterInner::Compact(keys.iter().zip(summaries.iter())),
        }
    }
}

impl<'a, S> Iterator for Iter<'a, S> {
    type Item = (u64, &'a S);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Table(entries) => entries.next(),
            IterInner::Compact(pairs) => pairs.next().map(|(key, summary)| (*key, summary)),
        }
    }
}

/// Returns the raw hash table of `sketch`, if it has one.
pub(crate) fn key_table<S>(sketch: &dyn Sketch<S>) -> Option<(&[u64], u8)> {
    private::Sealed::key_table(sketch)
}
