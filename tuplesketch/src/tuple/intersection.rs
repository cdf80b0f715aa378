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

use crate::theta::MAX_THETA;
use crate::theta::ThetaSketch;
use crate::theta::hash_table::QuickSelectTable;
use crate::tuple::CompactSketch;
use crate::tuple::SummarySetOperations;
use crate::tuple::sketch::Sketch;

/// Intersection of tuple sketches.
///
/// The first operand seeds the running set; every later operand keeps only the keys present on
/// both sides, combining their summaries with [`SummarySetOperations::intersection`]. Theta only
/// ever narrows.
///
/// Once the running set has become empty while the result is non-empty (for instance, after
/// intersecting disjoint sketches in estimation mode), it stays that way until [`reset`].
///
/// [`reset`]: Intersection::reset
#[derive(Debug, Clone)]
pub struct Intersection<O: SummarySetOperations> {
    ops: O,
    is_first_call: bool,
    is_empty: bool,
    theta: u64,
    table: Option<QuickSelectTable<O::Summary>>,
}

impl<O: SummarySetOperations> Intersection<O> {
    /// Create an intersection that has not seen any operand yet.
    pub fn new(ops: O) -> Self {
        Self {
            ops,
            is_first_call: true,
            is_empty: false,
            theta: MAX_THETA,
            table: None,
        }
    }

    /// Intersects a tuple sketch with the running set. `None` stands for the empty sketch.
    pub fn update(&mut self, sketch: Option<&dyn Sketch<O::Summary>>) {
        match sketch {
            Some(sketch) => self.intersect(
                sketch.is_empty(),
                sketch.theta64(),
                sketch.num_retained(),
                sketch.iter(),
            ),
            None => self.intersect(true, MAX_THETA, 0, std::iter::empty()),
        }
    }

    /// Intersects a theta sketch with the running set, using `default_summary` as the summary
    /// of each of its keys. `None` stands for the empty sketch.
    pub fn update_theta(&mut self, sketch: Option<&ThetaSketch>, default_summary: &O::Summary) {
        match sketch {
            Some(sketch) => self.intersect(
                sketch.is_empty(),
                sketch.theta64(),
                sketch.num_retained(),
                sketch.iter().map(|key| (key, default_summary)),
            ),
            None => self.intersect(true, MAX_THETA, 0, std::iter::empty()),
        }
    }

    fn intersect<'a>(
        &mut self,
        is_empty: bool,
        theta: u64,
        num_retained: usize,
        entries: impl Iterator<Item = (u64, &'a O::Summary)>,
    ) where
        O::Summary: 'a,
    {
        let is_first_call = std::mem::replace(&mut self.is_first_call, false);
        self.is_empty |= is_empty;
        self.theta = self.theta.min(theta);

        if self.is_empty || num_retained == 0 {
            self.table = None;
            return;
        }

        let theta = self.theta;
        if is_first_call {
            let mut table = QuickSelectTable::for_entries(num_retained);
            for (key, summary) in entries.filter(|(key, _)| *key < theta) {
                table.insert(key, summary.clone());
            }
            self.table = Some(table);
            return;
        }

        // an exhausted running set cannot grow back
        let Some(running) = self.table.take() else {
            return;
        };

        let ops = &self.ops;
        let matched: Vec<_> = entries
            .filter(|(key, _)| *key < theta)
            .filter_map(|(key, summary)| {
                let current = running.get(key)?;
                Some((key, ops.intersection(current, summary)))
            })
            .collect();
        if matched.is_empty() {
            return;
        }

        let mut table = QuickSelectTable::for_entries(matched.len());
        for (key, summary) in matched {
            table.insert(key, summary);
        }
        self.table = Some(table);
    }

    /// Returns true if at least one operand has been seen since creation or the last reset.
    pub fn has_result(&self) -> bool {
        !self.is_first_call
    }

    /// Returns the intersection of every operand seen so far.
    ///
    /// # Panics
    ///
    /// If no operand has been seen yet: the intersection of nothing is the universal set, which
    /// cannot be represented.
    pub fn get_result(&self) -> CompactSketch<O::Summary> {
        assert!(
            self.has_result(),
            "get_result called before the first update of the intersection"
        );
        let (keys, summaries) = match &self.table {
            Some(table) => table
                .entries()
                .filter(|(key, _)| *key < self.theta)
                .map(|(key, summary)| (key, summary.clone()))
                .unzip(),
            None => (Vec::new(), Vec::new()),
        };
        CompactSketch::new(self.theta, keys, summaries, self.is_empty)
    }

    /// Reset the intersection to its "not yet started" state
    pub fn reset(&mut self) {
        self.is_first_call = true;
        self.is_empty = false;
        self.theta = MAX_THETA;
        self.table = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::Summary;

    #[derive(Debug, Clone, PartialEq)]
    struct Count(u32);

    impl Summary for Count {
        type Value = u32;

        fn update(&mut self, value: u32) {
            self.0 += value;
        }
    }

    struct MinCounts;

    impl SummarySetOperations for MinCounts {
        type Summary = Count;

        fn union(&self, a: &Count, b: &Count) -> Count {
            Count(a.0 + b.0)
        }

        fn intersection(&self, a: &Count, b: &Count) -> Count {
            Count(a.0.min(b.0))
        }
    }

    fn compact(theta: u64, pairs: &[(u64, u32)]) -> CompactSketch<Count> {
        let keys = pairs.iter().map(|(k, _)| *k).collect();
        let summaries = pairs.iter().map(|(_, c)| Count(*c)).collect();
        CompactSketch::new(theta, keys, summaries, false)
    }

    #[test]
    #[should_panic(expected = "before the first update")]
    fn test_result_before_update_panics() {
        let intersection = Intersection::new(MinCounts);
        assert!(!intersection.has_result());
        intersection.get_result();
    }

    #[test]
    fn test_first_update_copies_operand() {
        let mut intersection = Intersection::new(MinCounts);
        intersection.update(Some(&compact(MAX_THETA, &[(1, 5), (2, 7)])));
        assert!(intersection.has_result());

        let result = intersection.get_result();
        assert!(!result.is_empty());
        assert_eq!(result.num_retained(), 2);
    }

    #[test]
    fn test_matching_keys_combine_summaries() {
        let mut intersection = Intersection::new(MinCounts);
        intersection.update(Some(&compact(MAX_THETA, &[(1, 5), (2, 7), (3, 1)])));
        intersection.update(Some(&compact(MAX_THETA, &[(2, 3), (3, 4), (4, 4)])));

        let result = intersection.get_result();
        let mut pairs: Vec<(u64, u32)> = result.iter().map(|(k, s)| (k, s.0)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(2, 3), (3, 1)]);
    }

    #[test]
    fn test_absent_operand_empties_result() {
        let mut intersection = Intersection::new(MinCounts);
        intersection.update(Some(&compact(MAX_THETA, &[(1, 5)])));
        intersection.update(None);

        let result = intersection.get_result();
        assert!(result.is_empty());
        assert_eq!(result.num_retained(), 0);
    }

    #[test]
    fn test_degenerate_state_is_sticky() {
        let mut intersection = Intersection::new(MinCounts);
        intersection.update(Some(&compact(1000, &[(10, 1), (20, 1)])));
        intersection.update(Some(&compact(900, &[(30, 1)])));

        let result = intersection.get_result();
        assert!(!result.is_empty());
        assert_eq!(result.num_retained(), 0);
        assert_eq!(result.theta64(), 900);

        intersection.update(Some(&compact(MAX_THETA, &[(10, 1), (20, 1)])));
        let result = intersection.get_result();
        assert!(!result.is_empty());
        assert_eq!(result.num_retained(), 0);
        assert_eq!(result.theta64(), 900);

        intersection.reset();
        assert!(!intersection.has_result());
    }

    #[test]
    fn test_theta_screens_running_set() {
        let mut intersection = Intersection::new(MinCounts);
        intersection.update(Some(&compact(MAX_THETA, &[(10, 1), (2000, 1)])));
        intersection.update(Some(&compact(1000, &[(10, 1)])));

        let result = intersection.get_result();
        assert_eq!(result.theta64(), 1000);
        assert_eq!(result.keys(), &[10]);
    }
}
