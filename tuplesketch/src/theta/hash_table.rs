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

use std::slice;

use crate::common::ResizeFactor;

/// Maximum theta value (signed max, so keys and theta also fit an `i64`)
pub const MAX_THETA: u64 = i64::MAX as u64;

/// Minimum log2 of K
pub const MIN_LG_K: u8 = 4;

/// Maximum log2 of K
pub const MAX_LG_K: u8 = 26;

/// Default log2 of K
pub const DEFAULT_LG_K: u8 = 12;

/// Smallest hash table ever allocated, in log2 of slots
const MIN_LG_ARR: u8 = 5;

/// Resize threshold (0.5 = 50% load factor)
const RESIZE_THRESHOLD: f64 = 0.5;

/// Rebuild threshold (15/16 = 93.75% load factor)
pub(crate) const REBUILD_THRESHOLD: f64 = 15.0 / 16.0;

/// Stride hash bits (7 bits for stride calculation)
const STRIDE_HASH_BITS: u8 = 7;

/// Stride mask
const STRIDE_MASK: u64 = (1 << STRIDE_HASH_BITS) - 1;

/// Returns the index of the slot holding `key`, or the first empty slot of its probe sequence.
///
/// Returns `None` only when the whole probe cycle is occupied by other keys.
fn find_slot(keys: &[u64], lg_size: u8, key: u64) -> Option<usize> {
    if keys.is_empty() {
        return None;
    }

    let mask = keys.len() - 1;
    let stride = get_stride(key, lg_size);
    let mut index = (key as usize) & mask;
    let loop_index = index;

    loop {
        let probe = keys[index];
        if probe == 0 || probe == key {
            return Some(index);
        }
        index = (index + stride) & mask;
        if index == loop_index {
            return None;
        }
    }
}

/// Looks a key up in an open-addressing table of `2^lg_size` slots.
///
/// Returns the index of the matching slot, or `None` if an empty slot is reached first.
pub(crate) fn search(keys: &[u64], lg_size: u8, key: u64) -> Option<usize> {
    find_slot(keys, lg_size, key).filter(|&index| keys[index] == key)
}

/// Inserts every key of `source` in `(0, theta)` into `dest`, a table of `2^lg_dest_size` slots.
///
/// The caller must size `dest` so that all the keys fit.
pub(crate) fn insert_all(source: &[u64], dest: &mut [u64], lg_dest_size: u8, theta: u64) {
    for &key in source {
        if key == 0 || key >= theta {
            continue;
        }
        match find_slot(dest, lg_dest_size, key) {
            Some(index) => dest[index] = key,
            None => unreachable!("destination table is sized to hold every source key"),
        }
    }
}

/// Hash table with a payload per key, shared by the tuple sketch, its set operations and the
/// theta sketch (with a `()` payload).
///
/// It maintains an array capacity max to 2^lg_max_size:
/// * Before it reaches the max capacity, it will extend the array based on resize_factor.
/// * After it reaches the capacity bigger than 2^lg_nom_size, every time the number of entries
///   exceeds the threshold, it will rebuild the table: only keep the min 2^lg_nom_size entries and
///   update the theta to the k-th smallest entry.
#[derive(Debug, Clone)]
pub(crate) struct QuickSelectTable<S> {
    lg_cur_size: u8,
    lg_nom_size: u8,
    lg_max_size: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,

    theta: u64,
    is_empty: bool,

    keys: Vec<u64>,
    summaries: Vec<Option<S>>,
    num_entries: usize,
}

impl<S> QuickSelectTable<S> {
    /// Create a new hash table
    pub fn new(lg_nom_size: u8, resize_factor: ResizeFactor, sampling_probability: f32) -> Self {
        let lg_max_size = lg_nom_size + 1;
        let lg_cur_size = starting_sub_multiple(lg_max_size, MIN_LG_ARR, resize_factor.lg_value());

        Self {
            lg_cur_size,
            lg_nom_size,
            lg_max_size,
            resize_factor,
            sampling_probability,
            theta: starting_theta_from_sampling_probability(sampling_probability),
            is_empty: true,
            keys: vec![0u64; 1 << lg_cur_size],
            summaries: empty_slots(1 << lg_cur_size),
            num_entries: 0,
        }
    }

    /// Create a table that holds `count` entries without ever resizing or rebuilding.
    pub fn for_entries(count: usize) -> Self {
        let k = count.max(1).next_power_of_two();
        let lg_nom_size = (k.trailing_zeros() as u8).max(MIN_LG_ARR);
        let mut table = Self::new(lg_nom_size, ResizeFactor::X1, 1.0);
        table.is_empty = false;
        table
    }

    /// Looks up `key`, letting `f` create or modify the summary of its slot.
    ///
    /// `f` receives `None` when the key is not in the table yet, and must store `Some` to insert
    /// it. Keys that are `0` or not below theta are screened out, although they still mark the
    /// table as non-empty.
    ///
    /// Returns true if a new key was inserted.
    pub fn upsert<F>(&mut self, key: u64, f: F) -> bool
    where
        F: FnOnce(&mut Option<S>),
    {
        self.is_empty = false;
        if key == 0 || key >= self.theta {
            return false;
        }

        let Some(index) = find_slot(&self.keys, self.lg_cur_size, key) else {
            unreachable!(
                "Resize or rebuild should be called to make sure it always can find the entry."
            );
        };

        let slot = &mut self.summaries[index];
        let existed = slot.is_some();
        f(slot);
        if existed || slot.is_none() {
            return false;
        }

        self.keys[index] = key;
        self.num_entries += 1;

        // Check if we need to resize or rebuild
        if self.num_entries > self.get_capacity() {
            if self.lg_cur_size <= self.lg_nom_size {
                self.resize();
            } else {
                self.rebuild();
            }
        }
        true
    }

    /// Inserts or overwrites the summary of `key`.
    pub fn insert(&mut self, key: u64, summary: S) -> bool {
        self.upsert(key, |slot| *slot = Some(summary))
    }

    /// Returns the summary stored for `key`, if any.
    pub fn get(&self, key: u64) -> Option<&S> {
        let index = search(&self.keys, self.lg_cur_size, key)?;
        self.summaries[index].as_ref()
    }

    /// Get capacity threshold
    fn get_capacity(&self) -> usize {
        let fraction = if self.lg_cur_size <= self.lg_nom_size {
            RESIZE_THRESHOLD
        } else {
            REBUILD_THRESHOLD
        };
        (fraction * self.keys.len() as f64) as usize
    }

    /// Resize the hash table
    fn resize(&mut self) {
        let new_lg_size = std::cmp::min(
            self.lg_cur_size + self.resize_factor.lg_value(),
            self.lg_max_size,
        );
        let entries = self.drain();
        self.refill(new_lg_size, entries);
    }

    /// Rebuild the hash table:
    /// The number of entries will be reduced to the nominal size k.
    fn rebuild(&mut self) {
        let k = 1usize << self.lg_nom_size;
        let mut entries = self.drain();
        let (_, kth, _) = entries.select_nth_unstable_by_key(k, |(key, _)| *key);
        self.theta = kth.0;
        entries.truncate(k);
        self.refill(self.lg_cur_size, entries);
        debug_assert_eq!(self.num_entries, k, "a rebuild keeps exactly k entries");
    }

    /// Takes every entry out of the table, leaving the slots allocated but empty.
    fn drain(&mut self) -> Vec<(u64, S)> {
        let mut entries = Vec::with_capacity(self.num_entries);
        for (key, slot) in self.keys.iter_mut().zip(self.summaries.iter_mut()) {
            if let Some(summary) = slot.take() {
                entries.push((*key, summary));
            }
            *key = 0;
        }
        entries
    }

    /// Allocates `2^lg_size` fresh slots and inserts `entries` into them.
    fn refill(&mut self, lg_size: u8, entries: Vec<(u64, S)>) {
        let size = 1 << lg_size;
        let mut keys = vec![0u64; size];
        let mut summaries = empty_slots(size);
        for (key, summary) in entries {
            match find_slot(&keys, lg_size, key) {
                Some(index) => {
                    keys[index] = key;
                    summaries[index] = Some(summary);
                }
                None => unreachable!("a refilled table always has room for its entries"),
            }
        }
        self.num_entries = summaries.iter().filter(|slot| slot.is_some()).count();
        self.keys = keys;
        self.summaries = summaries;
        self.lg_cur_size = lg_size;
    }

    /// Trim the table to nominal size k
    pub fn trim(&mut self) {
        if self.num_entries > (1 << self.lg_nom_size) {
            self.rebuild();
        }
    }

    /// Reset the table to empty state
    pub fn reset(&mut self) {
        let init_lg_cur = starting_sub_multiple(
            self.lg_max_size,
            MIN_LG_ARR,
            self.resize_factor.lg_value(),
        );
        self.keys = vec![0u64; 1 << init_lg_cur];
        self.summaries = empty_slots(1 << init_lg_cur);
        self.lg_cur_size = init_lg_cur;
        self.num_entries = 0;
        self.theta = starting_theta_from_sampling_probability(self.sampling_probability);
        self.is_empty = true;
    }

    /// Get number of entries
    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    /// Get theta
    pub fn theta(&self) -> u64 {
        self.theta
    }

    /// Whether the table has never seen an update since creation or the last reset
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Get log2 of nominal size
    pub fn lg_nom_size(&self) -> u8 {
        self.lg_nom_size
    }

    /// Get log2 of the current number of slots
    pub fn lg_cur_size(&self) -> u8 {
        self.lg_cur_size
    }

    pub fn resize_factor(&self) -> ResizeFactor {
        self.resize_factor
    }

    pub fn sampling_probability(&self) -> f32 {
        self.sampling_probability
    }

    /// Raw slot array, `0` marks an empty slot
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Get iterator over entries
    pub fn entries(&self) -> Entries<'_, S> {
        Entries {
            keys: self.keys.iter(),
            summaries: self.summaries.iter(),
        }
    }
}

/// Iterator over the occupied slots of a [`QuickSelectTable`].
#[derive(Debug, Clone)]
pub(crate) struct Entries<'a, S> {
    keys: slice::Iter<'a, u64>,
    summaries: slice::Iter<'a, Option<S>>,
}

impl<'a, S> Iterator for Entries<'a, S> {
    type Item = (u64, &'a S);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = *self.keys.next()?;
            let slot = self.summaries.next()?;
            if let Some(summary) = slot {
                return Some((key, summary));
            }
        }
    }
}

fn empty_slots<S>(size: usize) -> Vec<Option<S>> {
    std::iter::repeat_with(|| None).take(size).collect()
}

/// Get stride for hash table probing
fn get_stride(key: u64, lg_size: u8) -> usize {
    (2 * ((key >> lg_size) & STRIDE_MASK) + 1) as usize
}

/// Compute initial lg_size for hash table based on target lg_size, minimum lg_size, and resize
/// factor. Make sure `lg_target = lg_init + n * lg_resize_factor`, where `n` is an integer and
/// `lg_init >= lg_min`
fn starting_sub_multiple(lg_target: u8, lg_min: u8, lg_resize_factor: u8) -> u8 {
    if lg_target <= lg_min {
        lg_min
    } else if lg_resize_factor == 0 {
        lg_target
    } else {
        ((lg_target - lg_min) % lg_resize_factor) + lg_min
    }
}

/// Compute initial theta for hash table based on sampling probability.
///
/// Never returns 0, however small the probability: a zero theta has no defined estimate.
pub(crate) fn starting_theta_from_sampling_probability(sampling_probability: f32) -> u64 {
    if sampling_probability < 1.0 {
        ((MAX_THETA as f64 * sampling_probability as f64) as u64).max(1)
    } else {
        MAX_THETA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::DEFAULT_UPDATE_SEED;
    use crate::hash::hash_key;

    fn key_of(i: usize) -> u64 {
        hash_key(format!("value_{i}"), DEFAULT_UPDATE_SEED)
    }

    fn insert_count(table: &mut QuickSelectTable<u32>, key: u64) -> bool {
        table.upsert(key, |slot| match slot {
            Some(count) => *count += 1,
            None => *slot = Some(1),
        })
    }

    fn populate(table: &mut QuickSelectTable<u32>, range: std::ops::Range<usize>) -> usize {
        range.filter(|&i| insert_count(table, key_of(i))).count()
    }

    #[test]
    fn test_new_hash_table() {
        let table = QuickSelectTable::<u32>::new(8, ResizeFactor::X8, 1.0);

        assert_eq!(
            table.lg_cur_size,
            starting_sub_multiple(8 + 1, MIN_LG_ARR, ResizeFactor::X8.lg_value())
        );
        assert_eq!(table.theta, MAX_THETA);
        assert_eq!(table.num_entries(), 0);
        assert!(table.is_empty());
        assert_eq!(table.entries().count(), 0);
    }

    #[test]
    fn test_search_and_insert_all() {
        let source = [key_of(1), key_of(2), 0, key_of(3)];
        let mut dest = vec![0u64; 16];
        insert_all(&source, &mut dest, 4, MAX_THETA);

        for key in source.iter().filter(|&&k| k != 0) {
            let index = search(&dest, 4, *key).unwrap();
            assert_eq!(dest[index], *key);
        }
        assert_eq!(search(&dest, 4, key_of(4)), None);
        assert_eq!(dest.iter().filter(|&&k| k != 0).count(), 3);
    }

    #[test]
    fn test_insert_all_screens_by_theta() {
        let mut source = [key_of(1), key_of(2), key_of(3)];
        source.sort_unstable();
        let mut dest = vec![0u64; 16];
        insert_all(&source, &mut dest, 4, source[1]);

        assert!(search(&dest, 4, source[0]).is_some());
        assert!(search(&dest, 4, source[1]).is_none());
        assert!(search(&dest, 4, source[2]).is_none());
    }

    #[test]
    fn test_upsert() {
        let mut table = QuickSelectTable::<u32>::new(5, ResizeFactor::X8, 1.0);

        let key = key_of(0);
        assert!(insert_count(&mut table, key));
        assert_eq!(table.num_entries(), 1);
        assert!(!table.is_empty());

        // the same key updates its summary in place
        assert!(!insert_count(&mut table, key));
        assert_eq!(table.num_entries(), 1);
        assert_eq!(table.get(key), Some(&2));

        // 0 is reserved for empty slots
        assert!(!insert_count(&mut table, 0));
        assert_eq!(table.num_entries(), 1);
    }

    #[test]
    fn test_upsert_screened_key_marks_non_empty() {
        let mut table = QuickSelectTable::<u32>::new(5, ResizeFactor::X8, 1.0);
        table.theta = 1;

        assert!(!insert_count(&mut table, key_of(0)));
        assert!(!table.is_empty());
        assert_eq!(table.num_entries(), 0);
    }

    #[test]
    fn test_upsert_declined_insertion() {
        let mut table = QuickSelectTable::<u32>::new(5, ResizeFactor::X8, 1.0);
        assert!(!table.upsert(key_of(0), |_| {}));
        assert_eq!(table.num_entries(), 0);
        assert_eq!(table.get(key_of(0)), None);
    }

    #[test]
    fn test_resize() {
        {
            let mut table = QuickSelectTable::<u32>::new(8, ResizeFactor::X2, 1.0);
            assert_eq!(table.keys.len(), 32);

            // Capacity = 32 * 0.5 = 16
            let inserted = populate(&mut table, 0..20);
            assert_eq!(table.num_entries(), inserted);
            assert_eq!(table.keys.len(), 64);
        }

        {
            let mut table = QuickSelectTable::<u32>::new(8, ResizeFactor::X4, 1.0);
            assert_eq!(table.keys.len(), 32);

            let inserted = populate(&mut table, 0..20);
            assert_eq!(table.num_entries(), inserted);
            assert_eq!(table.keys.len(), 128);
        }
    }

    #[test]
    fn test_resize_keeps_summaries() {
        let mut table = QuickSelectTable::<u32>::new(8, ResizeFactor::X2, 1.0);
        populate(&mut table, 0..20);
        populate(&mut table, 0..20);
        assert_eq!(table.num_entries(), 20);
        assert!(table.entries().all(|(_, count)| *count == 2));
    }

    #[test]
    fn test_rebuild() {
        let mut table = QuickSelectTable::<u32>::new(5, ResizeFactor::X8, 1.0);

        assert_eq!(table.lg_cur_size, 6);
        assert_eq!(table.keys.len(), 64);
        assert_eq!(table.theta, MAX_THETA);

        populate(&mut table, 0..100);
        let new_theta = table.theta();
        assert!(new_theta < MAX_THETA, "Theta should be reduced after rebuild");

        populate(&mut table, 100..200);
        assert_eq!(table.lg_cur_size, 6);
        assert!(table.theta < new_theta);
        assert!(table.entries().all(|(key, _)| key < table.theta()));
        assert!(table.num_entries() <= 60);
    }

    #[test]
    fn test_rebuild_preserves_entries_less_than_kth() {
        let mut table = QuickSelectTable::<u32>::new(5, ResizeFactor::X8, 1.0);
        let k = 1usize << 5;

        // rebuild threshold is 15/16 * 64 = 60, the 61st distinct key triggers it
        let mut inserted = Vec::new();
        let mut i = 0;
        while inserted.len() <= 60 {
            let key = key_of(i);
            i += 1;
            if insert_count(&mut table, key) {
                inserted.push(key);
            }
        }

        inserted.sort_unstable();
        let kth = inserted[k];
        assert_eq!(table.theta(), kth);
        assert_eq!(table.num_entries(), k);
        assert!(table.entries().all(|(key, _)| key < kth));
    }

    #[test]
    fn test_trim() {
        let mut table = QuickSelectTable::<u32>::new(5, ResizeFactor::X8, 1.0);
        populate(&mut table, 0..100);
        assert!(table.num_entries() > 32);

        table.trim();
        assert_eq!(table.num_entries(), 32);
        assert!(table.theta() < MAX_THETA);
    }

    #[test]
    fn test_trim_when_not_needed() {
        let mut table = QuickSelectTable::<u32>::new(8, ResizeFactor::X8, 1.0);
        populate(&mut table, 0..10);

        let before_theta = table.theta();
        table.trim();
        assert_eq!(table.num_entries(), 10);
        assert_eq!(before_theta, table.theta());
    }

    #[test]
    fn test_reset() {
        let mut table = QuickSelectTable::<u32>::new(8, ResizeFactor::X8, 1.0);
        let init_lg_cur = table.lg_cur_size;
        let init_len = table.keys.len();

        populate(&mut table, 0..100);
        assert!(!table.is_empty());

        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.num_entries(), 0);
        assert_eq!(table.theta(), MAX_THETA);
        assert_eq!(table.lg_cur_size, init_lg_cur);
        assert_eq!(table.keys.len(), init_len);
        assert_eq!(table.entries().count(), 0);
    }

    #[test]
    fn test_table_with_sampling() {
        let mut table = QuickSelectTable::<u32>::new(8, ResizeFactor::X8, 0.5);
        assert_eq!(table.theta(), (MAX_THETA as f64 * 0.5) as u64);

        populate(&mut table, 0..10);
        assert!(table.entries().all(|(key, _)| key < table.theta()));

        table.reset();
        assert_eq!(table.theta(), (MAX_THETA as f64 * 0.5) as u64);
        assert!(table.is_empty());
    }

    #[test]
    fn test_for_entries_never_rebuilds() {
        let mut table = QuickSelectTable::<u32>::for_entries(1000);
        let inserted = populate(&mut table, 0..1000);
        assert_eq!(inserted, 1000);
        assert_eq!(table.num_entries(), 1000);
        assert_eq!(table.theta(), MAX_THETA);
    }

    #[test]
    fn test_starting_theta_never_zero() {
        assert_eq!(starting_theta_from_sampling_probability(1.0), MAX_THETA);
        assert_eq!(starting_theta_from_sampling_probability(1e-20), 1);
        assert_eq!(starting_theta_from_sampling_probability(f32::MIN_POSITIVE), 1);

        let table = QuickSelectTable::<u32>::new(8, ResizeFactor::X8, 1e-20);
        assert_eq!(table.theta(), 1);
    }
}
