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

use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::ensure_preamble_longs_in;
use crate::codec::ensure_serial_version_is;
use crate::codec::insufficient_data;
use crate::error::Error;
use crate::theta::MAX_THETA;
use crate::tuple::SummarySerde;
use crate::tuple::serialization::*;
use crate::tuple::sketch::Iter;
use crate::tuple::sketch::Sketch;
use crate::tuple::sketch::private;

/// Immutable tuple sketch.
///
/// Produced by [`Sketch::compact`] or by the `get_result` method of a set operation. Entries are
/// kept in the order they were retained, not sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactSketch<S> {
    theta: u64,
    keys: Vec<u64>,
    summaries: Vec<S>,
    is_empty: bool,
}

impl<S> CompactSketch<S> {
    pub(crate) fn new(theta: u64, keys: Vec<u64>, summaries: Vec<S>, is_empty: bool) -> Self {
        debug_assert_eq!(keys.len(), summaries.len());
        Self {
            theta,
            keys,
            summaries,
            is_empty,
        }
    }

    /// Returns the canonical empty sketch: no entries, theta at its maximum and the empty flag
    /// set. Set operations substitute it for absent operands.
    pub fn empty() -> Self {
        Self::new(MAX_THETA, Vec::new(), Vec::new(), true)
    }

    /// Returns the retained keys.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Returns the retained summaries, parallel to [`keys`](Self::keys).
    pub fn summaries(&self) -> &[S] {
        &self.summaries
    }
}

impl<S> Default for CompactSketch<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> private::Sealed for CompactSketch<S> {
    fn key_table(&self) -> Option<(&[u64], u8)> {
        None
    }
}

impl<S> Sketch<S> for CompactSketch<S> {
    fn is_empty(&self) -> bool {
        self.is_empty
    }

    fn theta64(&self) -> u64 {
        self.theta
    }

    fn num_retained(&self) -> usize {
        self.keys.len()
    }

    fn iter(&self) -> Iter<'_, S> {
        Iter::compact(&self.keys, &self.summaries)
    }
}

impl<S: SummarySerde> CompactSketch<S> {
    /// Serializes this sketch into a byte vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tuplesketch::tuple::CompactSketch;
    /// # use tuplesketch::tuple::DoubleSummary;
    /// # use tuplesketch::tuple::DoubleSummaryFactory;
    /// # use tuplesketch::tuple::Sketch;
    /// # use tuplesketch::tuple::UpdatableSketch;
    /// let mut sketch = UpdatableSketch::builder(DoubleSummaryFactory::default()).build();
    /// sketch.update(1, 2.0);
    /// let bytes = sketch.compact().serialize();
    /// let restored = CompactSketch::<DoubleSummary>::deserialize(&bytes).unwrap();
    /// assert_eq!(restored.num_retained(), 1);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let num_entries = self.keys.len();
        let has_theta = self.theta < MAX_THETA;

        let mut size = PREAMBLE_LONGS as usize * 8;
        if has_theta {
            size += 8;
        }
        if num_entries > 0 {
            size += 8 + num_entries * (KEY_SIZE_BYTES + 8);
        }
        let mut bytes = SketchBytes::with_capacity(size);

        bytes.write_u8(PREAMBLE_LONGS);
        bytes.write_u8(SER_VER);
        bytes.write_u8(Family::TUPLE.id);
        bytes.write_u8(SKETCH_TYPE_COMPACT);

        let mut flags = FLAG_READ_ONLY;
        if self.is_empty {
            flags |= FLAG_EMPTY;
        }
        if num_entries > 0 {
            flags |= FLAG_HAS_ENTRIES;
        }
        if has_theta {
            flags |= FLAG_THETA_INCLUDED;
        }
        bytes.write_u8(flags);
        bytes.write(&[0u8; 3]);

        if has_theta {
            bytes.write_u64_le(self.theta);
        }

        if num_entries > 0 {
            bytes.write_u32_le(num_entries as u32);
            bytes.write_u32_le(0);
            for key in &self.keys {
                bytes.write_u64_le(*key);
            }
            let out = bytes.as_mut_vec();
            for summary in &self.summaries {
                summary.serialize_to(out);
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is too short
    /// - The family ID doesn't match
    /// - The serial version is unsupported
    /// - The preamble size or sketch type is not recognized
    /// - A key or summary is malformed
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);

        let preamble_longs = cursor
            .read_u8()
            .map_err(insufficient_data("preamble_longs"))?;
        let serial_version = cursor
            .read_u8()
            .map_err(insufficient_data("serial_version"))?;
        let family_id = cursor.read_u8().map_err(insufficient_data("family_id"))?;
        let sketch_type = cursor.read_u8().map_err(insufficient_data("sketch_type"))?;
        let flags = cursor.read_u8().map_err(insufficient_data("flags"))?;

        Family::TUPLE.validate_id(family_id)?;
        ensure_serial_version_is(SER_VER, serial_version)?;
        ensure_preamble_longs_in(&Family::TUPLE.pre_longs(), preamble_longs)?;
        if sketch_type != SKETCH_TYPE_COMPACT {
            return Err(Error::deserial(format!(
                "unsupported sketch type: expected {SKETCH_TYPE_COMPACT}, got {sketch_type}"
            )));
        }

        let is_empty = (flags & FLAG_EMPTY) != 0;
        let has_entries = (flags & FLAG_HAS_ENTRIES) != 0;
        if is_empty && has_entries {
            return Err(Error::deserial("empty sketch cannot have entries"));
        }
        let mut unused = [0u8; 3];
        cursor
            .read_exact(&mut unused)
            .map_err(insufficient_data("unused"))?;

        let theta = if (flags & FLAG_THETA_INCLUDED) != 0 {
            let theta = cursor.read_u64_le().map_err(insufficient_data("theta"))?;
            if theta == 0 || theta > MAX_THETA {
                return Err(Error::deserial(format!("theta out of range: {theta}")));
            }
            theta
        } else {
            MAX_THETA
        };

        if !has_entries {
            return Ok(Self::new(theta, Vec::new(), Vec::new(), is_empty));
        }

        let num_entries = cursor
            .read_u32_le()
            .map_err(insufficient_data("num_entries"))? as usize;
        cursor.read_u32_le().map_err(insufficient_data("unused"))?;

        let mut keys = Vec::with_capacity(num_entries.min(bytes.len() / KEY_SIZE_BYTES));
        for _ in 0..num_entries {
            let key = cursor.read_u64_le().map_err(insufficient_data("keys"))?;
            // keys at or above theta are legal, see `AnotB` against an operand without entries
            if key == 0 {
                return Err(
                    Error::deserial("key 0 marks an empty slot").with_context("theta", theta)
                );
            }
            keys.push(key);
        }

        let mut summaries = Vec::with_capacity(keys.len());
        for _ in 0..num_entries {
            let (summary, consumed) = S::deserialize_from(cursor.remaining())?;
            cursor.advance(consumed as u64);
            summaries.push(summary);
        }

        Ok(Self::new(theta, keys, summaries, is_empty))
    }
}
