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

use crate::error::Error;

/// A per-key payload retained by a tuple sketch.
///
/// Summaries are created by a [`SummaryFactory`] the first time a key is seen and then updated
/// in place with every value that arrives for the same key.
pub trait Summary: Clone {
    /// The type of the values a summary is updated with.
    type Value;

    /// Folds `value` into this summary.
    fn update(&mut self, value: Self::Value);
}

/// Creates fresh summaries for an [`UpdatableSketch`](crate::tuple::UpdatableSketch).
pub trait SummaryFactory {
    /// The summary type created by this factory.
    type Summary: Summary;

    /// Returns a new summary in its initial state.
    fn new_summary(&self) -> Self::Summary;
}

/// Combines the summaries of a key present on both sides of a set operation.
pub trait SummarySetOperations {
    /// The summary type combined by these operations.
    type Summary: Summary;

    /// Merges two summaries of the same key during a union.
    fn union(&self, a: &Self::Summary, b: &Self::Summary) -> Self::Summary;

    /// Merges two summaries of the same key during an intersection.
    fn intersection(&self, a: &Self::Summary, b: &Self::Summary) -> Self::Summary;
}

/// Binary encoding of a summary, used by
/// [`CompactSketch::serialize`](crate::tuple::CompactSketch::serialize).
pub trait SummarySerde: Summary + Sized {
    /// Appends the encoded summary to `out`.
    fn serialize_to(&self, out: &mut Vec<u8>);

    /// Decodes a summary from the start of `bytes`.
    ///
    /// Returns the summary together with the number of bytes it occupied.
    fn deserialize_from(bytes: &[u8]) -> Result<(Self, usize), Error>;
}
