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

//! Tuple sketches: theta sketches carrying a summary per retained key.
//!
//! A tuple sketch estimates the number of distinct keys in a stream, and for every key it
//! retains it also keeps a [`Summary`] aggregated from the values that came with that key.
//! Sketches support set operations:
//!
//! - [`Union`] merges any number of sketches, combining summaries of shared keys.
//! - [`Intersection`] keeps the keys present in every operand.
//! - [`AnotB`] keeps the keys of one sketch that are absent from another.
//!
//! Each operation also accepts plain [`ThetaSketch`](crate::theta::ThetaSketch) operands.
//!
//! # Usage
//!
//! ```rust
//! # use tuplesketch::tuple::DoubleSummaryFactory;
//! # use tuplesketch::tuple::DoubleSummaryMode;
//! # use tuplesketch::tuple::DoubleSummarySetOperations;
//! # use tuplesketch::tuple::Intersection;
//! # use tuplesketch::tuple::Sketch;
//! # use tuplesketch::tuple::UpdatableSketch;
//! let factory = DoubleSummaryFactory::new(DoubleSummaryMode::Sum);
//! let mut clicks = UpdatableSketch::builder(factory).build();
//! let mut purchases = UpdatableSketch::builder(factory).build();
//! for user in 0..100 {
//!     clicks.update(user, 1.0);
//! }
//! for user in 50..150 {
//!     purchases.update(user, 10.0);
//! }
//!
//! let mut both = Intersection::new(DoubleSummarySetOperations::new(DoubleSummaryMode::Sum));
//! both.update(Some(&clicks));
//! both.update(Some(&purchases));
//! let result = both.get_result();
//! assert_eq!(result.estimate(), 50.0);
//! assert!(result.iter().all(|(_, summary)| summary.value() == 11.0));
//! ```

mod a_not_b;
mod adouble;
mod compact;
mod intersection;
mod serialization;
mod sketch;
mod summary;
mod union;
mod updatable;

pub use self::a_not_b::AnotB;
pub use self::adouble::DoubleSummary;
pub use self::adouble::DoubleSummaryFactory;
pub use self::adouble::DoubleSummaryMode;
pub use self::adouble::DoubleSummarySetOperations;
pub use self::compact::CompactSketch;
pub use self::intersection::Intersection;
pub use self::sketch::Iter;
pub use self::sketch::Sketch;
pub use self::summary::Summary;
pub use self::summary::SummaryFactory;
pub use self::summary::SummarySerde;
pub use self::summary::SummarySetOperations;
pub use self::union::Union;
pub use self::updatable::UpdatableSketch;
pub use self::updatable::UpdatableSketchBuilder;
