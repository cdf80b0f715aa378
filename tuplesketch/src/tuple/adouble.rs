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

//! A summary holding a single `f64`, aggregated by sum, minimum or maximum.

use crate::codec::SketchSlice;
use crate::codec::insufficient_data;
use crate::error::Error;
use crate::tuple::Summary;
use crate::tuple::SummaryFactory;
use crate::tuple::SummarySerde;
use crate::tuple::SummarySetOperations;

/// How a [`DoubleSummary`] folds in new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoubleSummaryMode {
    /// Add up every value.
    #[default]
    Sum,
    /// Keep the smallest value.
    Min,
    /// Keep the largest value.
    Max,
}

impl DoubleSummaryMode {
    fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            DoubleSummaryMode::Sum => a + b,
            DoubleSummaryMode::Min => a.min(b),
            DoubleSummaryMode::Max => a.max(b),
        }
    }

    fn initial_value(self) -> f64 {
        match self {
            DoubleSummaryMode::Sum => 0.0,
            DoubleSummaryMode::Min => f64::INFINITY,
            DoubleSummaryMode::Max => f64::NEG_INFINITY,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            DoubleSummaryMode::Sum => 0,
            DoubleSummaryMode::Min => 1,
            DoubleSummaryMode::Max => 2,
        }
    }

    fn try_from_u8(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(DoubleSummaryMode::Sum),
            1 => Ok(DoubleSummaryMode::Min),
            2 => Ok(DoubleSummaryMode::Max),
            _ => Err(Error::deserial(format!(
                "invalid double summary mode: {value}"
            ))),
        }
    }
}

/// Summary holding a single `f64` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleSummary {
    value: f64,
    mode: DoubleSummaryMode,
}

impl DoubleSummary {
    /// Create a summary in the initial state of `mode`: `0` for sums, `+inf` for minimums and
    /// `-inf` for maximums.
    pub fn new(mode: DoubleSummaryMode) -> Self {
        Self {
            value: mode.initial_value(),
            mode,
        }
    }

    /// Create a summary holding `value`.
    pub fn with_value(value: f64, mode: DoubleSummaryMode) -> Self {
        Self { value, mode }
    }

    /// Return the aggregated value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Return the aggregation mode
    pub fn mode(&self) -> DoubleSummaryMode {
        self.mode
    }
}

impl Summary for DoubleSummary {
    type Value = f64;

    fn update(&mut self, value: f64) {
        self.value = self.mode.combine(self.value, value);
    }
}

impl SummarySerde for DoubleSummary {
    fn serialize_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_le_bytes());
        out.push(self.mode.as_u8());
    }

    fn deserialize_from(bytes: &[u8]) -> Result<(Self, usize), Error> {
        let mut cursor = SketchSlice::new(bytes);
        let mut value = [0u8; 8];
        cursor
            .read_exact(&mut value)
            .map_err(insufficient_data("double_summary_value"))?;
        let mode = cursor
            .read_u8()
            .map_err(insufficient_data("double_summary_mode"))?;
        let summary = Self {
            value: f64::from_le_bytes(value),
            mode: DoubleSummaryMode::try_from_u8(mode)?,
        };
        Ok((summary, 9))
    }
}

/// Creates [`DoubleSummary`] values for an updatable sketch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleSummaryFactory {
    mode: DoubleSummaryMode,
}

impl DoubleSummaryFactory {
    /// Create a factory of summaries aggregating with `mode`.
    pub fn new(mode: DoubleSummaryMode) -> Self {
        Self { mode }
    }
}

impl SummaryFactory for DoubleSummaryFactory {
    type Summary = DoubleSummary;

    fn new_summary(&self) -> DoubleSummary {
        DoubleSummary::new(self.mode)
    }
}

/// Combines [`DoubleSummary`] values in set operations.
///
/// Union and intersection can aggregate differently, e.g. summing on union while keeping the
/// minimum on intersection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleSummarySetOperations {
    union_mode: DoubleSummaryMode,
    intersection_mode: DoubleSummaryMode,
}

impl DoubleSummarySetOperations {
    /// Aggregate with `mode` for both union and intersection.
    pub fn new(mode: DoubleSummaryMode) -> Self {
        Self::with_modes(mode, mode)
    }

    /// Aggregate with `union_mode` on union and `intersection_mode` on intersection.
    pub fn with_modes(union_mode: DoubleSummaryMode, intersection_mode: DoubleSummaryMode) -> Self {
        Self {
            union_mode,
            intersection_mode,
        }
    }
}

impl SummarySetOperations for DoubleSummarySetOperations {
    type Summary = DoubleSummary;

    fn union(&self, a: &DoubleSummary, b: &DoubleSummary) -> DoubleSummary {
        let value = self.union_mode.combine(a.value, b.value);
        DoubleSummary::with_value(value, self.union_mode)
    }

    fn intersection(&self, a: &DoubleSummary, b: &DoubleSummary) -> DoubleSummary {
        let value = self.intersection_mode.combine(a.value, b.value);
        DoubleSummary::with_value(value, self.intersection_mode)
    }
}
