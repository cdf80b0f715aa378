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

//! Standard deviation enums for confidence bounds

/// Number of standard deviations for confidence bounds
///
/// Higher values provide wider confidence intervals with greater certainty that the true
/// cardinality falls within the bounds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumStdDev {
    /// One standard deviation (\~68% confidence interval)
    One = 1,
    /// Two standard deviations (\~95% confidence interval)
    Two = 2,
    /// Three standard deviations (\~99.7% confidence interval)
    Three = 3,
}

impl NumStdDev {
    /// Returns the number of standard deviations as an `u8`.
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Returns the number of standard deviations as an `f64`.
    pub const fn as_f64(&self) -> f64 {
        *self as u8 as f64
    }
}
