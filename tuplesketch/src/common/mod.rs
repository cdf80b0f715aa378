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

//! Data structures and functions shared by the sketch families of this crate.

mod num_std_dev;
mod resize;
pub use self::num_std_dev::NumStdDev;
pub use self::resize::ResizeFactor;

pub(crate) mod bounds;

/// Canonicalize double value so that `-0.0` and every NaN hash the same way
pub(crate) fn canonical_double(value: f64) -> i64 {
    if value.is_nan() {
        // Java's Double.doubleToLongBits() NaN value
        0x7ff8000000000000i64
    } else {
        // -0.0 + 0.0 == +0.0 under IEEE754 roundTiesToEven rounding mode,
        // which Rust guarantees.
        (value + 0.0).to_bits() as i64
    }
}

/// Smallest power of two that is greater than or equal to `n`, and at least 1.
pub(crate) fn ceiling_power_of_2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}
