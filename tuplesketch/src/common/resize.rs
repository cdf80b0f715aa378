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

/// Controls how fast the internal hash table of a sketch grows when more space is required.
///
/// Sketches configured with a Resize Factor greater than X1 start out with a hash table that is
/// the smallest sub-multiple of the full table size (and not smaller than the minimum table
/// size), then multiply the table size by the factor every time it fills up, until the full size
/// is reached. From then on the table is rebuilt in place, lowering theta.
///
/// "X1" means no resizing is allowed and the sketch will be initialized at full size.
///
/// # Examples
///
/// ```
/// # use tuplesketch::common::ResizeFactor;
/// let factor = ResizeFactor::X4;
/// assert_eq!(factor.value(), 4);
/// assert_eq!(factor.lg_value(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFactor {
    /// Do not resize. The table is allocated at full size.
    X1,
    /// Resize by factor of 2
    X2,
    /// Resize by factor of 4
    X4,
    /// Resize by factor of 8
    X8,
}

impl ResizeFactor {
    /// Returns the Log-base 2 of the Resize Factor
    pub fn lg_value(self) -> u8 {
        match self {
            ResizeFactor::X1 => 0,
            ResizeFactor::X2 => 1,
            ResizeFactor::X4 => 2,
            ResizeFactor::X8 => 3,
        }
    }

    /// Returns the Resize Factor.
    pub fn value(self) -> usize {
        1 << self.lg_value()
    }
}
