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

//! Serialization constants for compact tuple sketches.

/// Serialization version.
pub(crate) const SER_VER: u8 = 1;

/// Preamble size in longs. Theta and the entry count follow the preamble when present.
pub(crate) const PREAMBLE_LONGS: u8 = 1;

/// Sketch type byte of a compact sketch.
pub(crate) const SKETCH_TYPE_COMPACT: u8 = 1;

pub(crate) const FLAG_READ_ONLY: u8 = 1 << 1;
pub(crate) const FLAG_EMPTY: u8 = 1 << 2;
pub(crate) const FLAG_HAS_ENTRIES: u8 = 1 << 3;
pub(crate) const FLAG_THETA_INCLUDED: u8 = 1 << 4;

/// Size of a serialized key in bytes.
pub(crate) const KEY_SIZE_BYTES: usize = 8;
