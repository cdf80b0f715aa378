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

mod murmurhash;

use std::hash::Hash;

pub(crate) use self::murmurhash::MurmurHash3X64128;

/// The default seed used to hash keys of every sketch in this crate.
///
/// Two sketches can only be combined by a set operation when their keys were hashed with the
/// same seed; otherwise the mapping from source values to hashes differs between them.
pub(crate) const DEFAULT_UPDATE_SEED: u64 = 9001;

/// Hashes `value` into a sketch key.
///
/// Keys live in `[0, 2^63)`: the upper 63 bits of the first half of the 128-bit MurmurHash3.
/// A result of `0` is reserved for empty hash table slots and must be discarded by the caller.
pub(crate) fn hash_key<T: Hash>(value: T, seed: u64) -> u64 {
    let mut hasher = MurmurHash3X64128::with_seed(seed);
    value.hash(&mut hasher);
    let (h1, _) = hasher.finish128();
    h1 >> 1
}
