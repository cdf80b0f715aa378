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

//! Binary encoding primitives shared by the serializable sketches of this crate.

mod assert;
mod decode;
mod encode;
mod family;

pub(crate) use self::assert::ensure_preamble_longs_in;
pub(crate) use self::assert::ensure_serial_version_is;
pub(crate) use self::assert::insufficient_data;
pub(crate) use self::decode::SketchSlice;
pub(crate) use self::encode::SketchBytes;
pub(crate) use self::family::Family;
