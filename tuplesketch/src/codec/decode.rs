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

use std::io;
use std::io::Cursor;
use std::io::Read;

/// A wrapper around a byte slice that provides methods for reading various types of data from it.
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl<'a> SketchSlice<'a> {
    /// Creates a new `SketchSlice` from the given byte slice.
    pub fn new(slice: &'a [u8]) -> SketchSlice<'a> {
        SketchSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Advances the position of the slice by `n` bytes.
    pub fn advance(&mut self, n: u64) {
        let pos = self.slice.position();
        self.slice.set_position(pos + n);
    }

    /// Returns the bytes that have not been consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        let inner: &'a [u8] = *self.slice.get_ref();
        let pos = (self.slice.position() as usize).min(inner.len());
        &inner[pos..]
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.slice.read_exact(buf)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a 32-bit unsigned integer from the slice in little-endian byte order.
    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a 64-bit unsigned integer from the slice in little-endian byte order.
    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_tracks_position() {
        let data = [1u8, 0, 0, 0, 7, 8];
        let mut slice = SketchSlice::new(&data);
        assert_eq!(slice.read_u32_le().unwrap(), 1);
        assert_eq!(slice.remaining(), &[7, 8]);
        slice.advance(1);
        assert_eq!(slice.remaining(), &[8]);
        slice.advance(5);
        assert!(slice.remaining().is_empty());
        assert!(slice.read_u8().is_err());
    }
}
