// Copyright (c) 2026 asm-names Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde_json::{json, Value};

/// Size of one instruction word. Both the scanner stride and name block alignment use it.
pub const WORD_SIZE: usize = 4;

/// A contiguous memory region rebuilt from a listing.
///
/// Index `k` of `bytes` is the byte at address `base + k`. Address ranges the listing
/// skipped are zero filled, so the mapping never drifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteImage {
    base: u64,
    bytes: Vec<u8>,
}

impl ByteImage {
    /// Panics if `base + bytes.len()` does not fit in a `u64`; the reconstructor rejects
    /// such listings with `ListingError::AddressOverflow` before getting here.
    pub fn new(base: u64, bytes: Vec<u8>) -> Self {
        assert!(
            base.checked_add(bytes.len() as u64).is_some(),
            "image at 0x{:x} with {} bytes overflows the address space",
            base,
            bytes.len()
        );
        Self { base, bytes }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One past the last address covered by the image.
    pub fn end(&self) -> u64 {
        self.base + self.bytes.len() as u64
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// `index` may be at most `len()`, so the result never passes `end()`.
    pub fn address_of(&self, index: usize) -> u64 {
        debug_assert!(index <= self.bytes.len());
        self.base + index as u64
    }

    pub fn offset_of(&self, addr: u64) -> Option<usize> {
        if self.contains(addr) {
            Some((addr - self.base) as usize)
        } else {
            None
        }
    }

    /// The instruction word starting at `index`, or `None` for a short read at the end.
    pub fn word_at(&self, index: usize) -> Option<[u8; WORD_SIZE]> {
        let end = index.checked_add(WORD_SIZE)?;
        self.bytes.get(index..end)?.try_into().ok()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "base": format!("0x{:x}", self.base),
            "end": format!("0x{:x}", self.end()),
            "size": self.bytes.len(),
        })
    }
}

/// Round `index` up to the next instruction word boundary.
pub fn align_up(index: usize) -> usize {
    index.div_ceil(WORD_SIZE) * WORD_SIZE
}
