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

use thiserror::Error;

/// Errors raised while turning listing text into a byte image.
///
/// Lines that merely don't look like instructions are never errors, they are skipped.
/// Only input that looks like an instruction line but can't be honoured ends up here.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Not a single line carried a usable address.
    #[error("listing contains no addressable lines")]
    Empty,

    #[error("line {line}: invalid instruction bytes {text:?}: {source}")]
    Decode {
        line: usize,
        text: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("line {line}: gap of {gap:#x} bytes before 0x{address:x} exceeds limit of {limit:#x}")]
    GapTooLarge {
        line: usize,
        address: u64,
        gap: u64,
        limit: u64,
    },

    /// The bytes of a line would run past the top of the 64-bit address space.
    #[error("line {line}: {len} bytes at 0x{address:x} run past the end of the address space")]
    AddressOverflow { line: usize, address: u64, len: usize },

    #[error("failed to read listing: {0}")]
    Io(#[from] std::io::Error),
}
