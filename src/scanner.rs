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

//! Name block detection.
//!
//! Some compilers leave a traceback-style label next to each function:
//!
//! ```text
//! 00 04 4d 41   \0 len 'M' 'A'
//! 49 4e 00 00   'I' 'N' \0 pad
//! ```
//!
//! The scanner walks the image one instruction word at a time, validates such blocks and
//! decides which code address each recovered name belongs to.

use log::{debug, trace};

use crate::memory::{align_up, ByteImage, WORD_SIZE};
use crate::names::NameMap;

/// `cror 31,31,31`, emitted right before the function body the label belongs to.
pub const DEFAULT_MARKER: [u8; WORD_SIZE] = [0x4f, 0xff, 0xfb, 0x82];

/// Which address a recovered name is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociationPolicy {
    /// The name describes the code that follows the previous name block. The very
    /// first block has no predecessor and falls back to its own address.
    #[default]
    FollowsPrevious,
    /// The name is filed under the address of its own block.
    BlockAddress,
    /// Search backwards from the block for this instruction word and use its address.
    /// Names with no marker before them are dropped.
    Marker([u8; WORD_SIZE]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Smallest accepted length byte (inclusive).
    pub min_len: u8,
    /// Length bytes at or above this are rejected.
    pub max_len: u8,
    /// Require a null right after the characters.
    pub require_terminator: bool,
    pub policy: AssociationPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_len: 40,
            require_terminator: true,
            policy: AssociationPolicy::default(),
        }
    }
}

/// A validated name block inside the image.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NameBlock {
    /// Index one past the last character, where the terminating null sits.
    end: usize,
    name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Words whose null and length bytes looked like a block header.
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
}

fn is_name_char(b: u8) -> bool {
    // 0x21..=0x7e, space excluded
    b.is_ascii_graphic()
}

/// Does the word at `i` hold the header of a length-prefixed name?
fn is_candidate(data: &[u8], i: usize, config: &ScanConfig) -> bool {
    match data.get(i..i + WORD_SIZE) {
        Some(quad) => quad[0] == 0 && quad[1] >= config.min_len && quad[1] < config.max_len,
        None => false,
    }
}

/// Validate a name block whose header sits at `i`. Call only for candidates.
fn read_block(data: &[u8], i: usize, config: &ScanConfig) -> Option<NameBlock> {
    let length = data[i + 1];
    let end = i + 2 + length as usize;

    if config.require_terminator {
        if end >= data.len() || data[end] != 0 {
            return None;
        }
    } else if end > data.len() {
        return None;
    }

    let chars = &data[i + 2..end];
    if chars.is_empty() || !chars.iter().copied().all(is_name_char) {
        return None;
    }

    // Every byte is 7-bit here, so this is the same as decoding UTF-8.
    let name: String = chars.iter().map(|b| char::from(*b)).collect();
    Some(NameBlock { end, name })
}

/// Step over the block and any all-zero padding words after it.
fn skip_padding(data: &[u8], block_end: usize) -> usize {
    let mut pos = align_up(block_end);
    while let Some(word) = data.get(pos..pos + WORD_SIZE) {
        if word.iter().any(|b| *b != 0) {
            break;
        }
        pos += WORD_SIZE;
    }
    pos
}

/// Nearest word at or before `from` equal to `marker`, stepping back one word at a time.
fn find_marker_before(data: &[u8], from: usize, marker: &[u8; WORD_SIZE]) -> Option<usize> {
    (0..=from)
        .rev()
        .step_by(WORD_SIZE)
        .find(|j| data.get(*j..*j + WORD_SIZE) == Some(&marker[..]))
}

pub fn scan(image: &ByteImage, config: &ScanConfig) -> NameMap {
    scan_with_stats(image, config).0
}

pub fn scan_with_stats(image: &ByteImage, config: &ScanConfig) -> (NameMap, ScanStats) {
    let data = image.bytes();
    let mut names = NameMap::new();
    let mut stats = ScanStats::default();
    // Cursor left behind by the last accepted block.
    let mut prev: Option<usize> = None;
    let mut i = 0;

    while i < data.len() {
        if !is_candidate(data, i, config) {
            i += WORD_SIZE;
            continue;
        }
        stats.candidates += 1;

        let Some(block) = read_block(data, i, config) else {
            trace!("rejected candidate at 0x{:x}", image.address_of(i));
            stats.rejected += 1;
            i += WORD_SIZE;
            continue;
        };
        stats.accepted += 1;

        match config.policy {
            AssociationPolicy::FollowsPrevious | AssociationPolicy::BlockAddress => {
                let at = match config.policy {
                    AssociationPolicy::FollowsPrevious => prev.unwrap_or(i),
                    _ => i,
                };
                let address = image.address_of(at);
                debug!(
                    "name {:?} at 0x{:x} -> 0x{:x}",
                    block.name,
                    image.address_of(i),
                    address
                );
                names.insert(address, block.name);

                let next = skip_padding(data, block.end);
                prev = Some(next);
                i = next;
            }
            AssociationPolicy::Marker(marker) => {
                match find_marker_before(data, i, &marker) {
                    Some(j) => {
                        let address = image.address_of(j);
                        debug!(
                            "name {:?} at 0x{:x} -> marker 0x{:x}",
                            block.name,
                            image.address_of(i),
                            address
                        );
                        names.insert(address, block.name);
                    }
                    None => debug!(
                        "name {:?} at 0x{:x} has no marker before it",
                        block.name,
                        image.address_of(i)
                    ),
                }
                i += WORD_SIZE;
            }
        }
    }

    debug!(
        "scan done: {} candidates, {} accepted, {} rejected, {} names",
        stats.candidates,
        stats.accepted,
        stats.rejected,
        names.len()
    );
    (names, stats)
}
