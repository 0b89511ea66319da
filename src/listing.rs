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

//! Listing parsing and byte image reconstruction.
//!
//! A listing is whatever text a disassembler printed, one instruction per line:
//!
//! ```text
//! ffc00100: 7c0802a6	mflr	r0
//! ffc00104: 9421fff0	stwu	r1,-16(r1)
//! ```
//!
//! Every line is classified first (see [`ListingLine`]) and only data lines contribute
//! bytes. Addresses the listing jumps over are zero filled so that the resulting
//! [`ByteImage`] keeps a 1:1 mapping between index and address.
use std::io::BufRead;

use log::{debug, info, warn};
use regex::Regex;

use crate::error::ListingError;
use crate::memory::ByteImage;

/// Marker printed in place of instruction bytes for memory the dumper couldn't read.
pub const OUT_OF_BOUNDS_MARKER: &str = "out of bounds";

/// Width of the address prefix the fixed width dialect keeps.
const FIXED_ADDRESS_DIGITS: usize = 8;

/// Largest zero fill accepted between two lines by default (16 MiB).
pub const DEFAULT_MAX_GAP: u64 = 16 * 1024 * 1024;

/// How the address column of a listing is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingDialect {
    /// `ffc00100:`; only the first 8 hex digits are significant.
    #[default]
    FixedWidth,
    /// Any number of hex digits, with every `:` removed before parsing.
    ColonStripped,
}

impl ListingDialect {
    /// Parse the address column (without its terminating colon).
    pub fn parse_address(self, field: &str) -> Option<u64> {
        match self {
            ListingDialect::FixedWidth => {
                let digits = field.get(..FIXED_ADDRESS_DIGITS).unwrap_or(field);
                parse_hex(digits)
            }
            ListingDialect::ColonStripped => {
                let digits: String = field.chars().filter(|c| *c != ':').collect();
                parse_hex(&digits)
            }
        }
    }
}

fn parse_hex(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructConfig {
    pub dialect: ListingDialect,
    /// Zero fill allowed between two consecutive lines; `None` means unbounded.
    pub max_gap: Option<u64>,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            dialect: ListingDialect::default(),
            max_gap: Some(DEFAULT_MAX_GAP),
        }
    }
}

/// What a single listing line means to the reconstructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingLine {
    /// Headers, labels, blank lines, anything without an address and code column.
    Ignored,
    /// The address is known but the dumper had no bytes for it.
    OutOfBounds { address: u64 },
    Data { address: u64, bytes: Vec<u8> },
}

/// Splits lines into their address and code columns and decodes the code column.
pub struct LineClassifier {
    dialect: ListingDialect,
    re_line: Regex,
}

impl LineClassifier {
    pub fn new(dialect: ListingDialect) -> Self {
        // <address>:<space or tab><code...>
        let re_line = Regex::new(r"^(\S+):\s+(.+)$").expect("line pattern is a valid regex");
        Self { dialect, re_line }
    }

    /// Classify one line. `line_no` is 1-based and only used for error reporting.
    pub fn classify(&self, line: &str, line_no: usize) -> Result<ListingLine, ListingError> {
        let Some(caps) = self.re_line.captures(line.trim()) else {
            return Ok(ListingLine::Ignored);
        };
        let Some(address) = self.dialect.parse_address(&caps[1]) else {
            return Ok(ListingLine::Ignored);
        };

        let rest = &caps[2];
        if rest.contains(OUT_OF_BOUNDS_MARKER) {
            return Ok(ListingLine::OutOfBounds { address });
        }

        let tokens = code_tokens(rest);
        if tokens.is_empty() {
            return Ok(ListingLine::Ignored);
        }

        let bytes = hex::decode(tokens.concat()).map_err(|source| ListingError::Decode {
            line: line_no,
            text: tokens.join(" "),
            source,
        })?;
        Ok(ListingLine::Data { address, bytes })
    }
}

/// The byte groups of a code column.
///
/// The column ends at the first tab. Within it, groups are whitespace separated and all
/// as wide as the first one (`7c0802a6`, or `00 20` in objdump), so the first token of a
/// different width or with non-hex characters is the mnemonic. The first token is always
/// taken, decoding reports it if it's malformed.
fn code_tokens(rest: &str) -> Vec<&str> {
    let column = rest.split('\t').next().unwrap_or_default();
    let mut words = column.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };
    let mut tokens = vec![first];
    tokens.extend(
        words.take_while(|w| w.len() == first.len() && w.chars().all(|c| c.is_ascii_hexdigit())),
    );
    tokens
}

/// Accumulates classified lines into a gap-filled byte buffer.
pub struct Reconstructor {
    classifier: LineClassifier,
    max_gap: Option<u64>,
    base: Option<u64>,
    bytes: Vec<u8>,
    line_no: usize,
    data_lines: usize,
    out_of_bounds_lines: usize,
    padded_bytes: u64,
}

impl Reconstructor {
    pub fn new(config: &ReconstructConfig) -> Self {
        Self {
            classifier: LineClassifier::new(config.dialect),
            max_gap: config.max_gap,
            base: None,
            bytes: Vec::new(),
            line_no: 0,
            data_lines: 0,
            out_of_bounds_lines: 0,
            padded_bytes: 0,
        }
    }

    /// Address the next appended byte will land at. Never overflows once every
    /// appended line passed the span check in `push_line`.
    fn next_address(&self, base: u64) -> Option<u64> {
        base.checked_add(self.bytes.len() as u64)
    }

    pub fn push_line(&mut self, line: &str) -> Result<(), ListingError> {
        self.line_no += 1;
        match self.classifier.classify(line, self.line_no)? {
            ListingLine::Ignored => {}
            ListingLine::OutOfBounds { address } => {
                self.base.get_or_insert(address);
                self.out_of_bounds_lines += 1;
                debug!("line {}: 0x{:x} is out of bounds", self.line_no, address);
            }
            ListingLine::Data { address, bytes } => {
                let overflow = ListingError::AddressOverflow {
                    line: self.line_no,
                    address,
                    len: bytes.len(),
                };
                // The last byte must still have an address; the image end must fit in u64.
                if address.checked_add(bytes.len() as u64).is_none() {
                    return Err(overflow);
                }
                let base = *self.base.get_or_insert(address);
                let Some(expected) = self.next_address(base) else {
                    return Err(overflow);
                };
                if address < expected {
                    warn!(
                        "line {}: 0x{:x} overlaps data already placed up to 0x{:x}, skipping",
                        self.line_no, address, expected
                    );
                    return Ok(());
                }
                let gap = address - expected;
                if gap > 0 {
                    if let Some(limit) = self.max_gap.filter(|limit| gap > *limit) {
                        return Err(ListingError::GapTooLarge {
                            line: self.line_no,
                            address,
                            gap,
                            limit,
                        });
                    }
                    debug!(
                        "line {}: filling 0x{:x} bytes before 0x{:x}",
                        self.line_no, gap, address
                    );
                    self.bytes.resize(self.bytes.len() + gap as usize, 0);
                    self.padded_bytes += gap;
                }
                self.bytes.extend_from_slice(&bytes);
                self.data_lines += 1;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<ByteImage, ListingError> {
        let base = self.base.ok_or(ListingError::Empty)?;
        info!(
            "Listing reconstructed: {} lines read, {} data, {} out of bounds, {} bytes at 0x{:x} ({} padding)",
            self.line_no,
            self.data_lines,
            self.out_of_bounds_lines,
            self.bytes.len(),
            base,
            self.padded_bytes
        );
        Ok(ByteImage::new(base, self.bytes))
    }
}

/// Rebuild the byte image described by `lines`.
pub fn reconstruct<I, S>(lines: I, config: &ReconstructConfig) -> Result<ByteImage, ListingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reconstructor = Reconstructor::new(config);
    for line in lines {
        reconstructor.push_line(line.as_ref())?;
    }
    reconstructor.finish()
}

/// Same as [`reconstruct`] but streams lines from a reader. Invalid UTF-8 is replaced
/// rather than rejected, listings are ASCII in practice.
pub fn reconstruct_reader<R: BufRead>(
    mut reader: R,
    config: &ReconstructConfig,
) -> Result<ByteImage, ListingError> {
    let mut reconstructor = Reconstructor::new(config);
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break; // EOF
        }
        while buf
            .last()
            .map(|b| *b == b'\n' || *b == b'\r')
            .unwrap_or(false)
        {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf);
        reconstructor.push_line(&line)?;
    }
    reconstructor.finish()
}
