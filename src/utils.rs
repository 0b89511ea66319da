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

use crate::memory::WORD_SIZE;

/// Parse hex address from string (supports "0x1234" or "1234" format)
pub fn parse_hex_address(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(hex_str, 16).ok()
}

/// Parse an instruction word written as 8 hex digits, e.g. "4ffffb82" or "0x4ffffb82".
/// Byte order is the order the digits are written in, same as the listing's code column.
pub fn parse_marker_word(input: &str) -> Option<[u8; WORD_SIZE]> {
    let trimmed = input.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_addresses() {
        assert_eq!(parse_hex_address("0xffc00100"), Some(0xffc0_0100));
        assert_eq!(parse_hex_address(" ffc00100 "), Some(0xffc0_0100));
        assert_eq!(parse_hex_address("0X10"), Some(0x10));
        assert_eq!(parse_hex_address("main"), None);
        assert_eq!(parse_hex_address(""), None);
    }

    #[test]
    fn marker_words() {
        assert_eq!(parse_marker_word("4ffffb82"), Some([0x4f, 0xff, 0xfb, 0x82]));
        assert_eq!(parse_marker_word("0x60000000"), Some([0x60, 0, 0, 0]));
        assert_eq!(parse_marker_word("4ffffb"), None);
        assert_eq!(parse_marker_word("4ffffb8200"), None);
        assert_eq!(parse_marker_word("zzzzzzzz"), None);
    }
}
