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

use serde::Serialize;
use serde_json::{json, Value};

use crate::memory::ByteImage;
use crate::names::NameMap;

#[derive(Serialize, Debug)]
pub struct NameRecord {
    /// Hex string, keeps 64-bit addresses intact for JS consumers
    pub address: String,
    pub name: String,
}

/// Serialize recovered names into a compact JSON document.
/// Format:
/// {
///   "t": "names",
///   "base": "0x...",
///   "end": "0x...",
///   "size": <image bytes>,
///   "count": <entries>,
///   "names": [ { "address": "0x...", "name": "..." }, ... ]
/// }
///
/// `image` is `None` when the listing had no usable lines.
pub fn serialize_names(names: &NameMap, image: Option<&ByteImage>) -> Value {
    let records: Vec<NameRecord> = names
        .iter()
        .map(|(addr, name)| NameRecord {
            address: format!("0x{:x}", addr),
            name: name.to_string(),
        })
        .collect();

    let mut doc = image
        .map(ByteImage::to_json)
        .unwrap_or_else(|| json!({ "base": "0x0", "end": "0x0", "size": 0 }));
    doc["t"] = json!("names");
    doc["count"] = json!(records.len());
    doc["names"] = json!(records);
    doc
}

/// One `0x<address> <name>` line per entry, in scan order.
pub fn format_names(names: &NameMap) -> String {
    names
        .iter()
        .map(|(addr, name)| format!("0x{:x} {}\n", addr, name))
        .collect()
}
