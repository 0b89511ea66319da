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

use std::collections::BTreeSet;

use indexmap::IndexMap;

/// Recovered names keyed by absolute address.
///
/// Iteration follows scan order. Storing a name under an address that is already
/// present replaces the name but keeps the entry where it was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    names_by_addr: IndexMap<u64, String>,
    // Same keys, sorted, for nearest-address range queries
    sorted_addrs: BTreeSet<u64>,
}

impl NameMap {
    pub fn new() -> Self {
        Self {
            names_by_addr: IndexMap::new(),
            sorted_addrs: BTreeSet::new(),
        }
    }

    /// Returns the name previously stored at `address`, if any.
    pub fn insert(&mut self, address: u64, name: String) -> Option<String> {
        self.sorted_addrs.insert(address);
        self.names_by_addr.insert(address, name)
    }

    pub fn get(&self, address: u64) -> Option<&str> {
        self.names_by_addr.get(&address).map(String::as_str)
    }

    /// First address carrying `name`, in scan order.
    pub fn get_by_name(&self, name: &str) -> Option<u64> {
        self.names_by_addr
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(addr, _)| *addr)
    }

    /// Find the name whose address is the closest one at or below `address`.
    pub fn lookup(&self, address: u64) -> Option<(u64, &str)> {
        // range(..=address).next_back() is the largest key <= address
        let &start = self.sorted_addrs.range(..=address).next_back()?;
        self.get(start).map(|name| (start, name))
    }

    pub fn len(&self) -> usize {
        self.names_by_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names_by_addr.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.names_by_addr
            .iter()
            .map(|(addr, name)| (*addr, name.as_str()))
    }
}

impl<'a> IntoIterator for &'a NameMap {
    type Item = (u64, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (u64, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
