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

//! Recover length-prefixed function names from a disassembly listing.
//! The listing is turned back into bytes, then scanned for name blocks.

pub mod error;
pub mod listing;
pub mod logging;
pub mod memory;
pub mod names;
pub mod scanner;
pub mod serializer;
pub mod utils;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

pub use error::ListingError;
pub use listing::{reconstruct, reconstruct_reader, ListingDialect, ReconstructConfig};
pub use memory::ByteImage;
pub use names::NameMap;
pub use scanner::{scan, AssociationPolicy, ScanConfig, ScanStats};

/// Settings for both passes: listing reconstruction and name scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub listing: ReconstructConfig,
    pub scan: ScanConfig,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct Recovery {
    /// `None` when the listing had no addressable line at all.
    pub image: Option<ByteImage>,
    pub names: NameMap,
    pub stats: ScanStats,
}

fn recover_from(
    image: Result<ByteImage, ListingError>,
    options: &Options,
) -> Result<Recovery, ListingError> {
    let image = match image {
        Ok(image) => image,
        Err(ListingError::Empty) => {
            info!("Listing has no addressable lines, nothing to scan");
            return Ok(Recovery::default());
        }
        Err(e) => return Err(e),
    };
    let (names, stats) = scanner::scan_with_stats(&image, &options.scan);
    info!("Recovered {} names", names.len());
    Ok(Recovery {
        image: Some(image),
        names,
        stats,
    })
}

/// Reconstruct `lines` and scan the image, keeping the image and scan statistics.
pub fn recover<I, S>(lines: I, options: &Options) -> Result<Recovery, ListingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    recover_from(reconstruct(lines, &options.listing), options)
}

/// Same as [`recover`], streaming the listing from `reader`.
pub fn recover_from_reader<R: BufRead>(
    reader: R,
    options: &Options,
) -> Result<Recovery, ListingError> {
    recover_from(reconstruct_reader(reader, &options.listing), options)
}

/// Reconstruct and scan in one go. An empty or all-garbage listing gives an empty map.
pub fn find_names<I, S>(lines: I, options: &Options) -> Result<NameMap, ListingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(recover(lines, options)?.names)
}

pub fn find_names_in_reader<R: BufRead>(
    reader: R,
    options: &Options,
) -> Result<NameMap, ListingError> {
    Ok(recover_from_reader(reader, options)?.names)
}

pub fn find_names_in_file<P: AsRef<Path>>(
    path: P,
    options: &Options,
) -> Result<NameMap, ListingError> {
    let file = File::open(path)?;
    find_names_in_reader(BufReader::with_capacity(64 * 1024, file), options)
}
