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

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::debug;

use asm_names::listing::DEFAULT_MAX_GAP;
use asm_names::logging::init_logging;
use asm_names::serializer::{format_names, serialize_names};
use asm_names::utils::{parse_hex_address, parse_marker_word};
use asm_names::{
    recover_from_reader, AssociationPolicy, ListingDialect, NameMap, Options, ReconstructConfig,
    Recovery, ScanConfig,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DialectArg {
    /// `ffc00100:` style, first 8 hex digits are the address
    FixedWidth,
    /// Any width, colons removed before parsing
    ColonStripped,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    /// Name describes the code after the previous name block
    FollowsPrevious,
    /// Name is filed under its own block address
    BlockAddress,
    /// Name is filed under the nearest marker instruction before it
    Marker,
}

#[derive(Parser, Debug)]
#[command(name = "asm-names")]
#[command(about = "Recover length-prefixed function names from a disassembly listing")]
struct Args {
    /// Listing file to scan, `-` reads stdin
    listing: PathBuf,

    #[arg(long, value_enum, default_value_t = DialectArg::FixedWidth)]
    dialect: DialectArg,

    #[arg(short, long, value_enum, default_value_t = PolicyArg::FollowsPrevious)]
    policy: PolicyArg,

    /// Marker instruction word for `--policy marker`
    #[arg(long, default_value = "4ffffb82")]
    marker: String,

    /// Accept names without a terminating null
    #[arg(long, default_value_t = false)]
    lenient: bool,

    /// Shortest accepted name
    #[arg(long, default_value_t = 4)]
    min_len: u8,

    /// Names must be shorter than this
    #[arg(long, default_value_t = 40)]
    max_len: u8,

    /// Largest address gap to zero fill, 0 = unlimited
    #[arg(long, default_value_t = DEFAULT_MAX_GAP)]
    max_gap: u64,

    /// Print a JSON document instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Only print the name covering this address
    #[arg(short, long, conflicts_with = "find")]
    lookup: Option<String>,

    /// Only print the address a name was recovered at
    #[arg(short, long)]
    find: Option<String>,

    /// Enable debug output
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    debug: bool,
}

impl Args {
    fn options(&self) -> Result<Options> {
        let policy = match self.policy {
            PolicyArg::FollowsPrevious => AssociationPolicy::FollowsPrevious,
            PolicyArg::BlockAddress => AssociationPolicy::BlockAddress,
            PolicyArg::Marker => AssociationPolicy::Marker(
                parse_marker_word(&self.marker)
                    .ok_or_else(|| anyhow!("invalid marker word {:?}", self.marker))?,
            ),
        };
        let dialect = match self.dialect {
            DialectArg::FixedWidth => ListingDialect::FixedWidth,
            DialectArg::ColonStripped => ListingDialect::ColonStripped,
        };
        if self.min_len == 0 || self.min_len >= self.max_len {
            return Err(anyhow!(
                "length range {}..{} is empty",
                self.min_len,
                self.max_len
            ));
        }

        Ok(Options {
            listing: ReconstructConfig {
                dialect,
                max_gap: (self.max_gap > 0).then_some(self.max_gap),
            },
            scan: ScanConfig {
                min_len: self.min_len,
                max_len: self.max_len,
                require_terminator: !self.lenient,
                policy,
            },
        })
    }

    fn read_listing(&self, options: &Options) -> Result<Recovery> {
        let recovery = if self.listing.as_os_str() == "-" {
            recover_from_reader(io::stdin().lock(), options)
        } else {
            let file = File::open(&self.listing)
                .with_context(|| format!("failed to open {}", self.listing.display()))?;
            recover_from_reader(BufReader::with_capacity(64 * 1024, file), options)
        };
        recovery.with_context(|| format!("failed to scan {}", self.listing.display()))
    }
}

fn write_lookup<W: Write>(out: &mut W, names: &NameMap, addr: u64) -> io::Result<()> {
    match names.lookup(addr) {
        Some((start, name)) if start == addr => writeln!(out, "0x{:x} {}", addr, name),
        Some((start, name)) => writeln!(out, "0x{:x} {}+0x{:x}", addr, name, addr - start),
        None => writeln!(out, "0x{:x} <unknown>", addr),
    }
}

/// Returns false when the name was not recovered.
fn write_find<W: Write>(out: &mut W, names: &NameMap, name: &str) -> io::Result<bool> {
    match names.get_by_name(name) {
        Some(addr) => {
            writeln!(out, "0x{:x} {}", addr, name)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = init_logging(args.debug)?;
    let options = args.options()?;
    debug!("options: {:?}", options);

    let recovery = args.read_listing(&options)?;
    let names = &recovery.names;

    let mut out = io::stdout().lock();
    if let Some(addr) = &args.lookup {
        let addr = parse_hex_address(addr).ok_or_else(|| anyhow!("invalid address {:?}", addr))?;
        write_lookup(&mut out, names, addr)?;
        return Ok(());
    }
    if let Some(name) = &args.find {
        if !write_find(&mut out, names, name)? {
            return Err(anyhow!("name {:?} not found in {}", name, args.listing.display()));
        }
        return Ok(());
    }

    if args.json {
        let doc = serialize_names(names, recovery.image.as_ref());
        writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    } else {
        write!(out, "{}", format_names(names))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let args = Args::parse_from(["asm-names", "listing.txt"]);
        let options = args.options().unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn marker_policy_options() {
        let args = Args::parse_from([
            "asm-names",
            "--policy",
            "marker",
            "--marker",
            "0x60000000",
            "--lenient",
            "--max-gap",
            "0",
            "listing.txt",
        ]);
        let options = args.options().unwrap();
        assert_eq!(options.scan.policy, AssociationPolicy::Marker([0x60, 0, 0, 0]));
        assert!(!options.scan.require_terminator);
        assert_eq!(options.listing.max_gap, None);
    }

    #[test]
    fn bad_length_range() {
        let args = Args::parse_from(["asm-names", "--min-len", "40", "listing.txt"]);
        assert!(args.options().is_err());
    }

    fn sample_names() -> NameMap {
        let mut names = NameMap::new();
        names.insert(0xffc0_0008, "MAIN".to_string());
        names.insert(0xffc0_0014, "SETUPM".to_string());
        names
    }

    #[test]
    fn find_by_name() {
        let names = sample_names();
        let mut out = Vec::new();
        assert!(write_find(&mut out, &names, "SETUPM").unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "0xffc00014 SETUPM\n");

        let mut out = Vec::new();
        assert!(!write_find(&mut out, &names, "EXIT").unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn lookup_output() {
        let names = sample_names();
        let mut out = Vec::new();
        write_lookup(&mut out, &names, 0xffc0_0008).unwrap();
        write_lookup(&mut out, &names, 0xffc0_0010).unwrap();
        write_lookup(&mut out, &names, 0x10).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0xffc00008 MAIN\n0xffc00010 MAIN+0x8\n0x10 <unknown>\n"
        );
    }

    #[test]
    fn lookup_and_find_conflict() {
        let res = Args::try_parse_from(["asm-names", "-l", "0x10", "-f", "MAIN", "x"]);
        assert!(res.is_err());
    }

    #[test]
    fn bad_marker() {
        let args = Args::parse_from(["asm-names", "-p", "marker", "--marker", "nope", "x"]);
        assert!(args.options().is_err());
    }
}
