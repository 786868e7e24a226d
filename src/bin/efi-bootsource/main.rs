// Copyright 2024 CoreOS, Inc.
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

//! Prints the resolved EFI boot source of the running image (spec §4.5).

use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;

use libnetcfg::efi::{resolve_boot_source, BootSource, EfiVarFs};

/// Resolve the EFI boot source of the running image.
#[derive(Debug, Parser)]
#[clap(name = "efi-bootsource", version)]
struct Cmd {
    /// Print the result as JSON
    #[clap(long)]
    json: bool,
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {:?}", e);
            exit(libc::EINVAL);
        }
    }
}

fn run() -> Result<()> {
    let cmd = Cmd::parse();

    let fs = EfiVarFs::system();
    let source = resolve_boot_source(&fs).context("resolving EFI boot source")?;

    if cmd.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&source).context("serializing boot source")?
        );
    } else {
        print_human(&source);
    }
    Ok(())
}

fn print_human(source: &BootSource) {
    if let Some(url) = &source.url {
        println!("URL: {}", url);
    }
    if let Some(device) = &source.device {
        println!("Device: {}", device);
    }
    if let Some(image) = &source.image {
        println!("Image: {}", image);
    }
    if let Some(entry) = &source.entry {
        println!("Entry: {}", entry);
    }
    if let Some(part) = &source.def_efi_partition {
        println!("Default EFI partition: {}", part);
    }
    println!("PXE boot: {}", source.is_pxe_boot);
}
