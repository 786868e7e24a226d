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

use std::fs::read_to_string;
use std::path::Path;
use std::process::exit;

use anyhow::{Context, Result};

use libnetcfg::cmdline::{self, Cmd};
use libnetcfg::directive;
use libnetcfg::emit;
use libnetcfg::record::Context as NetContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        exit(exit_code_for(&e));
    }
}

/// Maps a failure to a process exit code (spec §7): an I/O failure
/// anywhere in the chain (missing config file, unwritable output
/// directory) gets `EIO`; anything else (malformed directives, merge
/// capacity overflow) is a syntax/resource problem and gets `EINVAL`.
fn exit_code_for(e: &anyhow::Error) -> i32 {
    if e.chain().any(|cause| cause.downcast_ref::<std::io::Error>().is_some()) {
        libc::EIO
    } else {
        libc::EINVAL
    }
}

fn run() -> Result<()> {
    let cmd = cmdline::parse_args().context("parsing arguments")?;
    if cmd.debug {
        eprintln!("netcfg-generator: output={}", cmd.output);
    }

    let mut ctx = NetContext::new();
    apply_input(&cmd, &mut ctx)?;
    emit::write_all(&ctx, Path::new(&cmd.output))
        .with_context(|| format!("writing fragments to {}", cmd.output))?;
    Ok(())
}

/// Feeds either a config file, the positional cmdline tokens, or
/// `/proc/cmdline` into the directive layer (spec §4.6).
fn apply_input(cmd: &Cmd, ctx: &mut NetContext) -> Result<()> {
    if let Some(path) = &cmd.config {
        let contents =
            read_to_string(path).with_context(|| format!("reading config file {}", path))?;
        return directive::apply_config_file(&contents, ctx);
    }

    if !cmd.cmdline_args.is_empty() {
        let line = cmd.cmdline_args.join(" ");
        return directive::apply_cmdline(&line, ctx, cmd.parse_all);
    }

    let line = read_to_string("/proc/cmdline").context("reading /proc/cmdline")?;
    directive::apply_cmdline(&line, ctx, cmd.parse_all)
}
