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

//! Command-line parsing for `netcfg-generator` (spec §6).

use anyhow::{bail, Result};
use clap::Parser;

/// Generate systemd-networkd configuration from network kargs.
#[derive(Debug, Parser)]
#[clap(name = "netcfg-generator", version)]
pub struct Cmd {
    /// Read directives from a config file instead of the kernel cmdline
    #[clap(short, long, value_name = "path")]
    pub config: Option<String>,

    /// Directory to write systemd-networkd fragments to
    #[clap(short, long, value_name = "path", default_value = "/run/systemd/network")]
    pub output: String,

    /// Parse all recognized directives, not just ifcfg=
    #[clap(short = 'a', long = "parse-all")]
    pub parse_all: bool,

    /// Enable debug diagnostics
    #[clap(short, long)]
    pub debug: bool,

    /// Network directives (e.g. ip=... ifcfg=...); defaults to /proc/cmdline
    #[clap(value_name = "ARG")]
    pub cmdline_args: Vec<String>,
}

/// Parses and validates command-line arguments.
pub fn parse_args() -> Result<Cmd> {
    validate(Cmd::parse())
}

fn validate(cmd: Cmd) -> Result<Cmd> {
    if cmd.config.is_some() && !cmd.cmdline_args.is_empty() {
        bail!("--config cannot be combined with positional cmdline arguments");
    }
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(args: &[&str]) -> Result<Cmd> {
        let mut full = vec!["netcfg-generator"];
        full.extend_from_slice(args);
        validate(Cmd::try_parse_from(full)?)
    }

    #[test]
    fn default_output_dir() {
        let cmd = build(&["ip=dhcp"]).unwrap();
        assert_eq!(cmd.output, "/run/systemd/network");
        assert_eq!(cmd.cmdline_args, vec!["ip=dhcp".to_string()]);
        assert!(cmd.config.is_none());
    }

    #[test]
    fn config_file_mode() {
        let cmd = build(&["-c", "/etc/netcfg.conf"]).unwrap();
        assert_eq!(cmd.config.as_deref(), Some("/etc/netcfg.conf"));
        assert!(cmd.cmdline_args.is_empty());
    }

    #[test]
    fn parse_all_flag() {
        let cmd = build(&["-a", "ip=dhcp"]).unwrap();
        assert!(cmd.parse_all);
    }

    #[test]
    fn config_with_positional_args_is_rejected() {
        assert!(build(&["-c", "/etc/netcfg.conf", "ip=dhcp"]).is_err());
    }
}
