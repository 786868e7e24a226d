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

//! Directive dispatch: recognizes `ifcfg=`, `ip=`, `nameserver=`,
//! `rd.peerdns=`, `rd.route=` and `vlan=` tokens and folds each into the
//! context (spec §4.1, §4.1.4).

pub mod autoconf;
pub mod cmdline_tokenizer;
pub mod ifcfg;
pub mod ip;
pub mod nameserver;
pub mod route;
pub mod vlan;

use anyhow::{Context as _, Result};

use crate::record::{Context, Origin};

/// Prefixes recognized unconditionally: `ifcfg=` is always active on the
/// kernel command line, and every prefix is always active when reading a
/// config file (spec §4.1, §6).
const ALWAYS_ACTIVE: &[&str] = &["ifcfg="];

/// Prefixes that require `--parse-all` when reading the kernel command
/// line, but are always active for a config file.
const PARSE_ALL_PREFIXES: &[&str] = &["ip=", "nameserver=", "rd.peerdns=", "rd.route=", "vlan="];

/// Applies one already-tokenized directive to `ctx`.
///
/// `all_prefixes_active` is true for config-file input (spec §6: "all
/// prefixes always active") and false for kernel command-line input
/// unless `--parse-all` was given.
pub fn apply_token(token: &str, ctx: &mut Context, all_prefixes_active: bool) -> Result<()> {
    for prefix in ALWAYS_ACTIVE {
        if let Some(value) = token.strip_prefix(prefix) {
            let mut record = ifcfg::parse(value).with_context(|| format!("parsing '{}'", token))?;
            record.origin.push(Origin::Ifcfg);
            ctx.merge(record).with_context(|| format!("merging '{}'", token))?;
            return Ok(());
        }
    }
    if !all_prefixes_active {
        return Ok(());
    }
    if let Some(value) = token.strip_prefix("ip=") {
        let mut record = ip::parse(value).with_context(|| format!("parsing '{}'", token))?;
        record.origin.push(Origin::Ip);
        ctx.merge(record).with_context(|| format!("merging '{}'", token))?;
        return Ok(());
    }
    if let Some(value) = token.strip_prefix("nameserver=") {
        let mut record =
            nameserver::parse_nameserver(value).with_context(|| format!("parsing '{}'", token))?;
        record.origin.push(Origin::Nameserver);
        ctx.merge(record).with_context(|| format!("merging '{}'", token))?;
        return Ok(());
    }
    if let Some(value) = token.strip_prefix("rd.peerdns=") {
        let mut record =
            nameserver::parse_peerdns(value).with_context(|| format!("parsing '{}'", token))?;
        record.origin.push(Origin::Peerdns);
        ctx.merge(record).with_context(|| format!("merging '{}'", token))?;
        return Ok(());
    }
    if let Some(value) = token.strip_prefix("rd.route=") {
        let mut record = route::parse(value).with_context(|| format!("parsing '{}'", token))?;
        record.origin.push(Origin::Route);
        ctx.merge(record).with_context(|| format!("merging '{}'", token))?;
        return Ok(());
    }
    if let Some(value) = token.strip_prefix("vlan=") {
        vlan::apply(value, ctx).with_context(|| format!("parsing '{}'", token))?;
        return Ok(());
    }
    let _ = PARSE_ALL_PREFIXES;
    Ok(())
}

/// Tokenizes a kernel command line and applies each recognized directive.
///
/// A token rejected with a syntax error is logged (with its entry index,
/// spec §7) and skipped; processing continues with the next token. This
/// is the kernel-command-line error policy of spec §7/§8 invariant 6, and
/// is why this differs from [`apply_config_file`], which aborts on the
/// first bad line.
pub fn apply_cmdline(line: &str, ctx: &mut Context, parse_all: bool) -> Result<()> {
    for (idx, token) in cmdline_tokenizer::tokenize(line).into_iter().enumerate() {
        if let Err(e) = apply_token(&token, ctx, parse_all) {
            eprintln!("warning: skipping cmdline entry {} ('{}'): {:?}", idx, token, e);
        }
    }
    Ok(())
}

/// Applies each line of a config file (whitespace-only lines and
/// comments starting with `#` are skipped). Every directive prefix is
/// active, regardless of `--parse-all` (spec §6).
pub fn apply_config_file(contents: &str, ctx: &mut Context) -> Result<()> {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in cmdline_tokenizer::tokenize(line) {
            apply_token(&token, ctx, true)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ifcfg_is_always_active() {
        let mut ctx = Context::new();
        apply_cmdline("ifcfg=eth0=dhcp", &mut ctx, false).unwrap();
        assert_eq!(ctx.records.len(), 1);
    }

    #[test]
    fn ip_requires_parse_all_on_cmdline() {
        let mut ctx = Context::new();
        apply_cmdline("ip=dhcp", &mut ctx, false).unwrap();
        assert!(ctx.records.is_empty());

        let mut ctx = Context::new();
        apply_cmdline("ip=eth0:on", &mut ctx, true).unwrap();
        assert_eq!(ctx.records.len(), 1);
    }

    #[test]
    fn config_file_ignores_parse_all() {
        let mut ctx = Context::new();
        apply_config_file("nameserver=8.8.8.8\nifcfg=eth0=dhcp\n", &mut ctx).unwrap();
        assert_eq!(ctx.records.len(), 1);
        assert_eq!(ctx.records[0].dns1.as_deref(), Some(&["8.8.8.8".to_string()][..]));
    }

    #[test]
    fn config_file_skips_comments_and_blank_lines() {
        let mut ctx = Context::new();
        apply_config_file("# a comment\n\nifcfg=eth0=dhcp\n", &mut ctx).unwrap();
        assert_eq!(ctx.records.len(), 1);
    }

    #[test]
    fn cmdline_skips_bad_token_and_keeps_processing_the_rest() {
        let mut ctx = Context::new();
        apply_cmdline("ifcfg=eth0.9000=dhcp ifcfg=eth1=dhcp", &mut ctx, false).unwrap();
        assert_eq!(ctx.records.len(), 1);
        assert_eq!(ctx.records[0].interface.as_deref(), Some("eth1"));
    }

    #[test]
    fn config_file_aborts_on_first_bad_line() {
        let mut ctx = Context::new();
        assert!(apply_config_file("ifcfg=eth0.9000=dhcp\nifcfg=eth1=dhcp\n", &mut ctx).is_err());
    }
}
