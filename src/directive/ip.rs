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

//! `ip=` (spec §4.1.2): either a bare autoconf token, or the long
//! colon-delimited form
//! `<client-IP>:[peer]:<gateway>:<netmask-or-CIDR>:[hostname]:<interface>:[autoconf][:dns1:dns2[:ntp] | :mtu:macaddr]`.

use anyhow::{bail, Result};

use crate::record::{Autoconf, InterfaceRecord};
use crate::util::{is_ip_literal, netmask_to_prefix, split_colon_fields, strip_brackets};

/// Parses one `ip=` directive value (the part after `ip=`).
pub fn parse(value: &str) -> Result<InterfaceRecord> {
    if !value.contains(':') {
        // Per spec §9's open-question resolution: a single token is always
        // treated as an autoconf value, even if it happens to look like an
        // IP literal (which simply fails the autoconf mapping and is
        // dropped with a warning by the caller).
        let mut record = InterfaceRecord::default();
        match Autoconf::parse(value) {
            Some(a) => record.autoconf = Some(a),
            None => eprintln!("warning: unknown autoconf method '{}', ignoring", value),
        }
        return Ok(record);
    }

    let fields = split_colon_fields(value);

    if fields.len() == 2 {
        // Short form `<interface>:<autoconf>`, e.g. `ip=vlan98:any`.
        let mut record = InterfaceRecord::named(fields[0].trim());
        let autoconf_tok = fields[1].trim();
        match Autoconf::parse(autoconf_tok) {
            Some(a) => record.autoconf = Some(a),
            None => eprintln!(
                "warning: unknown autoconf method '{}' in ip= directive, ignoring",
                autoconf_tok
            ),
        }
        return Ok(record);
    }
    if fields.len() < 6 {
        bail!("ip= directive '{}' has too few fields", value);
    }

    let mut record = InterfaceRecord::default();

    let client_ip = fields[0].trim();
    let peer = fields[1].trim();
    let gateway = fields[2].trim();
    let netmask = fields[3].trim();
    let hostname = fields[4].trim();
    let interface = fields[5].trim();

    if !client_ip.is_empty() {
        if netmask.is_empty() {
            bail!("ip= directive '{}' sets a client IP without a netmask", value);
        }
        let prefix = netmask_to_prefix(netmask)?;
        record.netmask = Some(prefix);
        record.client_ip = Some(vec![format!("{}/{}", strip_brackets(client_ip), prefix)]);
    }
    if !peer.is_empty() {
        record.peer_ip = Some(strip_brackets(peer).to_string());
    }
    if !gateway.is_empty() {
        record.gateway = Some(strip_brackets(gateway).to_string());
    }
    if !hostname.is_empty() {
        if hostname == "*" {
            // A literal "*" hostname means "apply to any interface"
            // (spec §4.1.2); it overrides the <interface> field instead
            // of being emitted as a real hostname.
            record.interface = Some("*".to_string());
        } else {
            record.hostname = Some(hostname.to_string());
        }
    }
    if record.interface.is_none() && !interface.is_empty() {
        record.interface = Some(interface.to_string());
    }

    if fields.len() > 6 {
        let autoconf_tok = fields[6].trim();
        if !autoconf_tok.is_empty() {
            match Autoconf::parse(autoconf_tok) {
                Some(a) => record.autoconf = Some(a),
                None => eprintln!(
                    "warning: unknown autoconf method '{}' in ip= directive, ignoring",
                    autoconf_tok
                ),
            }
        }
        let remainder = fields[7..].join(":");
        parse_tail(&remainder, &mut record)?;
    }

    Ok(record)
}

fn parse_tail(remainder: &str, record: &mut InterfaceRecord) -> Result<()> {
    if remainder.is_empty() {
        return Ok(());
    }
    let (first, rest) = match remainder.split_once(':') {
        Some((a, b)) => (a, b),
        None => (remainder, ""),
    };

    if is_ip_literal(first) {
        record.dns1 = Some(vec![strip_brackets(first).to_string()]);
        let (dns2, ntp) = match rest.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (rest, None),
        };
        if !dns2.is_empty() {
            record.dns2 = Some(vec![strip_brackets(dns2).to_string()]);
        }
        if let Some(ntp) = ntp.filter(|s| !s.is_empty()) {
            record.ntp = Some(vec![strip_brackets(ntp).to_string()]);
        }
    } else if first.is_empty() && rest.matches(':').count() == 5 {
        record.macaddr = Some(rest.to_string());
    } else {
        if !first.is_empty() {
            record.mtu = Some(
                first
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid MTU '{}' in ip= directive", first))?,
            );
        }
        if !rest.is_empty() {
            record.macaddr = Some(rest.to_string());
        }
    }
    Ok(())
}
