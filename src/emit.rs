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

//! Config Emitter: renders the merged [`Context`] into systemd-networkd
//! `.network`/`.netdev` fragments (spec §4.3).

use std::collections::BTreeMap;
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::record::{Context, InterfaceRecord, UseDns, VlanTable};

/// Writes every fragment for `ctx` under `output_dir`, creating it first.
pub fn write_all(ctx: &Context, output_dir: &Path) -> Result<()> {
    create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    for (idx, record) in ctx.records.iter().enumerate() {
        let name = format!("66-ip-{:02}.network", idx + 1);
        let contents = render_network_fragment(record, &ctx.vlans)?;
        write_fragment(&output_dir.join(&name), &contents)?;
    }

    for entry in ctx.vlans.iter() {
        let name = format!("62-rdii-{}.netdev", entry.name);
        let contents = render_netdev(&entry.name, entry.id);
        write_fragment(&output_dir.join(&name), &contents)?;
    }

    // Legacy ifcfg=name.vlanid= path: group child records by the parent
    // interface name and emit one netdev per VLAN id plus one grouping
    // fragment per parent (spec §4.3).
    let mut by_parent: BTreeMap<&str, Vec<(u16, String)>> = BTreeMap::new();
    for record in &ctx.records {
        if let (Some(id), Some(parent)) = (record.ifcfg_vlan_id, &record.ifcfg_vlan_parent) {
            let vlan_name = format!("Vlan{:04}", id);
            let netdev_name = format!("62-ifcfg-vlan{:04}.netdev", id);
            write_fragment(&output_dir.join(&netdev_name), &render_netdev(&vlan_name, id))?;
            by_parent.entry(parent.as_str()).or_default().push((id, vlan_name));
        }
    }
    for (parent, children) in by_parent {
        let name = format!("64-ifcfg-vlan-{}.network", parent);
        let mut out = String::new();
        out.push_str("[Match]\n");
        out.push_str(&format!("Name={}\n", parent));
        out.push_str("\n[Network]\n");
        for (_, vlan_name) in &children {
            out.push_str(&format!("VLAN={}\n", vlan_name));
        }
        write_fragment(&output_dir.join(&name), &out)?;
    }

    Ok(())
}

fn write_fragment(path: &Path, contents: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    f.write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", path.display()))
}

fn render_netdev(name: &str, id: u16) -> String {
    format!("[NetDev]\nName={}\nKind=vlan\n\n[VLAN]\nId={}\n", name, id)
}

fn render_network_fragment(record: &InterfaceRecord, vlans: &VlanTable) -> Result<String> {
    let mut out = String::new();

    render_match_section(record, &mut out);

    let link = render_link_section(record);
    if !link.is_empty() {
        out.push('\n');
        out.push_str("[Link]\n");
        out.push_str(&link);
    }

    let network = render_network_section(record, vlans)?;
    if !network.is_empty() {
        out.push('\n');
        out.push_str("[Network]\n");
        out.push_str(&network);
    }

    if let Some(hostname) = &record.hostname {
        out.push('\n');
        out.push_str("[DHCP]\n");
        out.push_str(&format!("Hostname={}\n", hostname));
    }

    let primitive = record.autoconf.map(|a| a.primitive());
    let use_dns = if record.use_dns == UseDns::False { "false" } else { "true" };
    if matches!(primitive, Some("ipv4") | Some("yes")) {
        out.push('\n');
        out.push_str("[DHCPv4]\n");
        out.push_str("UseHostname=false\n");
        out.push_str(&format!("UseDNS={}\n", use_dns));
        out.push_str("UseNTP=true\n");
        if record.rfc2132 {
            out.push_str("ClientIdentifier=mac\n");
        }
    }
    if matches!(primitive, Some("ipv6") | Some("yes")) {
        out.push('\n');
        out.push_str("[DHCPv6]\n");
        out.push_str("UseHostname=false\n");
        out.push_str(&format!("UseDNS={}\n", use_dns));
        out.push_str("UseNTP=true\n");
    }

    let address = render_address_section(record);
    if !address.is_empty() {
        out.push('\n');
        out.push_str("[Address]\n");
        out.push_str(&address);
    }

    for route in render_route_sections(record) {
        out.push('\n');
        out.push_str("[Route]\n");
        out.push_str(&route);
    }

    Ok(out)
}

fn render_match_section(record: &InterfaceRecord, out: &mut String) {
    out.push_str("[Match]\n");
    if let Some(id) = record.ifcfg_vlan_id {
        out.push_str(&format!("Name=Vlan{:04}\n", id));
        out.push_str("Type=vlan\n");
        return;
    }
    match record.interface.as_deref() {
        None | Some("") | Some("*") => {
            out.push_str("Kind=!*\n");
            out.push_str("Type=!loopback\n");
        }
        Some(s) if s.contains(':') => {
            out.push_str("Name=*\n");
            out.push_str(&format!("MACAddress={}\n", s));
        }
        Some(s) => {
            out.push_str(&format!("Name={}\n", s));
        }
    }
}

fn render_link_section(record: &InterfaceRecord) -> String {
    let mut out = String::new();
    if let Some(mac) = &record.macaddr {
        out.push_str(&format!("MACAddress={}\n", mac));
    }
    if let Some(mtu) = record.mtu {
        out.push_str(&format!("MTUBytes={}\n", mtu));
    }
    out
}

fn render_network_section(record: &InterfaceRecord, vlans: &VlanTable) -> Result<String> {
    let mut out = String::new();
    if let Some(autoconf) = record.autoconf {
        out.push_str(&format!("DHCP={}\n", autoconf.primitive()));
    }
    for id in &record.vlan_refs {
        let name = vlans
            .name_for(*id)
            .ok_or_else(|| anyhow::anyhow!("VLAN id {} has no table entry", id))?;
        out.push_str(&format!("VLAN={}\n", name));
    }
    if let Some(dns1) = &record.dns1 {
        for entry in dns1 {
            out.push_str(&format!("DNS={}\n", entry));
        }
    }
    if let Some(dns2) = &record.dns2 {
        for entry in dns2 {
            out.push_str(&format!("DNS={}\n", entry));
        }
    }
    if let Some(domains) = &record.domains {
        out.push_str(&format!("Domains={}\n", domains.join(" ")));
    }
    if let Some(ntp) = &record.ntp {
        for entry in ntp {
            out.push_str(&format!("NTP={}\n", entry));
        }
    }
    Ok(out)
}

fn render_address_section(record: &InterfaceRecord) -> String {
    let mut out = String::new();
    if let Some(client_ip) = &record.client_ip {
        for entry in client_ip {
            out.push_str(&format!("Address={}\n", entry));
        }
    }
    if let Some(peer) = &record.peer_ip {
        out.push_str(&format!("Peer={}\n", peer));
    }
    out
}

/// Builds the Route section(s) per spec §4.3/§8: when a second gateway
/// (`gateway1`) is present, the first section carries only the primary
/// gateway and the second carries `destination` + `gateway1`; otherwise
/// a single section carries whichever of `gateway`/`destination` is set.
fn render_route_sections(record: &InterfaceRecord) -> Vec<String> {
    let mut sections = Vec::new();
    if record.gateway1.is_some() {
        if let Some(gw) = &record.gateway {
            sections.push(format!("Gateway={}\n", gw));
        }
        let mut secondary = String::new();
        if let Some(dest) = &record.destination {
            secondary.push_str(&format!("Destination={}\n", dest));
        }
        if let Some(gw) = &record.gateway1 {
            secondary.push_str(&format!("Gateway={}\n", gw));
        }
        if !secondary.is_empty() {
            sections.push(secondary);
        }
    } else if record.gateway.is_some() || record.destination.is_some() {
        let mut section = String::new();
        if let Some(dest) = &record.destination {
            section.push_str(&format!("Destination={}\n", dest));
        }
        if let Some(gw) = &record.gateway {
            section.push_str(&format!("Gateway={}\n", gw));
        }
        sections.push(section);
    }
    sections
}
