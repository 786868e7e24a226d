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

//! Interface records, the VLAN table, and the merge rule of the directive
//! parser (spec §3/§4.2).

use anyhow::{bail, Result};

/// Maximum number of interface records the merger will hold.
pub const MAX_INTERFACES: usize = 10;
/// Maximum number of distinct VLAN ids across the whole run.
pub const VLAN_CAPACITY: usize = 10;
/// Maximum number of gateways a single record may carry (`gateway` + `gateway1`).
pub const MAX_GATEWAYS: usize = 2;
/// Maximum number of VLAN ids a single record may parent.
pub const MAX_VLAN_REFS: usize = 3;

/// The closed set of symbolic auto-configuration methods (spec §4.1.3).
///
/// Kept as a tagged enum rather than a bare string so that the mapping to
/// the emitter's `no`/`yes`/`ipv4`/`ipv6` primitive is total and checked at
/// compile time (spec §9, "Tagged variants over string enums").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autoconf {
    None,
    Off,
    On,
    Any,
    Dhcp,
    Dhcp6,
    Auto6,
    Either6,
    Ibft,
    Link6,
    LinkLocal,
}

impl Autoconf {
    /// Parses one of the closed-set symbolic names. Returns `None` for an
    /// unrecognized value; per spec §4.1.3 this is a soft failure (the
    /// caller logs a warning and leaves the record's `autoconf` unset),
    /// not a syntax error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "off" => Some(Self::Off),
            "on" => Some(Self::On),
            "any" => Some(Self::Any),
            "dhcp" => Some(Self::Dhcp),
            "dhcp6" => Some(Self::Dhcp6),
            "auto6" => Some(Self::Auto6),
            "either6" => Some(Self::Either6),
            "ibft" => Some(Self::Ibft),
            "link6" => Some(Self::Link6),
            "link-local" => Some(Self::LinkLocal),
            _ => None,
        }
    }

    /// Maps to the emitter's DHCP primitive (spec §4.1.3's table).
    pub fn primitive(&self) -> &'static str {
        match self {
            Self::None | Self::Off | Self::Auto6 | Self::Ibft | Self::Link6 | Self::LinkLocal => {
                "no"
            }
            Self::On | Self::Any => "yes",
            Self::Dhcp => "ipv4",
            Self::Dhcp6 | Self::Either6 => "ipv6",
        }
    }
}

/// The directive that contributed a field, kept purely for diagnostics
/// (spec §3, §4.2's "capturing the line/entry index that sourced a
/// field"); has no effect on the emitted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Ifcfg,
    Ip,
    Nameserver,
    Peerdns,
    Route,
    Vlan,
}

/// Tri-state `use_dns` (spec §3): unset / explicitly disabled / explicitly enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UseDns {
    #[default]
    Unset,
    False,
    True,
}

/// One partial or fully-merged network interface configuration.
///
/// `ifcfg_vlan_id`/`ifcfg_vlan_parent` track the legacy `ifcfg=name.vlanid=`
/// sub-form (spec §4.1.1, §4.3): a record carrying these is itself a VLAN
/// sub-interface and is matched/emitted specially, distinct from
/// `vlan_refs`, which names VLAN ids (declared via `vlan=`) for which this
/// record is the *parent*.
#[derive(Debug, Clone, Default)]
pub struct InterfaceRecord {
    pub interface: Option<String>,
    pub client_ip: Option<Vec<String>>,
    pub peer_ip: Option<String>,
    pub gateway: Option<String>,
    pub gateway1: Option<String>,
    pub destination: Option<String>,
    pub netmask: Option<u8>,
    pub hostname: Option<String>,
    pub autoconf: Option<Autoconf>,
    pub use_dns: UseDns,
    pub dns1: Option<Vec<String>>,
    pub dns2: Option<Vec<String>>,
    pub ntp: Option<Vec<String>>,
    pub mtu: Option<u32>,
    pub macaddr: Option<String>,
    pub domains: Option<Vec<String>>,
    pub rfc2132: bool,
    pub vlan_refs: Vec<u16>,
    pub ifcfg_vlan_id: Option<u16>,
    pub ifcfg_vlan_parent: Option<String>,
    /// Diagnostics only: which directive(s) contributed to this record.
    pub origin: Vec<Origin>,
}

impl InterfaceRecord {
    pub fn named(interface: impl Into<String>) -> Self {
        Self {
            interface: Some(interface.into()),
            ..Default::default()
        }
    }
}

/// One `vlan=` table entry: a VLAN id and the textual label it was declared
/// under.
#[derive(Debug, Clone)]
pub struct VlanEntry {
    pub id: u16,
    pub name: String,
}

/// The VLAN table: up to [`VLAN_CAPACITY`] entries, unique by id.
#[derive(Debug, Default)]
pub struct VlanTable {
    entries: Vec<VlanEntry>,
}

impl VlanTable {
    pub fn insert(&mut self, id: u16, name: impl Into<String>) -> Result<()> {
        if self.entries.iter().any(|e| e.id == id) {
            bail!("duplicate VLAN id {}", id);
        }
        if self.entries.len() >= VLAN_CAPACITY {
            bail!("too many VLAN definitions (max {})", VLAN_CAPACITY);
        }
        self.entries.push(VlanEntry {
            id,
            name: name.into(),
        });
        Ok(())
    }

    pub fn name_for(&self, id: u16) -> Option<&str> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VlanEntry> {
        self.entries.iter()
    }
}

/// The context object threaded through the parser, merger and emitter
/// (spec §9, "prefer passing a context object through the
/// parser/merger/emitter interfaces" in place of C's process-global
/// tables).
#[derive(Debug, Default)]
pub struct Context {
    pub records: Vec<InterfaceRecord>,
    pub vlans: VlanTable,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the merge rule of spec §4.2 to `incoming`.
    pub fn merge(&mut self, incoming: InterfaceRecord) -> Result<()> {
        match &incoming.interface {
            Some(name) => {
                if let Some(existing) = self
                    .records
                    .iter_mut()
                    .find(|r| r.interface.as_deref() == Some(name.as_str()))
                {
                    merge_fields(existing, incoming)?;
                } else {
                    if self.records.len() >= MAX_INTERFACES {
                        bail!("too many interfaces (max {})", MAX_INTERFACES);
                    }
                    self.records.push(incoming);
                }
            }
            None => {
                // Free record: merges into every already-named record.
                // Per spec §9's open question, we keep this as specified
                // (merge into every record, not just the first).
                for existing in self.records.iter_mut().filter(|r| r.interface.is_some()) {
                    merge_fields(existing, incoming.clone())?;
                }
            }
        }
        Ok(())
    }
}

/// Copies the set fields of `incoming` on top of `existing`, per spec
/// §4.2 rule 1. Scalar fields are overwritten; list fields are extended;
/// the gateway pair and vlan_refs are capacity-checked.
fn merge_fields(existing: &mut InterfaceRecord, incoming: InterfaceRecord) -> Result<()> {
    if let Some(client_ip) = incoming.client_ip {
        existing.client_ip.get_or_insert_with(Vec::new).extend(client_ip);
    }
    if incoming.peer_ip.is_some() {
        existing.peer_ip = incoming.peer_ip;
    }
    if let Some(gw) = incoming.gateway {
        add_gateway(existing, gw)?;
    }
    if incoming.destination.is_some() {
        existing.destination = incoming.destination;
    }
    if incoming.netmask.is_some() {
        existing.netmask = incoming.netmask;
    }
    if incoming.hostname.is_some() {
        existing.hostname = incoming.hostname;
    }
    if incoming.autoconf.is_some() {
        existing.autoconf = incoming.autoconf;
    }
    if incoming.use_dns != UseDns::Unset {
        existing.use_dns = incoming.use_dns;
    }
    if let Some(dns1) = incoming.dns1 {
        existing.dns1.get_or_insert_with(Vec::new).extend(dns1);
    }
    if let Some(dns2) = incoming.dns2 {
        existing.dns2.get_or_insert_with(Vec::new).extend(dns2);
    }
    if let Some(ntp) = incoming.ntp {
        existing.ntp.get_or_insert_with(Vec::new).extend(ntp);
    }
    if incoming.mtu.is_some() {
        existing.mtu = incoming.mtu;
    }
    if incoming.macaddr.is_some() {
        existing.macaddr = incoming.macaddr;
    }
    if let Some(domains) = incoming.domains {
        existing.domains.get_or_insert_with(Vec::new).extend(domains);
    }
    existing.rfc2132 = existing.rfc2132 || incoming.rfc2132;
    for id in incoming.vlan_refs {
        add_vlan_ref(existing, id)?;
    }
    if incoming.ifcfg_vlan_id.is_some() {
        existing.ifcfg_vlan_id = incoming.ifcfg_vlan_id;
        existing.ifcfg_vlan_parent = incoming.ifcfg_vlan_parent;
    }
    existing.origin.extend(incoming.origin);
    Ok(())
}

fn add_gateway(record: &mut InterfaceRecord, gw: String) -> Result<()> {
    if record.gateway.is_none() {
        record.gateway = Some(gw);
    } else if record.gateway1.is_none() {
        record.gateway1 = Some(gw);
    } else {
        bail!("too many gateways on one interface (max {})", MAX_GATEWAYS);
    }
    Ok(())
}

fn add_vlan_ref(record: &mut InterfaceRecord, id: u16) -> Result<()> {
    if record.vlan_refs.contains(&id) {
        return Ok(());
    }
    if record.vlan_refs.len() >= MAX_VLAN_REFS {
        bail!("too many VLANs on one interface (max {})", MAX_VLAN_REFS);
    }
    record.vlan_refs.push(id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autoconf_mapping_table() {
        let cases = vec![
            ("none", "no"),
            ("off", "no"),
            ("auto6", "no"),
            ("ibft", "no"),
            ("link6", "no"),
            ("link-local", "no"),
            ("on", "yes"),
            ("any", "yes"),
            ("dhcp", "ipv4"),
            ("dhcp6", "ipv6"),
            ("either6", "ipv6"),
        ];
        for (input, primitive) in cases {
            let method = Autoconf::parse(input).unwrap_or_else(|| panic!("{} failed to parse", input));
            assert_eq!(method.primitive(), primitive, "primitive for {}", input);
        }
    }

    #[test]
    fn autoconf_unknown_is_none() {
        assert!(Autoconf::parse("192.168.0.1").is_none());
        assert!(Autoconf::parse("bogus").is_none());
    }

    #[test]
    fn merge_by_name_overwrites_scalars_and_extends_lists() {
        let mut ctx = Context::new();
        ctx.merge(InterfaceRecord {
            interface: Some("eth0".into()),
            dns1: Some(vec!["1.1.1.1".into()]),
            ..Default::default()
        })
        .unwrap();
        ctx.merge(InterfaceRecord {
            interface: Some("eth0".into()),
            dns1: Some(vec!["8.8.8.8".into()]),
            mtu: Some(1500),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ctx.records.len(), 1);
        let rec = &ctx.records[0];
        assert_eq!(rec.dns1.as_deref(), Some(&["1.1.1.1".to_string(), "8.8.8.8".to_string()][..]));
        assert_eq!(rec.mtu, Some(1500));
    }

    #[test]
    fn free_record_merges_into_every_named_record() {
        let mut ctx = Context::new();
        ctx.merge(InterfaceRecord::named("eth0")).unwrap();
        ctx.merge(InterfaceRecord::named("eth1")).unwrap();
        ctx.merge(InterfaceRecord {
            interface: None,
            dns1: Some(vec!["9.9.9.9".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ctx.records.len(), 2);
        for rec in &ctx.records {
            assert_eq!(rec.dns1.as_deref(), Some(&["9.9.9.9".to_string()][..]));
        }
    }

    #[test]
    fn gateway_overflow_is_an_error() {
        let mut rec = InterfaceRecord::named("eth0");
        add_gateway(&mut rec, "10.0.0.1".into()).unwrap();
        add_gateway(&mut rec, "10.0.0.2".into()).unwrap();
        assert!(add_gateway(&mut rec, "10.0.0.3".into()).is_err());
    }

    #[test]
    fn vlan_table_rejects_duplicate_ids_and_overflow() {
        let mut table = VlanTable::default();
        table.insert(10, "vlan10").unwrap();
        assert!(table.insert(10, "other").is_err());
        for i in 0..VLAN_CAPACITY - 1 {
            table.insert((100 + i) as u16, format!("v{}", i)).unwrap();
        }
        assert!(table.insert(9999, "overflow").is_err());
    }

    #[test]
    fn origin_accumulates_across_merges_and_has_no_effect_on_other_fields() {
        let mut ctx = Context::new();
        ctx.merge(InterfaceRecord {
            interface: Some("eth0".into()),
            origin: vec![Origin::Ifcfg],
            ..Default::default()
        })
        .unwrap();
        ctx.merge(InterfaceRecord {
            interface: Some("eth0".into()),
            origin: vec![Origin::Ip],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ctx.records[0].origin, vec![Origin::Ifcfg, Origin::Ip]);
    }

    #[test]
    fn interface_capacity_is_enforced_on_append() {
        let mut ctx = Context::new();
        for i in 0..MAX_INTERFACES {
            ctx.merge(InterfaceRecord::named(format!("eth{}", i))).unwrap();
        }
        assert!(ctx.merge(InterfaceRecord::named("one-too-many")).is_err());
    }
}
