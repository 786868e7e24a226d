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

//! `ifcfg=<interface-spec>=<ip-spec>` (spec §4.1.1).

use anyhow::{bail, Result};

use super::autoconf;
use crate::record::InterfaceRecord;

/// Parses one `ifcfg=` directive value (the part after `ifcfg=`).
pub fn parse(value: &str) -> Result<InterfaceRecord> {
    let (interface_spec, ip_spec) = value
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("ifcfg= directive missing '=' separator: '{}'", value))?;

    let mut record = parse_interface_spec(interface_spec)?;
    parse_ip_spec(ip_spec, &mut record)?;
    Ok(record)
}

fn parse_interface_spec(spec: &str) -> Result<InterfaceRecord> {
    if spec.is_empty() {
        bail!("ifcfg= directive has an empty interface spec");
    }
    if spec.contains(':') {
        // MAC literal: matched by MACAddress=, not split further.
        return Ok(InterfaceRecord::named(spec));
    }
    if let Some((parent, vlanid)) = spec.rsplit_once('.') {
        let id: u16 = vlanid
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid VLAN id in interface spec '{}'", spec))?;
        if !(1..=4095).contains(&id) {
            bail!("VLAN id {} in interface spec '{}' out of range 1..=4095", id, spec);
        }
        let mut record = InterfaceRecord::named(spec);
        record.ifcfg_vlan_id = Some(id);
        record.ifcfg_vlan_parent = Some(parent.to_string());
        return Ok(record);
    }
    if spec.contains('*') {
        glob::Pattern::new(spec)
            .map_err(|e| anyhow::anyhow!("invalid glob interface spec '{}': {}", spec, e))?;
    }
    Ok(InterfaceRecord::named(spec))
}

fn parse_ip_spec(spec: &str, record: &mut InterfaceRecord) -> Result<()> {
    if let Some(kw) = autoconf::parse(spec) {
        record.autoconf = Some(kw.autoconf);
        record.rfc2132 = kw.rfc2132;
        return Ok(());
    }

    let mut parts: Vec<&str> = spec.split(',').collect();
    if parts.len() > 4 {
        bail!(
            "ifcfg= ip-spec '{}' has more than 4 comma-separated fields (IP-list,GW-list,DNS-list,Domain-list)",
            spec
        );
    }
    // Trailing fields (DNS-list, Domain-list, and even GW-list) may be
    // omitted entirely rather than left as empty commas.
    parts.resize(4, "");
    let (ip_list, gw_list, dns_list, domain_list) = (parts[0], parts[1], parts[2], parts[3]);

    let client_ips: Vec<String> = ip_list.split_whitespace().map(String::from).collect();
    if !client_ips.is_empty() {
        record.client_ip = Some(client_ips);
    }

    let gateways: Vec<&str> = gw_list.split_whitespace().collect();
    if gateways.len() > 2 {
        bail!("ifcfg= ip-spec '{}' has more than 2 gateways", spec);
    }
    if let Some(gw) = gateways.first() {
        record.gateway = Some(gw.to_string());
    }
    if let Some(gw) = gateways.get(1) {
        record.gateway1 = Some(gw.to_string());
    }

    let dns: Vec<String> = dns_list.split_whitespace().map(String::from).collect();
    if !dns.is_empty() {
        record.dns1 = Some(dns);
    }

    let domains: Vec<String> = domain_list.split_whitespace().map(String::from).collect();
    if !domains.is_empty() {
        record.domains = Some(domains);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dhcp_catchall() {
        let rec = parse("*=dhcp").unwrap();
        assert_eq!(rec.interface.as_deref(), Some("*"));
        assert_eq!(rec.autoconf.unwrap().primitive(), "yes");
    }

    #[test]
    fn mac_with_rfc2132() {
        let rec = parse("00:11:22:33:44:55=dhcp4,rfc2132").unwrap();
        assert_eq!(rec.interface.as_deref(), Some("00:11:22:33:44:55"));
        assert_eq!(rec.autoconf.unwrap().primitive(), "ipv4");
        assert!(rec.rfc2132);
    }

    #[test]
    fn static_four_part_spec() {
        let rec = parse("eth1=192.168.0.2/24 192.158.10.12/24,192.168.0.1,8.8.8.8,mydomain.com").unwrap();
        assert_eq!(rec.interface.as_deref(), Some("eth1"));
        assert_eq!(
            rec.client_ip.as_deref(),
            Some(&["192.168.0.2/24".to_string(), "192.158.10.12/24".to_string()][..])
        );
        assert_eq!(rec.gateway.as_deref(), Some("192.168.0.1"));
        assert_eq!(rec.dns1.as_deref(), Some(&["8.8.8.8".to_string()][..]));
        assert_eq!(rec.domains.as_deref(), Some(&["mydomain.com".to_string()][..]));
    }

    #[test]
    fn vlan_sub_form() {
        let rec = parse("eth0.66=10.0.1.1/24,10.0.1.254,,").unwrap();
        assert_eq!(rec.ifcfg_vlan_id, Some(66));
        assert_eq!(rec.ifcfg_vlan_parent.as_deref(), Some("eth0"));
        assert_eq!(rec.gateway.as_deref(), Some("10.0.1.254"));
    }

    #[test]
    fn trailing_fields_may_be_omitted_entirely() {
        // DNS-list and Domain-list dropped outright, not left as empty
        // commas (the form spec.md's end-to-end scenarios actually use).
        let rec = parse("eth0.66=10.0.1.1/24,10.0.1.254").unwrap();
        assert_eq!(rec.ifcfg_vlan_id, Some(66));
        assert_eq!(rec.gateway.as_deref(), Some("10.0.1.254"));
        assert!(rec.dns1.is_none());
        assert!(rec.domains.is_none());
    }

    #[test]
    fn invalid_vlan_id_is_rejected() {
        assert!(parse("eth0.9000=dhcp").is_err());
        assert!(parse("eth0.notanumber=dhcp").is_err());
    }

    #[test]
    fn too_many_comma_fields_is_rejected() {
        assert!(parse("eth0=1.2.3.4,1.2.3.1,1.1.1.1,example.com,extra").is_err());
    }
}
