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

//! `vlan=<vlan-name>:<parent-interface>` (spec §4.1.4).

use anyhow::{bail, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::record::{Context, InterfaceRecord, Origin};

lazy_static! {
    static ref TRAILING_DIGITS: Regex = Regex::new(r"(\d+)$").expect("compiling vlan id regex");
}

/// Parses a `vlan=` directive and folds its effects into `ctx`: a VLAN
/// table entry for `vlan-name`, and a `vlan_refs` augmentation on the
/// parent interface's record (creating it if it doesn't exist yet).
pub fn apply(value: &str, ctx: &mut Context) -> Result<()> {
    let (name, parent) = value
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("vlan= directive '{}' missing ':' separator", value))?;
    if name.is_empty() || parent.is_empty() {
        bail!("vlan= directive '{}' has an empty name or parent", value);
    }

    let digits = TRAILING_DIGITS
        .captures(name)
        .ok_or_else(|| anyhow::anyhow!("vlan= name '{}' has no trailing numeric id", name))?;
    let id: u16 = digits[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("vlan id in '{}' doesn't fit in u16", name))?;
    if !(1..=4095).contains(&id) {
        bail!("vlan id {} in '{}' out of range 1..=4095", id, name);
    }

    ctx.vlans.insert(id, name)?;
    ctx.merge(InterfaceRecord {
        interface: Some(parent.to_string()),
        vlan_refs: vec![id],
        origin: vec![Origin::Vlan],
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_digits_give_the_vlan_id() {
        let cases = vec![("vlan0005:eth0", 5), ("vlan5:eth0", 5), ("eth0.5:eth0", 5)];
        for (input, id) in cases {
            let mut ctx = Context::new();
            apply(input, &mut ctx).unwrap();
            assert_eq!(ctx.vlans.iter().next().unwrap().id, id, "case {}", input);
        }
    }

    #[test]
    fn creates_parent_record_if_missing() {
        let mut ctx = Context::new();
        apply("vlan99:eth0", &mut ctx).unwrap();
        let parent = ctx
            .records
            .iter()
            .find(|r| r.interface.as_deref() == Some("eth0"))
            .unwrap();
        assert_eq!(parent.vlan_refs, vec![99]);
    }

    #[test]
    fn augments_existing_parent_record() {
        let mut ctx = Context::new();
        ctx.merge(InterfaceRecord::named("eth0")).unwrap();
        apply("vlan99:eth0", &mut ctx).unwrap();
        apply("vlan98:eth0", &mut ctx).unwrap();
        assert_eq!(ctx.records.len(), 1);
        assert_eq!(ctx.records[0].vlan_refs, vec![99, 98]);
    }

    #[test]
    fn missing_trailing_digits_is_an_error() {
        assert!(apply("myvlan:eth0", &mut Context::new()).is_err());
    }

    #[test]
    fn out_of_range_id_is_an_error() {
        assert!(apply("vlan9000:eth0", &mut Context::new()).is_err());
    }
}
