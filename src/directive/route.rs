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

//! `rd.route=<destination>[:<gateway>][:<interface>]` (spec §4.1.4).

use anyhow::{bail, Result};

use crate::record::InterfaceRecord;
use crate::util::strip_brackets;

pub fn parse(value: &str) -> Result<InterfaceRecord> {
    let fields = crate::util::split_colon_fields(value);
    if fields.is_empty() || fields[0].is_empty() {
        bail!("rd.route= directive '{}' has no destination", value);
    }
    if fields.len() > 3 {
        bail!("rd.route= directive '{}' has too many fields", value);
    }

    let mut record = InterfaceRecord::default();
    record.destination = Some(strip_brackets(&fields[0]).to_string());
    if let Some(gw) = fields.get(1).filter(|s| !s.is_empty()) {
        record.gateway = Some(strip_brackets(gw).to_string());
    }
    if let Some(iface) = fields.get(2).filter(|s| !s.is_empty()) {
        record.interface = Some(iface.to_string());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_gateway_and_interface() {
        let rec = parse("[2001:DB8:3::/8]:[2001:DB8:2::1]:ens10").unwrap();
        assert_eq!(rec.destination.as_deref(), Some("2001:DB8:3::/8"));
        assert_eq!(rec.gateway.as_deref(), Some("2001:DB8:2::1"));
        assert_eq!(rec.interface.as_deref(), Some("ens10"));
    }

    #[test]
    fn destination_and_gateway_without_interface_is_a_free_record() {
        let rec = parse("10.1.2.3/16:10.0.2.3").unwrap();
        assert_eq!(rec.destination.as_deref(), Some("10.1.2.3/16"));
        assert_eq!(rec.gateway.as_deref(), Some("10.0.2.3"));
        assert!(rec.interface.is_none());
    }

    #[test]
    fn missing_destination_is_an_error() {
        assert!(parse("").is_err());
        assert!(parse(":10.0.2.3").is_err());
    }
}
