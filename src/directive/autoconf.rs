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

//! `ifcfg=`'s `dhcp`/`dhcp4`/`dhcp6[,rfc2132]` keyword, mapped onto the
//! shared [`crate::record::Autoconf`] enum.

use crate::record::Autoconf;

/// Parsed form of ifcfg's DHCP keyword, before it's folded into a record.
pub struct DhcpKeyword {
    pub autoconf: Autoconf,
    pub rfc2132: bool,
}

/// Parses `dhcp`, `dhcp4`, `dhcp6`, each with an optional `,rfc2132`
/// suffix. Bare `dhcp` means "either family" (maps to the `any` primitive,
/// `yes`); `dhcp4`/`dhcp6` request a single family and map onto the
/// identically-named `Autoconf` variants.
pub fn parse(keyword: &str) -> Option<DhcpKeyword> {
    let (base, rfc2132) = match keyword.strip_suffix(",rfc2132") {
        Some(base) => (base, true),
        None => (keyword, false),
    };
    let autoconf = match base {
        "dhcp" => Autoconf::Any,
        "dhcp4" => Autoconf::Dhcp,
        "dhcp6" => Autoconf::Dhcp6,
        _ => return None,
    };
    Some(DhcpKeyword { autoconf, rfc2132 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dhcp_means_either_family() {
        let kw = parse("dhcp").unwrap();
        assert_eq!(kw.autoconf.primitive(), "yes");
        assert!(!kw.rfc2132);
    }

    #[test]
    fn dhcp4_and_dhcp6_map_to_single_family() {
        assert_eq!(parse("dhcp4").unwrap().autoconf.primitive(), "ipv4");
        assert_eq!(parse("dhcp6").unwrap().autoconf.primitive(), "ipv6");
    }

    #[test]
    fn rfc2132_suffix_is_detected() {
        let kw = parse("dhcp4,rfc2132").unwrap();
        assert!(kw.rfc2132);
        assert_eq!(kw.autoconf.primitive(), "ipv4");
    }

    #[test]
    fn unknown_keyword_is_none() {
        assert!(parse("static").is_none());
    }
}
