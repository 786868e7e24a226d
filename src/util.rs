// Copyright 2020 CoreOS, Inc.
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

//! Small string/address helpers shared by the directive parsers.

use anyhow::{bail, Result};
use std::net::IpAddr;

/// Strips a single matching pair of `[` `]` brackets, if present.
pub fn strip_brackets(s: &str) -> &str {
    s.strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(s)
}

/// True if `s` (after stripping brackets) parses as an IPv4 or IPv6
/// address literal.
pub fn is_ip_literal(s: &str) -> bool {
    strip_brackets(s).parse::<IpAddr>().is_ok()
}

/// Splits `s` on unbracketed `:` characters. A `[...]` span (used to wrap
/// IPv6 literals so their own colons aren't mistaken for field
/// separators) is kept intact and returned with its brackets stripped.
pub fn split_colon_fields(s: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    for c in s.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Converts a CIDR prefix length or a dotted-quad netmask to a prefix
/// length in `0..=128`.
///
/// A dotted-quad mask must be a contiguous run of one bits followed by a
/// contiguous run of zero bits (e.g. `255.255.255.0`); anything else is
/// rejected.
pub fn netmask_to_prefix(s: &str) -> Result<u8> {
    if s.contains('.') {
        let octets: Vec<u8> = s
            .split('.')
            .map(|o| o.parse::<u8>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| anyhow::anyhow!("invalid netmask '{}'", s))?;
        if octets.len() != 4 {
            bail!("invalid netmask '{}'", s);
        }
        let bits = u32::from_be_bytes([octets[0], octets[1], octets[2], octets[3]]);
        let ones = bits.leading_ones();
        // A valid netmask's 1s are contiguous from the top: shifting back
        // down must produce all zeros.
        if ones < 32 && (bits << ones) != 0 {
            bail!("netmask '{}' is not contiguous", s);
        }
        Ok(ones as u8)
    } else {
        let prefix: u8 = s
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid prefix length '{}'", s))?;
        if prefix > 128 {
            bail!("prefix length {} out of range", prefix);
        }
        Ok(prefix)
    }
}
