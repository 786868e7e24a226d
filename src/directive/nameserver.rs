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

//! `nameserver=<ip>` and `rd.peerdns=0|1` (spec §4.1.4). Both produce a
//! free record (no `interface`), so the merger applies them to every
//! already-named interface.

use anyhow::{bail, Result};

use crate::record::{InterfaceRecord, UseDns};

/// Parses a `nameserver=` directive value.
pub fn parse_nameserver(value: &str) -> Result<InterfaceRecord> {
    if value.is_empty() {
        bail!("nameserver= directive has an empty value");
    }
    Ok(InterfaceRecord {
        dns1: Some(vec![value.to_string()]),
        ..Default::default()
    })
}

/// Parses a `rd.peerdns=` directive value.
pub fn parse_peerdns(value: &str) -> Result<InterfaceRecord> {
    let use_dns = match value {
        "0" => UseDns::False,
        "1" => UseDns::True,
        _ => bail!("rd.peerdns= value must be 0 or 1, got '{}'", value),
    };
    Ok(InterfaceRecord {
        use_dns,
        ..Default::default()
    })
}
