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

//! Kernel command-line tokenizer.
//!
//! A hand-rolled scanner rather than a regex: the quoting rule (a `"`
//! toggles quote state, splitting only happens on unquoted whitespace) is
//! stateful across the whole line and doesn't fit a single regex cleanly.

/// Splits a kernel command line into tokens, honoring `"`-quoting.
///
/// Whitespace inside a quoted span is kept as part of the token; the
/// quote characters themselves are stripped from the output.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut have_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                have_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if have_token {
                    tokens.push(std::mem::take(&mut current));
                    have_token = false;
                }
            }
            c => {
                current.push(c);
                have_token = true;
            }
        }
    }
    if have_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_unquoted_whitespace() {
        assert_eq!(
            tokenize("ifcfg=eth0=dhcp  ip=eth1:dhcp"),
            vec!["ifcfg=eth0=dhcp", "ip=eth1:dhcp"]
        );
    }

    #[test]
    fn quotes_protect_embedded_whitespace() {
        assert_eq!(
            tokenize(r#"ifcfg="eth0 alias"=dhcp vlan=vlan5:eth0"#),
            vec!["ifcfg=eth0 alias=dhcp", "vlan=vlan5:eth0"]
        );
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }
}
