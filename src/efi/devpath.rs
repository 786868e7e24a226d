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

//! EFI device-path binary blob walker (spec §4.5).
//!
//! A device path is a sequence of `{type: u8, sub_type: u8, length: u16
//! LE, payload}` nodes, terminated by a node of type `0x7f` (End of
//! Hardware Device Path). We stop at the first malformed node rather than
//! erroring, since a truncated or unrecognized tail shouldn't prevent
//! using whatever nodes were already parsed.
pub struct DevicePathNode<'a> {
    pub node_type: u8,
    pub sub_type: u8,
    pub payload: &'a [u8],
}

pub const TYPE_HARDWARE: u8 = 0x01;
pub const TYPE_ACPI: u8 = 0x02;
pub const TYPE_MESSAGING: u8 = 0x03;
pub const TYPE_MEDIA: u8 = 0x04;
pub const TYPE_END: u8 = 0x7f;

pub const SUBTYPE_MEDIA_HARD_DRIVE: u8 = 0x01;
pub const SUBTYPE_MEDIA_FILE_PATH: u8 = 0x04;
pub const SUBTYPE_MSG_MAC_ADDR: u8 = 0x0b;
pub const SUBTYPE_MSG_IPV4: u8 = 0x0c;
pub const SUBTYPE_MSG_URI: u8 = 0x18;

/// Minimum total node length (including the 4-byte header) for a
/// hard-drive media device path node: enough to hold the partition
/// signature GUID at byte offset 24.
pub const HARD_DRIVE_MIN_LEN: usize = 42;
/// Offset of the partition signature GUID within the whole node.
pub const HARD_DRIVE_GUID_OFFSET: usize = 24;

pub fn parse(blob: &[u8]) -> Vec<DevicePathNode<'_>> {
    let mut nodes = Vec::new();
    let mut offset = 0usize;
    while offset + 4 <= blob.len() {
        let node_type = blob[offset];
        let sub_type = blob[offset + 1];
        let length = u16::from_le_bytes([blob[offset + 2], blob[offset + 3]]) as usize;
        if length < 4 || offset + length > blob.len() {
            break;
        }
        if node_type == TYPE_END {
            break;
        }
        nodes.push(DevicePathNode {
            node_type,
            sub_type,
            payload: &blob[offset + 4..offset + length],
        });
        offset += length;
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_type: u8, sub_type: u8, payload: &[u8]) -> Vec<u8> {
        let length = (4 + payload.len()) as u16;
        let mut buf = vec![node_type, sub_type];
        buf.extend_from_slice(&length.to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn walks_nodes_until_end_marker() {
        let mut blob = node(TYPE_MESSAGING, SUBTYPE_MSG_MAC_ADDR, &[0xAA; 32]);
        blob.extend_from_slice(&node(TYPE_END, 0xFF, &[]));
        let nodes = parse(&blob);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node_type, TYPE_MESSAGING);
        assert_eq!(nodes[0].sub_type, SUBTYPE_MSG_MAC_ADDR);
    }

    #[test]
    fn stops_on_truncated_length() {
        let mut blob = vec![TYPE_MEDIA, SUBTYPE_MEDIA_HARD_DRIVE];
        blob.extend_from_slice(&100u16.to_le_bytes());
        blob.extend_from_slice(&[0u8; 4]); // much shorter than declared length
        assert!(parse(&blob).is_empty());
    }

    #[test]
    fn stops_on_length_below_header_size() {
        let mut blob = vec![TYPE_MEDIA, SUBTYPE_MEDIA_HARD_DRIVE];
        blob.extend_from_slice(&2u16.to_le_bytes());
        assert!(parse(&blob).is_empty());
    }

    #[test]
    fn empty_blob_yields_no_nodes() {
        assert!(parse(&[]).is_empty());
    }
}
