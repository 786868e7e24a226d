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

//! EFI Boot-Source Resolver (spec §4.5): walks a small chain of
//! strategies over EFI boot variables to figure out how the running
//! image was booted.

use serde::Serialize;
use uuid::Uuid;

use super::devpath::{self, DevicePathNode};
use super::vars::{decode_utf16le, EfiError, EfiVarFs};

/// Well-known systemd-boot loader variable GUID.
const LOADER_GUID: &str = "4a67b082-0a4c-41cf-b6c7-440b29bb8c4f";
/// The EFI global variable GUID (`BootCurrent`, `BootOrder`, `Boot####`).
const GLOBAL_GUID: &str = "8be4df61-93ca-11d2-aa0d-00e098032b8c";

/// The resolved boot source. `def_efi_partition` is populated by the
/// secondary `BootOrder`-based lookup (strategy 3) independently of
/// whichever strategy determined `device`/`url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootSource {
    pub url: Option<String>,
    pub device: Option<String>,
    pub image: Option<String>,
    pub entry: Option<String>,
    pub def_efi_partition: Option<String>,
    pub is_pxe_boot: bool,
}

/// Runs the full strategy chain and returns the resolved boot source.
pub fn resolve_boot_source(fs: &EfiVarFs) -> Result<BootSource, EfiError> {
    fs.check_available()?;

    let mut result = strategy_loader_stub(fs)?;
    if result.is_none() {
        if let Some(current) = try_read_u16(fs, "BootCurrent")? {
            result = resolve_boot_entry(fs, current)?;
        }
    }

    if let Some(order) = try_read_raw(fs, "BootOrder")? {
        if order.len() >= 2 {
            let first = u16::from_le_bytes([order[0], order[1]]);
            if let Ok(Some(fallback)) = resolve_boot_entry(fs, first) {
                let entry = result.get_or_insert_with(BootSource::default);
                entry.def_efi_partition = fallback.device;
            }
        }
    }

    result.ok_or_else(|| EfiError::NotFound("boot source".to_string()))
}

/// Strategy 1: the systemd-boot loader-stub variables. Populates
/// `url`/`device` from `LoaderDeviceURL`/`LoaderDevicePartUUID` and
/// `entry`/`image` from the companion identifier variables. Yields "not
/// found" unless at least a URL or a partition UUID is present.
fn strategy_loader_stub(fs: &EfiVarFs) -> Result<Option<BootSource>, EfiError> {
    let url = try_read_string(fs, "LoaderDeviceURL", LOADER_GUID)?;
    let partuuid = try_read_string(fs, "LoaderDevicePartUUID", LOADER_GUID)?;
    let entry = try_read_string(fs, "LoaderEntrySelected", LOADER_GUID)?;
    let image = try_read_string(fs, "LoaderImageIdentifier", LOADER_GUID)?;

    if url.is_none() && partuuid.is_none() {
        return Ok(None);
    }
    Ok(Some(BootSource {
        url,
        device: partuuid.map(|u| format!("/dev/disk/by-partuuid/{}", u.to_lowercase())),
        image,
        entry,
        def_efi_partition: None,
        is_pxe_boot: false,
    }))
}

/// Strategies 2 and 3 share this: read `Boot<XXXX>` (the EFI_LOAD_OPTION
/// structure) and interpret its device-path blob.
fn resolve_boot_entry(fs: &EfiVarFs, index: u16) -> Result<Option<BootSource>, EfiError> {
    let name = format!("Boot{:04X}", index);
    let raw = match fs.read_raw(&name, GLOBAL_GUID) {
        Ok(raw) => raw,
        Err(EfiError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    // Attributes(4) + FilePathListLength(2) + Description(UTF-16, NUL-terminated) + FilePathList.
    if raw.len() < 6 {
        return Ok(None);
    }
    let fpl_len = u16::from_le_bytes([raw[4], raw[5]]) as usize;
    let (_description, consumed) = match decode_utf16le(&raw[6..]) {
        Some(v) => v,
        None => return Ok(None),
    };
    let dp_start = 6 + consumed;
    if dp_start + fpl_len > raw.len() {
        return Ok(None);
    }
    let blob = &raw[dp_start..dp_start + fpl_len];
    Ok(interpret_device_path(devpath::parse(blob)))
}

fn interpret_device_path(nodes: Vec<DevicePathNode<'_>>) -> Option<BootSource> {
    let mut source = BootSource::default();
    let mut found = false;
    for node in nodes {
        match (node.node_type, node.sub_type) {
            (devpath::TYPE_MEDIA, devpath::SUBTYPE_MEDIA_HARD_DRIVE) => {
                let guid_off_in_payload = devpath::HARD_DRIVE_GUID_OFFSET - 4;
                if node.payload.len() + 4 >= devpath::HARD_DRIVE_MIN_LEN
                    && node.payload.len() >= guid_off_in_payload + 16
                {
                    let guid = &node.payload[guid_off_in_payload..guid_off_in_payload + 16];
                    source.device = Some(format_partuuid(guid));
                    found = true;
                }
            }
            (devpath::TYPE_MEDIA, devpath::SUBTYPE_MEDIA_FILE_PATH) => {
                if let Some((s, _)) = decode_utf16le(node.payload) {
                    source.image = Some(s);
                    found = true;
                }
            }
            (devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_URI) => {
                if let Some((s, _)) = decode_utf16le(node.payload) {
                    source.url = Some(s);
                    found = true;
                }
            }
            (devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_MAC_ADDR) => {
                source.is_pxe_boot = true;
                found = true;
            }
            (devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_IPV4) => {
                if node.payload.len() >= 8 && node.payload[4..8] == [0, 0, 0, 0] {
                    source.is_pxe_boot = true;
                    found = true;
                }
            }
            _ => {}
        }
    }
    found.then_some(source)
}

/// Renders a 16-byte mixed-endian EFI GUID as a lowercase partition UUID
/// path (spec §4.5: hard-drive media device-path node, offset 24).
fn format_partuuid(guid_bytes: &[u8]) -> String {
    let d1 = u32::from_le_bytes(guid_bytes[0..4].try_into().expect("16-byte slice"));
    let d2 = u16::from_le_bytes(guid_bytes[4..6].try_into().expect("16-byte slice"));
    let d3 = u16::from_le_bytes(guid_bytes[6..8].try_into().expect("16-byte slice"));
    let d4: [u8; 8] = guid_bytes[8..16].try_into().expect("16-byte slice");
    let uuid = Uuid::from_fields(d1, d2, d3, &d4);
    format!("/dev/disk/by-partuuid/{}", uuid.to_string().to_lowercase())
}

fn try_read_string(fs: &EfiVarFs, name: &str, guid: &str) -> Result<Option<String>, EfiError> {
    match fs.read_string(name, guid) {
        Ok(s) => Ok(Some(s)),
        Err(EfiError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn try_read_raw(fs: &EfiVarFs, name: &str) -> Result<Option<Vec<u8>>, EfiError> {
    match fs.read_raw(name, GLOBAL_GUID) {
        Ok(raw) => Ok(Some(raw)),
        Err(EfiError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn try_read_u16(fs: &EfiVarFs, name: &str) -> Result<Option<u16>, EfiError> {
    Ok(try_read_raw(fs, name)?.and_then(|raw| {
        (raw.len() >= 2).then(|| u16::from_le_bytes([raw[0], raw[1]]))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le_nul(s: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        for c in s.encode_utf16() {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf
    }

    fn dp_node(node_type: u8, sub_type: u8, payload: &[u8]) -> Vec<u8> {
        let length = (4 + payload.len()) as u16;
        let mut buf = vec![node_type, sub_type];
        buf.extend_from_slice(&length.to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    fn end_node() -> Vec<u8> {
        dp_node(devpath::TYPE_END, 0xFF, &[])
    }

    #[test]
    fn hard_drive_node_yields_partuuid() {
        let mut payload = vec![0u8; devpath::HARD_DRIVE_MIN_LEN - 4];
        let guid_off = devpath::HARD_DRIVE_GUID_OFFSET - 4;
        payload[guid_off..guid_off + 16].copy_from_slice(&[
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f, 0x10,
        ]);
        let mut blob = dp_node(devpath::TYPE_MEDIA, devpath::SUBTYPE_MEDIA_HARD_DRIVE, &payload);
        blob.extend_from_slice(&end_node());
        let source = interpret_device_path(devpath::parse(&blob)).unwrap();
        assert!(source.device.unwrap().starts_with("/dev/disk/by-partuuid/04030201-0605-0807"));
    }

    #[test]
    fn mac_addr_node_sets_pxe_flag() {
        let mut blob = dp_node(devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_MAC_ADDR, &[0u8; 32]);
        blob.extend_from_slice(&end_node());
        let source = interpret_device_path(devpath::parse(&blob)).unwrap();
        assert!(source.is_pxe_boot);
    }

    #[test]
    fn ipv4_node_with_zero_remote_sets_pxe_flag() {
        let mut payload = vec![0u8; 23];
        // remote IP at payload[4..8] left as 0.0.0.0
        payload[0..4].copy_from_slice(&[192, 168, 1, 5]); // local IP, non-zero
        let mut blob = dp_node(devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_IPV4, &payload);
        blob.extend_from_slice(&end_node());
        let source = interpret_device_path(devpath::parse(&blob)).unwrap();
        assert!(source.is_pxe_boot);
    }

    #[test]
    fn ipv4_node_with_nonzero_remote_does_not_set_pxe_flag() {
        let mut payload = vec![0u8; 23];
        payload[4..8].copy_from_slice(&[10, 0, 0, 1]);
        let mut blob = dp_node(devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_IPV4, &payload);
        blob.extend_from_slice(&end_node());
        assert!(interpret_device_path(devpath::parse(&blob)).is_none());
    }

    #[test]
    fn uri_node_yields_url() {
        let payload = utf16le_nul("http://example.com/image.raw.xz");
        let mut blob = dp_node(devpath::TYPE_MESSAGING, devpath::SUBTYPE_MSG_URI, &payload);
        blob.extend_from_slice(&end_node());
        let source = interpret_device_path(devpath::parse(&blob)).unwrap();
        assert_eq!(source.url.as_deref(), Some("http://example.com/image.raw.xz"));
    }

    #[test]
    fn file_path_node_yields_image() {
        let payload = utf16le_nul(r"\EFI\BOOT\BOOTX64.EFI");
        let mut blob = dp_node(devpath::TYPE_MEDIA, devpath::SUBTYPE_MEDIA_FILE_PATH, &payload);
        blob.extend_from_slice(&end_node());
        let source = interpret_device_path(devpath::parse(&blob)).unwrap();
        assert_eq!(source.image.as_deref(), Some("/EFI/BOOT/BOOTX64.EFI"));
    }

    #[test]
    fn empty_device_path_yields_nothing() {
        assert!(interpret_device_path(devpath::parse(&end_node())).is_none());
    }
}
