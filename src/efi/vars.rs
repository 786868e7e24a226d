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

//! EFI Variable Reader (spec §4.4): reads `/sys/firmware/efi/efivars/*`
//! pseudo-files and decodes their UTF-16LE payloads.

use std::fs::{symlink_metadata, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The kind of filesystem entry found where a regular file was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Error)]
pub enum EfiError {
    #[error("EFI variable {0} not found")]
    NotFound(String),
    #[error("{0} is not a regular file ({1:?})")]
    WrongType(String, FileKind),
    #[error("malformed UTF-16 payload in {0}")]
    MalformedUtf16(String),
    #[error("I/O error reading {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("unsupported environment: {0}")]
    Unsupported(String),
}

/// A view onto an efivarfs mount (normally `/sys/firmware/efi/efivars`,
/// overridable for tests).
pub struct EfiVarFs {
    base: PathBuf,
}

impl EfiVarFs {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn system() -> Self {
        Self::new("/sys/firmware/efi/efivars")
    }

    /// Confirms the efivarfs mount is present and is a directory; this is
    /// the gate for the resolver's "unsupported environment" exit (spec
    /// §4.5, §6).
    pub fn check_available(&self) -> Result<(), EfiError> {
        let meta = symlink_metadata(&self.base).map_err(|e| {
            EfiError::Unsupported(format!("{} is not accessible: {}", self.base.display(), e))
        })?;
        if !meta.is_dir() {
            return Err(EfiError::Unsupported(format!(
                "{} is not a directory",
                self.base.display()
            )));
        }
        Ok(())
    }

    fn var_path(&self, name: &str, guid: &str) -> PathBuf {
        self.base.join(format!("{}-{}", name, guid))
    }

    /// Reads one EFI variable and returns its payload with the leading
    /// 4-byte attribute header stripped.
    pub fn read_raw(&self, name: &str, guid: &str) -> Result<Vec<u8>, EfiError> {
        let path = self.var_path(name, guid);
        let label = format!("{}-{}", name, guid);
        let meta = symlink_metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EfiError::NotFound(label.clone())
            } else {
                EfiError::Io(label.clone(), e)
            }
        })?;
        if meta.is_dir() {
            return Err(EfiError::WrongType(label, FileKind::Directory));
        }
        if meta.file_type().is_symlink() {
            return Err(EfiError::WrongType(label, FileKind::Symlink));
        }
        if !meta.is_file() {
            return Err(EfiError::WrongType(label, FileKind::Other));
        }

        let mut buf = Vec::new();
        File::open(&path)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .map_err(|e| EfiError::Io(label.clone(), e))?;
        if buf.len() < 4 {
            return Err(EfiError::MalformedUtf16(label));
        }
        Ok(buf.split_off(4))
    }

    /// Reads and decodes a UTF-16LE string variable.
    pub fn read_string(&self, name: &str, guid: &str) -> Result<String, EfiError> {
        let raw = self.read_raw(name, guid)?;
        decode_utf16le(&raw)
            .map(|(s, _)| s)
            .ok_or_else(|| EfiError::MalformedUtf16(format!("{}-{}", name, guid)))
    }
}

/// Decodes a UTF-16LE byte string, stopping at the first NUL code unit or
/// the end of `bytes`, whichever comes first. Rejects non-ASCII code
/// units (>=128) and odd-length input. Returns the decoded string and the
/// number of bytes consumed (including a terminating NUL pair, if any) so
/// callers parsing a larger structure know where the string ends.
///
/// Backslashes are translated to forward slashes, matching the Windows
/// device-path convention used inside EFI variables (spec §4.4).
pub fn decode_utf16le(bytes: &[u8]) -> Option<(String, usize)> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let mut out = String::new();
    let mut consumed = 0usize;
    for chunk in bytes.chunks(2) {
        let unit = u16::from_le_bytes([chunk[0], chunk[1]]);
        consumed += 2;
        if unit == 0 {
            break;
        }
        if unit >= 128 {
            return None;
        }
        let ch = unit as u8 as char;
        out.push(if ch == '\\' { '/' } else { ch });
    }
    Some((out, consumed))
}
