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

//! EFI Variable Reader and EFI Boot-Source Resolver (spec §4.4, §4.5).

pub mod bootsource;
pub mod devpath;
pub mod vars;

pub use bootsource::{resolve_boot_source, BootSource};
pub use vars::{EfiError, EfiVarFs, FileKind};
