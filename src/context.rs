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

//! The context object threaded through the parser, merger and emitter
//! (spec §9: a single object passed by `&mut` reference, replacing the C
//! original's process-global tables).
//!
//! [`Context`] itself lives next to the types it owns in [`crate::record`]
//! (an `InterfaceRecord`'s merge rule is intimately tied to the table that
//! holds it); this module is its public door, so call sites write
//! `context::Context` rather than reaching into `record`.

pub use crate::record::Context;
