// Copyright (C) 2019-2020  Pierre Krieger
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Platform-specific code: the boot trampoline, the interrupt dispatch shim, and everything
//! built around them. Only x86_64 is supported; this crate's Multiboot header, GDT, and page
//! tables are all architecture-specific by nature, so there is no architecture-neutral facade to
//! abstract over the way the rest of a full kernel might.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;
