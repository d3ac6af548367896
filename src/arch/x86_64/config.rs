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

//! Named constants for every fixed quantity the boot trampoline and interrupt shim depend on.
//!
//! Keeping these in one place means the linker script, the assembly, and the Rust-side
//! page-table and GDT builders all agree on the same numbers instead of each repeating the
//! arithmetic.

/// Size of one x86_64 page, in bytes.
pub const PAGE_SIZE: usize = 0x1000;

/// Number of guarded pages reserved for the boot stack.
pub const STACK_SIZE_PAGES: usize = 128;

/// Size of the boot stack, in bytes.
pub const STACK_SIZE: usize = STACK_SIZE_PAGES * PAGE_SIZE;

/// Size, in MiB, of the low-memory range that the boot trampoline identity-maps and aliases at
/// the high-half base.
pub const IDENTITY_MAP_MIB: usize = 128;

/// Number of `2`-MiB huge-page entries in the shared page directory that covers
/// [`IDENTITY_MAP_MIB`].
pub const PDT_ENTRY_COUNT: usize = (IDENTITY_MAP_MIB * 1024 * 1024) / (2 * 1024 * 1024);

/// Virtual base address of the high-half kernel mapping.
pub const HIGH_HALF_BASE: u64 = 0xFFFF_FFFF_8000_0000;

/// Selector of the 64-bit code segment in the boot GDT.
pub const KERNEL_CODE_SELECTOR: u16 = 0x08;

/// Selector of the data segment in the boot GDT.
pub const KERNEL_DATA_SELECTOR: u16 = 0x10;

/// Number of entries exported in the interrupt vector table.
pub const INTERRUPT_VECTOR_COUNT: usize = 256;

static_assertions::const_assert_eq!(PDT_ENTRY_COUNT, 64);
static_assertions::const_assert!(STACK_SIZE_PAGES > 0);
