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

//! The x86_64 boot trampoline (C1) and interrupt dispatch shim (C2), plus the ambient
//! configuration, error taxonomy, and IDT-building helpers that sit around them.

mod boot;
mod gdt;
mod multiboot;

pub mod config;
pub mod failure;
pub mod idt;
pub mod interrupts;
pub mod paging;

pub use interrupts::{interrupt_vector_table, InterruptFrame};
