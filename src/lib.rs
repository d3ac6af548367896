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

//! The x86_64 boot-and-interrupt core of the ignition kernel.
//!
//! This crate provides the earliest code that runs after a Multiboot2 bootloader hands off
//! control (`arch::x86_64::boot`, behind the `entry` symbol), the 256-vector interrupt dispatch
//! shim (`arch::x86_64`'s `interrupt_vector_table` and its shared save/restore trampoline), and
//! the diagnostics (`klog`) a kernel built on top of it uses to report what's happening.
//!
//! It does **not** provide a scheduler, a memory manager, device drivers, or a filesystem: those
//! are the job of whatever defines the two symbols this crate expects from its caller,
//! `kernel_main` and `rust_interrupt_handler_for_all_state`. This crate's own `[[bin]]` target
//! defines a minimal version of both, just enough to prove the core boots and dispatches
//! interrupts; see `src/main.rs`.
#![no_std]
#![feature(naked_functions)]

extern crate rlibc;

pub mod arch;
pub mod klog;

mod panic;
