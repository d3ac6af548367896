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

//! A raw IDT gate-descriptor builder.
//!
//! Loading the real IDT is the higher-level kernel's job (§1, §6 of the design this crate
//! implements): this core exports [`interrupt_vector_table`](super::interrupt_vector_table) and
//! nothing more. This module exists only because the kernel's job is the same 16-byte gate
//! layout on every call site, whether that's the demo `kernel_main` in this crate's own `[[bin]]`
//! or the `selftest` crate: both copy the same 256 stub addresses into the same descriptor
//! shape, so the copy is written once here instead of twice downstream.

use super::config::{INTERRUPT_VECTOR_COUNT, KERNEL_CODE_SELECTOR};
use super::interrupt_vector_table;

const PRESENT: u8 = 1 << 7;
const INTERRUPT_GATE_TYPE: u8 = 0xe; // 64-bit interrupt gate, IF cleared on entry.

/// A single 16-byte long-mode IDT gate descriptor.
#[repr(C)]
#[derive(Clone, Copy)]
struct RawGate {
    offset_low: u16,
    selector: u16,
    ist: u8,
    type_attr: u8,
    offset_mid: u16,
    offset_high: u32,
    reserved: u32,
}

impl RawGate {
    const fn missing() -> Self {
        RawGate {
            offset_low: 0,
            selector: 0,
            ist: 0,
            type_attr: 0,
            offset_mid: 0,
            offset_high: 0,
            reserved: 0,
        }
    }

    fn pointing_at(handler: usize) -> Self {
        RawGate {
            offset_low: handler as u16,
            selector: KERNEL_CODE_SELECTOR,
            ist: 0,
            type_attr: PRESENT | INTERRUPT_GATE_TYPE,
            offset_mid: (handler >> 16) as u16,
            offset_high: (handler >> 32) as u32,
            reserved: 0,
        }
    }
}

/// A 256-entry Interrupt Descriptor Table, one gate per vector in
/// [`interrupt_vector_table`](super::interrupt_vector_table).
#[repr(C, align(16))]
pub struct RawIdt([RawGate; INTERRUPT_VECTOR_COUNT]);

static_assertions::const_assert_eq!(core::mem::size_of::<RawIdt>(), 256 * 16);

impl RawIdt {
    /// Builds a table whose every gate points at the matching stub in
    /// [`interrupt_vector_table`](super::interrupt_vector_table).
    ///
    /// # Safety
    ///
    /// `interrupt_vector_table` must already be populated, which it always is: it is filled in
    /// at assembly time, not at runtime.
    pub fn pointing_at_vector_table() -> Self {
        let mut gates = [RawGate::missing(); INTERRUPT_VECTOR_COUNT];
        for (vector, gate) in gates.iter_mut().enumerate() {
            let handler = unsafe { interrupt_vector_table[vector] };
            *gate = RawGate::pointing_at(handler);
        }
        RawIdt(gates)
    }

    /// Loads this table via `lidt`.
    ///
    /// # Safety
    ///
    /// `self` must outlive every future interrupt, which in practice means it must be a `static`
    /// or otherwise never moved or dropped for the remaining lifetime of the kernel.
    pub unsafe fn load(&'static self) {
        let pointer = x86_64::structures::DescriptorTablePointer {
            limit: (core::mem::size_of::<Self>() - 1) as u16,
            base: x86_64::VirtAddr::new(self as *const Self as u64),
        };
        x86_64::instructions::tables::lidt(&pointer);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn missing_gate_is_not_present() {
        let gate = RawGate::missing();
        assert_eq!(gate.type_attr & PRESENT, 0);
    }

    #[test]
    fn gate_splits_a_64_bit_handler_address_across_three_fields() {
        let handler: usize = 0xFFFF_FFFF_8012_3456;
        let gate = RawGate::pointing_at(handler);
        assert_eq!(gate.offset_low, 0x3456);
        assert_eq!(gate.offset_mid, 0x8012);
        assert_eq!(gate.offset_high, 0xFFFF_FFFF);
        assert_eq!(gate.selector, KERNEL_CODE_SELECTOR);
        assert_ne!(gate.type_attr & PRESENT, 0);
        assert_eq!(gate.type_attr & 0xf, INTERRUPT_GATE_TYPE);
    }

    #[test]
    fn table_is_exactly_4096_bytes() {
        assert_eq!(core::mem::size_of::<RawIdt>(), 4096);
    }
}
