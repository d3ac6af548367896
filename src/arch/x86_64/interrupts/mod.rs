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

//! The interrupt dispatch shim: a 256-entry vector table of raw asm stubs plus the shared
//! save/restore trampoline they all jump into.
//!
//! This deliberately does not use `x86_64::structures::idt::InterruptDescriptorTable` with
//! `extern "x86-interrupt" fn` handlers: that ABI only exposes the hardware-pushed frame, not
//! the full general-purpose/debug/segment register snapshot [`InterruptFrame`] guarantees. The
//! higher-level kernel is still expected to build its IDT (and load it) out of the addresses
//! published here; loading the IDT itself is this crate's caller's responsibility.

mod stubs;

use super::config::INTERRUPT_VECTOR_COUNT;

extern "C" {
    /// 256 read-only function pointers, index = vector number, populated by [`stubs`].
    ///
    /// The higher-level kernel copies each entry into the offset fields of the matching IDT gate
    /// descriptor.
    pub static interrupt_vector_table: [usize; INTERRUPT_VECTOR_COUNT];
}

/// Vectors for which the CPU itself pushes an error code onto the stack before entering the
/// handler. Every other vector gets a synthetic `0` pushed by its stub so the frame layout is
/// uniform regardless of vector.
const HARDWARE_ERROR_CODE_VECTORS: [u8; 7] = [8, 10, 11, 12, 13, 14, 17];

/// Whether vector `n` is one the CPU supplies a real error code for.
pub const fn pushes_error_code(n: u8) -> bool {
    let mut i = 0;
    while i < HARDWARE_ERROR_CODE_VECTORS.len() {
        if HARDWARE_ERROR_CODE_VECTORS[i] == n {
            return true;
        }
        i += 1;
    }
    false
}

/// The full CPU-state snapshot handed to `rust_interrupt_handler_for_all_state` on every
/// interrupt and exception, laid out exactly as the shared trampoline in [`stubs`] builds it on
/// the stack (lowest address first).
///
/// Field order here is load-bearing: it must match the assembly's push/pop sequence byte for
/// byte, which the `const_assert_eq!` block below pins down.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct InterruptFrame {
    pub ds: u64,
    pub es: u64,
    pub fs: u64,
    pub gs: u64,
    pub dr0: u64,
    pub dr1: u64,
    pub dr2: u64,
    pub dr3: u64,
    pub dr6: u64,
    pub dr7: u64,
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub vector_number: u64,
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

static_assertions::const_assert_eq!(core::mem::size_of::<InterruptFrame>(), 32 * 8);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, ds), 0);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, dr0), 4 * 8);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, rax), 10 * 8);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, vector_number), 25 * 8);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, error_code), 26 * 8);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, rip), 27 * 8);
static_assertions::const_assert_eq!(core::mem::offset_of!(InterruptFrame, ss), 31 * 8);

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn fault_vectors_carry_a_real_error_code() {
        for &v in &HARDWARE_ERROR_CODE_VECTORS {
            assert!(pushes_error_code(v), "vector {v} should push a real error code");
        }
    }

    #[test]
    fn ordinary_vectors_do_not_carry_an_error_code() {
        for v in 0u16..256 {
            let v = v as u8;
            if HARDWARE_ERROR_CODE_VECTORS.contains(&v) {
                continue;
            }
            assert!(!pushes_error_code(v), "vector {v} should not push an error code");
        }
    }

    #[test]
    fn frame_is_32_registers_wide() {
        assert_eq!(core::mem::size_of::<InterruptFrame>(), 32 * 8);
    }
}
