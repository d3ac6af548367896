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

//! A freestanding binary that links against `ignition_kernel` and exercises the CPU-state
//! invariants and interrupt-dispatch scenarios documented for the boot core, reporting the
//! result over the serial port and through the `isa-debug-exit` QEMU device rather than
//! depending on any display output.
//!
//! Run under QEMU with `-device isa-debug-exit,iobase=0xf4,iosize=0x04 -serial stdio`; the
//! process's exit code distinguishes pass (`(0x10 << 1) | 1`) from fail (`(0x11 << 1) | 1`), the
//! convention `cargo-bootimage`-style freestanding test binaries use.
#![no_std]
#![no_main]

use core::fmt::Write as _;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ignition_kernel::arch::x86_64::idt::RawIdt;
use ignition_kernel::arch::x86_64::InterruptFrame;
use ignition_kernel::klog::serial::SerialPort;
use lazy_static::lazy_static;
use spinning_top::Spinlock;
use x86_64::instructions::port::Port;
use x86_64::registers::control::{Cr0, Cr0Flags, Cr2, Cr3, Cr4, Cr4Flags};
use x86_64::registers::model_specific::{Efer, EferFlags};

lazy_static! {
    static ref IDT: RawIdt = RawIdt::pointing_at_vector_table();
}

static SERIAL: Spinlock<Option<SerialPort>> = Spinlock::new(None);

/// Vector used for the software-interrupt round-trip scenario (§8 scenario 4). Chosen from the
/// user-defined range so it carries no CPU-supplied error code.
const TEST_VECTOR: u8 = 0x30;

/// A canonical but never-mapped address: within the positive half of the address space, but far
/// past the 128 MiB the boot trampoline identity-maps, so every paging level above the PML4
/// walks into a not-present entry and raises #PF (§8 scenario 5).
const UNMAPPED_ADDR: u64 = 0x0000_1000_0000_0000;

/// Whether every check run from `kernel_main` before the deliberate page fault passed. The #PF
/// handler never returns to `kernel_main`, so it folds this into its own verdict before exiting.
static EARLIER_CHECKS_PASSED: AtomicBool = AtomicBool::new(true);

static OBSERVED_VECTOR: AtomicU64 = AtomicU64::new(u64::MAX);
static OBSERVED_ERROR_CODE: AtomicU64 = AtomicU64::new(u64::MAX);
static OBSERVED_RAX: AtomicU64 = AtomicU64::new(0);

/// Sentinel the handler writes into the frame's RAX on [`TEST_VECTOR`], to confirm the
/// interrupted context resumes with a handler-written register value (§8 scenario 6).
const RAX_SENTINEL: u64 = 0x00c0_ffee_1234_5678;

macro_rules! serial_println {
    ($($arg:tt)*) => {{
        if let Some(port) = SERIAL.lock().as_mut() {
            let _ = writeln!(port, $($arg)*);
        }
    }};
}

#[no_mangle]
extern "C" fn kernel_main(multiboot_info_vaddr: u64) -> ! {
    *SERIAL.lock() = Some(unsafe {
        let mut port = SerialPort::new();
        port.init();
        port
    });
    serial_println!("ignition-selftest: starting");
    serial_println!("ignition-selftest: multiboot info at {:#x}", multiboot_info_vaddr);

    let mut all_passed = true;
    all_passed &= check("CR0.PG set", Cr0::read().contains(Cr0Flags::PAGING));
    all_passed &= check(
        "CR4.PAE set",
        Cr4::read().contains(Cr4Flags::PHYSICAL_ADDRESS_EXTENSION),
    );
    all_passed &= check(
        "EFER.LME set",
        Efer::read().contains(EferFlags::LONG_MODE_ENABLE),
    );

    let (cr3_frame, _) = Cr3::read();
    all_passed &= check(
        "CR3 points at a 4 KiB aligned frame",
        cr3_frame.start_address().is_aligned(4096u64),
    );

    all_passed &= check("high-half alias mirrors identity mapping", unsafe {
        let identity = 0x0 as *const u8;
        let high_half = 0xFFFF_FFFF_8000_0000u64 as *const u8;
        // Compare a handful of bytes rather than the full 128 MiB region.
        (0..64).all(|i| identity.add(i).read_volatile() == high_half.add(i).read_volatile())
    });

    all_passed &= check(
        "every interrupt_vector_table entry is 16-byte aligned",
        (0..256).all(|vector| {
            let addr = unsafe { ignition_kernel::arch::x86_64::interrupt_vector_table[vector] };
            addr % 16 == 0
        }),
    );

    unsafe {
        IDT.load();
    }
    serial_println!("ignition-selftest: IDT loaded");

    unsafe {
        core::arch::asm!(
            "mov rax, {sentinel}",
            "int 0x30",
            "mov {rax_after}, rax",
            sentinel = in(reg) RAX_SENTINEL,
            rax_after = out(reg) _,
            options(nostack),
        );
    }

    all_passed &= check(
        "software interrupt reports the triggering vector",
        OBSERVED_VECTOR.load(Ordering::SeqCst) == TEST_VECTOR as u64,
    );
    all_passed &= check(
        "software interrupt carries a synthetic zero error code",
        OBSERVED_ERROR_CODE.load(Ordering::SeqCst) == 0,
    );
    all_passed &= check(
        "handler-written RAX survives the round trip",
        OBSERVED_RAX.load(Ordering::SeqCst) == RAX_SENTINEL,
    );

    EARLIER_CHECKS_PASSED.store(all_passed, Ordering::SeqCst);

    serial_println!("ignition-selftest: triggering deliberate page fault");
    unsafe {
        core::ptr::read_volatile(UNMAPPED_ADDR as *const u8);
    }

    // The #PF handler below never returns; if we get here, the fault wasn't delivered.
    finish(false);
}

#[no_mangle]
unsafe extern "C" fn rust_interrupt_handler_for_all_state(frame: *mut InterruptFrame) {
    let frame = &mut *frame;

    match frame.vector_number as u8 {
        TEST_VECTOR => {
            OBSERVED_VECTOR.store(frame.vector_number, Ordering::SeqCst);
            OBSERVED_ERROR_CODE.store(frame.error_code, Ordering::SeqCst);
            frame.rax = RAX_SENTINEL;
            OBSERVED_RAX.store(frame.rax, Ordering::SeqCst);
        }
        14 => {
            let fault_addr = Cr2::read();
            let addr_ok = matches!(fault_addr, Ok(addr) if addr.as_u64() == UNMAPPED_ADDR);
            let vector_ok = frame.vector_number == 14;
            serial_println!(
                "ignition-selftest: #PF observed vector={} error_code={:#x} cr2={:?}",
                frame.vector_number, frame.error_code, fault_addr
            );
            finish(addr_ok && vector_ok && EARLIER_CHECKS_PASSED.load(Ordering::SeqCst));
        }
        _ => serial_println!("ignition-selftest: unexpected vector {}", frame.vector_number),
    }
}

fn check(name: &str, passed: bool) -> bool {
    serial_println!("ignition-selftest: [{}] {}", if passed { "PASS" } else { "FAIL" }, name);
    passed
}

#[repr(u32)]
enum QemuExitCode {
    Success = 0x10,
    Failed = 0x11,
}

fn finish(passed: bool) -> ! {
    let code = if passed {
        serial_println!("ignition-selftest: ALL CHECKS PASSED");
        QemuExitCode::Success
    } else {
        serial_println!("ignition-selftest: AT LEAST ONE CHECK FAILED");
        QemuExitCode::Failed
    };

    unsafe {
        let mut port: Port<u32> = Port::new(0xf4);
        port.write(code as u32);
    }

    // isa-debug-exit should have already terminated QEMU; halt in case it didn't.
    loop {
        x86_64::instructions::interrupts::disable();
        x86_64::instructions::hlt();
    }
}
