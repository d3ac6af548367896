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

//! The minimal "higher-level kernel" that exercises `ignition_kernel`'s boot core: just enough
//! to prove the trampoline reaches long mode and the interrupt shim round-trips a register
//! snapshot. A real kernel built on this crate would replace this file entirely; it is not part
//! of the reusable library (see `src/lib.rs`).
#![no_std]
#![no_main]

use ignition_kernel::arch::x86_64::idt::RawIdt;
use ignition_kernel::arch::x86_64::InterruptFrame;
use ignition_kernel::klog;
use lazy_static::lazy_static;
use log::{error, info, warn};

lazy_static! {
    static ref IDT: RawIdt = RawIdt::pointing_at_vector_table();
}

/// Entry point tail-called by the boot trampoline (`ignition_kernel::arch::x86_64`'s `entry`).
///
/// # Safety
///
/// Called exactly once, by the trampoline, with `multiboot_info_vaddr` pointing at the
/// high-half alias of the Multiboot2 boot-information structure. Never returns.
#[no_mangle]
extern "C" fn kernel_main(multiboot_info_vaddr: u64) -> ! {
    klog::init();
    info!("ignition: boot trampoline complete");
    info!("ignition: multiboot info at {:#x}", multiboot_info_vaddr);

    match unsafe { multiboot2::BootInformation::load(multiboot_info_vaddr as *const u8) } {
        Ok(boot_info) => {
            if let Some(areas) = boot_info.memory_map_tag() {
                for area in areas.memory_areas() {
                    info!(
                        "ignition: memory area {:#x}..{:#x}",
                        area.start_address(),
                        area.end_address()
                    );
                }
            }
        }
        Err(err) => warn!("ignition: could not parse multiboot info: {err:?}"),
    }

    unsafe {
        IDT.load();
        x86_64::instructions::interrupts::enable();
    }
    info!("ignition: interrupts enabled");

    loop {
        x86_64::instructions::hlt();
    }
}

/// Called by the interrupt shim (`ignition_kernel::arch::x86_64::interrupts`) on every vector,
/// with `frame` pointing at the full register snapshot described by `InterruptFrame`.
///
/// # Safety
///
/// Called only from the shared interrupt trampoline, with `frame` pointing at a live stack
/// frame for the duration of the call.
#[no_mangle]
unsafe extern "C" fn rust_interrupt_handler_for_all_state(frame: *mut InterruptFrame) {
    let frame = &mut *frame;

    match frame.vector_number {
        // Breakpoint: harmless, resume.
        3 => info!("ignition: breakpoint at rip={:#x}", frame.rip),
        // Page fault: CR2 holds the faulting address and is not part of the frame (§9).
        14 => {
            let fault_addr = x86_64::registers::control::Cr2::read();
            error!(
                "ignition: page fault at {:?}, error_code={:#x}, rip={:#x}",
                fault_addr, frame.error_code, frame.rip
            );
            halt_forever();
        }
        // Double fault and machine check are not recoverable with this minimal handler.
        8 | 18 => {
            error!("ignition: fatal exception {}", frame.vector_number);
            halt_forever();
        }
        vector if vector < 32 => {
            error!(
                "ignition: unhandled exception {vector}, error_code={:#x}, rip={:#x}",
                frame.error_code, frame.rip
            );
            halt_forever();
        }
        vector => info!("ignition: interrupt {vector}"),
    }
}

fn halt_forever() -> ! {
    loop {
        x86_64::instructions::interrupts::disable();
        x86_64::instructions::hlt();
    }
}
