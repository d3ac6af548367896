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

//! The panic handler.
//!
//! Writes directly to a fresh [`klog::vga::Printer`] rather than going through [`klog::init`]'s
//! installed logger: a panic can happen while that logger's spinlock is already held, and taking
//! it again here would deadlock instead of reporting anything.

use core::fmt::Write as _;

use crate::klog::vga::Printer;

const VGA_BUFFER_ADDR: *mut u16 = 0xb8000 as *mut u16;

#[panic_handler]
fn panic(panic_info: &core::panic::PanicInfo) -> ! {
    let mut printer = unsafe { Printer::new(VGA_BUFFER_ADDR) };
    printer.set_attribute(0x4f); // White on red.
    let _ = writeln!(printer, "Kernel panic!");
    let _ = writeln!(printer, "{panic_info}");

    loop {
        x86_64::instructions::interrupts::disable();
        x86_64::instructions::hlt();
    }
}
