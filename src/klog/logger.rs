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

use core::fmt::Write as _;

use log::{Level, Metadata, Record};
use spinning_top::Spinlock;

use super::vga;

/// The VGA text buffer's physical address. Valid to dereference only once the boot trampoline's
/// identity mapping (or its high-half alias) is active.
const VGA_BUFFER_ADDR: *mut u16 = 0xb8000 as *mut u16;

/// Binds a [`vga::Printer`] to the `log` crate's facade.
///
/// Only meaningful after the boot trampoline hands off to `kernel_main`: there is no paging, no
/// stack discipline suitable for a lock, and no `log` facade installed before that point, which
/// is why the trampoline's own error path (see `arch::x86_64::boot`) writes to the VGA buffer
/// directly instead of going through this logger.
pub struct KLogger {
    printer: Spinlock<vga::Printer>,
}

impl KLogger {
    /// # Safety
    ///
    /// Must only be constructed once; see [`vga::Printer::new`].
    const unsafe fn new() -> Self {
        KLogger {
            printer: Spinlock::new(vga::Printer::new(VGA_BUFFER_ADDR)),
        }
    }
}

impl log::Log for KLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut printer = self.printer.lock();
        let _ = writeln!(printer, "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: KLogger = unsafe { KLogger::new() };

/// Installs [`KLogger`] as the global logger for the `log` facade.
///
/// Must be called exactly once, early in `kernel_main`, before any code uses the `log::*!`
/// macros.
pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(log::LevelFilter::Trace))
        .expect("klog::init called more than once");
}

/// Severity levels the logger accepts, re-exported so callers don't need a direct `log`
/// dependency just to pick a level.
pub use log::LevelFilter;
pub type LogLevel = Level;
