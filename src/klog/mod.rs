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

//! Diagnostics: a VGA-backed `log` facade, plus a raw serial port for output that doesn't
//! depend on the VGA buffer being mapped where the logger expects it.
//!
//! Only meaningful after the boot trampoline hands off to `kernel_main`; see [`logger`].

mod logger;

pub mod serial;
pub mod vga;

pub use logger::{init, LevelFilter, LogLevel};
