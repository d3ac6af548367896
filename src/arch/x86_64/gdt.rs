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

//! The minimal GDT the trampoline loads before far-jumping into 64-bit code: a null descriptor,
//! a 64-bit code segment at selector [`super::config::KERNEL_CODE_SELECTOR`], and a data segment
//! at selector [`super::config::KERNEL_DATA_SELECTOR`].

const PRESENT: u64 = 1 << 47;
const DESCRIPTOR_TYPE: u64 = 1 << 44; // S bit: 1 for code/data, 0 for system descriptors.
const EXECUTABLE: u64 = 1 << 43;
const LONG_MODE: u64 = 1 << 53;
const WRITABLE: u64 = 1 << 41;

const NULL_DESCRIPTOR: u64 = 0;
const CODE_DESCRIPTOR: u64 = PRESENT | DESCRIPTOR_TYPE | EXECUTABLE | LONG_MODE;
const DATA_DESCRIPTOR: u64 = PRESENT | DESCRIPTOR_TYPE | WRITABLE;

// Both statics below must live in `.boot32.data`, not the ordinary high-half `.rodata`/`.data`:
// the 32-bit trampoline's `lgdtl` reaches `GDT_POINTER` with a 32-bit address, which cannot
// encode a high-half link address, and the GDTR's own `pointer` field must likewise hold
// `GDT_TABLE`'s low physical/link address for the same reason.

#[link_section = ".boot32.data"]
pub(crate) static GDT_TABLE: GdtTable =
    GdtTable([NULL_DESCRIPTOR, CODE_DESCRIPTOR, DATA_DESCRIPTOR]);

pub(crate) struct GdtTable([u64; 3]);

#[repr(align(8))]
pub(crate) struct GdtPtr(GdtPtrIn);

#[repr(packed)]
struct GdtPtrIn {
    size: u16,
    pointer: *const GdtTable,
}

unsafe impl Send for GdtPtr {}
unsafe impl Sync for GdtPtr {}

#[link_section = ".boot32.data"]
pub(crate) static GDT_POINTER: GdtPtr = GdtPtr(GdtPtrIn {
    size: (3 * core::mem::size_of::<u64>() - 1) as u16,
    pointer: &GDT_TABLE,
});

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn code_descriptor_is_present_code_and_long_mode() {
        assert_ne!(CODE_DESCRIPTOR & PRESENT, 0);
        assert_ne!(CODE_DESCRIPTOR & DESCRIPTOR_TYPE, 0);
        assert_ne!(CODE_DESCRIPTOR & EXECUTABLE, 0);
        assert_ne!(CODE_DESCRIPTOR & LONG_MODE, 0);
    }

    #[test]
    fn data_descriptor_is_present_and_not_executable() {
        assert_ne!(DATA_DESCRIPTOR & PRESENT, 0);
        assert_ne!(DATA_DESCRIPTOR & DESCRIPTOR_TYPE, 0);
        assert_eq!(DATA_DESCRIPTOR & EXECUTABLE, 0);
    }

    #[test]
    fn table_has_three_entries() {
        assert_eq!(GDT_TABLE.0.len(), 3);
    }
}
