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

//! Bit layout of the four-frame boot page-table hierarchy.
//!
//! The trampoline in [`super::boot`] builds the live tables directly in assembly, since no
//! allocator or stack exists yet when they're populated. The entry-encoding arithmetic is
//! duplicated here as plain `const fn`s so it can be reviewed and unit-tested independently of
//! the assembly that mirrors it.

use super::config::PAGE_SIZE;

const PRESENT: u64 = 1 << 0;
const WRITABLE: u64 = 1 << 1;
const HUGE_PAGE: u64 = 1 << 7;

/// Encodes a PML4 or PDPT entry pointing at the next table in the hierarchy.
///
/// `table_phys_addr` must be 4 KiB aligned; the low 12 bits of the frame address are reused for
/// flags, matching the hardware layout, so misaligned input would corrupt the flag bits.
pub const fn table_entry(table_phys_addr: u64) -> u64 {
    debug_assert!(table_phys_addr & (PAGE_SIZE as u64 - 1) == 0);
    (table_phys_addr & !(PAGE_SIZE as u64 - 1)) | PRESENT | WRITABLE
}

/// Encodes a 2 MiB page-directory entry mapping physical address `phys_addr`.
///
/// `phys_addr` must be 2 MiB aligned.
pub const fn huge_page_entry(phys_addr: u64) -> u64 {
    const HUGE_PAGE_ALIGN: u64 = 2 * 1024 * 1024;
    debug_assert!(phys_addr & (HUGE_PAGE_ALIGN - 1) == 0);
    (phys_addr & !(HUGE_PAGE_ALIGN - 1)) | PRESENT | WRITABLE | HUGE_PAGE
}

/// Computes the `N`-th shared page-directory entry, mapping the 2 MiB window
/// `[n * 2MiB, (n + 1) * 2MiB)` of the low identity-mapped range.
pub const fn identity_pdt_entry(n: usize) -> u64 {
    huge_page_entry((n as u64) * 2 * 1024 * 1024)
}

/// Index of the PML4 entry used for the low identity mapping.
pub const PML4_IDENTITY_INDEX: usize = 0;

/// Index of the PML4 entry used for the high-half alias.
pub const PML4_HIGH_HALF_INDEX: usize = 511;

/// Index of the PDPT-A entry that points at the shared page directory.
pub const PDPT_A_INDEX: usize = 0;

/// Index of the PDPT-B entry that points at the same shared page directory.
pub const PDPT_B_INDEX: usize = 510;

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn table_entry_sets_present_and_writable() {
        let entry = table_entry(0x1000);
        assert_eq!(entry & 0x1, 0x1);
        assert_eq!(entry & 0x2, 0x2);
        assert_eq!(entry & !0xFFF, 0x1000);
    }

    #[test]
    fn huge_page_entry_sets_present_writable_and_huge_bit() {
        let entry = huge_page_entry(2 * 1024 * 1024);
        assert_eq!(entry & 0x1, 0x1);
        assert_eq!(entry & 0x2, 0x2);
        assert_eq!(entry & (1 << 7), 1 << 7);
        assert_eq!(entry & !0x1F_FFFF, 2 * 1024 * 1024);
    }

    #[test]
    fn identity_pdt_entries_cover_contiguous_2mib_windows() {
        for n in 0..super::super::config::PDT_ENTRY_COUNT {
            let entry = identity_pdt_entry(n);
            let phys = entry & !0x1F_FFFF;
            assert_eq!(phys, (n as u64) * 2 * 1024 * 1024);
        }
    }

    #[test]
    fn identity_map_covers_128_mib() {
        let last = identity_pdt_entry(super::super::config::PDT_ENTRY_COUNT - 1);
        let phys = last & !0x1F_FFFF;
        assert_eq!(phys + 2 * 1024 * 1024, 128 * 1024 * 1024);
    }

    #[test]
    fn pml4_indices_match_identity_and_high_half_layout() {
        assert_eq!(PML4_IDENTITY_INDEX, 0);
        assert_eq!(PML4_HIGH_HALF_INDEX, 511);
    }
}
