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

//! The multiboot2 header the bootloader scans for within the first 8 KiB of the image.
//!
//! The header itself has to live in its own linker section and its `length`/`checksum` fields
//! are differences between link-time symbols, which only the assembler and linker (not `const
//! fn` Rust) can resolve. [`checksum_for`] duplicates the arithmetic as a plain function so the
//! formula can be reviewed and tested without reading assembly.

core::arch::global_asm!(
    r#"
    .section .multiboot_header, "a"
    .align 8
multiboot_header_start:
    .long 0xe85250d6            // Magic number.
    .long 0                     // Architecture: i386.
    .long multiboot_header_end - multiboot_header_start
    .long -(0xe85250d6 + 0 + (multiboot_header_end - multiboot_header_start))

    // Information-request tag: ask the loader to guarantee a memory-map tag in the boot
    // information it hands back (kernel_main reads it via `memory_map_tag()`).
    .align 8
    .word 1                     // Type: information request.
    .word 0                     // Flags.
    .long info_request_tag_end - info_request_tag_start
info_request_tag_start:
    .long 6                     // Requested tag type: memory map.
info_request_tag_end:

    // Address tag: where the loaded image's sections sit and where the loader should place bss.
    .align 8
    .word 2                     // Type: address.
    .word 0                     // Flags.
    .long address_tag_end - address_tag_start
address_tag_start:
    .long multiboot_header_start
    .long multiboot_load_addr
    .long multiboot_load_end
    .long multiboot_bss_end
address_tag_end:

    // Entry-address tag.
    .align 8
    .word 3                     // Type: entry address.
    .word 0
    .long entry_tag_end - entry_tag_start
entry_tag_start:
    .long multiboot_entry_addr
entry_tag_end:

    // Module-alignment tag: ask the loader to page-align any modules it places in memory.
    .align 8
    .word 6
    .word 0
    .long 8

    // End tag.
    .align 8
    .word 0
    .word 0
    .long 8
multiboot_header_end:
    "#
);

/// Computes what the multiboot2 header checksum should evaluate to for a given
/// magic/architecture/length triple.
///
/// Mirrors the `-(magic + architecture + length)` arithmetic the assembler performs at link
/// time; kept here so the formula is reviewable and testable without reading the section above.
pub const fn checksum_for(magic: u32, architecture: u32, length: u32) -> u32 {
    0u32.wrapping_sub(magic.wrapping_add(architecture).wrapping_add(length))
}

/// Confirms that `magic + architecture + length + checksum` wraps to zero, the invariant every
/// multiboot2-compliant loader verifies before trusting the header.
pub const fn checksum_is_valid(magic: u32, architecture: u32, length: u32, checksum: u32) -> bool {
    magic
        .wrapping_add(architecture)
        .wrapping_add(length)
        .wrapping_add(checksum)
        == 0
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn checksum_makes_the_header_sum_to_zero() {
        let magic = 0xe852_50d6u32;
        let architecture = 0u32;
        let length = 32u32;
        let checksum = checksum_for(magic, architecture, length);
        assert!(checksum_is_valid(magic, architecture, length, checksum));
    }

    #[test]
    fn checksum_rejects_a_tampered_header() {
        let magic = 0xe852_50d6u32;
        let architecture = 0u32;
        let length = 32u32;
        let checksum = checksum_for(magic, architecture, length);
        assert!(!checksum_is_valid(magic, architecture, length + 4, checksum));
    }
}
