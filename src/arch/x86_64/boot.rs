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

//! This file contains the entry point of our kernel.
//!
//! Once the bootloader finishes loading the kernel (as an ELF file), it will run its entry
//! point, which is the `entry` function defined in this file.
//!
//! Since we are conforming to the multiboot2 specification, the bootloader is expected to leave
//! the magic value `0x36d76289` in `eax` and the physical address of a boot-information
//! structure in `ebx`.
//!
//! The environment we start in is 32-bit protected mode with paging disabled. The role of
//! `entry` below is to validate that handoff, build just enough of a page-table hierarchy and
//! GDT to reach 64-bit long mode, set up a stack, and tail-call the externally defined
//! `kernel_main` with the high-half virtual address of the boot-information structure.

use core::arch::naked_asm;

use super::config::{HIGH_HALF_BASE, KERNEL_CODE_SELECTOR, PDT_ENTRY_COUNT};
use super::failure::MULTIBOOT2_MAGIC;

extern "C" {
    /// Start of the four reserved 4 KiB frames: PML4, PDPT-A, PDPT-B, shared PDT (in that
    /// order). Defined by the linker script.
    static boot_page_tables: u8;

    /// One-past-the-end of the boot stack. Defined by the linker script; the stack grows down
    /// from here.
    static stack_end: u8;

    /// Entry point of the higher-level kernel. Never returns.
    fn kernel_main(multiboot_info_vaddr: u64) -> !;
}

/// Scratch storage for the boot-information pointer while the feature checks below clobber
/// `ebx` via `cpuid`.
///
/// Must live in `.boot32.data`, not the ordinary high-half `.bss`: the 32-bit trampoline
/// addresses it directly with a 32-bit `mov`, which cannot encode a high-half link address.
#[link_section = ".boot32.data"]
static mut MULTIBOOT_INFO_PTR: u32 = 0;

/// Entry point of the kernel.
///
/// Do **not** call manually.
#[naked]
#[no_mangle]
#[link_section = ".boot32.text"]
unsafe extern "C" fn entry() {
    naked_asm!(r#"
    .code32
        // Disabling interrupts as long as we are not ready to accept them. This is normally
        // already done by the bootloader, but it costs nothing to do it here again just in case.
        cli

        // Check that we have been loaded by a multiboot2 bootloader.
        cmp ${multiboot2_magic}, %eax
        jne 90f

        // Stash the boot-information pointer; the feature checks below clobber ebx via cpuid.
        mov %ebx, {multiboot_info_ptr}

        // Check that our CPU supports extended CPUID instructions.
        mov $0x80000000, %eax
        cpuid
        cmp $0x80000001, %eax
        jb 91f

        // Check that our CPU supports the features that we need.
        mov $0x80000001, %eax
        cpuid
        test $(1 << 29), %edx     // Long mode.
        jz 91f
        test $(1 << 6), %edx      // Physical address extension.
        jz 91f

        // Everything is good. CPU is compatible.
        //
        // Build the four-frame page-table hierarchy, starting at `boot_page_tables`:
        //   +0x0000  PML4
        //   +0x1000  PDPT-A (identity)
        //   +0x2000  PDPT-B (high-half)
        //   +0x3000  shared PDT (64 x 2MiB huge pages, covering the low 128MiB)

        // PML4[0] -> PDPT-A.
        mov ${boot_page_tables}, %eax
        add $0x1000, %eax
        or $(1 << 0), %eax     // Present bit. Indicates that the entry is valid.
        or $(1 << 1), %eax     // Read/write bit. Indicates that the entry is writable.
        mov %eax, {boot_page_tables}

        // PML4[511] -> PDPT-B.
        mov ${boot_page_tables}, %eax
        add $0x2000, %eax
        or $(1 << 0), %eax
        or $(1 << 1), %eax
        mov %eax, {boot_page_tables}+511*8

        // PDPT-A[0] -> the shared PDT.
        mov ${boot_page_tables}, %eax
        add $0x3000, %eax
        or $(1 << 0), %eax
        or $(1 << 1), %eax
        mov %eax, {boot_page_tables}+0x1000

        // PDPT-B[510] -> the same shared PDT.
        mov %eax, {boot_page_tables}+0x2000+510*8

        // Shared PDT: descending 2MiB huge-page entries covering [0, 128MiB).
        mov $0, %ecx
    1:  mov %ecx, %eax
        shl $21, %eax                     // EAX <- ECX * 2MiB
        or $(1 << 0), %eax                // Present bit. Indicates that the entry is valid.
        or $(1 << 1), %eax                // Read/write bit. Indicates that the entry is writable.
        or $(1 << 7), %eax                // Indicates a 2MiB page.
        mov %eax, {boot_page_tables}+0x3000(, %ecx, 8)
        inc %ecx
        cmp ${pdt_entry_count}, %ecx
        jne 1b

        // Activation sequence. Order matters: CR3, then CR4.PAE, then EFER.LME, then CR0.PG.
        mov ${boot_page_tables}, %eax
        mov %eax, %cr3

        mov %cr4, %eax
        or $(1 << 5), %eax                // Physical address extension (PAE) bit.
        mov %eax, %cr4

        // Set long mode with the EFER bit.
        mov $0xc0000080, %ecx
        rdmsr
        or $(1 << 8), %eax
        wrmsr

        mov %cr0, %eax
        or $(1 << 31), %eax               // Paging bit.
        mov %eax, %cr0

        // Set up the GDT. It becomes active only after the `ljmp` below.
        lgdtl {gdt_ptr}

        ljmp ${code_selector}, $4f

    .code64
    4:
        // Set up the stack. Subtracting 8 leaves RSP as if a `call` had just pushed a return
        // address, so the System V 16-byte stack alignment `kernel_main`'s prologue expects
        // holds even though we arrive via `jmp` rather than `call`.
        movq ${stack_end}, %rsp
        subq $8, %rsp

        movw $0, %ax
        movw %ax, %ds
        movw %ax, %es
        movw %ax, %fs
        movw %ax, %gs
        movw %ax, %ss

        // Recover the boot-information pointer and convert it to its high-half alias.
        mov {multiboot_info_ptr}, %edi
        movabs ${high_half_base}, %rax
        add %rax, %rdi

        // Tail-call into the higher-level kernel. An absolute indirect jump is used (rather than
        // a relative one) because the distance between this low trampoline and the high-half
        // kernel image can exceed what a relative jump can encode.
        movabs ${kernel_main}, %rax
        jmp *%rax

    .code32
    // Reached when the bootloader handoff does not conform to multiboot2.
    90:
        mov $93f, %esi
        jmp 92f

    // Reached when the CPU lacks PAE or long-mode support.
    91:
        mov $94f, %esi

    92:
        mov $0xb8000, %edi
    95:
        movb (%esi), %al
        test %al, %al
        je 96f
        movb %al, (%edi)
        movb $0x0c, 1(%edi)        // Red on black.
        inc %esi
        add $2, %edi
        jmp 95b
    96:
        cli
        hlt
        jmp 96b

    93: .asciz "[ERROR] Not a valid multiboot result"
    94: .asciz "[ERROR] Not a 64-bit CPU"
    "#,
        multiboot2_magic = const MULTIBOOT2_MAGIC,
        multiboot_info_ptr = sym MULTIBOOT_INFO_PTR,
        boot_page_tables = sym boot_page_tables,
        pdt_entry_count = const PDT_ENTRY_COUNT,
        gdt_ptr = sym super::gdt::GDT_POINTER,
        code_selector = const KERNEL_CODE_SELECTOR,
        stack_end = sym stack_end,
        high_half_base = const HIGH_HALF_BASE,
        kernel_main = sym kernel_main,
        options(att_syntax));
}
