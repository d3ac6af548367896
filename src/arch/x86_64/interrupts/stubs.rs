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

//! The 256 per-vector stubs and the shared save/restore trampoline, generated once at assembly
//! time rather than hand-written 256 times over.
//!
//! `isr_stub` normalizes the stack so that, regardless of whether the CPU supplied a real error
//! code, every vector ends up calling `interrupt_vector_global` with the same two extra
//! quadwords (error code, then vector number) sitting beneath the hardware frame.

core::arch::global_asm!(
    r#"
    .altmacro

    .macro isr_stub vec
    .align 16
    .globl interrupt_vector_\vec
interrupt_vector_\vec:
    .if (\vec == 8) || (\vec == 10) || (\vec == 11) || (\vec == 12) || (\vec == 13) || (\vec == 14) || (\vec == 17)
        // The CPU already pushed a real error code for this vector.
    .else
        pushq $0
    .endif
        pushq $\vec
        jmp interrupt_vector_global
    .endm

    .set current_vector, 0
    .rept 256
        isr_stub %current_vector
        .set current_vector, current_vector + 1
    .endr

    .macro emit_vector_pointer vec
        .quad interrupt_vector_\vec
    .endm

    .section .interrupt_vector_table, "a"
    .align 8
    .globl interrupt_vector_table
interrupt_vector_table:
    .set current_vector, 0
    .rept 256
        emit_vector_pointer %current_vector
        .set current_vector, current_vector + 1
    .endr

    .text
    .align 16
interrupt_vector_global:
    // Save general-purpose registers.
    push %r15
    push %r14
    push %r13
    push %r12
    push %r11
    push %r10
    push %r9
    push %r8
    push %rbp
    push %rdi
    push %rsi
    push %rdx
    push %rcx
    push %rbx
    push %rax

    // Save debug registers. They are not directly push-able, so route them through rax.
    mov %dr7, %rax
    push %rax
    mov %dr6, %rax
    push %rax
    mov %dr3, %rax
    push %rax
    mov %dr2, %rax
    push %rax
    mov %dr1, %rax
    push %rax
    mov %dr0, %rax
    push %rax

    // Save segment registers, zero-extended to 64 bits.
    mov %gs, %rax
    push %rax
    mov %fs, %rax
    push %rax
    mov %es, %rax
    push %rax
    mov %ds, %rax
    push %rax

    mov %rsp, %rdi
    call rust_interrupt_handler_for_all_state

    // Restore segment registers.
    pop %rax
    mov %rax, %ds
    pop %rax
    mov %rax, %es
    pop %rax
    mov %rax, %fs
    pop %rax
    mov %rax, %gs

    // Restore debug registers.
    pop %rax
    mov %rax, %dr0
    pop %rax
    mov %rax, %dr1
    pop %rax
    mov %rax, %dr2
    pop %rax
    mov %rax, %dr3
    pop %rax
    mov %rax, %dr6
    pop %rax
    mov %rax, %dr7

    // Restore general-purpose registers, in reverse save order.
    pop %rax
    pop %rbx
    pop %rcx
    pop %rdx
    pop %rsi
    pop %rdi
    pop %rbp
    pop %r8
    pop %r9
    pop %r10
    pop %r11
    pop %r12
    pop %r13
    pop %r14
    pop %r15

    // Discard the vector number and error code pushed beneath the hardware frame.
    add $16, %rsp

    iretq
    "#,
    options(att_syntax)
);
