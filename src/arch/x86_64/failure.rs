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

//! Pure, host-testable mirror of the checks the 32-bit trampoline performs.
//!
//! The live trampoline cannot call into this code: it runs before paging, before a stack
//! exists, and before `core::fmt` is usable. These functions exist so the branch logic
//! embedded in the assembly can be reviewed and tested without an emulator.

/// Magic value a Multiboot2-compliant bootloader places in `eax` on entry.
pub const MULTIBOOT2_MAGIC: u32 = 0x36d7_6289;

/// The two documented ways boot can fail before a stack or paging exists.
#[derive(Debug, Copy, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BootFailure {
    #[display("[ERROR] Not a valid multiboot result")]
    InvalidMagic,
    #[display("[ERROR] Not a 64-bit CPU")]
    UnsupportedCpu,
}

impl BootFailure {
    /// The fixed ASCII message the 32-bit error path writes to the VGA buffer.
    pub const fn message(self) -> &'static str {
        match self {
            BootFailure::InvalidMagic => "[ERROR] Not a valid multiboot result",
            BootFailure::UnsupportedCpu => "[ERROR] Not a 64-bit CPU",
        }
    }
}

/// Mirrors the `cmp $0x36d76289, %eax` / `jne` check performed by the trampoline.
pub const fn validate_magic(eax: u32) -> Result<(), BootFailure> {
    if eax == MULTIBOOT2_MAGIC {
        Ok(())
    } else {
        Err(BootFailure::InvalidMagic)
    }
}

/// The subset of CPUID leaf `0x8000_0001` EDX bits the trampoline inspects.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExtendedFeatureEdx {
    pub pae: bool,
    pub long_mode: bool,
}

impl ExtendedFeatureEdx {
    /// Decodes the bits the trampoline checks out of a raw CPUID EDX value.
    pub const fn from_raw(edx: u32) -> Self {
        ExtendedFeatureEdx {
            pae: edx & (1 << 6) != 0,
            long_mode: edx & (1 << 29) != 0,
        }
    }
}

/// Mirrors the CPUID-based feature check performed by the trampoline.
pub const fn cpu_supports_long_mode(edx: u32) -> Result<(), BootFailure> {
    let features = ExtendedFeatureEdx::from_raw(edx);
    if features.long_mode && features.pae {
        Ok(())
    } else {
        Err(BootFailure::UnsupportedCpu)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn accepts_correct_magic() {
        assert_eq!(validate_magic(0x36d7_6289), Ok(()));
    }

    #[test]
    fn rejects_wrong_magic() {
        assert_eq!(
            validate_magic(0xdead_beef),
            Err(BootFailure::InvalidMagic)
        );
    }

    #[test]
    fn decodes_pae_and_long_mode_bits() {
        let edx = (1 << 6) | (1 << 29);
        let features = ExtendedFeatureEdx::from_raw(edx);
        assert!(features.pae);
        assert!(features.long_mode);
    }

    #[test]
    fn rejects_missing_long_mode_bit() {
        let edx = 1 << 6; // PAE only.
        assert_eq!(
            cpu_supports_long_mode(edx),
            Err(BootFailure::UnsupportedCpu)
        );
    }

    #[test]
    fn rejects_missing_pae_bit() {
        let edx = 1 << 29; // long mode only.
        assert_eq!(
            cpu_supports_long_mode(edx),
            Err(BootFailure::UnsupportedCpu)
        );
    }

    #[test]
    fn accepts_both_bits_set() {
        let edx = (1 << 6) | (1 << 29);
        assert_eq!(cpu_supports_long_mode(edx), Ok(()));
    }

    #[test]
    fn messages_match_the_trampoline_error_path() {
        assert_eq!(
            BootFailure::InvalidMagic.message(),
            "[ERROR] Not a valid multiboot result"
        );
        assert_eq!(
            BootFailure::UnsupportedCpu.message(),
            "[ERROR] Not a 64-bit CPU"
        );
    }
}
