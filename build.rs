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

//! Passes the linker script to the linker and makes sure cargo reruns us whenever it changes.

use std::path::Path;

fn main() {
    let linker_script = Path::new(env!("CARGO_MANIFEST_DIR")).join("linker.ld");
    if !linker_script.exists() {
        panic!(
            "linker script not found at {}; the kernel cannot be linked without it",
            linker_script.display()
        );
    }

    println!("cargo:rerun-if-changed=linker.ld");
    println!("cargo:rustc-link-arg=-Tlinker.ld");
}
