//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=WEBRTC_LIB_DIR");

    // The sim backend has no native dependency.
    if env::var("CARGO_FEATURE_SIM").is_ok() {
        return;
    }

    if let Ok(dir) = env::var("WEBRTC_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    println!("cargo:rustc-link-lib=webrtc");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    match target_os.as_str() {
        "macos" => {
            println!("cargo:rustc-link-lib=framework=CoreAudio");
            println!("cargo:rustc-link-lib=framework=AudioToolbox");
            println!("cargo:rustc-link-lib=framework=CoreGraphics");
        }
        "linux" => {
            println!("cargo:rustc-link-lib=dylib=stdc++");
        }
        _ => {}
    }
}
