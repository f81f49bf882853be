//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of field trial configuration.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::webrtc;

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setFieldTrials(trials: webrtc::ptr::Borrowed<c_char>) {
    let trials = CStr::from_ptr(trials.as_ptr()).to_string_lossy();
    info!("Rust_setFieldTrials({})", trials);
}
