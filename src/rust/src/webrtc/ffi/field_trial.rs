//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::os::raw::c_char;

use crate::webrtc;

extern "C" {
    pub fn Rust_setFieldTrials(trials: webrtc::ptr::Borrowed<c_char>);
}
