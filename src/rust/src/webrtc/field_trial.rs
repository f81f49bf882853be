//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC field trial configuration.

use std::ffi::CString;

use crate::common::Result;
use crate::webrtc;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::field_trial;
#[cfg(feature = "sim")]
use crate::webrtc::sim::field_trial;

/// Hands the engine its field trial configuration. Must happen before the
/// PeerConnectionFactory is created; the engine reads trials at startup.
///
/// The wire format is the engine's own: `Name/Value/` pairs concatenated.
pub fn set(trials: &[(String, String)]) -> Result<()> {
    if trials.is_empty() {
        return Ok(());
    }

    let mut concatenated = String::new();
    for (name, value) in trials {
        concatenated.push_str(name);
        concatenated.push('/');
        concatenated.push_str(value);
        concatenated.push('/');
    }
    info!("Setting field trials: {}", concatenated);

    let concatenated = CString::new(concatenated)?;
    unsafe {
        field_trial::Rust_setFieldTrials(webrtc::ptr::Borrowed::from_ptr(concatenated.as_ptr()))
    };
    Ok(())
}
