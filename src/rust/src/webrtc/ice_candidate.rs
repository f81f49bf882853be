//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC ICE Candidate Interface.

use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;

use crate::core::util::redact_string;
use crate::webrtc;

/// ICE candidate structure passed between Rust and C++.
#[repr(C)]
#[derive(Debug)]
pub struct RffiIceCandidate {
    pub sdp_mid: webrtc::ptr::Borrowed<c_char>,
    pub sdp_mline_index: i32,
    pub sdp: webrtc::ptr::Borrowed<c_char>,
}

/// ICE candidate structure passed around within Rust only.
#[derive(Clone)]
pub struct IceCandidate {
    pub sdp_mid: String,
    pub sdp_mline_index: i32,
    pub sdp: String,
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = format!(
            "sdp_mid: {}, sdp_mline: {}, sdp: {}",
            self.sdp_mid, self.sdp_mline_index, self.sdp
        );
        write!(f, "{}", redact_string(&*text))
    }
}

impl fmt::Debug for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl IceCandidate {
    pub fn new(sdp_mid: String, sdp_mline_index: i32, sdp: String) -> Self {
        Self {
            sdp_mid,
            sdp_mline_index,
            sdp,
        }
    }
}

impl From<&RffiIceCandidate> for IceCandidate {
    fn from(item: &RffiIceCandidate) -> Self {
        IceCandidate::new(
            unsafe {
                CStr::from_ptr(item.sdp_mid.as_ptr())
                    .to_string_lossy()
                    .into_owned()
            },
            item.sdp_mline_index,
            unsafe {
                CStr::from_ptr(item.sdp.as_ptr())
                    .to_string_lossy()
                    .into_owned()
            },
        )
    }
}
