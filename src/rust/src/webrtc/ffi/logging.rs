//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::os::raw::c_char;

use crate::webrtc;

/// Log severity, in sync with rtc::LoggingSeverity.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSeverity {
    Verbose = 0,
    Info,
    Warn,
    Error,
    None,
}

/// Logger callback function pointers.
#[repr(C)]
#[allow(non_snake_case)]
pub struct LoggerCallbacks {
    pub onLogMessage: extern "C" fn(LogSeverity, webrtc::ptr::Borrowed<c_char>),
}

extern "C" {
    pub fn Rust_setLogger(
        callbacks: webrtc::ptr::Borrowed<LoggerCallbacks>,
        min_severity: LogSeverity,
    );
}
