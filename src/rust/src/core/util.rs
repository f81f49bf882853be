//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Foreign Function Interface utility helpers and types.

use std::borrow::Cow;
use std::sync::{Arc, Condvar, Mutex};

use crate::common::Result;
use crate::error::NativeRtcError;

/// Generic Mutex/Condvar pair for signaling async event completion.
pub type FutureResult<T> = Arc<(Mutex<(bool, T)>, Condvar)>;

/// # Safety
///
/// Casts a raw *mut T into a &mut T.
pub unsafe fn ptr_as_mut<T>(ptr: *mut T) -> Result<&'static mut T> {
    if ptr.is_null() {
        return Err(
            NativeRtcError::NullPointer("ptr_as_mut<T>()".to_string(), "ptr".to_string()).into(),
        );
    }

    let object = &mut *ptr;
    Ok(object)
}

/// # Safety
///
/// Casts a raw *const T into a &T.
pub unsafe fn ptr_as_ref<T>(ptr: *const T) -> Result<&'static T> {
    if ptr.is_null() {
        return Err(
            NativeRtcError::NullPointer("ptr_as_ref<T>()".to_string(), "ptr".to_string()).into(),
        );
    }

    let object = &*ptr;
    Ok(object)
}

/// # Safety
///
/// Dereferences raw *mut T into a Box<T>.
pub unsafe fn ptr_as_box<T>(ptr: *mut T) -> Result<Box<T>> {
    if ptr.is_null() {
        return Err(
            NativeRtcError::NullPointer("ptr_as_box<T>()".to_string(), "ptr".to_string()).into(),
        );
    }

    let object = Box::from_raw(ptr);
    Ok(object)
}

/// Scrubs ICE credentials out of SDP text for public logging purposes.
///
/// Any line mentioning `ice-pwd` or `ice-ufrag` is replaced wholesale; the
/// rest of the text passes through untouched.
pub fn redact_string<'a>(text: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
    let text = text.into();
    if !text.contains("ice-pwd") && !text.contains("ice-ufrag") {
        return text;
    }

    let redacted: Vec<&str> = text
        .lines()
        .map(|line| {
            if line.contains("ice-pwd") {
                "a=ice-pwd:[ REDACTED ]"
            } else if line.contains("ice-ufrag") {
                "a=ice-ufrag:[ REDACTED ]"
            } else {
                line
            }
        })
        .collect();
    redacted.join("\n").into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_passes_clean_text_through() {
        let text = "v=0\no=- 46 2 IN IP4 127.0.0.1";
        assert_eq!(text, redact_string(text));
    }

    #[test]
    fn redact_masks_ice_credentials() {
        let text = "abc\na=ice-pwd:secret\ndef\na=ice-ufrag:4ZcD\nghi";
        assert_eq!(
            "abc\na=ice-pwd:[ REDACTED ]\ndef\na=ice-ufrag:[ REDACTED ]\nghi",
            redact_string(text),
        );
    }
}
