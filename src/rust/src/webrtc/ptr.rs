//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

// Wrappers for pointers to make it clear what type of pointer we have.
// On the C++ side of the FFI, these will be pointers.
// On the Rust side, they will be one of these.

// A marker trait for engine types that can be passed to rtc::scoped_refptr,
// such as rtc::RefCountedObject.  Notable examples:
// - PeerConnectionFactory (Sync and Send because it's wrapped in a Proxy)
// - PeerConnection (Sync and Send because it's wrapped in a Proxy)
// - RtpSender (Sync and Send because it's wrapped in a Proxy)
// - RtpReceiver (Sync and Send because it's wrapped in a Proxy)
// - DataChannel (Sync and Send because it's wrapped in a Proxy)
// - MediaStream (Sync and Send because it's wrapped in a Proxy)
// - AudioTrack (Sync and Send because it's wrapped in a Proxy)
// - VideoTrack (Sync and Send because it's wrapped in a Proxy)
// - VideoTrackSource (Sync and Send because it's wrapped in a Proxy)
// - I420Buffer
// We use this to tell if something can be wrapped with
// OwnedRc, BorrowedRc, and webrtc::Arc.
pub trait RefCounted {}

// These all cross the FFI as plain pointers.
static_assertions::assert_eq_size!(Owned<u8>, *const u8);
static_assertions::assert_eq_size!(Borrowed<u8>, *const u8);
static_assertions::assert_eq_size!(Unique<u8>, *mut u8);

#[derive(Debug)]
#[repr(transparent)]
pub struct Owned<T>(*const T);

impl<T> Owned<T> {
    /// # Safety
    /// The pointee must be owned.
    pub unsafe fn from_ptr(ptr: *const T) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(&self) -> *const T {
        self.0
    }

    pub fn borrow(&self) -> Borrowed<T> {
        Borrowed::from_ptr(self.as_ptr())
    }

    pub fn null() -> Self {
        Self(std::ptr::null())
    }

    pub fn is_null(&self) -> bool {
        self.as_ptr().is_null()
    }

    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::null())
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Borrowed<T>(*const T);

impl<T> Borrowed<T> {
    /// Safe because we don't do anything with it other than turn it back into a pointer.
    pub fn from_ptr(ptr: *const T) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(&self) -> *const T {
        self.0
    }

    pub fn null() -> Self {
        Self(std::ptr::null())
    }

    pub fn is_null(&self) -> bool {
        self.as_ptr().is_null()
    }

    /// # Safety
    /// Just as safe as any pointer deref.
    pub unsafe fn as_ref(&self) -> Option<&T> {
        self.as_ptr().as_ref()
    }
}

#[derive(Debug)]
#[repr(transparent)]
pub struct OwnedRc<T: RefCounted>(*const T);

impl<T: RefCounted> OwnedRc<T> {
    /// # Safety
    /// The pointee must own a ref count.
    pub unsafe fn from_ptr(ptr: *const T) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(&self) -> *const T {
        self.0
    }

    pub fn borrow(&self) -> BorrowedRc<T> {
        BorrowedRc::from_ptr(self.as_ptr())
    }

    pub fn null() -> Self {
        Self(std::ptr::null())
    }

    pub fn is_null(&self) -> bool {
        self.as_ptr().is_null()
    }

    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::null())
    }

    /// # Safety
    /// Just as safe as any pointer deref.
    pub unsafe fn as_ref(&self) -> Option<&T> {
        self.as_ptr().as_ref()
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub struct BorrowedRc<T: RefCounted>(*const T);

impl<T: RefCounted> BorrowedRc<T> {
    /// Safe because we don't do anything with it other than turn it back into a pointer.
    pub fn from_ptr(ptr: *const T) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(&self) -> *const T {
        self.0
    }

    pub fn null() -> Self {
        Self(std::ptr::null())
    }

    pub fn is_null(&self) -> bool {
        self.as_ptr().is_null()
    }

    /// # Safety
    /// Just as safe as any pointer deref.
    pub unsafe fn as_ref(&self) -> Option<&T> {
        self.as_ptr().as_ref()
    }
}

/// An owning pointer with exactly one Rust-side owner, which is
/// responsible for deleting it through the matching engine call.
#[repr(transparent)]
pub struct Unique<T>(*mut T);

impl<T> std::fmt::Debug for Unique<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Unique").field(&self.0).finish()
    }
}

impl<T> Unique<T> {
    /// # Safety
    /// The pointee must be exclusively owned.
    pub unsafe fn from_ptr(ptr: *mut T) -> Self {
        Self(ptr)
    }

    pub fn as_mut_ptr(&self) -> *mut T {
        self.0
    }

    pub fn borrow(&self) -> Borrowed<T> {
        Borrowed::from_ptr(self.0)
    }

    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::null())
    }
}
