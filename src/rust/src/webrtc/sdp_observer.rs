//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Create / Set Session Description Interface.

use std::ffi::{c_void, CStr, CString};
use std::fmt;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Arc, Condvar, Mutex};

use crate::common::Result;
use crate::core::util::{ptr_as_ref, FutureResult};
use crate::error::NativeRtcError;
use crate::webrtc;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::sdp_observer as sdp;
#[cfg(not(feature = "sim"))]
pub use crate::webrtc::ffi::sdp_observer::{
    RffiCreateSessionDescriptionObserver, RffiSessionDescription, RffiSetSessionDescriptionObserver,
};

#[cfg(feature = "sim")]
use crate::webrtc::sim::sdp_observer as sdp;
#[cfg(feature = "sim")]
pub use crate::webrtc::sim::sdp_observer::{
    RffiCreateSessionDescriptionObserver, RffiSessionDescription, RffiSetSessionDescriptionObserver,
};

/// Rust wrapper around WebRTC C++ SessionDescriptionInterface.
pub struct SessionDescription {
    rffi: webrtc::ptr::Unique<RffiSessionDescription>,
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "session_description: {:p}", self.rffi.as_mut_ptr())
    }
}

impl fmt::Debug for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl SessionDescription {
    pub fn new(rffi: webrtc::ptr::Unique<RffiSessionDescription>) -> Self {
        Self { rffi }
    }

    /// Passes ownership of the native description to the caller, typically
    /// on the way into Set{Local,Remote}Description, which consumes it.
    pub fn take_rffi(mut self) -> webrtc::ptr::Unique<RffiSessionDescription> {
        self.rffi.take()
    }

    /// Return SDP representation of this SessionDescription.
    pub fn to_sdp(&self) -> Result<String> {
        let sdp_ptr = unsafe { sdp::Rust_toSdp(self.rffi.borrow()) };
        if sdp_ptr.is_null() {
            return Err(NativeRtcError::ToSdp.into());
        }
        let sdp = unsafe { CStr::from_ptr(sdp_ptr).to_string_lossy().into_owned() };
        unsafe { libc::free(sdp_ptr as *mut libc::c_void) };
        Ok(sdp)
    }

    /// Create a SDP offer from the session description string.
    pub fn offer_from_sdp(sdp_text: String) -> Result<Self> {
        let sdp_text = CString::new(sdp_text)?;
        let offer = unsafe {
            sdp::Rust_offerFromSdp(webrtc::ptr::Borrowed::from_ptr(sdp_text.as_ptr()))
        };
        if offer.is_null() {
            return Err(NativeRtcError::ConvertSdpOffer.into());
        }
        Ok(SessionDescription::new(offer))
    }

    /// Create a SDP answer from the session description string.
    pub fn answer_from_sdp(sdp_text: String) -> Result<Self> {
        let sdp_text = CString::new(sdp_text)?;
        let answer = unsafe {
            sdp::Rust_answerFromSdp(webrtc::ptr::Borrowed::from_ptr(sdp_text.as_ptr()))
        };
        if answer.is_null() {
            return Err(NativeRtcError::ConvertSdpAnswer.into());
        }
        Ok(SessionDescription::new(answer))
    }
}

/// Observer object for creating a session description.
pub struct CreateSessionDescriptionObserver {
    /// Signals completion of the create session description operation.
    condition: FutureResult<Result<*const RffiSessionDescription>>,
    rffi: webrtc::Arc<RffiCreateSessionDescriptionObserver>,
}

impl CreateSessionDescriptionObserver {
    fn new() -> Self {
        Self {
            condition: Arc::new((Mutex::new((false, Ok(ptr::null()))), Condvar::new())),
            rffi: webrtc::Arc::null(),
        }
    }

    /// Called back when the create session description operation succeeds.
    fn on_create_success(&self, desc: webrtc::ptr::Owned<RffiSessionDescription>) {
        debug!("on_create_success()");
        let (mtx, cvar) = &*self.condition;
        if let Ok(mut guard) = mtx.lock() {
            guard.1 = Ok(desc.as_ptr());
            guard.0 = true;
            cvar.notify_one();
        }
    }

    /// Called back when the create session description operation fails.
    fn on_create_failure(&self, err_message: String, err_type: i32) {
        warn!(
            "on_create_failure(). error msg: {}, type: {}",
            err_message, err_type
        );
        let (mtx, cvar) = &*self.condition;
        if let Ok(mut guard) = mtx.lock() {
            guard.1 =
                Err(NativeRtcError::CreateSessionDescriptionObserver(err_message, err_type).into());
            guard.0 = true;
            cvar.notify_one();
        }
    }

    /// Retrieve the result of the create session description operation,
    /// blocking until the engine delivers it.
    pub fn get_result(&self) -> Result<SessionDescription> {
        let (mtx, cvar) = &*self.condition;
        if let Ok(mut guard) = mtx.lock() {
            while !guard.0 {
                guard = cvar.wait(guard).map_err(|_| {
                    NativeRtcError::MutexPoisoned("CreateSessionDescription condvar mutex".to_string())
                })?;
            }
            match &guard.1 {
                Ok(v) => Ok(SessionDescription::new(unsafe {
                    webrtc::ptr::Unique::from_ptr(*v as *mut RffiSessionDescription)
                })),
                Err(e) => Err(NativeRtcError::CreateSessionDescriptionObserverResult(
                    format!("{}", e),
                )
                .into()),
            }
        } else {
            Err(
                NativeRtcError::MutexPoisoned("CreateSessionDescription condvar mutex".to_string())
                    .into(),
            )
        }
    }

    pub fn set_rffi(&mut self, rffi: webrtc::Arc<RffiCreateSessionDescriptionObserver>) {
        self.rffi = rffi;
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiCreateSessionDescriptionObserver> {
        &self.rffi
    }
}

/// CreateSessionDescription observer OnSuccess() callback.
#[allow(non_snake_case)]
extern "C" fn csd_observer_OnSuccess(
    csd_observer: webrtc::ptr::Borrowed<CreateSessionDescriptionObserver>,
    desc: webrtc::ptr::Owned<RffiSessionDescription>,
) {
    debug!("csd_observer_OnSuccess()");
    match unsafe { ptr_as_ref(csd_observer.as_ptr()) } {
        Ok(v) => v.on_create_success(desc),
        Err(e) => error!("csd_observer_OnSuccess(): {}", e),
    };
}

/// CreateSessionDescription observer OnFailure() callback.
#[allow(non_snake_case)]
extern "C" fn csd_observer_OnFailure(
    csd_observer: webrtc::ptr::Borrowed<CreateSessionDescriptionObserver>,
    err_message: webrtc::ptr::Borrowed<c_char>,
    err_type: i32,
) {
    let err_string = unsafe {
        CStr::from_ptr(err_message.as_ptr())
            .to_string_lossy()
            .into_owned()
    };
    error!("csd_observer_OnFailure(): {}", err_string);

    match unsafe { ptr_as_ref(csd_observer.as_ptr()) } {
        Ok(v) => v.on_create_failure(err_string, err_type),
        Err(e) => error!("csd_observer_OnFailure(): {}", e),
    };
}

/// CreateSessionDescription observer callback function pointers.
#[repr(C)]
#[allow(non_snake_case)]
pub struct CreateSessionDescriptionObserverCallbacks {
    pub onSuccess: extern "C" fn(
        csd_observer: webrtc::ptr::Borrowed<CreateSessionDescriptionObserver>,
        desc: webrtc::ptr::Owned<RffiSessionDescription>,
    ),
    pub onFailure: extern "C" fn(
        csd_observer: webrtc::ptr::Borrowed<CreateSessionDescriptionObserver>,
        err_message: webrtc::ptr::Borrowed<c_char>,
        err_type: i32,
    ),
}

static CSD_OBSERVER_CBS: CreateSessionDescriptionObserverCallbacks =
    CreateSessionDescriptionObserverCallbacks {
        onSuccess: csd_observer_OnSuccess,
        onFailure: csd_observer_OnFailure,
    };

/// Creates a CreateSessionDescriptionObserver, pinned so the engine can call
/// back into it.
pub fn create_csd_observer() -> Box<CreateSessionDescriptionObserver> {
    let mut csd_observer = Box::new(CreateSessionDescriptionObserver::new());
    let csd_observer_ptr = &*csd_observer as *const CreateSessionDescriptionObserver;
    let rffi = webrtc::Arc::from_owned(unsafe {
        sdp::Rust_createCreateSessionDescriptionObserver(
            webrtc::ptr::Borrowed::from_ptr(csd_observer_ptr as *const c_void),
            webrtc::ptr::Borrowed::from_ptr(
                &CSD_OBSERVER_CBS as *const CreateSessionDescriptionObserverCallbacks
                    as *const c_void,
            ),
        )
    });
    csd_observer.set_rffi(rffi);
    csd_observer
}

/// Observer object for setting a session description.
pub struct SetSessionDescriptionObserver {
    /// Signals completion of the set session description operation.
    condition: FutureResult<Result<()>>,
    rffi: webrtc::Arc<RffiSetSessionDescriptionObserver>,
}

impl SetSessionDescriptionObserver {
    fn new() -> Self {
        Self {
            condition: Arc::new((Mutex::new((false, Ok(()))), Condvar::new())),
            rffi: webrtc::Arc::null(),
        }
    }

    /// Called back when the set session description operation succeeds.
    fn on_set_success(&self) {
        debug!("on_set_success()");
        let (mtx, cvar) = &*self.condition;
        if let Ok(mut guard) = mtx.lock() {
            guard.1 = Ok(());
            guard.0 = true;
            cvar.notify_one();
        }
    }

    /// Called back when the set session description operation fails.
    fn on_set_failure(&self, err_message: String, err_type: i32) {
        warn!(
            "on_set_failure(). error msg: {}, type: {}",
            err_message, err_type
        );
        let (mtx, cvar) = &*self.condition;
        if let Ok(mut guard) = mtx.lock() {
            guard.1 =
                Err(NativeRtcError::SetSessionDescriptionObserver(err_message, err_type).into());
            guard.0 = true;
            cvar.notify_one();
        }
    }

    /// Retrieve the result of the set session description operation,
    /// blocking until the engine delivers it.
    pub fn get_result(&self) -> Result<()> {
        let (mtx, cvar) = &*self.condition;
        if let Ok(mut guard) = mtx.lock() {
            while !guard.0 {
                guard = cvar.wait(guard).map_err(|_| {
                    NativeRtcError::MutexPoisoned("SetSessionDescription condvar mutex".to_string())
                })?;
            }
            match &guard.1 {
                Ok(()) => Ok(()),
                Err(e) => Err(NativeRtcError::SetSessionDescriptionObserverResult(format!(
                    "{}",
                    e
                ))
                .into()),
            }
        } else {
            Err(
                NativeRtcError::MutexPoisoned("SetSessionDescription condvar mutex".to_string())
                    .into(),
            )
        }
    }

    pub fn set_rffi(&mut self, rffi: webrtc::Arc<RffiSetSessionDescriptionObserver>) {
        self.rffi = rffi;
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiSetSessionDescriptionObserver> {
        &self.rffi
    }
}

/// SetSessionDescription observer OnSuccess() callback.
#[allow(non_snake_case)]
extern "C" fn ssd_observer_OnSuccess(
    ssd_observer: webrtc::ptr::Borrowed<SetSessionDescriptionObserver>,
) {
    debug!("ssd_observer_OnSuccess()");
    match unsafe { ptr_as_ref(ssd_observer.as_ptr()) } {
        Ok(v) => v.on_set_success(),
        Err(e) => error!("ssd_observer_OnSuccess(): {}", e),
    };
}

/// SetSessionDescription observer OnFailure() callback.
#[allow(non_snake_case)]
extern "C" fn ssd_observer_OnFailure(
    ssd_observer: webrtc::ptr::Borrowed<SetSessionDescriptionObserver>,
    err_message: webrtc::ptr::Borrowed<c_char>,
    err_type: i32,
) {
    let err_string = unsafe {
        CStr::from_ptr(err_message.as_ptr())
            .to_string_lossy()
            .into_owned()
    };
    error!("ssd_observer_OnFailure(): {}", err_string);

    match unsafe { ptr_as_ref(ssd_observer.as_ptr()) } {
        Ok(v) => v.on_set_failure(err_string, err_type),
        Err(e) => error!("ssd_observer_OnFailure(): {}", e),
    };
}

/// SetSessionDescription observer callback function pointers.
#[repr(C)]
#[allow(non_snake_case)]
pub struct SetSessionDescriptionObserverCallbacks {
    pub onSuccess:
        extern "C" fn(ssd_observer: webrtc::ptr::Borrowed<SetSessionDescriptionObserver>),
    pub onFailure: extern "C" fn(
        ssd_observer: webrtc::ptr::Borrowed<SetSessionDescriptionObserver>,
        err_message: webrtc::ptr::Borrowed<c_char>,
        err_type: i32,
    ),
}

static SSD_OBSERVER_CBS: SetSessionDescriptionObserverCallbacks =
    SetSessionDescriptionObserverCallbacks {
        onSuccess: ssd_observer_OnSuccess,
        onFailure: ssd_observer_OnFailure,
    };

/// Creates a SetSessionDescriptionObserver, pinned so the engine can call
/// back into it.
pub fn create_ssd_observer() -> Box<SetSessionDescriptionObserver> {
    let mut ssd_observer = Box::new(SetSessionDescriptionObserver::new());
    let ssd_observer_ptr = &*ssd_observer as *const SetSessionDescriptionObserver;
    let rffi = webrtc::Arc::from_owned(unsafe {
        sdp::Rust_createSetSessionDescriptionObserver(
            webrtc::ptr::Borrowed::from_ptr(ssd_observer_ptr as *const c_void),
            webrtc::ptr::Borrowed::from_ptr(
                &SSD_OBSERVER_CBS as *const SetSessionDescriptionObserverCallbacks as *const c_void,
            ),
        )
    });
    ssd_observer.set_rffi(rffi);
    ssd_observer
}
