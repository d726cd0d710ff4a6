//! C ABI over the process-wide facade.
//!
//! Arguments are NUL-terminated UTF-8; a null pointer reads as an empty
//! string. Every returned pointer is owned by the caller and must be released
//! with [`warpnet_string_free`].

use std::borrow::Cow;
use std::ffi::{c_char, CStr, CString};

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn read<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        return Cow::Borrowed("");
    }

    // SAFETY: checked for null above; validity is the caller's contract.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
}

fn into_raw(value: String) -> *mut c_char {
    let value = if value.contains('\0') {
        value.replace('\0', "")
    } else {
        value
    };

    CString::new(value).unwrap_or_default().into_raw()
}

/// # Safety
///
/// `psk_base64` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn warpnet_initialize(psk_base64: *const c_char) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let psk_base64 = unsafe { read(psk_base64) };

    into_raw(crate::initialize(&psk_base64))
}

/// # Safety
///
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn warpnet_connect_to_node(
    peer_id: *const c_char,
    address: *const c_char,
) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let (peer_id, address) = unsafe { (read(peer_id), read(address)) };

    into_raw(crate::connect_to_node(&peer_id, &address))
}

/// # Safety
///
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn warpnet_send_request(
    protocol_id: *const c_char,
    payload: *const c_char,
) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let (protocol_id, payload) = unsafe { (read(protocol_id), read(payload)) };

    into_raw(crate::send_request(&protocol_id, &payload))
}

#[no_mangle]
pub extern "C" fn warpnet_get_client_peer_id() -> *mut c_char {
    into_raw(crate::get_client_peer_id())
}

#[no_mangle]
pub extern "C" fn warpnet_check_connection() -> *mut c_char {
    into_raw(crate::check_connection())
}

#[no_mangle]
pub extern "C" fn warpnet_disconnect_from_node() -> *mut c_char {
    into_raw(crate::disconnect_from_node())
}

#[no_mangle]
pub extern "C" fn warpnet_shutdown() -> *mut c_char {
    into_raw(crate::shutdown())
}

/// # Safety
///
/// `pairing_json` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn warpnet_pair_with_node(pairing_json: *const c_char) -> *mut c_char {
    // SAFETY: forwarded caller contract.
    let pairing_json = unsafe { read(pairing_json) };

    into_raw(crate::pair_with_node(&pairing_json))
}

/// Releases a string returned by any `warpnet_*` function.
///
/// # Safety
///
/// `value` must be null or a pointer previously returned by this library and
/// not yet freed.
#[no_mangle]
pub unsafe extern "C" fn warpnet_string_free(value: *mut c_char) {
    if value.is_null() {
        return;
    }

    // SAFETY: the pointer came from `CString::into_raw` in this module.
    drop(unsafe { CString::from_raw(value) });
}
