//! The process-wide facade and its C ABI. One test per binary: both drive the
//! same global state.

use std::ffi::{CStr, CString};

use warpnet_mobile::ffi::{
    warpnet_check_connection, warpnet_get_client_peer_id, warpnet_initialize,
    warpnet_send_request, warpnet_shutdown, warpnet_string_free,
};

fn take(ptr: *mut std::ffi::c_char) -> String {
    assert!(!ptr.is_null(), "ffi returned a null pointer");

    let value = unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned();

    unsafe { warpnet_string_free(ptr) };

    value
}

#[test]
fn test_global_lifecycle() {
    assert_eq!(
        warpnet_mobile::send_request("/warpnet/api/feed/1.0.0", "{}"),
        r#"{"error":"client not initialized"}"#
    );
    assert_eq!(warpnet_mobile::get_client_peer_id(), "");
    assert_eq!(warpnet_mobile::check_connection(), "false");
    assert_eq!(warpnet_mobile::disconnect_from_node(), "");
    assert_eq!(warpnet_mobile::shutdown(), "");

    let psk = CString::new("c2hvcnQ=").unwrap();
    let error = take(unsafe { warpnet_initialize(psk.as_ptr()) });
    assert!(error.contains("PSK must be exactly 32 bytes"), "{error}");

    let empty = CString::new("").unwrap();
    assert_eq!(take(unsafe { warpnet_initialize(empty.as_ptr()) }), "");

    let peer_id = take(warpnet_get_client_peer_id());
    assert!(peer_id.starts_with("12D3KooW"), "unexpected peer id {peer_id}");
    assert_eq!(warpnet_mobile::get_client_peer_id(), peer_id);

    assert_eq!(take(warpnet_check_connection()), "false");

    let protocol = CString::new("/warpnet/api/feed/1.0.0").unwrap();
    let response = take(unsafe { warpnet_send_request(protocol.as_ptr(), std::ptr::null()) });
    assert_eq!(response, r#"{"error":"not connected to desktop node"}"#);

    assert_eq!(take(warpnet_shutdown()), "");
    assert_eq!(take(warpnet_shutdown()), "");
    assert_eq!(warpnet_mobile::get_client_peer_id(), "");

    unsafe { warpnet_string_free(std::ptr::null_mut()) };
}
