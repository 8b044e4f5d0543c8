//! FFI bridge for a GUI host
//!
//! Exposes the reclaim engine via C-ABI functions. All returned strings are
//! JSON-encoded and must be freed with `reclaim_free_string`. Every call
//! goes through one process-wide [`Monitor`].

use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::sync::OnceLock;

use crate::common::config::Config;
use crate::monitor::Monitor;
use crate::scanner::targets::ItemId;
use crate::store::FileStore;

static MONITOR: OnceLock<Option<Monitor>> = OnceLock::new();

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn monitor() -> Option<&'static Monitor> {
    MONITOR
        .get_or_init(|| {
            let home = dirs::home_dir()?;
            let config = Config::load().unwrap_or_default();
            Some(
                Monitor::builder(home)
                    .store(std::sync::Arc::new(FileStore::open(Config::state_path())))
                    .config(config)
                    .build(),
            )
        })
        .as_ref()
}

/// Convert a Rust string to a C string pointer. Caller must free with `reclaim_free_string`.
fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Convert a JSON-serializable value to a C string pointer.
fn json_to_c<T: serde::Serialize>(val: &T) -> *mut c_char {
    match serde_json::to_string(val) {
        Ok(s) => to_c_string(&s),
        Err(e) => error_c(&e.to_string()),
    }
}

/// Return an error JSON as a C string.
fn error_c(msg: &str) -> *mut c_char {
    let val = serde_json::json!({"error": msg});
    to_c_string(&val.to_string())
}

fn no_home() -> *mut c_char {
    error_c("Could not determine the home directory")
}

/// Borrow a C string argument, `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

// ─── Memory Management ──────────────────────────────────────────────────────

/// Free a string returned by any reclaim FFI function.
#[no_mangle]
pub extern "C" fn reclaim_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

// ─── Scan & State ───────────────────────────────────────────────────────────

/// Run a scan on the calling thread and return the full state.
/// If a scan is already running, returns the current state with `is_scanning` set.
#[no_mangle]
pub extern "C" fn reclaim_scan() -> *mut c_char {
    let Some(m) = monitor() else { return no_home() };
    m.scan_blocking();
    json_to_c(&m.snapshot())
}

/// Return the current observable state without scanning.
#[no_mangle]
pub extern "C" fn reclaim_state() -> *mut c_char {
    let Some(m) = monitor() else { return no_home() };
    json_to_c(&m.snapshot())
}

// ─── Cleanup ────────────────────────────────────────────────────────────────

/// Clean all dev caches from the last scan, skipping risky ones when
/// `exclude_risky` is true. Blocks until the cleanup and re-scan finish.
#[no_mangle]
pub extern "C" fn reclaim_clean_safe(exclude_risky: bool) -> *mut c_char {
    let Some(m) = monitor() else { return no_home() };
    match m.clean_by_risk_filter(exclude_risky).join() {
        Ok(report) => json_to_c(&report),
        Err(_) => error_c("Cleanup worker panicked"),
    }
}

/// Clean a selection given as a JSON array of `{"kind": "cache"|"artifact", "path": "..."}`.
#[no_mangle]
pub extern "C" fn reclaim_clean_selection(ids_json: *const c_char) -> *mut c_char {
    let Some(m) = monitor() else { return no_home() };
    let Some(json) = (unsafe { arg(ids_json) }) else {
        return error_c("Selection is null or not valid UTF-8");
    };
    let ids: HashSet<ItemId> = match serde_json::from_str(json) {
        Ok(ids) => ids,
        Err(e) => return error_c(&format!("Invalid selection: {}", e)),
    };
    match m.clean_selection(&ids).join() {
        Ok(report) => json_to_c(&report),
        Err(_) => error_c("Cleanup worker panicked"),
    }
}

/// Permanently empty the trash.
#[no_mangle]
pub extern "C" fn reclaim_empty_trash() -> *mut c_char {
    let Some(m) = monitor() else { return no_home() };
    match m.empty_trash().join() {
        Ok(report) => json_to_c(&report),
        Err(_) => error_c("Cleanup worker panicked"),
    }
}

// ─── Host actions ───────────────────────────────────────────────────────────

/// Reveal a path in the system file browser. Returns false on failure.
#[no_mangle]
pub extern "C" fn reclaim_reveal(path: *const c_char) -> bool {
    let (Some(m), Some(path)) = (monitor(), unsafe { arg(path) }) else {
        return false;
    };
    m.reveal_in_file_browser(Path::new(path))
}

#[no_mangle]
pub extern "C" fn reclaim_mark_onboarding_complete() {
    if let Some(m) = monitor() {
        m.mark_onboarding_complete();
    }
}
