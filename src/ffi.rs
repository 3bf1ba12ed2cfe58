//! FFI bindings for Zen Analytics
//!
//! C-compatible functions for calling the aggregation engine from the app
//! shell. Inputs are null-terminated UTF-8 strings; returned strings are
//! allocated here and must be freed with `zen_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::analytics::classify::stress_level;
use crate::config::AnalyticsConfig;
use crate::encoder::ReportEncoder;
use crate::error::AnalyticsError;
use crate::export::sessions_to_csv;
use crate::pipeline::{report_from_json, DashboardProcessor};
use crate::schema::RecordAdapter;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// NULL means "use defaults"
unsafe fn config_from_ptr(config_toml: *const c_char) -> Result<AnalyticsConfig, AnalyticsError> {
    if config_toml.is_null() {
        return Ok(AnalyticsConfig::default());
    }
    match cstr_to_string(config_toml) {
        Some(s) => AnalyticsConfig::from_toml_str(&s),
        None => Err(AnalyticsError::ConfigError(
            "Config is not valid UTF-8".to_string(),
        )),
    }
}

fn string_result(result: Result<String, AnalyticsError>) -> *mut c_char {
    match result {
        Ok(s) => string_to_cstr(&s),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Build the full dashboard report from a JSON array of session rows.
///
/// # Safety
/// - `sessions_json` must be a valid null-terminated C string.
/// - `config_toml` must be a valid null-terminated C string or NULL for defaults.
/// - Returns a newly allocated string that must be freed with `zen_free_string`.
/// - Returns NULL on error; call `zen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn zen_build_report(
    sessions_json: *const c_char,
    config_toml: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(sessions_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sessions JSON string pointer");
            return ptr::null_mut();
        }
    };

    let config = match config_from_ptr(config_toml) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    string_result(
        report_from_json(&json_str, &config)
            .and_then(|report| ReportEncoder::new().encode_to_json(&report)),
    )
}

/// Export a JSON array of session rows as CSV.
///
/// # Safety
/// - `sessions_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `zen_free_string`.
/// - Returns NULL on error; call `zen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn zen_export_csv(sessions_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(sessions_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sessions JSON string pointer");
            return ptr::null_mut();
        }
    };

    string_result(
        RecordAdapter::parse_array(&json_str)
            .and_then(RecordAdapter::to_sessions)
            .and_then(|sessions| sessions_to_csv(&sessions)),
    )
}

/// Gauge level for a stress score: 0 = Low, 1 = Moderate, 2 = High.
///
/// Returns -1 for a score outside 0-1 or not finite.
#[no_mangle]
pub extern "C" fn zen_stress_level(stress_score: f64) -> i32 {
    clear_last_error();

    if !stress_score.is_finite() || !(0.0..=1.0).contains(&stress_score) {
        set_last_error("Stress score must be a finite number within [0, 1]");
        return -1;
    }
    stress_level(stress_score) as i32
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a DashboardProcessor
pub struct ZenProcessorHandle {
    processor: DashboardProcessor,
}

/// Create a new DashboardProcessor.
///
/// # Safety
/// - `config_toml` must be a valid null-terminated C string or NULL for defaults.
/// - Returns a pointer that must be freed with `zen_processor_free`.
/// - Returns NULL on error; call `zen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn zen_processor_new(config_toml: *const c_char) -> *mut ZenProcessorHandle {
    clear_last_error();

    match config_from_ptr(config_toml) {
        Ok(config) => Box::into_raw(Box::new(ZenProcessorHandle {
            processor: DashboardProcessor::new(config),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a DashboardProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `zen_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn zen_processor_free(processor: *mut ZenProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Feed the refetched session collection to a processor and get the report.
///
/// If the rows fail to parse or validate, the previous report is kept and
/// NULL is returned.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `zen_processor_new`.
/// - `sessions_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `zen_free_string`.
/// - Returns NULL on error; call `zen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn zen_processor_refresh(
    processor: *mut ZenProcessorHandle,
    sessions_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(sessions_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sessions JSON string pointer");
            return ptr::null_mut();
        }
    };

    let ticket = handle.processor.begin_refresh();
    let sessions = match RecordAdapter::parse_array(&json_str).and_then(RecordAdapter::to_sessions) {
        Ok(s) => s,
        Err(e) => {
            handle.processor.fail_refresh(ticket, &e);
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    handle.processor.complete_refresh(ticket, &sessions);
    string_result(handle.processor.last_report_json())
}

/// Last report held by a processor, including after a failed refresh.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `zen_processor_new`.
/// - Returns a newly allocated string that must be freed with `zen_free_string`.
/// - Returns NULL if no report has been built yet.
#[no_mangle]
pub unsafe extern "C" fn zen_processor_last_report(processor: *mut ZenProcessorHandle) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    string_result(handle.processor.last_report_json())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a `zen_*` function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a `zen_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn zen_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `zen_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn zen_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn zen_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
