//! Fuzz target for SQL extraction and the read-only guard.
//!
//! The regexes run on model output, so pathological input must not panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabforge::assistant::{extract_sql, SqlGuard};

fuzz_target!(|data: &[u8]| {
    if data.len() > 50_000 {
        return;
    }

    if let Ok(response) = std::str::from_utf8(data) {
        let guard = SqlGuard::new();
        let _ = guard.check(response);
        if let Some(sql) = extract_sql(response) {
            let _ = guard.check(&sql);
        }
    }
});
