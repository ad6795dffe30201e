#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz payload normalization.
///
/// Feeds arbitrary UTF-8 strings to `normalize_str`, which parses JSON,
/// detects the payload shape and runs the matching parser.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = inventory_enrich::normalize_str(s);
    }
});
