#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse and compile; errors are fine, panics are not
        if let Ok(q) = arrayquery::parse_query_json(s) {
            let _ = arrayquery::QueryEngine::new().compile(&q);
        }
    }
});
