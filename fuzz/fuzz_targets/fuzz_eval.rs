#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(q) = arrayquery::parse_query_json(s) {
            // A few records with nested sequences to exercise broadcast and $eleMatch
            let records = [
                bson::bson!({"a": 1, "b": [1, 2], "name": "x"}),
                bson::bson!({"a": 10, "items": [{"v": 3, "t": ["p"]}, {"v": -5}], "nested": {"z": [[1], [2, 3]]}}),
                bson::bson!({"items": [], "active": true}),
            ];
            let _ = arrayquery::QueryEngine::new().query(&records, &q);
        }
    }
});
