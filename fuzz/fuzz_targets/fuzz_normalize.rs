#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = echo_core::normalize(s, &["42"]);
        let twice = echo_core::normalize(&once, &["42"]);
        assert_eq!(once, twice);
    }
});
