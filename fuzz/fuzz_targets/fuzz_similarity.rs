#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (a, b) = data;
    let score = echo_corpus::similarity(a, b);
    assert!((0.0..=1.0).contains(&score));
    assert_eq!(score, echo_corpus::similarity(b, a));
});
