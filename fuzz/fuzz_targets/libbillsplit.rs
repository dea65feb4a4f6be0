#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = libbillsplit::parse_description(input);
        let _ = libbillsplit::parse_bill(input);
    }
});
