#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = greening_trends::io::read_json_from_bytes(data);
});
