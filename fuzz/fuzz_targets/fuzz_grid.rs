#![no_main]

use libfuzzer_sys::fuzz_target;
use greening_trends::{retrieval::parse_grid, Band};

fuzz_target!(|data: &[u8]| {
    if let Ok(sample) = parse_grid(data, Band::Ndvi, 2002) {
        let _ = sample.finite_mean();
    }
});
