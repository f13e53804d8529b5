#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(series) = greening_trends::io::read_csv_from_bytes(data) {
        let _ = greening_trends::fit_and_forecast(
            &series,
            5,
            greening_trends::MissingDataPolicy::Exclude,
        );
    }
});
