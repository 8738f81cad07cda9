#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    let Ok(mut file) = tempfile::NamedTempFile::new() else {
        return;
    };
    if file.write_all(data).and_then(|()| file.flush()).is_err() {
        return;
    }
    if let Ok(rows) = magneto_config::load_samples_csv(file.path()) {
        assert!(rows.iter().all(|r| r.axes().iter().all(|v| v.is_finite())));
    }
});
