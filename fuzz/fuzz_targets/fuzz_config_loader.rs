#![no_main]
use libfuzzer_sys::fuzz_target;

// Parse errors and validation errors are both fine; panics are not.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = magneto_config::load_toml(data) {
        let _ = cfg.validate();
    }
});
