//! Fuzz target for engine config parsing.
//!
//! Arbitrary TOML must parse or fail with an error, never panic.

#![no_main]

use hmm_core::EngineConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = EngineConfig::from_toml_str(text) {
            let _ = config.validate();
        }
    }
});
