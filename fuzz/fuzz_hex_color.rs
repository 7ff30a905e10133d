//! Fuzz target for the hex → CIE xy color conversion.
//!
//! Run with: cargo +nightly fuzz run fuzz_hex_color
//!
//! Exercises `hex_to_xy` with arbitrary strings: it must never panic, and
//! any chromaticity it does produce must be a valid normalized coordinate.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Some(xy) = aura_core::hue::color::hex_to_xy(s) {
            assert!((0.0..=1.0).contains(&xy.x));
            assert!((0.0..=1.0).contains(&xy.y));
            assert!(xy.x + xy.y <= 1.0 + 1e-9);
        }
    }
});
