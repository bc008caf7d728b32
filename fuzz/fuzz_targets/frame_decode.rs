//! Fuzz target for `decode_frame`
//!
//! This fuzzer tests single-frame decoding with arbitrary byte sequences
//! to find:
//! - Parser crashes or panics
//! - Type confusion between action variants
//! - Malformed JSON that bypasses validation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use irie_proto::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Attempt to decode arbitrary bytes as one frame
    // This should never panic, only return Err for invalid data
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = decode_frame(text);
    }
});
