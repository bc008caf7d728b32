//! Fuzz target for `decode_payload`
//!
//! This fuzzer tests the batched payload path, where one websocket text
//! message carries several newline-separated frames:
//! - Frame boundary splitting with embedded or trailing newlines
//! - Blank lines between frames
//! - Valid frames mixed with garbage
//!
//! The fuzzer should NEVER panic. Each bad frame should surface as its own
//! error without poisoning the rest of the batch.

#![no_main]

use irie_proto::decode_payload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    for result in decode_payload(data) {
        let _ = result;
    }
});
