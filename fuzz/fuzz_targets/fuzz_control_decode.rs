#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The backend pushes control messages as JSON text frames. Decoding
    // must never panic, whatever arrives: malformed JSON, unknown type
    // tags, and known tags with hostile payloads all have to come back as
    // values or errors.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parallax_messages::decode(text);
    }
});
