#![no_main]

use libfuzzer_sys::fuzz_target;
use localchat_protocol::config::Limits;
use localchat_protocol::core::serializable::Deserializable;
use localchat_protocol::protocol::{ChatEnvelope, MethodRegistry};

fuzz_target!(|data: &[u8]| {
    // Chat snapshot decoding - test for panics, crashes, unbounded allocation
    if let Ok(registry) = MethodRegistry::with_builtin(Limits::default()) {
        let _ = ChatEnvelope::from_bytes(data, &registry);
    }
});
