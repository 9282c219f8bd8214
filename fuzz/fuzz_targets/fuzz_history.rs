#![no_main]

use libfuzzer_sys::fuzz_target;
use localchat_protocol::config::Limits;
use localchat_protocol::core::serializable::{Deserializable, Serializable};
use localchat_protocol::protocol::UserMessageHistory;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_user_count: 64,
        max_message_count: 1024,
        ..Limits::default()
    };
    // Anything that decodes must encode and decode to the same value
    if let Ok(history) = UserMessageHistory::from_bytes(data, &limits) {
        if let Ok(bytes) = history.to_bytes() {
            let again = UserMessageHistory::from_bytes(&bytes, &limits);
            assert!(again.is_ok());
        }
    }
});
