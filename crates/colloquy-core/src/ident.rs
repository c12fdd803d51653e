//! Identifier generation.
//!
//! Conversation and message identifiers combine a millisecond timestamp with
//! a random component, both base-36 encoded. Collisions are a UX nuisance
//! rather than a security boundary, so no cryptographic strength is needed.
//! Backend session identifiers use UUID v4.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 9;

/// Generates a unique identifier, optionally namespaced by a prefix.
///
/// The result has the shape `prefix_timestamp_random` (or
/// `timestamp_random` without a prefix). Unique with overwhelming
/// probability within a single process lifetime; never fails.
pub fn generate(prefix: Option<&str>) -> String {
    let timestamp = to_base36(Utc::now().timestamp_millis().max(0) as u64);
    let mut rng = rand::thread_rng();
    let random: String = (0..RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    match prefix {
        Some(p) if !p.is_empty() => format!("{p}_{timestamp}_{random}"),
        _ => format!("{timestamp}_{random}"),
    }
}

/// Generates an identifier for a locally created conversation.
pub fn conversation_id() -> String {
    generate(Some("conv"))
}

/// Generates an identifier for a message.
pub fn message_id() -> String {
    generate(Some("msg"))
}

/// Generates a backend session identifier.
pub fn session_id() -> String {
    Uuid::new_v4().to_string()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
