//! Client-side document identifiers
//!
//! The backend accepts caller-chosen document ids. New ids follow the
//! backend's own `unique()` layout so that they sort roughly by creation
//! time: hex seconds, five hex digits of sub-second microseconds, then
//! random hex padding up to [`ID_LENGTH`] characters.
//!
//! # Example
//!
//! ```
//! use taskboard_shared::ids::{unique_id, ID_LENGTH};
//!
//! let id = unique_id();
//! assert_eq!(id.len(), ID_LENGTH);
//! ```

use chrono::Utc;
use rand::RngCore;

/// Length of every generated id
pub const ID_LENGTH: usize = 20;

/// Generates a new unique document id
pub fn unique_id() -> String {
    let now = Utc::now();
    let mut id = format!(
        "{:x}{:05x}",
        now.timestamp(),
        now.timestamp_subsec_micros()
    );

    let mut padding = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut padding);
    let padding = hex::encode(padding);

    let missing = ID_LENGTH.saturating_sub(id.len());
    id.push_str(&padding[..missing.min(padding.len())]);
    id.truncate(ID_LENGTH);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_shape() {
        let id = unique_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unique_ids_differ() {
        let a = unique_id();
        let b = unique_id();
        assert_ne!(a, b);
    }
}
