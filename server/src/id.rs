//! Property id generation.
//!
//! Ids are 32 lowercase hex characters taken from a v4 UUID, which draws its
//! bits from the OS random source. Uniqueness is enforced by the store, not
//! here.

use uuid::Uuid;

/// Length of every generated id.
pub const ID_LEN: usize = 32;

pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_fixed_length_lowercase_hex() {
        for _ in 0..100 {
            let id = generate_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')), "{id}");
        }
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
