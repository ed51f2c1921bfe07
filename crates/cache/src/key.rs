//! Storage key construction for (user, conversation) pairs.

const KEY_PREFIX: &str = "conversation";

/// Build the storage key for one (user, conversation) pair.
///
/// Both identifier lengths are framed into the key, so the mapping stays
/// injective even when an identifier contains the separator itself:
/// `("a:b", "c")` and `("a", "b:c")` produce distinct keys.
pub fn conversation_key(user_id: &str, conversation_id: &str) -> String {
    format!(
        "{}:{}:{}:{}{}",
        KEY_PREFIX,
        user_id.len(),
        conversation_id.len(),
        user_id,
        conversation_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_is_stable_across_calls() {
        assert_eq!(
            conversation_key("user1", "conv1"),
            conversation_key("user1", "conv1")
        );
    }

    #[test]
    fn distinct_pairs_produce_distinct_keys() {
        // Adversarial set: ids containing the separator, empty ids, and
        // pairs whose plain concatenations coincide.
        let pairs = [
            ("user1", "conv1"),
            ("user1", "conv2"),
            ("user2", "conv1"),
            ("a:b", "c"),
            ("a", "b:c"),
            ("a:b:c", ""),
            ("", "a:b:c"),
            ("ab", "c"),
            ("a", "bc"),
            ("", ""),
            ("1:", "x"),
            ("1", ":x"),
        ];

        let keys: HashSet<String> = pairs
            .iter()
            .map(|(u, c)| conversation_key(u, c))
            .collect();
        assert_eq!(keys.len(), pairs.len());
    }

    #[test]
    fn key_carries_the_fixed_prefix() {
        assert!(conversation_key("u", "c").starts_with("conversation:"));
    }
}
