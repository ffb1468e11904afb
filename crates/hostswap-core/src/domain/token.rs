use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

const TOKEN_BYTES: usize = 16;

/// 16 random bytes, URL-safe base64 without padding (22 chars).
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::generate_secure_token;

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let first = generate_secure_token();
        let second = generate_secure_token();
        assert_eq!(first.len(), 22);
        assert_ne!(first, second);
        assert!(first
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'));
    }
}
