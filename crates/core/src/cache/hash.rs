//! Request identity keys.

use sha2::{Digest, Sha256};

/// Compute the identity key of a request within a region.
///
/// Two requests share an entry exactly when method and full URL match.
pub fn request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let a = request_key("GET", "https://roamaxa.app/");
        let b = request_key("GET", "https://roamaxa.app/");
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_method_case_insensitive() {
        assert_eq!(request_key("get", "https://roamaxa.app/"), request_key("GET", "https://roamaxa.app/"));
    }

    #[test]
    fn test_key_includes_query() {
        let plain = request_key("GET", "https://roamaxa.app/jsonassets/places.json");
        let busted = request_key("GET", "https://roamaxa.app/jsonassets/places.json?v=2");
        assert_ne!(plain, busted);
    }

    #[test]
    fn test_key_format() {
        let key = request_key("GET", "https://roamaxa.app/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
