//! Alias Generation
//!
//! Aliases are fixed-length strings drawn uniformly from a 62-symbol
//! alphanumeric alphabet. The source is `rand`'s thread-local generator,
//! a CSPRNG reseeded from the operating system.
//!
//! Generation never consults the store. Two calls can produce the same alias,
//! and the later `put` then replaces the earlier mapping. At the default
//! length there are 62^6 (about 5.7e10) aliases.

use rand::Rng;

/// The alias alphabet: `A-Z`, `a-z`, `0-9`.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default alias length.
pub const DEFAULT_KEY_LENGTH: usize = 6;

/// Produces random aliases of a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGenerator {
    length: usize,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_LENGTH)
    }
}

impl KeyGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Number of characters in every generated alias.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a new alias.
    ///
    /// # Example
    ///
    /// ```
    /// use quicklink::KeyGenerator;
    ///
    /// let alias = KeyGenerator::new(6).generate();
    /// assert_eq!(alias.len(), 6);
    /// assert!(alias.bytes().all(|b| b.is_ascii_alphanumeric()));
    /// ```
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Returns true if every character of `alias` is in [`ALPHABET`].
    ///
    /// Length is not checked, so aliases issued under a different length
    /// setting still pass.
    pub fn is_valid_alias(alias: &str) -> bool {
        !alias.is_empty() && alias.bytes().all(|b| ALPHABET.contains(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet() {
        assert_eq!(ALPHABET.len(), 62);
        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn test_generate_length() {
        for length in [1, 6, 12, 32] {
            let alias = KeyGenerator::new(length).generate();
            assert_eq!(alias.len(), length);
        }
        assert_eq!(KeyGenerator::default().generate().len(), DEFAULT_KEY_LENGTH);
    }

    #[test]
    fn test_generate_uses_alphabet() {
        let generator = KeyGenerator::default();
        for _ in 0..1000 {
            let alias = generator.generate();
            assert!(KeyGenerator::is_valid_alias(&alias), "bad alias {alias}");
        }
    }

    #[test]
    fn test_generate_covers_alphabet() {
        // 62 symbols over 12_000 draws; a missing symbol is astronomically unlikely
        let generator = KeyGenerator::new(12_000);
        let seen: HashSet<u8> = generator.generate().bytes().collect();
        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn test_generate_is_random() {
        let generator = KeyGenerator::default();
        let aliases: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        // Collisions are possible but 1000 draws from 62^6 should not produce many
        assert!(aliases.len() > 990);
    }

    #[test]
    fn test_is_valid_alias() {
        assert!(KeyGenerator::is_valid_alias("aZ3kQ9"));
        assert!(KeyGenerator::is_valid_alias("x"));
        assert!(!KeyGenerator::is_valid_alias(""));
        assert!(!KeyGenerator::is_valid_alias("ab/cd"));
        assert!(!KeyGenerator::is_valid_alias("abc def"));
        assert!(!KeyGenerator::is_valid_alias("ábcdef"));
    }
}
