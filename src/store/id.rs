use std::fmt::{self, Display};
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;

const LAYOUT: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";

/// A generated record identifier in the canonical 36-character
/// version-4 presentation.
///
/// The generator folds a millisecond timestamp (plus a sub-millisecond
/// monotonic reading) into per-character pseudo-random nibbles. This is
/// best-effort uniqueness, not a cryptographic guarantee.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        let mut seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
            .wrapping_add(submillis());

        let mut rng = rand::rng();
        let mut id = String::with_capacity(LAYOUT.len());
        for c in LAYOUT.chars() {
            match c {
                'x' | 'y' => {
                    let r = (seed.wrapping_add(rng.random_range(0..16)) % 16) as u8;
                    seed /= 16;
                    // 'y' carries the 10xx variant bits.
                    let nibble = if c == 'x' { r } else { (r & 0x3) | 0x8 };
                    id.push(char::from_digit(u32::from(nibble), 16).expect("nibble is below 16"));
                }
                literal => id.push(literal),
            }
        }

        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fractional-millisecond reading off the monotonic clock.
fn submillis() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    let start = *START.get_or_init(Instant::now);
    (start.elapsed().as_nanos() % 1_000_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_layout() {
        let id = RecordId::generate();
        let chars: Vec<char> = id.as_str().chars().collect();

        assert_eq!(chars.len(), 36);
        for dash in [8, 13, 18, 23] {
            assert_eq!(chars[dash], '-');
        }
        assert_eq!(chars[14], '4');
        assert!(matches!(chars[19], '8' | '9' | 'a' | 'b'));

        for (index, c) in chars.iter().enumerate() {
            if ![8, 13, 18, 23].contains(&index) {
                assert!(c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
            }
        }
    }

    #[test]
    fn test_best_effort_uniqueness() {
        let ids: HashSet<String> = (0..200)
            .map(|_| RecordId::generate().to_string())
            .collect();
        assert_eq!(ids.len(), 200);
    }
}
