use sha2::{Digest, Sha256};

/// Final markup of a page and its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub markup: String,
    pub fingerprint: String,
}

impl Content {
    pub fn new(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let fingerprint = fingerprint(&markup);
        Self {
            markup,
            fingerprint,
        }
    }
}

/// Lowercase hex SHA-256 of the exact markup bytes.
pub fn fingerprint(markup: &str) -> String {
    hex::encode(Sha256::digest(markup.as_bytes()))
}
