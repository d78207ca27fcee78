//! Symmetric key material for one subject.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key material generated for a single subject.
///
/// Key bytes are zeroized on drop. The id distinguishes materials in
/// logs and lets replays detect a re-delivered `Register` command
/// without comparing key bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricMaterial {
    #[zeroize(skip)]
    id: Uuid,
    #[zeroize(skip)]
    algorithm: String,
    key: Vec<u8>,
}

impl SymmetricMaterial {
    pub fn new(algorithm: impl Into<String>, key: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            algorithm: algorithm.into(),
            key,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the algorithm this key was generated for (e.g. `"AES"`).
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn key_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for SymmetricMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key bytes never reach logs.
        f.debug_struct("SymmetricMaterial")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm)
            .field("key", &"<redacted>")
            .finish()
    }
}
