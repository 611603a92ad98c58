// ── Core identity type ──
//
// Connection configs start life with a client-generated placeholder id and
// are re-keyed with the backend's id once registered. Both kinds are plain
// strings on the wire; `EntityId` classifies them on construction.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PLACEHOLDER_PREFIX: &str = "db_";
const PLACEHOLDER_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ── EntityId ────────────────────────────────────────────────────────

/// Identifier for a Bodhi entity.
///
/// `Placeholder` ids look like `db_<unix-millis>_<random>` and mark a
/// connection config the backend has not registered yet. Everything else
/// is an opaque backend-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityId {
    Placeholder(String),
    Assigned(String),
}

impl EntityId {
    /// Generate a fresh placeholder id: `db_<unix-millis>_<9 base36 chars>`.
    pub fn placeholder() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());

        let mut bits = Uuid::new_v4().as_u128();
        let suffix: String = (0..PLACEHOLDER_SUFFIX_LEN)
            .map(|_| {
                let idx = usize::try_from(bits % 36).unwrap_or_default();
                bits /= 36;
                char::from(BASE36[idx])
            })
            .collect();

        Self::Placeholder(format!("{PLACEHOLDER_PREFIX}{millis}_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Placeholder(s) | Self::Assigned(s) => s,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

/// `db_` followed by one or more digits, `_`, then one or more ASCII
/// alphanumerics.
fn looks_like_placeholder(s: &str) -> bool {
    let Some(rest) = s.strip_prefix(PLACEHOLDER_PREFIX) else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && !suffix.is_empty()
        && suffix.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        if looks_like_placeholder(&s) {
            Self::Placeholder(s)
        } else {
            Self::Assigned(s)
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        match id {
            EntityId::Placeholder(s) | EntityId::Assigned(s) => s,
        }
    }
}
