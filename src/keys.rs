// =============================================================================
// Exchange credentials
// =============================================================================
//
// SECURITY: the secret key is never logged. `Debug` and `Display` both redact
// it. The keys are loaded once and are not attached to any request.
// =============================================================================

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;

/// Immutable API key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Keys {
    pub public_key: String,
    pub secret_key: String,
}

/// On-disk shape. Both fields are optional here so that a missing key is
/// reported as `MissingField` instead of a generic parse failure.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyFile {
    public_key: Option<String>,
    secret_key: Option<String>,
}

impl Keys {
    /// Read a JSON document `{ "public_key": "...", "secret_key": "..." }`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file: KeyFile = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let missing = |field| ConfigError::MissingField {
            path: path.to_path_buf(),
            field,
        };
        let public_key = file.public_key.ok_or_else(|| missing("public_key"))?;
        let secret_key = file.secret_key.ok_or_else(|| missing("secret_key"))?;

        info!(path = %path.display(), "api keys loaded");
        Ok(Self {
            public_key,
            secret_key,
        })
    }
}

impl Keys {
    /// What stands in for the secret when the keys are shown.
    fn secret_marker(&self) -> &'static str {
        if self.secret_key.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        }
    }
}

impl std::fmt::Debug for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_marker())
            .finish()
    }
}

impl std::fmt::Display for Keys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Keys(public_key='{}', secret_key={})",
            self.public_key,
            self.secret_marker()
        )
    }
}
