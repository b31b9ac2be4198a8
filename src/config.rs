use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const CREDENTIAL_KEYS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "api_key"];

pub const DEFAULT_SECRETS_PATH: &str = ".ecosense/secrets.toml";

#[derive(Clone, Default)]
pub struct SecretStore {
    values: BTreeMap<String, String>,
}

impl SecretStore {
    pub fn from_env() -> Self {
        let values = CREDENTIAL_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self { values }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// An explicit `path` must load. The default secrets file is optional:
    /// when it is unreadable or invalid the environment alone is used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_env().overlay(path, Path::new(DEFAULT_SECRETS_PATH))
    }

    pub(crate) fn overlay(self, path: Option<&Path>, default: &Path) -> Result<Self> {
        match path {
            Some(path) => self.merge_file(path),
            None if default.exists() => match self.clone().merge_file(default) {
                Ok(merged) => Ok(merged),
                Err(err) => {
                    warn!(path = %default.display(), error = %format!("{:#}", err), "ignoring secrets file");
                    Ok(self)
                }
            },
            None => Ok(self),
        }
    }

    pub fn merge_file(mut self, path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("cannot read secrets file {:?}", path))?;
        let table: toml::Table = data
            .parse()
            .with_context(|| format!("invalid TOML in secrets file {:?}", path))?;
        let mut merged = 0;
        for (key, value) in table {
            if let toml::Value::String(value) = value {
                self.values.insert(key, value);
                merged += 1;
            }
        }
        debug!(path = %path.display(), merged, "secrets file merged");
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn credential(&self) -> Option<Credential> {
        CREDENTIAL_KEYS.iter().find_map(|key| {
            self.get(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| Credential {
                    key_name: *key,
                    secret: value.to_string(),
                })
        })
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub key_name: &'static str,
    secret: String,
}

impl Credential {
    pub fn new(key_name: &'static str, secret: impl Into<String>) -> Self {
        Self {
            key_name,
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key_name", &self.key_name)
            .field("secret", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_wins() {
        let store = SecretStore::from_pairs([
            ("api_key", "alias-2"),
            ("GOOGLE_API_KEY", "alias-1"),
            ("GEMINI_API_KEY", "primary"),
        ]);
        let credential = store.credential().unwrap();
        assert_eq!(credential.key_name, "GEMINI_API_KEY");
        assert_eq!(credential.secret(), "primary");
    }

    #[test]
    fn blank_values_fall_through_to_aliases() {
        let store = SecretStore::from_pairs([("GEMINI_API_KEY", "  "), ("api_key", "last")]);
        let credential = store.credential().unwrap();
        assert_eq!(credential.key_name, "api_key");
        assert_eq!(credential.secret(), "last");
        assert!(SecretStore::from_pairs([("OTHER", "x")]).credential().is_none());
    }

    #[test]
    fn secrets_file_overrides_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(
            &path,
            "GOOGLE_API_KEY = \"from-file\"\nretries = 3\n[section]\napi_key = \"nested\"\n",
        )
        .unwrap();

        let store = SecretStore::from_pairs([("GOOGLE_API_KEY", "from-env")])
            .merge_file(&path)
            .unwrap();
        assert_eq!(store.get("GOOGLE_API_KEY"), Some("from-file"));
        assert_eq!(store.get("retries"), None);
        assert_eq!(store.get("api_key"), None);
        assert_eq!(store.credential().unwrap().secret(), "from-file");
    }

    #[test]
    fn missing_or_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SecretStore::default().merge_file(&dir.path().join("none.toml")).is_err());
        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "GEMINI_API_KEY = ").unwrap();
        assert!(SecretStore::default().merge_file(&bad).is_err());
    }

    #[test]
    fn broken_default_file_keeps_environment_values() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("secrets.toml");
        fs::write(&default, "GEMINI_API_KEY = ").unwrap();
        let env = SecretStore::from_pairs([("GOOGLE_API_KEY", "from-env")]);

        let store = env.clone().overlay(None, &default).unwrap();
        assert_eq!(store.get("GOOGLE_API_KEY"), Some("from-env"));
        assert_eq!(store.credential().unwrap().key_name, "GOOGLE_API_KEY");

        assert!(env.clone().overlay(Some(&default), &default).is_err());
        let absent = dir.path().join("absent.toml");
        assert_eq!(env.overlay(None, &absent).unwrap().get("GOOGLE_API_KEY"), Some("from-env"));
    }

    #[test]
    fn valid_default_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("secrets.toml");
        fs::write(&default, "api_key = \"file\"\n").unwrap();
        let store = SecretStore::default().overlay(None, &default).unwrap();
        assert_eq!(store.credential().unwrap().secret(), "file");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let store = SecretStore::from_pairs([("GEMINI_API_KEY", "s3cr3t")]);
        assert!(!format!("{:?}", store).contains("s3cr3t"));
        assert!(!format!("{:?}", store.credential().unwrap()).contains("s3cr3t"));
    }
}
