//! Secret lookup and placeholder substitution.
//!
//! Workflow documents reference credentials with quoted placeholder tokens:
//!
//! ```json
//! { "tools": [{ "config": { "api_key": "{{SENDGRID_API_KEY}}" } }] }
//! ```
//!
//! A [`SecretMap`] is built from the process environment (optionally seeded
//! from a `.env` file) and substituted into the parsed document tree. Only
//! string leaves that are exactly one placeholder are replaced, so a secret
//! containing quotes or braces can never change the document structure.
//!
//! Secrets with an empty value are treated as absent: the placeholder stays in
//! the document and the consuming step decides what to do with it.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

/// Secret names looked up by default when no settings file overrides them.
pub const DEFAULT_SECRET_NAMES: &[&str] = &[
    "COHERE_API_KEY",
    "CLAY_API_KEY",
    "APOLLO_API_KEY",
    "CLEARBIT_KEY",
    "SENDGRID_API_KEY",
    "SHEET_ID",
];

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable (including values loaded from `.env`).
    EnvVar(String),
    /// Supplied directly by the caller.
    Explicit,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::Explicit => write!(f, "explicit"),
        }
    }
}

/// A secret value with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Mapping from secret name to value, used only while resolving a document.
#[derive(Clone, Default)]
pub struct SecretMap {
    secrets: BTreeMap<String, ResolvedSecret>,
}

impl std::fmt::Debug for SecretMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.secrets.iter().map(|(k, v)| (k, &v.source)))
            .finish()
    }
}

impl SecretMap {
    /// Create an empty secret map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a secret map from environment variables.
    ///
    /// When `load_dotenv` is set, a `.env` file in the working directory (or
    /// any parent) is loaded into the environment first. A missing `.env` is
    /// not an error.
    pub fn from_env<S: AsRef<str>>(names: &[S], load_dotenv: bool) -> Self {
        if load_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
                Err(e) => debug!(error = %e, "No .env file loaded"),
            }
        }

        let mut map = Self::new();
        for name in names {
            let name = name.as_ref();
            if let Ok(value) = std::env::var(name) {
                map.secrets.insert(
                    name.to_string(),
                    ResolvedSecret {
                        value,
                        source: SecretSource::EnvVar(name.to_string()),
                    },
                );
            }
        }
        debug!(count = map.len(), "Secrets resolved from environment");
        map
    }

    /// Insert a secret supplied by the caller.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(
            name.into(),
            ResolvedSecret {
                value: value.into(),
                source: SecretSource::Explicit,
            },
        );
    }

    /// Builder-style variant of [`SecretMap::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a secret. Empty values are reported as absent.
    pub fn get(&self, name: &str) -> Option<&ResolvedSecret> {
        self.secrets.get(name).filter(|s| !s.value.is_empty())
    }

    /// Number of entries, including empty ones.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Replace every placeholder leaf in `value` whose secret resolves to a
    /// non-empty value. Returns the number of substitutions made.
    ///
    /// A secret whose value is itself a placeholder is followed to the end of
    /// the chain within the same pass, stopping at a name already visited.
    /// Running this twice with the same map is a no-op the second time.
    pub fn substitute(&self, value: &mut Value) -> usize {
        match value {
            Value::String(s) => match self.resolve_chain(s).map(str::to_string) {
                Some(resolved) => {
                    *s = resolved;
                    1
                }
                None => 0,
            },
            Value::Array(items) => items.iter_mut().map(|v| self.substitute(v)).sum(),
            Value::Object(map) => map.values_mut().map(|v| self.substitute(v)).sum(),
            _ => 0,
        }
    }

    /// Follow `token` through chained secrets. `None` if nothing would change.
    fn resolve_chain<'a>(&'a self, token: &'a str) -> Option<&'a str> {
        let mut visited: Vec<&str> = Vec::new();
        let mut current = token;
        while let Some(name) = placeholder_name(current) {
            if visited.contains(&name) {
                break;
            }
            let Some(secret) = self.get(name) else {
                break;
            };
            visited.push(name);
            current = &secret.value;
        }
        (current != token).then_some(current)
    }
}

/// The placeholder token for a secret name, e.g. `{{SHEET_ID}}`.
pub fn placeholder_token(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// If `s` is exactly one placeholder token, return the secret name inside it.
pub fn placeholder_name(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.is_empty() || inner.contains('{') || inner.contains('}') {
        return None;
    }
    Some(inner)
}

/// Collect the names of placeholders still present in a document tree.
///
/// Names are returned sorted and deduplicated.
pub fn unresolved_placeholders(value: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => {
                if let Some(name) = placeholder_name(s) {
                    out.push(name.to_string());
                }
            }
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut names = Vec::new();
    walk(value, &mut names);
    names.sort();
    names.dedup();
    names
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
