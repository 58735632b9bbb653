//! Environment variable abstraction and the upstream credential source.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::mock()`] backed by a `HashMap`, eliminating the need for
//! `unsafe` calls to [`std::env::set_var`] / [`std::env::remove_var`].

use std::collections::HashMap;
use std::sync::Arc;

/// Environment variable reader.
///
/// Wraps lookups so that production code hits `std::env` while tests
/// can supply a controlled set of values.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<Arc<HashMap<String, String>>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(Arc::new(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            )),
        }
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }
}

/// Where the relay finds the upstream API key.
///
/// The key is resolved on every call to [`ApiKeySource::resolve`] and never
/// cached, so setting the variable takes effect on the next request.
#[derive(Clone)]
pub struct ApiKeySource {
    env: Env,
    var_name: String,
}

impl ApiKeySource {
    pub fn new(env: Env, var_name: impl Into<String>) -> Self {
        Self {
            env,
            var_name: var_name.into(),
        }
    }

    /// Name of the variable the key is read from.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    /// Current key, or `None` when the variable is unset or empty.
    pub fn resolve(&self) -> Option<String> {
        self.env
            .var(&self.var_name)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

impl std::fmt::Debug for ApiKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeySource")
            .field("var_name", &self.var_name)
            .finish_non_exhaustive()
    }
}
