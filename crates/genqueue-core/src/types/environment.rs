//! Submission environments and the result namespaces they map to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EnvironmentsConfig;

/// Environment a prompt is submitted for.
///
/// Only two tokens are recognised; anything else falls back to [`Environment::Uat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    /// User-acceptance testing.
    Uat,
    /// Production.
    Prod,
}

impl Environment {
    /// Resolve a caller-supplied token. Matching ignores ASCII case.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("PROD") {
            Self::Prod
        } else {
            Self::Uat
        }
    }

    /// Canonical token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uat => "UAT",
            Self::Prod => "PROD",
        }
    }

    /// Result namespace for this environment.
    pub fn namespace(&self, config: &EnvironmentsConfig) -> Namespace {
        match self {
            Self::Uat => Namespace(config.uat_namespace.clone()),
            Self::Prod => Namespace(config.prod_namespace.clone()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a durable result location (a Postgres schema).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap a namespace name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted SQL identifier. Embedded quotes are doubled.
    pub fn quoted_ident(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
