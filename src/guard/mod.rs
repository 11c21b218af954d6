use serde::Serialize;

use crate::config::GuardConfig;
use crate::session::SessionToken;

/// Outcome of a guard check for one request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { location: String },
}

/// Prefix-based access gate over a fixed list of protected areas.
///
/// Only checks token presence; whether the token is still honoured is decided
/// by the remote API when it is used.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    prefixes: Vec<String>,
    login_path: String,
}

impl RouteGuard {
    pub fn new<I, S>(prefixes: I, login_path: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .map(|p| normalize_prefix(&p))
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            prefixes,
            login_path: login_path.into(),
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.protected_prefixes.iter().cloned(), config.login_path.clone())
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// True when `path` falls under one of the protected prefixes.
    pub fn is_protected(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| matches_prefix(path, prefix))
    }

    pub fn authorize(&self, path: &str, token: Option<&SessionToken>) -> GuardDecision {
        if !self.is_protected(path) {
            return GuardDecision::Allow;
        }

        match token {
            Some(_) => GuardDecision::Allow,
            None => {
                tracing::debug!("Guard: no session token for protected path {}", path);
                GuardDecision::RedirectToLogin {
                    location: self.login_path.clone(),
                }
            }
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        // A bare "/" would protect everything, including the login page
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// Segment-aware: "/admin" covers "/admin" and "/admin/..." but not "/administrator"
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
