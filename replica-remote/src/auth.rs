//! Authenticated clone URLs for platform-side imports.

use replica_core::Secret;

/// Where the platform pulls the initial history from.
#[derive(Debug, Clone)]
pub struct ImportSource {
    /// Plain `http(s)://host/path` clone URL of the origin.
    pub clone_url: String,
    pub username: String,
    pub token: Secret,
}

impl ImportSource {
    pub fn new(clone_url: impl Into<String>, username: impl Into<String>, token: Secret) -> Self {
        Self {
            clone_url: clone_url.into(),
            username: username.into(),
            token,
        }
    }

    /// Clone URL with the credentials embedded. Never log the result.
    pub fn authenticated_url(&self) -> String {
        build_auth_url(&self.clone_url, &self.username, self.token.expose())
    }
}

/// Embed percent-encoded `username:token@` after the scheme of an
/// `http://` or `https://` URL. Any other URL is returned unchanged.
pub fn build_auth_url(url: &str, username: &str, token: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            return format!(
                "{scheme}{}:{}@{rest}",
                urlencoding::encode(username),
                urlencoding::encode(token)
            );
        }
    }
    url.to_string()
}
