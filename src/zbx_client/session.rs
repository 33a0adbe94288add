use secrecy::{ExposeSecret, SecretString};

/// First release that accepts `Authorization: Bearer` and deprecates the
/// `auth` request member.
const BEARER_SINCE: (u32, u32) = (6, 4);

/// Authenticated API session, created once at startup and shared by
/// reference with every query.
#[derive(Clone, Debug)]
pub struct Session {
    token: SecretString,
    api_version: String,
}

impl Session {
    #[must_use]
    pub fn new(token: SecretString, api_version: impl Into<String>) -> Self {
        Self {
            token,
            api_version: api_version.into(),
        }
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub(crate) fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub(crate) fn uses_bearer_header(&self) -> bool {
        parse_major_minor(&self.api_version).is_some_and(|version| version >= BEARER_SINCE)
    }
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    Some((major, minor))
}
