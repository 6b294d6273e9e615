use std::fmt;

use crate::config::{is_env_placeholder, Config};

/// Whether a remote-service credential is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable,
}

impl Capability {
    pub fn is_available(self) -> bool {
        self == Capability::Available
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Available => write!(f, "available"),
            Capability::Unavailable => write!(f, "unavailable (mock responses)"),
        }
    }
}

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `abcd…wxyz` style hint for display.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct CredentialResolver {
    credential: Option<Credential>,
}

impl CredentialResolver {
    /// Blank values and unexpanded `${VAR}` / `$VAR` placeholders count as absent.
    pub fn new(raw: Option<&str>) -> Self {
        let credential = raw
            .map(str::trim)
            .filter(|value| !value.is_empty() && !is_env_placeholder(value))
            .map(Credential::new);
        Self { credential }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gemini.api_key.as_deref())
    }

    pub fn resolve(&self) -> Capability {
        if self.credential.is_some() {
            Capability::Available
        } else {
            Capability::Unavailable
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_blank_and_placeholder_are_unavailable() {
        assert_eq!(CredentialResolver::new(None).resolve(), Capability::Unavailable);
        assert_eq!(CredentialResolver::new(Some("   ")).resolve(), Capability::Unavailable);
        assert_eq!(
            CredentialResolver::new(Some("${GEMINI_API_KEY}")).resolve(),
            Capability::Unavailable
        );
        assert_eq!(
            CredentialResolver::new(Some("$GEMINI_API_KEY")).resolve(),
            Capability::Unavailable
        );
    }

    #[test]
    fn real_key_is_available_and_trimmed() {
        let resolver = CredentialResolver::new(Some("  AIzaSyExample  "));
        assert_eq!(resolver.resolve(), Capability::Available);
        assert_eq!(resolver.credential().unwrap().expose(), "AIzaSyExample");
    }

    #[test]
    fn resolves_from_config() {
        let mut config = Config::default();
        config.gemini.api_key = None;
        assert!(!CredentialResolver::from_config(&config).resolve().is_available());

        config.gemini.api_key = Some("key-123".to_string());
        assert!(CredentialResolver::from_config(&config).resolve().is_available());
    }

    #[test]
    fn debug_is_redacted() {
        let credential = Credential::new("AIzaSySecretValue");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert_eq!(credential.masked(), "AIza…alue");
        assert_eq!(Credential::new("short").masked(), "*****");
    }
}
