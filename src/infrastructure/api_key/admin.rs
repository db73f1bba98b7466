//! Shared-secret authority for administrative operations

/// Validates the single administrative secret
///
/// The comparison is a plain equality check with no lockout or throttling.
#[derive(Clone)]
pub struct AdminAuthority {
    secret: String,
}

impl AdminAuthority {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Whether an admin secret has been configured at all
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// An unconfigured authority rejects every secret, including the empty one
    pub fn validate(&self, supplied: &str) -> bool {
        self.is_configured() && supplied == self.secret
    }
}

impl std::fmt::Debug for AdminAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuthority")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_matching_secret() {
        let authority = AdminAuthority::new("admin-secret");

        assert!(authority.validate("admin-secret"));
        assert!(!authority.validate("admin-secret "));
        assert!(!authority.validate("wrong"));
        assert!(!authority.validate(""));
    }

    #[test]
    fn test_unconfigured_rejects_everything() {
        let authority = AdminAuthority::new("");

        assert!(!authority.is_configured());
        assert!(!authority.validate(""));
        assert!(!authority.validate("anything"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let authority = AdminAuthority::new("top-secret");
        let debug = format!("{:?}", authority);

        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("configured: true"));
    }
}
