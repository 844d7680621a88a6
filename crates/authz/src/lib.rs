//! Request authorization policy.
//!
//! The only complete policy is the development one, where every request is let through and
//! no CSRF token is checked. Any other configuration fails closed: only the configured public
//! path prefixes are reachable.

use bookshelf_kernel::settings::SecuritySettings;

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    #[error("authentication required for {path}")]
    Unauthenticated { path: String },
}

/// Access decision for incoming requests, fixed at startup from configuration.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    permit_all: bool,
    public_paths: Vec<String>,
}

impl SecurityPolicy {
    /// Policy that lets every request through.
    pub fn permit_all() -> Self {
        Self {
            permit_all: true,
            public_paths: Vec::new(),
        }
    }

    /// Policy that only lets the given path prefixes through.
    pub fn locked_down(public_paths: Vec<String>) -> Self {
        Self {
            permit_all: false,
            public_paths,
        }
    }

    pub fn from_settings(settings: &SecuritySettings) -> Self {
        let policy = if settings.permit_all {
            Self::permit_all()
        } else {
            Self::locked_down(settings.public_paths.clone())
        };
        policy.log_summary();
        policy
    }

    pub fn permits_all(&self) -> bool {
        self.permit_all
    }

    /// Decide whether a request for `path` may proceed.
    pub fn authorize(&self, path: &str) -> Result<(), Denied> {
        if self.permit_all || self.is_public(path) {
            return Ok(());
        }
        Err(Denied::Unauthenticated {
            path: path.to_string(),
        })
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| prefix.ends_with('/') || rest.starts_with('/'))
        })
    }

    fn log_summary(&self) {
        if self.permit_all {
            tracing::warn!("security disabled: every request is permitted, CSRF checks off");
        } else {
            tracing::info!(
                public_paths = ?self.public_paths,
                "security locked down: only public paths are reachable"
            );
        }
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self::from_settings(&SecuritySettings::default())
    }
}
