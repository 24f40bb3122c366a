//! Start-up bootstrap of the default administrator account.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

use super::error::{HiringError, RepositoryError};
use super::identity::AdminId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminAccount {
    pub id: AdminId,
    pub user_name: String,
    pub email: String,
    pub full_name: String,
}

/// Account storage for administrators. Credential hashing belongs to the adapter.
pub trait AdminRegistry: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, RepositoryError>;
    /// `Conflict` when an account with the same e-mail already exists.
    fn create(
        &self,
        account: AdminAccount,
        credential: &str,
    ) -> Result<AdminAccount, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(AdminAccount),
    AlreadyPresent(AdminAccount),
    /// No credential configured.
    Skipped,
}

/// Creates the configured admin unless one with the same e-mail exists.
///
/// Safe to run on every start and from several instances at once: losing the
/// creation race is reported as `AlreadyPresent`.
pub fn ensure_default_admin<R>(
    registry: &R,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, HiringError>
where
    R: AdminRegistry + ?Sized,
{
    if let Some(existing) = registry.find_by_email(&config.email)? {
        info!(admin_id = %existing.id, "default admin already present");
        return Ok(BootstrapOutcome::AlreadyPresent(existing));
    }

    let Some(credential) = config.password.as_deref() else {
        warn!(
            email = %config.email,
            "APP_ADMIN_PASSWORD not set; skipping default admin bootstrap"
        );
        return Ok(BootstrapOutcome::Skipped);
    };

    let account = AdminAccount {
        id: AdminId(format!("admin-{}", config.user_name.trim().to_ascii_lowercase())),
        user_name: config.user_name.clone(),
        email: config.email.clone(),
        full_name: config.full_name.clone(),
    };

    match registry.create(account, credential) {
        Ok(created) => {
            info!(admin_id = %created.id, email = %created.email, "default admin created");
            Ok(BootstrapOutcome::Created(created))
        }
        Err(RepositoryError::Conflict) => registry
            .find_by_email(&config.email)?
            .map(BootstrapOutcome::AlreadyPresent)
            .ok_or_else(|| {
                HiringError::InvalidState(format!(
                    "admin {} reported as existing but could not be loaded",
                    config.email
                ))
            }),
        Err(other) => Err(other.into()),
    }
}
