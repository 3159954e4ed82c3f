use async_trait::async_trait;
use repairhub_application::IdentitySource;
use repairhub_core::AppResult;
use repairhub_domain::Principal;
use tokio::sync::RwLock;

/// Identity source holding the principal signed in on this process.
#[derive(Debug, Default)]
pub struct StaticIdentitySource {
    principal: RwLock<Option<Principal>>,
}

impl StaticIdentitySource {
    /// Creates a source with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with `principal` signed in.
    #[must_use]
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            principal: RwLock::new(Some(principal)),
        }
    }

    /// Replaces the signed-in principal.
    pub async fn sign_in(&self, principal: Principal) {
        *self.principal.write().await = Some(principal);
    }

    /// Forgets the signed-in principal.
    pub async fn sign_out(&self) {
        *self.principal.write().await = None;
    }
}

#[async_trait]
impl IdentitySource for StaticIdentitySource {
    async fn current_principal(&self) -> AppResult<Option<Principal>> {
        Ok(self.principal.read().await.clone())
    }
}
