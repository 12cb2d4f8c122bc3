//! User provisioning: an auth principal plus a profile document per user.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use social::models::UserProfile;
use social::store::put_record;
use social::{DocKey, DocumentStore, IdentityService, NewPrincipal};

use crate::content::{ContentFaker, avatar_url, token};
use crate::report::{Outcome, SeedError, UnitKind};

/// Configuration for user provisioning.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Login ids are `{login_prefix}{index}@{login_domain}`.
    pub login_prefix: String,
    pub login_domain: String,
    /// Placeholder secret shared by every seeded principal.
    pub secret: String,
    /// Maximum bio length in characters.
    pub bio_max_chars: usize,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            login_prefix: "test_user_".to_string(),
            login_domain: "example.com".to_string(),
            secret: "password123".to_string(),
            bio_max_chars: 100,
        }
    }
}

/// Creates principals through the identity service and stores their profiles.
pub struct UserProvisioner {
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn DocumentStore>,
    content: ContentFaker,
    config: UserGenConfig,
}

impl UserProvisioner {
    /// Creates a provisioner with default configuration.
    pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(identity, store, UserGenConfig::default())
    }

    /// Creates a provisioner with custom configuration.
    pub fn with_config(
        identity: Arc<dyn IdentityService>,
        store: Arc<dyn DocumentStore>,
        config: UserGenConfig,
    ) -> Self {
        Self {
            identity,
            store,
            content: ContentFaker::new(),
            config,
        }
    }

    /// Login id for the user at `index`.
    pub fn login_id(&self, index: usize) -> String {
        format!(
            "{}{index}@{}",
            self.config.login_prefix, self.config.login_domain
        )
    }

    /// Provisions up to `count` users.
    ///
    /// Failed units (duplicate login, provider or store errors) are skipped,
    /// so the returned list may be shorter than `count`.
    pub async fn provision(&self, count: usize, rng: &mut impl Rng) -> Outcome<UserProfile> {
        info!("Provisioning {} users...", count);
        let mut outcome = Outcome::new();

        for index in 0..count {
            let login_id = self.login_id(index);
            match self.provision_one(&login_id, rng).await {
                Ok(user) => {
                    debug!(user_id = %user.id, login_id = %login_id, "Created user");
                    outcome.push(user);
                }
                Err(e) => outcome.fail(UnitKind::User, login_id, e),
            }
        }

        info!("Provisioned {} of {} users", outcome.len(), count);
        outcome
    }

    async fn provision_one(
        &self,
        login_id: &str,
        rng: &mut impl Rng,
    ) -> Result<UserProfile, SeedError> {
        let nickname = self.content.name(rng);

        let principal = self
            .identity
            .create_principal(NewPrincipal {
                login_id: login_id.to_string(),
                secret: self.config.secret.clone(),
                display_name: nickname.clone(),
                disabled: false,
            })
            .await?;

        let mut profile = UserProfile {
            id: String::new(),
            email: login_id.to_string(),
            nickname,
            bio: self.content.text(self.config.bio_max_chars, rng),
            avatar_url: avatar_url(token(rng)),
            is_anonymous: false,
        };

        // A principal without a profile is left behind if this write fails.
        profile.id = put_record(
            self.store.as_ref(),
            DocKey::named(principal.id.as_str()),
            &profile,
        )
        .await?;

        Ok(profile)
    }
}
