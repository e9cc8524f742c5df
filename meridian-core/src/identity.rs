use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Session did not resolve to a usable actor: {0}")]
    Unresolved(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Admin,
    ResourceOwner,
}

/// The acting user as asserted by the session layer. Used for audit stamping
/// only; authorization is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_id: String,
    pub display_name: String,
    pub role: ActorRole,
}

impl ActorContext {
    pub fn admin(actor_id: &str, display_name: &str) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            display_name: display_name.to_string(),
            role: ActorRole::Admin,
        }
    }

    pub fn owner(actor_id: &str, display_name: &str) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            display_name: display_name.to_string(),
            role: ActorRole::ResourceOwner,
        }
    }
}

/// Resolves the current session to an actor.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_actor(&self) -> Result<ActorContext, IdentityError>;
}

/// Fixed-identity provider for tests and local development.
pub struct StaticIdentity {
    actor: ActorContext,
}

impl StaticIdentity {
    pub fn new(actor: ActorContext) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_actor(&self) -> Result<ActorContext, IdentityError> {
        if self.actor.actor_id.is_empty() {
            return Err(IdentityError::Unresolved(
                "actor id must not be empty".to_string(),
            ));
        }

        tracing::debug!("Resolved actor {} ({:?})", self.actor.actor_id, self.actor.role);
        Ok(self.actor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_the_configured_actor() {
        let provider = StaticIdentity::new(ActorContext::owner("own-7", "Coast Rentals"));

        let actor = provider.current_actor().await.unwrap();
        assert_eq!(actor.actor_id, "own-7");
        assert_eq!(actor.role, ActorRole::ResourceOwner);
    }

    #[tokio::test]
    async fn an_empty_actor_id_does_not_resolve() {
        let provider = StaticIdentity::new(ActorContext::admin("", "Ghost"));

        let err = provider.current_actor().await.unwrap_err();
        assert!(matches!(err, IdentityError::Unresolved(_)));
    }
}
