//! Cookie-session issuance and resolution.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::access::Principal;
use crate::application::error::ServiceError;
use crate::application::repos::{NewSession, SessionsRepo};
use crate::application::users::UserService;

pub const METRIC_LOGINS: &str = "postboard_logins_total";
pub const METRIC_LOGIN_FAILURES: &str = "postboard_login_failures_total";

const SOURCE: &str = "application::sessions::SessionService";
const TOKEN_LEN: usize = 64;

/// A freshly issued session. `token` is the only copy of the secret; the
/// store keeps its digest.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionsRepo>,
    users: UserService,
    ttl: Duration,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionsRepo>, users: UserService, ttl: Duration) -> Self {
        Self {
            sessions,
            users,
            ttl,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, ServiceError> {
        let user_id = match self.users.login(username, password).await {
            Ok(user_id) => user_id,
            Err(err) => {
                counter!(METRIC_LOGIN_FAILURES).increment(1);
                return Err(err);
            }
        };

        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc() + self.ttl;
        self.sessions
            .create_session(NewSession {
                token_hash: hash_token(&token),
                user_id,
                expires_at,
            })
            .await?;

        counter!(METRIC_LOGINS).increment(1);
        info!(target = SOURCE, user_id, "session issued");
        Ok(IssuedSession {
            token,
            user_id,
            expires_at,
        })
    }

    /// Identity behind `token`. Malformed, unknown and expired tokens all
    /// resolve to `None`.
    pub async fn resolve(&self, token: &str) -> Result<Option<Principal>, ServiceError> {
        if !is_well_formed(token) {
            return Ok(None);
        }

        let now = OffsetDateTime::now_utc();
        let Some(user_id) = self
            .sessions
            .find_active_session(&hash_token(token), now)
            .await?
        else {
            return Ok(None);
        };

        let roles = self.users.roles(user_id).await?;
        Ok(Some(Principal::new(user_id, roles)))
    }

    /// Revoke the session behind `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        if !is_well_formed(token) {
            return Ok(());
        }
        let removed = self.sessions.delete_session(&hash_token(token)).await?;
        if removed > 0 {
            info!(target = SOURCE, "session revoked");
        }
        Ok(())
    }

    pub async fn purge_expired(&self) -> Result<u64, ServiceError> {
        match self
            .sessions
            .delete_expired_sessions(OffsetDateTime::now_utc())
            .await
        {
            Ok(count) => {
                if count > 0 {
                    info!(target = SOURCE, expired_count = count, "purged expired sessions");
                }
                Ok(count)
            }
            Err(err) => {
                warn!(target = SOURCE, error = %err, "failed to purge expired sessions");
                Err(err.into())
            }
        }
    }
}

/// Run [`SessionService::purge_expired`] every `period` until the returned
/// handle is aborted. Failures are logged by the purge and the sweep carries on.
pub fn spawn_purge_task(service: Arc<SessionService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            let _ = service.purge_expired().await;
        }
    })
}

fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}
