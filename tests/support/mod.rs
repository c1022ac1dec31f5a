#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;

use postboard::application::access::Principal;
use postboard::application::credentials::{CredentialError, CredentialHasher};
use postboard::application::posts::PostService;
use postboard::application::repos::{
    CreatePostParams, CreateUserParams, NewSession, PostsRepo, PostsWriteRepo, RepoError,
    SessionsRepo, UniqueKey, UpdatePostParams, UsersRepo,
};
use postboard::application::sessions::SessionService;
use postboard::application::users::UserService;
use postboard::domain::entities::{PostRecord, UserRecord};
use postboard::domain::types::Role;
use postboard::infra::http::{ApiState, SessionCookie};

pub const COOKIE_NAME: &str = "postboard_session";

#[derive(Default)]
struct Tables {
    next_post_id: i64,
    next_user_id: i64,
    posts: BTreeMap<i64, PostRecord>,
    users: BTreeMap<i64, UserRecord>,
    roles: HashMap<i64, Vec<Role>>,
    sessions: HashMap<Vec<u8>, (i64, OffsetDateTime)>,
}

/// In-memory stand-in for every repository, with write counters for
/// asserting that guarded operations had no side effect.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub user_writes: AtomicUsize,
    pub post_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store mutex poisoned")
    }

    pub fn post(&self, id: i64) -> Option<PostRecord> {
        self.tables().posts.get(&id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.tables().sessions.len()
    }

    pub fn post_writes(&self) -> usize {
        self.post_writes.load(Ordering::SeqCst)
    }

    pub fn user_writes(&self) -> usize {
        self.user_writes.load(Ordering::SeqCst)
    }

    /// Insert a post owned by `user_id` without going through the service.
    pub fn seed_post(&self, user_id: i64, title: &str, content: &str) -> i64 {
        let mut tables = self.tables();
        tables.next_post_id += 1;
        let id = tables.next_post_id;
        let now = OffsetDateTime::now_utc();
        tables.posts.insert(
            id,
            PostRecord {
                id,
                user_id,
                title: title.to_string(),
                content: content.to_string(),
                view_count: 0,
                comment_count: 0,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn expire_all_sessions(&self) {
        let past = OffsetDateTime::now_utc() - time::Duration::hours(1);
        for (_, expires_at) in self.tables().sessions.values_mut() {
            *expires_at = past;
        }
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.post(id))
    }

    async fn list_posts(&self, offset: u64, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self
            .tables()
            .posts
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        Ok(self.tables().posts.len() as u64)
    }

    async fn is_owner(&self, post_id: i64, user_id: i64) -> Result<bool, RepoError> {
        Ok(self
            .tables()
            .posts
            .get(&post_id)
            .is_some_and(|post| post.user_id == user_id))
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        self.post_writes.fetch_add(1, Ordering::SeqCst);
        let id = self.seed_post(params.user_id, &params.title, &params.content);
        self.post(id).ok_or(RepoError::NotFound)
    }

    async fn increase_view_count(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut tables = self.tables();
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.view_count += 1;
            post.clone()
        }))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<Option<PostRecord>, RepoError> {
        self.post_writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        Ok(tables.posts.get_mut(&params.id).map(|post| {
            post.title = params.title;
            post.content = params.content;
            post.updated_at = OffsetDateTime::now_utc();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<u64, RepoError> {
        self.post_writes.fetch_add(1, Ordering::SeqCst);
        Ok(u64::from(self.tables().posts.remove(&id).is_some()))
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<i64, RepoError> {
        self.user_writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        if tables.users.values().any(|u| u.username == params.username) {
            return Err(RepoError::Duplicate {
                key: UniqueKey::Username,
            });
        }
        if params.email.is_some() && tables.users.values().any(|u| u.email == params.email) {
            return Err(RepoError::Duplicate {
                key: UniqueKey::Email,
            });
        }

        tables.next_user_id += 1;
        let id = tables.next_user_id;
        tables.users.insert(
            id,
            UserRecord {
                id,
                username: params.username,
                password_hash: params.password_hash,
                nickname: params.nickname,
                email: params.email,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        tables.roles.insert(id, vec![Role::User]);
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<UserRecord>, RepoError> {
        Ok(self
            .tables()
            .users
            .values()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_nickname(&self, id: i64, nickname: &str) -> Result<u64, RepoError> {
        self.user_writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().users.get_mut(&id).map_or(0, |user| {
            user.nickname = nickname.to_string();
            1
        }))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<u64, RepoError> {
        self.user_writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().users.get_mut(&id).map_or(0, |user| {
            user.password_hash = password_hash.to_string();
            1
        }))
    }

    async fn update_email(&self, id: i64, email: Option<&str>) -> Result<u64, RepoError> {
        self.user_writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        if email.is_some()
            && tables
                .users
                .values()
                .any(|u| u.id != id && u.email.as_deref() == email)
        {
            return Err(RepoError::Duplicate {
                key: UniqueKey::Email,
            });
        }
        Ok(tables.users.get_mut(&id).map_or(0, |user| {
            user.email = email.map(str::to_string);
            1
        }))
    }

    async fn delete_user(&self, id: i64) -> Result<u64, RepoError> {
        self.user_writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        if tables.users.remove(&id).is_none() {
            return Ok(0);
        }
        tables.roles.remove(&id);
        tables.sessions.retain(|_, (user_id, _)| *user_id != id);
        tables.posts.retain(|_, post| post.user_id != id);
        Ok(1)
    }

    async fn list_roles(&self, user_id: i64) -> Result<Vec<Role>, RepoError> {
        Ok(self
            .tables()
            .roles
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn grant_role(&self, user_id: i64, role: Role) -> Result<(), RepoError> {
        let mut tables = self.tables();
        let roles = tables.roles.entry(user_id).or_default();
        if !roles.contains(&role) {
            roles.push(role);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionsRepo for MemoryStore {
    async fn create_session(&self, session: NewSession) -> Result<(), RepoError> {
        self.tables()
            .sessions
            .insert(session.token_hash, (session.user_id, session.expires_at));
        Ok(())
    }

    async fn find_active_session(
        &self,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> Result<Option<i64>, RepoError> {
        Ok(self
            .tables()
            .sessions
            .get(token_hash)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(user_id, _)| *user_id))
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<u64, RepoError> {
        Ok(u64::from(self.tables().sessions.remove(token_hash).is_some()))
    }

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError> {
        let mut tables = self.tables();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }
}

/// Reversible stand-in for Argon2 so tests stay fast.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(format!("plain${plaintext}"))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, CredentialError> {
        hash.strip_prefix("plain$")
            .map(|stored| stored == plaintext)
            .ok_or_else(|| CredentialError::MalformedHash(hash.to_string()))
    }
}

pub fn post_service(store: &Arc<MemoryStore>) -> PostService {
    PostService::new(store.clone(), store.clone())
}

pub fn user_service(store: &Arc<MemoryStore>) -> UserService {
    UserService::new(store.clone(), Arc::new(PlainHasher))
}

pub fn session_service(store: &Arc<MemoryStore>) -> SessionService {
    SessionService::new(store.clone(), user_service(store), Duration::from_secs(3600))
}

pub fn api_state(store: &Arc<MemoryStore>) -> ApiState {
    ApiState {
        posts: Arc::new(post_service(store)),
        users: Arc::new(user_service(store)),
        sessions: Arc::new(session_service(store)),
        cookie: Arc::new(SessionCookie {
            name: COOKIE_NAME.to_string(),
            secure: false,
            max_age: Duration::from_secs(3600),
        }),
    }
}

pub fn member(id: i64) -> Principal {
    Principal::new(id, vec![Role::User])
}

pub fn admin(id: i64) -> Principal {
    Principal::new(id, vec![Role::User, Role::Admin])
}
