use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::RwLock;

use super::seed;
use super::tokens::{generate_token_secret, hash_token};
use crate::model::{Dealership, Outlet, PermissionRecord, Role, User, UserProfile};

pub(super) struct Account {
    pub(super) user: User,
    pub(super) password: String,
}

struct AccessGrant {
    user_id: String,
    issued: Instant,
}

struct RefreshGrant {
    user_id: String,
}

/// Everything the dev backend knows, plus the knobs tests turn.
pub struct DevState {
    pub(super) accounts: RwLock<BTreeMap<String, Account>>,
    pub(super) roles: RwLock<BTreeMap<String, Role>>,
    pub(super) outlets: RwLock<Vec<Outlet>>,
    pub(super) dealerships: RwLock<Vec<Dealership>>,
    pub(super) permission_catalog: Vec<PermissionRecord>,

    // Keyed by token hash.
    access: RwLock<HashMap<String, AccessGrant>>,
    refresh: RwLock<HashMap<String, RefreshGrant>>,
    access_ttl: Option<Duration>,

    next_id: AtomicU64,

    refresh_fails: AtomicBool,
    refresh_delay_ms: AtomicU64,
    flat_refresh_response: AtomicBool,

    login_calls: AtomicU64,
    refresh_calls: AtomicU64,
    requests: AtomicU64,
}

impl DevState {
    pub fn seeded(access_ttl: Option<Duration>) -> Self {
        let permission_catalog = seed::permission_catalog();
        let roles = seed::roles(&permission_catalog);
        let accounts = seed::accounts();
        Self {
            accounts: RwLock::new(
                accounts
                    .into_iter()
                    .map(|a| (a.user.id.clone(), a))
                    .collect(),
            ),
            roles: RwLock::new(roles.into_iter().map(|r| (r.id.clone(), r)).collect()),
            outlets: RwLock::new(seed::outlets()),
            dealerships: RwLock::new(seed::dealerships()),
            permission_catalog,
            access: RwLock::new(HashMap::new()),
            refresh: RwLock::new(HashMap::new()),
            access_ttl,
            next_id: AtomicU64::new(100),
            refresh_fails: AtomicBool::new(false),
            refresh_delay_ms: AtomicU64::new(0),
            flat_refresh_response: AtomicBool::new(false),
            login_calls: AtomicU64::new(0),
            refresh_calls: AtomicU64::new(0),
            requests: AtomicU64::new(0),
        }
    }

    /// Every access token issued so far stops working; refresh cookies stay valid.
    pub async fn expire_access_tokens(&self) {
        let mut access = self.access.write().await;
        let n = access.len();
        access.clear();
        tracing::debug!(expired = n, "expired all access tokens");
    }

    pub fn set_refresh_failure(&self, fail: bool) {
        self.refresh_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.refresh_delay_ms
            .store(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), Ordering::SeqCst);
    }

    /// Answer refreshes with the older `{ accessToken }` body.
    pub fn set_flat_refresh_response(&self, flat: bool) {
        self.flat_refresh_response.store(flat, Ordering::SeqCst);
    }

    pub fn login_calls(&self) -> u64 {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> u64 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// All requests received, on every route.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub(super) fn refresh_fails(&self) -> bool {
        self.refresh_fails.load(Ordering::SeqCst)
    }

    pub(super) fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms.load(Ordering::SeqCst))
    }

    pub(super) fn flat_refresh_response(&self) -> bool {
        self.flat_refresh_response.load(Ordering::SeqCst)
    }

    pub(super) fn count_login(&self) {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn count_refresh(&self) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(super) async fn issue_access_token(&self, user_id: &str) -> Result<String> {
        let secret = generate_token_secret()?;
        self.access.write().await.insert(
            hash_token(&secret),
            AccessGrant {
                user_id: user_id.to_string(),
                issued: Instant::now(),
            },
        );
        Ok(secret)
    }

    pub(super) async fn issue_refresh_token(&self, user_id: &str) -> Result<String> {
        let secret = generate_token_secret()?;
        self.refresh.write().await.insert(
            hash_token(&secret),
            RefreshGrant {
                user_id: user_id.to_string(),
            },
        );
        Ok(secret)
    }

    /// The user id behind a live access token.
    pub(super) async fn access_subject(&self, secret: &str) -> Option<String> {
        let access = self.access.read().await;
        let grant = access.get(&hash_token(secret))?;
        if let Some(ttl) = self.access_ttl
            && grant.issued.elapsed() > ttl
        {
            return None;
        }
        Some(grant.user_id.clone())
    }

    pub(super) async fn refresh_subject(&self, secret: &str) -> Option<String> {
        self.refresh
            .read()
            .await
            .get(&hash_token(secret))
            .map(|g| g.user_id.clone())
    }

    pub(super) async fn revoke_access(&self, secret: &str) {
        self.access.write().await.remove(&hash_token(secret));
    }

    pub(super) async fn revoke_refresh(&self, secret: &str) {
        self.refresh.write().await.remove(&hash_token(secret));
    }

    /// The session view of an account: role name and permission strings
    /// come from its role.
    pub(super) async fn profile(&self, user: &User) -> UserProfile {
        let roles = self.roles.read().await;
        let role = roles.get(&user.role_id);
        UserProfile {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: role.map(|r| r.name.clone()).unwrap_or_default(),
            permissions: role
                .map(|r| r.permissions.iter().map(|p| p.name.clone()).collect())
                .unwrap_or_default(),
            dealership_id: Some(user.dealership_id.clone()),
            outlet_id: user.outlet_id.clone(),
        }
    }

    pub(super) fn permissions_by_id(&self, ids: &[String]) -> Vec<PermissionRecord> {
        self.permission_catalog
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect()
    }
}
