//! Shared application state and global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;

use devs_core::analytics::MetricStore;
use devs_core::api::service::PublicConfig;
use devs_core::client::GraphqlClient;
use devs_core::content::{Post, User, post_columns, user_columns};
use devs_core::prefs::PreferenceStore;
use devs_core::table::{TableOptions, TableState};

use crate::error::ApiError;

/// Admin tables served under `/api/v1/admin/tables/{table}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableName {
    Posts,
    Users,
}

impl TableName {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TableName::Posts => "posts",
            TableName::Users => "users",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(TableName::Posts),
            "users" => Ok(TableName::Users),
            other => Err(ApiError::NotFound(format!("table {}", other))),
        }
    }
}

pub(crate) struct WebAppInner {
    pub(crate) posts: TableState<Post>,
    pub(crate) users: TableState<User>,
    pub(crate) analytics: MetricStore,
    pub(crate) prefs: PreferenceStore,
    /// Epoch ms of the last successful table refresh.
    pub(crate) last_refresh: Option<i64>,
}

impl WebAppInner {
    pub(crate) fn new(prefs: PreferenceStore, analytics_capacity: usize) -> Self {
        Self {
            posts: TableState::new(post_columns(), TableOptions::default()),
            users: TableState::new(
                user_columns(),
                TableOptions {
                    row_drag: false,
                    ..TableOptions::default()
                },
            ),
            analytics: MetricStore::new(analytics_capacity),
            prefs,
            last_refresh: None,
        }
    }
}

pub(crate) type SharedState = Arc<Mutex<WebAppInner>>;

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) state: SharedState,
    pub(crate) client: Option<GraphqlClient>,
    pub(crate) config: Arc<PublicConfig>,
}

impl AppContext {
    pub(crate) fn lock(&self) -> MutexGuard<'_, WebAppInner> {
        lock_state(&self.state)
    }

    /// The content API client, or 503 when none is configured.
    pub(crate) fn client(&self) -> Result<&GraphqlClient, ApiError> {
        self.client
            .as_ref()
            .ok_or(ApiError::Unavailable("content API not configured"))
    }
}

pub(crate) type AppState = State<AppContext>;

/// Locks shared state, recovering the guard from a poisoned mutex.
pub(crate) fn lock_state(state: &SharedState) -> MutexGuard<'_, WebAppInner> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
