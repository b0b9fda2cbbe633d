//! Background refresh of the admin tables from the content API.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use devs_core::client::{ClientError, GraphqlClient, PostFilter};
use devs_core::content::{Post, User};
use devs_core::table::{TableRow, TableState};

use crate::state::{SharedState, lock_state, now_epoch_ms};

/// Page size used when pulling posts for the admin table.
const FETCH_PAGE_SIZE: u32 = 100;
/// Upper bound on posts loaded into the admin table.
const MAX_TABLE_POSTS: usize = 5_000;

/// Pulls posts and users on every tick and swaps them into the tables.
/// Missed ticks are skipped; a failed refresh keeps the previous data.
pub(crate) async fn refresh_loop(state: SharedState, client: GraphqlClient, interval: Duration) {
    let mut tick = tokio::time::interval(interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut refresh_count: u64 = 0;

    loop {
        tick.tick().await;

        let t0 = Instant::now();
        let (posts, users) = tokio::join!(fetch_all_posts(&client), client.users());
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        let mut inner = lock_state(&state);
        let mut ok = true;
        match posts {
            Ok(posts) => {
                let n = posts.len();
                if replace_if_changed(&mut inner.posts, posts) {
                    debug!(rows = n, "posts table updated");
                }
            }
            Err(e) => {
                ok = false;
                warn!(error = %e, "posts refresh failed");
            }
        }
        match users {
            Ok(users) => {
                let n = users.len();
                if replace_if_changed(&mut inner.users, users) {
                    debug!(rows = n, "users table updated");
                }
            }
            Err(e) => {
                ok = false;
                warn!(error = %e, "users refresh failed");
            }
        }
        if ok {
            inner.last_refresh = Some(now_epoch_ms());
            refresh_count += 1;
            if refresh_count == 1 {
                info!(
                    duration_ms = elapsed_ms,
                    posts = inner.posts.rows().len(),
                    users = inner.users.rows().len(),
                    "admin tables loaded"
                );
            }
        }
    }
}

/// Replaces table data only when it differs. `set_data` clears the selection, so
/// unchanged refreshes must not call it.
fn replace_if_changed<T: TableRow + PartialEq>(table: &mut TableState<T>, rows: Vec<T>) -> bool {
    if table.rows() == rows.as_slice() {
        return false;
    }
    table.set_data(rows);
    true
}

async fn fetch_all_posts(client: &GraphqlClient) -> Result<Vec<Post>, ClientError> {
    let filter = PostFilter::default();
    let mut all: Vec<Post> = Vec::new();
    let mut page = 1u32;
    loop {
        let result = client.posts(&filter, page, FETCH_PAGE_SIZE).await?;
        let fetched = result.items.len();
        all.extend(result.items);
        let total = result.total.max(0) as usize;
        if fetched == 0 || all.len() >= total.min(MAX_TABLE_POSTS) {
            break;
        }
        page += 1;
    }
    all.truncate(MAX_TABLE_POSTS);
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use devs_core::content::{Role, user_columns};
    use devs_core::table::TableOptions;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            name: name.into(),
            email: format!("{id}@example.com"),
            role: Role::Author,
            avatar: None,
            bio: None,
            post_count: 0,
            created_at: chrono::Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn unchanged_refresh_keeps_selection() {
        let mut table = TableState::new(user_columns(), TableOptions::default());
        assert!(replace_if_changed(&mut table, vec![user("a", "Ada"), user("b", "Bo")]));
        table.toggle_row(&"a".to_string()).unwrap();

        assert!(!replace_if_changed(&mut table, vec![user("a", "Ada"), user("b", "Bo")]));
        assert!(table.is_selected(&"a".to_string()));

        assert!(replace_if_changed(&mut table, vec![user("a", "Ada L."), user("b", "Bo")]));
        assert!(table.selection().is_empty());
    }
}
