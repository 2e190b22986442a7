use tracing::warn;

use crate::database::Database;

/// Whether `user_id` is on the admin allow-list.
///
/// The settings store belongs to another tool and may be missing or
/// unreadable; every failure resolves to `false` so a broken store can
/// never grant elevated access.
pub async fn is_admin(db: &Database, user_id: u64) -> bool {
    let Ok(user_id_i64) = i64::try_from(user_id) else {
        return false;
    };

    let found: Result<Option<i64>, sqlx::Error> =
        sqlx::query_scalar("SELECT id FROM admin WHERE id = $1")
            .bind(user_id_i64)
            .fetch_optional(db.settings())
            .await;

    match found {
        Ok(row) => row.is_some(),
        Err(err) => {
            warn!(?err, user_id, "admin store lookup failed; denying");
            false
        }
    }
}
