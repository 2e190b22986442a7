//! Narrow bridge onto the externally-owned game user directory.
//!
//! The directory is populated and leveled by the roster sync tooling;
//! this bot only checks for a FID, inserts a bare row when one is
//! missing, and reads the furnace level for display. Callers treat any
//! error here as "unknown" rather than failing their command.

use crate::database::Database;

/// Create a bare directory row for `fid` if absent.
///
/// Returns whether a row was created. `false` means the FID already had
/// a record before this call, which is the signal that a first link may
/// have historical data worth reconciling. Existing rows are never
/// modified.
pub async fn ensure_global_user(db: &Database, fid: i64) -> anyhow::Result<bool> {
    let created = sqlx::query("INSERT INTO users (fid) VALUES ($1) ON CONFLICT (fid) DO NOTHING")
        .bind(fid)
        .execute(db.users())
        .await?
        .rows_affected();

    Ok(created > 0)
}

pub async fn get_furnace_level(db: &Database, fid: i64) -> anyhow::Result<Option<i64>> {
    let level: Option<i64> = sqlx::query_scalar("SELECT furnace_lv FROM users WHERE fid = $1")
        .bind(fid)
        .fetch_optional(db.users())
        .await?
        .flatten();

    Ok(level)
}
