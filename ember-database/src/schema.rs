use sqlx::SqlitePool;

/// Create the profile table and apply additive repair.
///
/// Safe to run on every startup, including against profile files written
/// by deployments that predate the skip column.
pub async fn init_profile_store(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS profiles (
            discord_id INTEGER PRIMARY KEY,
            fid INTEGER,
            location_x INTEGER,
            location_y INTEGER,
            trap_note TEXT,
            avatar_url TEXT,
            skip_link_prompt INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    ensure_skip_column(pool).await
}

/// Older profile tables were created without `skip_link_prompt`.
async fn ensure_skip_column(pool: &SqlitePool) -> anyhow::Result<()> {
    let present: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('profiles') WHERE name = 'skip_link_prompt'",
    )
    .fetch_one(pool)
    .await?;

    if present == 0 {
        sqlx::query("ALTER TABLE profiles ADD COLUMN skip_link_prompt INTEGER NOT NULL DEFAULT 0")
            .execute(pool)
            .await?;
    }

    Ok(())
}
