use anyhow::Context as _;

use crate::database::Database;
use crate::model::profile::{Profile, ProfilePatch};

#[derive(sqlx::FromRow)]
struct ProfileRow {
    discord_id: i64,
    fid: Option<i64>,
    location_x: Option<i64>,
    location_y: Option<i64>,
    trap_note: Option<String>,
    avatar_url: Option<String>,
    skip_link_prompt: bool,
}

pub async fn get_profile(db: &Database, owner_id: u64) -> anyhow::Result<Option<Profile>> {
    let owner_id_i64 = i64::try_from(owner_id).context("owner_id out of i64 range")?;

    let row: Option<ProfileRow> = sqlx::query_as(
        "SELECT discord_id, fid, location_x, location_y, trap_note, avatar_url, skip_link_prompt
         FROM profiles
         WHERE discord_id = $1",
    )
    .bind(owner_id_i64)
    .fetch_optional(db.profiles())
    .await?;

    row.map(to_profile).transpose()
}

/// Insert-or-update a profile row in a single statement.
///
/// Fields absent from the patch keep their current value on an existing
/// row and stay NULL on a new one. The conflict clause is what makes
/// first writes safe when two invocations race on the same owner: both
/// land on one row instead of the loser hitting a duplicate key.
pub async fn upsert_profile(
    db: &Database,
    owner_id: u64,
    patch: ProfilePatch,
) -> anyhow::Result<()> {
    let owner_id_i64 = i64::try_from(owner_id).context("owner_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO profiles (discord_id, fid, location_x, location_y, trap_note, avatar_url)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (discord_id) DO UPDATE SET
            fid = COALESCE(excluded.fid, fid),
            location_x = COALESCE(excluded.location_x, location_x),
            location_y = COALESCE(excluded.location_y, location_y),
            trap_note = COALESCE(excluded.trap_note, trap_note),
            avatar_url = COALESCE(excluded.avatar_url, avatar_url)",
    )
    .bind(owner_id_i64)
    .bind(patch.fid)
    .bind(patch.location_x)
    .bind(patch.location_y)
    .bind(patch.trap_note)
    .bind(patch.avatar_url)
    .execute(db.profiles())
    .await?;

    Ok(())
}

pub async fn is_link_prompt_skipped(db: &Database, owner_id: u64) -> anyhow::Result<bool> {
    let owner_id_i64 = i64::try_from(owner_id).context("owner_id out of i64 range")?;

    let flag: Option<bool> =
        sqlx::query_scalar("SELECT skip_link_prompt FROM profiles WHERE discord_id = $1")
            .bind(owner_id_i64)
            .fetch_optional(db.profiles())
            .await?;

    Ok(flag.unwrap_or(false))
}

/// Sticky opt-out of the first-link merge prompt. Idempotent.
pub async fn set_link_prompt_skipped(db: &Database, owner_id: u64) -> anyhow::Result<()> {
    let owner_id_i64 = i64::try_from(owner_id).context("owner_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO profiles (discord_id, skip_link_prompt)
         VALUES ($1, 1)
         ON CONFLICT (discord_id) DO UPDATE SET skip_link_prompt = 1",
    )
    .bind(owner_id_i64)
    .execute(db.profiles())
    .await?;

    Ok(())
}

fn to_profile(row: ProfileRow) -> anyhow::Result<Profile> {
    Ok(Profile {
        owner_id: u64::try_from(row.discord_id).context("discord_id row out of u64 range")?,
        fid: row.fid,
        location_x: row.location_x,
        location_y: row.location_y,
        trap_note: row.trap_note,
        avatar_url: row.avatar_url,
        skip_link_prompt: row.skip_link_prompt,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

    use crate::database::Database;
    use crate::database::test_support::{memory_database, memory_pool};
    use crate::model::profile::ProfilePatch;

    use super::{get_profile, is_link_prompt_skipped, set_link_prompt_skipped, upsert_profile};

    #[tokio::test]
    async fn first_write_leaves_other_fields_unset() {
        let db = memory_database().await;

        upsert_profile(
            &db,
            11,
            ProfilePatch {
                location_x: Some(120),
                location_y: Some(455),
                ..ProfilePatch::default()
            },
        )
        .await
        .expect("upsert");

        let profile = get_profile(&db, 11).await.expect("get").expect("row");
        assert_eq!(profile.location_x, Some(120));
        assert_eq!(profile.location_y, Some(455));
        assert_eq!(profile.fid, None);
        assert_eq!(profile.trap_note, None);
        assert_eq!(profile.avatar_url, None);
        assert!(!profile.skip_link_prompt);
    }

    #[tokio::test]
    async fn missing_owner_has_no_row() {
        let db = memory_database().await;
        assert!(get_profile(&db, 404).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn disjoint_patches_commute() {
        let db = memory_database().await;

        let fid_patch = ProfilePatch {
            fid: Some(4242),
            ..ProfilePatch::default()
        };
        let note_patch = ProfilePatch {
            trap_note: Some("Saturdays 20:00 UTC".to_owned()),
            ..ProfilePatch::default()
        };

        upsert_profile(&db, 1, fid_patch.clone()).await.expect("a");
        upsert_profile(&db, 1, note_patch.clone()).await.expect("b");

        upsert_profile(&db, 2, note_patch).await.expect("b first");
        upsert_profile(&db, 2, fid_patch).await.expect("a second");

        let first = get_profile(&db, 1).await.expect("get").expect("row");
        let second = get_profile(&db, 2).await.expect("get").expect("row");
        assert_eq!(first.fid, second.fid);
        assert_eq!(first.trap_note, second.trap_note);
        assert_eq!(first.location_x, second.location_x);
        assert_eq!(first.avatar_url, second.avatar_url);
    }

    #[tokio::test]
    async fn skip_flag_is_sticky_and_idempotent() {
        let db = memory_database().await;

        assert!(!is_link_prompt_skipped(&db, 5).await.expect("default"));

        set_link_prompt_skipped(&db, 5).await.expect("first set");
        set_link_prompt_skipped(&db, 5).await.expect("second set");
        assert!(is_link_prompt_skipped(&db, 5).await.expect("after set"));

        // Later field writes must not reset the opt-out.
        upsert_profile(
            &db,
            5,
            ProfilePatch {
                fid: Some(9),
                ..ProfilePatch::default()
            },
        )
        .await
        .expect("upsert after flag");
        assert!(is_link_prompt_skipped(&db, 5).await.expect("after upsert"));
    }

    #[tokio::test]
    async fn concurrent_first_writes_produce_a_single_row() {
        let path = std::env::temp_dir().join(format!(
            "ember-profiles-concurrency-{}.sqlite",
            std::process::id()
        ));
        let _ = tokio::fs::remove_file(&path).await;

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let profiles = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .expect("file pool");
        crate::schema::init_profile_store(&profiles)
            .await
            .expect("schema");

        let db = Database::new(profiles, memory_pool().await, memory_pool().await);

        let mut handles = Vec::new();
        for n in 0..8_i64 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                upsert_profile(
                    &db,
                    999,
                    ProfilePatch {
                        fid: Some(n + 1),
                        ..ProfilePatch::default()
                    },
                )
                .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("no caller sees an error");
        }

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE discord_id = 999")
            .fetch_one(db.profiles())
            .await
            .expect("count");
        assert_eq!(rows, 1);

        db.profiles().close().await;
        let _ = tokio::fs::remove_file(&path).await;
    }
}
