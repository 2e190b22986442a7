use sqlx::SqlitePool;

/// Shared handle over the three SQLite stores, passed across crates.
///
/// Only `profile.sqlite` belongs to this bot. `users.sqlite` is the game
/// directory maintained by the roster sync tooling, and `settings.sqlite`
/// holds the admin allow-list; both are opened here but owned elsewhere,
/// so query modules must treat them as read-mostly and degradable.
#[derive(Clone, Debug)]
pub struct Database {
    profiles: SqlitePool,
    users: SqlitePool,
    settings: SqlitePool,
}

impl Database {
    /// Create a database handle from existing pools.
    pub fn new(profiles: SqlitePool, users: SqlitePool, settings: SqlitePool) -> Self {
        Self {
            profiles,
            users,
            settings,
        }
    }

    /// The profile store this bot owns.
    pub fn profiles(&self) -> &SqlitePool {
        &self.profiles
    }

    /// The externally-owned game user directory.
    pub fn users(&self) -> &SqlitePool {
        &self.users
    }

    /// The externally-owned settings store (admin allow-list).
    pub fn settings(&self) -> &SqlitePool {
        &self.settings
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::Database;

    pub async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool")
    }

    /// Fresh handle with the profile schema applied and empty external stores.
    pub async fn memory_database() -> Database {
        let profiles = memory_pool().await;
        crate::schema::init_profile_store(&profiles)
            .await
            .expect("profile schema");

        let users = memory_pool().await;
        sqlx::query(
            "CREATE TABLE users (
                fid INTEGER PRIMARY KEY,
                nickname TEXT,
                furnace_lv INTEGER,
                kid INTEGER,
                stove_lv_content TEXT,
                alliance TEXT
            )",
        )
        .execute(&users)
        .await
        .expect("users schema");

        let settings = memory_pool().await;
        sqlx::query("CREATE TABLE admin (id INTEGER PRIMARY KEY, is_initial INTEGER)")
            .execute(&settings)
            .await
            .expect("admin schema");

        Database::new(profiles, users, settings)
    }
}
