pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a note row directly, bypassing the bridge
    pub async fn insert_test_note(
        pool: &SqlitePool,
        title: &str,
        body: &str,
        published: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO notes (title, body, published) VALUES (?, ?, ?)")
            .bind(title)
            .bind(body)
            .bind(published)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Attach a comment to an existing note
    pub async fn insert_test_comment(
        pool: &SqlitePool,
        note_id: i64,
        author: &str,
        body: &str,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO note_comments (note_id, author, body) VALUES (?, ?, ?)")
                .bind(note_id)
                .bind(author)
                .bind(body)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_test_tag(pool: &SqlitePool, name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
