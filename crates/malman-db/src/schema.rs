use anyhow::Result;
use sqlx::Executor;

use crate::Connection;

/// Install the database schema.
pub async fn install(conn: &Connection) -> Result<()> {
    let mut conn = conn.lock().await;
    let schema_data = include_str!("../db/schema.sql");
    tracing::debug!("installing database schema");
    (&mut *conn).execute(schema_data).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_is_repeatable() {
        let conn = Connection::open_test().await;
        // The schema is already installed, a second
        // install must not fail.
        install(&conn).await.unwrap();
    }
}
