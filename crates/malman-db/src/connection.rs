use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::schema;

/// A thread safe connection to the database
#[derive(Clone)]
pub struct Connection {
    conn: Arc<Mutex<SqliteConnection>>,
    _handle: Option<Arc<TestHandle>>,
}

/// Removes the test database once the last
/// connection referring to it is gone.
pub struct TestHandle {
    filename: String,
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
}

impl Connection {
    /// Open a connection to the database
    pub async fn open(filename: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(filename)?
            .create_if_missing(true)
            .foreign_keys(true);
        let conn = SqliteConnection::connect_with(&opts).await?;
        tracing::debug!(filename, "opened database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            _handle: None,
        })
    }

    /// Open a new test database connection.
    /// The database will be created on each open.
    pub async fn open_test() -> Self {
        let filename = format!("/tmp/malman_test_{}.sqlite3", rand::random::<u64>());
        let handle = TestHandle {
            filename: filename.clone(),
        };
        let mut conn = Self::open(&filename).await.unwrap();
        conn._handle = Some(Arc::new(handle));

        // Install the schema
        schema::install(&conn).await.unwrap();

        conn
    }

    /// Acquire the underlying connection
    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().await
    }
}
