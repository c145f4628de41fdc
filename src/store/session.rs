//! Durable storage for the auth session.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::api::types::SessionUser;

/// A persisted login.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
  pub token: String,
  pub user: Option<SessionUser>,
  pub saved_at: DateTime<Utc>,
}

/// Trait for session storage backends.
pub trait SessionStorage: Send + Sync {
  /// Load the persisted session, if any.
  fn load(&self) -> Result<Option<StoredSession>>;

  /// Replace the persisted session.
  fn save(&self, session: &StoredSession) -> Result<()>;

  /// Forget the persisted session.
  fn clear(&self) -> Result<()>;
}

/// Storage that lives only as long as the process.
/// Used by tests and when persistence is disabled.
#[derive(Default)]
pub struct MemorySessionStorage {
  session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SessionStorage for MemorySessionStorage {
  fn load(&self) -> Result<Option<StoredSession>> {
    let session = self
      .session
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(session.clone())
  }

  fn save(&self, session: &StoredSession) -> Result<()> {
    *self
      .session
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))? = Some(session.clone());
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    *self
      .session
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))? = None;
    Ok(())
  }
}

/// SQLite-based session storage.
pub struct SqliteSessionStorage {
  conn: Mutex<Connection>,
}

/// Single-row table: a client holds at most one session.
const SESSION_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    token TEXT NOT NULL,
    user_json TEXT,
    saved_at TEXT NOT NULL
);
"#;

impl SqliteSessionStorage {
  /// Open the session database at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create the session database at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open session database at {}: {}", path.display(), e))?;

    conn
      .execute_batch(SESSION_SCHEMA)
      .map_err(|e| eyre!("Failed to run session migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("dummydash").join("session.db"))
  }
}

impl SessionStorage for SqliteSessionStorage {
  fn load(&self) -> Result<Option<StoredSession>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(String, Option<String>, String)> = conn
      .query_row(
        "SELECT token, user_json, saved_at FROM session WHERE id = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read session: {}", e))?;

    let (token, user_json, saved_at) = match row {
      Some(row) => row,
      None => return Ok(None),
    };

    // A profile we can no longer parse is dropped, the token still counts
    let user = user_json.and_then(|json| serde_json::from_str(&json).ok());
    let saved_at = DateTime::parse_from_rfc3339(&saved_at)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|e| eyre!("Failed to parse session timestamp '{}': {}", saved_at, e))?;

    Ok(Some(StoredSession {
      token,
      user,
      saved_at,
    }))
  }

  fn save(&self, session: &StoredSession) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let user_json = session
      .user
      .as_ref()
      .map(serde_json::to_string)
      .transpose()
      .map_err(|e| eyre!("Failed to serialize session user: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO session (id, token, user_json, saved_at) VALUES (1, ?, ?, ?)",
        params![session.token, user_json, session.saved_at.to_rfc3339()],
      )
      .map_err(|e| eyre!("Failed to store session: {}", e))?;

    Ok(())
  }

  fn clear(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM session", [])
      .map_err(|e| eyre!("Failed to clear session: {}", e))?;

    Ok(())
  }
}
