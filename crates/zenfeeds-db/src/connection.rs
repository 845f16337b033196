//! Opening the user-record database.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name inside the data directory.
const DB_FILE_NAME: &str = "zenfeeds.db";

/// How long a write waits while another process holds the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) `zenfeeds.db` under `dir`, or under the default
/// data directory, and migrates it.
///
/// The database runs in WAL mode so a `feeds show` can read while another
/// invocation writes the same record.
///
/// # Errors
///
/// Returns an error if no data directory can be determined, the database
/// cannot be opened, or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let data_dir = match dir {
        Some(d) => d.clone(),
        None => data_dir_from(
            std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create directory {}", data_dir.display()))?;

    let db_path = data_dir.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    let journal_mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to enable WAL")?;

    run_migrations(&conn).context("database migration failed")?;
    tracing::debug!(path = %db_path.display(), journal_mode, "database ready");

    Ok(conn)
}

/// `$XDG_DATA_HOME/zenfeeds`, else `$HOME/.local/share/zenfeeds`.
///
/// A relative `XDG_DATA_HOME` is ignored.
fn data_dir_from(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(xdg) = xdg_data_home.filter(|p| p.is_absolute()) {
        return Ok(xdg.join("zenfeeds"));
    }
    let home = home.context("neither XDG_DATA_HOME nor HOME is set")?;
    Ok(home.join(".local").join("share").join("zenfeeds"))
}
