//! SQLite connection helpers.
//!
//! Provides [`connect_sqlite`] that opens a timetable store and applies the
//! PRAGMAs an import relies on: WAL journaling, foreign_keys=ON (cohort and
//! lesson rows reference the reference tables), and a 5000ms busy_timeout so a
//! concurrent reader does not fail the `BEGIN IMMEDIATE` of an import outright.
//!
//! Example:
//! ```no_run
//! use timetable_sync::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("timetable_sync_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open timetable store");
//! ```

use anyhow::{Context, ensure};
use diesel::{
    Connection, QueryableByName, RunQueryDsl, SqliteConnection, connection::SimpleConnection,
    sql_query, sql_types::Integer,
};

const STORE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; \
                             PRAGMA foreign_keys=ON; \
                             PRAGMA busy_timeout=5000;";

#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Open a timetable store and apply connection-wide PRAGMAs.
///
/// Fails if SQLite ignored `foreign_keys=ON`; lesson links would otherwise
/// be free to dangle.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)
        .with_context(|| format!("failed to open timetable store at {database_url}"))?;

    conn.batch_execute(STORE_PRAGMAS)
        .with_context(|| format!("failed to configure timetable store at {database_url}"))?;

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(&mut conn)?;
    ensure!(
        fk.foreign_keys == 1,
        "timetable store at {database_url} does not enforce foreign keys"
    );
    Ok(conn)
}
