//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Column list shared by every SELECT, in the order rows are decoded.
pub const JOB_COLUMNS: &str = "job_id, job_key, status, name, trigger_type, expression, \
     http_method, http_target_url, http_request_body, json_web_token, creation_time, update_time";

// Times are Unix seconds. Listing order is rowid order, i.e. insertion order.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schedule_jobs (
    job_id TEXT PRIMARY KEY,
    job_key INTEGER,
    status INTEGER NOT NULL,
    name TEXT NOT NULL,
    trigger_type TEXT NOT NULL,
    expression TEXT NOT NULL,
    http_method TEXT NOT NULL,
    http_target_url TEXT NOT NULL,
    http_request_body TEXT NOT NULL DEFAULT '',
    json_web_token TEXT NOT NULL DEFAULT '',
    creation_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_schedule_jobs_status ON schedule_jobs(status);
"#;
