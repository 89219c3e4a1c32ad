//! SQLite job store implementation.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;
use tracing::debug;

use hookcron_protocols::{JobDefinition, JobHandle, JobStatus, JobStore, StoreError};

use crate::schema::{init_schema, JOB_COLUMNS};

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// SQLite-based job store.
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Open (or create) a file-backed database, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Database(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(&path)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!("SqliteJobStore opened at {:?}", path);
        Ok(Self { conn })
    }

    /// Run a single write statement and fail with `NotFound` if it touched
    /// no row.
    async fn execute_one<P>(&self, id: &str, sql: &'static str, params: P) -> Result<(), StoreError>
    where
        P: rusqlite::Params + Send + 'static,
    {
        let changed = self
            .conn
            .call(move |conn| Ok(conn.execute(sql, params)?))
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Raw column values of one `schedule_jobs` row.
struct JobRow {
    job_id: String,
    job_key: Option<i64>,
    status: i64,
    name: String,
    trigger_type: String,
    expression: String,
    http_method: String,
    http_target_url: String,
    http_request_body: String,
    json_web_token: String,
    creation_time: i64,
    update_time: i64,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            job_id: row.get(0)?,
            job_key: row.get(1)?,
            status: row.get(2)?,
            name: row.get(3)?,
            trigger_type: row.get(4)?,
            expression: row.get(5)?,
            http_method: row.get(6)?,
            http_target_url: row.get(7)?,
            http_request_body: row.get(8)?,
            json_web_token: row.get(9)?,
            creation_time: row.get(10)?,
            update_time: row.get(11)?,
        })
    }

    fn into_job(self) -> Result<JobDefinition, StoreError> {
        let status = JobStatus::from_code(self.status).ok_or_else(|| {
            StoreError::Serialization(format!("job {}: invalid status {}", self.job_id, self.status))
        })?;
        let live_handle = match self.job_key {
            Some(raw) => Some(JobHandle::from_i64(raw).ok_or_else(|| {
                StoreError::Serialization(format!("job {}: invalid job key {}", self.job_id, raw))
            })?),
            None => None,
        };

        Ok(JobDefinition {
            creation_time: timestamp(&self.job_id, self.creation_time)?,
            update_time: timestamp(&self.job_id, self.update_time)?,
            id: self.job_id,
            name: self.name,
            trigger_type: self.trigger_type,
            expression: self.expression,
            http_method: self.http_method,
            http_target_url: self.http_target_url,
            http_request_body: self.http_request_body,
            json_web_token: self.json_web_token,
            status,
            live_handle,
        })
    }
}

fn timestamp(job_id: &str, secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        StoreError::Serialization(format!("job {}: invalid timestamp {}", job_id, secs))
    })
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, job: &JobDefinition) -> Result<(), StoreError> {
        let job = job.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO schedule_jobs (job_id, job_key, status, name, trigger_type, expression,
                     http_method, http_target_url, http_request_body, json_web_token, creation_time, update_time)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        job.id,
                        job.live_handle.map(JobHandle::as_i64),
                        job.status.code(),
                        job.name,
                        job.trigger_type,
                        job.expression,
                        job.http_method,
                        job.http_target_url,
                        job.http_request_body,
                        job.json_web_token,
                        job.creation_time.timestamp(),
                        job.update_time.timestamp(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn update(&self, job: &JobDefinition) -> Result<(), StoreError> {
        let job = job.clone();
        let id = job.id.clone();
        self.execute_one(
            &id,
            "UPDATE schedule_jobs SET job_key = ?1, status = ?2, name = ?3, trigger_type = ?4,
             expression = ?5, http_method = ?6, http_target_url = ?7, http_request_body = ?8,
             json_web_token = ?9, update_time = ?10 WHERE job_id = ?11",
            (
                job.live_handle.map(JobHandle::as_i64),
                job.status.code(),
                job.name,
                job.trigger_type,
                job.expression,
                job.http_method,
                job.http_target_url,
                job.http_request_body,
                job.json_web_token,
                job.update_time.timestamp(),
                job.id,
            ),
        )
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.execute_one(
            id,
            "DELETE FROM schedule_jobs WHERE job_id = ?1",
            (id.to_string(),),
        )
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        let id = id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let sql = format!("SELECT {} FROM schedule_jobs WHERE job_id = ?1", JOB_COLUMNS);
                Ok(conn.query_row(&sql, [&id], JobRow::from_row).optional()?)
            })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(JobRow::into_job).transpose()
    }

    async fn list(&self, from: usize, size: Option<usize>) -> Result<Vec<JobDefinition>, StoreError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = size.map(|s| s as i64).unwrap_or(-1);
        let offset = from as i64;

        let rows = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "SELECT {} FROM schedule_jobs ORDER BY rowid LIMIT ?1 OFFSET ?2",
                    JOB_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![limit, offset], JobRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM schedule_jobs", [], |row| row.get(0))?))
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count as usize)
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM schedule_jobs", [])?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn mark_done(&self, id: &str) -> Result<(), StoreError> {
        self.execute_one(
            id,
            "UPDATE schedule_jobs SET status = ?1, job_key = NULL, update_time = ?2 WHERE job_id = ?3",
            (JobStatus::Done.code(), Utc::now().timestamp(), id.to_string()),
        )
        .await
    }

    async fn set_live_handle(&self, id: &str, handle: Option<JobHandle>) -> Result<(), StoreError> {
        self.execute_one(
            id,
            "UPDATE schedule_jobs SET job_key = ?1 WHERE job_id = ?2",
            (handle.map(JobHandle::as_i64), id.to_string()),
        )
        .await
    }
}
