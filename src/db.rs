//! SQLite store for analyzed post tables, with Diesel ORM
//!
//! Every pipeline run becomes one row in `runs` plus one row per post in
//! `post_records`, kept in table order. Summaries are not stored:
//! [`Database::summarize_run`] recomputes them from the rows.

use crate::analyzer::{EmptyInputError, OpinionSummary, PostRecord, SentimentClass};
use crate::schema::{post_records, runs};
use crate::source::timestamp;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_DB_PATH: &str = "postmood.db";

// ============================================================================
// Diesel Models
// ============================================================================

#[derive(Insertable)]
#[diesel(table_name = runs)]
struct NewRun<'a> {
    account: &'a str,
    analyzed_at: &'a str,
    requested_count: i32,
    post_count: i32,
}

/// One stored pipeline run.
#[derive(Queryable, Selectable, Debug, Clone, Serialize)]
#[diesel(table_name = runs)]
pub struct StoredRun {
    pub id: i32,
    pub account: String,
    pub analyzed_at: String,
    pub requested_count: i32,
    pub post_count: i32,
}

#[derive(Insertable)]
#[diesel(table_name = post_records)]
struct NewPostRecord<'a> {
    run_id: i32,
    position: i32,
    post_id: i64,
    text: &'a str,
    text_length: i32,
    created_at: String,
    source: &'a str,
    like_count: i64,
    retweet_count: i64,
    sentiment: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = post_records)]
struct StoredPostRecord {
    post_id: i64,
    text: String,
    text_length: i32,
    created_at: String,
    source: String,
    like_count: i64,
    retweet_count: i64,
    sentiment: i32,
}

impl TryFrom<StoredPostRecord> for PostRecord {
    type Error = DbError;

    fn try_from(row: StoredPostRecord) -> Result<Self> {
        let post_id = row.post_id;
        let corrupt = |what: &str| DbError::Corrupt(format!("post {}: {}", post_id, what));

        Ok(PostRecord {
            id: u64::try_from(row.post_id).map_err(|_| corrupt("negative id"))?,
            text: row.text,
            text_length: usize::try_from(row.text_length).map_err(|_| corrupt("negative length"))?,
            created_at: timestamp::parse(&row.created_at).map_err(|_| corrupt("unreadable timestamp"))?,
            source: row.source,
            like_count: u64::try_from(row.like_count).map_err(|_| corrupt("negative like count"))?,
            retweet_count: u64::try_from(row.retweet_count).map_err(|_| corrupt("negative retweet count"))?,
            sentiment: SentimentClass::from_code(i64::from(row.sentiment))
                .ok_or_else(|| corrupt("unknown sentiment code"))?,
        })
    }
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Database connection wrapper with connection pool
pub struct Database {
    pool: DbPool,
    path: PathBuf,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("corrupt stored row: {0}")]
    Corrupt(String),

    #[error("{field} value {value} does not fit in the database")]
    OutOfRange { field: &'static str, value: u64 },

    #[error("no run with id {0}")]
    RunNotFound(i32),

    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),
}

pub type Result<T> = std::result::Result<T, DbError>;

fn to_i64(field: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| DbError::OutOfRange { field, value })
}

fn to_i32(field: &'static str, value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| DbError::OutOfRange {
        field,
        value: value as u64,
    })
}

impl Database {
    /// Get the default database path
    pub fn db_path() -> PathBuf {
        PathBuf::from(DEFAULT_DB_PATH)
    }

    /// Open database at default path
    pub fn open() -> Result<Self> {
        Self::open_at(DEFAULT_DB_PATH)
    }

    /// Open database at specified path, creating the tables if needed
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool, path };
        db.init_schema()?;
        debug!(path = %db.path.display(), "opened database");
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                account TEXT NOT NULL,
                analyzed_at TEXT NOT NULL,
                requested_count INTEGER NOT NULL,
                post_count INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut conn)?;

        diesel::sql_query(
            r#"
            CREATE TABLE IF NOT EXISTS post_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                run_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                text TEXT NOT NULL,
                text_length INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                source TEXT NOT NULL,
                like_count INTEGER NOT NULL,
                retweet_count INTEGER NOT NULL,
                sentiment INTEGER NOT NULL,
                FOREIGN KEY (run_id) REFERENCES runs(id),
                UNIQUE(run_id, position)
            )
        "#,
        )
        .execute(&mut conn)?;

        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_records_run ON post_records(run_id)").execute(&mut conn)?;
        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_runs_account ON runs(account)").execute(&mut conn)?;

        Ok(())
    }

    // ========================================================================
    // Runs
    // ========================================================================

    /// Store one run and all of its rows atomically. Returns the run id.
    pub fn insert_run(&self, account: &str, requested: usize, records: &[PostRecord]) -> Result<i32> {
        if records.is_empty() {
            return Err(EmptyInputError.into());
        }

        let now = chrono::Local::now().to_rfc3339();
        let new_run = NewRun {
            // Stored as a bare handle; display code adds the '@'
            account: account.trim().trim_start_matches('@'),
            analyzed_at: &now,
            requested_count: to_i32("requested_count", requested)?,
            post_count: to_i32("post_count", records.len())?,
        };

        let mut conn = self.get_conn()?;
        let run_id = conn.transaction::<_, DbError, _>(|conn| {
            diesel::insert_into(runs::table).values(&new_run).execute(conn)?;

            let run_id: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("last_insert_rowid()"))
                .get_result(conn)?;

            let rows = records
                .iter()
                .enumerate()
                .map(|(position, r)| -> Result<NewPostRecord> {
                    Ok(NewPostRecord {
                        run_id,
                        position: to_i32("position", position)?,
                        post_id: to_i64("post_id", r.id)?,
                        text: &r.text,
                        text_length: to_i32("text_length", r.text_length)?,
                        created_at: r.created_at.to_rfc3339(),
                        source: &r.source,
                        like_count: to_i64("like_count", r.like_count)?,
                        retweet_count: to_i64("retweet_count", r.retweet_count)?,
                        sentiment: i32::from(r.sentiment.code()),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            diesel::insert_into(post_records::table).values(&rows).execute(conn)?;
            Ok(run_id)
        })?;

        info!(run_id, account, posts = records.len(), "stored run");
        Ok(run_id)
    }

    /// All runs, newest first
    pub fn get_runs(&self) -> Result<Vec<StoredRun>> {
        let mut conn = self.get_conn()?;
        let runs = runs::table.order(runs::id.desc()).load::<StoredRun>(&mut conn)?;
        Ok(runs)
    }

    pub fn get_run(&self, run_id: i32) -> Result<Option<StoredRun>> {
        let mut conn = self.get_conn()?;
        let run = runs::table
            .filter(runs::id.eq(run_id))
            .first::<StoredRun>(&mut conn)
            .optional()?;
        Ok(run)
    }

    /// A run's rows, in their original table order
    pub fn get_run_records(&self, run_id: i32) -> Result<Vec<PostRecord>> {
        let mut conn = self.get_conn()?;
        let rows = post_records::table
            .filter(post_records::run_id.eq(run_id))
            .order(post_records::position.asc())
            .select(StoredPostRecord::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(PostRecord::try_from).collect()
    }

    /// Recompute a stored run's summary from its rows
    pub fn summarize_run(&self, run_id: i32) -> Result<OpinionSummary> {
        if self.get_run(run_id)?.is_none() {
            return Err(DbError::RunNotFound(run_id));
        }
        let records = self.get_run_records(run_id)?;
        Ok(OpinionSummary::from_records(&records)?)
    }

    /// Remove a run and its rows. Returns false if there was no such run.
    pub fn delete_run(&self, run_id: i32) -> Result<bool> {
        let mut conn = self.get_conn()?;
        conn.transaction::<_, DbError, _>(|conn| {
            diesel::delete(post_records::table.filter(post_records::run_id.eq(run_id))).execute(conn)?;
            let removed = diesel::delete(runs::table.filter(runs::id.eq(run_id))).execute(conn)?;
            Ok(removed > 0)
        })
    }

    /// Remove every run. Returns how many runs were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut conn = self.get_conn()?;
        conn.transaction::<_, DbError, _>(|conn| {
            diesel::delete(post_records::table).execute(conn)?;
            Ok(diesel::delete(runs::table).execute(conn)?)
        })
    }
}
