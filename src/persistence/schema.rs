//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// Creates all six tables idempotently. Safe to call on every startup.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY NOT NULL,
    first_name      TEXT NOT NULL,
    last_name       TEXT,
    username        TEXT,
    locale          TEXT,
    state           TEXT,
    data            TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS workers (
    id              TEXT PRIMARY KEY NOT NULL,
    name            TEXT NOT NULL,
    phone           TEXT NOT NULL UNIQUE,
    skill           TEXT NOT NULL CHECK(skill IN ('none','basic','electrical')),
    task_id         TEXT
);

CREATE TABLE IF NOT EXISTS task_types (
    id              TEXT PRIMARY KEY NOT NULL,
    name            TEXT NOT NULL,
    difficulty      TEXT NOT NULL CHECK(difficulty IN ('easy','medium','hard')),
    UNIQUE(name, difficulty)
);

CREATE TABLE IF NOT EXISTS tasks (
    id              TEXT PRIMARY KEY NOT NULL,
    location        TEXT NOT NULL,
    scheduled_at    TEXT NOT NULL,
    contact         TEXT NOT NULL,
    comment         TEXT,
    payment         INTEGER NOT NULL CHECK(payment > 0),
    type_id         TEXT NOT NULL,
    worker_id       TEXT,
    timeliness      TEXT CHECK(timeliness IN ('on_time','late','very_late','unknown')),
    start_notified  INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS offers (
    worker_id       TEXT NOT NULL,
    message_id      INTEGER NOT NULL,
    task_id         TEXT NOT NULL,
    PRIMARY KEY (worker_id, message_id)
);

CREATE TABLE IF NOT EXISTS reports (
    id                  TEXT PRIMARY KEY NOT NULL,
    task_id             TEXT NOT NULL,
    worker_id           TEXT NOT NULL,
    photo_message_id    INTEGER NOT NULL,
    verdict             TEXT CHECK(verdict IN ('good_job','bad_job','bad_photo')),
    created_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workers_skill ON workers(skill, task_id);
CREATE INDEX IF NOT EXISTS idx_tasks_worker ON tasks(worker_id);
CREATE INDEX IF NOT EXISTS idx_tasks_schedule ON tasks(scheduled_at);
CREATE INDEX IF NOT EXISTS idx_offers_task ON offers(task_id);
CREATE INDEX IF NOT EXISTS idx_reports_task ON reports(task_id);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
