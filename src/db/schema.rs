//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `students` table (one student/supervisor pair per row, unique by student email)
///
/// `student_email` compares case-insensitively for both the constraint and lookups.
///
/// `reminder_due_at`/`reminder_sent_at` back the one-shot registration reminder so
/// pending timers can be re-armed after a restart.
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Students (one row per student, unique by student_email)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY NOT NULL,
    student_name TEXT NOT NULL,
    student_email TEXT NOT NULL COLLATE NOCASE,
    supervisor_name TEXT NOT NULL,
    supervisor_email TEXT NOT NULL,
    study_start_date TEXT NOT NULL, -- YYYY-MM-DD
    reminder_due_at TEXT NULL, -- RFC3339
    reminder_sent_at TEXT NULL, -- RFC3339
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(student_email)
);

CREATE INDEX IF NOT EXISTS idx_students_reminder_pending
    ON students(reminder_due_at) WHERE reminder_sent_at IS NULL;
"#;
