use crate::db::models::{DbStudent, NewStudent, PendingReminder};
use crate::db::schema::SQLITE_INIT;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

const STUDENT_COLUMNS: &str = "id, student_name, student_email, supervisor_name, supervisor_email, \
     study_start_date, reminder_due_at, reminder_sent_at, created_at, updated_at";

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert a student and return its id; duplicate email => `Conflict`.
    Insert(
        NewStudent,
        Option<DateTime<Utc>>,
        RpcReplyPort<Result<i64, AppError>>,
    ),

    /// Fetch a student by email.
    FindByEmail(String, RpcReplyPort<Result<Option<DbStudent>, AppError>>),

    /// Fetch a student by id; unknown id => `NotFound`.
    GetById(i64, RpcReplyPort<Result<DbStudent, AppError>>),

    /// List every student.
    ListAll(RpcReplyPort<Result<Vec<DbStudent>, AppError>>),

    /// Replace all user fields of a student.
    Update(i64, NewStudent, RpcReplyPort<Result<(), AppError>>),

    /// Delete a student by id.
    Delete(i64, RpcReplyPort<Result<(), AppError>>),

    /// Rows with a scheduled but undelivered registration reminder.
    ListPendingReminders(RpcReplyPort<Result<Vec<PendingReminder>, AppError>>),

    /// Stamp `reminder_sent_at`; missing rows are ignored.
    MarkReminderSent(i64, DateTime<Utc>, RpcReplyPort<Result<(), AppError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn insert(
        &self,
        student: NewStudent,
        reminder_due_at: Option<DateTime<Utc>>,
    ) -> Result<i64, AppError> {
        ractor::call!(self.actor, DbActorMessage::Insert, student, reminder_due_at)
            .map_err(|e| AppError::Actor(format!("DbActor Insert RPC failed: {e}")))?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<DbStudent>, AppError> {
        ractor::call!(self.actor, DbActorMessage::FindByEmail, email.to_string())
            .map_err(|e| AppError::Actor(format!("DbActor FindByEmail RPC failed: {e}")))?
    }

    pub async fn get_by_id(&self, id: i64) -> Result<DbStudent, AppError> {
        ractor::call!(self.actor, DbActorMessage::GetById, id)
            .map_err(|e| AppError::Actor(format!("DbActor GetById RPC failed: {e}")))?
    }

    pub async fn list_all(&self) -> Result<Vec<DbStudent>, AppError> {
        ractor::call!(self.actor, DbActorMessage::ListAll)
            .map_err(|e| AppError::Actor(format!("DbActor ListAll RPC failed: {e}")))?
    }

    pub async fn update(&self, id: i64, student: NewStudent) -> Result<(), AppError> {
        ractor::call!(self.actor, DbActorMessage::Update, id, student)
            .map_err(|e| AppError::Actor(format!("DbActor Update RPC failed: {e}")))?
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        ractor::call!(self.actor, DbActorMessage::Delete, id)
            .map_err(|e| AppError::Actor(format!("DbActor Delete RPC failed: {e}")))?
    }

    pub async fn list_pending_reminders(&self) -> Result<Vec<PendingReminder>, AppError> {
        ractor::call!(self.actor, DbActorMessage::ListPendingReminders).map_err(|e| {
            AppError::Actor(format!("DbActor ListPendingReminders RPC failed: {e}"))
        })?
    }

    pub async fn mark_reminder_sent(&self, id: i64, at: DateTime<Utc>) -> Result<(), AppError> {
        ractor::call!(self.actor, DbActorMessage::MarkReminderSent, id, at)
            .map_err(|e| AppError::Actor(format!("DbActor MarkReminderSent RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::Insert(student, due, reply) => {
                let res = self.insert(&state.pool, student, due).await;
                let _ = reply.send(res);
            }
            DbActorMessage::FindByEmail(email, reply) => {
                let res = self.find_by_email(&state.pool, &email).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetById(id, reply) => {
                let res = self.get_by_id(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListAll(reply) => {
                let res = self.list_all(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Update(id, student, reply) => {
                let res = self.update(&state.pool, id, student).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Delete(id, reply) => {
                let res = self.delete(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListPendingReminders(reply) => {
                let res = self.list_pending_reminders(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::MarkReminderSent(id, at, reply) => {
                let res = self.mark_reminder_sent(&state.pool, id, at).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn insert(
        &self,
        pool: &SqlitePool,
        student: NewStudent,
        reminder_due_at: Option<DateTime<Utc>>,
    ) -> Result<i64, AppError> {
        let now = Utc::now();
        let email = student.student_email.clone();
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO students (
            student_name, student_email, supervisor_name, supervisor_email, study_start_date,
            reminder_due_at, reminder_sent_at, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?)
        RETURNING id
        "#,
        )
        .bind(student.student_name)
        .bind(student.student_email)
        .bind(student.supervisor_name)
        .bind(student.supervisor_email)
        .bind(student.study_start_date)
        .bind(reminder_due_at)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| conflict_or_db(e, &email))?;

        debug!(id, student_email = %email, "student inserted");
        Ok(id)
    }

    async fn find_by_email(
        &self,
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<DbStudent>, AppError> {
        let row = sqlx::query_as::<_, DbStudent>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE student_email = ?"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn get_by_id(&self, pool: &SqlitePool, id: i64) -> Result<DbStudent, AppError> {
        sqlx::query_as::<_, DbStudent>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student not found for id={id}")))
    }

    async fn list_all(&self, pool: &SqlitePool) -> Result<Vec<DbStudent>, AppError> {
        let rows = sqlx::query_as::<_, DbStudent>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        student: NewStudent,
    ) -> Result<(), AppError> {
        let updated_at = Utc::now();
        let email = student.student_email.clone();
        let res = sqlx::query(
            r#"
            UPDATE students
            SET
                student_name = ?,
                student_email = ?,
                supervisor_name = ?,
                supervisor_email = ?,
                study_start_date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(student.student_name)
        .bind(student.student_email)
        .bind(student.supervisor_name)
        .bind(student.supervisor_email)
        .bind(student.study_start_date)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| conflict_or_db(e, &email))?;

        let affected = res.rows_affected();
        debug!(id, affected, updated_at = %updated_at, "student update applied");

        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "Student not found for id={id}"
            )));
        }
        Ok(())
    }

    async fn delete(&self, pool: &SqlitePool, id: i64) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Student not found for id={id}"
            )));
        }
        debug!(id, "student deleted");
        Ok(())
    }

    async fn list_pending_reminders(
        &self,
        pool: &SqlitePool,
    ) -> Result<Vec<PendingReminder>, AppError> {
        let rows = sqlx::query_as::<_, PendingReminder>(
            r#"
        SELECT id, reminder_due_at
        FROM students
        WHERE reminder_due_at IS NOT NULL AND reminder_sent_at IS NULL
        ORDER BY reminder_due_at
        "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn mark_reminder_sent(
        &self,
        pool: &SqlitePool,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET reminder_sent_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// The UNIQUE(student_email) constraint is the only source of conflicts.
fn conflict_or_db(err: sqlx::Error, email: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("A student with email {email} already exists!"))
        }
        _ => AppError::Database(err),
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
