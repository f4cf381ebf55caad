//! Postgres-backed record store.
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | StoreError |
//! |------------|---------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` (email / roll number) |
//! | Database (other) | any | `Unavailable` |
//! | PoolTimedOut / PoolClosed / Io | n/a | `Unavailable` |
//! | ColumnDecode / Decode | n/a | `Decode` |
//!
//! The one-mark-per-day rule is the `attendance_student_day_key` unique
//! constraint; a batch is inserted in one transaction so a conflict on any row
//! leaves nothing behind.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{instrument, Span};
use uuid::Uuid;

use classroll_attendance::{AttendanceRecord, AttendanceStatus};
use classroll_auth::{Role, User};
use classroll_broadcast::Message;
use classroll_core::{AttendanceId, MessageId, UserId};

use super::{AttendanceStore, DailyMark, MessageStore, StoreError, StoreResult, UserStore};

const SCHEMA: &str = include_str!("schema.sql");

const EMAIL_CONSTRAINT: &str = "users_email_key";
const ROLL_NUMBER_CONSTRAINT: &str = "users_student_roll_number_key";

/// Postgres-backed store. Cheap to clone (shares the pool).
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresRecordStore {
    #[instrument(skip(self, user), fields(user_id = %user.id, role = %user.role), err)]
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, roll_number, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.roll_number)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e).map(str::to_owned).as_deref() {
            Some(EMAIL_CONSTRAINT) => StoreError::Conflict(user.email.clone()),
            Some(ROLL_NUMBER_CONSTRAINT) => {
                StoreError::Conflict(user.roll_number.clone().unwrap_or_default())
            }
            _ => map_sqlx_error("insert_user", e),
        })?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, roll_number, role, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?
        .map(User::try_from)
        .transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_student_by_roll_number(&self, roll_number: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, roll_number, role, password_hash, created_at
            FROM users
            WHERE role = 'student' AND roll_number = $1
            "#,
        )
        .bind(roll_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_student_by_roll_number", e))?
        .map(User::try_from)
        .transpose()
    }

    #[instrument(skip(self), fields(student_count = tracing::field::Empty), err)]
    async fn list_students(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, roll_number, role, password_hash, created_at
            FROM users
            WHERE role = 'student'
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_students", e))?;

        Span::current().record("student_count", rows.len());
        rows.into_iter().map(User::try_from).collect()
    }
}

#[async_trait]
impl AttendanceStore for PostgresRecordStore {
    #[instrument(skip(self), err)]
    async fn find_attendance_since(
        &self,
        student_id: UserId,
        since: DateTime<Utc>,
    ) -> StoreResult<Option<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, student_id, roll_number, status, created_at
            FROM attendance
            WHERE student_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(student_id.as_uuid())
        .bind(since)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_attendance_since", e))?
        .map(AttendanceRecord::try_from)
        .transpose()
    }

    #[instrument(skip(self, marks), fields(mark_count = marks.len()), err)]
    async fn insert_attendance_batch(&self, marks: Vec<DailyMark>) -> StoreResult<Vec<AttendanceRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut inserted = Vec::with_capacity(marks.len());
        for DailyMark { day, record } in marks {
            // A failed statement aborts the transaction; dropping `tx` rolls back.
            sqlx::query(
                r#"
                INSERT INTO attendance (id, student_id, roll_number, status, attendance_day, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(record.id.as_uuid())
            .bind(record.student_id.as_uuid())
            .bind(&record.roll_number)
            .bind(record.status.as_str())
            .bind(day)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if unique_violation(&e).is_some() {
                    StoreError::Conflict(record.roll_number.clone())
                } else {
                    map_sqlx_error("insert_attendance", e)
                }
            })?;
            inserted.push(record);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(inserted)
    }
}

#[async_trait]
impl MessageStore for PostgresRecordStore {
    #[instrument(skip(self, message), fields(message_id = %message.id), err)]
    async fn insert_message(&self, message: Message) -> StoreResult<Message> {
        let duration = i32::try_from(message.duration_minutes)
            .map_err(|_| StoreError::Decode(format!("duration out of range: {}", message.duration_minutes)))?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, teacher_id, body, start_time, duration_minutes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.teacher_id.as_uuid())
        .bind(&message.body)
        .bind(message.start_time)
        .bind(duration)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_message", e))?;

        Ok(message)
    }

    #[instrument(skip(self), err)]
    async fn list_active_messages(&self, now: DateTime<Utc>) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, teacher_id, body, start_time, duration_minutes
            FROM messages
            WHERE start_time <= $1
              AND start_time + make_interval(mins => duration_minutes) > $1
            ORDER BY start_time DESC, id DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_active_messages", e))?;

        rows.into_iter().map(Message::try_from).collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {}: {}", operation, db_err.message()))
        }
        other @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_)) => {
            StoreError::Decode(format!("{operation}: {other}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

/// Name of the violated constraint if `err` is a unique violation.
fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            Some(db_err.constraint().unwrap_or_default())
        }
        _ => None,
    }
}

// SQLx row types

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    roll_number: Option<String>,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Decode(format!("users.role: {e}")))?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            roll_number: row.roll_number,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: Uuid,
    student_id: Uuid,
    roll_number: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status: AttendanceStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Decode(format!("attendance.status: {e}")))?;
        Ok(AttendanceRecord {
            id: AttendanceId::from_uuid(row.id),
            student_id: UserId::from_uuid(row.student_id),
            roll_number: row.roll_number,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    teacher_id: Uuid,
    body: String,
    start_time: DateTime<Utc>,
    duration_minutes: i32,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let duration_minutes = u32::try_from(row.duration_minutes)
            .map_err(|_| StoreError::Decode(format!("messages.duration_minutes: {}", row.duration_minutes)))?;
        Ok(Message {
            id: MessageId::from_uuid(row.id),
            teacher_id: UserId::from_uuid(row.teacher_id),
            body: row.body,
            start_time: row.start_time,
            duration_minutes,
        })
    }
}
