//! SQLite store backed by `sqlx`.
//!
//! Schema lives in `migrations/` and is applied on connect. Choice options and
//! submitted answers are stored as JSON text.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::{FromRow, Sqlite, Transaction};

use quizdeck_core::error::QuizError;
use quizdeck_core::model::{
    Answers, NewQuestion, NewQuiz, NewUser, Question, QuestionType, Quiz, QuizId, QuizUpdate,
    Role, Submission, User, UserId,
};
use quizdeck_core::traits::{
    Grader, QuizStore, RecordedSubmission, SubmissionStore, UserStore,
};

#[derive(Debug, FromRow)]
struct QuizRow {
    id: i64,
    title: String,
    description: Option<String>,
    created_by: i64,
    created_at: DateTime<Utc>,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct QuestionRow {
    id: i64,
    quiz_id: i64,
    question_text: String,
    question_type: String,
    options: String,
    correct_answer: String,
    points: i64,
    position: i64,
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: i64,
    user_id: Option<i64>,
    quiz_id: i64,
    participant_name: Option<String>,
    answers: String,
    score: i64,
    total_points: i64,
    submitted_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl QuestionRow {
    fn into_question(self) -> Result<Question> {
        let options: Vec<String> = serde_json::from_str(&self.options)
            .with_context(|| format!("corrupt options for question {}", self.id))?;
        Ok(Question {
            id: self.id,
            quiz_id: self.quiz_id,
            question_text: self.question_text,
            question_type: QuestionType::from_stored(&self.question_type),
            options,
            correct_answer: self.correct_answer,
            points: u32::try_from(self.points).unwrap_or(0),
            order: i32::try_from(self.position).unwrap_or(i32::MAX),
        })
    }
}

impl QuizRow {
    fn into_quiz(self, questions: Vec<Question>) -> Quiz {
        Quiz {
            id: self.id,
            title: self.title,
            description: self.description,
            created_by: self.created_by,
            created_at: self.created_at,
            is_active: self.is_active,
            questions,
        }
    }
}

impl SubmissionRow {
    fn into_submission(self) -> Result<Submission> {
        let answers: Answers = serde_json::from_str(&self.answers)
            .with_context(|| format!("corrupt answers for submission {}", self.id))?;
        Ok(Submission {
            id: self.id,
            user_id: self.user_id,
            quiz_id: self.quiz_id,
            participant_name: self.participant_name,
            answers,
            score: u64::try_from(self.score).unwrap_or(0),
            total_points: u64::try_from(self.total_points).unwrap_or(0),
            submitted_at: self.submitted_at,
        })
    }
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let role = Role::from_str(&self.role).map_err(anyhow::Error::msg)?;
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

const QUIZ_COLUMNS: &str = "id, title, description, created_by, created_at, is_active";
const QUESTION_COLUMNS: &str =
    "id, quiz_id, question_text, question_type, options, correct_answer, points, position";
const SUBMISSION_COLUMNS: &str =
    "id, user_id, quiz_id, participant_name, answers, score, total_points, submitted_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// How long a connection waits for another writer before failing with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// A store persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url`, creating the file if needed, and apply
    /// migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` is its own database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database: {database_url}"))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        tracing::info!(database_url, "database ready");
        Ok(store)
    }

    /// Wrap an existing pool. Migrations are not applied.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction that holds the write lock from its first read,
    /// so concurrent writers queue on `busy_timeout` instead of failing.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .context("failed to start write transaction")
    }
}

async fn fetch_quiz(conn: &mut SqliteConnection, id: QuizId) -> Result<Option<Quiz>> {
    let row: Option<QuizRow> =
        sqlx::query_as(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let questions: Vec<QuestionRow> = sqlx::query_as(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = ? ORDER BY position, id"
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;
    let questions = questions
        .into_iter()
        .map(QuestionRow::into_question)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(row.into_quiz(questions)))
}

async fn insert_questions(
    conn: &mut SqliteConnection,
    quiz_id: QuizId,
    questions: &[NewQuestion],
) -> Result<()> {
    for q in questions {
        sqlx::query(
            "INSERT INTO questions \
             (quiz_id, question_text, question_type, options, correct_answer, points, position) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(quiz_id)
        .bind(&q.question_text)
        .bind(q.question_type.as_str())
        .bind(serde_json::to_string(&q.options)?)
        .bind(&q.correct_answer)
        .bind(i64::from(q.points))
        .bind(i64::from(q.order))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Map a unique-constraint violation on `users` to a conflict.
fn user_conflict(err: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = if db.message().contains("users.email") {
                "Email already exists"
            } else {
                "Username already exists"
            };
            return QuizError::Conflict(message.into()).into();
        }
    }
    err.into()
}

#[async_trait]
impl QuizStore for SqliteStore {
    async fn list_quizzes(&self, include_inactive: bool) -> Result<Vec<Quiz>> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<QuizRow> = sqlx::query_as(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE ? OR is_active = 1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(include_inactive)
        .fetch_all(&mut *conn)
        .await?;

        let question_rows: Vec<QuestionRow> = sqlx::query_as(
            "SELECT q.id, q.quiz_id, q.question_text, q.question_type, q.options, \
             q.correct_answer, q.points, q.position \
             FROM questions q JOIN quizzes z ON z.id = q.quiz_id \
             WHERE ? OR z.is_active = 1 \
             ORDER BY q.position, q.id",
        )
        .bind(include_inactive)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_quiz: HashMap<QuizId, Vec<Question>> = HashMap::new();
        for row in question_rows {
            let question = row.into_question()?;
            by_quiz.entry(question.quiz_id).or_default().push(question);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let questions = by_quiz.remove(&row.id).unwrap_or_default();
                row.into_quiz(questions)
            })
            .collect())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>> {
        let mut conn = self.pool.acquire().await?;
        fetch_quiz(&mut conn, id).await
    }

    async fn create_quiz(&self, created_by: UserId, quiz: &NewQuiz) -> Result<Quiz> {
        let mut tx = self.begin_write().await?;

        let id = sqlx::query(
            "INSERT INTO quizzes (title, description, created_by, created_at, is_active) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(created_by)
        .bind(Utc::now())
        .bind(quiz.is_active)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        insert_questions(&mut tx, id, &quiz.questions).await?;
        let created = fetch_quiz(&mut tx, id)
            .await?
            .context("quiz vanished after insert")?;
        tx.commit().await?;

        Ok(created)
    }

    async fn update_quiz(&self, id: QuizId, update: &QuizUpdate) -> Result<Option<Quiz>> {
        let mut tx = self.begin_write().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM quizzes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        if let Some(title) = &update.title {
            sqlx::query("UPDATE quizzes SET title = ? WHERE id = ?")
                .bind(title)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(description) = &update.description {
            sqlx::query("UPDATE quizzes SET description = ? WHERE id = ?")
                .bind(description)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(is_active) = update.is_active {
            sqlx::query("UPDATE quizzes SET is_active = ? WHERE id = ?")
                .bind(is_active)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(questions) = &update.questions {
            sqlx::query("DELETE FROM questions WHERE quiz_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_questions(&mut tx, id, questions).await?;
        }

        let updated = fetch_quiz(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubmissionStore for SqliteStore {
    async fn record_graded(
        &self,
        quiz_id: QuizId,
        grader: Grader<'_>,
    ) -> Result<RecordedSubmission> {
        let mut tx = self.begin_write().await?;

        let quiz = fetch_quiz(&mut tx, quiz_id).await?;
        // Dropping `tx` on any early return rolls it back.
        let graded = grader(quiz.as_ref())?;
        let mut record = graded.record;
        if let Some(user_id) = record.user_id {
            let known: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
            if known.is_none() {
                tracing::debug!(user_id, "submitting user no longer exists, recording anonymously");
                record.user_id = None;
            }
        }
        let submitted_at = Utc::now();

        let id = sqlx::query(
            "INSERT INTO submissions \
             (user_id, quiz_id, participant_name, answers, score, total_points, submitted_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(record.quiz_id)
        .bind(&record.participant_name)
        .bind(serde_json::to_string(&record.answers)?)
        .bind(i64::try_from(record.score)?)
        .bind(i64::try_from(record.total_points)?)
        .bind(submitted_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        Ok(RecordedSubmission {
            submission: Submission {
                id,
                user_id: record.user_id,
                quiz_id: record.quiz_id,
                participant_name: record.participant_name,
                answers: record.answers,
                score: record.score,
                total_points: record.total_points,
                submitted_at,
            },
            card: graded.card,
        })
    }

    async fn submissions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE quiz_id = ? \
             ORDER BY submitted_at DESC, id DESC"
        ))
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    async fn submissions_for_user(&self, user_id: UserId) -> Result<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE user_id = ? \
             ORDER BY submitted_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let created_at = Utc::now();
        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(user_conflict)?
        .last_insert_rowid();

        Ok(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at,
        })
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserRow::into_user).transpose()
    }
}
