//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own every SQL statement touching the `students` table.
//! - Map rows back into validated [`Student`] records.
//!
//! # Invariants
//! - Write paths call [`Student::validate`] before any SQL mutation.
//! - Duplicate registration is enforced by the primary key, not by a
//!   check-then-insert sequence; the constraint violation surfaces as
//!   [`RepoError::Conflict`].
//! - SQL parameters are always bound, never spliced into statement text.
//! - Read paths reject corrupt persisted state instead of masking it.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::db::{migrations, DbError};
use crate::model::student::{
    Student, StudentStatus, StudentValidationError, ENROLLMENT_DATE_FORMAT,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    student_id,
    name,
    email,
    phone,
    department,
    gpa,
    status,
    enrollment_date,
    created_at,
    updated_at
FROM students";

const STUDENT_ORDER_SQL: &str = " ORDER BY name COLLATE NOCASE ASC, student_id ASC";

const REQUIRED_STUDENT_COLUMNS: &[&str] = &[
    "student_id",
    "name",
    "email",
    "phone",
    "department",
    "gpa",
    "status",
    "enrollment_date",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// The record failed validation; storage was never touched.
    Validation(StudentValidationError),
    /// Insert hit an existing `student_id`.
    Conflict(String),
    /// Update/delete targeted a `student_id` with no row.
    NotFound(String),
    /// Storage transport or bootstrap failure.
    Db(DbError),
    /// A persisted row could not be mapped back into a valid record.
    InvalidData(String),
    /// The connection's schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict(id) => write!(f, "student id already registered: {id}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{column}` on table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Four independent optional filters, combined with AND.
///
/// `None` means unconstrained. `name` and `student_id` are case-insensitive
/// substring matches; `department` and `status` match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentSearchQuery {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub status: Option<StudentStatus>,
}

/// Repository interface for student record operations.
pub trait StudentRepository {
    /// Inserts a new record. Fails with [`RepoError::Conflict`] when the id
    /// is already registered; the existing row is left untouched.
    fn create_student(&self, student: &Student) -> RepoResult<()>;
    /// Overwrites every mutable field of the matching row and stamps
    /// `updated_at`. Returns the stamp. `student_id` and `created_at` never
    /// change.
    fn update_student(&self, student: &Student) -> RepoResult<DateTime<Utc>>;
    /// Hard-deletes the matching row.
    fn delete_student(&self, student_id: &str) -> RepoResult<()>;
    /// Fetches one record; `Ok(None)` for an empty id or no match.
    fn get_student(&self, student_id: &str) -> RepoResult<Option<Student>>;
    /// Every record, ordered by name.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Name-substring plus exact-department filter, ordered by name.
    fn search_students(
        &self,
        name_term: Option<&str>,
        department: Option<&str>,
    ) -> RepoResult<Vec<Student>>;
    /// Four-filter search, ordered by name.
    fn search_students_advanced(&self, query: &StudentSearchQuery) -> RepoResult<Vec<Student>>;
    /// Total number of records.
    fn count_students(&self) -> RepoResult<u64>;
    /// Number of records with the given status.
    fn count_students_by_status(&self, status: StudentStatus) -> RepoResult<u64>;
}

/// SQLite-backed student repository over an injected connection.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    ///
    /// # Errors
    /// Rejects connections whose schema version or `students` layout does
    /// not match this binary instead of failing later mid-operation.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;

        let insert = self.conn.execute(
            "INSERT INTO students (
                student_id,
                name,
                email,
                phone,
                department,
                gpa,
                status,
                enrollment_date,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                student.student_id.as_str(),
                student.name.as_str(),
                student.email.as_deref(),
                student.phone.as_deref(),
                student.department.as_str(),
                student.gpa,
                student.status.as_token(),
                student.enrollment_date.map(date_to_db),
                datetime_to_db(student.created_at),
            ],
        );

        match insert {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::Conflict(student.student_id.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    fn update_student(&self, student: &Student) -> RepoResult<DateTime<Utc>> {
        student.validate()?;

        let stamped_at = Utc::now();
        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                department = ?4,
                gpa = ?5,
                status = ?6,
                enrollment_date = ?7,
                updated_at = ?8
             WHERE student_id = ?9;",
            params![
                student.name.as_str(),
                student.email.as_deref(),
                student.phone.as_deref(),
                student.department.as_str(),
                student.gpa,
                student.status.as_token(),
                student.enrollment_date.map(date_to_db),
                datetime_to_db(stamped_at),
                student.student_id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student.student_id.clone()));
        }

        Ok(stamped_at)
    }

    fn delete_student(&self, student_id: &str) -> RepoResult<()> {
        if student_id.trim().is_empty() {
            return Err(StudentValidationError::MissingField("student_id").into());
        }

        let changed = self.conn.execute(
            "DELETE FROM students WHERE student_id = ?1;",
            [student_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student_id.to_string()));
        }

        Ok(())
    }

    fn get_student(&self, student_id: &str) -> RepoResult<Option<Student>> {
        if student_id.trim().is_empty() {
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE student_id = ?1;"))?;
        let mut rows = stmt.query([student_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL}{STUDENT_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        collect_students(&mut rows)
    }

    fn search_students(
        &self,
        name_term: Option<&str>,
        department: Option<&str>,
    ) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(term) = name_term {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_pattern(term)));
        }
        if let Some(department) = department {
            sql.push_str(" AND department = ?");
            bind_values.push(Value::Text(department.to_string()));
        }
        sql.push_str(STUDENT_ORDER_SQL);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        collect_students(&mut rows)
    }

    fn search_students_advanced(&self, query: &StudentSearchQuery) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = query.name.as_deref() {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_pattern(name)));
        }
        if let Some(student_id) = query.student_id.as_deref() {
            sql.push_str(" AND student_id LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_pattern(student_id)));
        }
        if let Some(department) = query.department.as_deref() {
            sql.push_str(" AND department = ?");
            bind_values.push(Value::Text(department.to_string()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_token().to_string()));
        }
        sql.push_str(STUDENT_ORDER_SQL);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        collect_students(&mut rows)
    }

    fn count_students(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_students_by_status(&self, status: StudentStatus) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM students WHERE status = ?1;",
            [status.as_token()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Maps empty/whitespace filter input to "unconstrained".
pub fn normalize_filter(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Builds a `%term%` LIKE pattern with `%`/`_`/`\` escaped, so a literal
/// wildcard in user input matches itself.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn collect_students(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Student>> {
    let mut students = Vec::new();
    while let Some(row) = rows.next()? {
        students.push(parse_student_row(row)?);
    }
    Ok(students)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let status_text: String = row.get("status")?;
    let status = StudentStatus::from_token(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in students.status"))
    })?;

    let created_at_text: String = row.get("created_at")?;
    let updated_at = match row.get::<_, Option<String>>("updated_at")? {
        Some(value) => Some(parse_db_datetime(&value, "updated_at")?),
        None => None,
    };
    let enrollment_date = match row.get::<_, Option<String>>("enrollment_date")? {
        Some(value) => Some(parse_db_date(&value)?),
        None => None,
    };

    let student = Student {
        student_id: row.get("student_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        department: row.get("department")?,
        gpa: row.get("gpa")?,
        status,
        enrollment_date,
        created_at: parse_db_datetime(&created_at_text, "created_at")?,
        updated_at,
    };
    student.validate()?;
    Ok(student)
}

fn datetime_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn parse_db_datetime(value: &str, column: &'static str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid timestamp `{value}` in students.{column}"))
        })
}

fn date_to_db(value: NaiveDate) -> String {
    value.format(ENROLLMENT_DATE_FORMAT).to_string()
}

fn parse_db_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, ENROLLMENT_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{value}` in students.enrollment_date"
        ))
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected = migrations::latest_version();
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual != expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }

    if !table_exists(conn, "students")? {
        return Err(RepoError::MissingRequiredTable("students"));
    }
    for column in REQUIRED_STUDENT_COLUMNS.iter().copied() {
        if !table_has_column(conn, "students", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "students",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
