//! Student registry use-case service.
//!
//! # Responsibility
//! - Orchestrate form parsing, repository calls and read-backs for the
//!   registry's UI-facing flows.
//! - Normalize raw filter strings before they reach the repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - Returned records always reflect persisted state (read-back after
//!   every write).

use crate::model::form::{FormError, StudentForm};
use crate::model::student::{Student, StudentStatus};
use crate::repo::student_repo::{
    normalize_filter, RepoError, StudentRepository, StudentSearchQuery,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for registry use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Form input could not be parsed into a record.
    InvalidForm(FormError),
    /// Registration targeted an already-used student id.
    Conflict(String),
    /// The targeted student does not exist.
    NotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but the read-back found no record.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidForm(err) => write!(f, "{err}"),
            Self::Conflict(id) => write!(f, "student id already registered: {id}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent registry state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidForm(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(value: FormError) -> Self {
        Self::InvalidForm(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(id) => Self::Conflict(id),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Dashboard tile counts shown on the registry landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: u64,
    pub active: u64,
    pub graduated: u64,
}

/// Use-case facade over a student repository implementation.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new student from raw form input and returns the stored
    /// record.
    pub fn register_student(&self, form: &StudentForm) -> Result<Student, ServiceError> {
        let student = form.parse()?;
        self.repo.create_student(&student)?;
        self.repo
            .get_student(&student.student_id)?
            .ok_or(ServiceError::InconsistentState(
                "registered student not found in read-back",
            ))
    }

    /// Overwrites an existing student's mutable fields from raw form input
    /// and returns the stored record.
    ///
    /// The stored `created_at` is preserved; only `updated_at` moves.
    pub fn update_student(&self, form: &StudentForm) -> Result<Student, ServiceError> {
        let parsed = form.parse()?;
        let mut current = self
            .repo
            .get_student(&parsed.student_id)?
            .ok_or_else(|| ServiceError::NotFound(parsed.student_id.clone()))?;

        current.apply_update(
            parsed.name,
            parsed.email,
            parsed.phone,
            parsed.department,
            parsed.gpa,
            parsed.status,
            parsed.enrollment_date,
        );
        self.repo.update_student(&current)?;
        self.repo
            .get_student(&current.student_id)?
            .ok_or(ServiceError::InconsistentState(
                "updated student not found in read-back",
            ))
    }

    /// Hard-deletes one student by id.
    pub fn remove_student(&self, student_id: &str) -> Result<(), ServiceError> {
        self.repo.delete_student(student_id)?;
        Ok(())
    }

    /// Fetches one student; `Ok(None)` when the id is empty or unknown.
    pub fn get_student(&self, student_id: &str) -> Result<Option<Student>, ServiceError> {
        Ok(self.repo.get_student(student_id)?)
    }

    /// Every student, ordered by name.
    pub fn list_students(&self) -> Result<Vec<Student>, ServiceError> {
        Ok(self.repo.list_students()?)
    }

    /// Quick filter: name substring plus exact department. Empty strings
    /// mean "no constraint".
    pub fn search_students(
        &self,
        name_term: &str,
        department: &str,
    ) -> Result<Vec<Student>, ServiceError> {
        let name_term = normalize_filter(name_term);
        let department = normalize_filter(department);
        Ok(self
            .repo
            .search_students(name_term.as_deref(), department.as_deref())?)
    }

    /// Advanced search over four independent optional filters. Empty
    /// strings mean "no constraint"; a non-empty status must name a known
    /// status.
    pub fn search_students_advanced(
        &self,
        name: &str,
        student_id: &str,
        department: &str,
        status: &str,
    ) -> Result<Vec<Student>, ServiceError> {
        let status = match normalize_filter(status) {
            Some(raw) => Some(
                StudentStatus::parse(&raw).ok_or_else(|| FormError::InvalidStatus(raw.clone()))?,
            ),
            None => None,
        };

        let query = StudentSearchQuery {
            name: normalize_filter(name),
            student_id: normalize_filter(student_id),
            department: normalize_filter(department),
            status,
        };
        Ok(self.repo.search_students_advanced(&query)?)
    }

    /// Landing-page tile counts: total, active and graduated students.
    pub fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        Ok(DashboardStats {
            total: self.repo.count_students()?,
            active: self.repo.count_students_by_status(StudentStatus::Active)?,
            graduated: self
                .repo
                .count_students_by_status(StudentStatus::Graduated)?,
        })
    }
}
