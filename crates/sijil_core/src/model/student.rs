//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record managed by the registry.
//! - Keep record validity rules pure and free of I/O.
//!
//! # Invariants
//! - `student_id` is stable and never reassigned to another student.
//! - `created_at` is fixed at construction and never changes afterwards.
//! - `updated_at` stays `None` until the first successful update.
//!
//! # See also
//! - docs/architecture/data-model.md

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lexical form for enrollment dates on forms, wire and storage.
pub const ENROLLMENT_DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_LOCAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.\-]+$").expect("valid local-part regex"));
static EMAIL_DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.\-]+$").expect("valid domain regex"));

/// Enrollment state of a student.
///
/// Closed set: external input is parsed into this enum at the boundary, so
/// persistence and search never compare free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    /// Currently enrolled.
    Active,
    /// Finished the program.
    Graduated,
    /// Dropped out or suspended enrollment.
    Inactive,
}

impl StudentStatus {
    /// Canonical storage/wire token for this status.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Graduated => "graduated",
            Self::Inactive => "inactive",
        }
    }

    /// Parses the exact storage token. Used when mapping persisted rows,
    /// where anything but a canonical token is corrupt data.
    pub fn from_token(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "graduated" => Some(Self::Graduated),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Parses a status from a canonical token (case-insensitive) or the
    /// Arabic UI label the registry renders.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::from_token(trimmed.to_ascii_lowercase().as_str()).or(match trimmed {
            "نشط" => Some(Self::Active),
            "خريج" => Some(Self::Graduated),
            "منقطع" => Some(Self::Inactive),
            _ => None,
        })
    }

    /// Arabic label shown by the UI layer.
    pub fn label_ar(self) -> &'static str {
        match self {
            Self::Active => "نشط",
            Self::Graduated => "خريج",
            Self::Inactive => "منقطع",
        }
    }
}

impl Display for StudentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Academic standing derived from GPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicLevel {
    Excellent,
    VeryGood,
    Good,
    Acceptable,
    Weak,
    /// No GPA recorded yet.
    Unspecified,
}

impl AcademicLevel {
    /// Maps a GPA to its academic level using inclusive lower bounds.
    pub fn from_gpa(gpa: Option<f64>) -> Self {
        let Some(gpa) = gpa else {
            return Self::Unspecified;
        };

        if gpa >= 3.5 {
            Self::Excellent
        } else if gpa >= 3.0 {
            Self::VeryGood
        } else if gpa >= 2.5 {
            Self::Good
        } else if gpa >= 2.0 {
            Self::Acceptable
        } else {
            Self::Weak
        }
    }

    /// Arabic label shown by the UI layer.
    pub fn label_ar(self) -> &'static str {
        match self {
            Self::Excellent => "ممتاز",
            Self::VeryGood => "جيد جداً",
            Self::Good => "جيد",
            Self::Acceptable => "مقبول",
            Self::Weak => "ضعيف",
            Self::Unspecified => "غير محدد",
        }
    }
}

/// Why a student record failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentValidationError {
    /// A required text field is empty or whitespace-only.
    MissingField(&'static str),
    /// Email is present but not a structurally valid address.
    InvalidEmail(String),
    /// GPA is present but outside `0.0..=4.0` or not finite.
    GpaOutOfRange(f64),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is empty"),
            Self::InvalidEmail(value) => write!(f, "`{value}` is not a valid email address"),
            Self::GpaOutOfRange(value) => {
                write!(f, "gpa {value} is outside the allowed range 0.0..=4.0")
            }
        }
    }
}

impl Error for StudentValidationError {}

/// Canonical student record.
///
/// Plain data plus pure validity/derivation rules; persistence lives in the
/// repository layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Registry number, primary key. Assigned externally, never generated.
    pub student_id: String,
    /// Full name.
    pub name: String,
    /// Contact email (nullable).
    pub email: Option<String>,
    /// Contact phone, free-form (nullable).
    pub phone: Option<String>,
    /// Department the student belongs to.
    pub department: String,
    /// Grade point average on the 4.0 scale (nullable).
    pub gpa: Option<f64>,
    /// Enrollment state.
    pub status: StudentStatus,
    /// Day the student enrolled (nullable).
    pub enrollment_date: Option<NaiveDate>,
    /// Record creation stamp. Fixed at construction.
    pub created_at: DateTime<Utc>,
    /// Last successful update stamp. `None` for never-updated records.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Creates a new record with the required fields and a fresh
    /// `created_at` stamp. Optional fields start as `None`.
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
        status: StudentStatus,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            email: None,
            phone: None,
            department: department.into(),
            gpa: None,
            status,
            enrollment_date: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Overwrites every mutable field and stamps `updated_at`.
    ///
    /// `student_id` and `created_at` are deliberately not parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_update(
        &mut self,
        name: String,
        email: Option<String>,
        phone: Option<String>,
        department: String,
        gpa: Option<f64>,
        status: StudentStatus,
        enrollment_date: Option<NaiveDate>,
    ) {
        self.name = name;
        self.email = email;
        self.phone = phone;
        self.department = department;
        self.gpa = gpa;
        self.status = status;
        self.enrollment_date = enrollment_date;
        self.updated_at = Some(Utc::now());
    }

    /// Checks record validity.
    ///
    /// # Errors
    /// - [`StudentValidationError::MissingField`] when `student_id`, `name`
    ///   or `department` is empty/whitespace-only.
    /// - [`StudentValidationError::InvalidEmail`] when `email` is present but
    ///   malformed.
    /// - [`StudentValidationError::GpaOutOfRange`] when `gpa` is present but
    ///   not a finite value in `0.0..=4.0`.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.student_id.trim().is_empty() {
            return Err(StudentValidationError::MissingField("student_id"));
        }
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::MissingField("name"));
        }
        if self.department.trim().is_empty() {
            return Err(StudentValidationError::MissingField("department"));
        }

        if let Some(email) = self.email.as_deref() {
            if !email.trim().is_empty() && !is_structurally_valid_email(email) {
                return Err(StudentValidationError::InvalidEmail(email.to_string()));
            }
        }

        if let Some(gpa) = self.gpa {
            if !gpa.is_finite() || !(0.0..=4.0).contains(&gpa) {
                return Err(StudentValidationError::GpaOutOfRange(gpa));
            }
        }

        Ok(())
    }

    /// Convenience wrapper over [`Student::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Academic level derived from the current GPA.
    pub fn academic_level(&self) -> AcademicLevel {
        AcademicLevel::from_gpa(self.gpa)
    }

    /// One-line Arabic summary used by UI lists and diagnostics.
    pub fn summary_ar(&self) -> String {
        format!(
            "الطالب: {} - الرقم: {} - القسم: {} - الحالة: {}",
            self.name,
            self.student_id,
            self.department,
            self.status.label_ar()
        )
    }
}

/// Structural email check.
///
/// Accepts `local@domain` where the address has exactly one `@`, a non-empty
/// local part, and a domain with at least one dot. Dots must not lead, trail
/// or repeat in either part, and both parts are restricted to their usual
/// unquoted character sets.
pub fn is_structurally_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !EMAIL_LOCAL_RE.is_match(local) || !EMAIL_DOMAIN_RE.is_match(domain) {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }
    for part in [local, domain] {
        if part.starts_with('.') || part.ends_with('.') || part.contains("..") {
            return false;
        }
    }
    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::is_structurally_valid_email;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_structurally_valid_email("ali@example.com"));
        assert!(is_structurally_valid_email("first.last+tag@sub.example.edu"));
        assert!(is_structurally_valid_email("a_b-c@uni-mail.example.org"));
    }

    #[test]
    fn rejects_structural_defects() {
        assert!(!is_structurally_valid_email("no-at-sign"));
        assert!(!is_structurally_valid_email("two@@example.com"));
        assert!(!is_structurally_valid_email("a@b@example.com"));
        assert!(!is_structurally_valid_email("@example.com"));
        assert!(!is_structurally_valid_email("user@"));
        assert!(!is_structurally_valid_email("user@nodot"));
        assert!(!is_structurally_valid_email("user@.example.com"));
        assert!(!is_structurally_valid_email("user@example.com."));
        assert!(!is_structurally_valid_email(".user@example.com"));
        assert!(!is_structurally_valid_email("us..er@example.com"));
        assert!(!is_structurally_valid_email("user name@example.com"));
        assert!(!is_structurally_valid_email("user@exa mple.com"));
        assert!(!is_structurally_valid_email("user@-example.com"));
    }
}
