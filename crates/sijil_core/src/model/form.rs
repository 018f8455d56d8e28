//! Raw form-input parsing for student records.
//!
//! # Responsibility
//! - Turn the string-typed fields a UI form submits into a typed [`Student`].
//! - Decide syntactic questions only (empty vs. absent, token vs. enum,
//!   text vs. date); validity rules stay in [`Student::validate`].
//!
//! # Invariants
//! - Every field is trimmed before interpretation.
//! - An empty optional field becomes `None`, never a zero/default value.

use crate::model::student::{Student, StudentStatus, ENROLLMENT_DATE_FORMAT};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw, string-typed student form as submitted by a UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gpa: String,
    pub status: String,
    pub enrollment_date: String,
}

/// Why a form failed to parse into a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// GPA field is non-empty but not a number.
    InvalidGpa(String),
    /// Status field does not name a known status.
    InvalidStatus(String),
    /// Enrollment date is non-empty but not `YYYY-MM-DD`.
    InvalidDate(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGpa(value) => write!(f, "gpa `{value}` is not a number"),
            Self::InvalidStatus(value) => write!(f, "`{value}` is not a known student status"),
            Self::InvalidDate(value) => {
                write!(f, "enrollment date `{value}` is not in YYYY-MM-DD form")
            }
        }
    }
}

impl Error for FormError {}

impl StudentForm {
    /// Parses the form into a fresh [`Student`] with a new `created_at`.
    ///
    /// # Errors
    /// Returns a [`FormError`] when gpa, status or enrollment date cannot be
    /// interpreted. Field validity (required fields, email shape, gpa range)
    /// is not checked here; repository write paths enforce it via
    /// [`Student::validate`].
    pub fn parse(&self) -> Result<Student, FormError> {
        let status = StudentStatus::parse(&self.status)
            .ok_or_else(|| FormError::InvalidStatus(self.status.trim().to_string()))?;

        let mut student = Student::new(
            self.student_id.trim(),
            self.name.trim(),
            self.department.trim(),
            status,
        );
        student.email = optional_text(&self.email);
        student.phone = optional_text(&self.phone);
        student.gpa = parse_optional_gpa(&self.gpa)?;
        student.enrollment_date = parse_optional_date(&self.enrollment_date)?;
        Ok(student)
    }
}

/// Maps empty/whitespace input to `None`, otherwise to the trimmed text.
fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_optional_gpa(value: &str) -> Result<Option<f64>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| FormError::InvalidGpa(trimmed.to_string()))
}

fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, ENROLLMENT_DATE_FORMAT)
        .map(Some)
        .map_err(|_| FormError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{FormError, StudentForm};
    use crate::model::student::StudentStatus;
    use chrono::NaiveDate;

    fn baseline_form() -> StudentForm {
        StudentForm {
            student_id: " ST-1001 ".to_string(),
            name: "علي حسن".to_string(),
            department: "علوم الحاسوب".to_string(),
            status: "active".to_string(),
            ..StudentForm::default()
        }
    }

    #[test]
    fn parse_trims_and_fills_required_fields() {
        let student = baseline_form().parse().expect("baseline form should parse");
        assert_eq!(student.student_id, "ST-1001");
        assert_eq!(student.name, "علي حسن");
        assert_eq!(student.status, StudentStatus::Active);
        assert_eq!(student.updated_at, None);
    }

    #[test]
    fn empty_gpa_becomes_absent_not_zero() {
        let mut form = baseline_form();
        form.gpa = "   ".to_string();
        let student = form.parse().expect("empty gpa should parse");
        assert_eq!(student.gpa, None);
    }

    #[test]
    fn numeric_gpa_is_parsed() {
        let mut form = baseline_form();
        form.gpa = " 3.25 ".to_string();
        let student = form.parse().expect("numeric gpa should parse");
        assert_eq!(student.gpa, Some(3.25));
    }

    #[test]
    fn non_numeric_gpa_is_rejected() {
        let mut form = baseline_form();
        form.gpa = "ممتاز".to_string();
        let err = form.parse().expect_err("non-numeric gpa must fail");
        assert_eq!(err, FormError::InvalidGpa("ممتاز".to_string()));
    }

    #[test]
    fn arabic_status_labels_are_accepted() {
        for (label, expected) in [
            ("نشط", StudentStatus::Active),
            ("خريج", StudentStatus::Graduated),
            ("منقطع", StudentStatus::Inactive),
        ] {
            let mut form = baseline_form();
            form.status = label.to_string();
            let student = form.parse().expect("arabic label should parse");
            assert_eq!(student.status, expected);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = baseline_form();
        form.status = "enrolled".to_string();
        let err = form.parse().expect_err("unknown status must fail");
        assert_eq!(err, FormError::InvalidStatus("enrolled".to_string()));
    }

    #[test]
    fn enrollment_date_parses_or_rejects() {
        let mut form = baseline_form();
        form.enrollment_date = "2024-09-01".to_string();
        let student = form.parse().expect("iso date should parse");
        assert_eq!(
            student.enrollment_date,
            Some(NaiveDate::from_ymd_opt(2024, 9, 1).expect("valid date"))
        );

        form.enrollment_date = "01/09/2024".to_string();
        let err = form.parse().expect_err("slash date must fail");
        assert_eq!(err, FormError::InvalidDate("01/09/2024".to_string()));
    }

    #[test]
    fn empty_contact_fields_become_none() {
        let student = baseline_form().parse().expect("baseline form should parse");
        assert_eq!(student.email, None);
        assert_eq!(student.phone, None);
    }
}
