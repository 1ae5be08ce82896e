use std::path::Path;

use super::domain::{ApplicantDraft, ApplicantFields, CollegeDraft, ExperienceDraft, JobDraft, ProjectDraft};

pub const APPLICANT_RELEVANCE_MAX: i32 = 100;
pub const PROJECT_RELEVANCE_MAX: i32 = 5;
pub const EXPERIENCE_RELEVANCE_MAX: i32 = 10;
/// `YYYY-MM`.
pub const YEAR_MONTH_MAX_CHARS: usize = 7;
pub const ALLOWED_DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Rejections raised before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} must be between {min} and {max}, found {found}")]
    OutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
        found: i32,
    },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("'{0}' is not a usable file name")]
    InvalidFileName(String),
    #[error("file extension '{found}' is not allowed; allowed extensions are: {allowed}")]
    FileExtension { found: String, allowed: String },
    #[error("unknown applicant list type '{0}', expected 'rec' or 'norec'")]
    UnknownListType(String),
}

pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank { field })
    } else {
        Ok(())
    }
}

pub fn check_relevance(field: &'static str, value: i32, max: i32) -> Result<(), ValidationError> {
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: 0,
            max,
            found: value,
        })
    }
}

/// Empty addresses are allowed; anything else needs a local part and a dotted domain.
pub fn check_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    let invalid = || ValidationError::InvalidEmail(value.to_string());
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.rsplit_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

pub fn check_year_month(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(raw) if raw.chars().count() > YEAR_MONTH_MAX_CHARS => Err(ValidationError::TooLong {
            field,
            max: YEAR_MONTH_MAX_CHARS,
        }),
        _ => Ok(()),
    }
}

/// Strips client-side directories from an upload name. Empty, `.` and `..` are rejected.
pub fn clean_file_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ValidationError::InvalidFileName(raw.to_string()));
    }
    Ok(name.to_string())
}

/// Extension check on the client file name. Comparison ignores case; dotfiles have no extension.
pub fn check_document_name(file_name: &str) -> Result<(), ValidationError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ValidationError::FileExtension {
            found: extension,
            allowed: ALLOWED_DOCUMENT_EXTENSIONS.join(", "),
        })
    }
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("job_title", &self.job_title)?;
        require_text("job_description", &self.job_description)
    }
}

impl ApplicantFields {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("resume", &self.resume)?;
        check_email(&self.email)?;
        check_relevance("relevance", self.relevance, APPLICANT_RELEVANCE_MAX)
    }
}

impl ApplicantDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.validate()
    }
}

impl CollegeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_year_month("start_date", self.start_date.as_deref())?;
        check_year_month("end_date", self.end_date.as_deref())
    }
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_relevance("relevance", self.relevance, PROJECT_RELEVANCE_MAX)
    }
}

impl ExperienceDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_relevance("relevance", self.relevance, EXPERIENCE_RELEVANCE_MAX)
    }
}
