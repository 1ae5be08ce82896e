use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::validation::ValidationError;

/// Free-form start/end/duration mapping attached to projects and experience entries.
pub type TimeDuration = Map<String, Value>;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(raw.trim()).map(Self)
            }
        }
    };
}

record_id!(
    /// Identifier for a job posting.
    JobId
);
record_id!(
    /// Identifier for an applicant submission.
    ApplicantId
);
record_id!(CollegeId);
record_id!(ProjectId);
record_id!(
    /// Identifier for a professional experience entry.
    ExperienceId
);

/// Documents keep the database-assigned row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Uploaded resume file. `document` is the media-relative path, e.g. `resume/jane.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub document: String,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .document
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty());
        match name {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.id),
        }
    }
}

pub const JOB_LABEL_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub u_id: JobId,
    pub job_title: String,
    pub job_description: String,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.job_title.is_empty() {
            return write!(f, "{}", self.u_id);
        }
        match self.job_title.char_indices().nth(JOB_LABEL_MAX_CHARS) {
            Some((cut, _)) => write!(f, "{}...", &self.job_title[..cut]),
            None => f.write_str(&self.job_title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub u_id: ApplicantId,
    pub name: String,
    pub email: String,
    /// Path or URL of the stored resume.
    pub resume: String,
    pub resume_text: String,
    pub job_applied: JobId,
    pub relevance: i32,
}

impl fmt::Display for Applicant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.u_id)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub u_id: CollegeId,
    pub name: String,
    pub branch: String,
    pub degree: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub applicant: ApplicantId,
}

impl fmt::Display for College {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() {
            "College"
        } else {
            &self.name
        };
        write!(f, "{name} - {}", self.degree)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub u_id: ProjectId,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub time_duration: TimeDuration,
    pub applicant: ApplicantId,
    pub relevance: i32,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "Project {}", self.u_id)
        } else {
            f.write_str(&self.title)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalExperience {
    pub u_id: ExperienceId,
    pub role: String,
    pub organization: Option<String>,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub time_duration: TimeDuration,
    pub applicant: ApplicantId,
    pub relevance: i32,
}

impl fmt::Display for ProfessionalExperience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = if self.role.is_empty() {
            "Experience"
        } else {
            &self.role
        };
        write!(f, "{role} @ {}", self.organization.as_deref().unwrap_or(""))
    }
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for creating or replacing a job posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_description: String,
}

/// Mutable applicant fields shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantFields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resume: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resume_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relevance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDraft {
    pub job_applied: JobId,
    #[serde(flatten)]
    pub fields: ApplicantFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollegeDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub branch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_duration: TimeDuration,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relevance: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_duration: TimeDuration,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relevance: i32,
}

/// Score written back by the external scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceUpdate {
    pub relevance: i32,
}

impl Job {
    pub fn from_draft(draft: JobDraft) -> Self {
        Self {
            u_id: JobId::generate(),
            job_title: draft.job_title,
            job_description: draft.job_description,
        }
    }
}

impl Applicant {
    pub fn from_draft(draft: ApplicantDraft) -> Self {
        let ApplicantFields {
            name,
            email,
            resume,
            resume_text,
            relevance,
        } = draft.fields;
        Self {
            u_id: ApplicantId::generate(),
            name,
            email,
            resume,
            resume_text,
            job_applied: draft.job_applied,
            relevance,
        }
    }

    pub fn apply(&mut self, fields: ApplicantFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.resume = fields.resume;
        self.resume_text = fields.resume_text;
        self.relevance = fields.relevance;
    }
}

impl College {
    pub fn from_draft(applicant: ApplicantId, draft: CollegeDraft) -> Self {
        let mut college = Self {
            u_id: CollegeId::generate(),
            name: String::new(),
            branch: String::new(),
            degree: String::new(),
            start_date: None,
            end_date: None,
            applicant,
        };
        college.apply(draft);
        college
    }

    pub fn apply(&mut self, draft: CollegeDraft) {
        self.name = draft.name;
        self.branch = draft.branch;
        self.degree = draft.degree;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
    }
}

impl Project {
    pub fn from_draft(applicant: ApplicantId, draft: ProjectDraft) -> Self {
        Self {
            u_id: ProjectId::generate(),
            title: draft.title,
            description: draft.description,
            tech_stack: draft.tech_stack,
            time_duration: draft.time_duration,
            applicant,
            relevance: draft.relevance,
        }
    }

    pub fn apply(&mut self, draft: ProjectDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.tech_stack = draft.tech_stack;
        self.time_duration = draft.time_duration;
        self.relevance = draft.relevance;
    }
}

impl ProfessionalExperience {
    pub fn from_draft(applicant: ApplicantId, draft: ExperienceDraft) -> Self {
        Self {
            u_id: ExperienceId::generate(),
            role: draft.role,
            organization: draft.organization,
            description: draft.description,
            tech_stack: draft.tech_stack,
            time_duration: draft.time_duration,
            applicant,
            relevance: draft.relevance,
        }
    }

    pub fn apply(&mut self, draft: ExperienceDraft) {
        self.role = draft.role;
        self.organization = draft.organization;
        self.description = draft.description;
        self.tech_stack = draft.tech_stack;
        self.time_duration = draft.time_duration;
        self.relevance = draft.relevance;
    }
}

/// Which side of the recommendation threshold to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationFilter {
    Recommended,
    NotRecommended,
}

impl FromStr for RecommendationFilter {
    type Err = ValidationError;

    /// `rec` or `norec`, as sent in the `type` query parameter.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "rec" => Ok(RecommendationFilter::Recommended),
            "norec" => Ok(RecommendationFilter::NotRecommended),
            other => Err(ValidationError::UnknownListType(other.to_string())),
        }
    }
}

impl RecommendationFilter {
    pub fn admits(self, relevance: i32, threshold: i32) -> bool {
        match self {
            RecommendationFilter::Recommended => relevance >= threshold,
            RecommendationFilter::NotRecommended => relevance < threshold,
        }
    }
}

/// Applicant plus every parsed sub-record, as shown in the details dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantSummary {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub college: Option<College>,
    pub projects: Vec<Project>,
    pub professional_experiences: Vec<ProfessionalExperience>,
}
