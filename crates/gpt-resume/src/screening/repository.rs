use serde::Serialize;

use super::domain::{
    Applicant, ApplicantId, College, Document, DocumentId, ExperienceId, Job, JobId,
    ProfessionalExperience, Project, ProjectId,
};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Deleting a job removes its applicants; deleting an applicant removes its college,
/// projects and experience entries. Inserting a child whose parent is missing fails
/// with [`RepositoryError::NotFound`].
pub trait ScreeningRepository: Send + Sync {
    fn insert_document(&self, path: &str) -> Result<Document, RepositoryError>;
    fn fetch_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;
    fn list_documents(&self) -> Result<Vec<Document>, RepositoryError>;

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError>;

    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError>;
    fn update_applicant(&self, applicant: Applicant) -> Result<(), RepositoryError>;
    fn fetch_applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError>;
    fn list_applicants(&self) -> Result<Vec<Applicant>, RepositoryError>;
    fn applicants_for_job(&self, job: &JobId) -> Result<Vec<Applicant>, RepositoryError>;
    fn delete_applicant(&self, id: &ApplicantId) -> Result<(), RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the applicant already has one.
    fn insert_college(&self, college: College) -> Result<College, RepositoryError>;
    fn update_college(&self, college: College) -> Result<(), RepositoryError>;
    fn college_for(&self, applicant: &ApplicantId) -> Result<Option<College>, RepositoryError>;
    fn delete_college(&self, applicant: &ApplicantId) -> Result<(), RepositoryError>;

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError>;
    fn update_project(&self, project: Project) -> Result<(), RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn projects_for(&self, applicant: &ApplicantId) -> Result<Vec<Project>, RepositoryError>;
    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError>;

    fn insert_experience(
        &self,
        experience: ProfessionalExperience,
    ) -> Result<ProfessionalExperience, RepositoryError>;
    fn update_experience(&self, experience: ProfessionalExperience) -> Result<(), RepositoryError>;
    fn fetch_experience(
        &self,
        id: &ExperienceId,
    ) -> Result<Option<ProfessionalExperience>, RepositoryError>;
    fn experiences_for(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<ProfessionalExperience>, RepositoryError>;
    fn delete_experience(&self, id: &ExperienceId) -> Result<(), RepositoryError>;

    fn counts(&self) -> Result<TableCounts, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Row count per table, used by the admin overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub documents: usize,
    pub jobs: usize,
    pub applicants: usize,
    pub colleges: usize,
    pub projects: usize,
    pub professional_experiences: usize,
}
