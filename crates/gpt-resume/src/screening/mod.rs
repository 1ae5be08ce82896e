//! Job postings, applicants, and the records parsed out of their resumes.
//!
//! Jobs own applicants; applicants own one college entry plus any number of
//! projects and professional experience entries. Deleting an owner removes
//! everything beneath it.

pub mod admin;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use admin::admin_router;
pub use domain::{
    Applicant, ApplicantDraft, ApplicantFields, ApplicantId, ApplicantSummary, College,
    CollegeDraft, CollegeId, Document, DocumentId, ExperienceDraft, ExperienceId, Job, JobDraft,
    JobId, ProfessionalExperience, Project, ProjectDraft, ProjectId, RecommendationFilter,
    RelevanceUpdate, TimeDuration,
};
pub use repository::{RepositoryError, ScreeningRepository, TableCounts};
pub use router::api_router;
pub use service::{ScreeningService, ScreeningServiceError};
pub use storage::{FsResumeStore, MemoryResumeStore, ResumeStore, StorageError};
pub use store::{MemoryRepository, SqliteRepository};
pub use validation::ValidationError;

/// `/api/...` and `/admin/...` in one router.
pub fn screening_router<R, S>(service: Arc<ScreeningService<R, S>>) -> axum::Router
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    api_router(service.clone()).merge(admin_router(service))
}
