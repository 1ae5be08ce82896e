use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ScreeningConfig;

use super::domain::{
    Applicant, ApplicantDraft, ApplicantFields, ApplicantId, ApplicantSummary, College,
    CollegeDraft, Document, DocumentId, ExperienceDraft, ExperienceId, Job, JobDraft, JobId,
    ProfessionalExperience, Project, ProjectDraft, ProjectId, RecommendationFilter,
};
use super::repository::{RepositoryError, ScreeningRepository, TableCounts};
use super::storage::{ResumeStore, StorageError};
use super::validation::{
    check_document_name, check_relevance, clean_file_name, ValidationError, APPLICANT_RELEVANCE_MAX,
    EXPERIENCE_RELEVANCE_MAX, PROJECT_RELEVANCE_MAX,
};

/// Service composing validation, the repository, and resume file storage.
pub struct ScreeningService<R, S> {
    repository: Arc<R>,
    resumes: Arc<S>,
    config: ScreeningConfig,
}

impl<R, S> ScreeningService<R, S>
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    pub fn new(repository: Arc<R>, resumes: Arc<S>, config: ScreeningConfig) -> Self {
        Self {
            repository,
            resumes,
            config,
        }
    }

    /// Validate the file name, store the bytes under `resume/`, and record the row.
    /// The stored file is removed again when the row cannot be written.
    pub fn upload_document(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Document, ScreeningServiceError> {
        let file_name = clean_file_name(file_name)?;
        check_document_name(&file_name)?;
        let path = self.resumes.save(&file_name, bytes)?;
        let document = match self.repository.insert_document(&path) {
            Ok(document) => document,
            Err(err) => {
                if let Err(cleanup) = self.resumes.remove(&path) {
                    warn!(%path, error = %cleanup, "unable to remove orphaned resume upload");
                }
                return Err(err.into());
            }
        };
        info!(document_id = %document.id, %path, "resume uploaded");
        Ok(document)
    }

    pub fn document(&self, id: DocumentId) -> Result<Document, ScreeningServiceError> {
        let document = self
            .repository
            .fetch_document(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(document)
    }

    pub fn documents(&self) -> Result<Vec<Document>, ScreeningServiceError> {
        Ok(self.repository.list_documents()?)
    }

    pub fn create_job(&self, draft: JobDraft) -> Result<Job, ScreeningServiceError> {
        draft.validate()?;
        let job = self.repository.insert_job(Job::from_draft(draft))?;
        info!(job_id = %job.u_id, "job created");
        Ok(job)
    }

    pub fn update_job(&self, id: &JobId, draft: JobDraft) -> Result<Job, ScreeningServiceError> {
        draft.validate()?;
        let mut job = self.job(id)?;
        job.job_title = draft.job_title;
        job.job_description = draft.job_description;
        self.repository.update_job(job.clone())?;
        Ok(job)
    }

    pub fn job(&self, id: &JobId) -> Result<Job, ScreeningServiceError> {
        let job = self
            .repository
            .fetch_job(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(job)
    }

    pub fn jobs(&self) -> Result<Vec<Job>, ScreeningServiceError> {
        Ok(self.repository.list_jobs()?)
    }

    /// Removes the job together with its applicants and their records.
    pub fn delete_job(&self, id: &JobId) -> Result<(), ScreeningServiceError> {
        self.repository.delete_job(id)?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    pub fn submit_applicant(
        &self,
        draft: ApplicantDraft,
    ) -> Result<Applicant, ScreeningServiceError> {
        draft.validate()?;
        self.job(&draft.job_applied)?;
        let applicant = self.repository.insert_applicant(Applicant::from_draft(draft))?;
        info!(applicant_id = %applicant.u_id, job_id = %applicant.job_applied, "applicant submitted");
        Ok(applicant)
    }

    /// Replace the mutable applicant fields. The owning job never changes.
    pub fn update_applicant(
        &self,
        id: &ApplicantId,
        fields: ApplicantFields,
    ) -> Result<Applicant, ScreeningServiceError> {
        fields.validate()?;
        let mut applicant = self.applicant(id)?;
        applicant.apply(fields);
        self.repository.update_applicant(applicant.clone())?;
        Ok(applicant)
    }

    pub fn set_applicant_relevance(
        &self,
        id: &ApplicantId,
        relevance: i32,
    ) -> Result<Applicant, ScreeningServiceError> {
        check_relevance("relevance", relevance, APPLICANT_RELEVANCE_MAX)?;
        let mut applicant = self.applicant(id)?;
        applicant.relevance = relevance;
        self.repository.update_applicant(applicant.clone())?;
        debug!(applicant_id = %id, relevance, "applicant scored");
        Ok(applicant)
    }

    pub fn applicant(&self, id: &ApplicantId) -> Result<Applicant, ScreeningServiceError> {
        let applicant = self
            .repository
            .fetch_applicant(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(applicant)
    }

    pub fn all_applicants(&self) -> Result<Vec<Applicant>, ScreeningServiceError> {
        Ok(self.repository.list_applicants()?)
    }

    pub fn applicants_for_job(&self, job: &JobId) -> Result<Vec<Applicant>, ScreeningServiceError> {
        self.job(job)?;
        Ok(self.repository.applicants_for_job(job)?)
    }

    pub fn delete_applicant(&self, id: &ApplicantId) -> Result<(), ScreeningServiceError> {
        self.repository.delete_applicant(id)?;
        info!(applicant_id = %id, "applicant deleted");
        Ok(())
    }

    /// Applicants for a job, highest relevance first, optionally split at the
    /// configured recommendation threshold.
    pub fn applicant_list(
        &self,
        job: &JobId,
        filter: Option<RecommendationFilter>,
    ) -> Result<Vec<Applicant>, ScreeningServiceError> {
        let threshold = self.config.recommendation_threshold;
        let mut applicants: Vec<Applicant> = self
            .applicants_for_job(job)?
            .into_iter()
            .filter(|applicant| {
                filter.map_or(true, |filter| filter.admits(applicant.relevance, threshold))
            })
            .collect();
        // stable: ties keep submission order
        applicants.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        Ok(applicants)
    }

    pub fn applicant_summary(
        &self,
        id: &ApplicantId,
    ) -> Result<ApplicantSummary, ScreeningServiceError> {
        let applicant = self.applicant(id)?;
        Ok(ApplicantSummary {
            college: self.repository.college_for(id)?,
            projects: self.repository.projects_for(id)?,
            professional_experiences: self.repository.experiences_for(id)?,
            applicant,
        })
    }

    pub fn add_college(
        &self,
        applicant: &ApplicantId,
        draft: CollegeDraft,
    ) -> Result<College, ScreeningServiceError> {
        draft.validate()?;
        self.applicant(applicant)?;
        let college = self
            .repository
            .insert_college(College::from_draft(*applicant, draft))?;
        Ok(college)
    }

    pub fn update_college(
        &self,
        applicant: &ApplicantId,
        draft: CollegeDraft,
    ) -> Result<College, ScreeningServiceError> {
        draft.validate()?;
        let mut college = self.college(applicant)?;
        college.apply(draft);
        self.repository.update_college(college.clone())?;
        Ok(college)
    }

    pub fn college(&self, applicant: &ApplicantId) -> Result<College, ScreeningServiceError> {
        let college = self
            .repository
            .college_for(applicant)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(college)
    }

    pub fn delete_college(&self, applicant: &ApplicantId) -> Result<(), ScreeningServiceError> {
        Ok(self.repository.delete_college(applicant)?)
    }

    pub fn add_project(
        &self,
        applicant: &ApplicantId,
        draft: ProjectDraft,
    ) -> Result<Project, ScreeningServiceError> {
        draft.validate()?;
        self.applicant(applicant)?;
        let project = self
            .repository
            .insert_project(Project::from_draft(*applicant, draft))?;
        Ok(project)
    }

    pub fn update_project(
        &self,
        id: &ProjectId,
        draft: ProjectDraft,
    ) -> Result<Project, ScreeningServiceError> {
        draft.validate()?;
        let mut project = self.project(id)?;
        project.apply(draft);
        self.repository.update_project(project.clone())?;
        Ok(project)
    }

    pub fn set_project_relevance(
        &self,
        id: &ProjectId,
        relevance: i32,
    ) -> Result<Project, ScreeningServiceError> {
        check_relevance("relevance", relevance, PROJECT_RELEVANCE_MAX)?;
        let mut project = self.project(id)?;
        project.relevance = relevance;
        self.repository.update_project(project.clone())?;
        Ok(project)
    }

    pub fn project(&self, id: &ProjectId) -> Result<Project, ScreeningServiceError> {
        let project = self
            .repository
            .fetch_project(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(project)
    }

    pub fn projects(&self, applicant: &ApplicantId) -> Result<Vec<Project>, ScreeningServiceError> {
        self.applicant(applicant)?;
        Ok(self.repository.projects_for(applicant)?)
    }

    pub fn delete_project(&self, id: &ProjectId) -> Result<(), ScreeningServiceError> {
        Ok(self.repository.delete_project(id)?)
    }

    pub fn add_experience(
        &self,
        applicant: &ApplicantId,
        draft: ExperienceDraft,
    ) -> Result<ProfessionalExperience, ScreeningServiceError> {
        draft.validate()?;
        self.applicant(applicant)?;
        let experience = self
            .repository
            .insert_experience(ProfessionalExperience::from_draft(*applicant, draft))?;
        Ok(experience)
    }

    pub fn update_experience(
        &self,
        id: &ExperienceId,
        draft: ExperienceDraft,
    ) -> Result<ProfessionalExperience, ScreeningServiceError> {
        draft.validate()?;
        let mut experience = self.experience(id)?;
        experience.apply(draft);
        self.repository.update_experience(experience.clone())?;
        Ok(experience)
    }

    pub fn set_experience_relevance(
        &self,
        id: &ExperienceId,
        relevance: i32,
    ) -> Result<ProfessionalExperience, ScreeningServiceError> {
        check_relevance("relevance", relevance, EXPERIENCE_RELEVANCE_MAX)?;
        let mut experience = self.experience(id)?;
        experience.relevance = relevance;
        self.repository.update_experience(experience.clone())?;
        Ok(experience)
    }

    pub fn experience(
        &self,
        id: &ExperienceId,
    ) -> Result<ProfessionalExperience, ScreeningServiceError> {
        let experience = self
            .repository
            .fetch_experience(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(experience)
    }

    pub fn experiences(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<ProfessionalExperience>, ScreeningServiceError> {
        self.applicant(applicant)?;
        Ok(self.repository.experiences_for(applicant)?)
    }

    pub fn delete_experience(&self, id: &ExperienceId) -> Result<(), ScreeningServiceError> {
        Ok(self.repository.delete_experience(id)?)
    }

    pub fn table_counts(&self) -> Result<TableCounts, ScreeningServiceError> {
        Ok(self.repository.counts()?)
    }
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
