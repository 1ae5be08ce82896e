use std::sync::{Arc, Mutex, MutexGuard};

use crate::screening::domain::{
    Applicant, ApplicantId, College, Document, DocumentId, ExperienceId, Job, JobId,
    ProfessionalExperience, Project, ProjectId,
};
use crate::screening::repository::{RepositoryError, ScreeningRepository, TableCounts};

#[derive(Debug, Default)]
struct Tables {
    next_document_id: i64,
    documents: Vec<Document>,
    jobs: Vec<Job>,
    applicants: Vec<Applicant>,
    colleges: Vec<College>,
    projects: Vec<Project>,
    experiences: Vec<ProfessionalExperience>,
}

impl Tables {
    fn has_job(&self, id: &JobId) -> bool {
        self.jobs.iter().any(|job| &job.u_id == id)
    }

    fn has_applicant(&self, id: &ApplicantId) -> bool {
        self.applicants.iter().any(|applicant| &applicant.u_id == id)
    }

    fn remove_applicants(&mut self, doomed: &[ApplicantId]) {
        self.applicants
            .retain(|applicant| !doomed.contains(&applicant.u_id));
        self.colleges
            .retain(|college| !doomed.contains(&college.applicant));
        self.projects
            .retain(|project| !doomed.contains(&project.applicant));
        self.experiences
            .retain(|experience| !doomed.contains(&experience.applicant));
    }
}

/// Process-local store. Cascades run under the single table lock, so a delete is
/// never observed half-done.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn replace<T, F>(rows: &mut [T], record: T, same: F) -> Result<(), RepositoryError>
where
    F: Fn(&T) -> bool,
{
    let slot = rows
        .iter_mut()
        .find(|row| same(row))
        .ok_or(RepositoryError::NotFound)?;
    *slot = record;
    Ok(())
}

fn remove<T, F>(rows: &mut Vec<T>, same: F) -> Result<(), RepositoryError>
where
    F: Fn(&T) -> bool,
{
    let before = rows.len();
    rows.retain(|row| !same(row));
    if rows.len() == before {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

impl ScreeningRepository for MemoryRepository {
    fn insert_document(&self, path: &str) -> Result<Document, RepositoryError> {
        let mut tables = self.lock()?;
        tables.next_document_id += 1;
        let document = Document {
            id: DocumentId(tables.next_document_id),
            document: path.to_string(),
        };
        tables.documents.push(document.clone());
        Ok(document)
    }

    fn fetch_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.documents.iter().find(|doc| doc.id == id).cloned())
    }

    fn list_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        Ok(self.lock()?.documents.clone())
    }

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.has_job(&job.u_id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.push(job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let id = job.u_id;
        replace(&mut tables.jobs, job, |row| row.u_id == id)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.jobs.iter().find(|job| &job.u_id == id).cloned())
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.clone())
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        remove(&mut tables.jobs, |job| &job.u_id == id)?;
        let doomed: Vec<ApplicantId> = tables
            .applicants
            .iter()
            .filter(|applicant| &applicant.job_applied == id)
            .map(|applicant| applicant.u_id)
            .collect();
        tables.remove_applicants(&doomed);
        Ok(())
    }

    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_job(&applicant.job_applied) {
            return Err(RepositoryError::NotFound);
        }
        if tables.has_applicant(&applicant.u_id) {
            return Err(RepositoryError::Conflict);
        }
        tables.applicants.push(applicant.clone());
        Ok(applicant)
    }

    fn update_applicant(&self, applicant: Applicant) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_job(&applicant.job_applied) {
            return Err(RepositoryError::NotFound);
        }
        let id = applicant.u_id;
        replace(&mut tables.applicants, applicant, |row| row.u_id == id)
    }

    fn fetch_applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applicants
            .iter()
            .find(|applicant| &applicant.u_id == id)
            .cloned())
    }

    fn list_applicants(&self) -> Result<Vec<Applicant>, RepositoryError> {
        Ok(self.lock()?.applicants.clone())
    }

    fn applicants_for_job(&self, job: &JobId) -> Result<Vec<Applicant>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applicants
            .iter()
            .filter(|applicant| &applicant.job_applied == job)
            .cloned()
            .collect())
    }

    fn delete_applicant(&self, id: &ApplicantId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_applicant(id) {
            return Err(RepositoryError::NotFound);
        }
        tables.remove_applicants(&[*id]);
        Ok(())
    }

    fn insert_college(&self, college: College) -> Result<College, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_applicant(&college.applicant) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .colleges
            .iter()
            .any(|row| row.applicant == college.applicant || row.u_id == college.u_id)
        {
            return Err(RepositoryError::Conflict);
        }
        tables.colleges.push(college.clone());
        Ok(college)
    }

    fn update_college(&self, college: College) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let id = college.u_id;
        let applicant = college.applicant;
        replace(&mut tables.colleges, college, |row| {
            row.u_id == id && row.applicant == applicant
        })
    }

    fn college_for(&self, applicant: &ApplicantId) -> Result<Option<College>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .colleges
            .iter()
            .find(|college| &college.applicant == applicant)
            .cloned())
    }

    fn delete_college(&self, applicant: &ApplicantId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        remove(&mut tables.colleges, |college| &college.applicant == applicant)
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_applicant(&project.applicant) {
            return Err(RepositoryError::NotFound);
        }
        if tables.projects.iter().any(|row| row.u_id == project.u_id) {
            return Err(RepositoryError::Conflict);
        }
        tables.projects.push(project.clone());
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let id = project.u_id;
        replace(&mut tables.projects, project, |row| row.u_id == id)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.projects.iter().find(|row| &row.u_id == id).cloned())
    }

    fn projects_for(&self, applicant: &ApplicantId) -> Result<Vec<Project>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .projects
            .iter()
            .filter(|row| &row.applicant == applicant)
            .cloned()
            .collect())
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        remove(&mut tables.projects, |row| &row.u_id == id)
    }

    fn insert_experience(
        &self,
        experience: ProfessionalExperience,
    ) -> Result<ProfessionalExperience, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.has_applicant(&experience.applicant) {
            return Err(RepositoryError::NotFound);
        }
        if tables.experiences.iter().any(|row| row.u_id == experience.u_id) {
            return Err(RepositoryError::Conflict);
        }
        tables.experiences.push(experience.clone());
        Ok(experience)
    }

    fn update_experience(&self, experience: ProfessionalExperience) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let id = experience.u_id;
        replace(&mut tables.experiences, experience, |row| row.u_id == id)
    }

    fn fetch_experience(
        &self,
        id: &ExperienceId,
    ) -> Result<Option<ProfessionalExperience>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.experiences.iter().find(|row| &row.u_id == id).cloned())
    }

    fn experiences_for(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<ProfessionalExperience>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .experiences
            .iter()
            .filter(|row| &row.applicant == applicant)
            .cloned()
            .collect())
    }

    fn delete_experience(&self, id: &ExperienceId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        remove(&mut tables.experiences, |row| &row.u_id == id)
    }

    fn counts(&self) -> Result<TableCounts, RepositoryError> {
        let tables = self.lock()?;
        Ok(TableCounts {
            documents: tables.documents.len(),
            jobs: tables.jobs.len(),
            applicants: tables.applicants.len(),
            colleges: tables.colleges.len(),
            projects: tables.projects.len(),
            professional_experiences: tables.experiences.len(),
        })
    }
}
