use super::common::*;
use crate::screening::domain::{
    Applicant, ApplicantId, College, DocumentId, Job, JobId, ProfessionalExperience, Project,
};
use crate::screening::repository::{RepositoryError, ScreeningRepository};
use crate::screening::{MemoryRepository, SqliteRepository};

fn sqlite() -> SqliteRepository {
    SqliteRepository::open_in_memory().expect("sqlite opens")
}

fn stored_job<R: ScreeningRepository>(repository: &R) -> Job {
    repository
        .insert_job(Job::from_draft(job_draft()))
        .expect("job inserted")
}

fn stored_applicant<R: ScreeningRepository>(repository: &R, job: JobId, relevance: i32) -> Applicant {
    repository
        .insert_applicant(Applicant::from_draft(applicant_draft(job, "Grace", relevance)))
        .expect("applicant inserted")
}

fn round_trips_records<R: ScreeningRepository>(repository: R) {
    let job = stored_job(&repository);
    let applicant = stored_applicant(&repository, job.u_id, 42);

    assert_eq!(repository.fetch_job(&job.u_id).expect("fetch"), Some(job.clone()));
    assert_eq!(
        repository.fetch_applicant(&applicant.u_id).expect("fetch"),
        Some(applicant.clone())
    );

    let project = repository
        .insert_project(Project::from_draft(applicant.u_id, project_draft("Cache", 4)))
        .expect("project");
    let fetched = repository
        .fetch_project(&project.u_id)
        .expect("fetch")
        .expect("present");
    assert_eq!(fetched.tech_stack, vec!["Rust".to_string(), "tokio".to_string()]);
    assert_eq!(fetched.time_duration.get("start"), Some(&serde_json::json!("2021-01")));

    let experience = repository
        .insert_experience(ProfessionalExperience::from_draft(
            applicant.u_id,
            experience_draft(6),
        ))
        .expect("experience");
    assert_eq!(
        repository.experiences_for(&applicant.u_id).expect("list"),
        vec![experience]
    );

    let first = repository.insert_document("resume/a.pdf").expect("doc");
    let second = repository.insert_document("resume/b.pdf").expect("doc");
    assert!(second.id > first.id);
    assert_eq!(repository.list_documents().expect("docs"), vec![first, second]);
    assert_eq!(repository.fetch_document(DocumentId(9_999)).expect("fetch"), None);
}

fn cascades_deletes<R: ScreeningRepository>(repository: R) {
    let job = stored_job(&repository);
    let keep = stored_job(&repository);
    let doomed: Vec<Applicant> = (0..3)
        .map(|relevance| stored_applicant(&repository, job.u_id, relevance))
        .collect();
    let survivor = stored_applicant(&repository, keep.u_id, 99);

    for applicant in doomed.iter().chain(std::iter::once(&survivor)) {
        repository
            .insert_college(College::from_draft(applicant.u_id, college_draft()))
            .expect("college");
        repository
            .insert_project(Project::from_draft(applicant.u_id, project_draft("P", 1)))
            .expect("project");
    }

    repository.delete_job(&job.u_id).expect("job deleted");

    let counts = repository.counts().expect("counts");
    assert_eq!(counts.jobs, 1);
    assert_eq!(counts.applicants, 1);
    assert_eq!(counts.colleges, 1);
    assert_eq!(counts.projects, 1);
    assert_eq!(repository.list_applicants().expect("list"), vec![survivor]);
}

fn rejects_orphans_and_duplicates<R: ScreeningRepository>(repository: R) {
    let orphan = Applicant::from_draft(applicant_draft(JobId::generate(), "Orphan", 0));
    assert!(matches!(
        repository.insert_applicant(orphan),
        Err(RepositoryError::NotFound)
    ));

    let project = Project::from_draft(ApplicantId::generate(), project_draft("P", 1));
    assert!(matches!(
        repository.insert_project(project),
        Err(RepositoryError::NotFound)
    ));

    let job = stored_job(&repository);
    assert!(matches!(
        repository.insert_job(job.clone()),
        Err(RepositoryError::Conflict)
    ));

    let applicant = stored_applicant(&repository, job.u_id, 0);
    repository
        .insert_college(College::from_draft(applicant.u_id, college_draft()))
        .expect("first college");
    assert!(matches!(
        repository.insert_college(College::from_draft(applicant.u_id, college_draft())),
        Err(RepositoryError::Conflict)
    ));
}

fn missing_rows_are_not_found<R: ScreeningRepository>(repository: R) {
    let ghost = Job::from_draft(job_draft());
    assert!(matches!(
        repository.update_job(ghost.clone()),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repository.delete_job(&ghost.u_id),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repository.delete_applicant(&ApplicantId::generate()),
        Err(RepositoryError::NotFound)
    ));
    assert_eq!(repository.fetch_job(&ghost.u_id).expect("fetch"), None);
}

#[test]
fn memory_round_trips_records() {
    round_trips_records(MemoryRepository::default());
}

#[test]
fn sqlite_round_trips_records() {
    round_trips_records(sqlite());
}

#[test]
fn memory_cascades_deletes() {
    cascades_deletes(MemoryRepository::default());
}

#[test]
fn sqlite_cascades_deletes() {
    cascades_deletes(sqlite());
}

#[test]
fn memory_rejects_orphans_and_duplicates() {
    rejects_orphans_and_duplicates(MemoryRepository::default());
}

#[test]
fn sqlite_rejects_orphans_and_duplicates() {
    rejects_orphans_and_duplicates(sqlite());
}

#[test]
fn memory_missing_rows_are_not_found() {
    missing_rows_are_not_found(MemoryRepository::default());
}

#[test]
fn sqlite_missing_rows_are_not_found() {
    missing_rows_are_not_found(sqlite());
}
