//! Read-only administrative overview: registered models, row counts, and the
//! display label of every row.

use std::sync::Arc;

use axum::{extract::State, response::Redirect, routing::get, Json, Router};
use serde::Serialize;

use super::domain::{ApplicantId, DocumentId, JobId};
use super::repository::ScreeningRepository;
use super::router::blocking;
use super::service::{ScreeningService, ScreeningServiceError};
use super::storage::ResumeStore;

pub const SITE_HEADER: &str = "gpt-resume administration";

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub site: &'static str,
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub model: &'static str,
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct JobRow {
    pub u_id: JobId,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicantRow {
    pub u_id: ApplicantId,
    pub label: String,
    pub job_applied: JobId,
    pub relevance: i32,
}

#[derive(Debug, Serialize)]
pub struct DocumentRow {
    pub id: DocumentId,
    pub label: String,
    pub document: String,
}

pub fn admin_router<R, S>(service: Arc<ScreeningService<R, S>>) -> Router
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    Router::new()
        .route("/admin", get(|| async { Redirect::permanent("/admin/") }))
        .route("/admin/", get(overview_handler::<R, S>))
        .route("/admin/jobs", get(jobs_handler::<R, S>))
        .route("/admin/applicants", get(applicants_handler::<R, S>))
        .route("/admin/documents", get(documents_handler::<R, S>))
        .with_state(service)
}

pub(crate) async fn overview_handler<R, S>(
    State(service): State<Arc<ScreeningService<R, S>>>,
) -> Result<Json<AdminOverview>, ScreeningServiceError>
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let counts = blocking(service, |service| service.table_counts()).await?;
    let models = vec![
        ModelEntry {
            model: "Document",
            table: "documents",
            rows: counts.documents,
        },
        ModelEntry {
            model: "Job",
            table: "jobs",
            rows: counts.jobs,
        },
        ModelEntry {
            model: "Applicant",
            table: "applicants",
            rows: counts.applicants,
        },
        ModelEntry {
            model: "College",
            table: "colleges",
            rows: counts.colleges,
        },
        ModelEntry {
            model: "Project",
            table: "projects",
            rows: counts.projects,
        },
        ModelEntry {
            model: "ProfessionalExperience",
            table: "professional_experiences",
            rows: counts.professional_experiences,
        },
    ];

    Ok(Json(AdminOverview {
        site: SITE_HEADER,
        models,
    }))
}

pub(crate) async fn jobs_handler<R, S>(
    State(service): State<Arc<ScreeningService<R, S>>>,
) -> Result<Json<Vec<JobRow>>, ScreeningServiceError>
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let rows = blocking(service, |service| service.jobs())
        .await?
        .into_iter()
        .map(|job| JobRow {
            label: job.to_string(),
            u_id: job.u_id,
        })
        .collect();
    Ok(Json(rows))
}

pub(crate) async fn applicants_handler<R, S>(
    State(service): State<Arc<ScreeningService<R, S>>>,
) -> Result<Json<Vec<ApplicantRow>>, ScreeningServiceError>
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let rows = blocking(service, |service| service.all_applicants())
        .await?
        .into_iter()
        .map(|applicant| ApplicantRow {
            label: applicant.to_string(),
            u_id: applicant.u_id,
            job_applied: applicant.job_applied,
            relevance: applicant.relevance,
        })
        .collect();
    Ok(Json(rows))
}

pub(crate) async fn documents_handler<R, S>(
    State(service): State<Arc<ScreeningService<R, S>>>,
) -> Result<Json<Vec<DocumentRow>>, ScreeningServiceError>
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let rows = blocking(service, |service| service.documents())
        .await?
        .into_iter()
        .map(|document| DocumentRow {
            label: document.to_string(),
            id: document.id,
            document: document.document,
        })
        .collect();
    Ok(Json(rows))
}
