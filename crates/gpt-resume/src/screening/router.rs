use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{
    ApplicantDraft, ApplicantFields, ApplicantId, CollegeDraft, DocumentId, ExperienceDraft,
    ExperienceId, JobDraft, JobId, ProjectDraft, ProjectId, RecommendationFilter,
    RelevanceUpdate,
};
use super::repository::{RepositoryError, ScreeningRepository};
use super::service::{ScreeningService, ScreeningServiceError};
use super::storage::ResumeStore;
use super::validation::ValidationError;

/// Multipart field carrying the resume upload.
pub const DOCUMENT_FIELD: &str = "document";

type SharedService<R, S> = State<Arc<ScreeningService<R, S>>>;
type HandlerResult = Result<Response, ScreeningServiceError>;

/// Router builder exposing the CRUD and results endpoints under `/api`.
pub fn api_router<R, S>(service: Arc<ScreeningService<R, S>>) -> Router
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    Router::new()
        .route(
            "/api/jobs",
            get(list_jobs_handler::<R, S>).post(create_job_handler::<R, S>),
        )
        .route(
            "/api/jobs/:job_id",
            get(job_handler::<R, S>)
                .put(update_job_handler::<R, S>)
                .delete(delete_job_handler::<R, S>),
        )
        .route(
            "/api/jobs/:job_id/applicants",
            get(job_applicants_handler::<R, S>),
        )
        .route(
            "/api/applicants",
            post(submit_applicant_handler::<R, S>),
        )
        .route(
            "/api/applicants/:applicant_id",
            get(applicant_handler::<R, S>)
                .put(update_applicant_handler::<R, S>)
                .delete(delete_applicant_handler::<R, S>),
        )
        .route(
            "/api/applicants/:applicant_id/relevance",
            put(applicant_relevance_handler::<R, S>),
        )
        .route(
            "/api/applicants/:applicant_id/college",
            get(college_handler::<R, S>)
                .post(add_college_handler::<R, S>)
                .put(update_college_handler::<R, S>)
                .delete(delete_college_handler::<R, S>),
        )
        .route(
            "/api/applicants/:applicant_id/projects",
            get(projects_handler::<R, S>).post(add_project_handler::<R, S>),
        )
        .route(
            "/api/projects/:project_id",
            put(update_project_handler::<R, S>).delete(delete_project_handler::<R, S>),
        )
        .route(
            "/api/projects/:project_id/relevance",
            put(project_relevance_handler::<R, S>),
        )
        .route(
            "/api/applicants/:applicant_id/professional-experiences",
            get(experiences_handler::<R, S>).post(add_experience_handler::<R, S>),
        )
        .route(
            "/api/professional-experiences/:experience_id",
            put(update_experience_handler::<R, S>).delete(delete_experience_handler::<R, S>),
        )
        .route(
            "/api/professional-experiences/:experience_id/relevance",
            put(experience_relevance_handler::<R, S>),
        )
        .route(
            "/api/get-applicant-list/:job_id/",
            get(applicant_list_handler::<R, S>),
        )
        .route(
            "/api/get-applicant-summary/:applicant_id/",
            get(applicant_summary_handler::<R, S>),
        )
        .route(
            "/api/documents",
            get(documents_handler::<R, S>).post(upload_document_handler::<R, S>),
        )
        .route(
            "/api/documents/:document_id",
            get(document_handler::<R, S>),
        )
        .with_state(service)
}

impl IntoResponse for ScreeningServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ScreeningServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScreeningServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ScreeningServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            ScreeningServiceError::Repository(RepositoryError::Unavailable(_))
            | ScreeningServiceError::Storage(_) => {
                error!(error = %self, "screening request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

/// Unparseable identifiers cannot name a stored row.
fn parse_id<T: FromStr>(raw: &str) -> Result<T, ScreeningServiceError> {
    raw.parse::<T>()
        .map_err(|_| ScreeningServiceError::Repository(RepositoryError::NotFound))
}

/// Runs a service call on the blocking pool; the stores do synchronous disk and lock work.
pub(crate) async fn blocking<R, S, T, F>(
    service: Arc<ScreeningService<R, S>>,
    op: F,
) -> Result<T, ScreeningServiceError>
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
    T: Send + 'static,
    F: FnOnce(&ScreeningService<R, S>) -> Result<T, ScreeningServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|err| RepositoryError::Unavailable(format!("blocking task failed: {err}")))?
}

fn ok<T: serde::Serialize>(body: T) -> HandlerResult {
    Ok((StatusCode::OK, Json(body)).into_response())
}

fn created<T: serde::Serialize>(body: T) -> HandlerResult {
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

fn no_content() -> HandlerResult {
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn list_jobs_handler<R, S>(State(service): SharedService<R, S>) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    ok(blocking(service, |service| service.jobs()).await?)
}

pub(crate) async fn create_job_handler<R, S>(
    State(service): SharedService<R, S>,
    Json(draft): Json<JobDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    created(blocking(service, move |service| service.create_job(draft)).await?)
}

pub(crate) async fn job_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(job_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: JobId = parse_id(&job_id)?;
    ok(blocking(service, move |service| service.job(&id)).await?)
}

pub(crate) async fn update_job_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(job_id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: JobId = parse_id(&job_id)?;
    ok(blocking(service, move |service| service.update_job(&id, draft)).await?)
}

pub(crate) async fn delete_job_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(job_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: JobId = parse_id(&job_id)?;
    blocking(service, move |service| service.delete_job(&id)).await?;
    no_content()
}

pub(crate) async fn job_applicants_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(job_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: JobId = parse_id(&job_id)?;
    ok(blocking(service, move |service| service.applicants_for_job(&id)).await?)
}

pub(crate) async fn submit_applicant_handler<R, S>(
    State(service): SharedService<R, S>,
    Json(draft): Json<ApplicantDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    created(blocking(service, move |service| service.submit_applicant(draft)).await?)
}

pub(crate) async fn applicant_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.applicant(&id)).await?)
}

pub(crate) async fn update_applicant_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
    Json(fields): Json<ApplicantFields>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.update_applicant(&id, fields)).await?)
}

pub(crate) async fn delete_applicant_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    blocking(service, move |service| service.delete_applicant(&id)).await?;
    no_content()
}

pub(crate) async fn applicant_relevance_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
    Json(update): Json<RelevanceUpdate>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| {
        service.set_applicant_relevance(&id, update.relevance)
    })
    .await?)
}

pub(crate) async fn college_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.college(&id)).await?)
}

pub(crate) async fn add_college_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
    Json(draft): Json<CollegeDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    created(blocking(service, move |service| service.add_college(&id, draft)).await?)
}

pub(crate) async fn update_college_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
    Json(draft): Json<CollegeDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.update_college(&id, draft)).await?)
}

pub(crate) async fn delete_college_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    blocking(service, move |service| service.delete_college(&id)).await?;
    no_content()
}

pub(crate) async fn projects_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.projects(&id)).await?)
}

pub(crate) async fn add_project_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
    Json(draft): Json<ProjectDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    created(blocking(service, move |service| service.add_project(&id, draft)).await?)
}

pub(crate) async fn update_project_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(project_id): Path<String>,
    Json(draft): Json<ProjectDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ProjectId = parse_id(&project_id)?;
    ok(blocking(service, move |service| service.update_project(&id, draft)).await?)
}

pub(crate) async fn delete_project_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(project_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ProjectId = parse_id(&project_id)?;
    blocking(service, move |service| service.delete_project(&id)).await?;
    no_content()
}

pub(crate) async fn project_relevance_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(project_id): Path<String>,
    Json(update): Json<RelevanceUpdate>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ProjectId = parse_id(&project_id)?;
    ok(blocking(service, move |service| {
        service.set_project_relevance(&id, update.relevance)
    })
    .await?)
}

pub(crate) async fn experiences_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.experiences(&id)).await?)
}

pub(crate) async fn add_experience_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
    Json(draft): Json<ExperienceDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    created(blocking(service, move |service| service.add_experience(&id, draft)).await?)
}

pub(crate) async fn update_experience_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(experience_id): Path<String>,
    Json(draft): Json<ExperienceDraft>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ExperienceId = parse_id(&experience_id)?;
    ok(blocking(service, move |service| service.update_experience(&id, draft)).await?)
}

pub(crate) async fn delete_experience_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(experience_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ExperienceId = parse_id(&experience_id)?;
    blocking(service, move |service| service.delete_experience(&id)).await?;
    no_content()
}

pub(crate) async fn experience_relevance_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(experience_id): Path<String>,
    Json(update): Json<RelevanceUpdate>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ExperienceId = parse_id(&experience_id)?;
    ok(blocking(service, move |service| {
        service.set_experience_relevance(&id, update.relevance)
    })
    .await?)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicantListQuery {
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
}

impl ApplicantListQuery {
    fn filter(&self) -> Result<Option<RecommendationFilter>, ValidationError> {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

pub(crate) async fn applicant_list_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(job_id): Path<String>,
    Query(query): Query<ApplicantListQuery>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let filter = query.filter()?;
    let id: JobId = parse_id(&job_id)?;
    ok(blocking(service, move |service| service.applicant_list(&id, filter)).await?)
}

pub(crate) async fn applicant_summary_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(applicant_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id: ApplicantId = parse_id(&applicant_id)?;
    ok(blocking(service, move |service| service.applicant_summary(&id)).await?)
}

pub(crate) async fn documents_handler<R, S>(State(service): SharedService<R, S>) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    ok(blocking(service, |service| service.documents()).await?)
}

pub(crate) async fn document_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(document_id): Path<String>,
) -> HandlerResult
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let id = DocumentId(parse_id::<i64>(&document_id)?);
    ok(blocking(service, move |service| service.document(id)).await?)
}

pub(crate) async fn upload_document_handler<R, S>(
    State(service): SharedService<R, S>,
    mut multipart: Multipart,
) -> Response
where
    R: ScreeningRepository + 'static,
    S: ResumeStore + 'static,
{
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(DOCUMENT_FIELD) {
                    continue;
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((file_name, bytes)),
                    Err(rejection) => return rejection.into_response(),
                }
            }
            Ok(None) => break,
            Err(rejection) => return rejection.into_response(),
        }
    }

    let Some((file_name, bytes)) = upload else {
        return ScreeningServiceError::from(ValidationError::Blank {
            field: DOCUMENT_FIELD,
        })
        .into_response();
    };

    let upload = blocking(service, move |service| {
        service.upload_document(&file_name, &bytes)
    });
    match upload.await {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}
