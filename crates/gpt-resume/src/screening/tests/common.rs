use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::{json, Value};

use crate::config::ScreeningConfig;
use crate::screening::domain::{
    Applicant, ApplicantDraft, ApplicantFields, CollegeDraft, ExperienceDraft, Job, JobDraft,
    JobId, ProjectDraft,
};
use crate::screening::{screening_router, MemoryRepository, MemoryResumeStore, ScreeningService};

pub(super) type MemoryService = ScreeningService<MemoryRepository, MemoryResumeStore>;

pub(super) fn screening_config() -> ScreeningConfig {
    ScreeningConfig {
        recommendation_threshold: 50,
    }
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryRepository>,
    Arc<MemoryResumeStore>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let resumes = Arc::new(MemoryResumeStore::default());
    let service = ScreeningService::new(repository.clone(), resumes.clone(), screening_config());
    (service, repository, resumes)
}

pub(super) fn job_draft() -> JobDraft {
    JobDraft {
        job_title: "Backend Engineer".to_string(),
        job_description: "Rust services, SQL, and HTTP APIs.".to_string(),
    }
}

pub(super) fn applicant_draft(job: JobId, name: &str, relevance: i32) -> ApplicantDraft {
    ApplicantDraft {
        job_applied: job,
        fields: ApplicantFields {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_ascii_lowercase()),
            resume: format!("resume/{}.pdf", name.to_ascii_lowercase()),
            resume_text: format!("{name} has shipped several Rust services."),
            relevance,
        },
    }
}

pub(super) fn college_draft() -> CollegeDraft {
    CollegeDraft {
        name: "State University".to_string(),
        branch: "Computer Science".to_string(),
        degree: "B.Tech".to_string(),
        start_date: Some("2018-08".to_string()),
        end_date: Some("2022-05".to_string()),
    }
}

pub(super) fn project_draft(title: &str, relevance: i32) -> ProjectDraft {
    let mut time_duration = serde_json::Map::new();
    time_duration.insert("start".to_string(), json!("2021-01"));
    time_duration.insert("end".to_string(), json!("2021-06"));
    ProjectDraft {
        title: title.to_string(),
        description: "Distributed cache with a gossip membership layer.".to_string(),
        tech_stack: vec!["Rust".to_string(), "tokio".to_string()],
        time_duration,
        relevance,
    }
}

pub(super) fn experience_draft(relevance: i32) -> ExperienceDraft {
    ExperienceDraft {
        role: "Software Engineer".to_string(),
        organization: Some("Acme".to_string()),
        description: "Owned the billing pipeline.".to_string(),
        tech_stack: vec!["Go".to_string(), "Postgres".to_string()],
        time_duration: serde_json::Map::new(),
        relevance,
    }
}

/// A job with applicants scored at each of the given relevances, in submission order.
pub(super) fn seeded_job(service: &MemoryService, relevances: &[i32]) -> (Job, Vec<Applicant>) {
    let job = service.create_job(job_draft()).expect("job created");
    let applicants = relevances
        .iter()
        .enumerate()
        .map(|(index, relevance)| {
            service
                .submit_applicant(applicant_draft(
                    job.u_id,
                    &format!("Candidate{index}"),
                    *relevance,
                ))
                .expect("applicant submitted")
        })
        .collect();
    (job, applicants)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    screening_router(Arc::new(service))
}

pub(super) fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) fn multipart_request(uri: &str, field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "screening-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
