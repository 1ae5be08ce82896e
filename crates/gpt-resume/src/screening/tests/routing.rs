use super::common::*;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::screening::repository::RepositoryError;
use crate::screening::router::DOCUMENT_FIELD;
use crate::screening::ScreeningServiceError;

#[tokio::test]
async fn create_job_returns_created_record() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/jobs",
            json!({ "job_title": "Data Engineer", "job_description": "Pipelines" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["job_title"], "Data Engineer");
    assert!(payload["u_id"].as_str().is_some());
}

#[tokio::test]
async fn blank_job_title_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/jobs",
            json!({ "job_title": null, "job_description": "Pipelines" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "job_title must not be blank");
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_not_found() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let malformed = router
        .clone()
        .oneshot(get_request("/api/jobs/not-a-uuid"))
        .await
        .expect("route executes");
    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);

    let unknown = router
        .oneshot(get_request(&format!(
            "/api/applicants/{}",
            uuid::Uuid::new_v4()
        )))
        .await
        .expect("route executes");
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn applicant_list_filters_by_type() {
    let (service, _, _) = build_service();
    let (job, _) = seeded_job(&service, &[20, 80, 55]);
    let router = router_with_service(service);

    let rec = router
        .clone()
        .oneshot(get_request(&format!(
            "/api/get-applicant-list/{}/?type=rec",
            job.u_id
        )))
        .await
        .expect("route executes");
    assert_eq!(rec.status(), StatusCode::OK);
    let payload = read_json_body(rec).await;
    let relevances: Vec<i64> = payload
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|applicant| applicant["relevance"].as_i64())
        .collect();
    assert_eq!(relevances, vec![80, 55]);

    let norec = router
        .clone()
        .oneshot(get_request(&format!(
            "/api/get-applicant-list/{}/?type=norec",
            job.u_id
        )))
        .await
        .expect("route executes");
    let payload = read_json_body(norec).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));

    let everyone = router
        .clone()
        .oneshot(get_request(&format!("/api/get-applicant-list/{}/", job.u_id)))
        .await
        .expect("route executes");
    let payload = read_json_body(everyone).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(3));

    let unknown_type = router
        .oneshot(get_request(&format!(
            "/api/get-applicant-list/{}/?type=maybe",
            job.u_id
        )))
        .await
        .expect("route executes");
    assert_eq!(unknown_type.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn summary_nests_sub_records() {
    let (service, _, _) = build_service();
    let (_, applicants) = seeded_job(&service, &[65]);
    let id = applicants[0].u_id;
    service.add_college(&id, college_draft()).expect("college");
    service.add_project(&id, project_draft("Cache", 4)).expect("project");
    let router = router_with_service(service);

    let response = router
        .oneshot(get_request(&format!("/api/get-applicant-summary/{id}/")))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["u_id"], id.to_string());
    assert_eq!(payload["relevance"], 65);
    assert_eq!(payload["college"]["degree"], "B.Tech");
    assert_eq!(payload["projects"][0]["tech_stack"], json!(["Rust", "tokio"]));
    assert_eq!(payload["professional_experiences"], json!([]));
}

#[tokio::test]
async fn project_defaults_apply_over_http() {
    let (service, _, _) = build_service();
    let (_, applicants) = seeded_job(&service, &[0]);
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/applicants/{}/projects", applicants[0].u_id),
            json!({ "title": "Bare", "tech_stack": null }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["tech_stack"], json!([]));
    assert_eq!(payload["time_duration"], json!({}));
    assert_eq!(payload["relevance"], 0);
}

#[tokio::test]
async fn second_college_conflicts() {
    let (service, _, _) = build_service();
    let (_, applicants) = seeded_job(&service, &[0]);
    let id = applicants[0].u_id;
    service.add_college(&id, college_draft()).expect("college");
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/applicants/{id}/college"),
            json!({ "name": "Another", "degree": "MBA" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn relevance_route_checks_range() {
    let (service, _, _) = build_service();
    let (_, applicants) = seeded_job(&service, &[0]);
    let router = router_with_service(service);
    let uri = format!("/api/applicants/{}/relevance", applicants[0].u_id);

    let accepted = router
        .clone()
        .oneshot(json_request(Method::PUT, &uri, json!({ "relevance": 100 })))
        .await
        .expect("route executes");
    assert_eq!(accepted.status(), StatusCode::OK);

    let rejected = router
        .oneshot(json_request(Method::PUT, &uri, json!({ "relevance": 101 })))
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deleting_a_job_over_http_removes_applicants() {
    let (service, repository, _) = build_service();
    let (job, applicants) = seeded_job(&service, &[10, 20]);
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            axum::http::Request::delete(format!("/api/jobs/{}", job.u_id))
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let gone = router
        .oneshot(get_request(&format!("/api/applicants/{}", applicants[0].u_id)))
        .await
        .expect("route executes");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert!(crate::screening::ScreeningRepository::list_applicants(repository.as_ref())
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn upload_accepts_pdf_documents() {
    let (service, _, resumes) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(multipart_request(
            "/api/documents",
            DOCUMENT_FIELD,
            "ada.pdf",
            b"%PDF-1.4 resume",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["document"], "resume/ada.pdf");
    assert_eq!(payload["id"], 1);
    assert_eq!(resumes.len(), 1);
}

#[tokio::test]
async fn upload_rejects_other_extensions() {
    let (service, _, resumes) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(multipart_request(
            "/api/documents",
            DOCUMENT_FIELD,
            "ada.docx",
            b"not a pdf",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("docx"));
    assert!(resumes.is_empty());
}

#[tokio::test]
async fn upload_names_without_a_file_part_are_unprocessable() {
    for file_name in ["cv.pdf/", ".."] {
        let (service, _, resumes) = build_service();
        let router = router_with_service(service);

        let response = router
            .oneshot(multipart_request(
                "/api/documents",
                DOCUMENT_FIELD,
                file_name,
                b"%PDF-1.4 resume",
            ))
            .await
            .expect("route executes");

        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{file_name:?}"
        );
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .expect("error message")
            .contains("not a usable file name"));
        assert!(resumes.is_empty());
    }
}

#[tokio::test]
async fn upload_without_document_field_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(multipart_request("/api/documents", "attachment", "ada.pdf", b"%PDF"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_jobs_handler_returns_every_job() {
    let (service, _, _) = build_service();
    seeded_job(&service, &[]);
    seeded_job(&service, &[]);

    let response = crate::screening::router::list_jobs_handler::<
        crate::screening::MemoryRepository,
        crate::screening::MemoryResumeStore,
    >(State(Arc::new(service)))
    .await
    .expect("handler succeeds");

    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(2));
}

#[test]
fn repository_outages_map_to_internal_error() {
    let response =
        ScreeningServiceError::from(RepositoryError::Unavailable("disk full".to_string()))
            .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn admin_overview_lists_models_and_labels() {
    let (service, _, _) = build_service();
    let (job, _) = seeded_job(&service, &[30]);
    let router = router_with_service(service);

    let overview = router
        .clone()
        .oneshot(get_request("/admin/"))
        .await
        .expect("route executes");
    assert_eq!(overview.status(), StatusCode::OK);
    let payload = read_json_body(overview).await;
    let models = payload["models"].as_array().expect("models");
    assert_eq!(models.len(), 6);
    assert_eq!(payload["models"][1]["model"], "Job");
    assert_eq!(payload["models"][1]["rows"], 1);
    assert_eq!(payload["models"][2]["rows"], 1);

    let jobs = router
        .clone()
        .oneshot(get_request("/admin/jobs"))
        .await
        .expect("route executes");
    let payload = read_json_body(jobs).await;
    assert_eq!(payload[0]["u_id"], job.u_id.to_string());
    assert_eq!(payload[0]["label"], "Backend Engineer");

    let applicants = router
        .clone()
        .oneshot(get_request("/admin/applicants"))
        .await
        .expect("route executes");
    let payload = read_json_body(applicants).await;
    assert_eq!(payload[0]["label"], "Candidate0");

    let redirect = router
        .oneshot(get_request("/admin"))
        .await
        .expect("route executes");
    assert_eq!(redirect.status(), StatusCode::PERMANENT_REDIRECT);
}
