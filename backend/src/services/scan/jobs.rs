use actix_web::{web, HttpResponse};
use common::jobs::JobStatus;
use common::requests::ScanRequest;
use log::error;
use serde_json::json;

use super::pipeline;
use super::submit::decode_request;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::job_controller::state::JobsState;
use crate::state::AppState;

/// Validates the payload up front, then answers with a job id while OCR
/// runs on the blocking pool.
pub(crate) async fn start(
    user: AuthUser,
    state: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<ScanRequest>,
) -> ApiResult<HttpResponse> {
    let input = decode_request(user.user_id, payload.into_inner())?;
    let job_id = jobs.register().await;

    let jobs = jobs.get_ref().clone();
    let id = job_id.clone();
    tokio::spawn(async move {
        let worker_jobs = jobs.clone();
        let worker_id = id.clone();
        let handle = tokio::task::spawn_blocking(move || {
            pipeline::run(&state, input, |percent| {
                worker_jobs.report_blocking(&worker_id, JobStatus::InProgress(percent))
            })
        });

        let status = match handle.await {
            Ok(Ok(result)) => JobStatus::Completed(result.document.id),
            Ok(Err(e)) => JobStatus::Failed(e.to_string()),
            Err(join_err) => {
                error!("scan job {id} panicked: {join_err}");
                JobStatus::Failed(format!("join error: {join_err}"))
            }
        };
        jobs.report(&id, status).await;
    });

    Ok(HttpResponse::Accepted().json(json!({ "job_id": job_id })))
}

pub(crate) async fn status(
    _user: AuthUser,
    jobs: web::Data<JobsState>,
    job_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let status = jobs
        .status(&job_id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(HttpResponse::Ok().json(status))
}

#[cfg(test)]
mod tests {
    use crate::services::scan::fixtures::png_base64;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::jobs::JobStatus;
    use common::model::user::Role;
    use serde_json::{json, Value};
    use std::time::Duration;

    #[actix_web::test]
    async fn job_completes_with_document_id() {
        let ctx = TestContext::new();
        let token = ctx.create_user("amina", Role::Patient);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/scan/jobs")
            .insert_header(bearer(&token))
            .set_json(json!({ "image": png_base64(9) }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        let job_id = body["job_id"].as_str().unwrap().to_string();

        let mut status = JobStatus::Pending;
        for _ in 0..200 {
            let req = TestRequest::get()
                .uri(&format!("/api/scan/jobs/{job_id}"))
                .insert_header(bearer(&token))
                .to_request();
            status = test::call_and_read_body_json(&app, req).await;
            if status.is_finished() {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        }
        let document_id = match status {
            JobStatus::Completed(id) => id,
            other => panic!("job did not complete: {other:?}"),
        };

        let req = TestRequest::get()
            .uri(&format!("/api/scan/document/{document_id}"))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_job_and_invalid_payload() {
        let ctx = TestContext::new();
        let token = ctx.create_user("amina", Role::Patient);
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/scan/jobs/nope")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::post()
            .uri("/api/scan/jobs")
            .insert_header(bearer(&token))
            .set_json(json!({ "image": "" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
