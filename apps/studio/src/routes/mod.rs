pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::ai::handlers as ai;
use crate::document::handlers as document;
use crate::export::handlers as export;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Editing session
        .route("/api/v1/resume", get(document::handle_get_resume))
        .route("/api/v1/resume/actions", post(document::handle_dispatch))
        .route("/api/v1/resume/style", put(document::handle_set_style))
        .route("/api/v1/resume/template", put(document::handle_set_template))
        .route("/api/v1/preview", get(document::handle_get_preview))
        .route("/api/v1/preview/zoom", put(document::handle_set_zoom))
        // Options offered by the editor
        .route("/api/v1/templates", get(document::handle_list_templates))
        .route("/api/v1/fonts", get(document::handle_list_fonts))
        .route("/api/v1/colors", get(document::handle_list_colors))
        // Export
        .route("/api/v1/export/pdf", post(export::handle_export_pdf))
        .route("/api/v1/export/docx", post(export::handle_export_docx))
        // AI content service
        .route("/api/v1/ai/parse", post(ai::handle_parse))
        .route("/api/v1/ai/suggestions", post(ai::handle_suggestions))
        .route("/api/v1/ai/job-match", post(ai::handle_job_match))
        .route("/api/v1/ai/ats-check", post(ai::handle_ats_check))
        .route("/api/v1/ai/cover-letter", post(ai::handle_cover_letter))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::ai::{check_upload, ContentService, ParseError, ServiceError};
    use crate::document::session::{ExportKind, Session, DEFAULT_ZOOM};
    use crate::export::fonts::FontRegistry;
    use crate::layout::SurfaceRegistry;
    use crate::models::analysis::{AtsCheck, JobAnalysis};
    use crate::models::resume::{PersonalInfo, ResumeData};

    /// Answers every call from fixed data; `fail` turns every call into a service error.
    /// `delay` holds suggestion generation open for that long.
    struct StubService {
        fail: bool,
        delay: Duration,
    }

    impl StubService {
        fn outcome<T>(&self, value: T) -> Result<T, ServiceError> {
            if self.fail {
                Err(ServiceError::Api {
                    status: 500,
                    message: "upstream exploded: key=secret".to_string(),
                })
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl ContentService for StubService {
        async fn parse_resume(
            &self,
            file: Bytes,
            mime_type: &str,
        ) -> Result<ResumeData, ParseError> {
            check_upload(&file, mime_type)?;
            let doc = ResumeData {
                personal_info: Arc::new(PersonalInfo {
                    name: "Parsed Person".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            };
            Ok(self.outcome(doc)?)
        }

        async fn generate_suggestions(
            &self,
            _job_title: &str,
            _company: &str,
        ) -> Result<Vec<String>, ServiceError> {
            tokio::time::sleep(self.delay).await;
            self.outcome(vec![
                "Shipped A".to_string(),
                "Scaled B".to_string(),
                "Cut C by 20%".to_string(),
            ])
        }

        async fn analyze_job_match(
            &self,
            _doc: &ResumeData,
            _job_description: &str,
        ) -> Result<JobAnalysis, ServiceError> {
            self.outcome(JobAnalysis {
                match_score: 64,
                keyword_gaps: vec!["Kubernetes".to_string()],
                ..Default::default()
            })
        }

        async fn check_ats(&self, _doc: &ResumeData) -> Result<AtsCheck, ServiceError> {
            self.outcome(AtsCheck {
                ats_score: 90,
                suggestions: vec![],
            })
        }

        async fn generate_cover_letter(
            &self,
            doc: &ResumeData,
            _job_description: &str,
        ) -> Result<String, ServiceError> {
            self.outcome(format!("Dear Hiring Manager,\n\n{}", doc.personal_info.name))
        }
    }

    fn test_state(fail: bool) -> AppState {
        test_state_with(StubService {
            fail,
            delay: Duration::ZERO,
        })
    }

    fn test_state_with(service: StubService) -> AppState {
        AppState {
            session: Arc::new(Session::new(SurfaceRegistry::new(), DEFAULT_ZOOM)),
            fonts: Arc::new(FontRegistry::new("does-not-exist")),
            content: Arc::new(service),
            raster_scale: 2.0,
        }
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        build_router(state.clone()).oneshot(request).await.unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_request(mime_type: &str, content: &[u8]) -> Request<Body> {
        let boundary = "studio-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv\"\r\n\
             Content-Type: {mime_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/ai/parse")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state(false);
        let response = send(&state, empty_request("GET", "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-studio");
    }

    #[tokio::test]
    async fn test_get_resume_returns_sample() {
        let state = test_state(false);
        let body = body_json(send(&state, empty_request("GET", "/api/v1/resume")).await).await;
        assert_eq!(body["document"]["personalInfo"]["name"], "Jane Doe");
        assert_eq!(body["template"], "modern");
        assert_eq!(body["style"]["fontFamily"], "font-sans");
    }

    #[tokio::test]
    async fn test_dispatch_update_bullet() {
        let state = test_state(false);
        let action = json!({
            "type": "UPDATE_BULLET",
            "workIndex": 0,
            "bulletIndex": 1,
            "value": "Rewrote the billing pipeline"
        });
        let response = send(&state, json_request("POST", "/api/v1/resume/actions", action)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["document"]["workExperience"][0]["description"][1],
            "Rewrote the billing pipeline"
        );
    }

    #[tokio::test]
    async fn test_malformed_action_is_absorbed() {
        let state = test_state(false);
        let before = state.session.snapshot().await;
        for action in [
            json!({"type": "EXPLODE"}),
            json!({"type": "REMOVE_ITEM", "section": "hobbies", "id": "x"}),
            json!({"type": "UPDATE_BULLET", "workIndex": 42, "bulletIndex": 0, "value": "x"}),
        ] {
            let response =
                send(&state, json_request("POST", "/api/v1/resume/actions", action)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(state.session.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_undecodable_action_body_is_absorbed() {
        let state = test_state(false);
        let before = state.session.snapshot().await;

        let not_json = Request::builder()
            .method("POST")
            .uri("/api/v1/resume/actions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(&state, not_json).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["document"]["summary"], before.document.summary);

        // A valid action without a JSON content type still goes through.
        let untyped = Request::builder()
            .method("POST")
            .uri("/api/v1/resume/actions")
            .body(Body::from(
                json!({"type": "UPDATE_FIELD", "target": {"mode": "summary", "value": "Plain"}})
                    .to_string(),
            ))
            .unwrap();
        let response = send(&state, untyped).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session.document().await.summary, "Plain");

        let response = send(&state, empty_request("POST", "/api/v1/resume/actions")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session.document().await.summary, "Plain");
    }

    #[tokio::test]
    async fn test_unknown_template_falls_back_to_modern() {
        let state = test_state(false);
        let response = send(
            &state,
            json_request("PUT", "/api/v1/resume/template", json!({"template": "retro"})),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["template"], "modern");

        let response = send(
            &state,
            json_request("PUT", "/api/v1/resume/template", json!({"template": "creative"})),
        )
        .await;
        assert_eq!(body_json(response).await["template"], "creative");
    }

    #[tokio::test]
    async fn test_style_update_reaches_preview() {
        let state = test_state(false);
        let style = json!({"fontFamily": "font-serif", "primaryColor": "#10b981"});
        let response = send(&state, json_request("PUT", "/api/v1/resume/style", style)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let preview = body_json(send(&state, empty_request("GET", "/api/v1/preview")).await).await;
        assert_eq!(preview["tree"]["font"], "Lora");
        assert!(preview["height"].as_f64().unwrap() >= 1056.0);
    }

    #[tokio::test]
    async fn test_invalid_zoom_is_rejected() {
        let state = test_state(false);
        let response = send(
            &state,
            json_request("PUT", "/api/v1/preview/zoom", json!({"zoom": 9.0})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &state,
            json_request("PUT", "/api/v1/preview/zoom", json!({"zoom": 1.25})),
        )
        .await;
        assert_eq!(body_json(response).await["zoom"], 1.25);
    }

    #[tokio::test]
    async fn test_option_lists() {
        let state = test_state(false);
        let templates =
            body_json(send(&state, empty_request("GET", "/api/v1/templates")).await).await;
        assert_eq!(templates.as_array().unwrap().len(), 3);
        let fonts = body_json(send(&state, empty_request("GET", "/api/v1/fonts")).await).await;
        assert_eq!(fonts.as_array().unwrap().len(), 11);
        assert_eq!(fonts[0]["id"], "font-sans");
        let colors = body_json(send(&state, empty_request("GET", "/api/v1/colors")).await).await;
        assert_eq!(colors.as_array().unwrap().len(), 4);
        assert_eq!(colors[0]["hex"], "#2563eb");
    }

    #[tokio::test]
    async fn test_docx_export_download() {
        let state = test_state(false);
        let response = send(
            &state,
            empty_request("POST", "/api/v1/export/docx?name=Jane%20Doe"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane Doe.docx\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_pdf_export_download_with_default_name() {
        let state = test_state(false);
        let response = send(&state, empty_request("POST", "/api/v1/export/pdf")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume.pdf\""
        );
        assert_eq!(state.session.surfaces().live_detached_count(), 0);
    }

    #[tokio::test]
    async fn test_export_in_flight_is_conflict() {
        let state = test_state(false);
        let _held = state.session.try_begin_export(ExportKind::Pdf).unwrap();
        let response = send(&state, empty_request("POST", "/api/v1/export/pdf")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // The other kind is unaffected.
        let response = send(&state, empty_request("POST", "/api/v1/export/docx")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_parse_upload_replaces_document() {
        let state = test_state(false);
        let response = send(&state, multipart_request("application/pdf", b"%PDF-1.4")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.session.document().await.personal_info.name,
            "Parsed Person"
        );
    }

    #[tokio::test]
    async fn test_parse_failure_leaves_document_unchanged() {
        let state = test_state(true);
        let before = state.session.document().await;

        let response = send(&state, multipart_request("application/pdf", b"%PDF-1.4")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(&state, multipart_request("application/zip", b"PK")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(state.session.document().await, before);
    }

    #[tokio::test]
    async fn test_suggestions_replace_job_bullets() {
        let state = test_state(false);
        let response = send(
            &state,
            json_request("POST", "/api/v1/ai/suggestions", json!({"workIndex": 1})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
        assert_eq!(
            state.session.document().await.work_experience[1].description[0],
            "Shipped A"
        );
    }

    #[tokio::test]
    async fn test_suggestions_follow_the_job_not_its_index() {
        let state = test_state_with(StubService {
            fail: false,
            delay: Duration::from_millis(200),
        });
        let generate = send(
            &state,
            json_request("POST", "/api/v1/ai/suggestions", json!({"workIndex": 0})),
        );
        let remove = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let action = json!({"type": "REMOVE_ITEM", "section": "workExperience", "id": "work1"});
            send(&state, json_request("POST", "/api/v1/resume/actions", action)).await
        };
        let (response, removed) = tokio::join!(generate, remove);
        assert_eq!(removed.status(), StatusCode::OK);
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let doc = state.session.document().await;
        assert_eq!(doc.work_experience.len(), 1);
        assert_eq!(doc.work_experience[0].id, "work2");
        assert!(!doc.work_experience[0]
            .description
            .iter()
            .any(|line| line == "Shipped A"));
    }

    #[tokio::test]
    async fn test_suggestions_require_title_and_company() {
        let state = test_state(false);
        let clear_title = json!({
            "type": "UPDATE_FIELD",
            "target": {"mode": "item", "section": "workExperience", "index": 0,
                       "field": "jobTitle", "value": ""}
        });
        send(&state, json_request("POST", "/api/v1/resume/actions", clear_title)).await;

        let response = send(
            &state,
            json_request("POST", "/api/v1/ai/suggestions", json!({"workIndex": 0})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_job_match_requires_description() {
        let state = test_state(false);
        let response = send(
            &state,
            json_request("POST", "/api/v1/ai/job-match", json!({"jobDescription": "  "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &state,
            json_request(
                "POST",
                "/api/v1/ai/job-match",
                json!({"jobDescription": "Platform engineer"}),
            ),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["matchScore"], 64);
        assert_eq!(body["keywordGaps"][0], "Kubernetes");
    }

    #[tokio::test]
    async fn test_cover_letter_uses_current_snapshot() {
        let state = test_state(false);
        let response = send(
            &state,
            json_request(
                "POST",
                "/api/v1/ai/cover-letter",
                json!({"jobDescription": "Platform engineer"}),
            ),
        )
        .await;
        let body = body_json(response).await;
        assert!(body["coverLetter"].as_str().unwrap().ends_with("Jane Doe"));
    }

    #[tokio::test]
    async fn test_service_failure_is_surfaced_generically() {
        let state = test_state(true);
        let response = send(&state, empty_request("POST", "/api/v1/ai/ats-check")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(!body["error"]["message"].as_str().unwrap().contains("secret"));
    }
}
