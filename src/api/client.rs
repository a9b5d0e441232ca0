use super::constants::{self, headers, parts};
use super::models::*;
use super::resilience::{RetryConfig, RetryPolicy};
use crate::error::{DashboardError, PreconditionError, Result, ServerDetail};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// The REST surface the dashboard consumes.
///
/// The orchestrator only talks to this trait so tests can substitute an
/// in-memory backend and count calls.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>>;
    async fn get_course(&self, id: &str) -> Result<Course>;
    async fn create_course(&self, draft: &CourseDraft) -> Result<Course>;
    async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course>;
    async fn delete_course(&self, id: &str) -> Result<()>;
    async fn course_overview(&self, id: &str) -> Result<CourseOverview>;
    async fn send_feedback(&self, course_id: &str, feedback: &CourseFeedback) -> Result<()>;

    async fn list_lectures(&self, course_id: Option<&str>) -> Result<Vec<Lecture>>;
    async fn get_lecture(&self, id: &str) -> Result<Lecture>;
    async fn create_lecture(&self, draft: &LectureDraft) -> Result<Lecture>;
    async fn update_lecture(&self, draft: &LectureDraft) -> Result<Lecture>;
    async fn lecture_analysis(&self, id: &str) -> Result<LectureAnalysis>;
    async fn analyze_lecture(&self, id: &str, video: &PendingUpload) -> Result<AnalyzeOutcome>;
    async fn analyze_materials(&self, id: &str, materials: &PendingUpload) -> Result<MaterialsAnalysis>;
    async fn materials_analysis(&self, id: &str) -> Result<MaterialsAnalysis>;
    async fn lecture_surveys(&self, id: &str) -> Result<Vec<Survey>>;
    async fn survey_responses(&self, id: &str) -> Result<Vec<SurveyResponse>>;
    async fn generate_survey(&self, id: &str, request: &SurveyRequest) -> Result<Survey>;

    async fn get_survey(&self, id: &str) -> Result<Survey>;
    async fn submit_survey(&self, id: &str, submission: &SurveySubmission) -> Result<()>;

    async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>>;
    async fn create_assignment(&self, draft: &AssignmentDraft, file: Option<&PendingUpload>) -> Result<Assignment>;
    async fn delete_assignment(&self, id: &str) -> Result<()>;
}

/// HTTP client for the Praxis backend with connection pooling
#[derive(Clone)]
pub struct PraxisClient {
    base_url: String,
    http_client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl PraxisClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(headers::USER_AGENT)
            .build()?;

        Ok(Self::with_custom_client(base_url, http_client, retry))
    }

    /// Create a client around an existing reqwest client
    pub fn with_custom_client(base_url: impl Into<String>, http_client: reqwest::Client, retry: RetryConfig) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            retry_policy: RetryPolicy::new(retry),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Address of the lecture video stream (`GET /lectures/{id}/video`)
    pub fn lecture_video_url(&self, id: &str) -> String {
        constants::lecture_resource(&self.base_url, id, "video")
    }

    /// Address of an assignment attachment (`GET /assignments/{id}/file`)
    pub fn assignment_file_url(&self, id: &str) -> String {
        constants::assignment_file(&self.base_url, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    async fn get_json_with_query<T: DeserializeOwned>(&self, url: String, query: &[(&str, &str)]) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .retry_policy
            .execute(|| async {
                self.http_client
                    .get(&url)
                    .header("Accept", headers::ACCEPT_JSON)
                    .query(query)
                    .send()
                    .await
            })
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, method: reqwest::Method, url: String, body: &B) -> Result<T> {
        debug!("{} {}", method, url);
        let response = self
            .http_client
            .request(method, &url)
            .header("Accept", headers::ACCEPT_JSON)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn send_multipart<T: DeserializeOwned>(&self, url: String, form: Form) -> Result<T> {
        debug!("POST (multipart) {}", url);
        let response = self
            .http_client
            .post(&url)
            .header("Accept", headers::ACCEPT_JSON)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn delete(&self, url: String) -> Result<()> {
        debug!("DELETE {}", url);
        let response = self.http_client.delete(&url).send().await.map_err(network_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

#[async_trait]
impl DashboardApi for PraxisClient {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.get_json(constants::classes(&self.base_url)).await
    }

    async fn get_course(&self, id: &str) -> Result<Course> {
        self.get_json(constants::class(&self.base_url, id)).await
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        let course: Course = self.send_json(reqwest::Method::POST, constants::classes(&self.base_url), draft).await?;
        info!("Created course {} ({})", course.id, course.code);
        Ok(course)
    }

    async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course> {
        self.send_json(reqwest::Method::PUT, constants::class(&self.base_url, id), draft).await
    }

    async fn delete_course(&self, id: &str) -> Result<()> {
        self.delete(constants::class(&self.base_url, id)).await
    }

    async fn course_overview(&self, id: &str) -> Result<CourseOverview> {
        self.get_json(constants::class_overview(&self.base_url, id)).await
    }

    async fn send_feedback(&self, course_id: &str, feedback: &CourseFeedback) -> Result<()> {
        let _: serde_json::Value = self
            .send_json(reqwest::Method::POST, constants::class_feedback(&self.base_url, course_id), feedback)
            .await?;
        Ok(())
    }

    async fn list_lectures(&self, course_id: Option<&str>) -> Result<Vec<Lecture>> {
        let url = constants::lectures(&self.base_url);
        match course_id {
            Some(id) => self.get_json_with_query(url, &[("class_id", id)]).await,
            None => self.get_json(url).await,
        }
    }

    async fn get_lecture(&self, id: &str) -> Result<Lecture> {
        self.get_json(constants::lecture(&self.base_url, id)).await
    }

    async fn create_lecture(&self, draft: &LectureDraft) -> Result<Lecture> {
        self.send_json(reqwest::Method::POST, constants::lectures(&self.base_url), draft).await
    }

    async fn update_lecture(&self, draft: &LectureDraft) -> Result<Lecture> {
        self.send_json(reqwest::Method::PUT, constants::lectures(&self.base_url), draft).await
    }

    async fn lecture_analysis(&self, id: &str) -> Result<LectureAnalysis> {
        let raw: serde_json::Value = self.get_json(constants::lecture_resource(&self.base_url, id, "analysis")).await?;
        Ok(LectureAnalysis::new(raw))
    }

    async fn analyze_lecture(&self, id: &str, video: &PendingUpload) -> Result<AnalyzeOutcome> {
        let form = Form::new().part(parts::VIDEO, file_part(video, PreconditionError::NoVideo).await?);
        info!("Submitting {} for analysis of lecture {}", video.file_name(), id);
        let raw: serde_json::Value = self
            .send_multipart(constants::lecture_resource(&self.base_url, id, "analyze"), form)
            .await?;
        Ok(AnalyzeOutcome::from_value(raw))
    }

    async fn analyze_materials(&self, id: &str, materials: &PendingUpload) -> Result<MaterialsAnalysis> {
        let form = Form::new().part(parts::MATERIALS, file_part(materials, PreconditionError::NoFile).await?);
        self.send_multipart(constants::lecture_resource(&self.base_url, id, "analyze-materials"), form)
            .await
    }

    async fn materials_analysis(&self, id: &str) -> Result<MaterialsAnalysis> {
        self.get_json(constants::lecture_resource(&self.base_url, id, "materials-analysis")).await
    }

    async fn lecture_surveys(&self, id: &str) -> Result<Vec<Survey>> {
        self.get_json(constants::lecture_resource(&self.base_url, id, "surveys")).await
    }

    async fn survey_responses(&self, id: &str) -> Result<Vec<SurveyResponse>> {
        self.get_json(constants::lecture_resource(&self.base_url, id, "survey-responses")).await
    }

    async fn generate_survey(&self, id: &str, request: &SurveyRequest) -> Result<Survey> {
        self.send_json(
            reqwest::Method::POST,
            constants::lecture_resource(&self.base_url, id, "generate-survey"),
            request,
        )
        .await
    }

    async fn get_survey(&self, id: &str) -> Result<Survey> {
        self.get_json(constants::survey(&self.base_url, id)).await
    }

    async fn submit_survey(&self, id: &str, submission: &SurveySubmission) -> Result<()> {
        let _: serde_json::Value = self
            .send_json(reqwest::Method::POST, constants::survey_submit(&self.base_url, id), submission)
            .await?;
        Ok(())
    }

    async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>> {
        self.get_json_with_query(constants::assignments(&self.base_url), &[("class_id", course_id)])
            .await
    }

    async fn create_assignment(&self, draft: &AssignmentDraft, file: Option<&PendingUpload>) -> Result<Assignment> {
        let url = constants::assignments(&self.base_url);
        match file {
            Some(upload) => {
                let mut form = Form::new()
                    .text("class_id", draft.class_id.clone())
                    .text("title", draft.title.clone())
                    .text("description", draft.description.clone());
                if let Some(due) = &draft.due_date {
                    form = form.text("due_date", due.clone());
                }
                let form = form.part(parts::FILE, file_part(upload, PreconditionError::NoFile).await?);
                self.send_multipart(url, form).await
            }
            None => self.send_json(reqwest::Method::POST, url, draft).await,
        }
    }

    async fn delete_assignment(&self, id: &str) -> Result<()> {
        self.delete(constants::assignment(&self.base_url, id)).await
    }
}

/// Read a local upload into a multipart part; a missing file fails the given precondition
async fn file_part(upload: &PendingUpload, missing: PreconditionError) -> Result<Part> {
    let bytes = tokio::fs::read(&upload.path).await.map_err(|e| {
        warn!("Could not read upload {:?}: {}", upload.path, e);
        DashboardError::Precondition(missing)
    })?;
    Part::bytes(bytes)
        .file_name(upload.file_name())
        .mime_str(upload.mime_type())
        .map_err(network_error)
}

fn network_error(error: reqwest::Error) -> DashboardError {
    DashboardError::Network(error.to_string())
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let body = response.text().await.map_err(network_error)?;
    // 204 and empty bodies deserialize as null
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| DashboardError::Network(format!("unexpected response body: {}", e)))
}

async fn error_from_response(response: reqwest::Response) -> DashboardError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    classify_error_body(status, &body)
}

/// Non-2xx with a `detail` payload is a server error; anything else is a network error
pub(crate) fn classify_error_body(status: u16, body: &str) -> DashboardError {
    match ServerDetail::parse(body) {
        Some(detail) => DashboardError::Server { status, detail },
        None => DashboardError::Network(format!("HTTP {} without a readable body", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_body() {
        let err = classify_error_body(404, r#"{"detail": "Lecture not found"}"#);
        assert_eq!(err.user_message(), "Lecture not found");
        assert!(err.is_user_facing());

        let err = classify_error_body(502, "Bad Gateway");
        assert!(matches!(err, DashboardError::Network(_)));
    }

    #[test]
    fn test_resource_urls() {
        let client = PraxisClient::with_custom_client("http://h/api", reqwest::Client::new(), RetryConfig::disabled());
        assert_eq!(client.lecture_video_url("l1"), "http://h/api/lectures/l1/video");
        assert_eq!(client.assignment_file_url("a1"), "http://h/api/assignments/a1/file");
    }

    #[tokio::test]
    async fn test_missing_video_is_a_precondition_failure() {
        let upload = PendingUpload::new("/definitely/not/here.mp4");
        let err = file_part(&upload, PreconditionError::NoVideo).await.unwrap_err();
        assert_eq!(err, DashboardError::Precondition(PreconditionError::NoVideo));
    }
}
