//! Lecture analysis job tracking
//!
//! One job per lecture id. A job is `Submitting` while the upload request is
//! in flight, `Processing` when the server accepted it for background work,
//! and terminal once the server answered with an analysis or an error.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::api::{AnalyzeOutcome, Lecture, LectureAnalysis, PendingUpload};
use crate::error::{DashboardError, PreconditionError};

/// Progress never passes this value until the server has answered
pub const PROGRESS_CEILING: u8 = 90;

/// Time constant of the progress curve
pub const PROGRESS_TAU: Duration = Duration::from_secs(20);

/// Estimated progress after `elapsed` time waiting on the server.
///
/// `90 * (1 - e^(-t/tau))`, floored: fast early movement, then ever smaller
/// increments that approach but never reach the ceiling.
pub fn progress_estimate(elapsed: Duration) -> u8 {
    let t = elapsed.as_secs_f64() / PROGRESS_TAU.as_secs_f64();
    let value = f64::from(PROGRESS_CEILING) * (1.0 - (-t).exp());
    (value.floor() as u8).min(PROGRESS_CEILING - 1)
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Idle,
    Submitting { started_at: Instant },
    Processing { message: Option<String> },
    Complete,
    Failed { error: DashboardError },
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Submitting { .. } => "submitting",
            JobStatus::Processing { .. } => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Failed { .. } => "failed",
        }
    }

    /// A job that has not reached a terminal state yet
    pub fn is_in_flight(&self) -> bool {
        matches!(self, JobStatus::Submitting { .. } | JobStatus::Processing { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisJob {
    pub lecture_id: String,
    pub status: JobStatus,
    attempt: u64,
}

/// Issued on submit; a completion is only applied if it carries the job's current attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTicket {
    lecture_id: String,
    attempt: u64,
}

impl JobTicket {
    pub fn lecture_id(&self) -> &str {
        &self.lecture_id
    }
}

/// What the caller should do with a finished submit request
#[derive(Debug, Clone, PartialEq)]
pub enum JobResolution {
    /// The job was reset or resubmitted since this request was issued
    Stale,
    /// Synchronous success; render it, then go back to a listing and re-sync it
    Completed(LectureAnalysis),
    /// Accepted for background processing; the user may navigate away
    Processing { message: Option<String> },
    Failed(DashboardError),
}

#[derive(Debug, Default)]
pub struct AsyncJobTracker {
    jobs: HashMap<String, AnalysisJob>,
    attempts: u64,
}

impl AsyncJobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, lecture_id: &str) -> JobStatus {
        self.jobs
            .get(lecture_id)
            .map(|job| job.status.clone())
            .unwrap_or(JobStatus::Idle)
    }

    pub fn job(&self, lecture_id: &str) -> Option<&AnalysisJob> {
        self.jobs.get(lecture_id)
    }

    /// Start a job. Rejected without side effects when a precondition is missing
    /// or a job for the same lecture is still in flight.
    pub fn submit(
        &mut self,
        lecture_id: Option<&str>,
        video: Option<&PendingUpload>,
        now: Instant,
    ) -> Result<JobTicket, PreconditionError> {
        let lecture_id = lecture_id.ok_or(PreconditionError::NoLecture)?;

        if let Some(job) = self.jobs.get(lecture_id) {
            if job.status.is_in_flight() {
                return Err(PreconditionError::JobInFlight {
                    lecture_id: lecture_id.to_string(),
                    state: job.status.label(),
                });
            }
        }

        if video.is_none() {
            return Err(PreconditionError::NoVideo);
        }

        self.attempts += 1;
        let attempt = self.attempts;
        self.jobs.insert(
            lecture_id.to_string(),
            AnalysisJob {
                lecture_id: lecture_id.to_string(),
                status: JobStatus::Submitting { started_at: now },
                attempt,
            },
        );
        log::info!("Analysis submitted for lecture {} (attempt {})", lecture_id, attempt);

        Ok(JobTicket { lecture_id: lecture_id.to_string(), attempt })
    }

    /// Apply the server's answer to a submit request
    pub fn resolve(
        &mut self,
        ticket: &JobTicket,
        result: Result<AnalyzeOutcome, DashboardError>,
    ) -> JobResolution {
        let Some(job) = self.jobs.get_mut(&ticket.lecture_id) else {
            log::debug!("Dropping analysis result for forgotten lecture {}", ticket.lecture_id);
            return JobResolution::Stale;
        };
        if job.attempt != ticket.attempt || !matches!(job.status, JobStatus::Submitting { .. }) {
            log::debug!(
                "Dropping stale analysis result for lecture {} (attempt {}, current {})",
                ticket.lecture_id,
                ticket.attempt,
                job.attempt
            );
            return JobResolution::Stale;
        }

        match result {
            Ok(AnalyzeOutcome::Completed(analysis)) => {
                log::info!("Analysis complete for lecture {}", ticket.lecture_id);
                job.status = JobStatus::Complete;
                JobResolution::Completed(analysis)
            }
            Ok(AnalyzeOutcome::Processing { message }) => {
                log::info!("Analysis for lecture {} continues in the background", ticket.lecture_id);
                job.status = JobStatus::Processing { message: message.clone() };
                JobResolution::Processing { message }
            }
            Err(error) => {
                error.log(&format!("Analysis for lecture {}", ticket.lecture_id));
                job.status = JobStatus::Failed { error: error.clone() };
                JobResolution::Failed(error)
            }
        }
    }

    /// Progress to display for a lecture, or None when nothing is being waited on
    pub fn progress(&self, lecture_id: &str, now: Instant) -> Option<u8> {
        match self.jobs.get(lecture_id).map(|job| &job.status) {
            Some(JobStatus::Submitting { started_at }) => {
                Some(progress_estimate(now.saturating_duration_since(*started_at)))
            }
            Some(JobStatus::Complete) => Some(100),
            _ => None,
        }
    }

    /// Whether any request is awaiting the server, i.e. the progress timer must run
    pub fn needs_tick(&self) -> bool {
        self.jobs
            .values()
            .any(|job| matches!(job.status, JobStatus::Submitting { .. }))
    }

    /// User dismissed a failure; the lecture may be submitted again
    pub fn acknowledge(&mut self, lecture_id: &str) {
        if matches!(self.status(lecture_id), JobStatus::Failed { .. }) {
            self.jobs.remove(lecture_id);
        }
    }

    /// The owning screen was left: terminal jobs reset to idle, in-flight jobs are kept
    pub fn leave(&mut self, lecture_id: &str) {
        if let Some(job) = self.jobs.get(lecture_id) {
            if !job.status.is_in_flight() {
                log::debug!("Resetting {} analysis job for lecture {}", job.status.label(), lecture_id);
                self.jobs.remove(lecture_id);
            }
        }
    }

    /// Reconcile with the lecture list endpoint, which knows about jobs started in earlier sessions.
    ///
    /// Returns the lectures whose background job the server no longer reports as
    /// running without having produced an analysis. Those jobs are reset so the
    /// lecture can be submitted again.
    pub fn observe_listing(&mut self, lectures: &[Lecture]) -> Vec<String> {
        let mut stopped = Vec::new();
        for lecture in lectures {
            let local = self.jobs.get(&lecture.id).map(|job| job.status.clone());
            match local {
                Some(JobStatus::Processing { .. }) if lecture.has_analysis => {
                    log::info!("Background analysis finished for lecture {}", lecture.id);
                    self.jobs.remove(&lecture.id);
                }
                Some(JobStatus::Processing { .. }) if !lecture.is_analysis_pending() => {
                    log::warn!(
                        "Background analysis for lecture {} stopped without a result (status {:?})",
                        lecture.id,
                        lecture.analysis_status
                    );
                    self.jobs.remove(&lecture.id);
                    stopped.push(lecture.id.clone());
                }
                None | Some(JobStatus::Idle) if lecture.is_analysis_pending() => {
                    self.attempts += 1;
                    self.jobs.insert(
                        lecture.id.clone(),
                        AnalysisJob {
                            lecture_id: lecture.id.clone(),
                            status: JobStatus::Processing { message: None },
                            attempt: self.attempts,
                        },
                    );
                }
                _ => {}
            }
        }
        stopped
    }

    /// Lecture ids with a background job still running
    pub fn processing(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .jobs
            .values()
            .filter(|job| matches!(job.status, JobStatus::Processing { .. }))
            .map(|job| job.lecture_id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video() -> PendingUpload {
        PendingUpload::new("/tmp/lecture.mp4")
    }

    fn lecture(id: &str, has_analysis: bool, status: Option<&str>) -> Lecture {
        Lecture {
            id: id.to_string(),
            class_id: "c1".to_string(),
            title: format!("Lecture {}", id),
            lecture_number: None,
            date: None,
            topics: vec![],
            has_analysis,
            analysis_status: status.map(str::to_string),
            video_path: None,
        }
    }

    #[test]
    fn test_progress_is_bounded_and_monotonic() {
        let mut last = 0;
        for ms in (0..600_000).step_by(250) {
            let p = progress_estimate(Duration::from_millis(ms));
            assert!(p >= last, "progress went backwards at {}ms", ms);
            assert!(p < 90);
            last = p;
        }
        assert_eq!(progress_estimate(Duration::ZERO), 0);
        assert!(progress_estimate(Duration::from_secs(20)) >= 56);
    }

    #[test]
    fn test_second_submit_is_rejected_while_in_flight() {
        let mut tracker = AsyncJobTracker::new();
        let now = Instant::now();
        let ticket = tracker.submit(Some("l1"), Some(&video()), now).unwrap();
        let err = tracker.submit(Some("l1"), Some(&video()), now).unwrap_err();
        assert_eq!(err, PreconditionError::JobInFlight { lecture_id: "l1".into(), state: "submitting" });

        tracker.resolve(&ticket, Ok(AnalyzeOutcome::Processing { message: None }));
        let err = tracker.submit(Some("l1"), Some(&video()), now).unwrap_err();
        assert!(matches!(err, PreconditionError::JobInFlight { state: "processing", .. }));
    }

    #[test]
    fn test_precondition_order() {
        let mut tracker = AsyncJobTracker::new();
        let now = Instant::now();
        assert_eq!(tracker.submit(None, Some(&video()), now), Err(PreconditionError::NoLecture));
        assert_eq!(tracker.submit(Some("l1"), None, now), Err(PreconditionError::NoVideo));
        assert_eq!(tracker.status("l1"), JobStatus::Idle);
    }

    #[test]
    fn test_progress_reaches_100_only_on_success() {
        let mut tracker = AsyncJobTracker::new();
        let start = Instant::now();
        let ticket = tracker.submit(Some("l1"), Some(&video()), start).unwrap();
        assert!(tracker.needs_tick());
        assert!(tracker.progress("l1", start + Duration::from_secs(3600)).unwrap() <= 90);

        let resolution = tracker.resolve(&ticket, Ok(AnalyzeOutcome::Completed(LectureAnalysis::new(json!({})))));
        assert!(matches!(resolution, JobResolution::Completed(_)));
        assert_eq!(tracker.progress("l1", start), Some(100));
        assert!(!tracker.needs_tick());

        tracker.leave("l1");
        assert_eq!(tracker.status("l1"), JobStatus::Idle);
    }

    #[test]
    fn test_failure_allows_retry_after_acknowledge() {
        let mut tracker = AsyncJobTracker::new();
        let now = Instant::now();
        let ticket = tracker.submit(Some("l1"), Some(&video()), now).unwrap();
        let resolution = tracker.resolve(&ticket, Err(DashboardError::Network("reset".into())));
        assert!(matches!(resolution, JobResolution::Failed(_)));
        assert_eq!(tracker.progress("l1", now), None);
        assert!(!tracker.needs_tick());

        tracker.acknowledge("l1");
        assert_eq!(tracker.status("l1"), JobStatus::Idle);
        assert!(tracker.submit(Some("l1"), Some(&video()), now).is_ok());
    }

    #[test]
    fn test_late_answer_for_superseded_attempt_is_stale() {
        let mut tracker = AsyncJobTracker::new();
        let now = Instant::now();
        let first = tracker.submit(Some("l1"), Some(&video()), now).unwrap();
        tracker.resolve(&first, Err(DashboardError::Network("timeout".into())));
        let second = tracker.submit(Some("l1"), Some(&video()), now).unwrap();

        let late = tracker.resolve(&first, Ok(AnalyzeOutcome::Processing { message: None }));
        assert_eq!(late, JobResolution::Stale);
        assert!(matches!(tracker.status("l1"), JobStatus::Submitting { .. }));
        assert_eq!(second.lecture_id(), "l1");
    }

    #[test]
    fn test_listing_reconciliation() {
        let mut tracker = AsyncJobTracker::new();
        tracker.observe_listing(&[lecture("l1", false, Some("processing")), lecture("l2", true, None)]);
        assert_eq!(tracker.processing(), vec!["l1"]);

        assert!(tracker.observe_listing(&[lecture("l1", true, None)]).is_empty());
        assert!(tracker.processing().is_empty());
        assert_eq!(tracker.status("l1"), JobStatus::Idle);
    }

    #[test]
    fn test_background_job_dropped_by_server_is_reset() {
        let mut tracker = AsyncJobTracker::new();
        let now = Instant::now();
        let ticket = tracker.submit(Some("l3"), Some(&video()), now).unwrap();
        tracker.resolve(&ticket, Ok(AnalyzeOutcome::Processing { message: None }));

        let stopped = tracker.observe_listing(&[lecture("l3", false, Some("failed"))]);

        assert_eq!(stopped, vec!["l3".to_string()]);
        assert!(tracker.processing().is_empty());
        assert!(tracker.submit(Some("l3"), Some(&video()), now).is_ok());
    }

    #[test]
    fn test_leaving_keeps_in_flight_jobs() {
        let mut tracker = AsyncJobTracker::new();
        tracker.submit(Some("l1"), Some(&video()), Instant::now()).unwrap();
        tracker.leave("l1");
        assert!(tracker.status("l1").is_in_flight());
    }
}
