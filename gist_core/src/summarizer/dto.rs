use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProviderError;

/// `status_code` value the generation API uses for a finished job.
pub const STATUS_COMPLETE: i64 = 2;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

const REQUEST_TYPE: &str = "text";

/// Body of `POST /api/generation`: the first call carries the text, every
/// following call only the session id handed out by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl GenerationRequest {
    pub fn initial(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            session_id: None,
            kind: REQUEST_TYPE,
        }
    }

    pub fn continuation(session_id: &str) -> Self {
        Self {
            text: None,
            session_id: Some(session_id.to_string()),
            kind: REQUEST_TYPE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thesis {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub content: String,
    #[serde(default)]
    pub theses: Vec<Thesis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Complete,
}

impl JobStatus {
    pub fn from_code(status_code: i64) -> Self {
        if status_code == STATUS_COMPLETE {
            JobStatus::Complete
        } else {
            JobStatus::Pending
        }
    }
}

/// Job state as returned by every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationSnapshot {
    pub status_code: i64,
    #[serde(default)]
    pub have_chapters: bool,
    #[serde(default, deserialize_with = "session_id_or_false")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// What the poll loop does next.
#[derive(Debug)]
pub enum JobOutcome {
    Pending { session_id: String, wait: Duration },
    Complete { chapters: Vec<Chapter> },
    Failed(ProviderError),
}

impl GenerationSnapshot {
    pub fn status(&self) -> JobStatus {
        JobStatus::from_code(self.status_code)
    }

    pub fn outcome(self) -> JobOutcome {
        match self.status() {
            JobStatus::Complete if self.chapters.is_empty() => JobOutcome::Failed(ProviderError::NoChapters),
            JobStatus::Complete => JobOutcome::Complete {
                chapters: self.chapters,
            },
            JobStatus::Pending if !self.have_chapters => JobOutcome::Failed(ProviderError::NoChapters),
            JobStatus::Pending => match self.session_id {
                None => JobOutcome::Failed(ProviderError::NoSessionId),
                Some(session_id) => JobOutcome::Pending {
                    session_id,
                    wait: Duration::from_millis(
                        self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
                    ),
                },
            },
        }
    }
}

// The API sends `false` instead of a session id once it has nothing to poll.
fn session_id_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(String),
        Flag(#[allow(dead_code)] bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Id(id)) if !id.is_empty() => Some(id),
        Some(Raw::Id(_)) | Some(Raw::Flag(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> GenerationSnapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_shapes() {
        assert_eq!(
            serde_json::to_value(GenerationRequest::initial("some text")).unwrap(),
            json!({"text": "some text", "type": "text"})
        );
        assert_eq!(
            serde_json::to_value(GenerationRequest::continuation("abc")).unwrap(),
            json!({"session_id": "abc", "type": "text"})
        );
    }

    #[test]
    fn test_any_non_two_status_is_pending() {
        assert_eq!(JobStatus::from_code(2), JobStatus::Complete);
        for code in [0, 1, 3, -1] {
            assert_eq!(JobStatus::from_code(code), JobStatus::Pending);
        }
    }

    #[test]
    fn test_pending_outcome_uses_provider_interval() {
        let outcome = snapshot(json!({
            "status_code": 1,
            "have_chapters": true,
            "session_id": "abc",
            "poll_interval_ms": 500
        }))
        .outcome();

        match outcome {
            JobOutcome::Pending { session_id, wait } => {
                assert_eq!(session_id, "abc");
                assert_eq!(wait, Duration::from_millis(500));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_missing_interval_falls_back_to_default() {
        let outcome = snapshot(json!({
            "status_code": 0,
            "have_chapters": true,
            "session_id": "abc"
        }))
        .outcome();

        assert!(matches!(
            outcome,
            JobOutcome::Pending { wait, .. } if wait == Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        ));
    }

    #[test]
    fn test_complete_outcome_returns_chapters() {
        let outcome = snapshot(json!({
            "status_code": 2,
            "have_chapters": true,
            "session_id": false,
            "chapters": [{"content": "Intro", "theses": [{"content": "Point A"}]}]
        }))
        .outcome();

        match outcome {
            JobOutcome::Complete { chapters } => {
                assert_eq!(chapters.len(), 1);
                assert_eq!(chapters[0].content, "Intro");
                assert_eq!(chapters[0].theses[0].content, "Point A");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_complete_without_chapters_fails() {
        let outcome = snapshot(json!({"status_code": 2, "chapters": []})).outcome();
        assert!(matches!(outcome, JobOutcome::Failed(ProviderError::NoChapters)));
    }

    #[test]
    fn test_pending_without_chapters_fails() {
        let outcome = snapshot(json!({
            "status_code": 1,
            "have_chapters": false,
            "session_id": "abc",
            "poll_interval_ms": 500
        }))
        .outcome();
        assert!(matches!(outcome, JobOutcome::Failed(ProviderError::NoChapters)));
    }

    #[test]
    fn test_pending_with_false_session_id_fails() {
        let outcome = snapshot(json!({
            "status_code": 1,
            "have_chapters": true,
            "session_id": false,
            "poll_interval_ms": 500
        }))
        .outcome();
        assert!(matches!(outcome, JobOutcome::Failed(ProviderError::NoSessionId)));
    }

    #[test]
    fn test_pending_with_missing_session_id_fails() {
        let outcome = snapshot(json!({"status_code": 1, "have_chapters": true})).outcome();
        assert!(matches!(outcome, JobOutcome::Failed(ProviderError::NoSessionId)));
    }
}
