//! Status classification
//!
//! Reduces each entity kind's backend status vocabulary to a three-state
//! status. Sub-task progress, when present, overrides the backend status.

use serde::{Deserialize, Serialize};

/// Simplified work status shown in lists and count badges
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleStatus {
    NotStarted,
    InProgress,
    Done,
}

impl SimpleStatus {
    pub const ALL: [SimpleStatus; 3] = [
        SimpleStatus::NotStarted,
        SimpleStatus::InProgress,
        SimpleStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimpleStatus::NotStarted => "not_started",
            SimpleStatus::InProgress => "in_progress",
            SimpleStatus::Done => "done",
        }
    }

    /// Parse `not_started` / `in_progress` / `done` (also accepts `-` and spaces)
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_status(s).as_str() {
            "not_started" => Some(SimpleStatus::NotStarted),
            "in_progress" => Some(SimpleStatus::InProgress),
            "done" => Some(SimpleStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for SimpleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend status vocabulary of one entity kind.
///
/// `map_status` receives the normalized status (lower-case, `_` separated)
/// and returns `None` for anything it does not know.
pub trait StatusVocabulary {
    fn map_status(normalized: &str) -> Option<SimpleStatus>;
}

/// Work plan statuses
pub struct WorkPlanStatuses;

impl StatusVocabulary for WorkPlanStatuses {
    fn map_status(normalized: &str) -> Option<SimpleStatus> {
        match normalized {
            "draft" | "pending" | "approved" | "rejected" => Some(SimpleStatus::NotStarted),
            "in_progress" => Some(SimpleStatus::InProgress),
            "completed" => Some(SimpleStatus::Done),
            _ => None,
        }
    }
}

/// Schedule statuses
pub struct ScheduleStatuses;

impl StatusVocabulary for ScheduleStatuses {
    fn map_status(normalized: &str) -> Option<SimpleStatus> {
        match normalized {
            "draft" | "pending" | "submitted" | "approved" | "rejected" => {
                Some(SimpleStatus::NotStarted)
            }
            "in_progress" | "ongoing" => Some(SimpleStatus::InProgress),
            "completed" | "finished" => Some(SimpleStatus::Done),
            _ => None,
        }
    }
}

/// Outgoing document statuses
pub struct OutgoingDocumentStatuses;

impl StatusVocabulary for OutgoingDocumentStatuses {
    fn map_status(normalized: &str) -> Option<SimpleStatus> {
        match normalized {
            "draft" | "pending_approval" | "rejected" => Some(SimpleStatus::NotStarted),
            "approved" | "signing" | "processing" => Some(SimpleStatus::InProgress),
            "published" | "issued" | "completed" => Some(SimpleStatus::Done),
            _ => None,
        }
    }
}

/// Entities that can report a simplified status
pub trait Classified {
    fn simple_status(&self) -> SimpleStatus;
}

fn normalize_status(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Arithmetic mean of the progress values, rounded to the nearest integer.
/// Returns 0 when there are no values.
pub fn overall_progress(progress: impl IntoIterator<Item = f64>) -> i64 {
    let (sum, count) = progress
        .into_iter()
        .fold((0.0_f64, 0_u32), |(sum, count), p| (sum + p, count + 1));
    if count == 0 {
        return 0;
    }
    (sum / f64::from(count)).round() as i64
}

/// Classify from a raw backend status and the sub-task progress values.
///
/// Progress of 100 or more is always `Done`, progress strictly between 0 and
/// 100 is always `InProgress`; only zero progress defers to the backend status.
pub fn classify<V: StatusVocabulary>(
    raw_status: &str,
    progress: impl IntoIterator<Item = f64>,
) -> SimpleStatus {
    let overall = overall_progress(progress);
    if overall >= 100 {
        SimpleStatus::Done
    } else if overall > 0 {
        SimpleStatus::InProgress
    } else {
        classify_backend::<V>(raw_status)
    }
}

/// Classify from the backend status alone. Unknown statuses are `NotStarted`.
pub fn classify_backend<V: StatusVocabulary>(raw_status: &str) -> SimpleStatus {
    V::map_status(&normalize_status(raw_status)).unwrap_or(SimpleStatus::NotStarted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_progress() {
        assert_eq!(overall_progress(Vec::<f64>::new()), 0);
        assert_eq!(overall_progress([40.0, 60.0]), 50);
        assert_eq!(overall_progress([33.0, 34.0]), 34);
        assert_eq!(overall_progress([10.0, 10.0, 11.0]), 10);
    }

    #[test]
    fn test_progress_overrides_backend() {
        assert_eq!(classify::<WorkPlanStatuses>("draft", [100.0]), SimpleStatus::Done);
        assert_eq!(
            classify::<WorkPlanStatuses>("completed", [40.0, 60.0]),
            SimpleStatus::InProgress
        );
        assert_eq!(classify::<WorkPlanStatuses>("approved", [100.0]), SimpleStatus::Done);
    }

    #[test]
    fn test_zero_progress_defers_to_backend() {
        assert_eq!(classify::<WorkPlanStatuses>("completed", [0.0]), SimpleStatus::Done);
        assert_eq!(
            classify::<WorkPlanStatuses>("in_progress", [0.0, 0.0]),
            SimpleStatus::InProgress
        );
        assert_eq!(classify::<WorkPlanStatuses>("pending", [0.0]), SimpleStatus::NotStarted);
    }

    #[test]
    fn test_small_progress_rounds_to_zero() {
        // mean 0.4 rounds to 0, so the backend status decides
        assert_eq!(
            classify::<WorkPlanStatuses>("completed", [0.4]),
            SimpleStatus::Done
        );
    }

    #[test]
    fn test_backend_vocabulary() {
        for s in ["draft", "pending", "approved", "rejected"] {
            assert_eq!(classify_backend::<WorkPlanStatuses>(s), SimpleStatus::NotStarted);
        }
        assert_eq!(classify_backend::<WorkPlanStatuses>("IN_PROGRESS"), SimpleStatus::InProgress);
        assert_eq!(classify_backend::<WorkPlanStatuses>("in-progress"), SimpleStatus::InProgress);
        assert_eq!(classify_backend::<WorkPlanStatuses>("Completed"), SimpleStatus::Done);
        assert_eq!(classify_backend::<WorkPlanStatuses>("archived"), SimpleStatus::NotStarted);
        assert_eq!(classify_backend::<WorkPlanStatuses>(""), SimpleStatus::NotStarted);
    }

    #[test]
    fn test_schedule_and_outgoing_vocabularies() {
        assert_eq!(classify_backend::<ScheduleStatuses>("ongoing"), SimpleStatus::InProgress);
        assert_eq!(classify_backend::<ScheduleStatuses>("finished"), SimpleStatus::Done);
        assert_eq!(
            classify_backend::<OutgoingDocumentStatuses>("PENDING_APPROVAL"),
            SimpleStatus::NotStarted
        );
        assert_eq!(
            classify_backend::<OutgoingDocumentStatuses>("signing"),
            SimpleStatus::InProgress
        );
        assert_eq!(classify_backend::<OutgoingDocumentStatuses>("issued"), SimpleStatus::Done);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let first = classify::<WorkPlanStatuses>("approved", [20.0, 90.0]);
        let second = classify::<WorkPlanStatuses>("approved", [20.0, 90.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_simple_status() {
        assert_eq!(SimpleStatus::parse("in-progress"), Some(SimpleStatus::InProgress));
        assert_eq!(SimpleStatus::parse("DONE"), Some(SimpleStatus::Done));
        assert_eq!(SimpleStatus::parse("later"), None);
        assert_eq!(SimpleStatus::NotStarted.to_string(), "not_started");
    }
}
