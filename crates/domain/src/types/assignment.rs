//! Assignment and submission records
//!
//! https://canvas.instructure.com/doc/api/assignments.html

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{ids, iso8601};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiAssignment {
    #[serde(deserialize_with = "ids::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "ids::deserialize")]
    pub course_id: String,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default, with = "iso8601::option")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601::option")]
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601::option")]
    pub unlock_at: Option<DateTime<Utc>>,
    pub points_possible: Option<f64>,
    pub grading_type: String,
    #[serde(default)]
    pub submission_types: Vec<String>,
    pub position: Option<i32>,
    pub published: Option<bool>,
    pub locked_for_user: Option<bool>,
    #[serde(default, deserialize_with = "ids::option::deserialize")]
    pub quiz_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<ApiSubmission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionWorkflowState {
    Submitted,
    Unsubmitted,
    Graded,
    PendingReview,
    Complete,
}

/// https://canvas.instructure.com/doc/api/submissions.html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSubmission {
    #[serde(deserialize_with = "ids::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "ids::deserialize")]
    pub assignment_id: String,
    #[serde(deserialize_with = "ids::deserialize")]
    pub user_id: String,
    pub attempt: Option<i32>,
    pub body: Option<String>,
    pub grade: Option<String>,
    pub score: Option<f64>,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    pub missing: bool,
    #[serde(default, with = "iso8601::option")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601::option")]
    pub graded_at: Option<DateTime<Utc>>,
    pub workflow_state: SubmissionWorkflowState,
}
