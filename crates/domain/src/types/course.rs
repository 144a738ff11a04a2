//! Course and enrollment records
//!
//! https://canvas.instructure.com/doc/api/courses.html#Course

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{ids, iso8601};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCourse {
    #[serde(deserialize_with = "ids::deserialize")]
    pub id: String,
    pub name: Option<String>,
    pub course_code: Option<String>,
    pub course_color: Option<String>,
    pub workflow_state: Option<String>,
    #[serde(default, deserialize_with = "ids::option::deserialize")]
    pub account_id: Option<String>,
    #[serde(default, with = "iso8601::option")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601::option")]
    pub end_at: Option<DateTime<Utc>>,
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollments: Option<Vec<ApiEnrollment>>,
    pub syllabus_body: Option<String>,
    pub hide_final_grades: Option<bool>,
    pub access_restricted_by_date: Option<bool>,
    pub image_download_url: Option<String>,
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    Active,
    Inactive,
    Invited,
    Completed,
    Creation,
    Deleted,
    Rejected,
    CurrentAndInvited,
    CurrentAndFuture,
    CurrentAndConcluded,
}

impl EnrollmentState {
    /// Wire value used in `state[]` query items.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Invited => "invited",
            Self::Completed => "completed",
            Self::Creation => "creation",
            Self::Deleted => "deleted",
            Self::Rejected => "rejected",
            Self::CurrentAndInvited => "current_and_invited",
            Self::CurrentAndFuture => "current_and_future",
            Self::CurrentAndConcluded => "current_and_concluded",
        }
    }
}

/// https://canvas.instructure.com/doc/api/enrollments.html#Enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnrollment {
    #[serde(default, deserialize_with = "ids::option::deserialize")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "ids::option::deserialize")]
    pub course_id: Option<String>,
    #[serde(default, deserialize_with = "ids::option::deserialize")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub enrollment_type: String,
    pub role: Option<String>,
    pub enrollment_state: EnrollmentState,
    #[serde(default, with = "iso8601::option")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601::option")]
    pub end_at: Option<DateTime<Utc>>,
    pub computed_current_score: Option<f64>,
    pub computed_current_grade: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_course_with_enrollments() {
        let json = r#"{
            "id": "1",
            "name": "Biology 101",
            "course_code": "BIO101",
            "start_at": "2024-08-20T06:00:00Z",
            "end_at": null,
            "enrollments": [
                {"type": "student", "enrollment_state": "active", "computed_current_score": 91.5}
            ]
        }"#;

        let course: ApiCourse = serde_json::from_str(json).unwrap();
        assert_eq!(course.id, "1");
        assert_eq!(course.name.as_deref(), Some("Biology 101"));
        assert!(course.start_at.is_some());
        assert!(course.end_at.is_none());

        let enrollment = &course.enrollments.unwrap()[0];
        assert_eq!(enrollment.enrollment_type, "student");
        assert_eq!(enrollment.enrollment_state, EnrollmentState::Active);
    }

    #[test]
    fn enrollment_state_wire_values_match_serde() {
        let json = serde_json::to_string(&EnrollmentState::CurrentAndFuture).unwrap();
        assert_eq!(json, format!("\"{}\"", EnrollmentState::CurrentAndFuture.as_str()));
    }
}
