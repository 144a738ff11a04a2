//! REST endpoint definitions
//!
//! Each struct describes one Canvas endpoint. Paths are relative, so they
//! resolve under `/api/v1/`.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;

use canvas_core::{codec, ApiMethod, CodecError, FormData, FormValue, QueryItem, Requestable};
use canvas_domain::{ApiAssignment, ApiCourse, ApiFile, ApiProfile, ApiUser, EnrollmentState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const COURSE_INCLUDES: &[&str] = &[
    "banner_image",
    "course_image",
    "current_grading_period_scores",
    "favorites",
    "observed_users",
    "sections",
    "syllabus_body",
    "term",
    "total_scores",
];

/// `GET courses` or `GET users/:id/courses` for an observed student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCoursesRequest {
    pub enrollment_state: Option<EnrollmentState>,
    pub enrollment_type: Option<String>,
    pub state: Vec<String>,
    pub per_page: u32,
    pub student_id: Option<String>,
}

impl Default for GetCoursesRequest {
    fn default() -> Self {
        Self {
            enrollment_state: Some(EnrollmentState::Active),
            enrollment_type: None,
            state: Vec::new(),
            per_page: 10,
            student_id: None,
        }
    }
}

impl Requestable for GetCoursesRequest {
    type Response = Vec<ApiCourse>;

    fn path(&self) -> String {
        match &self.student_id {
            Some(student_id) => format!("users/{student_id}/courses"),
            None => "courses".to_string(),
        }
    }

    fn query(&self) -> Vec<QueryItem> {
        vec![
            QueryItem::include(COURSE_INCLUDES.iter().copied()),
            QueryItem::PerPage(Some(self.per_page)),
            QueryItem::OptionalValue(
                "enrollment_state".into(),
                self.enrollment_state.map(|s| s.as_str().to_string()),
            ),
            QueryItem::Array("state".into(), self.state.clone()),
            QueryItem::OptionalValue("enrollment_type".into(), self.enrollment_type.clone()),
        ]
    }
}

/// `GET courses/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCourseRequest {
    pub course_id: String,
}

impl Requestable for GetCourseRequest {
    type Response = ApiCourse;

    fn path(&self) -> String {
        format!("courses/{}", self.course_id)
    }

    fn query(&self) -> Vec<QueryItem> {
        vec![QueryItem::include(COURSE_INCLUDES.iter().copied())]
    }
}

/// `GET courses/:id/assignments`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAssignmentsRequest {
    pub course_id: String,
    pub include_submission: bool,
    pub per_page: Option<u32>,
}

impl Requestable for GetAssignmentsRequest {
    type Response = Vec<ApiAssignment>;

    fn path(&self) -> String {
        format!("courses/{}/assignments", self.course_id)
    }

    fn query(&self) -> Vec<QueryItem> {
        let mut include = vec!["observed_users"];
        if self.include_submission {
            include.push("submission");
        }
        vec![QueryItem::include(include), QueryItem::PerPage(self.per_page)]
    }
}

/// `GET users/:id` (`self` for the current user)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserRequest {
    pub user_id: String,
}

impl Requestable for GetUserRequest {
    type Response = ApiUser;

    fn path(&self) -> String {
        format!("users/{}", self.user_id)
    }
}

/// `GET users/:id/profile`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserProfileRequest {
    pub user_id: String,
}

impl Default for GetUserProfileRequest {
    fn default() -> Self {
        Self { user_id: "self".to_string() }
    }
}

impl Requestable for GetUserProfileRequest {
    type Response = ApiProfile;

    fn path(&self) -> String {
        format!("users/{}/profile", self.user_id)
    }
}

/// `GET files/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFileRequest {
    pub file_id: String,
}

impl Requestable for GetFileRequest {
    type Response = ApiFile;

    fn path(&self) -> String {
        format!("files/{}", self.file_id)
    }

    fn query(&self) -> Vec<QueryItem> {
        vec![QueryItem::include(["avatar", "usage_rights", "user"])]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUploadBody {
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_duplicate: Option<String>,
}

/// Where and how to send the file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileUploadTarget {
    pub upload_url: String,
    #[serde(default)]
    pub upload_params: BTreeMap<String, Option<String>>,
}

/// Step one of a file upload: `POST <context>/files`, e.g.
/// `courses/1/files` or `users/self/files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFileUploadTargetRequest {
    pub context: String,
    pub body: FileUploadBody,
}

impl Requestable for PostFileUploadTargetRequest {
    type Response = FileUploadTarget;

    fn path(&self) -> String {
        format!("{}/files", self.context)
    }

    fn method(&self) -> ApiMethod {
        ApiMethod::Post
    }

    fn body(&self) -> Result<Option<Vec<u8>>, CodecError> {
        codec::encode_json(&self.body).map(Some)
    }
}

/// Step two: multipart POST of the file to the upload URL. The target is
/// usually another host, so no `Authorization` header is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFileUploadRequest {
    pub target: FileUploadTarget,
    pub filename: String,
    pub content_type: String,
    pub path: PathBuf,
}

impl Requestable for PostFileUploadRequest {
    type Response = ApiFile;

    fn path(&self) -> String {
        self.target.upload_url.clone()
    }

    fn method(&self) -> ApiMethod {
        ApiMethod::Post
    }

    fn form(&self) -> Option<FormData> {
        let form = self
            .target
            .upload_params
            .iter()
            .fold(FormData::new(), |form, (key, value)| {
                form.text(key.clone(), value.clone().unwrap_or_default())
            })
            .field(
                "file",
                FormValue::File {
                    filename: self.filename.clone(),
                    content_type: self.content_type.clone(),
                    path: self.path.clone(),
                },
            );
        Some(form)
    }

    fn should_add_no_verifier_query(&self) -> bool {
        false
    }
}

/// Any path, decoded into `T`. Backs the CLI `get` command.
#[derive(Debug, Clone)]
pub struct RawRequest<T> {
    pub path: String,
    pub query: Vec<QueryItem>,
    response: PhantomData<fn() -> T>,
}

impl<T> RawRequest<T> {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: Vec::new(), response: PhantomData }
    }

    #[must_use]
    pub fn with_query(mut self, item: QueryItem) -> Self {
        self.query.push(item);
        self
    }
}

impl<T: DeserializeOwned + Send + 'static> Requestable for RawRequest<T> {
    type Response = T;

    fn path(&self) -> String {
        self.path.clone()
    }

    fn query(&self) -> Vec<QueryItem> {
        self.query.clone()
    }
}
