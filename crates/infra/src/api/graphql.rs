//! GraphQL requests
//!
//! A [`GraphQlQuery`] names an operation; [`GraphQlRequest`] turns it into a
//! POST against `/api/graphql` and unwraps the `data` member.

use canvas_core::{codec, ApiMethod, CodecError, Requestable};
use canvas_domain::constants::GRAPHQL_PATH;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One GraphQL operation and its variables.
pub trait GraphQlQuery: Send + Sync {
    type Variables: Serialize;
    type Data: DeserializeOwned + Send + 'static;

    const OPERATION_NAME: &'static str;
    const QUERY: &'static str;

    fn variables(&self) -> Self::Variables;
}

#[derive(Serialize)]
struct GraphQlBody<'a, V> {
    query: &'a str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(bound = "D: DeserializeOwned")]
struct GraphQlResponse<D> {
    data: Option<D>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

/// Requestable wrapper for a [`GraphQlQuery`].
#[derive(Debug, Clone)]
pub struct GraphQlRequest<Q>(pub Q);

impl<Q: GraphQlQuery> Requestable for GraphQlRequest<Q> {
    type Response = Q::Data;

    fn path(&self) -> String {
        GRAPHQL_PATH.to_string()
    }

    fn method(&self) -> ApiMethod {
        ApiMethod::Post
    }

    fn body(&self) -> Result<Option<Vec<u8>>, CodecError> {
        let body = GraphQlBody {
            query: Q::QUERY,
            operation_name: Q::OPERATION_NAME,
            variables: self.0.variables(),
        };
        codec::encode_json(&body).map(Some)
    }

    fn decode(&self, data: &[u8]) -> Result<Self::Response, CodecError> {
        let response: GraphQlResponse<Q::Data> = codec::decode_json(data)?;
        if let Some(error) = response.errors.into_iter().next() {
            return Err(CodecError::Remote(error.message));
        }
        response
            .data
            .ok_or_else(|| CodecError::Decode(format!("{} returned no data", Q::OPERATION_NAME)))
    }
}

/// Courses a user is enrolled in, with enrollment state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCoursesQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCoursesVariables {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCoursesData {
    pub legacy_node: Option<UserCoursesNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCoursesNode {
    #[serde(default)]
    pub enrollments: Vec<UserCourseEnrollment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCourseEnrollment {
    pub id: String,
    pub state: String,
    pub course: UserCourse,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserCourse {
    pub id: String,
    pub name: String,
}

impl GraphQlQuery for UserCoursesQuery {
    type Variables = UserCoursesVariables;
    type Data = UserCoursesData;

    const OPERATION_NAME: &'static str = "GetUserCourses";
    const QUERY: &'static str = "query GetUserCourses($id: ID!) {
  legacyNode(_id: $id, type: User) {
    ... on User {
      enrollments(currentOnly: false) {
        id: _id
        state
        course {
          id: _id
          name
        }
      }
    }
  }
}";

    fn variables(&self) -> Self::Variables {
        UserCoursesVariables { id: self.user_id.clone() }
    }
}

#[cfg(test)]
mod tests {
    use canvas_core::RequestContext;
    use url::Url;

    use super::*;

    fn request() -> GraphQlRequest<UserCoursesQuery> {
        GraphQlRequest(UserCoursesQuery { user_id: "12".into() })
    }

    #[test]
    fn posts_operation_to_graphql_endpoint() {
        let base = Url::parse("https://canvas.test").unwrap();
        let prepared = request().prepare(&RequestContext::new(&base, "agent")).unwrap();

        assert_eq!(prepared.method, ApiMethod::Post);
        assert_eq!(prepared.url.path(), "/api/graphql");

        let body: serde_json::Value = serde_json::from_slice(&prepared.body.unwrap()).unwrap();
        assert_eq!(body["operationName"], "GetUserCourses");
        assert_eq!(body["variables"]["id"], "12");
        assert!(body["query"].as_str().unwrap().starts_with("query GetUserCourses"));
    }

    #[test]
    fn unwraps_data() {
        let data = request()
            .decode(
                br#"{"data":{"legacyNode":{"enrollments":[
                    {"id":"1","state":"active","course":{"id":"5","name":"Bio"}}]}}}"#,
            )
            .unwrap();
        let node = data.legacy_node.unwrap();
        assert_eq!(node.enrollments[0].course.name, "Bio");
    }

    #[test]
    fn first_error_becomes_remote_error() {
        let err = request()
            .decode(br#"{"data":null,"errors":[{"message":"not allowed"},{"message":"x"}]}"#)
            .unwrap_err();
        assert_eq!(err, CodecError::Remote("not allowed".into()));
    }

    #[test]
    fn missing_data_is_a_decode_error() {
        let err = request().decode(br#"{}"#).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
