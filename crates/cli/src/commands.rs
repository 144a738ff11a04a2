//! Subcommands

use anyhow::{bail, Context, Result};
use canvas_core::QueryItem;
use canvas_infra::api::graphql::UserCourseEnrollment;
use canvas_infra::api::requests::{GetCoursesRequest, GetUserProfileRequest, RawRequest};
use canvas_infra::api::{GraphQlRequest, UserCoursesQuery};
use canvas_infra::{Api, RefreshOutcome};
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// GET any API path, e.g. `courses/1/assignments`
    Get {
        path: String,

        /// Follow `next` links and concatenate every page
        #[arg(long)]
        all: bool,

        /// Extra query parameter as `key=value`
        #[arg(short, long = "query", value_parser = parse_query_item)]
        query: Vec<QueryItem>,
    },
    /// Show the profile of the current user
    Whoami,
    /// List active courses
    Courses {
        /// List an observed student's courses instead
        #[arg(long)]
        student: Option<String>,

        /// Use the GraphQL endpoint
        #[arg(long, conflicts_with = "student")]
        graphql: bool,
    },
    /// Refresh the access token now
    Refresh,
}

impl Command {
    pub async fn run(self, api: &Api) -> Result<()> {
        match self {
            Self::Get { path, all, query } => {
                if all {
                    let request = query
                        .into_iter()
                        .fold(RawRequest::<Vec<Value>>::new(path), RawRequest::with_query);
                    print_json(&api.exhaust(&request).await?)
                } else {
                    let request = query
                        .into_iter()
                        .fold(RawRequest::<Value>::new(path), RawRequest::with_query);
                    print_json(&api.make(&request).await?)
                }
            }
            Self::Whoami => print_json(&api.make(&GetUserProfileRequest::default()).await?),
            Self::Courses { graphql: true, .. } => {
                let user_id = api.session().context("GraphQL needs a session")?.user_id;
                let data = api.make(&GraphQlRequest(UserCoursesQuery { user_id })).await?;
                let enrollments = data.legacy_node.map(|node| node.enrollments).unwrap_or_default();
                for enrollment in enrollments {
                    let UserCourseEnrollment { state, course, .. } = enrollment;
                    println!("{}\t{state}\t{}", course.id, course.name);
                }
                Ok(())
            }
            Self::Courses { student, .. } => {
                let request =
                    GetCoursesRequest { student_id: student, ..GetCoursesRequest::default() };
                let courses = api.exhaust(&request).await?;
                info!(count = courses.len(), "fetched courses");
                for course in courses {
                    println!("{}\t{}", course.id, course.name.unwrap_or_default());
                }
                Ok(())
            }
            Self::Refresh => refresh(api).await,
        }
    }
}

async fn refresh(api: &Api) -> Result<()> {
    let Some(interactor) = api.interactor() else {
        bail!("token refresh is not configured");
    };
    let Some(session) = api.session() else {
        bail!("no session to refresh");
    };
    if !session.can_refresh() {
        bail!("session has no refresh token or client credentials");
    }

    match interactor.await_token_refresh(session.access_token.as_deref()).await {
        RefreshOutcome::Refreshed(session) => {
            println!("refreshed token for user {}", session.user_id);
            Ok(())
        }
        RefreshOutcome::Failed => bail!("token refresh failed"),
        RefreshOutcome::LoggedOut => bail!("refresh token expired, log in again"),
    }
}

fn parse_query_item(raw: &str) -> Result<QueryItem, String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing key in {raw:?}")),
        Some((key, value)) => Ok(QueryItem::value(key, value)),
        None if raw.is_empty() => Err("empty query item".to_string()),
        None => Ok(QueryItem::Name(raw.to_string())),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
