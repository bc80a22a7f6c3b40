use axum::extract::rejection::QueryRejection;
use axum::extract::FromRequestParts;

use crate::error::LingocrError;

/// `Query<T>` whose rejection renders as a [`LingocrError::Validation`] body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(LingocrError))]
pub struct AppQuery<T>(pub T);

impl From<QueryRejection> for LingocrError {
    fn from(rejection: QueryRejection) -> Self {
        map_query_rejection(rejection)
    }
}

fn map_query_rejection(rejection: QueryRejection) -> LingocrError {
    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => {
            LingocrError::Validation(format!("Invalid query string: {}", err.body_text()))
        }
        _ => LingocrError::Validation(rejection.body_text()),
    }
}
