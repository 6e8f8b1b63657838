use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Failed to decode JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Chat room parameter missing")]
    MissingChatRoom,
    #[error("Database insert error")]
    Insert(#[source] sqlx::Error),
    #[error("Database query error")]
    Query(#[source] sqlx::Error),
    #[error("Database unavailable")]
    Unavailable(#[source] sqlx::Error),
    #[error("Error encoding JSON response")]
    Encode(#[source] serde_json::Error),
}

impl ChatError {
    pub fn insert(e: sqlx::Error) -> Self {
        if is_connection_error(&e) {
            Self::Unavailable(e)
        } else {
            Self::Insert(e)
        }
    }

    pub fn query(e: sqlx::Error) -> Self {
        if is_connection_error(&e) {
            Self::Unavailable(e)
        } else {
            Self::Query(e)
        }
    }
}

fn is_connection_error(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
    )
}

impl IntoResponse for ChatError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            ChatError::InvalidJson(e) => {
                tracing::debug!("Rejected message body: {e}");
                StatusCode::BAD_REQUEST
            }
            ChatError::MissingChatRoom => StatusCode::BAD_REQUEST,
            ChatError::Insert(e) | ChatError::Query(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ChatError::Unavailable(e) => {
                tracing::error!("Postgres unreachable: {e:?}");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ChatError::Encode(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status_code, self.to_string()).into_response()
    }
}
