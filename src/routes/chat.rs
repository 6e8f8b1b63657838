use axum::{
    body::Bytes,
    debug_handler,
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::{
    state::AppState,
    utils::chat::{
        errors::ChatError,
        fetch_recent_messages, insert_message,
        models::{first_chat_room, IncomingMessage, NewMessage},
        MESSAGE_LIMIT,
    },
};

use super::preflight;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/write_msg", post(write_msg).options(preflight))
        .route("/read_chat", get(read_chat).options(preflight))
}

#[debug_handler(state = AppState)]
async fn write_msg(
    State(pool): State<PgPool>,
    body: Bytes,
) -> Result<impl IntoResponse, ChatError> {
    let incoming = serde_json::from_slice::<IncomingMessage>(&body)?;
    let message = NewMessage::received(incoming);
    info!("Received message {message}");

    insert_message(&pool, &message).await?;

    Ok((StatusCode::CREATED, "Message added to chat log"))
}

#[debug_handler(state = AppState)]
async fn read_chat(
    State(pool): State<PgPool>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ChatError> {
    let chat_room = first_chat_room(params).ok_or(ChatError::MissingChatRoom)?;

    let messages = fetch_recent_messages(&pool, &chat_room, MESSAGE_LIMIT).await?;
    let body = serde_json::to_vec(&messages).map_err(ChatError::Encode)?;
    debug!("Returning {} messages for {chat_room}: {messages:?}", messages.len());

    Ok(([(CONTENT_TYPE, "application/json")], body))
}
