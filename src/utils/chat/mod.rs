pub mod errors;
pub mod models;

use sqlx::{query, query_as, PgPool};

use self::errors::ChatError;
use self::models::{NewMessage, RoomMessage, RoomMessageModel};

/// Upper bound on messages returned for a single room.
pub const MESSAGE_LIMIT: i64 = 50;

pub async fn insert_message(pool: &PgPool, message: &NewMessage) -> Result<(), ChatError> {
    query(
        r#"
            INSERT INTO messages (username, message, chat_room, timestamp)
            VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&message.user)
    .bind(&message.text)
    .bind(&message.room)
    .bind(message.timestamp)
    .execute(pool)
    .await
    .map_err(ChatError::insert)?;

    Ok(())
}

/// Newest first. Room matching is exact and case-sensitive.
pub async fn fetch_recent_messages(
    pool: &PgPool,
    chat_room: &str,
    limit: i64,
) -> Result<Vec<RoomMessage>, ChatError> {
    let messages = query_as::<_, RoomMessageModel>(
        r#"
            SELECT username, message, timestamp FROM messages
            WHERE chat_room = $1
            ORDER BY timestamp DESC
            LIMIT $2
        "#,
    )
    .bind(chat_room)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(ChatError::query)?;

    Ok(messages.into_iter().map(RoomMessage::from).collect())
}
