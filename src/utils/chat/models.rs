use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;

/// Body of `POST /write_msg`. Keys match case-insensitively, absent or
/// `null` fields stay empty, and unknown fields (including any client
/// `timestamp`) are dropped.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(try_from = "Map<String, Value>")]
pub struct IncomingMessage {
    pub user: String,
    pub msg: String,
    pub chat_room: String,
}

impl TryFrom<Map<String, Value>> for IncomingMessage {
    type Error = String;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut message = Self::default();
        for (key, value) in body {
            let field = if key.eq_ignore_ascii_case("user") {
                &mut message.user
            } else if key.eq_ignore_ascii_case("msg") {
                &mut message.msg
            } else if key.eq_ignore_ascii_case("chatroom") {
                &mut message.chat_room
            } else {
                continue;
            };

            match value {
                Value::String(text) => *field = text,
                Value::Null => {}
                other => return Err(format!("field `{key}` must be a string, got {other}")),
            }
        }
        Ok(message)
    }
}

/// A message ready to be stored, stamped with the server clock.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub user: String,
    pub text: String,
    pub room: String,
    pub timestamp: OffsetDateTime,
}

impl NewMessage {
    pub fn received(incoming: IncomingMessage) -> Self {
        Self {
            user: incoming.user,
            text: incoming.msg,
            room: incoming.chat_room,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

impl fmt::Display for NewMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {}: {}",
            self.room, self.user, self.timestamp, self.text
        )
    }
}

#[derive(sqlx::FromRow, Debug)]
pub struct RoomMessageModel {
    pub username: String,
    pub message: String,
    pub timestamp: OffsetDateTime,
}

/// Element of the `GET /read_chat` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub user: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<RoomMessageModel> for RoomMessage {
    fn from(model: RoomMessageModel) -> Self {
        Self {
            user: model.username,
            message: model.message,
            timestamp: model.timestamp,
        }
    }
}

/// First `chat_room` value of the query string; later duplicates are
/// ignored and an empty value counts as missing.
pub fn first_chat_room(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .find(|(key, _)| key == "chat_room")
        .map(|(_, room)| room)
        .filter(|room| !room.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn client_timestamp_is_ignored() {
        let before = OffsetDateTime::now_utc();
        let incoming: IncomingMessage = serde_json::from_str(
            r#"{"user":"alice","msg":"hi","chatRoom":"lobby","timestamp":"2000-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let message = NewMessage::received(incoming);

        assert_eq!(message.user, "alice");
        assert_eq!(message.text, "hi");
        assert_eq!(message.room, "lobby");
        assert!(message.timestamp >= before);
    }

    #[test]
    fn keys_match_case_insensitively() {
        for body in [
            r#"{"User":"alice","Msg":"hi","ChatRoom":"lobby"}"#,
            r#"{"user":"alice","msg":"hi","chatroom":"lobby"}"#,
            r#"{"USER":"alice","MSG":"hi","CHATROOM":"lobby"}"#,
        ] {
            let incoming: IncomingMessage = serde_json::from_str(body).unwrap();
            assert_eq!(incoming.user, "alice");
            assert_eq!(incoming.msg, "hi");
            assert_eq!(incoming.chat_room, "lobby");
        }
    }

    #[test]
    fn missing_and_null_fields_are_empty() {
        let incoming: IncomingMessage =
            serde_json::from_str(r#"{"user":"alice","msg":null}"#).unwrap();
        assert_eq!(incoming.user, "alice");
        assert_eq!(incoming.msg, "");
        assert_eq!(incoming.chat_room, "");
    }

    #[test]
    fn wrong_types_fail_to_decode() {
        assert!(serde_json::from_str::<IncomingMessage>(r#"{"user":5}"#).is_err());
        assert!(serde_json::from_str::<IncomingMessage>(r#""alice""#).is_err());
        assert!(serde_json::from_str::<IncomingMessage>("not json").is_err());
    }

    #[test]
    fn first_chat_room_wins() {
        let params = vec![
            ("other".to_string(), "x".to_string()),
            ("chat_room".to_string(), "lobby".to_string()),
            ("chat_room".to_string(), "kitchen".to_string()),
        ];
        assert_eq!(first_chat_room(params), Some("lobby".to_string()));

        let params = vec![
            ("chat_room".to_string(), String::new()),
            ("chat_room".to_string(), "kitchen".to_string()),
        ];
        assert_eq!(first_chat_room(params), None);
        assert_eq!(first_chat_room(Vec::new()), None);
    }

    #[test]
    fn room_is_omitted_from_output() {
        let message = RoomMessage {
            user: "alice".into(),
            message: "hi".into(),
            timestamp: datetime!(2023-04-15 12:00:00 UTC),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "user": "alice",
                "message": "hi",
                "timestamp": "2023-04-15T12:00:00Z"
            })
        );
    }
}
