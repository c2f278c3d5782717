//! The status payload a modern Java server answers a status request with.
//!
//! Decoded defensively: real servers disagree about which fields they send,
//! so everything beyond the version block is optional and unknown fields are
//! ignored. The `description` node is polymorphic on the wire (a plain string
//! or a chat object) and stays a [`serde_json::Value`], with [`RawJavaStatus::motd`]
//! as the extraction point.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Version {
    pub name: String,
    pub protocol: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlayerSample {
    pub name: String,
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Players {
    pub max: u32,
    pub online: u32,
    #[serde(default)]
    pub sample: Vec<PlayerSample>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawJavaStatus {
    pub version: Version,
    pub players: Option<Players>,
    #[serde(default)]
    pub description: Value,
    pub favicon: Option<String>,
    #[serde(rename = "enforcesSecureChat")]
    pub enforces_secure_chat: Option<bool>,
    #[serde(rename = "previewsChat")]
    pub previews_chat: Option<bool>,
}

impl RawJavaStatus {
    /// The message of the day: the description itself when the server sent a
    /// plain string (even an empty one), otherwise the chat object's `text`
    /// when it carries one.
    pub fn motd(&self) -> Option<String> {
        match &self.description {
            Value::String(text) => Some(text.clone()),
            value => value
                .get("text")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_full_status() {
        let status: RawJavaStatus = serde_json::from_value(json!({
            "version": { "name": "1.20.4", "protocol": 765 },
            "players": {
                "max": 20,
                "online": 2,
                "sample": [{ "name": "steve", "id": "8667ba71-b85a-4004-af54-457a9734eed7" }]
            },
            "description": { "text": "A vanilla server" },
            "favicon": "data:image/png;base64,QUJD",
            "enforcesSecureChat": true,
            "modinfo": { "type": "FML", "modList": [] }
        }))
        .unwrap();

        assert_eq!(status.version.name, "1.20.4");
        let players = status.players.as_ref().unwrap();
        assert_eq!((players.max, players.online), (20, 2));
        assert_eq!(players.sample[0].name, "steve");
        assert_eq!(status.motd().as_deref(), Some("A vanilla server"));
        assert_eq!(status.favicon.as_deref(), Some("data:image/png;base64,QUJD"));
        assert_eq!(status.enforces_secure_chat, Some(true));
        assert_eq!(status.previews_chat, None);
    }

    #[test]
    fn decodes_a_minimal_status() {
        let status: RawJavaStatus = serde_json::from_value(json!({
            "version": { "name": "1.8.9", "protocol": 47 }
        }))
        .unwrap();

        assert!(status.players.is_none());
        assert!(status.favicon.is_none());
        assert_eq!(status.motd(), None);
    }

    #[test]
    fn motd_keeps_an_empty_plain_string() {
        let status: RawJavaStatus = serde_json::from_value(json!({
            "version": { "name": "1.20", "protocol": 763 },
            "description": ""
        }))
        .unwrap();

        assert_eq!(status.motd().as_deref(), Some(""));
    }

    #[test]
    fn motd_drops_an_empty_chat_text() {
        let status: RawJavaStatus = serde_json::from_value(json!({
            "version": { "name": "1.20", "protocol": 763 },
            "description": { "text": "" }
        }))
        .unwrap();

        assert_eq!(status.motd(), None);
    }

    #[test]
    fn motd_ignores_unrecognized_description_shapes() {
        let status: RawJavaStatus = serde_json::from_value(json!({
            "version": { "name": "1.20", "protocol": 763 },
            "description": { "extra": ["no text node"] }
        }))
        .unwrap();

        assert_eq!(status.motd(), None);
    }
}
