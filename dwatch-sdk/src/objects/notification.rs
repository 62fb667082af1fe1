//! Chat webhook payload types.
//!
//! These follow the Discord execute-webhook body: a plain `content` string
//! with optional rich `embeds`.

use serde::{Deserialize, Serialize};

/// Message body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

impl NotificationPayload {
    /// A text-only message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embeds: Vec::new(),
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_omits_embeds() {
        let json = serde_json::to_value(NotificationPayload::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "content": "hello" }));
    }

    #[test]
    fn test_embed_serialization() {
        let payload = NotificationPayload::text("new proposal").with_embed(Embed {
            color: Some(4111763),
            fields: vec![EmbedField::new("Title", "Raise the ceiling")],
            thumbnail: Some(EmbedThumbnail {
                url: "https://services.tzkt.io/v1/avatars/tz1abc".to_string(),
            }),
            ..Default::default()
        });

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": "new proposal",
                "embeds": [{
                    "color": 4111763,
                    "fields": [{ "name": "Title", "value": "Raise the ceiling" }],
                    "thumbnail": { "url": "https://services.tzkt.io/v1/avatars/tz1abc" }
                }]
            })
        );
    }
}
