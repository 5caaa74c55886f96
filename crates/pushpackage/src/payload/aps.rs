//! The `aps` dictionary.

use super::Badge;
use crate::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Alert dictionary.
///
/// When only [`body`](Alert::body) is set the alert is sent as a bare string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Alert {
    /// Short title, shown above the body.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(rename = "title-loc-key", skip_serializing_if = "String::is_empty")]
    pub title_loc_key: String,
    #[serde(rename = "title-loc-args", skip_serializing_if = "Vec::is_empty")]
    pub title_loc_args: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(rename = "subtitle-loc-key", skip_serializing_if = "String::is_empty")]
    pub subtitle_loc_key: String,
    #[serde(rename = "subtitle-loc-args", skip_serializing_if = "Vec::is_empty")]
    pub subtitle_loc_args: Vec<String>,

    /// Alert message text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(rename = "loc-key", skip_serializing_if = "String::is_empty")]
    pub loc_key: String,
    #[serde(rename = "loc-args", skip_serializing_if = "Vec::is_empty")]
    pub loc_args: Vec<String>,

    /// Localization key for the "View" button.
    #[serde(rename = "action-loc-key", skip_serializing_if = "String::is_empty")]
    pub action_loc_key: String,

    /// Launch image shown when the user opens the notification.
    #[serde(rename = "launch-image", skip_serializing_if = "String::is_empty")]
    pub launch_image: String,

    /// Label of the action button in Safari.
    #[serde(rename = "action", skip_serializing_if = "String::is_empty")]
    pub safari_action: String,
}

impl Alert {
    /// True when nothing but the body may be set.
    fn is_simple(&self) -> bool {
        self.title.is_empty()
            && self.title_loc_key.is_empty()
            && self.title_loc_args.is_empty()
            && self.subtitle.is_empty()
            && self.subtitle_loc_key.is_empty()
            && self.subtitle_loc_args.is_empty()
            && self.loc_key.is_empty()
            && self.loc_args.is_empty()
            && self.action_loc_key.is_empty()
            && self.launch_image.is_empty()
            && self.safari_action.is_empty()
    }

    fn is_empty(&self) -> bool {
        self.body.is_empty() && self.is_simple()
    }
}

/// Sound dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sound {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// `1` for a critical alert sound.
    #[serde(skip_serializing_if = "is_zero")]
    pub critical: u8,
    /// Critical alert volume, `0.0` to `1.0`.
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub volume: f32,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

/// How urgently the notification is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterruptionLevel {
    Passive,
    Active,
    TimeSensitive,
    Critical,
}

/// The reserved `aps` namespace of a notification payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aps {
    pub alert: Alert,
    pub badge: Badge,
    pub sound: Sound,
    /// Groups notifications into threads.
    pub thread_id: String,
    /// Category identifier for custom actions.
    pub category: String,
    /// Silent background notification.
    pub content_available: bool,
    /// Lets a notification service extension modify the content.
    pub mutable_content: bool,
    pub target_content_id: String,
    /// Values substituted into the website's `urlFormatString` (Safari).
    pub url_args: Vec<String>,
    pub interruption_level: Option<InterruptionLevel>,
    /// Sorting weight in notification summaries; sent only when positive.
    pub relevance_score: f32,
}

impl Aps {
    /// Build the payload object, `{"aps": {...}}`.
    ///
    /// Only fields that are set appear in the `aps` dictionary. The returned
    /// map can be extended with custom top-level keys.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut aps = Map::new();

        if !self.alert.is_empty() {
            if self.alert.is_simple() {
                aps.insert("alert".into(), Value::from(self.alert.body.clone()));
            } else {
                aps.insert("alert".into(), json!(self.alert));
            }
        }
        if let Some(n) = self.badge.number() {
            aps.insert("badge".into(), Value::from(n));
        }
        if !self.sound.name.is_empty() {
            aps.insert("sound".into(), json!(self.sound));
        }
        if self.content_available {
            aps.insert("content-available".into(), Value::from(1));
        }
        if !self.category.is_empty() {
            aps.insert("category".into(), Value::from(self.category.clone()));
        }
        if self.mutable_content {
            aps.insert("mutable-content".into(), Value::from(1));
        }
        if !self.thread_id.is_empty() {
            aps.insert("thread-id".into(), Value::from(self.thread_id.clone()));
        }
        if !self.target_content_id.is_empty() {
            aps.insert(
                "target-content-id".into(),
                Value::from(self.target_content_id.clone()),
            );
        }
        if !self.url_args.is_empty() {
            aps.insert("url-args".into(), Value::from(self.url_args.clone()));
        }
        if let Some(level) = self.interruption_level {
            aps.insert("interruption-level".into(), json!(level));
        }
        if self.relevance_score > 0.0 {
            aps.insert("relevance-score".into(), Value::from(self.relevance_score));
        }

        let mut payload = Map::new();
        payload.insert("aps".into(), Value::Object(aps));
        payload
    }

    /// Serialize the payload to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Check the payload has something to show.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompletePayload`] when there is neither an alert
    /// body nor a badge change.
    pub fn validate(&self) -> Result<()> {
        if self.alert.body.is_empty() && self.badge == Badge::Preserve {
            return Err(Error::IncompletePayload);
        }
        Ok(())
    }
}

impl Serialize for Aps {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
