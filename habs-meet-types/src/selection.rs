/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user wants shown behind them.
///
/// Serialized with a `kind` tag so the persisted form reads
/// `{"kind":"blur","radius":10.0}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackgroundSelection {
    #[default]
    None,
    Blur {
        radius: f32,
    },
    Image {
        url: String,
    },
    Video {
        url: String,
    },
}

/// The variant of a [`BackgroundSelection`] without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackgroundMode {
    None,
    Blur,
    Image,
    Video,
}

impl BackgroundSelection {
    pub fn blur(radius: f32) -> Self {
        BackgroundSelection::Blur { radius }
    }

    pub fn image(url: impl Into<String>) -> Self {
        BackgroundSelection::Image { url: url.into() }
    }

    pub fn video(url: impl Into<String>) -> Self {
        BackgroundSelection::Video { url: url.into() }
    }

    pub fn mode(&self) -> BackgroundMode {
        match self {
            BackgroundSelection::None => BackgroundMode::None,
            BackgroundSelection::Blur { .. } => BackgroundMode::Blur,
            BackgroundSelection::Image { .. } => BackgroundMode::Image,
            BackgroundSelection::Video { .. } => BackgroundMode::Video,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BackgroundSelection::None)
    }

    /// Asset URL for image and video backgrounds.
    pub fn url(&self) -> Option<&str> {
        match self {
            BackgroundSelection::Image { url } | BackgroundSelection::Video { url } => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackgroundMode::None => write!(f, "none"),
            BackgroundMode::Blur => write!(f, "blur"),
            BackgroundMode::Image => write!(f, "image"),
            BackgroundMode::Video => write!(f, "video"),
        }
    }
}

impl fmt::Display for BackgroundSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackgroundSelection::None => write!(f, "none"),
            BackgroundSelection::Blur { radius } => write!(f, "blur({radius})"),
            BackgroundSelection::Image { url } => write!(f, "image({url})"),
            BackgroundSelection::Video { url } => write!(f, "video({url})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_string(&BackgroundSelection::blur(12.0)).unwrap();
        assert_eq!(json, r#"{"kind":"blur","radius":12.0}"#);

        let json = serde_json::to_string(&BackgroundSelection::None).unwrap();
        assert_eq!(json, r#"{"kind":"none"}"#);
    }

    #[test]
    fn test_deserializes_image_and_video() {
        let image: BackgroundSelection =
            serde_json::from_str(r#"{"kind":"image","url":"https://cdn/office.jpg"}"#).unwrap();
        assert_eq!(image, BackgroundSelection::image("https://cdn/office.jpg"));
        assert_eq!(image.url(), Some("https://cdn/office.jpg"));

        let video: BackgroundSelection =
            serde_json::from_str(r#"{"kind":"video","url":"/bg/beach.mp4"}"#).unwrap();
        assert_eq!(video.mode(), BackgroundMode::Video);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = serde_json::from_str::<BackgroundSelection>(r#"{"kind":"sparkles"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BackgroundMode::None.to_string(), "none");
        assert_eq!(BackgroundSelection::blur(4.0).to_string(), "blur(4)");
        assert!(BackgroundSelection::default().is_none());
        assert_eq!(BackgroundSelection::blur(4.0).url(), None);
    }
}
