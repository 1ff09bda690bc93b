use euclid::default::Point2D;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ConnectionId = u32;
pub type Point = Point2D<f64>;

/// Display name bound to a live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Trims the proposed name. Returns `None` when nothing is left.
    pub fn parse(proposed: &str) -> Option<Self> {
        let trimmed = proposed.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CSS color text, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl std::default::Default for Color {
    fn default() -> Self {
        Self("#000".into())
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DrawPayload", into = "DrawPayload")]
pub struct StrokeSegment {
    pub from: Point,
    pub to: Point,
    pub color: Color,
    pub width: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrawPayload {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    color: Color,
    line_width: f64,
}

impl From<DrawPayload> for StrokeSegment {
    fn from(p: DrawPayload) -> Self {
        Self {
            from: Point::new(p.x0, p.y0),
            to: Point::new(p.x1, p.y1),
            color: p.color,
            width: p.line_width,
        }
    }
}

impl From<StrokeSegment> for DrawPayload {
    fn from(s: StrokeSegment) -> Self {
        Self {
            x0: s.from.x,
            y0: s.from.y,
            x1: s.to.x,
            y1: s.to.y,
            color: s.color,
            line_width: s.width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TextPayload", into = "TextPayload")]
pub struct TextPlacement {
    pub content: String,
    pub position: Point,
    pub color: Option<Color>,
    pub font_size: Option<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextPayload {
    text: String,
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
}

impl From<TextPayload> for TextPlacement {
    fn from(p: TextPayload) -> Self {
        Self {
            content: p.text,
            position: Point::new(p.x, p.y),
            color: p.color,
            font_size: p.font_size,
        }
    }
}

impl From<TextPlacement> for TextPayload {
    fn from(t: TextPlacement) -> Self {
        Self {
            text: t.content,
            x: t.position.x,
            y: t.position.y,
            color: t.color,
            font_size: t.font_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErasePoint {
    pub x: f64,
    pub y: f64,
}

/// Chat line with the author resolved when the server received it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "user")]
    pub author: Option<Identity>,
    #[serde(rename = "text")]
    pub body: String,
}

pub type PresenceSet = Vec<Identity>;
