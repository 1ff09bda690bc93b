use crate::types::{ChatMessage, StrokeSegment, TextPlacement};
use serde::{Deserialize, Serialize};

/// A persistent event, appended in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Stroke(StrokeSegment),
    Text(TextPlacement),
    Chat(ChatMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Strokes and texts.
    Canvas,
    Chat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub strokes: Vec<StrokeSegment>,
    pub texts: Vec<TextPlacement>,
    pub chats: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    pub strokes: usize,
    pub texts: usize,
    pub chats: usize,
}

/// Everything recorded since the last clear. Lives as long as the process.
#[derive(Debug, Default)]
pub struct SessionState {
    strokes: Vec<StrokeSegment>,
    texts: Vec<TextPlacement>,
    chats: Vec<ChatMessage>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: Entry) {
        match entry {
            Entry::Stroke(stroke) => self.strokes.push(stroke),
            Entry::Text(text) => self.texts.push(text),
            Entry::Chat(chat) => self.chats.push(chat),
        }
    }

    pub fn clear(&mut self, scope: ClearScope) {
        match scope {
            ClearScope::Canvas => {
                self.strokes.clear();
                self.texts.clear();
            }
            ClearScope::Chat => self.chats.clear(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            strokes: self.strokes.clone(),
            texts: self.texts.clone(),
            chats: self.chats.clone(),
        }
    }

    pub fn counts(&self) -> SessionCounts {
        SessionCounts {
            strokes: self.strokes.len(),
            texts: self.texts.len(),
            chats: self.chats.len(),
        }
    }
}
