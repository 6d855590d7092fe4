use serde::{Deserialize, Serialize};

/// A comment as scraped: either bare text or an object carrying a `text` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReviewComment {
    Plain(String),
    Structured {
        #[serde(default)]
        text: String,
    },
}

impl ReviewComment {
    pub fn text(&self) -> &str {
        match self {
            ReviewComment::Plain(text) => text,
            ReviewComment::Structured { text } => text,
        }
    }
}

impl From<&str> for ReviewComment {
    fn from(text: &str) -> Self {
        ReviewComment::Plain(text.to_string())
    }
}
