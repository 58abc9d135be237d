// Allow dead code: validation rules consumed by the chat UI layer
#![allow(dead_code)]

//! Chat message and nickname suggestion models.
//!
//! Messages are exchanged with the hosted messaging backend through the
//! `sync` module; this file only defines the record shapes and the input
//! validation rules the UI applies before handing a message over.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Maximum chat message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 300;

/// Maximum nickname length in characters.
pub const MAX_NICKNAME_LENGTH: usize = 60;

/// Number of nickname suggestions shown on the registration form.
const SUGGESTION_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub nickname: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(rename = "themeId", default)]
    pub theme_id: Option<String>,
}

impl Message {
    /// Validate the message text before sending: non-empty after trimming
    /// and at most `MAX_MESSAGE_LENGTH` characters.
    pub fn validate_text(text: &str) -> Result<(), String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err("Message cannot be empty".to_string());
        }
        if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(format!(
                "Message cannot exceed {} characters",
                MAX_MESSAGE_LENGTH
            ));
        }
        Ok(())
    }

    /// Validate a nickname entered on the registration form.
    pub fn validate_nickname(nickname: &str) -> Result<(), String> {
        let trimmed = nickname.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_NICKNAME_LENGTH {
            return Err(format!(
                "Nickname must be between 1 and {} characters",
                MAX_NICKNAME_LENGTH
            ));
        }
        Ok(())
    }
}

/// The nickname suggestion document: `{ "nicknames": [ { "nickname": ... } ] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicknameFile {
    pub nicknames: Vec<NicknameEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicknameEntry {
    pub nickname: String,
}

impl NicknameFile {
    /// Pick up to five suggestions spread across the list: shuffle the
    /// indices, then step through them at `len / 5` intervals so the picks
    /// do not cluster at one end of the file.
    pub fn suggest(&self, rng: &mut impl rand::Rng) -> Vec<String> {
        if self.nicknames.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = (0..self.nicknames.len()).collect();
        indices.shuffle(rng);

        let count = SUGGESTION_COUNT.min(indices.len());
        let step = (indices.len() / count).max(1);
        (0..count)
            .map(|i| self.nicknames[indices[i * step]].nickname.clone())
            .collect()
    }
}
