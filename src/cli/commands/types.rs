use serde::{Deserialize, Serialize};

/// Slash commands available inside the interactive chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Clear,
    Logout,
    Whoami,
    Help,
    Quit,
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub text: String,
    /// End the chat loop after printing `text`.
    pub exit: bool,
}

impl CommandResult {
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit: false,
        }
    }

    pub fn exit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit: true,
        }
    }
}
