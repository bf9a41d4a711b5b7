use clap::Subcommand;
use serde::{Deserialize, Serialize};

/// Remote memory subcommands
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemoryCommands {
    /// List memories stored for the current session
    List {
        /// Maximum number of memories to fetch
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Delete every memory stored for the current session
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
