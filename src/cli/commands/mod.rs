use clap::{Parser, Subcommand};

pub mod handlers;
pub mod parser;
mod subcommands;
pub mod types;

pub use handlers::handle_command;
pub use parser::parse_command;
pub use subcommands::MemoryCommands;
pub use types::{Command, CommandResult};

/// `recallchat` - talk to an assistant that remembers you.
#[derive(Parser, Debug)]
#[command(name = "recallchat")]
#[command(version = "0.1.0")]
#[command(about = "Terminal client for a memory-augmented chat assistant.", long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the assistant (interactive unless --message is given)
    Chat {
        /// Single message mode (don't enter interactive mode)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Store the profile returned by your sign-in provider
    Login {
        /// Stable subject id issued by the identity provider
        #[arg(long)]
        subject: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,

        /// Account email
        #[arg(long)]
        email: Option<String>,
    },

    /// Chat anonymously with this device's id
    Anonymous,

    /// Sign out and discard the local conversation
    Logout,

    /// Show the active identity and session id
    Whoami,

    /// Forget this device's anonymous id (a new one is created on next use)
    ForgetDevice,

    /// Check that the assistant service is reachable
    Health,

    /// Inspect or clear what the service remembers about you
    Memories {
        #[command(subcommand)]
        memory_command: MemoryCommands,
    },
}
