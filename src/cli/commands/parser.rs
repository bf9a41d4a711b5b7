use super::types::Command;

/// Parse a chat input line as a slash command. Anything not starting with
/// `/` is a message for the assistant and yields `None`.
pub fn parse_command(input: &str) -> Option<Result<Command, String>> {
    let trimmed = input.trim();
    let name = trimmed.strip_prefix('/')?;
    let name = name.split_whitespace().next().unwrap_or_default();

    let command = match name.to_ascii_lowercase().as_str() {
        "clear" => Command::Clear,
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Some(Err(format!("Unknown command '/{name}'. Try /help."))),
    };
    Some(Ok(command))
}
