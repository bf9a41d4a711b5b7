use crate::conversation::{Message, Sender};
use console::style;
use std::fmt::Display;

/// Green bold: success checkmarks, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// White bold: section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: timestamps, hints, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: warnings
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Green: confirmed values, ids, names
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: speaker labels
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// One conversation entry as a terminal line.
pub fn message_line(message: &Message) -> String {
    let time = dim(message.sent_at.format("%H:%M"));
    match message.sender {
        Sender::User => format!("{time} {} {}", header("you ›"), message.text),
        Sender::Assistant => {
            let memory = if message.used_memory {
                format!(" {}", dim("(recalled memory)"))
            } else {
                String::new()
            };
            format!("{time} {} {}{memory}", accent("assistant ›"), message.text)
        }
    }
}

pub fn typing_indicator() -> String {
    dim("assistant is typing…")
}
