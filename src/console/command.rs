//! Console input parsing

use crate::state_machine::MessageId;
use thiserror::Error;

pub const HELP: &str = "\
Type a message and press enter to send it.
  /edit <id> <text>   replace the text of one of your messages
  /delete <id>        delete one of your messages
  /up, /down          page through the conversation
  /quit               leave";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Edit { id: MessageId, text: String },
    Delete(MessageId),
    Up,
    Down,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command {0} (try /help)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Not a message id: {0}")]
    BadId(String),
}

/// Parse one input line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let command = match name {
        "edit" => {
            let args = args.trim_start();
            // The new text may be empty
            let (id, text) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            if id.is_empty() {
                return Err(CommandError::Usage("/edit <id> <text>"));
            }
            Command::Edit {
                id: parse_id(id)?,
                text: text.to_string(),
            }
        }
        "delete" => {
            let id = args.trim();
            if id.is_empty() {
                return Err(CommandError::Usage("/delete <id>"));
            }
            Command::Delete(parse_id(id)?)
        }
        "up" => Command::Up,
        "down" => Command::Down,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(format!("/{other}"))),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<MessageId, CommandError> {
    raw.parse::<i64>()
        .map(MessageId)
        .map_err(|_| CommandError::BadId(raw.to_string()))
}
