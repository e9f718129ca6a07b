//! Command classification for the chat loop.
//!
//! Every line typed at the main prompt is either one of the single-letter control
//! commands or a message to send to the active model.

/// The menu printed under the title.
pub const MENU: &str =
    "[i]nfo | select [m]odel | [u]pdate models | [h]istory | change [c]onfig | [q]uit";

/// A classified line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show metadata for the active model.
    Info,

    /// Pick a different model from the allowed list.
    SelectModel,

    /// Refresh the allowed list from the provider.
    UpdateModels,

    /// List saved transcripts.
    History,

    /// Switch to another profile.
    ChangeConfig,

    /// Exit the chat application.
    Quit,

    /// Blank input; nothing to do.
    Empty,

    /// Anything else is sent to the model.
    Message(String),
}

/// Classifies one line of input.
///
/// Surrounding whitespace is ignored.  Commands are single lowercase letters; everything
/// else, including `I` or `quit`, is a message.
///
/// # Examples
///
/// ```
/// # use groqchat::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command(" q "), ChatCommand::Quit);
/// assert_eq!(parse_command(""), ChatCommand::Empty);
/// assert_eq!(
///     parse_command("hello"),
///     ChatCommand::Message("hello".to_string())
/// );
/// ```
pub fn parse_command(input: &str) -> ChatCommand {
    let input = input.trim();
    match input {
        "" => ChatCommand::Empty,
        "i" => ChatCommand::Info,
        "m" => ChatCommand::SelectModel,
        "u" => ChatCommand::UpdateModels,
        "h" => ChatCommand::History,
        "c" => ChatCommand::ChangeConfig,
        "q" => ChatCommand::Quit,
        text => ChatCommand::Message(text.to_string()),
    }
}

/// Returns true for an affirmative answer (`y` or `yes`, any case).
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
