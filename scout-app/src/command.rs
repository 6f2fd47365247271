/// One line of `scout chat` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String), // anything that is not a slash command
    Sources,     // /sources
    Reset,       // /reset
    Help,        // /help
    Quit,        // /quit or /exit
    Empty,
    Unknown(String),
}

pub const CHAT_HELP: &str = "\
Type a request and press enter. Extracted pages stay available for the rest of the chat.
  /sources  list URLs extracted in this chat
  /reset    forget extracted content
  /help     show this help
  /quit     leave (also /exit)";

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if !trimmed.starts_with('/') {
        return Command::Ask(trimmed.to_string());
    }
    let verb = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match verb.as_str() {
        "/sources" => Command::Sources,
        "/reset" => Command::Reset,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}
