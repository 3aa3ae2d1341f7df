//! Command grammar for chat text: `/keyword[@bot] [arguments]`.

const LANG_PREFIX: &str = "-";

/// The commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/translate` or its alias `/tl`
    Translate,
    Start,
    Ping,
    Unknown(String),
}

impl Command {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "translate" | "tl" => Command::Translate,
            "start" => Command::Start,
            "ping" => Command::Ping,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// A command split out of the raw message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub keyword: &'a str,
    /// Username after `@`, if the command was addressed to a specific bot
    pub mention: Option<&'a str>,
    pub arguments: &'a str,
}

impl ParsedCommand<'_> {
    pub fn command(&self) -> Command {
        Command::from_keyword(self.keyword)
    }

    pub fn is_addressed_to(&self, username: &str) -> bool {
        self.mention == Some(username)
    }
}

/// Split `/keyword@mention arguments` into its parts.
///
/// `command_len` is the byte length of the leading bot-command entity,
/// slash included. Arguments start after the single character that follows
/// the command and are returned untrimmed.
pub fn parse_command(text: &str, command_len: usize) -> Option<ParsedCommand<'_>> {
    if !text.starts_with('/') || command_len < 1 || !text.is_char_boundary(command_len) {
        return None;
    }

    let token = text.get(1..command_len)?;
    let arguments = text[command_len..]
        .chars()
        .next()
        .map(|sep| &text[command_len + sep.len_utf8()..])
        .unwrap_or("");

    let (keyword, mention) = match token.split_once('@') {
        Some((keyword, mention)) => (keyword, Some(mention)),
        None => (token, None),
    };

    Some(ParsedCommand {
        keyword,
        mention,
        arguments,
    })
}

/// Convert an entity length in UTF-16 code units into a byte length of `text`.
pub fn utf16_len_to_byte_len(text: &str, utf16_len: usize) -> Option<usize> {
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        if units == utf16_len {
            return Some(idx);
        }
        units += c.len_utf16();
    }
    (units == utf16_len).then_some(text.len())
}

/// Detect an optional `-<code> ` prefix on command arguments.
///
/// Returns `(code, remainder)` where the remainder keeps its leading space,
/// or `("", raw)` when the prefix is absent or malformed.
pub fn parse_lang_code(raw: &str) -> (&str, &str) {
    if raw.len() <= LANG_PREFIX.len() + 2 || !raw.starts_with(LANG_PREFIX) {
        return ("", raw);
    }

    match raw.find(' ') {
        Some(space) => (&raw[LANG_PREFIX.len()..space], &raw[space..]),
        None => ("", raw),
    }
}
