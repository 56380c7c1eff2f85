//! Command vocabulary and the fixed reply texts.

pub const START_TEXT: &str = "Приветствую!";

pub const HELP_TEXT: &str =
    "Доступные команды:\n/start\n/help\n/hello\n/inn <ИНН1> <ИНН2> ...\n/last";

pub const HELLO_TEXT: &str =
    "Имя: Михаил Кляузин\nEmail: mihanich.krut@gmail.com\nGitHub: https://github.com/Mihklz";

pub const INN_USAGE_TEXT: &str = "Пожалуйста, укажите один или несколько ИНН после команды /inn.";

pub const EMPTY_INN_LINE: &str = "ИНН не может быть пустым.\n";

pub const NO_LAST_ACTION_TEXT: &str = "Нет предыдущего действия.";

pub const UNKNOWN_COMMAND_TEXT: &str =
    "Неизвестная команда. Используйте /help для получения списка команд.";

pub const NON_TEXT_PROMPT: &str =
    "Пожалуйста, отправьте текстовое сообщение. Используйте /help для получения списка команд.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Hello,
    /// Raw arguments split on single spaces; blank entries are kept in place.
    Inn(Vec<String>),
    Last,
    Unknown,
}

impl Command {
    /// Parse the first whitespace-delimited token (case-insensitive, `@botname` stripped).
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, Some(rest)),
            None => (text, None),
        };

        let mut name = head.to_lowercase();
        if name.starts_with('/') {
            if let Some(at) = name.find('@') {
                name.truncate(at);
            }
        }

        match name.as_str() {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/hello" => Command::Hello,
            "/inn" => Command::Inn(
                rest.map(|r| r.split(' ').map(str::to_string).collect())
                    .unwrap_or_default(),
            ),
            "/last" => Command::Last,
            _ => Command::Unknown,
        }
    }

    /// Canonical command name recorded in the session.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Command::Start => Some("/start"),
            Command::Help => Some("/help"),
            Command::Hello => Some("/hello"),
            Command::Inn(_) => Some("/inn"),
            Command::Last => Some("/last"),
            Command::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Command {
        Command::Inn(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_static_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/hello"), Command::Hello);
        assert_eq!(Command::parse("/last"), Command::Last);
    }

    #[test]
    fn test_case_insensitive_and_trailing_words() {
        assert_eq!(Command::parse("/START"), Command::Start);
        assert_eq!(Command::parse("/Help me please"), Command::Help);
        assert_eq!(Command::parse("  /last  "), Command::Last);
    }

    #[test]
    fn test_bot_mention_suffix_stripped() {
        assert_eq!(Command::parse("/start@inn_lookup_bot"), Command::Start);
        assert_eq!(Command::parse("/INN@Inn_Lookup_Bot 123"), args(&["123"]));
    }

    #[test]
    fn test_inn_arguments() {
        assert_eq!(Command::parse("/inn"), args(&[]));
        assert_eq!(Command::parse("/inn   "), args(&[]));
        assert_eq!(Command::parse("/inn 123"), args(&["123"]));
        assert_eq!(Command::parse("/inn 123 456"), args(&["123", "456"]));
        assert_eq!(Command::parse("/inn 123  456"), args(&["123", "", "456"]));
        assert_eq!(Command::parse("/inn\n123"), args(&["123"]));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Command::parse("hello there"), Command::Unknown);
        assert_eq!(Command::parse("/innn 1"), Command::Unknown);
        assert_eq!(Command::parse("user@example.com"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
    }

    #[test]
    fn test_names() {
        assert_eq!(Command::parse("/inn 1").name(), Some("/inn"));
        assert_eq!(Command::Unknown.name(), None);
    }
}
