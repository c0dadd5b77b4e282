//! Parsing of incoming chat text into commands.

/// What an incoming message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start <quest>`; the argument may be missing.
    Start(Option<String>),
    /// `/question` repeats the current question.
    Question,
    /// `/stats <quest>`; admins only.
    Stats(Option<String>),
    /// `/quests` lists registered quests.
    Quests,
    /// Anything else is an answer to the current question.
    Answer(String),
}

impl ChatCommand {
    /// Classifies `text`. Commands are matched on the first word, so
    /// `/start@bot geo` is treated like `/start geo`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Answer(text.to_owned());
        };
        let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let name = head.split('@').next().unwrap_or(head);
        let argument = Some(args.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_owned);
        match name {
            "start" => Self::Start(argument),
            "question" => Self::Question,
            "stats" => Self::Stats(argument),
            "quests" => Self::Quests,
            _ => Self::Answer(text.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChatCommand;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ChatCommand::parse("/start geo"),
            ChatCommand::Start(Some("geo".into()))
        );
        assert_eq!(
            ChatCommand::parse("  /start@questbot   geo  "),
            ChatCommand::Start(Some("geo".into()))
        );
        assert_eq!(ChatCommand::parse("/start"), ChatCommand::Start(None));
        assert_eq!(ChatCommand::parse("/question"), ChatCommand::Question);
        assert_eq!(
            ChatCommand::parse("/stats geo"),
            ChatCommand::Stats(Some("geo".into()))
        );
        assert_eq!(ChatCommand::parse("/quests"), ChatCommand::Quests);
    }

    #[test]
    fn test_other_text_is_an_answer() {
        assert_eq!(
            ChatCommand::parse("Paris"),
            ChatCommand::Answer("Paris".into())
        );
        assert_eq!(
            ChatCommand::parse("/unknown thing"),
            ChatCommand::Answer("/unknown thing".into())
        );
    }
}
