//! Client command parsing for the registered phase
//!
//! A line is a command only when it matches exactly: `/list` takes no
//! arguments, and `/whisper` requires the trailing space. Anything else,
//! including `/whisper` on its own or `/list extra`, is plain chat text.

/// Commands must match the prefix including the separating space
const WHISPER_PREFIX: &str = "/whisper ";

/// A classified client line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/list` - query the connected users
    List,
    /// `/whisper <pseudo> <message>` - private message
    Whisper { target: String, message: String },
    /// Plain chat text, broadcast to the other users
    Say(String),
}

/// Parse failure for a line that is recognizably a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("usage: /whisper <pseudo> <message>")]
    WhisperUsage,
}

impl Command {
    /// Classify one complete line. `Ok(None)` means the line was blank.
    ///
    /// The whisper remainder splits on the first space only, so the message
    /// part is carried verbatim, embedded spaces included.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if line == "/list" {
            return Ok(Some(Command::List));
        }

        if let Some(rest) = line.strip_prefix(WHISPER_PREFIX) {
            let (target, message) = rest.split_once(' ').ok_or(CommandError::WhisperUsage)?;
            if target.is_empty() || message.is_empty() {
                return Err(CommandError::WhisperUsage);
            }
            return Ok(Some(Command::Whisper {
                target: target.to_string(),
                message: message.to_string(),
            }));
        }

        Ok(Some(Command::Say(line.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("\t"), Ok(None));
    }

    #[test]
    fn test_list() {
        assert_eq!(Command::parse("/list"), Ok(Some(Command::List)));
        assert_eq!(Command::parse("  /list  "), Ok(Some(Command::List)));
    }

    #[test]
    fn test_list_with_arguments_is_chat() {
        assert_eq!(
            Command::parse("/list extra"),
            Ok(Some(Command::Say("/list extra".into())))
        );
    }

    #[test]
    fn test_whisper() {
        assert_eq!(
            Command::parse("/whisper Bob hello"),
            Ok(Some(Command::Whisper {
                target: "Bob".into(),
                message: "hello".into(),
            }))
        );
    }

    #[test]
    fn test_whisper_message_kept_verbatim() {
        // Only the first space separates target from message
        assert_eq!(
            Command::parse("/whisper Bob  two  spaces"),
            Ok(Some(Command::Whisper {
                target: "Bob".into(),
                message: " two  spaces".into(),
            }))
        );
    }

    #[test]
    fn test_whisper_missing_message() {
        assert_eq!(
            Command::parse("/whisper Bob"),
            Err(CommandError::WhisperUsage)
        );
        assert_eq!(
            Command::parse("/whisper Bob "),
            Err(CommandError::WhisperUsage)
        );
    }

    #[test]
    fn test_whisper_missing_target() {
        // A double space after the prefix yields an empty target
        assert_eq!(
            Command::parse("/whisper  Bob hi"),
            Err(CommandError::WhisperUsage)
        );
    }

    #[test]
    fn test_whisper_without_trailing_space_is_chat() {
        assert_eq!(
            Command::parse("/whisper"),
            Ok(Some(Command::Say("/whisper".into())))
        );
    }

    #[test]
    fn test_plain_chat_is_trimmed() {
        assert_eq!(
            Command::parse("  hey everyone  "),
            Ok(Some(Command::Say("hey everyone".into())))
        );
    }
}
