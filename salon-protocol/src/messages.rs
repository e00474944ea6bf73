//! Server-to-client message catalog
//!
//! Every variant renders to the exact byte sequence sent on the wire. Each
//! message carries its own terminator: all of them end with `\n` except the
//! pseudo prompt, which is deliberately left unterminated so the client's
//! cursor stays on the prompt line.

use std::fmt;

/// A message from the server to one or more clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerText {
    /// Sent once, immediately after accept
    PseudoPrompt,
    /// Sent to a client on successful registration
    Welcome { pseudo: String },
    /// Broadcast to the other clients on registration
    Joined { pseudo: String },
    /// Broadcast to the remaining clients on disconnect
    Left { pseudo: String },
    /// Response to `/list`; renders the "no users" notice when empty
    UserList { pseudos: Vec<String> },
    /// Response to a malformed `/whisper`
    WhisperUsage,
    /// Response when a whisper target is not registered
    UnknownUser { pseudo: String },
    /// Private message delivered to the whisper target
    Whisper { from: String, message: String },
    /// Default chat line broadcast to the other clients
    Chat { pseudo: String, message: String },
}

impl fmt::Display for ServerText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PseudoPrompt => write!(f, "Entrez votre pseudo: "),
            Self::Welcome { pseudo } => writeln!(f, "Bienvenue {}!", pseudo),
            Self::Joined { pseudo } => writeln!(f, "{} a rejoint le chat", pseudo),
            Self::Left { pseudo } => writeln!(f, "{} a quitté le chat", pseudo),
            Self::UserList { pseudos } => {
                if pseudos.is_empty() {
                    writeln!(f, "Aucun utilisateur connecté.")
                } else {
                    writeln!(f, "Utilisateurs connectés: {}", pseudos.join(", "))
                }
            }
            Self::WhisperUsage => writeln!(f, "Usage: /whisper <pseudo> <message>"),
            Self::UnknownUser { pseudo } => writeln!(f, "Utilisateur {} non trouvé.", pseudo),
            Self::Whisper { from, message } => writeln!(f, "[Whisper][{}] {}", from, message),
            Self::Chat { pseudo, message } => writeln!(f, "{}: {}", pseudo, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_has_no_newline() {
        assert_eq!(ServerText::PseudoPrompt.to_string(), "Entrez votre pseudo: ");
    }

    #[test]
    fn test_welcome_rendering() {
        let msg = ServerText::Welcome {
            pseudo: "Alice".into(),
        };
        assert_eq!(msg.to_string(), "Bienvenue Alice!\n");
    }

    #[test]
    fn test_join_and_leave_rendering() {
        let joined = ServerText::Joined {
            pseudo: "Alice".into(),
        };
        assert_eq!(joined.to_string(), "Alice a rejoint le chat\n");

        let left = ServerText::Left {
            pseudo: "Alice".into(),
        };
        assert_eq!(left.to_string(), "Alice a quitté le chat\n");
    }

    #[test]
    fn test_user_list_rendering() {
        let msg = ServerText::UserList {
            pseudos: vec!["Alice".into(), "Bob".into()],
        };
        assert_eq!(msg.to_string(), "Utilisateurs connectés: Alice, Bob\n");
    }

    #[test]
    fn test_empty_user_list_rendering() {
        let msg = ServerText::UserList { pseudos: vec![] };
        assert_eq!(msg.to_string(), "Aucun utilisateur connecté.\n");
    }

    #[test]
    fn test_whisper_rendering() {
        let msg = ServerText::Whisper {
            from: "Alice".into(),
            message: "hello".into(),
        };
        assert_eq!(msg.to_string(), "[Whisper][Alice] hello\n");
    }

    #[test]
    fn test_whisper_errors_rendering() {
        assert_eq!(
            ServerText::WhisperUsage.to_string(),
            "Usage: /whisper <pseudo> <message>\n"
        );
        let msg = ServerText::UnknownUser {
            pseudo: "Nobody".into(),
        };
        assert_eq!(msg.to_string(), "Utilisateur Nobody non trouvé.\n");
    }

    #[test]
    fn test_chat_rendering() {
        let msg = ServerText::Chat {
            pseudo: "Alice".into(),
            message: "hey everyone".into(),
        };
        assert_eq!(msg.to_string(), "Alice: hey everyone\n");
    }
}
