//! Handlers for list, whisper, and chat lines

use salon_protocol::ServerText;

use super::{HandlerContext, HandlerResult};

impl HandlerContext {
    /// Handle `/list` - the full pseudo list, caller included, accept order
    pub(super) fn handle_list(&self) -> HandlerResult {
        HandlerResult::Reply(ServerText::UserList {
            pseudos: self.registry.pseudos(),
        })
    }

    /// Handle `/whisper <pseudo> <message>`
    ///
    /// Duplicate pseudos are legal; the first registration wins.
    pub(super) fn handle_whisper(&self, target: &str, message: String) -> HandlerResult {
        match self.registry.find_by_pseudo(target) {
            Some(target_id) => HandlerResult::Deliver {
                target: target_id,
                message: ServerText::Whisper {
                    from: self.pseudo.clone(),
                    message,
                },
            },
            None => HandlerResult::Reply(ServerText::UnknownUser {
                pseudo: target.to_string(),
            }),
        }
    }

    /// Handle a default chat line
    pub(super) fn handle_say(&self, text: String) -> HandlerResult {
        HandlerResult::Broadcast(ServerText::Chat {
            pseudo: self.pseudo.clone(),
            message: text,
        })
    }
}
