//! Menu buttons.
//!
//! The host renders the menus; the engine only needs to know which button
//! was pressed. Each button carries a string id, parsed into a closed
//! [`MenuAction`] and dispatched by [`Engine::handle_menu`](crate::Engine::handle_menu).

use std::fmt;
use std::str::FromStr;

use wayforge_protocol::ParticipantId;
use wayforge_request::Accepted;
use wayforge_session::{GameStatus, StartedGame};

use crate::WayforgeError;

/// Every action a menu button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    StartGame,
    EndGame,
    ShowStatus,
    AcceptRequest,
    DenyRequest,
    CancelRequest,
    Close,
}

impl MenuAction {
    pub const ALL: [MenuAction; 7] = [
        MenuAction::StartGame,
        MenuAction::EndGame,
        MenuAction::ShowStatus,
        MenuAction::AcceptRequest,
        MenuAction::DenyRequest,
        MenuAction::CancelRequest,
        MenuAction::Close,
    ];

    /// The button id used in menu definitions.
    pub fn id(self) -> &'static str {
        match self {
            Self::StartGame => "start_game",
            Self::EndGame => "end_game",
            Self::ShowStatus => "show_status",
            Self::AcceptRequest => "accept_request",
            Self::DenyRequest => "deny_request",
            Self::CancelRequest => "cancel_request",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MenuAction {
    type Err = WayforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.id() == s)
            .ok_or_else(|| WayforgeError::UnknownAction(s.to_string()))
    }
}

/// What a dispatched menu action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    Started(StartedGame),
    Ended,
    Status(GameStatus),
    Accepted(Accepted),
    Denied { requester: ParticipantId },
    Cancelled { target: ParticipantId },
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_parses_every_id() {
        for action in MenuAction::ALL {
            assert_eq!(action.id().parse::<MenuAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_from_str_unknown_id() {
        let result = "open_shop".parse::<MenuAction>();
        assert!(matches!(result, Err(WayforgeError::UnknownAction(id)) if id == "open_shop"));
    }

    #[test]
    fn test_display_is_id() {
        assert_eq!(MenuAction::CancelRequest.to_string(), "cancel_request");
    }
}
