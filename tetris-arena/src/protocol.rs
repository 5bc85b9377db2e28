//! Wire messages exchanged with clients
//!
//! Inbound frames are JSON objects such as
//! `{"ActionType": "Move", "Direction": "LEFT"}`; outbound frames are JSON
//! objects tagged by an `action` field.

use serde::{Deserialize, Serialize};
use tetris_engine::{Direction, Grid, Piece, PlayerState};

use crate::error::{ArenaError, Result};
use crate::types::{PlayerId, RoomId};

/// Action kinds a client may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Move,
    Rotate,
    Drop,
    Start,
    Stop,
    Join,
    Init,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(rename = "ActionType", alias = "actionType")]
    action_type: ActionType,
    #[serde(default, rename = "Direction", alias = "direction")]
    direction: Option<String>,
}

/// One parsed inbound action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    /// None when the direction was missing or not one of LEFT/RIGHT/DOWN
    Move(Option<Direction>),
    Rotate,
    Drop,
    Start,
    Stop,
    Join,
    Init,
}

impl ClientAction {
    /// Parse one text frame
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawAction =
            serde_json::from_str(text).map_err(|e| ArenaError::Protocol(e.to_string()))?;
        Ok(match raw.action_type {
            ActionType::Move => {
                ClientAction::Move(raw.direction.as_deref().and_then(Direction::parse))
            }
            ActionType::Rotate => ClientAction::Rotate,
            ActionType::Drop => ClientAction::Drop,
            ActionType::Start => ClientAction::Start,
            ActionType::Stop => ClientAction::Stop,
            ActionType::Join => ClientAction::Join,
            ActionType::Init => ClientAction::Init,
        })
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            ClientAction::Move(_) => ActionType::Move,
            ClientAction::Rotate => ActionType::Rotate,
            ClientAction::Drop => ActionType::Drop,
            ClientAction::Start => ActionType::Start,
            ClientAction::Stop => ActionType::Stop,
            ClientAction::Join => ActionType::Join,
            ClientAction::Init => ActionType::Init,
        }
    }
}

/// One player's board as seen by a client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub player_id: PlayerId,
    /// Resting cells with the active piece drawn in
    pub grid: Grid,
    pub current_block: Piece,
    /// Preview of the next piece; only ever shown to its owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_block: Option<Vec<Vec<u8>>>,
    pub score: u32,
    pub lines_cleared: u32,
    pub is_game_over: bool,
}

impl PlayerView {
    /// View for the player who owns the state
    pub fn own(state: &PlayerState<PlayerId>) -> Self {
        PlayerView {
            next_block: Some(state.next.kind.preview(state.next.rotation)),
            ..Self::opponent(state)
        }
    }

    /// View for the other player: identical minus the next-piece preview
    pub fn opponent(state: &PlayerState<PlayerId>) -> Self {
        PlayerView {
            player_id: state.id.clone(),
            grid: state.rendered_grid(),
            current_block: state.current,
            next_block: None,
            score: state.score,
            lines_cleared: state.lines_cleared,
            is_game_over: state.is_game_over(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayersView {
    #[serde(rename = "self")]
    pub own: PlayerView,
    pub opponent: Option<PlayerView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub players: PlayersView,
    pub is_game_active: bool,
}

/// Messages the server sends to a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action")]
pub enum ServerMessage {
    #[serde(rename = "Init", rename_all = "camelCase")]
    Init { room_id: RoomId, player_id: PlayerId },

    #[serde(rename = "GAME_START")]
    GameStart,

    #[serde(rename = "UPDATE", rename_all = "camelCase")]
    Update { game_state: GameStateView },

    #[serde(rename = "PLAYER_DISCONNECTED", rename_all = "camelCase")]
    PlayerDisconnected { player_id: PlayerId },

    /// `winner_id` is None for a draw
    #[serde(rename = "GAME_OVER", rename_all = "camelCase")]
    GameOver { winner_id: Option<PlayerId> },

    #[serde(rename = "ERROR")]
    Error { message: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tetris_engine::{Engine, PieceType, Position, Rotation};

    #[test]
    fn test_parse_pascal_and_camel_case_keys() {
        let action = ClientAction::parse(r#"{"ActionType":"Move","Direction":"LEFT"}"#).unwrap();
        assert_eq!(action, ClientAction::Move(Some(Direction::Left)));
        let action = ClientAction::parse(r#"{"actionType":"Move","direction":"DOWN"}"#).unwrap();
        assert_eq!(action, ClientAction::Move(Some(Direction::Down)));
        let action = ClientAction::parse(r#"{"ActionType":"Join"}"#).unwrap();
        assert_eq!(action, ClientAction::Join);
        assert_eq!(action.action_type(), ActionType::Join);
    }

    #[test]
    fn test_unknown_direction_is_not_an_error() {
        let action = ClientAction::parse(r#"{"ActionType":"Move","Direction":"UP"}"#).unwrap();
        assert_eq!(action, ClientAction::Move(None));
        let action = ClientAction::parse(r#"{"ActionType":"Move"}"#).unwrap();
        assert_eq!(action, ClientAction::Move(None));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let action = ClientAction::parse(r#"{"ActionType":"Rotate","Rotation":1}"#).unwrap();
        assert_eq!(action, ClientAction::Rotate);
    }

    #[test]
    fn test_malformed_payloads_are_protocol_errors() {
        for text in ["not json", "{}", r#"{"ActionType":"Teleport"}"#, r#"{"ActionType":3}"#] {
            match ClientAction::parse(text) {
                Err(ArenaError::Protocol(_)) => {}
                other => panic!("Expected Protocol error for {}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_simple_messages_serialize() {
        assert_eq!(
            serde_json::to_value(ServerMessage::GameStart).unwrap(),
            json!({"action": "GAME_START"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::Error { message: "Invalid action type".into() })
                .unwrap(),
            json!({"action": "ERROR", "message": "Invalid action type"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::GameOver { winner_id: None }).unwrap(),
            json!({"action": "GAME_OVER", "winnerId": null})
        );
    }

    #[test]
    fn test_init_carries_room_and_player() {
        let room_id = RoomId::generate();
        let player_id = PlayerId::generate();
        let json = serde_json::to_value(ServerMessage::Init {
            room_id: room_id.clone(),
            player_id: player_id.clone(),
        })
        .unwrap();
        assert_eq!(
            json,
            json!({"action": "Init", "roomId": room_id.as_str(), "playerId": player_id.as_str()})
        );
    }

    #[test]
    fn test_update_hides_opponent_preview() {
        let mut engine = Engine::seeded(4);
        let mut me = engine.initialize_player(PlayerId::generate());
        me.current = Piece::new(PieceType::O, Rotation::R0, Position::new(0, 0));
        me.next = Piece::spawn(PieceType::T);
        let them = engine.initialize_player(PlayerId::generate());

        let message = ServerMessage::Update {
            game_state: GameStateView {
                players: PlayersView {
                    own: PlayerView::own(&me),
                    opponent: Some(PlayerView::opponent(&them)),
                },
                is_game_active: true,
            },
        };
        let json = serde_json::to_value(&message).unwrap();
        let own = &json["gameState"]["players"]["self"];
        let opponent = &json["gameState"]["players"]["opponent"];

        assert_eq!(json["action"], "UPDATE");
        assert_eq!(json["gameState"]["isGameActive"], true);
        assert_eq!(own["nextBlock"], json!([[0, 3, 0], [3, 3, 3], [0, 0, 0]]));
        assert_eq!(own["grid"][0][0], 2);
        assert_eq!(own["currentBlock"]["type"], "O");
        assert_eq!(own["linesCleared"], 0);
        assert!(opponent.get("nextBlock").is_none());
        assert_eq!(opponent["playerId"], them.id.as_str());
        // The stored grid is never drawn on
        assert!(me.grid.is_empty());
    }
}
