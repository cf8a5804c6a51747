//! Event and snapshot types that travel on the wire.
//!
//! Every frame on the event channel is one JSON object of the form
//! `{"event": "<kebab-case name>", "data": <payload>}`. Inbound frames
//! decode into [`ClientEvent`], outbound frames are encoded from
//! [`ServerEvent`]. Payload field names are camelCase, because the
//! browser client reads them straight into JavaScript objects.

use std::fmt;

use chrono::{DateTime, Utc};
use parlor_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// The public code of a room: six ASCII digits, `100000..=999999`.
///
/// Players type this code to join a friend's room, so it is a short
/// decimal string rather than an opaque number.
///
/// Deserialization does not validate the shape. A malformed id coming
/// from a client is simply an id no live room carries, which the room
/// layer already reports as "room not found".
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Smallest numeric value a room id can take.
    pub const MIN: u32 = 100_000;
    /// Largest numeric value a room id can take.
    pub const MAX: u32 = 999_999;

    /// Builds a room id from its numeric value.
    ///
    /// Returns `None` if `n` is outside `MIN..=MAX`.
    pub fn from_number(n: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&n)
            .then(|| Self(n.to_string()))
    }

    /// Parses a room code typed by a user or taken from a URL path.
    ///
    /// Accepts exactly six ASCII digits within `MIN..=MAX`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<u32>().ok().and_then(Self::from_number)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Room snapshot
// ---------------------------------------------------------------------------

/// Where a room is in its game cycle.
///
/// ```text
/// Waiting ──(all ready, ≥ min players)──→ Playing ──(win/draw)──→ Finished
///    ↑                                                               │
///    └─────────────────────(reset grace elapsed)─────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhase {
    /// Players gather and mark themselves ready. No game state exists.
    #[default]
    Waiting,
    /// A game is in progress and accepts moves.
    Playing,
    /// The game ended; the final state stays visible until the reset.
    Finished,
}

impl RoomPhase {
    /// Returns the phase that follows this one in the cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Waiting => Self::Playing,
            Self::Playing => Self::Finished,
            Self::Finished => Self::Waiting,
        }
    }

    /// Returns `true` if moving to `target` follows the cycle.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == target
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("waiting"),
            Self::Playing => f.write_str("playing"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// A player as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    /// The player's connection, which doubles as its identity.
    pub id: ConnectionId,
    /// Display name. Not unique within a room.
    pub name: String,
    /// Games won in this room. Survives from one game to the next.
    pub score: u32,
    /// Whether the player asked to start the next game.
    pub is_ready: bool,
    /// Whether this player is the room's host.
    pub is_host: bool,
}

/// A full, self-contained picture of a room.
///
/// Sent to a player when they join and returned by the HTTP lookup.
/// `S` is the game's state type; `game` is present only while the room
/// is playing or finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot<S> {
    /// The room's six-digit code.
    pub id: RoomId,
    /// Players in join order.
    pub players: Vec<PlayerInfo>,
    /// Capacity of the room.
    pub max_players: usize,
    /// Current phase.
    pub state: RoomPhase,
    /// Game state, if a game is running or just ended.
    pub game: Option<S>,
    /// Name given by whoever created the room.
    pub creator: String,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// Everything a client can send over the event channel.
///
/// ```json
/// {"event": "join-room", "data": {"roomId": "482913", "playerName": "Ayu"}}
/// {"event": "game-action", "data": {"roomId": "482913", "action": "move", "data": {"position": 4}}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Enter a room under a display name.
    JoinRoom {
        room_id: RoomId,
        player_name: String,
    },

    /// Mark a player of the room as ready for the next game.
    PlayerReady {
        room_id: RoomId,
        player_id: ConnectionId,
    },

    /// A game move. `action` names the kind of move and `data` carries
    /// its arguments; the game decides how to read them.
    GameAction {
        room_id: RoomId,
        action: String,
        #[serde(default)]
        data: serde_json::Value,
    },

    /// A chat line for everyone in the room.
    SendMessage {
        room_id: RoomId,
        message: String,
        #[serde(default)]
        player_name: String,
    },

    /// Leave the room explicitly.
    LeaveRoom { room_id: RoomId },
}

impl ClientEvent {
    /// Short, stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::PlayerReady { .. } => "player-ready",
            Self::GameAction { .. } => "game-action",
            Self::SendMessage { .. } => "send-message",
            Self::LeaveRoom { .. } => "leave-room",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Everything the server sends over the event channel.
///
/// `S` is the game's state type, which travels whole in `game-started`
/// and `game-update`: clients never have to patch partial updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent<S> {
    /// To the joiner only: the room as it is after the join.
    RoomJoined {
        room: RoomSnapshot<S>,
        player_id: ConnectionId,
        is_host: bool,
    },

    /// To everyone else: who just came in.
    PlayerJoined(PlayerInfo),

    /// Someone became ready; `all_ready` is recomputed over the room.
    PlayerReadyUpdate {
        player_id: ConnectionId,
        all_ready: bool,
    },

    /// The game began. Carries the initial game state.
    GameStarted(S),

    /// A move was applied. Carries the full post-move state.
    GameUpdate(S),

    /// The finished game was cleared and the room is waiting again.
    GameReset,

    /// A relayed chat line.
    NewMessage {
        player_name: String,
        message: String,
        timestamp: String,
    },

    /// A player left or disconnected.
    PlayerLeft(ConnectionId),

    /// The host left and another player took over.
    HostChanged { player_id: ConnectionId },

    /// A request from this connection was rejected.
    Error { message: String },
}

impl<S> ServerEvent<S> {
    /// Shorthand for a targeted error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who in a room should receive an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every member of the room.
    All,
    /// One member.
    Player(ConnectionId),
    /// Every member except one, typically the one who caused the event.
    AllExcept(ConnectionId),
}

impl Recipient {
    /// Returns `true` if `member` is covered by this recipient.
    pub fn includes(self, member: ConnectionId) -> bool {
        match self {
            Self::All => true,
            Self::Player(id) => id == member,
            Self::AllExcept(id) => id != member,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client reads these JSON shapes directly, so the tests
    //! pin the exact field and event names.

    use serde_json::json;

    use super::*;

    fn cid(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    fn player(n: u64, name: &str, is_host: bool) -> PlayerInfo {
        PlayerInfo {
            id: cid(n),
            name: name.into(),
            score: 0,
            is_ready: false,
            is_host,
        }
    }

    // =====================================================================
    // RoomId
    // =====================================================================

    #[test]
    fn test_room_id_parse_accepts_six_digits() {
        let id = RoomId::parse("482913").expect("valid id");
        assert_eq!(id.as_str(), "482913");
        assert_eq!(id.to_string(), "482913");
    }

    #[test]
    fn test_room_id_parse_rejects_bad_shapes() {
        for bad in ["", "12345", "1234567", "12a456", "０１２３４５", "012345", " 48291"] {
            assert!(RoomId::parse(bad).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_room_id_from_number_bounds() {
        assert!(RoomId::from_number(99_999).is_none());
        assert_eq!(RoomId::from_number(100_000).unwrap().as_str(), "100000");
        assert_eq!(RoomId::from_number(999_999).unwrap().as_str(), "999999");
        assert!(RoomId::from_number(1_000_000).is_none());
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let id = RoomId::parse("555123").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"555123\"");
    }

    // =====================================================================
    // RoomPhase
    // =====================================================================

    #[test]
    fn test_room_phase_cycle() {
        assert!(RoomPhase::Waiting.can_transition_to(RoomPhase::Playing));
        assert!(RoomPhase::Playing.can_transition_to(RoomPhase::Finished));
        assert!(RoomPhase::Finished.can_transition_to(RoomPhase::Waiting));
        assert!(!RoomPhase::Waiting.can_transition_to(RoomPhase::Finished));
        assert!(!RoomPhase::Finished.can_transition_to(RoomPhase::Playing));
    }

    #[test]
    fn test_room_phase_wire_names() {
        assert_eq!(serde_json::to_value(RoomPhase::Waiting).unwrap(), "waiting");
        assert_eq!(serde_json::to_value(RoomPhase::Playing).unwrap(), "playing");
        assert_eq!(serde_json::to_value(RoomPhase::Finished).unwrap(), "finished");
    }

    // =====================================================================
    // Snapshots
    // =====================================================================

    #[test]
    fn test_player_info_json_format() {
        let json = serde_json::to_value(player(3, "Ayu", true)).unwrap();
        assert_eq!(
            json,
            json!({"id": 3, "name": "Ayu", "score": 0, "isReady": false, "isHost": true})
        );
    }

    #[test]
    fn test_room_snapshot_json_format() {
        let snapshot: RoomSnapshot<()> = RoomSnapshot {
            id: RoomId::parse("123456").unwrap(),
            players: vec![player(1, "Ayu", true)],
            max_players: 4,
            state: RoomPhase::Waiting,
            game: None,
            creator: "Ayu".into(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["id"], "123456");
        assert_eq!(json["maxPlayers"], 4);
        assert_eq!(json["state"], "waiting");
        assert!(json["game"].is_null());
        assert_eq!(json["players"][0]["isHost"], true);
        assert_eq!(json["creator"], "Ayu");
        assert!(json["createdAt"].as_str().unwrap().starts_with("1970-01-01"));
    }

    // =====================================================================
    // ClientEvent: one test per event name
    // =====================================================================

    #[test]
    fn test_client_event_join_room_from_json() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "join-room",
            "data": {"roomId": "482913", "playerName": "Ayu"}
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_id: RoomId::parse("482913").unwrap(),
                player_name: "Ayu".into(),
            }
        );
        assert_eq!(event.name(), "join-room");
    }

    #[test]
    fn test_client_event_player_ready_from_json() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "player-ready",
            "data": {"roomId": "482913", "playerId": 9}
        }))
        .unwrap();
        assert!(matches!(
            event,
            ClientEvent::PlayerReady { player_id, .. } if player_id == cid(9)
        ));
    }

    #[test]
    fn test_client_event_game_action_keeps_raw_data() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "game-action",
            "data": {"roomId": "482913", "action": "move", "data": {"position": 4}}
        }))
        .unwrap();
        match event {
            ClientEvent::GameAction { action, data, .. } => {
                assert_eq!(action, "move");
                assert_eq!(data["position"], 4);
            }
            other => panic!("expected GameAction, got {other:?}"),
        }
    }

    #[test]
    fn test_client_event_send_message_name_is_optional() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "send-message",
            "data": {"roomId": "482913", "message": "halo"}
        }))
        .unwrap();
        assert!(matches!(
            event,
            ClientEvent::SendMessage { ref player_name, .. } if player_name.is_empty()
        ));
    }

    #[test]
    fn test_client_event_leave_room_from_json() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "leave-room",
            "data": {"roomId": "482913"}
        }))
        .unwrap();
        assert_eq!(event.name(), "leave-room");
    }

    #[test]
    fn test_client_event_unknown_name_is_rejected() {
        let result: Result<ClientEvent, _> = serde_json::from_value(json!({
            "event": "fly-to-moon",
            "data": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_event_missing_field_is_rejected() {
        let result: Result<ClientEvent, _> = serde_json::from_value(json!({
            "event": "join-room",
            "data": {"roomId": "482913"}
        }));
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_server_event_room_joined_json_format() {
        let event: ServerEvent<()> = ServerEvent::RoomJoined {
            room: RoomSnapshot {
                id: RoomId::parse("123456").unwrap(),
                players: vec![player(1, "Ayu", true)],
                max_players: 4,
                state: RoomPhase::Waiting,
                game: None,
                creator: "Ayu".into(),
                created_at: Utc::now(),
            },
            player_id: cid(1),
            is_host: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "room-joined");
        assert_eq!(json["data"]["playerId"], 1);
        assert_eq!(json["data"]["isHost"], true);
        assert_eq!(json["data"]["room"]["id"], "123456");
    }

    #[test]
    fn test_server_event_player_joined_carries_player() {
        let event: ServerEvent<()> = ServerEvent::PlayerJoined(player(2, "Budi", false));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "player-joined");
        assert_eq!(json["data"]["name"], "Budi");
    }

    #[test]
    fn test_server_event_ready_update_json_format() {
        let event: ServerEvent<()> = ServerEvent::PlayerReadyUpdate {
            player_id: cid(2),
            all_ready: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({"event": "player-ready-update", "data": {"playerId": 2, "allReady": false}})
        );
    }

    #[test]
    fn test_server_event_game_reset_has_no_data() {
        let json = serde_json::to_value(ServerEvent::<()>::GameReset).unwrap();
        assert_eq!(json, json!({"event": "game-reset"}));
    }

    #[test]
    fn test_server_event_player_left_is_bare_id() {
        let json = serde_json::to_value(ServerEvent::<()>::PlayerLeft(cid(5))).unwrap();
        assert_eq!(json, json!({"event": "player-left", "data": 5}));
    }

    #[test]
    fn test_server_event_game_update_wraps_state() {
        let json = serde_json::to_value(ServerEvent::GameUpdate(json!({"round": 2}))).unwrap();
        assert_eq!(json, json!({"event": "game-update", "data": {"round": 2}}));
    }

    #[test]
    fn test_server_event_new_message_json_format() {
        let event: ServerEvent<()> = ServerEvent::NewMessage {
            player_name: "Ayu".into(),
            message: "halo".into(),
            timestamp: "10:31:22".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new-message");
        assert_eq!(json["data"]["playerName"], "Ayu");
        assert_eq!(json["data"]["timestamp"], "10:31:22");
    }

    #[test]
    fn test_server_event_error_json_format() {
        let json = serde_json::to_value(ServerEvent::<()>::error("room is full")).unwrap();
        assert_eq!(json, json!({"event": "error", "data": {"message": "room is full"}}));
    }

    // =====================================================================
    // Recipient
    // =====================================================================

    #[test]
    fn test_recipient_includes() {
        assert!(Recipient::All.includes(cid(1)));
        assert!(Recipient::Player(cid(1)).includes(cid(1)));
        assert!(!Recipient::Player(cid(1)).includes(cid(2)));
        assert!(!Recipient::AllExcept(cid(1)).includes(cid(1)));
        assert!(Recipient::AllExcept(cid(1)).includes(cid(2)));
    }
}
