//! The room state machine.
//!
//! [`Room`] is plain data plus transitions: every operation takes the
//! room and one event and returns a [`Transition`] holding the outbound events
//! and the timer effects the caller should apply. It never touches a
//! channel or a clock, which keeps it testable without a runtime. The
//! room actor wraps it and does the delivery.

use chrono::{DateTime, Utc};
use parlor_protocol::{
    ConnectionId, PlayerInfo, Recipient, RoomId, RoomPhase, RoomSnapshot,
    ServerEvent,
};

use crate::{GameLogic, Outcome, RoomConfig, RoomError};

/// Longest accepted display name, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// Trims a display name and checks it is usable.
///
/// # Errors
/// Returns [`RoomError::Validation`] for blank names or names longer
/// than [`MAX_NAME_CHARS`].
pub fn validate_player_name(raw: &str) -> Result<String, RoomError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RoomError::Validation("player name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(RoomError::Validation(format!(
            "player name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_owned())
}

/// A timer change requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEffect {
    /// The room just became empty.
    ScheduleSweep,
    /// Someone joined; an empty-room sweep must not fire.
    CancelSweep,
    /// The game finished; reset after the grace period.
    ScheduleReset,
}

/// What a room operation produced.
#[derive(Debug)]
pub struct Transition<S> {
    /// Events to deliver, in order.
    pub outbound: Vec<(Recipient, ServerEvent<S>)>,
    /// Timer changes to apply, in order.
    pub effects: Vec<LifecycleEffect>,
}

impl<S> Transition<S> {
    fn new() -> Self {
        Self {
            outbound: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn send(&mut self, to: Recipient, event: ServerEvent<S>) {
        self.outbound.push((to, event));
    }

    /// Returns `true` if nothing is to be sent and no timer changes.
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.effects.is_empty()
    }
}

/// One room: its members in join order, its phase and its game.
#[derive(Debug)]
pub struct Room<G: GameLogic> {
    id: RoomId,
    config: RoomConfig,
    creator: String,
    created_at: DateTime<Utc>,
    phase: RoomPhase,
    players: Vec<PlayerInfo>,
    game: Option<G::State>,
}

impl<G: GameLogic> Room<G> {
    /// Creates an empty, waiting room.
    pub fn new(id: RoomId, creator: impl Into<String>, config: RoomConfig) -> Self {
        Self {
            id,
            config,
            creator: creator.into(),
            created_at: Utc::now(),
            phase: RoomPhase::Waiting,
            players: Vec::new(),
            game: None,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn game(&self) -> Option<&G::State> {
        self.game.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Member ids in join order.
    pub fn player_ids(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn contains(&self, player: ConnectionId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }

    /// The full room as clients see it.
    pub fn snapshot(&self) -> RoomSnapshot<G::State> {
        RoomSnapshot {
            id: self.id.clone(),
            players: self.players.clone(),
            max_players: self.config.max_players,
            state: self.phase,
            game: self.game.clone(),
            creator: self.creator.clone(),
            created_at: self.created_at,
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Adds a player. The first player into an empty room becomes host.
    ///
    /// # Errors
    /// [`RoomError::Validation`] for a bad name, [`RoomError::AlreadyInRoom`]
    /// for a repeat join, [`RoomError::RoomFull`] at capacity. Nothing
    /// changes on error.
    pub fn join(
        &mut self,
        player: ConnectionId,
        name: &str,
    ) -> Result<Transition<G::State>, RoomError> {
        let name = validate_player_name(name)?;
        if self.contains(player) {
            return Err(RoomError::AlreadyInRoom(player, self.id.clone()));
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.id.clone()));
        }

        let info = PlayerInfo {
            id: player,
            name,
            score: 0,
            is_ready: false,
            is_host: self.players.is_empty(),
        };
        self.players.push(info.clone());
        tracing::info!(
            room_id = %self.id,
            %player,
            players = self.players.len(),
            "player joined"
        );

        let mut t = Transition::new();
        t.send(
            Recipient::Player(player),
            ServerEvent::RoomJoined {
                room: self.snapshot(),
                player_id: player,
                is_host: info.is_host,
            },
        );
        t.send(Recipient::AllExcept(player), ServerEvent::PlayerJoined(info));
        t.effects.push(LifecycleEffect::CancelSweep);
        Ok(t)
    }

    /// Marks a member ready, and starts the game once everyone is.
    ///
    /// Ignored (empty transition) unless the room is waiting.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `player` is not a member.
    pub fn ready(
        &mut self,
        player: ConnectionId,
    ) -> Result<Transition<G::State>, RoomError> {
        if self.phase != RoomPhase::Waiting {
            tracing::debug!(
                room_id = %self.id,
                %player,
                phase = %self.phase,
                "ready ignored outside waiting"
            );
            return Ok(Transition::new());
        }
        let member = self
            .players
            .iter_mut()
            .find(|p| p.id == player)
            .ok_or_else(|| RoomError::NotInRoom(player, self.id.clone()))?;
        member.is_ready = true;

        let all_ready = self.players.iter().all(|p| p.is_ready);
        let mut t = Transition::new();
        t.send(
            Recipient::All,
            ServerEvent::PlayerReadyUpdate {
                player_id: player,
                all_ready,
            },
        );

        if all_ready
            && self.players.len() >= self.config.min_players
            && self.enter(RoomPhase::Playing)
        {
            let state = G::init(&self.player_ids());
            self.game = Some(state.clone());
            tracing::info!(
                room_id = %self.id,
                players = self.players.len(),
                "game started"
            );
            t.send(Recipient::All, ServerEvent::GameStarted(state));
        }
        Ok(t)
    }

    /// Applies a game move by `player`.
    ///
    /// # Errors
    /// [`RoomError::InvalidMove`] when no game is in progress or the game
    /// refuses the move. Nothing changes and nothing is broadcast.
    pub fn act(
        &mut self,
        player: ConnectionId,
        action: G::Action,
    ) -> Result<Transition<G::State>, RoomError> {
        if self.phase != RoomPhase::Playing {
            return Err(RoomError::InvalidMove("game is not in progress".into()));
        }
        let ids = self.player_ids();
        let Some(game) = self.game.as_mut() else {
            return Err(RoomError::InvalidMove("game is not in progress".into()));
        };
        G::apply_action(game, &ids, player, action).map_err(RoomError::InvalidMove)?;

        let state = game.clone();
        let outcome = G::outcome(&state);
        let mut t = Transition::new();
        t.send(Recipient::All, ServerEvent::GameUpdate(state));
        if let Some(outcome) = outcome {
            self.finish(outcome, &mut t);
        }
        Ok(t)
    }

    /// Relays a chat line from a member, under the member's name.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] for non-members, [`RoomError::Validation`]
    /// for a blank message.
    pub fn chat(
        &self,
        player: ConnectionId,
        message: &str,
    ) -> Result<Transition<G::State>, RoomError> {
        let member = self
            .players
            .iter()
            .find(|p| p.id == player)
            .ok_or_else(|| RoomError::NotInRoom(player, self.id.clone()))?;
        if message.trim().is_empty() {
            return Err(RoomError::Validation("message must not be empty".into()));
        }

        let mut t = Transition::new();
        t.send(
            Recipient::All,
            ServerEvent::NewMessage {
                player_name: member.name.clone(),
                message: message.to_owned(),
                timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            },
        );
        Ok(t)
    }

    /// Removes a member, re-electing the host and settling a running game.
    ///
    /// # Errors
    /// [`RoomError::NotInRoom`] if `player` is not a member.
    pub fn leave(
        &mut self,
        player: ConnectionId,
    ) -> Result<Transition<G::State>, RoomError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player)
            .ok_or_else(|| RoomError::NotInRoom(player, self.id.clone()))?;
        let before = self.player_ids();
        let gone = self.players.remove(index);
        tracing::info!(
            room_id = %self.id,
            %player,
            players = self.players.len(),
            "player left"
        );

        let mut t = Transition::new();
        t.send(Recipient::All, ServerEvent::PlayerLeft(player));

        if gone.is_host {
            if let Some(heir) = self.players.first_mut() {
                heir.is_host = true;
                tracing::debug!(room_id = %self.id, host = %heir.id, "host changed");
                t.send(Recipient::All, ServerEvent::HostChanged { player_id: heir.id });
            }
        }

        if self.phase == RoomPhase::Playing {
            let remaining = self.players.len();
            if let Some(game) = self.game.as_mut() {
                G::on_player_leave(game, &before, player);
                if remaining < self.config.min_players {
                    G::end_without_winner(game);
                }
                let state = game.clone();
                let outcome = G::outcome(&state);
                t.send(Recipient::All, ServerEvent::GameUpdate(state));
                if let Some(outcome) = outcome {
                    self.finish(outcome, &mut t);
                }
            }
        }

        if self.players.is_empty() {
            t.effects.push(LifecycleEffect::ScheduleSweep);
        }
        Ok(t)
    }

    /// Clears a finished game and returns the room to waiting.
    ///
    /// A no-op outside `finished`.
    pub fn reset(&mut self) -> Transition<G::State> {
        let mut t = Transition::new();
        if !self.enter(RoomPhase::Waiting) {
            return t;
        }
        self.game = None;
        for p in &mut self.players {
            p.is_ready = false;
        }
        tracing::info!(room_id = %self.id, "game reset");
        t.send(Recipient::All, ServerEvent::GameReset);
        t
    }

    fn finish(&mut self, outcome: Outcome, t: &mut Transition<G::State>) {
        if !self.enter(RoomPhase::Finished) {
            return;
        }
        if let Outcome::Win(winner) = outcome {
            if let Some(p) = self.players.iter_mut().find(|p| p.id == winner) {
                p.score += 1;
            }
        }
        tracing::info!(room_id = %self.id, ?outcome, "game finished");
        t.effects.push(LifecycleEffect::ScheduleReset);
    }

    /// Moves to `phase` if it follows the current one in the cycle.
    fn enter(&mut self, phase: RoomPhase) -> bool {
        if !self.phase.can_transition_to(phase) {
            return false;
        }
        self.phase = phase;
        true
    }
}

// =========================================================================
// Tests
// =========================================================================
