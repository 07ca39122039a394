//! Per-connection session: framing, opcode dispatch, and player state.
//!
//! A session is created when a connection is accepted and dropped when it
//! closes. In between it turns raw byte chunks into frames, decodes each
//! frame into a [`ClientMessage`], and runs the matching handler against
//! its bound [`Player`] and the shared [`World`].
//!
//! ```text
//!   Unauthenticated ──(Login)──→ Active ──(disconnect)──→ dropped
//!                                  │  ↑
//!                                  └──┘ (Login again rebinds)
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tessera_protocol::{ClientMessage, FrameReader, ServerMessage};
use tessera_transport::ConnectionId;
use tessera_world::{
    near_miss, spell_by_words, Player, PlayerId, SpellDefinition, SpellEffect,
    VocationId, World,
};

use crate::{HubHandle, Outbox, SessionError};

/// Name shown for chat from a session that has not logged in.
const ANONYMOUS_NAME: &str = "Unknown";

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Vocation given to players on login. The login message carries only
    /// a name.
    pub default_vocation: VocationId,

    /// Capacity of each session's outbound queue. Broadcasts to a session
    /// whose queue is full are dropped for that session only.
    pub outbound_queue: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_vocation: VocationId::KNIGHT,
            outbound_queue: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Whether a session has a bound player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no player yet. Only Login and Say do anything.
    Unauthenticated,
    /// A player is bound.
    Active,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Server-side state for one live connection.
///
/// Dependencies are injected: the session talks to the [`World`] and the
/// [`HubHandle`] it was given and to nothing else.
///
/// [`close`](Self::close) unregisters it from the hub and removes its
/// player from the world. A session dropped without being closed does the
/// same from a spawned task, so cleanup happens exactly once however the
/// connection ends.
pub struct Session {
    id: ConnectionId,
    world: Arc<World>,
    hub: HubHandle,
    outbox: Outbox,
    config: SessionConfig,
    reader: FrameReader,
    player: Option<Player>,
    closed: bool,
}

impl Session {
    /// Registers a new session with the hub and returns it.
    ///
    /// `outbox` is this session's own outbound queue; replies go there and
    /// the hub delivers broadcasts there too.
    pub async fn connect(
        id: ConnectionId,
        world: Arc<World>,
        hub: HubHandle,
        outbox: Outbox,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        hub.register(id, outbox.clone()).await?;
        tracing::debug!(%id, "session opened");
        Ok(Self {
            id,
            world,
            hub,
            outbox,
            config,
            reader: FrameReader::new(),
            player: None,
            closed: false,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        match self.player {
            Some(_) => SessionState::Active,
            None => SessionState::Unauthenticated,
        }
    }

    /// The bound player, if logged in.
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Removes the player from the world and unregisters from the hub,
    /// waiting for both.
    ///
    /// Once this returns the hub no longer holds this session's outbox, so
    /// the outbound queue closes as soon as the session itself is gone and
    /// a writer can drain what is left. Dropping without calling `close`
    /// runs the same cleanup in a background task instead.
    pub async fn close(mut self) {
        self.closed = true;
        if let Some(player) = &self.player {
            self.world.remove_player(player.id()).await;
        }
        if let Err(e) = self.hub.unregister(self.id).await {
            tracing::debug!(conn_id = %self.id, error = %e, "unregister failed");
        }
        tracing::debug!(conn_id = %self.id, "session closed");
    }

    fn player_id(&self) -> PlayerId {
        PlayerId(self.id.into_inner())
    }

    /// Feeds newly received bytes and handles every complete frame in
    /// arrival order.
    ///
    /// A frame that fails to decode or handle is logged and skipped; the
    /// frames after it are still processed.
    ///
    /// # Errors
    /// Only errors for which [`SessionError::is_fatal`] holds are returned.
    pub async fn handle_chunk(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        self.reader.extend(chunk);
        while let Some(frame) = self.reader.next_frame() {
            match self.handle_frame(&frame).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        conn_id = %self.id,
                        error = %e,
                        "dropping bad frame"
                    );
                }
            }
        }
        Ok(())
    }

    /// Decodes and handles one frame body.
    pub async fn handle_frame(&mut self, frame: &[u8]) -> Result<(), SessionError> {
        let msg = ClientMessage::decode(frame)?;
        tracing::trace!(conn_id = %self.id, opcode = %msg.opcode(), "frame");
        match msg {
            ClientMessage::Login { name } => self.on_login(name).await,
            ClientMessage::Move { dx, dy } => {
                self.on_move(dx, dy);
                Ok(())
            }
            ClientMessage::Say { text } => self.on_say(&text).await,
            ClientMessage::Damage { amount } => self.on_damage(amount).await,
        }
    }

    // -- Handlers -----------------------------------------------------------

    async fn on_login(&mut self, name: String) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return self.reply(ServerMessage::system("Name must not be empty.")).await;
        }

        let player = Player::new(
            self.player_id(),
            name,
            self.config.default_vocation,
            self.world.spawn_point(),
        )?;
        self.world.add_player(player.id(), player.name()).await;
        tracing::info!(
            conn_id = %self.id,
            player_id = %player.id(),
            name = player.name(),
            vocation = %player.vocation(),
            position = %player.position(),
            "player logged in"
        );
        self.player = Some(player);
        self.send_stats().await
    }

    fn on_move(&mut self, dx: i16, dy: i16) {
        let Some(player) = self.player.as_mut() else {
            tracing::debug!(conn_id = %self.id, "move before login, ignoring");
            return;
        };
        if !player.try_move(dx, dy, &self.world) {
            tracing::debug!(
                player_id = %player.id(),
                from = %player.position(),
                dx,
                dy,
                "move rejected"
            );
        }
    }

    async fn on_say(&mut self, text: &str) -> Result<(), SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some(spell) = spell_by_words(text) {
            if spell.effect == SpellEffect::Heal {
                return self.cast_heal(spell).await;
            }
        } else if let Some(spell) = near_miss(text) {
            let hint = format!("Did you mean '{}'?", spell.words);
            return self.reply(ServerMessage::system(hint)).await;
        }

        let name = self
            .player
            .as_ref()
            .map_or(ANONYMOUS_NAME, |p| p.name());
        let line = format!("{name}: {text}");
        self.broadcast(ServerMessage::Chat { text: line }).await
    }

    async fn cast_heal(
        &mut self,
        spell: &'static SpellDefinition,
    ) -> Result<(), SessionError> {
        let Some(player) = self.player.as_mut() else {
            return self
                .reply(ServerMessage::system("You are not logged in."))
                .await;
        };

        if !player.spend_mana(spell.mana_cost) {
            return self.reply(ServerMessage::system("Not enough mana.")).await;
        }
        let healed = player.heal(spell.power);
        let chant = format!("{}: {}", player.name(), spell.words);
        tracing::debug!(
            player_id = %player.id(),
            spell = spell.name,
            healed,
            "spell cast"
        );

        let notice = if healed > 0 {
            format!("You healed {healed} hitpoints.")
        } else {
            "You are already at full health.".to_string()
        };
        self.reply(ServerMessage::system(notice)).await?;
        self.send_stats().await?;
        self.broadcast(ServerMessage::Chat { text: chant }).await
    }

    async fn on_damage(&mut self, amount: u16) -> Result<(), SessionError> {
        // Client-reported and applied as-is; combat authority lives
        // client-side in this protocol version.
        let Some(player) = self.player.as_mut() else {
            tracing::debug!(conn_id = %self.id, "damage before login, ignoring");
            return Ok(());
        };
        player.apply_damage(amount);
        let dead = player.is_dead();

        self.send_stats().await?;
        if dead {
            self.reply(ServerMessage::system("You are dead.")).await?;
        }
        Ok(())
    }

    // -- Output -------------------------------------------------------------

    async fn send_stats(&self) -> Result<(), SessionError> {
        let Some(player) = &self.player else {
            return Ok(());
        };
        self.reply(ServerMessage::UpdateStats {
            hp: player.hp(),
            max_hp: player.max_hp(),
            mana: player.mana(),
            max_mana: player.max_mana(),
        })
        .await
    }

    /// Queues a message for this session's socket only.
    async fn reply(&self, msg: ServerMessage) -> Result<(), SessionError> {
        let frame = Bytes::from(msg.to_frame()?);
        self.outbox
            .send(frame)
            .await
            .map_err(|_| SessionError::OutboxClosed)
    }

    /// Queues a message for every registered session, this one included.
    async fn broadcast(&self, msg: ServerMessage) -> Result<(), SessionError> {
        let frame = Bytes::from(msg.to_frame()?);
        let delivered = self.hub.broadcast(frame).await?;
        tracing::trace!(conn_id = %self.id, delivered, "broadcast");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Drop is synchronous; the hub and roster need async locks.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let id = self.id;
        let player_id = self.player.as_ref().map(Player::id);
        let hub = self.hub.clone();
        let world = Arc::clone(&self.world);
        runtime.spawn(async move {
            if let Some(player_id) = player_id {
                world.remove_player(player_id).await;
            }
            if let Err(e) = hub.unregister(id).await {
                tracing::debug!(%id, error = %e, "unregister failed");
            }
            tracing::debug!(%id, "session closed");
        });
    }
}
