//! Agents: pluggable players (bots, humans behind a frontend).
//!
//! A [`PlayerAgent`] decides for one seat; an [`AgentTable`] knows which
//! agent sits where and drives the one the engine is waiting for. Frontends
//! stay thin: they feed [`Action`]s to human agents and let the table do the
//! rest.

use crate::engine::{Action, ActionError, Engine, Sequence};
use crate::place::Place;
use crate::score::Points;
use core::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Kinds of agents attached to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Bot,
}

/// A seat controller that can decide for a player when it is their turn.
pub trait PlayerAgent {
    /// Called when `seat` must decide. Returns whether a decision was applied;
    /// implementations may throttle internally.
    fn on_turn(&mut self, engine: &mut Engine, seat: Place) -> Result<bool, ActionError>;
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }
    /// Optionally queue a decision; default is to ignore it and return false.
    fn receive(&mut self, _action: Action) -> bool {
        false
    }
}

mod bots;

pub use bots::{
    bid_score, choose_bid, choose_king, contract_for_score, fallback_action, legal_cards,
    BotAgent, BotProfile, CardPolicy,
};

/// Applies the decision queued by a frontend when its seat must act.
pub struct HumanAgent {
    pending: Option<Action>,
}

impl HumanAgent {
    pub fn new() -> Self {
        Self { pending: None }
    }
}

impl Default for HumanAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerAgent for HumanAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }

    fn receive(&mut self, action: Action) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(action);
        true
    }

    fn on_turn(&mut self, engine: &mut Engine, seat: Place) -> Result<bool, ActionError> {
        if matches!(engine.sequence(), Sequence::WaitForEndOfDeal | Sequence::Stopped) {
            self.pending = None;
            return Ok(false);
        }
        if engine.acting_player() != Some(seat) {
            return Ok(false);
        }
        match self.pending.take() {
            Some(action) => engine.apply(seat, action).map(|_| true),
            None => Ok(false),
        }
    }
}

/// One optional agent per seat, indexed by [`Place::index`].
pub struct AgentTable {
    seats: Vec<Option<Box<dyn PlayerAgent>>>,
    min_action_delay: Duration,
    next_action_at: Option<Instant>,
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String = self
            .seats
            .iter()
            .map(|a| match a.as_deref().map(|ag| ag.kind()) {
                Some(AgentKind::Bot) => 'B',
                Some(AgentKind::Human) => 'H',
                None => '-',
            })
            .collect();
        write!(f, "AgentTable({flags})")
    }
}

impl AgentTable {
    /// Create a table with `n` seats, all empty.
    pub fn for_seats(n: usize) -> Self {
        let mut seats = Vec::with_capacity(n);
        seats.resize_with(n, || None);
        Self { seats, min_action_delay: Duration::ZERO, next_action_at: None }
    }

    /// A table where every seat is played by a bot; seat `i` gets seed `seed + i`.
    pub fn bots(nb_players: u8, seed: u64) -> Self {
        let mut table = Self::for_seats(nb_players as usize);
        for place in Place::seats(nb_players) {
            let profile = BotProfile::default().with_seed(seed.wrapping_add(place.index() as u64));
            table.set_agent(place, Some(Box::new(BotAgent::new(profile))));
        }
        table
    }

    /// Assign an agent to a seat (or remove when `None`).
    pub fn set_agent(&mut self, seat: Place, agent: Option<Box<dyn PlayerAgent>>) {
        let i = seat.index();
        if i >= self.seats.len() {
            self.seats.resize_with(i + 1, || None);
        }
        self.seats[i] = agent;
    }

    pub fn agent(&self, seat: Place) -> Option<&dyn PlayerAgent> {
        self.seats.get(seat.index()).and_then(|a| a.as_deref())
    }

    pub fn agent_kind(&self, seat: Place) -> Option<AgentKind> {
        self.agent(seat).map(|ag| ag.kind())
    }

    /// Send a decision to a specific seat agent, if any.
    pub fn receive(&mut self, seat: Place, action: Action) -> bool {
        if let Some(Some(agent)) = self.seats.get_mut(seat.index()) {
            return agent.receive(action);
        }
        false
    }

    pub fn has_agent(&self, seat: Place) -> bool {
        self.agent(seat).is_some()
    }

    pub fn any_bots(&self) -> bool {
        self.seats.iter().filter_map(|a| a.as_deref()).any(|ag| ag.kind() == AgentKind::Bot)
    }

    /// Set a global minimum delay between any bot actions at the table.
    pub fn set_min_action_delay_ms(&mut self, delay_ms: u64) {
        self.min_action_delay = Duration::from_millis(delay_ms);
    }

    /// Drive the agent of the seat the engine waits for, if any.
    ///
    /// A decision the rules reject is logged and replaced by the fallback
    /// decision, so the deal always progresses.
    pub fn on_turn(&mut self, engine: &mut Engine) -> Result<bool, ActionError> {
        let Some(seat) = engine.acting_player() else {
            return Ok(false);
        };
        let Some(Some(agent)) = self.seats.get_mut(seat.index()) else {
            return Ok(false);
        };
        let now = Instant::now();
        let is_bot = agent.kind() == AgentKind::Bot;
        if is_bot {
            if let Some(next) = self.next_action_at {
                if now < next {
                    return Ok(false);
                }
            }
        }
        let acted = match agent.on_turn(engine, seat) {
            Ok(acted) => acted,
            Err(
                e @ (ActionError::IllegalCard(_)
                | ActionError::InvalidDiscard(_)
                | ActionError::InvalidHandle(_)
                | ActionError::InvalidKingCall(_)),
            ) => {
                warn!(%seat, error = %e, "agent decision rejected, playing fallback");
                match fallback_action(engine) {
                    Some(action) => engine.apply(seat, action).map(|_| true)?,
                    None => false,
                }
            }
            Err(e) => return Err(e),
        };
        if acted && is_bot && self.min_action_delay > Duration::ZERO {
            self.next_action_at = Some(now + self.min_action_delay);
        }
        Ok(acted)
    }

    /// Play the current deal to its end.
    ///
    /// Show states are acknowledged as they come. Seats without an agent, and
    /// human seats with nothing queued, play the fallback decision. Returns
    /// `None` when every player passed.
    pub fn play_deal(&mut self, engine: &mut Engine) -> Result<Option<Points>, ActionError> {
        loop {
            engine.advance_to_action()?;
            match engine.sequence() {
                Sequence::WaitForEndOfDeal => return Ok(engine.points()),
                Sequence::WaitForAllPassed => return Ok(None),
                Sequence::Stopped => return Ok(None),
                _ => {}
            }
            if self.on_turn(engine)? {
                continue;
            }
            let Some(seat) = engine.acting_player() else {
                continue;
            };
            if self.agent_kind(seat) == Some(AgentKind::Bot) {
                // a throttled bot acts once its delay is over
                std::thread::sleep(Duration::from_millis(1));
                continue;
            }
            if let Some(action) = fallback_action(engine) {
                debug!(%seat, ?action, "no decision queued, playing fallback");
                engine.apply(seat, action)?;
            }
        }
    }

    /// Remove all agents.
    pub fn clear(&mut self) {
        for a in &mut self.seats {
            *a = None;
        }
        self.next_action_at = None;
    }
}
