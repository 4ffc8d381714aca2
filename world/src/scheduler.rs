//! Delayed, tile-keyed event queues.
//!
//! Two variants share the [`Scheduler`] contract. [`TimelineScheduler`] keeps
//! every event on a continuous timeline and fires them in due order, breaking
//! ties by insertion order. [`TurnScheduler`] quantises time into turns and
//! holds at most one pending event per tile: scheduling onto an occupied tile
//! replaces the earlier event.

use std::{collections::BTreeMap, time::Duration};

use moldfarm_config::{SchedulerMode, SchedulerTuning};
use moldfarm_core::{EventKind, ScheduledEvent, TileCoord};

/// Operations shared by both scheduler variants.
pub trait Scheduler {
    /// Session time recorded by the most recent advance.
    fn now(&self) -> Duration;

    /// Queues an event due `delay` after the current time and returns it as
    /// stored.
    fn schedule(&mut self, kind: EventKind, coord: TileCoord, delay: Duration) -> ScheduledEvent;

    /// Drops every pending event keyed by `coord`, returning how many were
    /// dropped.
    fn cancel(&mut self, coord: TileCoord) -> usize;

    /// Reports whether any event is pending for `coord`.
    fn has_pending(&self, coord: TileCoord) -> bool;

    /// Kind of the earliest pending event for `coord`.
    fn peek_kind(&self, coord: TileCoord) -> Option<EventKind>;

    /// Number of pending events.
    fn len(&self) -> usize;

    /// Reports whether nothing is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records `now` as the current time and moves every event due at or
    /// before it into `out`.
    fn advance(&mut self, now: Duration, out: &mut Vec<ScheduledEvent>);

    /// Snapshot of every pending event ordered by due time, then coordinate.
    fn pending(&self) -> Vec<ScheduledEvent>;
}

/// Continuous-time scheduler backed by a vector sorted by due time.
#[derive(Clone, Debug, Default)]
pub struct TimelineScheduler {
    now: Duration,
    events: Vec<ScheduledEvent>,
}

impl TimelineScheduler {
    /// Creates an empty scheduler positioned at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for TimelineScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, kind: EventKind, coord: TileCoord, delay: Duration) -> ScheduledEvent {
        let event = ScheduledEvent {
            coord,
            kind,
            due: self.now.saturating_add(delay),
        };
        // Insert after every event with an equal due time to keep ties in
        // arrival order.
        let position = self.events.partition_point(|queued| queued.due <= event.due);
        self.events.insert(position, event);
        event
    }

    fn cancel(&mut self, coord: TileCoord) -> usize {
        let before = self.events.len();
        self.events.retain(|event| event.coord != coord);
        before - self.events.len()
    }

    fn has_pending(&self, coord: TileCoord) -> bool {
        self.events.iter().any(|event| event.coord == coord)
    }

    fn peek_kind(&self, coord: TileCoord) -> Option<EventKind> {
        self.events
            .iter()
            .find(|event| event.coord == coord)
            .map(|event| event.kind)
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    fn advance(&mut self, now: Duration, out: &mut Vec<ScheduledEvent>) {
        self.now = now;
        let due = self.events.partition_point(|event| event.due <= now);
        out.extend(self.events.drain(..due));
    }

    fn pending(&self) -> Vec<ScheduledEvent> {
        let mut pending = self.events.clone();
        pending.sort_by_key(|event| (event.due, event.coord));
        pending
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingTurn {
    kind: EventKind,
    due_turn: u64,
}

/// Discrete-turn scheduler holding at most one event per tile.
#[derive(Clone, Debug)]
pub struct TurnScheduler {
    turn_length: Duration,
    turn: u64,
    pending: BTreeMap<TileCoord, PendingTurn>,
}

impl TurnScheduler {
    /// Creates an empty scheduler positioned at turn zero.
    ///
    /// A zero turn length is promoted to one nanosecond so that conversions
    /// never divide by zero.
    #[must_use]
    pub fn new(turn_length: Duration) -> Self {
        Self {
            turn_length: turn_length.max(Duration::from_nanos(1)),
            turn: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Turn recorded by the most recent advance.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Queues an event `turns` turns after the current one, replacing any
    /// event already pending for the tile.
    ///
    /// Returns the replaced event, if any.
    pub fn schedule_in_turns(
        &mut self,
        kind: EventKind,
        coord: TileCoord,
        turns: u64,
    ) -> Option<ScheduledEvent> {
        let due_turn = self.turn.saturating_add(turns);
        self.pending
            .insert(coord, PendingTurn { kind, due_turn })
            .map(|replaced| self.materialise(coord, replaced))
    }

    /// Moves every event due at or before `turn` into `out`, in ascending
    /// coordinate order.
    pub fn advance_turn(&mut self, turn: u64, out: &mut Vec<ScheduledEvent>) {
        self.turn = turn;
        let due: Vec<TileCoord> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due_turn <= turn)
            .map(|(coord, _)| *coord)
            .collect();
        for coord in due {
            if let Some(pending) = self.pending.remove(&coord) {
                out.push(self.materialise(coord, pending));
            }
        }
    }

    /// Converts a delay into whole turns, rounding up.
    #[must_use]
    pub fn turns_for(&self, delay: Duration) -> u64 {
        let length = self.turn_length.as_nanos().max(1);
        let turns = delay.as_nanos().saturating_add(length - 1) / length;
        u64::try_from(turns).unwrap_or(u64::MAX)
    }

    /// Session time at which `turn` begins.
    #[must_use]
    pub fn turn_start(&self, turn: u64) -> Duration {
        let nanos = self.turn_length.as_nanos().saturating_mul(u128::from(turn));
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn turn_at(&self, now: Duration) -> u64 {
        let turns = now.as_nanos() / self.turn_length.as_nanos().max(1);
        u64::try_from(turns).unwrap_or(u64::MAX)
    }

    fn materialise(&self, coord: TileCoord, pending: PendingTurn) -> ScheduledEvent {
        ScheduledEvent {
            coord,
            kind: pending.kind,
            due: self.turn_start(pending.due_turn),
        }
    }
}

impl Scheduler for TurnScheduler {
    fn now(&self) -> Duration {
        self.turn_start(self.turn)
    }

    fn schedule(&mut self, kind: EventKind, coord: TileCoord, delay: Duration) -> ScheduledEvent {
        let turns = self.turns_for(delay);
        let _ = self.schedule_in_turns(kind, coord, turns);
        ScheduledEvent {
            coord,
            kind,
            due: self.turn_start(self.turn.saturating_add(turns)),
        }
    }

    fn cancel(&mut self, coord: TileCoord) -> usize {
        usize::from(self.pending.remove(&coord).is_some())
    }

    fn has_pending(&self, coord: TileCoord) -> bool {
        self.pending.contains_key(&coord)
    }

    fn peek_kind(&self, coord: TileCoord) -> Option<EventKind> {
        self.pending.get(&coord).map(|pending| pending.kind)
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn advance(&mut self, now: Duration, out: &mut Vec<ScheduledEvent>) {
        let turn = self.turn_at(now);
        self.advance_turn(turn, out);
    }

    fn pending(&self) -> Vec<ScheduledEvent> {
        let mut pending: Vec<ScheduledEvent> = self
            .pending
            .iter()
            .map(|(coord, pending)| self.materialise(*coord, *pending))
            .collect();
        pending.sort_by_key(|event| (event.due, event.coord));
        pending
    }
}

/// Scheduler variant selected by configuration.
#[derive(Clone, Debug)]
pub enum EventScheduler {
    /// Continuous-time variant.
    Timeline(TimelineScheduler),
    /// Discrete-turn variant.
    Turn(TurnScheduler),
}

impl EventScheduler {
    /// Builds the variant named by the tuning.
    #[must_use]
    pub fn from_tuning(tuning: &SchedulerTuning) -> Self {
        match tuning.mode {
            SchedulerMode::Timeline => Self::Timeline(TimelineScheduler::new()),
            SchedulerMode::Turn => Self::Turn(TurnScheduler::new(tuning.turn_length())),
        }
    }

    fn inner(&self) -> &dyn Scheduler {
        match self {
            Self::Timeline(scheduler) => scheduler,
            Self::Turn(scheduler) => scheduler,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Scheduler {
        match self {
            Self::Timeline(scheduler) => scheduler,
            Self::Turn(scheduler) => scheduler,
        }
    }
}

impl Scheduler for EventScheduler {
    fn now(&self) -> Duration {
        self.inner().now()
    }

    fn schedule(&mut self, kind: EventKind, coord: TileCoord, delay: Duration) -> ScheduledEvent {
        self.inner_mut().schedule(kind, coord, delay)
    }

    fn cancel(&mut self, coord: TileCoord) -> usize {
        self.inner_mut().cancel(coord)
    }

    fn has_pending(&self, coord: TileCoord) -> bool {
        self.inner().has_pending(coord)
    }

    fn peek_kind(&self, coord: TileCoord) -> Option<EventKind> {
        self.inner().peek_kind(coord)
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn advance(&mut self, now: Duration, out: &mut Vec<ScheduledEvent>) {
        self.inner_mut().advance(now, out);
    }

    fn pending(&self) -> Vec<ScheduledEvent> {
        self.inner().pending()
    }
}
