use std::collections::HashMap;

use moldfarm_core::{Event, ScheduledEvent, Tile, TileChange, TileCoord};

/// Player stat levels captured at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatSnapshot {
    /// Health level.
    pub health: f64,
    /// Food level.
    pub food: f64,
}

/// Summary of everything observable that happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Final tile of every coordinate whose tile differs from the start of
    /// the tick, in order of first change.
    pub tile_changes: Vec<TileChange>,
    /// Events that fired during the tick, in firing order.
    pub fired: Vec<ScheduledEvent>,
    /// Player stats after the tick.
    pub stats: StatSnapshot,
    /// Whether the session has ended.
    pub terminal: bool,
}

impl TickReport {
    /// Report for a tick that did nothing.
    pub(crate) fn idle(stats: StatSnapshot, terminal: bool) -> Self {
        Self {
            tile_changes: Vec::new(),
            fired: Vec::new(),
            stats,
            terminal,
        }
    }
}

/// Collects tile changes and fired events from the world's event stream.
#[derive(Debug, Default)]
pub(crate) struct ReportBuilder {
    order: Vec<(TileCoord, Tile, Tile)>,
    index: HashMap<TileCoord, usize>,
    fired: Vec<ScheduledEvent>,
}

impl ReportBuilder {
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match *event {
                Event::TileChanged { coord, from, to } => match self.index.get(&coord) {
                    Some(&slot) => self.order[slot].2 = to,
                    None => {
                        let _ = self.index.insert(coord, self.order.len());
                        self.order.push((coord, from, to));
                    }
                },
                Event::EventFired { event } => self.fired.push(event),
                _ => {}
            }
        }
    }

    pub(crate) fn finish(self, stats: StatSnapshot, terminal: bool) -> TickReport {
        let tile_changes = self
            .order
            .into_iter()
            .filter(|(_, original, current)| original != current)
            .map(|(coord, _, tile)| TileChange { coord, tile })
            .collect();
        TickReport {
            tile_changes,
            fired: self.fired,
            stats,
            terminal,
        }
    }
}
