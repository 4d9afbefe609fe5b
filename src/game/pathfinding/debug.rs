//! Search tracing for debug visualisation.
//!
//! Searches report what they do to a [`SearchObserver`]. A presentation layer
//! (highlighting visited cells, drawing the final path) consumes the recorded
//! [`SearchEvent`]s and schedules them itself; the core never owns a timer.

use super::types::CellId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchEventKind {
    /// Selected as the cheapest unvisited node and closed.
    Visited,
    /// Considered as a neighbor of the node being closed.
    Relaxed,
    /// Part of the reconstructed path.
    OnPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchEvent {
    pub kind: SearchEventKind,
    pub cell: CellId,
    /// Search iteration for `Visited`/`Relaxed`; for `OnPath`, the iteration count
    /// plus the position along the path counted back from the target.
    pub order: u32,
}

pub trait SearchObserver {
    fn visited(&mut self, _cell: CellId, _iteration: u32) {}
    fn relaxed(&mut self, _cell: CellId, _iteration: u32) {}
    fn on_path(&mut self, _cell: CellId, _order: u32) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTrace;

impl SearchObserver for NoTrace {}

/// Observer that records every event in order.
#[derive(Clone, Debug, Default)]
pub struct SearchTrace {
    pub events: Vec<SearchEvent>,
}

impl SearchTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay after which a presentation layer should show `event`, given the
    /// per-iteration animation delay.
    pub fn delay_for(event: &SearchEvent, step_delay: f32) -> f32 {
        event.order as f32 * step_delay
    }

    pub fn of_kind(&self, kind: SearchEventKind) -> impl Iterator<Item = &SearchEvent> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, kind: SearchEventKind, cell: CellId, order: u32) {
        self.events.push(SearchEvent { kind, cell, order });
    }
}

impl SearchObserver for SearchTrace {
    fn visited(&mut self, cell: CellId, iteration: u32) {
        self.push(SearchEventKind::Visited, cell, iteration);
    }

    fn relaxed(&mut self, cell: CellId, iteration: u32) {
        self.push(SearchEventKind::Relaxed, cell, iteration);
    }

    fn on_path(&mut self, cell: CellId, order: u32) {
        self.push(SearchEventKind::OnPath, cell, order);
    }
}
