//! Directional sweep tasks launched by line-rocket bonuses.
//!
//! A sweep advances one cell per [`SWEEP_STEP`] of accumulated simulated
//! time, clearing board content as it goes, and finishes on the tick that
//! would carry it past the playable edge. Several sweeps may be in flight at
//! once; a cell emptied by one sweep reads as empty to the next.

use std::time::Duration;

use gem_hunter_core::{CellCoord, Direction, Event};

use crate::{resolver, Board};

/// Simulated time a sweep needs to accumulate before advancing one cell.
pub(crate) const SWEEP_STEP: Duration = Duration::from_millis(100);

/// Per-tick action object that travels along a fixed direction.
#[derive(Debug)]
pub(crate) struct SweepTask {
    cell: CellCoord,
    direction: Direction,
    accumulator: Duration,
}

impl SweepTask {
    pub(crate) fn new(cell: CellCoord, direction: Direction) -> Self {
        Self {
            cell,
            direction,
            accumulator: Duration::ZERO,
        }
    }

    pub(crate) fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    /// Advances the sweep by the elapsed time, processing every whole cell
    /// the accumulated movement covers. Returns `false` once the sweep steps
    /// past the board edge and should be removed from the schedule.
    pub(crate) fn tick(
        &mut self,
        board: &mut Board,
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) -> bool {
        self.accumulator = self.accumulator.saturating_add(dt);

        while self.accumulator >= SWEEP_STEP {
            self.accumulator -= SWEEP_STEP;

            let next = self.cell.step(self.direction);
            if !board.in_bounds(next) {
                out_events.push(Event::SweepFinished {
                    cell: self.cell,
                    direction: self.direction,
                });
                return false;
            }

            self.cell = next;
            destroy_content(board, next, out_events);
        }

        true
    }
}

/// Sweep-path variant of the shared content handling: obstacles absorb a
/// hit, unused bonuses chain-trigger, surviving multi-hit gems absorb, and a
/// plain gem is destroyed outright rather than added to a match.
fn destroy_content(board: &mut Board, cell: CellCoord, out_events: &mut Vec<Event>) {
    if board.has_obstacle(cell) {
        board.damage_obstacle(cell, out_events);
        return;
    }

    let Some(gem) = board.gem(cell) else {
        return;
    };

    if gem.has_unused_bonus() {
        let mut chained = Vec::new();
        resolver::handle_content(board, cell, &mut chained, out_events);
        return;
    }

    if gem.extra_hits > 0 {
        board.absorb_gem_hit(cell, out_events);
        return;
    }

    if let Some(color) = board.remove_gem(cell) {
        out_events.push(Event::GemDestroyed { cell, color });
    }
}
