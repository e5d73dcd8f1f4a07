#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for the Gem Hunter match engine.
//!
//! The board owns the sparse cell contents (gems, bonus gems, obstacles),
//! the in-flight sweep tasks and the input-lock counter. All mutation flows
//! through [`apply`], which executes a [`Command`] and broadcasts [`Event`]
//! values; read access flows through the [`query`] module. Bonus resolution
//! is atomic within a single `apply` call, while sweep tasks persist across
//! ticks until they leave the playable area.

use std::collections::HashMap;

use gem_hunter_core::{BonusKind, CellCoord, Command, Direction, Event, GemColor};

mod resolver;
mod sweep;

use sweep::SweepTask;

/// Side length of a single square cell expressed in world units.
const CELL_LENGTH: f32 = 1.0;

/// Represents the authoritative match-3 board state.
#[derive(Debug)]
pub struct Board {
    columns: u32,
    rows: u32,
    cells: HashMap<CellCoord, Cell>,
    sweeps: Vec<SweepTask>,
    input_lock: InputLock,
}

impl Board {
    /// Creates an empty board with the provided playable dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cells: HashMap::new(),
            sweeps: Vec::new(),
            input_lock: InputLock::default(),
        }
    }

    pub(crate) fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && (cell.x() as u32) < self.columns
            && (cell.y() as u32) < self.rows
    }

    pub(crate) fn gem(&self, cell: CellCoord) -> Option<&Gem> {
        self.cells.get(&cell).and_then(|content| content.gem.as_ref())
    }

    pub(crate) fn has_obstacle(&self, cell: CellCoord) -> bool {
        self.cells
            .get(&cell)
            .map_or(false, |content| content.obstacle.is_some())
    }

    /// Marks the bonus at the cell as used and returns its kind, or `None`
    /// if the cell holds no live unused bonus. Checking and setting the flag
    /// in one step is the re-entry guard that keeps mutually adjacent bombs
    /// from triggering each other forever.
    pub(crate) fn begin_bonus(&mut self, cell: CellCoord) -> Option<BonusKind> {
        let content = self.cells.get_mut(&cell)?;
        let gem = content.gem.as_mut()?;
        let bonus = gem.bonus.as_mut()?;
        if bonus.used {
            return None;
        }
        bonus.used = true;
        Some(bonus.kind)
    }

    pub(crate) fn remove_gem(&mut self, cell: CellCoord) -> Option<GemColor> {
        let content = self.cells.get_mut(&cell)?;
        let gem = content.gem.take()?;
        self.drop_if_empty(cell);
        Some(gem.color)
    }

    pub(crate) fn absorb_gem_hit(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Some(gem) = self
            .cells
            .get_mut(&cell)
            .and_then(|content| content.gem.as_mut())
        {
            gem.extra_hits = gem.extra_hits.saturating_sub(1);
            out_events.push(Event::GemDamaged {
                cell,
                remaining: gem.extra_hits,
            });
        }
    }

    pub(crate) fn damage_obstacle(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(content) = self.cells.get_mut(&cell) else {
            return;
        };
        let Some(obstacle) = content.obstacle.as_mut() else {
            return;
        };

        obstacle.hit_points = obstacle.hit_points.saturating_sub(1);
        if obstacle.hit_points == 0 {
            content.obstacle = None;
            out_events.push(Event::ObstacleDestroyed { cell });
            self.drop_if_empty(cell);
        } else {
            out_events.push(Event::ObstacleDamaged {
                cell,
                remaining: obstacle.hit_points,
            });
        }
    }

    pub(crate) fn start_sweep(
        &mut self,
        cell: CellCoord,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        self.sweeps.push(SweepTask::new(cell, direction));
        self.input_lock.lock();
        out_events.push(Event::SweepStarted { cell, direction });
    }

    fn drop_if_empty(&mut self, cell: CellCoord) {
        if let Some(content) = self.cells.get(&cell) {
            if content.gem.is_none() && content.obstacle.is_none() {
                let _ = self.cells.remove(&cell);
            }
        }
    }

    fn place_gem(&mut self, cell: CellCoord, gem: Gem) {
        self.cells.entry(cell).or_default().gem = Some(gem);
    }

    fn advance_sweeps(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        // Chain-triggered rockets may register new sweeps while the active
        // ones are being ticked; those start advancing on the next tick.
        let mut active = std::mem::take(&mut self.sweeps);
        active.retain_mut(|task| {
            let alive = task.tick(self, dt, out_events);
            if !alive {
                self.input_lock.unlock();
            }
            alive
        });
        let spawned = std::mem::take(&mut self.sweeps);
        active.extend(spawned);
        self.sweeps = active;
    }

    fn clear_sweeps(&mut self, out_events: &mut Vec<Event>) {
        for task in self.sweeps.drain(..) {
            self.input_lock.unlock();
            out_events.push(Event::SweepFinished {
                cell: task.cell(),
                direction: task.direction(),
            });
        }
    }
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { columns, rows } => {
            board.columns = columns;
            board.rows = rows;
            board.cells.clear();
            board.sweeps.clear();
            board.input_lock = InputLock::default();
            out_events.push(Event::BoardConfigured { columns, rows });
        }
        Command::SpawnGem { cell, color } => {
            if board.in_bounds(cell) && board.gem(cell).is_none() {
                board.place_gem(cell, Gem::plain(color));
                out_events.push(Event::GemSpawned { cell, color });
            }
        }
        Command::SpawnArmoredGem {
            cell,
            color,
            extra_hits,
        } => {
            if board.in_bounds(cell) && board.gem(cell).is_none() {
                board.place_gem(cell, Gem::armored(color, extra_hits));
                out_events.push(Event::GemSpawned { cell, color });
            }
        }
        Command::SpawnObstacle { cell, hit_points } => {
            if board.in_bounds(cell) && !board.has_obstacle(cell) && hit_points > 0 {
                board.cells.entry(cell).or_default().obstacle = Some(Obstacle { hit_points });
                out_events.push(Event::ObstacleSpawned { cell, hit_points });
            }
        }
        Command::SpawnBonusGem { cell, color, kind } => {
            if board.in_bounds(cell) {
                board.place_gem(cell, Gem::bonus(color, kind));
                out_events.push(Event::BonusGemSpawned { cell, kind });
            }
        }
        Command::CompleteMatch { cells } => {
            let mut match_color = None;
            for cell in &cells {
                if let Some(color) = board.remove_gem(*cell) {
                    if match_color.is_none() {
                        match_color = Some(color);
                    }
                    out_events.push(Event::GemCleared { cell: *cell, color });
                }
            }
            if let Some(color) = match_color {
                out_events.push(Event::MatchCompleted { cells, color });
            }
        }
        Command::ActivateBonus {
            cell,
            swapped_color,
        } => {
            resolver::activate(board, cell, swapped_color, out_events);
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            board.advance_sweeps(dt, out_events);
        }
        Command::ClearSweeps => {
            board.clear_sweeps(out_events);
        }
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use gem_hunter_core::{BonusKind, CellCoord, CellPoint, GemColor};
    use std::collections::BTreeMap;

    use super::{Board, CELL_LENGTH};

    /// Playable dimensions of the board as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(board: &Board) -> (u32, u32) {
        (board.columns, board.rows)
    }

    /// Captures a read-only snapshot of the cell at the provided coordinate.
    ///
    /// Returns `None` for coordinates outside the playable area; an in-bounds
    /// cell with no content yields a snapshot with empty slots.
    #[must_use]
    pub fn cell(board: &Board, coord: CellCoord) -> Option<CellSnapshot> {
        if !board.in_bounds(coord) {
            return None;
        }
        let content = board.cells.get(&coord);
        Some(CellSnapshot {
            cell: coord,
            gem: content.and_then(|content| {
                content.gem.as_ref().map(|gem| GemSnapshot {
                    color: gem.color,
                    bonus: gem.bonus.as_ref().map(|bonus| bonus.kind),
                    bonus_used: gem.bonus.as_ref().map_or(false, |bonus| bonus.used),
                    extra_hits: gem.extra_hits,
                })
            }),
            obstacle: content.and_then(|content| {
                content.obstacle.as_ref().map(|obstacle| ObstacleSnapshot {
                    hit_points: obstacle.hit_points,
                })
            }),
        })
    }

    /// World-space center of the provided cell, or `None` when out of bounds.
    #[must_use]
    pub fn cell_center(board: &Board, coord: CellCoord) -> Option<CellPoint> {
        if !board.in_bounds(coord) {
            return None;
        }
        Some(CellPoint::new(
            (coord.x() as f32 + 0.5) * CELL_LENGTH,
            (coord.y() as f32 + 0.5) * CELL_LENGTH,
        ))
    }

    /// Reports whether player input should currently be suspended.
    ///
    /// True exactly while at least one sweep task is in flight.
    #[must_use]
    pub fn is_input_locked(board: &Board) -> bool {
        board.input_lock.is_locked()
    }

    /// Number of sweep tasks currently travelling across the board.
    #[must_use]
    pub fn active_sweep_count(board: &Board) -> usize {
        board.sweeps.len()
    }

    /// Tallies the gems on the board per color, in ascending color order.
    #[must_use]
    pub fn gem_census(board: &Board) -> Vec<(GemColor, u32)> {
        let mut counts: BTreeMap<GemColor, u32> = BTreeMap::new();
        for content in board.cells.values() {
            if let Some(gem) = &content.gem {
                *counts.entry(gem.color).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    /// Total number of gems currently on the board.
    #[must_use]
    pub fn gem_count(board: &Board) -> usize {
        board
            .cells
            .values()
            .filter(|content| content.gem.is_some())
            .count()
    }

    /// Read-only snapshot of a single cell's contents.
    #[derive(Clone, Debug, PartialEq)]
    pub struct CellSnapshot {
        /// Coordinate the snapshot describes.
        pub cell: CellCoord,
        /// Gem occupying the cell, if any.
        pub gem: Option<GemSnapshot>,
        /// Obstacle occupying the cell, if any.
        pub obstacle: Option<ObstacleSnapshot>,
    }

    /// Read-only snapshot of a gem.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GemSnapshot {
        /// Color assigned to the gem.
        pub color: GemColor,
        /// Bonus effect the gem carries, if it is a bonus gem.
        pub bonus: Option<BonusKind>,
        /// Whether a carried bonus has already triggered.
        pub bonus_used: bool,
        /// Hits the gem can still absorb before a further hit clears it.
        pub extra_hits: u32,
    }

    /// Read-only snapshot of an obstacle.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ObstacleSnapshot {
        /// Hits the obstacle absorbs before it is destroyed.
        pub hit_points: u32,
    }
}

#[derive(Clone, Debug, Default)]
struct Cell {
    gem: Option<Gem>,
    obstacle: Option<Obstacle>,
}

#[derive(Clone, Debug)]
pub(crate) struct Gem {
    pub(crate) color: GemColor,
    pub(crate) bonus: Option<BonusState>,
    pub(crate) extra_hits: u32,
}

impl Gem {
    fn plain(color: GemColor) -> Self {
        Self {
            color,
            bonus: None,
            extra_hits: 0,
        }
    }

    fn armored(color: GemColor, extra_hits: u32) -> Self {
        Self {
            color,
            bonus: None,
            extra_hits,
        }
    }

    fn bonus(color: GemColor, kind: BonusKind) -> Self {
        Self {
            color,
            bonus: Some(BonusState { kind, used: false }),
            extra_hits: 0,
        }
    }

    pub(crate) fn has_unused_bonus(&self) -> bool {
        self.bonus.as_ref().map_or(false, |bonus| !bonus.used)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BonusState {
    pub(crate) kind: BonusKind,
    pub(crate) used: bool,
}

#[derive(Clone, Copy, Debug)]
struct Obstacle {
    hit_points: u32,
}

/// Reference-counted gate the host consults to suspend player input while
/// sweep animations are in flight. Never goes negative; reads zero exactly
/// when no sweep tasks remain active.
#[derive(Debug, Default)]
struct InputLock {
    count: u32,
}

impl InputLock {
    fn lock(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    fn unlock(&mut self) {
        debug_assert!(self.count > 0, "input lock underflow");
        self.count = self.count.saturating_sub(1);
    }

    fn is_locked(&self) -> bool {
        self.count > 0
    }
}
