#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gem Hunter match engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the board executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The crate also hosts the [`shape::ShapeTemplate`] geometry that decides
//! whether a completed match earns a bonus gem.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod shape;

/// Location of a single board cell expressed as signed lattice coordinates.
///
/// Coordinates are signed because shape templates store cell offsets relative
/// to an arbitrary anchor; board cells themselves always sit at non-negative
/// positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate translated by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the coordinate one cell away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

/// Inclusive axis-aligned bounds over a set of cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellBounds {
    min: CellCoord,
    max: CellCoord,
}

impl CellBounds {
    /// Constructs bounds from explicit inclusive corners.
    #[must_use]
    pub const fn new(min: CellCoord, max: CellCoord) -> Self {
        Self { min, max }
    }

    /// Minimum corner of the bounds.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Maximum corner of the bounds.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Horizontal extent measured as the max/min delta; a single cell is 0.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.max.x() - self.min.x()
    }

    /// Vertical extent measured as the max/min delta; a single cell is 0.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max.y() - self.min.y()
    }

    /// Reports whether the provided coordinate lies within the bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() >= self.min.x()
            && cell.x() <= self.max.x()
            && cell.y() >= self.min.y()
            && cell.y() <= self.max.y()
    }
}

/// Computes the minimal inclusive bounds containing every provided coordinate.
///
/// Returns `None` for an empty input rather than a degenerate zero rect, so
/// callers decide explicitly how an empty set behaves.
#[must_use]
pub fn bounds_of<I>(cells: I) -> Option<CellBounds>
where
    I: IntoIterator<Item = CellCoord>,
{
    let mut iter = cells.into_iter();
    let first = iter.next()?;
    let mut min = first;
    let mut max = first;
    for cell in iter {
        min = CellCoord::new(min.x().min(cell.x()), min.y().min(cell.y()));
        max = CellCoord::new(max.x().max(cell.x()), max.y().max(cell.y()));
    }
    Some(CellBounds::new(min, max))
}

/// Cardinal directions a sweep task can travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing y.
    North,
    /// Movement toward increasing x.
    East,
    /// Movement toward decreasing y.
    South,
    /// Movement toward decreasing x.
    West,
}

impl Direction {
    /// Unit cell delta for the direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }
}

/// Axis a line rocket travels along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// East/west travel across a row.
    Horizontal,
    /// North/south travel along a column.
    Vertical,
}

impl Axis {
    /// The two opposite directions that make up the axis.
    #[must_use]
    pub const fn directions(self) -> [Direction; 2] {
        match self {
            Self::Horizontal => [Direction::East, Direction::West],
            Self::Vertical => [Direction::North, Direction::South],
        }
    }
}

/// Identifier of a gem color.
///
/// The ordering of color identifiers is part of the engine contract: when a
/// color-clean bonus must pick the most common color and two colors tie, the
/// lowest identifier wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GemColor(u8);

impl GemColor {
    /// Creates a new color identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Discriminates the effect a bonus gem carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Clears the trigger cell and its four axis-adjacent neighbours.
    SmallBomb,
    /// Clears a 5x5 square centred on the trigger cell.
    LargeBomb,
    /// Launches sweep tasks in both directions along the axis.
    LineRocket(Axis),
    /// Clears every gem of a chosen color across the board.
    ColorClean,
}

/// World-space point used to position presentation feedback.
///
/// Opaque to the engine's correctness contract; carried on events so an
/// adapter can drive visual effects without querying the board again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPoint {
    x: f32,
    y: f32,
}

impl CellPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the board's playable grid using the provided dimensions.
    ConfigureBoard {
        /// Number of cell columns in the playable area.
        columns: u32,
        /// Number of cell rows in the playable area.
        rows: u32,
    },
    /// Places a plain gem into an existing empty cell.
    SpawnGem {
        /// Cell that should receive the gem.
        cell: CellCoord,
        /// Color assigned to the gem.
        color: GemColor,
    },
    /// Places a multi-hit gem that absorbs hits before it can be cleared.
    SpawnArmoredGem {
        /// Cell that should receive the gem.
        cell: CellCoord,
        /// Color assigned to the gem.
        color: GemColor,
        /// Number of hits the gem absorbs before a further hit clears it.
        extra_hits: u32,
    },
    /// Places an obstacle into an existing cell.
    SpawnObstacle {
        /// Cell that should receive the obstacle.
        cell: CellCoord,
        /// Number of hits the obstacle absorbs before it is destroyed.
        hit_points: u32,
    },
    /// Places a bonus gem into an existing cell, replacing any gem there.
    SpawnBonusGem {
        /// Cell that should receive the bonus gem.
        cell: CellCoord,
        /// Color assigned to the bonus gem.
        color: GemColor,
        /// Effect the bonus gem carries.
        kind: BonusKind,
    },
    /// Reports a completed line/shape match detected by the host simulation.
    CompleteMatch {
        /// Cells that participated in the match.
        cells: Vec<CellCoord>,
    },
    /// Activates the bonus gem at the provided cell as a root trigger.
    ActivateBonus {
        /// Cell containing the bonus gem.
        cell: CellCoord,
        /// Color of the gem the bonus was swapped with, when activated by a
        /// swap; `None` for standalone activation.
        swapped_color: Option<GemColor>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Cancels every in-flight sweep task, releasing their input locks.
    ClearSweeps,
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the playable grid was configured.
    BoardConfigured {
        /// Number of cell columns in the playable area.
        columns: u32,
        /// Number of cell rows in the playable area.
        rows: u32,
    },
    /// Confirms that a plain gem was placed.
    GemSpawned {
        /// Cell that received the gem.
        cell: CellCoord,
        /// Color assigned to the gem.
        color: GemColor,
    },
    /// Confirms that an obstacle was placed.
    ObstacleSpawned {
        /// Cell that received the obstacle.
        cell: CellCoord,
        /// Hits the obstacle absorbs before destruction.
        hit_points: u32,
    },
    /// Confirms that a bonus gem was placed.
    BonusGemSpawned {
        /// Cell that received the bonus gem.
        cell: CellCoord,
        /// Effect the bonus gem carries.
        kind: BonusKind,
    },
    /// Announces a completed match after its gems were cleared.
    MatchCompleted {
        /// Cells that participated in the match.
        cells: Vec<CellCoord>,
        /// Color of the matched gems.
        color: GemColor,
    },
    /// Reports a gem removed as part of a match or bonus resolution.
    GemCleared {
        /// Cell the gem occupied.
        cell: CellCoord,
        /// Color of the removed gem.
        color: GemColor,
    },
    /// Reports a gem destroyed outright by a sweep task or rocket launch.
    GemDestroyed {
        /// Cell the gem occupied.
        cell: CellCoord,
        /// Color of the destroyed gem.
        color: GemColor,
    },
    /// Reports that a multi-hit gem absorbed one hit without being cleared.
    GemDamaged {
        /// Cell the gem occupies.
        cell: CellCoord,
        /// Hits the gem can still absorb.
        remaining: u32,
    },
    /// Reports that an obstacle absorbed one point of damage.
    ObstacleDamaged {
        /// Cell the obstacle occupies.
        cell: CellCoord,
        /// Hit points remaining after the damage.
        remaining: u32,
    },
    /// Reports that an obstacle was destroyed.
    ObstacleDestroyed {
        /// Cell the obstacle occupied.
        cell: CellCoord,
    },
    /// Announces that a bonus gem began resolving its effect.
    BonusTriggered {
        /// Cell containing the bonus gem.
        cell: CellCoord,
        /// Effect the bonus gem carries.
        kind: BonusKind,
    },
    /// Summarises a finished bonus resolution.
    BonusResolved {
        /// Cell that triggered the resolution.
        cell: CellCoord,
        /// Effect that resolved.
        kind: BonusKind,
        /// Cells whose gems were cleared by the resolution, in the order
        /// they were handled.
        cleared: Vec<CellCoord>,
    },
    /// Reports the color a color-clean bonus selected and the world-space
    /// centers of the cells it cleared, for presentation feedback.
    ColorCleanTargeted {
        /// Color the bonus selected.
        color: GemColor,
        /// World-space centers of the cleared cells.
        centers: Vec<CellPoint>,
    },
    /// Announces that a sweep task began travelling.
    SweepStarted {
        /// Cell the sweep departs from.
        cell: CellCoord,
        /// Direction the sweep travels in.
        direction: Direction,
    },
    /// Announces that a sweep task reached the board edge and stopped.
    SweepFinished {
        /// Last cell the sweep processed.
        cell: CellCoord,
        /// Direction the sweep was travelling in.
        direction: Direction,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::{bounds_of, Axis, BonusKind, CellBounds, CellCoord, Direction, GemColor};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(-3, 7));
    }

    #[test]
    fn gem_color_round_trips_through_bincode() {
        assert_round_trip(&GemColor::new(5));
    }

    #[test]
    fn bonus_kind_round_trips_through_bincode() {
        assert_round_trip(&BonusKind::LineRocket(Axis::Vertical));
    }

    #[test]
    fn step_moves_one_cell_in_each_direction() {
        let origin = CellCoord::new(2, 2);
        assert_eq!(origin.step(Direction::North), CellCoord::new(2, 3));
        assert_eq!(origin.step(Direction::East), CellCoord::new(3, 2));
        assert_eq!(origin.step(Direction::South), CellCoord::new(2, 1));
        assert_eq!(origin.step(Direction::West), CellCoord::new(1, 2));
    }

    #[test]
    fn axis_directions_are_opposites() {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let [forward, backward] = axis.directions();
            let (fx, fy) = forward.delta();
            let (bx, by) = backward.delta();
            assert_eq!((fx + bx, fy + by), (0, 0));
        }
    }

    #[test]
    fn bounds_of_empty_input_is_none() {
        assert_eq!(bounds_of(Vec::new()), None);
    }

    #[test]
    fn bounds_of_spans_all_points() {
        let cells = vec![
            CellCoord::new(2, 5),
            CellCoord::new(-1, 3),
            CellCoord::new(4, 4),
        ];
        let bounds = bounds_of(cells).expect("non-empty bounds");
        assert_eq!(
            bounds,
            CellBounds::new(CellCoord::new(-1, 3), CellCoord::new(4, 5))
        );
        assert_eq!(bounds.width(), 5);
        assert_eq!(bounds.height(), 2);
    }

    #[test]
    fn bounds_of_single_cell_has_zero_extent() {
        let bounds = bounds_of([CellCoord::new(3, 3)]).expect("non-empty bounds");
        assert_eq!(bounds.width(), 0);
        assert_eq!(bounds.height(), 0);
        assert!(bounds.contains(CellCoord::new(3, 3)));
        assert!(!bounds.contains(CellCoord::new(3, 4)));
    }
}
