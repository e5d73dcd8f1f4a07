//! Bonus-gem effect resolution.
//!
//! Each bonus kind maps to a stateless resolver that computes the cells its
//! effect touches and drives removal through the shared [`handle_content`]
//! step. Resolution is synchronous and atomic: a root trigger and every
//! chain-triggered bonus it reaches complete within one `apply` call. The
//! `used` flag on a bonus is checked and set before any recursion, which is
//! what keeps mutually adjacent bombs from re-triggering each other forever.

use gem_hunter_core::{Axis, BonusKind, CellCoord, CellPoint, Event, GemColor};

use crate::{query, Board};

/// Offsets of the four axis-adjacent neighbours, in handling order.
const ADJACENT_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Half-extent of the large bomb's square blast area.
const LARGE_BOMB_REACH: i32 = 2;

/// Root entry point for a player-initiated bonus activation.
///
/// A cell without a live unused bonus is silently ignored, which also makes
/// a second activation of the same bonus a no-op.
pub(crate) fn activate(
    board: &mut Board,
    cell: CellCoord,
    swapped_color: Option<GemColor>,
    out_events: &mut Vec<Event>,
) {
    let Some(kind) = board.begin_bonus(cell) else {
        return;
    };
    out_events.push(Event::BonusTriggered { cell, kind });
    resolve(board, cell, kind, swapped_color, out_events);
}

/// Dispatches a marked-used bonus to its effect resolver.
fn resolve(
    board: &mut Board,
    cell: CellCoord,
    kind: BonusKind,
    swapped_color: Option<GemColor>,
    out_events: &mut Vec<Event>,
) {
    let mut cleared = Vec::new();
    match kind {
        BonusKind::SmallBomb => small_bomb(board, cell, &mut cleared, out_events),
        BonusKind::LargeBomb => large_bomb(board, cell, &mut cleared, out_events),
        BonusKind::LineRocket(axis) => line_rocket(board, cell, axis, &mut cleared, out_events),
        BonusKind::ColorClean => {
            color_clean(board, cell, swapped_color, &mut cleared, out_events);
        }
    }
    out_events.push(Event::BonusResolved {
        cell,
        kind,
        cleared,
    });
}

/// Applies one hit to whatever occupies the cell.
///
/// Obstacles absorb the hit first; an unused bonus gem chain-triggers its own
/// resolver; a multi-hit gem that survives absorbs the hit; a plain gem (or a
/// bonus gem that already triggered) is removed and recorded in the
/// accumulating match.
pub(crate) fn handle_content(
    board: &mut Board,
    cell: CellCoord,
    cleared: &mut Vec<CellCoord>,
    out_events: &mut Vec<Event>,
) {
    if !board.in_bounds(cell) {
        return;
    }

    if board.has_obstacle(cell) {
        board.damage_obstacle(cell, out_events);
        return;
    }

    let Some(gem) = board.gem(cell) else {
        return;
    };

    if gem.has_unused_bonus() {
        if let Some(kind) = board.begin_bonus(cell) {
            out_events.push(Event::BonusTriggered { cell, kind });
            resolve(board, cell, kind, None, out_events);
        }
        return;
    }

    if gem.extra_hits > 0 {
        board.absorb_gem_hit(cell, out_events);
        return;
    }

    if let Some(color) = board.remove_gem(cell) {
        out_events.push(Event::GemCleared { cell, color });
        cleared.push(cell);
    }
}

fn small_bomb(
    board: &mut Board,
    cell: CellCoord,
    cleared: &mut Vec<CellCoord>,
    out_events: &mut Vec<Event>,
) {
    handle_content(board, cell, cleared, out_events);
    for (dx, dy) in ADJACENT_OFFSETS {
        handle_content(board, cell.offset(dx, dy), cleared, out_events);
    }
}

fn large_bomb(
    board: &mut Board,
    cell: CellCoord,
    cleared: &mut Vec<CellCoord>,
    out_events: &mut Vec<Event>,
) {
    for dx in -LARGE_BOMB_REACH..=LARGE_BOMB_REACH {
        for dy in -LARGE_BOMB_REACH..=LARGE_BOMB_REACH {
            handle_content(board, cell.offset(dx, dy), cleared, out_events);
        }
    }
}

fn line_rocket(
    board: &mut Board,
    cell: CellCoord,
    axis: Axis,
    cleared: &mut Vec<CellCoord>,
    out_events: &mut Vec<Event>,
) {
    if let Some(color) = board.remove_gem(cell) {
        out_events.push(Event::GemDestroyed { cell, color });
        cleared.push(cell);
    }

    for direction in axis.directions() {
        if board.in_bounds(cell.step(direction)) {
            board.start_sweep(cell, direction, out_events);
        }
    }
}

fn color_clean(
    board: &mut Board,
    cell: CellCoord,
    swapped_color: Option<GemColor>,
    cleared: &mut Vec<CellCoord>,
    out_events: &mut Vec<Event>,
) {
    handle_content(board, cell, cleared, out_events);

    let Some(color) = swapped_color.or_else(|| most_common_color(board)) else {
        return;
    };

    let (columns, rows) = query::dimensions(board);
    for y in 0..rows as i32 {
        for x in 0..columns as i32 {
            let target = CellCoord::new(x, y);
            let matches = board
                .gem(target)
                .map_or(false, |gem| gem.color == color);
            if matches {
                handle_content(board, target, cleared, out_events);
            }
        }
    }

    let centers: Vec<CellPoint> = cleared
        .iter()
        .filter_map(|cleared_cell| query::cell_center(board, *cleared_cell))
        .collect();
    out_events.push(Event::ColorCleanTargeted { color, centers });
}

/// Most common gem color on the board; ties break toward the lowest color id
/// because the census is produced in ascending color order.
fn most_common_color(board: &Board) -> Option<GemColor> {
    let mut best: Option<(GemColor, u32)> = None;
    for (color, count) in query::gem_census(board) {
        let better = best.map_or(true, |(_, best_count)| count > best_count);
        if better {
            best = Some((color, count));
        }
    }
    best.map(|(color, _)| color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{apply, query, Board};
    use gem_hunter_core::Command;
    use std::collections::HashSet;

    fn spawn_gem(board: &mut Board, x: i32, y: i32, color: u8) {
        let mut events = Vec::new();
        apply(
            board,
            Command::SpawnGem {
                cell: CellCoord::new(x, y),
                color: GemColor::new(color),
            },
            &mut events,
        );
        assert_eq!(events.len(), 1, "gem spawn at ({x}, {y}) was rejected");
    }

    fn spawn_bonus(board: &mut Board, x: i32, y: i32, color: u8, kind: BonusKind) {
        let mut events = Vec::new();
        apply(
            board,
            Command::SpawnBonusGem {
                cell: CellCoord::new(x, y),
                color: GemColor::new(color),
                kind,
            },
            &mut events,
        );
    }

    fn activate_at(board: &mut Board, x: i32, y: i32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            board,
            Command::ActivateBonus {
                cell: CellCoord::new(x, y),
                swapped_color: None,
            },
            &mut events,
        );
        events
    }

    fn cleared_cells(events: &[Event]) -> HashSet<CellCoord> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::GemCleared { cell, .. } | Event::GemDestroyed { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn small_bomb_clears_trigger_and_axis_neighbours() {
        let mut board = Board::new(5, 5);
        for (x, y) in [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
            if (x, y) != (2, 2) {
                spawn_gem(&mut board, x, y, 1);
            }
        }
        spawn_bonus(&mut board, 2, 2, 1, BonusKind::SmallBomb);
        // Diagonal gems must survive.
        spawn_gem(&mut board, 1, 1, 2);
        spawn_gem(&mut board, 3, 3, 2);

        let events = activate_at(&mut board, 2, 2);

        let expected: HashSet<CellCoord> = [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)]
            .into_iter()
            .map(|(x, y)| CellCoord::new(x, y))
            .collect();
        assert_eq!(cleared_cells(&events), expected);
        assert_eq!(query::gem_count(&board), 2);
    }

    #[test]
    fn large_bomb_at_corner_skips_absent_cells() {
        let mut board = Board::new(6, 6);
        for x in 0..4 {
            for y in 0..4 {
                if (x, y) != (0, 0) {
                    spawn_gem(&mut board, x, y, 1);
                }
            }
        }
        spawn_bonus(&mut board, 0, 0, 1, BonusKind::LargeBomb);

        let events = activate_at(&mut board, 0, 0);

        // The 5x5 blast centred on the corner covers only the 3x3 in-bounds
        // quadrant; cells outside the playable area are silently skipped.
        let expected: HashSet<CellCoord> = (0..3)
            .flat_map(|x| (0..3).map(move |y| CellCoord::new(x, y)))
            .collect();
        assert_eq!(cleared_cells(&events), expected);
    }

    #[test]
    fn second_activation_is_a_no_op() {
        let mut board = Board::new(3, 3);
        spawn_gem(&mut board, 0, 1, 1);
        spawn_bonus(&mut board, 1, 1, 1, BonusKind::SmallBomb);

        let first = activate_at(&mut board, 1, 1);
        let second = activate_at(&mut board, 1, 1);

        assert!(!cleared_cells(&first).is_empty());
        assert!(second.is_empty());
    }

    #[test]
    fn adjacent_bombs_chain_without_recursing_forever() {
        let mut board = Board::new(5, 5);
        spawn_bonus(&mut board, 2, 2, 1, BonusKind::SmallBomb);
        spawn_bonus(&mut board, 3, 2, 1, BonusKind::SmallBomb);
        spawn_gem(&mut board, 4, 2, 2);

        let events = activate_at(&mut board, 2, 2);

        let triggered = events
            .iter()
            .filter(|event| matches!(event, Event::BonusTriggered { .. }))
            .count();
        assert_eq!(triggered, 2);
        assert!(cleared_cells(&events).contains(&CellCoord::new(4, 2)));
        assert_eq!(query::gem_count(&board), 0);
    }

    #[test]
    fn bomb_damages_obstacle_instead_of_clearing_it() {
        let mut board = Board::new(3, 3);
        spawn_bonus(&mut board, 1, 1, 1, BonusKind::SmallBomb);
        let mut events = Vec::new();
        apply(
            &mut board,
            Command::SpawnObstacle {
                cell: CellCoord::new(2, 1),
                hit_points: 2,
            },
            &mut events,
        );

        let events = activate_at(&mut board, 1, 1);

        assert!(events.contains(&Event::ObstacleDamaged {
            cell: CellCoord::new(2, 1),
            remaining: 1,
        }));
        let snapshot = query::cell(&board, CellCoord::new(2, 1)).expect("in bounds");
        assert_eq!(snapshot.obstacle.expect("obstacle survives").hit_points, 1);
    }

    #[test]
    fn bomb_hit_destroys_single_point_obstacle() {
        let mut board = Board::new(3, 3);
        spawn_bonus(&mut board, 1, 1, 1, BonusKind::SmallBomb);
        let mut events = Vec::new();
        apply(
            &mut board,
            Command::SpawnObstacle {
                cell: CellCoord::new(0, 1),
                hit_points: 1,
            },
            &mut events,
        );

        let events = activate_at(&mut board, 1, 1);

        assert!(events.contains(&Event::ObstacleDestroyed {
            cell: CellCoord::new(0, 1),
        }));
    }

    #[test]
    fn armored_gem_absorbs_one_hit() {
        let mut board = Board::new(3, 3);
        spawn_bonus(&mut board, 1, 1, 1, BonusKind::SmallBomb);
        let mut events = Vec::new();
        apply(
            &mut board,
            Command::SpawnArmoredGem {
                cell: CellCoord::new(1, 2),
                color: GemColor::new(2),
                extra_hits: 1,
            },
            &mut events,
        );

        let events = activate_at(&mut board, 1, 1);

        assert!(events.contains(&Event::GemDamaged {
            cell: CellCoord::new(1, 2),
            remaining: 0,
        }));
        assert!(!cleared_cells(&events).contains(&CellCoord::new(1, 2)));
        assert_eq!(query::gem_count(&board), 1);
    }

    #[test]
    fn line_rocket_registers_one_sweep_per_viable_direction() {
        let mut board = Board::new(4, 1);
        spawn_gem(&mut board, 1, 0, 1);
        spawn_gem(&mut board, 2, 0, 1);
        spawn_bonus(&mut board, 0, 0, 1, BonusKind::LineRocket(Axis::Horizontal));

        let events = activate_at(&mut board, 0, 0);

        // The west edge has no adjacent cell, so only the eastbound sweep
        // starts.
        assert_eq!(query::active_sweep_count(&board), 1);
        assert!(events.contains(&Event::GemDestroyed {
            cell: CellCoord::new(0, 0),
            color: GemColor::new(1),
        }));
    }

    #[test]
    fn line_rocket_on_single_cell_board_starts_no_sweeps() {
        let mut board = Board::new(1, 1);
        spawn_bonus(&mut board, 0, 0, 1, BonusKind::LineRocket(Axis::Vertical));

        let _ = activate_at(&mut board, 0, 0);

        assert_eq!(query::active_sweep_count(&board), 0);
        assert!(!query::is_input_locked(&board));
    }

    #[test]
    fn color_clean_prefers_swapped_color() {
        let mut board = Board::new(4, 4);
        spawn_gem(&mut board, 0, 0, 1);
        spawn_gem(&mut board, 1, 0, 1);
        spawn_gem(&mut board, 2, 0, 2);
        spawn_bonus(&mut board, 3, 3, 3, BonusKind::ColorClean);

        let mut events = Vec::new();
        apply(
            &mut board,
            Command::ActivateBonus {
                cell: CellCoord::new(3, 3),
                swapped_color: Some(GemColor::new(2)),
            },
            &mut events,
        );

        let expected: HashSet<CellCoord> = [CellCoord::new(3, 3), CellCoord::new(2, 0)]
            .into_iter()
            .collect();
        assert_eq!(cleared_cells(&events), expected);
        assert_eq!(query::gem_count(&board), 2);
    }

    #[test]
    fn color_clean_targets_most_common_color_when_standalone() {
        let mut board = Board::new(4, 4);
        spawn_gem(&mut board, 0, 0, 1);
        spawn_gem(&mut board, 1, 0, 2);
        spawn_gem(&mut board, 2, 0, 2);
        spawn_gem(&mut board, 3, 0, 2);
        spawn_bonus(&mut board, 0, 3, 5, BonusKind::ColorClean);

        let events = activate_at(&mut board, 0, 3);

        let expected: HashSet<CellCoord> = [
            CellCoord::new(0, 3),
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(cleared_cells(&events), expected);
    }

    #[test]
    fn color_clean_tie_breaks_toward_lowest_color_id() {
        let mut board = Board::new(4, 4);
        spawn_gem(&mut board, 0, 0, 7);
        spawn_gem(&mut board, 1, 0, 7);
        spawn_gem(&mut board, 2, 0, 4);
        spawn_gem(&mut board, 3, 0, 4);
        spawn_bonus(&mut board, 0, 3, 9, BonusKind::ColorClean);

        let events = activate_at(&mut board, 0, 3);

        let expected: HashSet<CellCoord> = [
            CellCoord::new(0, 3),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(cleared_cells(&events), expected);
    }

    #[test]
    fn color_clean_reports_world_space_centers() {
        let mut board = Board::new(4, 4);
        spawn_gem(&mut board, 2, 1, 1);
        spawn_bonus(&mut board, 0, 0, 5, BonusKind::ColorClean);

        let events = activate_at(&mut board, 0, 0);

        let centers = events
            .iter()
            .find_map(|event| match event {
                Event::ColorCleanTargeted { centers, .. } => Some(centers.clone()),
                _ => None,
            })
            .expect("color clean reports centers");
        assert_eq!(centers.len(), cleared_cells(&events).len());
    }

    #[test]
    fn color_clean_chain_triggers_bonus_of_target_color() {
        let mut board = Board::new(4, 4);
        spawn_gem(&mut board, 0, 0, 1);
        spawn_gem(&mut board, 1, 0, 1);
        spawn_bonus(&mut board, 2, 0, 1, BonusKind::SmallBomb);
        spawn_gem(&mut board, 2, 1, 2);
        spawn_bonus(&mut board, 3, 3, 4, BonusKind::ColorClean);

        let events = activate_at(&mut board, 3, 3);

        // The chained small bomb clears its neighbour even though that gem's
        // color was not the clean target.
        assert!(cleared_cells(&events).contains(&CellCoord::new(2, 1)));
        let triggered = events
            .iter()
            .filter(|event| matches!(event, Event::BonusTriggered { .. }))
            .count();
        assert_eq!(triggered, 2);
    }
}
