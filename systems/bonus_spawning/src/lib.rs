#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns completed matches into bonus-gem spawn commands.
//!
//! The system holds an ordered catalog of shape templates. When the board
//! broadcasts a completed match, each catalog entry is tested against the
//! matched cell set in priority order; the first template that fits decides
//! which bonus gem to spawn and where. The system never mutates the board
//! directly: it responds exclusively with [`Command`] batches.

use std::collections::HashSet;

use gem_hunter_core::{shape::ShapeTemplate, Axis, BonusKind, CellCoord, Command, Event};
use serde::{Deserialize, Serialize};

/// One prioritised entry of the bonus-shape catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Shape a match must form to earn the bonus.
    pub template: ShapeTemplate,
    /// Bonus gem spawned when the shape fits.
    pub kind: BonusKind,
}

/// System that reacts to match events and emits bonus spawn commands.
#[derive(Clone, Debug, Default)]
pub struct BonusSpawning {
    catalog: Vec<CatalogEntry>,
}

impl BonusSpawning {
    /// Creates a system around the provided catalog. Entries are tested in
    /// the order given; earlier entries take priority.
    #[must_use]
    pub fn new(catalog: Vec<CatalogEntry>) -> Self {
        Self { catalog }
    }

    /// Creates a system with the standard Gem Hunter catalog: a five-in-line
    /// earns a color clean, an L of five a large bomb, an axis-locked four-
    /// in-line a rocket along the matched axis, and a 2x2 square a small
    /// bomb.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            CatalogEntry {
                template: ShapeTemplate::new(line(5), true, false),
                kind: BonusKind::ColorClean,
            },
            CatalogEntry {
                template: ShapeTemplate::new(
                    vec![
                        CellCoord::new(0, 0),
                        CellCoord::new(0, 1),
                        CellCoord::new(0, 2),
                        CellCoord::new(1, 0),
                        CellCoord::new(2, 0),
                    ],
                    true,
                    true,
                ),
                kind: BonusKind::LargeBomb,
            },
            CatalogEntry {
                template: ShapeTemplate::new(line(4), false, false),
                kind: BonusKind::LineRocket(Axis::Horizontal),
            },
            CatalogEntry {
                template: ShapeTemplate::new(
                    (0..4).map(|i| CellCoord::new(0, i)).collect(),
                    false,
                    false,
                ),
                kind: BonusKind::LineRocket(Axis::Vertical),
            },
            CatalogEntry {
                template: ShapeTemplate::new(
                    vec![
                        CellCoord::new(0, 0),
                        CellCoord::new(1, 0),
                        CellCoord::new(0, 1),
                        CellCoord::new(1, 1),
                    ],
                    false,
                    false,
                ),
                kind: BonusKind::SmallBomb,
            },
        ])
    }

    /// Catalog entries in priority order.
    #[must_use]
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Consumes board events and emits spawn commands for earned bonuses.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::MatchCompleted { cells, color } = event else {
                continue;
            };

            let candidate: HashSet<CellCoord> = cells.iter().copied().collect();
            let mut matched = Vec::new();
            for entry in &self.catalog {
                if entry.template.fit_in(&candidate, &mut matched) {
                    let Some(origin) = matched.first().copied() else {
                        break;
                    };
                    out.push(Command::SpawnBonusGem {
                        cell: origin,
                        color: *color,
                        kind: entry.kind,
                    });
                    break;
                }
            }
        }
    }
}

fn line(length: i32) -> Vec<CellCoord> {
    (0..length).map(|x| CellCoord::new(x, 0)).collect()
}
