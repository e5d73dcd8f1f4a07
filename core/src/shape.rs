//! Geometric shape templates used to recognise bonus-worthy matches.
//!
//! A [`ShapeTemplate`] is a list of relative cell offsets plus rotation and
//! mirror permissions. Construction normalises the offsets and precomputes
//! the four rotations and two mirror reflections once; [`ShapeTemplate::fit_in`]
//! then slides a square window across a candidate cell set and reports the
//! first position where one of the permitted variants overlays the candidate
//! completely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{bounds_of, CellBounds, CellCoord};

const VARIANT_COUNT: usize = 6;

const IDENTITY: usize = 0;
const ROTATED_90: usize = 1;
const ROTATED_180: usize = 2;
const ROTATED_270: usize = 3;
const MIRRORED_H: usize = 4;
const MIRRORED_V: usize = 5;

const ROTATION_ORDER: [usize; 3] = [ROTATED_90, ROTATED_180, ROTATED_270];
const MIRROR_ORDER: [usize; 2] = [MIRRORED_H, MIRRORED_V];

/// Immutable geometric pattern describing a bonus-worthy match shape.
///
/// Templates are configuration data: they are deserialised once at load time
/// and never mutated afterwards. Every derived value (bounds, rotation and
/// mirror variants) is computed by the constructor, so two templates built
/// from the same offsets always answer [`fit_in`](Self::fit_in) identically.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "ShapeTemplateSpec", into = "ShapeTemplateSpec")]
pub struct ShapeTemplate {
    cells: Vec<CellCoord>,
    can_rotate: bool,
    can_mirror: bool,
    bounds: CellBounds,
    variants: [HashSet<CellCoord>; VARIANT_COUNT],
}

impl ShapeTemplate {
    /// Creates a normalised template from relative cell offsets.
    ///
    /// An empty offset list is normalised to the single origin cell, and
    /// duplicate offsets are dropped, so the resulting template always covers
    /// at least one cell and its cell count equals its footprint.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>, can_rotate: bool, can_mirror: bool) -> Self {
        let mut cells = cells;
        if cells.is_empty() {
            cells.push(CellCoord::new(0, 0));
        }
        let mut seen: HashSet<CellCoord> = HashSet::with_capacity(cells.len());
        cells.retain(|cell| seen.insert(*cell));

        let bounds = bounds_of(cells.iter().copied()).expect("normalised cells are non-empty");
        let identity: HashSet<CellCoord> = cells.iter().copied().collect();
        let [rotated_90, rotated_180, rotated_270] = rotation_variants(&cells, bounds);
        let [mirrored_h, mirrored_v] = mirror_variants(&cells, bounds);

        Self {
            cells,
            can_rotate,
            can_mirror,
            bounds,
            variants: [
                identity,
                rotated_90,
                rotated_180,
                rotated_270,
                mirrored_h,
                mirrored_v,
            ],
        }
    }

    /// Relative cell offsets the template covers, in normalised order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Reports whether rotated variants participate in fitting.
    #[must_use]
    pub const fn can_rotate(&self) -> bool {
        self.can_rotate
    }

    /// Reports whether mirrored variants participate in fitting.
    #[must_use]
    pub const fn can_mirror(&self) -> bool {
        self.can_mirror
    }

    /// Inclusive bounds of the template's cell offsets.
    #[must_use]
    pub const fn bounds(&self) -> CellBounds {
        self.bounds
    }

    /// Tests whether the template can be overlaid onto a subset of the
    /// candidate cells, under the permitted rotations and mirrors.
    ///
    /// On success the matched candidate coordinates are appended to `out`
    /// (the buffer is additive; pass a fresh vector unless accumulation is
    /// intended) and the function returns `true` without examining further
    /// window positions. On failure `out` is left untouched.
    ///
    /// The search is deterministic: window positions are scanned with x as
    /// the outer axis and y inner, both ascending, and at each position the
    /// identity variant wins over rotations, which win over mirrors.
    pub fn fit_in(&self, candidate: &HashSet<CellCoord>, out: &mut Vec<CellCoord>) -> bool {
        let Some(target) = bounds_of(candidate.iter().copied()) else {
            return false;
        };

        // Square the window to the larger extent so rotated variants, which
        // swap width and height, fit the same scan as mirrored ones.
        let largest = target.width().max(target.height());
        let smallest = target.width().min(target.height());
        let needed = self.cells.len();
        let anchor = self.bounds.min();

        let mut matched: [Vec<CellCoord>; VARIANT_COUNT] = Default::default();

        for x in target.min().x()..=(target.max().x() - smallest + 1) {
            for y in target.min().y()..=(target.max().y() - smallest + 1) {
                for slot in &mut matched {
                    slot.clear();
                }

                for ix in 0..=largest {
                    for iy in 0..=largest {
                        let candidate_cell = CellCoord::new(x + ix, y + iy);
                        if !candidate.contains(&candidate_cell) {
                            continue;
                        }
                        let template_cell = CellCoord::new(anchor.x() + ix, anchor.y() + iy);
                        for (slot, variant) in matched.iter_mut().zip(&self.variants) {
                            if variant.contains(&template_cell) {
                                slot.push(candidate_cell);
                            }
                        }
                    }
                }

                if let Some(winner) = self.select_variant(&matched, needed) {
                    out.extend_from_slice(winner);
                    return true;
                }
            }
        }

        false
    }

    fn select_variant<'m>(
        &self,
        matched: &'m [Vec<CellCoord>; VARIANT_COUNT],
        needed: usize,
    ) -> Option<&'m Vec<CellCoord>> {
        if matched[IDENTITY].len() == needed {
            return Some(&matched[IDENTITY]);
        }
        if self.can_rotate {
            for index in ROTATION_ORDER {
                if matched[index].len() == needed {
                    return Some(&matched[index]);
                }
            }
        }
        if self.can_mirror {
            for index in MIRROR_ORDER {
                if matched[index].len() == needed {
                    return Some(&matched[index]);
                }
            }
        }
        None
    }
}

impl PartialEq for ShapeTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
            && self.can_rotate == other.can_rotate
            && self.can_mirror == other.can_mirror
    }
}

impl Eq for ShapeTemplate {}

/// Raw serialised form of a [`ShapeTemplate`].
///
/// Deserialisation routes through this struct so loaded templates pass the
/// same normalisation as constructed ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ShapeTemplateSpec {
    cells: Vec<CellCoord>,
    #[serde(default)]
    can_rotate: bool,
    #[serde(default)]
    can_mirror: bool,
}

impl From<ShapeTemplateSpec> for ShapeTemplate {
    fn from(spec: ShapeTemplateSpec) -> Self {
        Self::new(spec.cells, spec.can_rotate, spec.can_mirror)
    }
}

impl From<ShapeTemplate> for ShapeTemplateSpec {
    fn from(template: ShapeTemplate) -> Self {
        Self {
            cells: template.cells,
            can_rotate: template.can_rotate,
            can_mirror: template.can_mirror,
        }
    }
}

/// Computes the 90, 180 and 270 degree rotations of the cells about the
/// bounds minimum corner, each translated back so its own bounds minimum
/// coincides with the original anchor. Re-anchoring keeps all orientations
/// comparable inside the squared fit window.
fn rotation_variants(
    cells: &[CellCoord],
    bounds: CellBounds,
) -> [HashSet<CellCoord>; 3] {
    let anchor = bounds.min();
    let width = bounds.width();
    let height = bounds.height();

    let mut rotated_90 = HashSet::with_capacity(cells.len());
    let mut rotated_180 = HashSet::with_capacity(cells.len());
    let mut rotated_270 = HashSet::with_capacity(cells.len());

    for cell in cells {
        let rx = cell.x() - anchor.x();
        let ry = cell.y() - anchor.y();
        let _ = rotated_90.insert(anchor.offset(ry, width - rx));
        let _ = rotated_180.insert(anchor.offset(width - rx, height - ry));
        let _ = rotated_270.insert(anchor.offset(height - ry, rx));
    }

    [rotated_90, rotated_180, rotated_270]
}

/// Computes the horizontal and vertical reflections of the cells across the
/// bounds, which leave the bounds themselves unchanged.
fn mirror_variants(cells: &[CellCoord], bounds: CellBounds) -> [HashSet<CellCoord>; 2] {
    let min = bounds.min();
    let max = bounds.max();

    let mut mirrored_h = HashSet::with_capacity(cells.len());
    let mut mirrored_v = HashSet::with_capacity(cells.len());

    for cell in cells {
        let _ = mirrored_h.insert(CellCoord::new(max.x() - (cell.x() - min.x()), cell.y()));
        let _ = mirrored_v.insert(CellCoord::new(cell.x(), max.y() - (cell.y() - min.y())));
    }

    [mirrored_h, mirrored_v]
}
