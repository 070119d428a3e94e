//! Alignment-aware placement of lines, syllables and characters
//!
//! Coordinates are script pixels with the origin at the top-left of the
//! `PlayResX` x `PlayResY` canvas. `x`/`y` are the anchor point implied by
//! the style alignment; the remaining fields describe the bounding box.
//!
//! Syllables flow left to right for alignments 1-3 and 7-9. Middle-row
//! alignments (4-6) stack them vertically, one row per syllable, each row
//! centred on the canvas against the height of the rows up to and including
//! it and offset by the style spacing. Characters always flow left to right
//! inside their syllable. A style whose alignment is outside 1-9 produces
//! zero geometry.

use crate::style::{Alignment, Column, Row, Style};

/// Script canvas size (`PlayResX`, `PlayResY`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Canvas assumed when a script omits its play resolution
    pub const DEFAULT: Self = Self {
        width: 384,
        height: 288,
    };

    #[must_use]
    pub fn center_x(self) -> f64 {
        f64::from(self.width) / 2.0
    }

    #[must_use]
    pub fn center_y(self) -> f64 {
        f64::from(self.height) / 2.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Measured extent of a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Apply style scale percentages
    #[must_use]
    pub fn scaled(self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            width: self.width * scale_x / 100.0,
            height: self.height * scale_y / 100.0,
        }
    }
}

/// Anchor point and bounding box of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// Horizontal anchor
    pub x: f64,
    /// Vertical anchor
    pub y: f64,
    pub top: f64,
    pub middle: f64,
    pub bottom: f64,
    pub left: f64,
    pub center: f64,
    pub right: f64,
}

impl Geometry {
    /// Box spanning `width` from `left`, with vertical extents taken from `rows`
    fn spanning(alignment: Alignment, left: f64, width: f64, rows: &Self) -> Self {
        let mut geometry = Self {
            left,
            center: left + width / 2.0,
            right: left + width,
            top: rows.top,
            middle: rows.middle,
            bottom: rows.bottom,
            y: rows.y,
            x: 0.0,
        };
        geometry.x = geometry.anchor_x(alignment.column());
        geometry
    }

    const fn anchor_x(&self, column: Column) -> f64 {
        match column {
            Column::Left => self.left,
            Column::Center => self.center,
            Column::Right => self.right,
        }
    }

    const fn anchor_y(&self, row: Row) -> f64 {
        match row {
            Row::Top => self.top,
            Row::Middle => self.middle,
            Row::Bottom => self.bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Measured inputs for one karaoke syllable
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnitMetrics {
    /// Size of the trimmed text
    pub size: Size,
    /// Whitespace characters before the text
    pub leading_spaces: usize,
    /// Whitespace characters after the text
    pub trailing_spaces: usize,
    /// `false` for whitespace-only gaps, which advance the cursor but are
    /// not placed
    pub rendered: bool,
}

/// Place a whole line on the canvas
///
/// # Example
///
/// ```rust
/// use ass_fx::{karaoke::geometry::line_geometry, Resolution, Size, Style};
///
/// let style = Style { alignment: 8, margin_v: 20.0, ..Style::new("Top") };
/// let geometry = line_geometry(&style, Resolution { width: 1280, height: 720 }, Size::new(200.0, 40.0));
/// assert_eq!(geometry.left, 540.0);
/// assert_eq!((geometry.x, geometry.y), (640.0, 20.0));
/// ```
#[must_use]
pub fn line_geometry(style: &Style, resolution: Resolution, size: Size) -> Geometry {
    let Some(alignment) = style.alignment() else {
        return Geometry::default();
    };
    let canvas_width = f64::from(resolution.width);
    let canvas_height = f64::from(resolution.height);

    let left = match alignment.column() {
        Column::Left => style.margin_l,
        Column::Center => resolution.center_x() - size.width / 2.0,
        Column::Right => canvas_width - style.margin_r - size.width,
    };

    let (top, middle, bottom) = match alignment.row() {
        Row::Top => {
            let top = style.margin_v;
            (top, top + size.height / 2.0, top + size.height)
        }
        Row::Middle => {
            let middle = resolution.center_y();
            (middle - size.height / 2.0, middle, middle + size.height / 2.0)
        }
        Row::Bottom => {
            let bottom = canvas_height - style.margin_v;
            (bottom - size.height, bottom - size.height / 2.0, bottom)
        }
    };

    let mut geometry = Geometry {
        left,
        center: left + size.width / 2.0,
        right: left + size.width,
        top,
        middle,
        bottom,
        x: 0.0,
        y: 0.0,
    };
    geometry.x = geometry.anchor_x(alignment.column());
    geometry.y = geometry.anchor_y(alignment.row());
    geometry
}

/// Place the syllables of a line
///
/// `units` holds every karaoke syllable of the line, gaps included; the
/// result holds one geometry per rendered unit. `space_width` is the scaled
/// width of a single space in the line's style.
#[must_use]
pub fn syllable_geometry(
    style: &Style,
    resolution: Resolution,
    line: &Geometry,
    units: &[UnitMetrics],
    space_width: f64,
) -> Vec<Geometry> {
    let rendered = units.iter().filter(|unit| unit.rendered).count();
    let Some(alignment) = style.alignment() else {
        return vec![Geometry::default(); rendered];
    };

    if alignment.stacks_vertically() {
        stack_vertically(style, alignment, resolution, line, units)
    } else {
        flow_horizontally(style, alignment, line, units, space_width)
    }
}

fn flow_horizontally(
    style: &Style,
    alignment: Alignment,
    line: &Geometry,
    units: &[UnitMetrics],
    space_width: f64,
) -> Vec<Geometry> {
    // Pre-shift by half the accumulated drift so the corrected run stays centred
    let mut cursor = line.left - units.len() as f64 * style.x_fix / 2.0;
    let mut placed = Vec::with_capacity(units.len());

    for unit in units {
        cursor += unit.leading_spaces as f64 * space_width;
        if unit.rendered {
            placed.push(Geometry::spanning(alignment, cursor, unit.size.width, line));
        }
        cursor += unit.size.width
            + unit.trailing_spaces as f64 * space_width
            + style.spacing
            + style.x_fix;
    }
    placed
}

fn stack_vertically(
    style: &Style,
    alignment: Alignment,
    resolution: Resolution,
    line: &Geometry,
    units: &[UnitMetrics],
) -> Vec<Geometry> {
    let rows: Vec<Size> = units
        .iter()
        .filter(|unit| unit.rendered)
        .map(|unit| unit.size)
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }

    let widest = rows.iter().fold(0.0_f64, |max, size| max.max(size.width));
    let mut sum_height = 0.0;

    rows.iter()
        .map(|size| {
            // Each row is centred against the height stacked so far
            sum_height += size.height;
            let top = resolution.center_y() - sum_height / 2.0 + style.spacing;

            let offset = (widest - size.width) / 2.0;
            let left = match alignment.column() {
                Column::Left => line.left + offset,
                Column::Center => resolution.center_x() - size.width / 2.0,
                Column::Right => line.right - size.width - offset,
            };
            let middle = top + size.height / 2.0;
            let row = Geometry {
                top,
                middle,
                bottom: top + size.height,
                y: middle,
                ..Geometry::default()
            };
            Geometry::spanning(alignment, left, size.width, &row)
        })
        .collect()
}

/// Place the characters of a syllable left to right
///
/// Characters share the syllable's vertical placement.
#[must_use]
pub fn character_geometry(style: &Style, syllable: &Geometry, widths: &[f64]) -> Vec<Geometry> {
    let Some(alignment) = style.alignment() else {
        return vec![Geometry::default(); widths.len()];
    };

    let mut cursor = syllable.left;
    widths
        .iter()
        .map(|&width| {
            let geometry = Geometry::spanning(alignment, cursor, width, syllable);
            cursor += width;
            geometry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    fn style(alignment: u8) -> Style {
        Style {
            alignment,
            margin_l: 10.0,
            margin_r: 30.0,
            margin_v: 20.0,
            ..Style::new("Test")
        }
    }

    fn unit(width: f64) -> UnitMetrics {
        UnitMetrics {
            size: Size::new(width, 40.0),
            rendered: true,
            ..UnitMetrics::default()
        }
    }

    #[test]
    fn line_columns() {
        let size = Size::new(200.0, 40.0);
        assert_eq!(line_geometry(&style(7), HD, size).left, 10.0);
        assert_eq!(line_geometry(&style(8), HD, size).left, 540.0);
        assert_eq!(line_geometry(&style(9), HD, size).left, 1050.0);

        let right = line_geometry(&style(3), HD, size);
        assert_eq!((right.x, right.right), (1250.0, 1250.0));
    }

    #[test]
    fn line_rows() {
        let size = Size::new(200.0, 40.0);

        let top = line_geometry(&style(8), HD, size);
        assert_eq!((top.top, top.middle, top.bottom, top.y), (20.0, 40.0, 60.0, 20.0));

        let middle = line_geometry(&style(5), HD, size);
        assert_eq!(
            (middle.top, middle.middle, middle.bottom, middle.y),
            (340.0, 360.0, 380.0, 360.0)
        );

        let bottom = line_geometry(&style(2), HD, size);
        assert_eq!(
            (bottom.top, bottom.middle, bottom.bottom, bottom.y),
            (660.0, 680.0, 700.0, 700.0)
        );
    }

    #[test]
    fn invalid_alignment_is_zero() {
        let size = Size::new(200.0, 40.0);
        assert_eq!(line_geometry(&style(0), HD, size), Geometry::default());

        let line = Geometry::default();
        let placed = syllable_geometry(&style(11), HD, &line, &[unit(10.0), unit(20.0)], 5.0);
        assert_eq!(placed, vec![Geometry::default(); 2]);
        assert_eq!(
            character_geometry(&style(0), &line, &[1.0, 2.0, 3.0]),
            vec![Geometry::default(); 3]
        );
    }

    #[test]
    fn horizontal_flow_is_contiguous() {
        let s = style(8);
        let line = line_geometry(&s, HD, Size::new(100.0, 40.0));
        let placed = syllable_geometry(&s, HD, &line, &[unit(40.0), unit(60.0)], 10.0);

        assert_eq!(placed[0].left, 590.0);
        assert_eq!(placed[0].right, 630.0);
        assert_eq!(placed[1].left, 630.0);
        assert_eq!(placed[1].right, 690.0);
        assert_eq!(placed[1].x, 660.0);
        assert!(placed.iter().all(|g| g.y == line.y && g.top == line.top));
    }

    #[test]
    fn horizontal_flow_counts_spaces_and_gaps() {
        let s = style(7);
        let line = line_geometry(&s, HD, Size::new(100.0, 40.0));
        let units = [
            UnitMetrics {
                trailing_spaces: 1,
                ..unit(40.0)
            },
            UnitMetrics {
                size: Size::new(0.0, 40.0),
                leading_spaces: 2,
                ..UnitMetrics::default()
            },
            UnitMetrics {
                leading_spaces: 1,
                ..unit(20.0)
            },
        ];
        let placed = syllable_geometry(&s, HD, &line, &units, 5.0);

        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].left, 10.0);
        // 10 + 40 + 5 (trailing) + 10 (gap) + 5 (leading)
        assert_eq!(placed[1].left, 70.0);
        assert_eq!(placed[1].x, 70.0);
    }

    #[test]
    fn horizontal_flow_applies_spacing_and_x_fix() {
        let s = Style {
            spacing: 2.0,
            x_fix: 4.0,
            ..style(7)
        };
        let line = line_geometry(&s, HD, Size::new(100.0, 40.0));
        let placed = syllable_geometry(&s, HD, &line, &[unit(10.0), unit(10.0)], 0.0);

        // Pre-shift of 2 units * 4 / 2
        assert_eq!(placed[0].left, 6.0);
        assert_eq!(placed[1].left, 6.0 + 10.0 + 2.0 + 4.0);
    }

    #[test]
    fn vertical_stack_centres_rows() {
        let s = style(5);
        let line = line_geometry(&s, HD, Size::new(120.0, 40.0));
        let placed = syllable_geometry(&s, HD, &line, &[unit(40.0), unit(80.0)], 10.0);

        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].center, 640.0);
        assert_eq!(placed[1].center, 640.0);
        // running heights 40 then 80, plus spacing 0
        assert_eq!((placed[0].top, placed[0].bottom), (340.0, 380.0));
        assert_eq!((placed[1].top, placed[1].bottom), (320.0, 360.0));
        assert_eq!(placed[0].y, 360.0);
    }

    #[test]
    fn vertical_stack_left_and_right() {
        let left_style = style(4);
        let line = line_geometry(&left_style, HD, Size::new(120.0, 40.0));
        let placed = syllable_geometry(&left_style, HD, &line, &[unit(40.0), unit(80.0)], 0.0);
        assert_eq!(placed[0].left, line.left + 20.0);
        assert_eq!(placed[1].left, line.left);
        assert_eq!(placed[0].x, placed[0].left);

        let right_style = style(6);
        let line = line_geometry(&right_style, HD, Size::new(120.0, 40.0));
        let placed = syllable_geometry(&right_style, HD, &line, &[unit(40.0), unit(80.0)], 0.0);
        assert_eq!(placed[0].right, line.right - 20.0);
        assert_eq!(placed[1].right, line.right);
        assert_eq!(placed[1].x, placed[1].right);
    }

    #[test]
    fn vertical_stack_skips_gaps_and_adds_spacing() {
        let s = Style {
            spacing: 10.0,
            ..style(5)
        };
        let line = line_geometry(&s, HD, Size::new(100.0, 40.0));
        let gap = UnitMetrics {
            leading_spaces: 1,
            ..UnitMetrics::default()
        };
        let placed = syllable_geometry(&s, HD, &line, &[unit(40.0), gap, unit(40.0)], 10.0);

        assert_eq!(placed.len(), 2);
        // 360 - 40 / 2 + 10, then 360 - 80 / 2 + 10
        assert_eq!(placed[0].top, 350.0);
        assert_eq!(placed[1].top, 330.0);
        assert_eq!(placed[1].middle, 350.0);
    }

    #[test]
    fn single_stacked_row_is_offset_by_spacing() {
        let s = Style {
            spacing: 10.0,
            ..style(5)
        };
        let line = line_geometry(&s, HD, Size::new(40.0, 40.0));
        let placed = syllable_geometry(&s, HD, &line, &[unit(40.0)], 10.0);

        assert_eq!((placed[0].top, placed[0].bottom), (350.0, 390.0));
        assert_eq!((placed[0].x, placed[0].y), (640.0, 370.0));
    }

    #[test]
    fn characters_flow_within_syllable() {
        let s = style(2);
        let syllable = Geometry {
            left: 100.0,
            right: 130.0,
            center: 115.0,
            top: 10.0,
            middle: 20.0,
            bottom: 30.0,
            x: 115.0,
            y: 30.0,
        };
        let placed = character_geometry(&s, &syllable, &[10.0, 20.0]);

        assert_eq!((placed[0].left, placed[0].right), (100.0, 110.0));
        assert_eq!((placed[1].left, placed[1].right), (110.0, 130.0));
        assert_eq!(placed[1].x, 120.0);
        assert!(placed.iter().all(|g| g.y == 30.0 && g.top == 10.0));
    }
}
