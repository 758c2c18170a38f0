#![forbid(unsafe_code)]

//! Rendered overlay layers and a character-grid rasterizer for them.
//!
//! A [`Layer`] is what a kind's renderer produces: an optional backdrop plus
//! positioned [`Block`]s. [`Canvas`] draws layers bottom-up into a fixed-size
//! grid, which is enough for terminals, snapshots, and tests.

use overdeck_core::OverlayId;
use unicode_width::UnicodeWidthChar;

const BACKDROP: char = '░';
/// Continuation marker for the second cell of a wide character.
const WIDE_TAIL: char = '\0';

/// Where a block sits on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Offset in cells from the bottom-right corner to the block's corner.
    BottomRight { right: u16, bottom: u16 },
    /// Block centred on a point given in percent of the surface.
    Percent { top: u16, left: u16 },
}

/// One bordered box of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: OverlayId,
    pub placement: Placement,
    pub lines: Vec<String>,
}

impl Block {
    /// Display width of the widest line.
    #[must_use]
    pub fn inner_width(&self) -> u16 {
        let widest = self.lines.iter().map(|line| display_width(line)).max().unwrap_or(0);
        u16::try_from(widest).unwrap_or(u16::MAX)
    }

    /// Outer size including the border.
    #[must_use]
    pub fn outer_size(&self) -> (u16, u16) {
        let height = u16::try_from(self.lines.len()).unwrap_or(u16::MAX);
        (
            self.inner_width().saturating_add(4),
            height.saturating_add(2),
        )
    }
}

/// Output of one kind's renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub backdrop: bool,
    pub blocks: Vec<Block>,
}

impl Layer {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Nothing to draw: no backdrop and no blocks.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.backdrop && self.blocks.is_empty()
    }
}

/// Display width of `s` in terminal cells.
#[must_use]
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate `s` to at most `max` display cells, marking the cut with `…`.
#[must_use]
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if display_width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Fixed-size character grid.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; usize::from(width) * usize::from(height)],
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Draw every layer in order; later layers cover earlier ones.
    pub fn draw_layers<'a>(&mut self, layers: impl IntoIterator<Item = &'a Layer>) {
        for layer in layers {
            self.draw_layer(layer);
        }
    }

    pub fn draw_layer(&mut self, layer: &Layer) {
        if layer.backdrop {
            self.cells.fill(BACKDROP);
        }
        for block in &layer.blocks {
            self.draw_block(block);
        }
    }

    /// The grid as text rows, trailing spaces trimmed.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        if self.width == 0 {
            return vec![String::new(); usize::from(self.height)];
        }
        self.cells
            .chunks(usize::from(self.width))
            .map(|row| {
                let line: String = row.iter().filter(|c| **c != WIDE_TAIL).collect();
                line.trim_end().to_string()
            })
            .collect()
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows().join("\n")
    }

    // i64: percent offsets of a u16-wide canvas exceed i32.
    fn origin(&self, block: &Block) -> (i64, i64) {
        let (w, h) = block.outer_size();
        let (w, h) = (i64::from(w), i64::from(h));
        let (sw, sh) = (i64::from(self.width), i64::from(self.height));
        match block.placement {
            Placement::BottomRight { right, bottom } => {
                (sw - i64::from(right) - w, sh - i64::from(bottom) - h)
            }
            Placement::Percent { top, left } => {
                let cx = sw * i64::from(left) / 100;
                let cy = sh * i64::from(top) / 100;
                (cx - w / 2, cy - h / 2)
            }
        }
    }

    fn draw_block(&mut self, block: &Block) {
        let (x0, y0) = self.origin(block);
        let h = i64::from(block.outer_size().1);
        let inner = usize::from(block.inner_width());

        let horizontal = "─".repeat(inner + 2);
        self.put_str(x0, y0, &format!("┌{horizontal}┐"));
        for (row, line) in block.lines.iter().enumerate() {
            let pad = inner - display_width(line).min(inner);
            let y = y0.saturating_add(1 + i64::try_from(row).unwrap_or(i64::MAX - 1));
            self.put_str(x0, y, &format!("│ {line}{} │", " ".repeat(pad)));
        }
        self.put_str(x0, y0 + h - 1, &format!("└{horizontal}┘"));
    }

    fn put_str(&mut self, x: i64, y: i64, s: &str) {
        let mut cx = x;
        for c in s.chars() {
            let w = c.width().unwrap_or(0);
            if w == 0 {
                continue;
            }
            if let Some(idx) = self.index(cx, y, w) {
                self.cells[idx] = c;
                if w == 2 {
                    self.cells[idx + 1] = WIDE_TAIL;
                }
            }
            cx = cx.saturating_add(i64::try_from(w).unwrap_or(i64::MAX));
        }
    }

    /// Cell index of `(x, y)` when a glyph `w` cells wide fits entirely on
    /// the canvas there.
    fn index(&self, x: i64, y: i64, w: usize) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let width = usize::from(self.width);
        if y >= usize::from(self.height) || x.checked_add(w)? > width {
            return None;
        }
        Some(y * width + x)
    }
}
