//! Flow layout: positions a `LayoutTree` on a page-width surface in CSS px.
//!
//! Stacks flow top to bottom, columns share their row by weight and every column is
//! stretched to the tallest one, text wraps greedily using the static width tables.

use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, FontMetricTable};
use crate::models::style::{FontChoice, Rgb};
use crate::templates::node::{Chips, Columns, LayoutNode, LayoutTree, Stack, Text, TextAlign};

const BULLET_INDENT: f32 = 20.0;
const BULLET_GLYPH: &str = "•";
const CHIP_PAD_X: f32 = 12.0;
const CHIP_PAD_Y: f32 = 4.0;
const CHIP_GAP: f32 = 8.0;

/// One positioned line of text. `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub line_height: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Paint {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text(TextRun),
}

/// A laid-out page at true print size. Paint order is back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
    pub font: FontChoice,
    pub paints: Vec<Paint>,
}

#[cfg(test)]
impl Surface {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.paints.iter().filter_map(|p| match p {
            Paint::Text(run) => Some(run),
            Paint::Rect { .. } => None,
        })
    }
}

pub fn layout(tree: &LayoutTree) -> Surface {
    let mut flow = Flow {
        metrics: get_metrics(tree.font),
        paints: Vec::new(),
    };
    let height = flow.node(&tree.root, 0.0, 0.0, tree.width, None);
    Surface {
        width: tree.width,
        height: height.max(tree.min_height),
        font: tree.font,
        paints: flow.paints,
    }
}

struct Flow {
    metrics: &'static FontMetricTable,
    paints: Vec<Paint>,
}

impl Flow {
    /// Lays out `node` with its top-left at (x, y). Returns the height consumed.
    fn node(&mut self, node: &LayoutNode, x: f32, y: f32, width: f32, stretch: Option<f32>) -> f32 {
        match node {
            LayoutNode::Stack(s) => self.stack(s, x, y, width, stretch),
            LayoutNode::Columns(c) => self.columns(c, x, y, width),
            LayoutNode::Text(t) => self.text(t, x, y, width),
            LayoutNode::Chips(c) => self.chips(c, x, y, width),
            LayoutNode::Rule(r) => {
                self.paints.push(Paint::Rect {
                    x,
                    y: y + r.offset,
                    width,
                    height: r.thickness,
                    color: r.color,
                });
                r.offset + r.thickness
            }
        }
    }

    fn stack(&mut self, s: &Stack, x: f32, y: f32, width: f32, stretch: Option<f32>) -> f32 {
        // Reserve the background slot so it paints beneath the children.
        let background = s.background.map(|color| {
            self.paints.push(Paint::Rect {
                x,
                y,
                width,
                height: 0.0,
                color,
            });
            self.paints.len() - 1
        });

        let inner_x = x + s.padding.left;
        let inner_w = (width - s.padding.left - s.padding.right).max(0.0);
        let mut cursor = y + s.padding.top;
        for (i, child) in s.children.iter().enumerate() {
            if i > 0 {
                cursor += s.gap;
            }
            cursor += self.node(child, inner_x, cursor, inner_w, None);
        }

        let height = (cursor + s.padding.bottom - y)
            .max(s.min_height)
            .max(stretch.unwrap_or(0.0));

        if let Some(slot) = background {
            if let Paint::Rect { height: h, .. } = &mut self.paints[slot] {
                *h = height;
            }
        }
        height
    }

    fn columns(&mut self, c: &Columns, x: f32, y: f32, width: f32) -> f32 {
        if c.columns.is_empty() {
            return 0.0;
        }
        let total_weight: f32 = c.columns.iter().map(|col| col.weight.max(0.0)).sum();
        let gaps = c.gap * (c.columns.len() - 1) as f32;
        let free = (width - gaps).max(0.0);
        let widths: Vec<f32> = c
            .columns
            .iter()
            .map(|col| {
                if total_weight > 0.0 {
                    free * col.weight.max(0.0) / total_weight
                } else {
                    free / c.columns.len() as f32
                }
            })
            .collect();

        // Measure on a scratch flow first so every column can stretch to the row height.
        let row_height = c
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| {
                let mut scratch = Flow {
                    metrics: self.metrics,
                    paints: Vec::new(),
                };
                scratch.node(&col.node, 0.0, 0.0, *w, None)
            })
            .fold(0.0_f32, f32::max);

        let mut cx = x;
        for (col, w) in c.columns.iter().zip(&widths) {
            self.node(&col.node, cx, y, *w, Some(row_height));
            cx += w + c.gap;
        }
        row_height
    }

    fn text(&mut self, t: &Text, x: f32, y: f32, width: f32) -> f32 {
        let content = t.display();
        let indent = if t.bullet { BULLET_INDENT } else { 0.0 };
        let mut lines = self
            .metrics
            .wrap(&content, (width - indent).max(1.0), t.size, t.bold);
        if lines.is_empty() {
            if !t.bullet {
                return 0.0;
            }
            // An empty bullet still holds its line.
            lines.push(String::new());
        }

        let line_box = t.size * t.line_height;
        if t.bullet {
            let marker = self.run(t, x + 6.0, y, BULLET_GLYPH);
            self.paints.push(Paint::Text(marker));
        }
        for (i, line) in lines.iter().enumerate() {
            let line_w = self.metrics.measure_px(line, t.size, t.bold);
            let avail = width - indent;
            let lx = x + indent
                + match t.align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => ((avail - line_w) / 2.0).max(0.0),
                    TextAlign::Right => (avail - line_w).max(0.0),
                };
            let run = self.run(t, lx, y + i as f32 * line_box, line);
            self.paints.push(Paint::Text(run));
        }
        lines.len() as f32 * line_box
    }

    fn run(&self, t: &Text, x: f32, y: f32, text: &str) -> TextRun {
        TextRun {
            x,
            y,
            size: t.size,
            line_height: t.size * t.line_height,
            bold: t.bold,
            italic: t.italic,
            color: t.color,
            text: text.to_string(),
        }
    }

    fn chips(&mut self, c: &Chips, x: f32, y: f32, width: f32) -> f32 {
        let items: Vec<(&str, f32)> = c
            .items
            .iter()
            .map(|i| (i.as_str(), self.metrics.measure_px(i, c.size, false) + 2.0 * CHIP_PAD_X))
            .collect();
        if items.is_empty() {
            return 0.0;
        }

        // Break into rows.
        let mut rows: Vec<Vec<(&str, f32)>> = vec![Vec::new()];
        let mut row_w = 0.0_f32;
        for item in items {
            if row_w > 0.0 && row_w + CHIP_GAP + item.1 > width {
                rows.push(Vec::new());
                row_w = 0.0;
            }
            if row_w > 0.0 {
                row_w += CHIP_GAP;
            }
            row_w += item.1;
            if let Some(row) = rows.last_mut() {
                row.push(item);
            }
        }

        let chip_h = c.size * 1.4 + 2.0 * CHIP_PAD_Y;
        let mut cy = y;
        for row in &rows {
            let used: f32 =
                row.iter().map(|(_, w)| w).sum::<f32>() + CHIP_GAP * (row.len() as f32 - 1.0);
            let mut cx = x + match c.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => ((width - used) / 2.0).max(0.0),
                TextAlign::Right => (width - used).max(0.0),
            };
            for (label, w) in row {
                self.paints.push(Paint::Rect {
                    x: cx,
                    y: cy,
                    width: *w,
                    height: chip_h,
                    color: c.background,
                });
                self.paints.push(Paint::Text(TextRun {
                    x: cx + CHIP_PAD_X,
                    y: cy + CHIP_PAD_Y,
                    size: c.size,
                    line_height: c.size * 1.4,
                    bold: false,
                    italic: false,
                    color: c.color,
                    text: label.to_string(),
                }));
                cx += w + CHIP_GAP;
            }
            cy += chip_h + CHIP_GAP;
        }
        cy - y - CHIP_GAP
    }
}
