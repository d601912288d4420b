//! Presentation tree produced by every template and consumed by the flow layout.
//!
//! Text nodes hold the literal document values; display transforms such as uppercasing are
//! flags applied at paint time, so the tree can be checked against the document verbatim.

use serde::Serialize;

use crate::models::style::{FontChoice, Rgb, TemplateId};

/// Page width in CSS px (8.5in at 96dpi).
pub const PAGE_WIDTH_PX: f32 = 816.0;
/// Minimum page height in CSS px (11in at 96dpi).
pub const PAGE_MIN_HEIGHT_PX: f32 = 1056.0;

/// Content sections, in the order the structured export emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Summary,
    WorkExperience,
    Education,
    Skills,
    Projects,
}

impl SectionKind {
    pub const CANONICAL_ORDER: [SectionKind; 5] = [
        SectionKind::Summary,
        SectionKind::WorkExperience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::WorkExperience => "Work Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Insets {
    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn left(v: f32) -> Self {
        Self {
            left: v,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNode {
    Stack(Stack),
    Columns(Columns),
    Text(Text),
    Chips(Chips),
    Rule(Rule),
}

/// Vertical flow of children.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stack {
    pub children: Vec<LayoutNode>,
    pub gap: f32,
    pub padding: Insets,
    pub background: Option<Rgb>,
    pub min_height: f32,
    /// Marks this stack as the container of a content section.
    pub section: Option<SectionKind>,
}

impl Stack {
    pub fn new(children: Vec<LayoutNode>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    pub fn min_height(mut self, h: f32) -> Self {
        self.min_height = h;
        self
    }

    pub fn section(mut self, kind: SectionKind) -> Self {
        self.section = Some(kind);
        self
    }
}

/// Side-by-side columns sharing the row width by weight. Every column stretches to the row height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Columns {
    pub columns: Vec<Column>,
    pub gap: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub weight: f32,
    pub node: LayoutNode,
}

impl Columns {
    pub fn new(gap: f32) -> Self {
        Self {
            columns: Vec::new(),
            gap,
        }
    }

    pub fn col(mut self, weight: f32, node: impl Into<LayoutNode>) -> Self {
        self.columns.push(Column {
            weight,
            node: node.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub content: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub uppercase: bool,
    pub bullet: bool,
    pub color: Rgb,
    pub align: TextAlign,
    /// Line box height as a multiple of `size`.
    pub line_height: f32,
}

impl Text {
    pub fn new(content: impl Into<String>, size: f32) -> Self {
        Self {
            content: content.into(),
            size,
            bold: false,
            italic: false,
            uppercase: false,
            bullet: false,
            color: Rgb::INK,
            align: TextAlign::Left,
            line_height: 1.4,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn bullet(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// The string as painted.
    pub fn display(&self) -> String {
        if self.uppercase {
            self.content.to_uppercase()
        } else {
            self.content.clone()
        }
    }
}

/// Pill-shaped tags that wrap onto new rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chips {
    pub items: Vec<String>,
    pub size: f32,
    pub color: Rgb,
    pub background: Rgb,
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub color: Rgb,
    pub thickness: f32,
    /// Space above the line.
    pub offset: f32,
}

impl From<Stack> for LayoutNode {
    fn from(s: Stack) -> Self {
        LayoutNode::Stack(s)
    }
}

impl From<Columns> for LayoutNode {
    fn from(c: Columns) -> Self {
        LayoutNode::Columns(c)
    }
}

impl From<Text> for LayoutNode {
    fn from(t: Text) -> Self {
        LayoutNode::Text(t)
    }
}

impl From<Chips> for LayoutNode {
    fn from(c: Chips) -> Self {
        LayoutNode::Chips(c)
    }
}

impl From<Rule> for LayoutNode {
    fn from(r: Rule) -> Self {
        LayoutNode::Rule(r)
    }
}

/// A rendered template: the presentation tree plus the page it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTree {
    pub template: TemplateId,
    pub font: FontChoice,
    pub width: f32,
    pub min_height: f32,
    pub root: LayoutNode,
}

#[cfg(test)]
impl LayoutTree {
    /// Every text string in document order (pre-order, left column before right).
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_texts(&self.root, &mut out);
        out
    }

    /// Section tags in document order.
    pub fn sections(&self) -> Vec<SectionKind> {
        let mut out = Vec::new();
        collect_sections(&self.root, &mut out);
        out
    }

    /// Text strings inside the section tagged `kind`.
    pub fn section_texts(&self, kind: SectionKind) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(node) = find_section(&self.root, kind) {
            collect_texts(node, &mut out);
        }
        out
    }
}

#[cfg(test)]
fn collect_texts<'a>(node: &'a LayoutNode, out: &mut Vec<&'a str>) {
    match node {
        LayoutNode::Stack(s) => s.children.iter().for_each(|c| collect_texts(c, out)),
        LayoutNode::Columns(c) => c.columns.iter().for_each(|c| collect_texts(&c.node, out)),
        LayoutNode::Text(t) if !t.content.is_empty() => out.push(&t.content),
        LayoutNode::Chips(c) => out.extend(c.items.iter().map(String::as_str)),
        _ => {}
    }
}

#[cfg(test)]
fn collect_sections(node: &LayoutNode, out: &mut Vec<SectionKind>) {
    match node {
        LayoutNode::Stack(s) => {
            if let Some(kind) = s.section {
                out.push(kind);
            }
            s.children.iter().for_each(|c| collect_sections(c, out));
        }
        LayoutNode::Columns(c) => c.columns.iter().for_each(|c| collect_sections(&c.node, out)),
        _ => {}
    }
}

#[cfg(test)]
fn find_section(node: &LayoutNode, kind: SectionKind) -> Option<&LayoutNode> {
    match node {
        LayoutNode::Stack(s) if s.section == Some(kind) => Some(node),
        LayoutNode::Stack(s) => s.children.iter().find_map(|c| find_section(c, kind)),
        LayoutNode::Columns(c) => c.columns.iter().find_map(|c| find_section(&c.node, kind)),
        _ => None,
    }
}
