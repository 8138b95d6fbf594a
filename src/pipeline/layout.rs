//! Layout engine: paginate a contact batch into draw commands.
//!
//! The engine walks the batch once, keeping a vertical cursor that starts at
//! the top margin and moves down by a fixed advance after every line. Before
//! each atomic draw (header, name line, each wrapped field line, divider) it
//! checks the cursor against the bottom margin and, if needed, emits a
//! [`DrawCommand::PageBreak`] and resets to the top of the next page.
//!
//! Records are not kept together: a contact that does not fit continues on
//! the next page exactly where it stopped, so no line is ever lost or
//! duplicated across a page boundary.
//!
//! Output is a flat command list rather than PDF operators, which keeps the
//! pagination logic independent of the PDF backend and easy to assert on.

use crate::config::PageGeometry;
use crate::i18n::Translator;
use crate::model::{ContactBatch, ContactRecord};
use crate::pipeline::fonts::Font;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Font and size for a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
}

/// One atomic instruction for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Draw `text` with its baseline starting at (`x`, `y`).
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    /// Stroke a straight line.
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Finish the current page and start a new one.
    PageBreak,
}

/// Paginated draw commands for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub commands: Vec<DrawCommand>,
    /// Number of pages the commands span (always ≥ 1).
    pub pages: usize,
}

impl Layout {
    /// Text of every `Text` command, in order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Lay out `batch` on pages described by `geometry`.
pub fn layout(
    batch: &ContactBatch,
    translator: &Translator,
    geometry: &PageGeometry,
    export_date: NaiveDate,
) -> Layout {
    let mut engine = LayoutEngine::new(*geometry);

    let header = format!(
        "{}: {}",
        translator.translate("Export date"),
        export_date.format("%d/%m/%Y")
    );
    engine.text(
        header,
        TextStyle {
            font: Font::Oblique,
            size: geometry.header_font_size,
        },
        geometry.header_gap,
    );

    for record in batch {
        engine.record(record, translator);
    }

    debug!(
        "Laid out {} contacts on {} pages ({} commands)",
        batch.len(),
        engine.pages,
        engine.commands.len()
    );
    Layout {
        commands: engine.commands,
        pages: engine.pages,
    }
}

struct LayoutEngine {
    geometry: PageGeometry,
    commands: Vec<DrawCommand>,
    y: f32,
    pages: usize,
}

impl LayoutEngine {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            y: geometry.top(),
            geometry,
            commands: Vec::new(),
            pages: 1,
        }
    }

    fn ensure_room(&mut self) {
        if self.y < self.geometry.bottom_margin {
            self.commands.push(DrawCommand::PageBreak);
            self.pages += 1;
            self.y = self.geometry.top();
        }
    }

    fn text(&mut self, text: String, style: TextStyle, advance: f32) {
        self.ensure_room();
        self.commands.push(DrawCommand::Text {
            x: self.geometry.margin,
            y: self.y,
            text,
            style,
        });
        self.y -= advance;
    }

    fn divider(&mut self) {
        self.ensure_room();
        self.commands.push(DrawCommand::Line {
            x1: self.geometry.margin,
            y1: self.y,
            x2: self.geometry.page_size.width - self.geometry.margin,
            y2: self.y,
        });
        self.y -= self.geometry.block_gap;
    }

    fn record(&mut self, record: &ContactRecord, translator: &Translator) {
        let g = self.geometry;
        let name = TextStyle {
            font: Font::Bold,
            size: g.name_font_size,
        };
        let mut name_lines = wrap_text(&record.full_name(), name.font, name.size, g.text_width());
        if name_lines.is_empty() {
            name_lines.push(String::new());
        }
        for line in name_lines {
            self.text(line, name, g.name_line_height);
        }

        let body = TextStyle {
            font: Font::Regular,
            size: g.body_font_size,
        };
        for (key, value) in record.populated_fields() {
            let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
            let line = format!("{}: {}", translator.translate(key), value);
            for wrapped in wrap_text(&line, body.font, body.size, g.text_width()) {
                self.text(wrapped, body, g.line_height);
            }
        }

        self.divider();
    }
}

/// Greedy word-wrap of `text` into lines no wider than `max_width` points.
///
/// Runs of whitespace collapse to one space. A single word wider than the
/// line is broken between characters.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let fits = |s: &str| font.text_width(s, size) <= max_width;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
            continue;
        }
        for ch in word.chars() {
            current.push(ch);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
