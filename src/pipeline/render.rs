//! PDF rendering: replay draw commands onto a [`Canvas`].
//!
//! [`Canvas`] is the boundary to the PDF backend and mirrors a
//! minimal drawing API (set font, draw string, draw line, new page). The
//! layout engine never sees PDF objects, and tests can swap in a recording
//! canvas.
//!
//! [`PdfCanvas`] implements it on top of `lopdf`. Pages are buffered as
//! operator lists and only encoded in [`PdfCanvas::finish`], so drawing never
//! fails and nothing touches the file system: the caller decides where the
//! finished bytes go.

use crate::config::PageSize;
use crate::error::ScribeError;
use crate::pipeline::fonts::{encode_win_ansi, Font};
use crate::pipeline::layout::{DrawCommand, Layout, TextStyle};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

/// Minimal drawing surface the layout is rendered onto.
pub trait Canvas {
    /// Select the font for subsequent [`Canvas::draw_string`] calls.
    fn set_font(&mut self, font: Font, size: f32);
    /// Draw `text` with its baseline starting at (`x`, `y`).
    fn draw_string(&mut self, x: f32, y: f32, text: &str);
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
    /// Finish the current page and start drawing on a fresh one.
    fn new_page(&mut self);
}

/// Replay `layout` onto `canvas`, switching fonts only when the style changes.
pub fn render_layout<C: Canvas + ?Sized>(layout: &Layout, canvas: &mut C) {
    let mut current: Option<TextStyle> = None;
    for command in &layout.commands {
        match command {
            DrawCommand::Text { x, y, text, style } => {
                if current != Some(*style) {
                    canvas.set_font(style.font, style.size);
                    current = Some(*style);
                }
                canvas.draw_string(*x, *y, text);
            }
            DrawCommand::Line { x1, y1, x2, y2 } => canvas.draw_line(*x1, *y1, *x2, *y2),
            DrawCommand::PageBreak => {
                canvas.new_page();
                current = None;
            }
        }
    }
}

/// Render `layout` to a complete PDF document in memory.
pub fn render_pdf(layout: &Layout, page_size: PageSize, compress: bool) -> Result<Vec<u8>, ScribeError> {
    let mut canvas = PdfCanvas::new(page_size);
    render_layout(layout, &mut canvas);
    let bytes = canvas.finish(compress)?;
    debug!("Rendered {} pages → {} bytes", layout.pages, bytes.len());
    Ok(bytes)
}

/// A [`Canvas`] producing a PDF with the standard Helvetica fonts.
pub struct PdfCanvas {
    page_size: PageSize,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    font: Font,
    font_size: f32,
}

impl PdfCanvas {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Vec::new(),
            font: Font::Regular,
            font_size: 10.0,
        }
    }

    /// Assemble the document and serialise it. The last page is always
    /// emitted, even when nothing was drawn on it.
    pub fn finish(mut self, compress: bool) -> Result<Vec<u8>, ScribeError> {
        let last = std::mem::take(&mut self.current);
        self.pages.push(last);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }.encode()?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                self.page_size.width.into(),
                self.page_size.height.into(),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id: ObjectId = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Contacts"),
            "Producer" => Object::string_literal(concat!("contactscribe ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        if compress {
            doc.compress();
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| ScribeError::RenderFailed(e.to_string()))?;
        Ok(buf)
    }
}

impl Canvas for PdfCanvas {
    fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.font_size = size;
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![self.font.resource_name().into(), self.font_size.into()],
            ),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.current.extend([
            Operation::new("w", vec![0.5f32.into()]),
            Operation::new("m", vec![x1.into(), y1.into()]),
            Operation::new("l", vec![x2.into(), y2.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingCanvas {
        calls: Vec<String>,
    }

    impl Canvas for RecordingCanvas {
        fn set_font(&mut self, font: Font, size: f32) {
            self.calls.push(format!("font {} {size}", font.base_font()));
        }
        fn draw_string(&mut self, x: f32, y: f32, text: &str) {
            self.calls.push(format!("text {x} {y} {text}"));
        }
        fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
            self.calls.push(format!("line {x1} {y1} {x2} {y2}"));
        }
        fn new_page(&mut self) {
            self.calls.push("page".into());
        }
    }

    fn text(y: f32, s: &str, font: Font) -> DrawCommand {
        DrawCommand::Text {
            x: 40.0,
            y,
            text: s.into(),
            style: TextStyle { font, size: 10.0 },
        }
    }

    fn sample_layout() -> Layout {
        Layout {
            commands: vec![
                text(800.0, "Ana Gómez", Font::Bold),
                text(785.0, "Phone: 1", Font::Regular),
                text(773.0, "Email: a@b.c", Font::Regular),
                DrawCommand::Line {
                    x1: 40.0,
                    y1: 770.0,
                    x2: 555.0,
                    y2: 770.0,
                },
                DrawCommand::PageBreak,
                text(800.0, "Next", Font::Regular),
            ],
            pages: 2,
        }
    }

    #[test]
    fn replay_switches_font_only_on_change() {
        let mut canvas = RecordingCanvas::default();
        render_layout(&sample_layout(), &mut canvas);
        assert_eq!(
            canvas.calls,
            vec![
                "font Helvetica-Bold 10",
                "text 40 800 Ana Gómez",
                "font Helvetica 10",
                "text 40 785 Phone: 1",
                "text 40 773 Email: a@b.c",
                "line 40 770 555 770",
                "page",
                "font Helvetica 10",
                "text 40 800 Next",
            ]
        );
    }

    #[test]
    fn pdf_has_one_page_per_break_plus_one() {
        let bytes = render_pdf(&sample_layout(), PageSize::A4, true).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).expect("readable pdf");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn uncompressed_content_carries_win_ansi_text() {
        let bytes = render_pdf(&sample_layout(), PageSize::A4, false).unwrap();
        let needle = b"Ana G\xF3mez";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
        assert!(bytes.windows(14).any(|w| w == b"Helvetica-Bold"));
    }

    #[test]
    fn empty_layout_still_has_a_page() {
        let bytes = render_pdf(&Layout::default(), PageSize::A4, true).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
