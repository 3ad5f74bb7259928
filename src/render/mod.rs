pub mod layout;
pub mod metrics;

use crate::config::Orientation;
use crate::error::{Error, Result};
use crate::table::Table;
use chrono::{DateTime, Local};
use layout::{RowPlan, TablePlan};
use metrics::{text_width, wrap_text};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use std::io::BufWriter;
use tracing::debug;

/// Timestamp format shared by both footer segments.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%y, %H:%M:%S";

/// Fixed header/footer inputs, computed once per run. The per-session title
/// is stamped on with [`RenderMeta::with_title`].
#[derive(Debug, Clone)]
pub struct RenderMeta {
    pub title: String,
    pub session_date_label: Option<String>,
    pub printed_at: DateTime<Local>,
    pub modified_at: DateTime<Local>,
}

impl RenderMeta {
    pub fn with_title(&self, title: &str) -> RenderMeta {
        RenderMeta {
            title: title.to_string(),
            ..self.clone()
        }
    }
}

/// Footer content as a function of the run metadata, so callers compose
/// footers instead of subclassing the renderer.
pub type FooterProvider = Box<dyn Fn(&RenderMeta) -> Option<String>>;

/// The stock footer: enabled segments joined by ", ", or no footer at all.
pub fn footer_from_toggles(show_print_date: bool, show_modified_time: bool) -> FooterProvider {
    Box::new(move |meta| {
        let mut segments = Vec::new();
        if show_print_date {
            segments.push(format!("printed {}", meta.printed_at.format(TIMESTAMP_FORMAT)));
        }
        if show_modified_time {
            segments.push(format!(
                "data modified {}",
                meta.modified_at.format(TIMESTAMP_FORMAT)
            ));
        }
        if segments.is_empty() {
            None
        } else {
            Some(segments.join(", "))
        }
    })
}

// US Letter, in points.
const LETTER_PORTRAIT: (f64, f64) = (612.0, 792.0);

const MARGIN: f64 = 40.0;
const TITLE_SIZE: f64 = 24.0;
const LABEL_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 12.0;
const EXTRA_SIZE: f64 = 10.0;
const FOOTER_SIZE: f64 = 8.0;
const HEADER_GAP: f64 = 20.0;
const ROW_HEIGHT: f64 = 20.0;
const EXTRA_LINE_HEIGHT: f64 = 13.0;
const EXTRA_PAD: f64 = 5.0;
const ROW_BASELINE: f64 = 6.0;
const FOOTER_ZONE: f64 = 16.0;
const BAND_GRAY: f64 = 200.0 / 255.0;

fn mm(pt: f64) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Renders one session table to a single PDF document.
pub struct Renderer {
    orientation: Orientation,
    extra_columns: Vec<String>,
    footer: FooterProvider,
}

impl Renderer {
    pub fn new(
        orientation: Orientation,
        extra_columns: Vec<String>,
        footer: FooterProvider,
    ) -> Self {
        Renderer {
            orientation,
            extra_columns,
            footer,
        }
    }

    /// Produce the PDF bytes for one session. Fails on zero-row sessions
    /// and on projections with no normal columns left; a blank roster is
    /// never worth printing.
    pub fn render(&self, session: &Table, meta: &RenderMeta) -> Result<Vec<u8>> {
        if session.is_empty() {
            return Err(Error::EmptySession(meta.title.clone()));
        }
        let plan = layout::plan_table(session, &self.extra_columns)?;
        let footer_text = (self.footer)(meta);

        let (page_w, page_h) = match self.orientation {
            Orientation::Portrait => LETTER_PORTRAIT,
            Orientation::Landscape => (LETTER_PORTRAIT.1, LETTER_PORTRAIT.0),
        };

        let (doc, page_idx, layer_idx) =
            PdfDocument::new(meta.title.as_str(), mm(page_w), mm(page_h), "Layer 1");

        let regular = builtin(&doc, BuiltinFont::Helvetica)?;
        let bold = builtin(&doc, BuiltinFont::HelveticaBold)?;
        let italic = builtin(&doc, BuiltinFont::HelveticaOblique)?;

        let mut writer = PageWriter {
            doc: &doc,
            layer: doc.get_page(page_idx).get_layer(layer_idx),
            regular,
            bold,
            italic,
            page_w,
            page_h,
            y: page_h - MARGIN,
            footer_text,
            columns: plan.columns.clone(),
        };

        writer.draw_footer();
        writer.draw_title_block(meta);
        writer.draw_table(&plan);

        debug!(title = %meta.title, rows = plan.rows.len(), "rendered session pdf");

        let mut buffer = BufWriter::new(Vec::new());
        doc.save(&mut buffer).map_err(|e| Error::Pdf(e.to_string()))?;
        buffer
            .into_inner()
            .map_err(|e| Error::Pdf(e.to_string()))
    }
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| Error::Pdf(e.to_string()))
}

/// Cursor over the current page; owns the flow-and-paginate rules.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    page_w: f64,
    page_h: f64,
    y: f64,
    footer_text: Option<String>,
    columns: Vec<String>,
}

impl PageWriter<'_> {
    fn content_width(&self) -> f64 {
        self.page_w - 2.0 * MARGIN
    }

    fn column_width(&self) -> f64 {
        self.content_width() / self.columns.len() as f64
    }

    fn floor(&self) -> f64 {
        MARGIN + if self.footer_text.is_some() {
            FOOTER_ZONE
        } else {
            0.0
        }
    }

    /// Start a continuation page: fresh cursor, footer, repeated header row.
    fn new_page(&mut self) {
        let (page_idx, layer_idx) =
            self.doc
                .add_page(mm(self.page_w), mm(self.page_h), "Layer 1");
        self.layer = self.doc.get_page(page_idx).get_layer(layer_idx);
        self.y = self.page_h - MARGIN;
        self.draw_footer();
        self.draw_header_row();
    }

    fn set_black(&self) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    fn draw_footer(&self) {
        let Some(text) = &self.footer_text else { return };
        self.set_black();
        let x = self.page_w - MARGIN - text_width(text, FOOTER_SIZE);
        self.layer
            .use_text(text.clone(), FOOTER_SIZE, mm(x), mm(MARGIN - FOOTER_SIZE), &self.italic);
    }

    fn centered(&self, text: &str, size: f64, font: &IndirectFontRef, y: f64) {
        let x = (self.page_w - text_width(text, size)) / 2.0;
        self.layer.use_text(text.to_string(), size, mm(x), mm(y), font);
    }

    fn draw_title_block(&mut self, meta: &RenderMeta) {
        self.set_black();
        self.y -= TITLE_SIZE;
        self.centered(&meta.title, TITLE_SIZE, &self.regular, self.y);
        if let Some(label) = &meta.session_date_label {
            self.y -= LABEL_SIZE + 6.0;
            self.centered(label, LABEL_SIZE, &self.regular, self.y);
        }
        self.y -= HEADER_GAP;
    }

    fn hline(&self, y: f64) {
        let rule = Line {
            points: vec![
                (Point::new(mm(MARGIN), mm(y)), false),
                (Point::new(mm(self.page_w - MARGIN), mm(y)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        };
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.75);
        self.layer.add_shape(rule);
    }

    fn band(&self, y_top: f64, height: f64) {
        let (x1, x2) = (MARGIN, self.page_w - MARGIN);
        let (y1, y2) = (y_top - height, y_top);
        let fill = Line {
            points: vec![
                (Point::new(mm(x1), mm(y1)), false),
                (Point::new(mm(x2), mm(y1)), false),
                (Point::new(mm(x2), mm(y2)), false),
                (Point::new(mm(x1), mm(y2)), false),
            ],
            is_closed: true,
            has_fill: true,
            has_stroke: false,
            is_clipping_path: false,
        };
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(BAND_GRAY, BAND_GRAY, BAND_GRAY, None)));
        self.layer.add_shape(fill);
    }

    /// One line of cell text, centered per column.
    fn cell_row(&self, texts: &[String], font: &IndirectFontRef, y_baseline: f64) {
        self.set_black();
        let col_w = self.column_width();
        for (i, text) in texts.iter().enumerate() {
            let cell_x = MARGIN + i as f64 * col_w;
            let x = cell_x + (col_w - text_width(text, BODY_SIZE)) / 2.0;
            self.layer
                .use_text(text.clone(), BODY_SIZE, mm(x), mm(y_baseline), font);
        }
    }

    fn draw_header_row(&mut self) {
        self.cell_row(&self.columns, &self.bold, self.y - ROW_HEIGHT + ROW_BASELINE);
        self.y -= ROW_HEIGHT;
        self.hline(self.y);
    }

    /// Height the row needs, spanning content included, so a parent row and
    /// its overflow never split across pages.
    fn row_height(&self, row: &RowPlan) -> (f64, Vec<String>) {
        match &row.extra {
            None => (ROW_HEIGHT, Vec::new()),
            Some(extra) => {
                let lines = wrap_text(extra, EXTRA_SIZE, self.content_width() - 2.0 * EXTRA_PAD);
                let extra_h = lines.len() as f64 * EXTRA_LINE_HEIGHT + EXTRA_PAD;
                (ROW_HEIGHT + extra_h, lines)
            }
        }
    }

    fn draw_table(&mut self, plan: &TablePlan) {
        self.draw_header_row();

        for row in &plan.rows {
            let (height, extra_lines) = self.row_height(row);
            if self.y - height < self.floor() {
                self.hline(self.y);
                self.new_page();
            }

            if row.shaded {
                self.band(self.y, height);
            }
            self.cell_row(&row.cells, &self.regular, self.y - ROW_HEIGHT + ROW_BASELINE);
            self.y -= ROW_HEIGHT;

            if !extra_lines.is_empty() {
                self.set_black();
                for line in &extra_lines {
                    self.y -= EXTRA_LINE_HEIGHT;
                    self.layer.use_text(
                        line.clone(),
                        EXTRA_SIZE,
                        mm(MARGIN + EXTRA_PAD),
                        mm(self.y + (EXTRA_LINE_HEIGHT - EXTRA_SIZE) / 2.0),
                        &self.italic,
                    );
                }
                self.y -= EXTRA_PAD;
            }
        }
        self.hline(self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use chrono::TimeZone;

    fn meta() -> RenderMeta {
        RenderMeta {
            title: "A Roster".to_string(),
            session_date_label: Some("03/09/2026".to_string()),
            printed_at: Local.with_ymd_and_hms(2026, 3, 9, 8, 30, 0).unwrap(),
            modified_at: Local.with_ymd_and_hms(2026, 3, 8, 17, 0, 0).unwrap(),
        }
    }

    fn session(rows: usize) -> Table {
        let mut table = Table::new(vec!["Name".into(), "Class".into(), "Notes".into()]);
        for i in 0..rows {
            table.push_row(vec![
                Cell::Text(format!("Student {i}")),
                Cell::Text("A".into()),
                if i % 2 == 0 {
                    Cell::Text("brings own equipment".into())
                } else {
                    Cell::Missing
                },
            ]);
        }
        table
    }

    fn renderer(extra: Vec<String>) -> Renderer {
        Renderer::new(Orientation::Portrait, extra, footer_from_toggles(true, true))
    }

    #[test]
    fn renders_a_pdf() {
        let bytes = renderer(vec![]).render(&session(3), &meta()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn extended_mode_renders_too() {
        let bytes = renderer(vec!["Notes".into()])
            .render(&session(3), &meta())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_sessions_paginate() {
        let short = renderer(vec![]).render(&session(3), &meta()).unwrap();
        let long = renderer(vec![]).render(&session(90), &meta()).unwrap();
        let pages = |bytes: &[u8]| {
            bytes
                .windows(b"/Type /Page".len())
                .filter(|w| **w == b"/Type /Page"[..])
                .count()
        };
        assert!(pages(&long) > pages(&short));
    }

    #[test]
    fn zero_row_session_is_fatal() {
        let empty = Table::new(vec!["Name".into()]);
        let err = renderer(vec![]).render(&empty, &meta()).unwrap_err();
        assert!(matches!(err, Error::EmptySession(t) if t == "A Roster"));
    }

    #[test]
    fn footer_toggles_control_segments() {
        let meta = meta();
        let both = footer_from_toggles(true, true)(&meta).unwrap();
        assert_eq!(
            both,
            "printed 03/09/26, 08:30:00, data modified 03/08/26, 17:00:00"
        );

        let print_only = footer_from_toggles(true, false)(&meta).unwrap();
        assert_eq!(print_only, "printed 03/09/26, 08:30:00");
        assert!(!print_only.contains("modified"));

        assert!(footer_from_toggles(false, false)(&meta).is_none());
    }
}
