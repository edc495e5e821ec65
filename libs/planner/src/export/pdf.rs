//! A4 PDF weekly report
//!
//! Layout is computed first as a list of text runs per page, in millimetres
//! from the top-left corner, then drawn with printpdf. Keeping the layout
//! pure lets pagination be tested without decoding PDF output.

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, Rgb};

use super::{ExportError, FOOTER_DOMAIN};
use crate::report::WeeklyReport;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP_MARGIN: f32 = 42.0;
const BOTTOM_MARGIN: f32 = 35.0;
const SET_COLUMNS_X: f32 = MARGIN_X + 40.0;
const ROW_HEIGHT: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tint {
    Slate,
    Muted,
    Blue,
}

/// One positioned string
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub tint: Tint,
}

struct Layout {
    pages: Vec<Vec<TextRun>>,
    y: f32,
}

impl Layout {
    fn new(report: &WeeklyReport) -> Self {
        let mut layout = Self {
            pages: Vec::new(),
            y: TOP_MARGIN,
        };
        layout.new_page(report);
        layout
    }

    fn new_page(&mut self, report: &WeeklyReport) {
        self.pages.push(Vec::new());
        self.y = TOP_MARGIN;
        self.push(MARGIN_X, 22.0, 18.0, FontStyle::Bold, Tint::Slate, "Weekly Training Report");
        self.push(MARGIN_X, 30.0, 11.0, FontStyle::Regular, Tint::Muted, &report.subtitle());
    }

    fn push(&mut self, x: f32, y: f32, size: f32, style: FontStyle, tint: Tint, text: &str) {
        if let Some(page) = self.pages.last_mut() {
            page.push(TextRun {
                text: text.to_string(),
                x,
                y,
                size,
                style,
                tint,
            });
        }
    }

    fn ensure_room(&mut self, report: &WeeklyReport, needed: f32) {
        if self.y + needed > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.new_page(report);
        }
    }
}

/// Compute every page's text runs, footers included
pub fn layout(report: &WeeklyReport) -> Vec<Vec<TextRun>> {
    let mut layout = Layout::new(report);

    for day in &report.days {
        layout.ensure_room(report, 0.0);
        let y = layout.y;
        layout.push(MARGIN_X + 10.0, y, 12.0, FontStyle::Bold, Tint::Blue, &day.title());
        layout.y += 6.0;

        if day.is_rest() {
            let y = layout.y + 2.0;
            layout.push(MARGIN_X + 20.0, y, 11.0, FontStyle::Italic, Tint::Slate, "Rest");
            layout.y += 14.0;
        }

        for entry in &day.entries {
            let mut cells = entry.set_cells();
            if cells.is_empty() {
                cells = vec!["—".to_string(); 3];
            }
            layout.ensure_room(report, ROW_HEIGHT * 2.0 + 10.0);

            let y = layout.y;
            layout.push(MARGIN_X + 8.0, y + 6.0, 11.0, FontStyle::Bold, Tint::Slate, &entry.name);

            let column_width = (PAGE_WIDTH - MARGIN_X * 2.0 - 40.0) / cells.len() as f32;
            for (idx, cell) in cells.iter().enumerate() {
                let x = SET_COLUMNS_X + column_width * idx as f32;
                layout.push(x, y + 4.0, 9.0, FontStyle::Regular, Tint::Blue, &format!("Set {}", idx + 1));
                layout.push(x, y + ROW_HEIGHT + 5.0, 10.0, FontStyle::Regular, Tint::Slate, cell);
            }
            layout.y += ROW_HEIGHT * 2.0 + 8.0;
        }

        layout.y += 6.0;
    }

    let total = layout.pages.len();
    for (idx, page) in layout.pages.iter_mut().enumerate() {
        let footer_y = PAGE_HEIGHT - 12.0;
        page.push(TextRun {
            text: format!("P. {} | {}", idx + 1, total),
            x: PAGE_WIDTH - MARGIN_X - 18.0,
            y: footer_y,
            size: 9.0,
            style: FontStyle::Regular,
            tint: Tint::Slate,
        });
        page.push(TextRun {
            text: FOOTER_DOMAIN.to_string(),
            x: MARGIN_X,
            y: footer_y,
            size: 9.0,
            style: FontStyle::Regular,
            tint: Tint::Slate,
        });
    }

    layout.pages
}

fn color(tint: Tint) -> Color {
    let (r, g, b) = match tint {
        Tint::Slate => (0x33, 0x41, 0x55),
        Tint::Muted => (0x64, 0x74, 0x8b),
        Tint::Blue => (0x3b, 0x82, 0xf6),
    };
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

/// Render the report to PDF bytes
pub fn render(report: &WeeklyReport) -> Result<Vec<u8>, ExportError> {
    let pages = layout(report);
    let title = format!("{} - Weekly Training Report", report.athlete_name());
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");

    let font = |font: BuiltinFont| {
        doc.add_builtin_font(font)
            .map_err(|e| ExportError::Pdf(e.to_string()))
    };
    let regular: IndirectFontRef = font(BuiltinFont::Helvetica)?;
    let bold: IndirectFontRef = font(BuiltinFont::HelveticaBold)?;
    let italic: IndirectFontRef = font(BuiltinFont::HelveticaOblique)?;

    for (idx, runs) in pages.iter().enumerate() {
        let (page, layer) = if idx == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", idx + 1))
        };
        let canvas = doc.get_page(page).get_layer(layer);

        for run in runs {
            let font = match run.style {
                FontStyle::Regular => &regular,
                FontStyle::Bold => &bold,
                FontStyle::Italic => &italic,
            };
            canvas.set_fill_color(color(run.tint));
            canvas.use_text(run.text.clone(), run.size, Mm(run.x), Mm(PAGE_HEIGHT - run.y), font);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{report::ReportEntry, workout::SetEntry};
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn entry(name: &str) -> ReportEntry {
        ReportEntry {
            name: name.to_string(),
            sets: vec![
                SetEntry {
                    reps: "5".to_string(),
                    weight: "100".to_string(),
                    ..Default::default()
                };
                4
            ],
        }
    }

    fn texts(page: &[TextRun]) -> Vec<&str> {
        page.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_empty_week_fits_on_one_page() {
        let report = WeeklyReport::build(Some("Jane"), Some("Doe"), None, monday(), monday(), &BTreeMap::new()).unwrap();
        let pages = layout(&report);

        assert_eq!(pages.len(), 1);
        let page = texts(&pages[0]);
        assert_eq!(page[0], "Weekly Training Report");
        assert_eq!(page.iter().filter(|t| **t == "Rest").count(), 7);
        assert!(page.contains(&"P. 1 | 1"));
        assert!(page.contains(&FOOTER_DOMAIN));
    }

    #[test]
    fn test_busy_week_paginates_with_headers_and_footers() {
        let mut scheduled = BTreeMap::new();
        for offset in 0..7 {
            let day = monday() + Duration::days(offset);
            scheduled.insert(day, (0..4).map(|i| entry(&format!("Lift {}", i))).collect());
        }
        let report = WeeklyReport::build(Some("Jane"), Some("Doe"), Some("Sam"), monday(), monday(), &scheduled).unwrap();
        let pages = layout(&report);

        assert!(pages.len() > 1);
        let total = pages.len();
        for (idx, page) in pages.iter().enumerate() {
            let page_texts = texts(page);
            assert_eq!(page_texts[0], "Weekly Training Report");
            assert!(page_texts.contains(&format!("P. {} | {}", idx + 1, total).as_str()));
            for run in page.iter().filter(|r| r.text.starts_with("Lift")) {
                assert!(run.y <= PAGE_HEIGHT - BOTTOM_MARGIN + ROW_HEIGHT);
            }
        }
        let lifts: usize = pages
            .iter()
            .map(|p| p.iter().filter(|r| r.text.starts_with("Lift")).count())
            .sum();
        assert_eq!(lifts, 28);
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let mut scheduled = BTreeMap::new();
        scheduled.insert(monday(), vec![entry("Bench Press")]);
        let report = WeeklyReport::build(Some("Jane"), Some("Doe"), None, monday(), monday(), &scheduled).unwrap();

        let bytes = render(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
