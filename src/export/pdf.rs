use super::ExportResult;
use crate::entry::{DATE_FORMAT, ScheduleEntry};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};
use std::ops::Range;

pub const TITLE: &str = "Study Schedule";
pub const HEADERS: [&str; 7] = ["Date", "Session", "Course", "Code", "Lesson", "Teacher", "Notes"];
pub const MAX_CELL_CHARS: usize = 40;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP_MARGIN: f32 = 20.0;
const BOTTOM_MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 24.0;
const TITLE_SPACE_AFTER: f32 = 18.0;
const HEADER_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 9.0;
const HEADER_ROW_HEIGHT: f32 = 10.0;
const BODY_ROW_HEIGHT: f32 = 7.0;
const GRID_THICKNESS: f32 = 1.0;
const CELL_PADDING: f32 = 1.0;
// Column widths in mm (0.9", 0.8", 1.2", 0.8", 1.3", 1.0", 1.5").
const COLUMN_WIDTHS: [f32; 7] = [22.86, 20.32, 30.48, 20.32, 33.02, 25.4, 38.1];
// Rough Helvetica advance width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;
const PT_TO_MM: f32 = 0.352_778;

const TITLE_COLOR: (u8, u8, u8) = (0x1F, 0x47, 0x88);
const HEADER_TEXT: (u8, u8, u8) = (0xF5, 0xF5, 0xF5);
const BODY_TEXT: (u8, u8, u8) = (0x00, 0x00, 0x00);
const ROW_BANDS: [(u8, u8, u8); 2] = [(0xFF, 0xFF, 0xFF), (0xD3, 0xD3, 0xD3)];
const GRID_COLOR: (u8, u8, u8) = (0x00, 0x00, 0x00);

/// First `MAX_CELL_CHARS` characters plus "..." when longer; verbatim otherwise.
pub fn truncate_cell(text: &str) -> String {
    if text.chars().count() > MAX_CELL_CHARS {
        let head: String = text.chars().take(MAX_CELL_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Line breaks and tabs collapse to single spaces; a table cell is one line.
fn flatten(text: &str) -> String {
    text.split(['\r', '\n', '\t'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body cells of the PDF table, one row per entry in the given order.
pub fn pdf_table_rows(entries: &[ScheduleEntry]) -> Vec<[String; 7]> {
    entries
        .iter()
        .map(|entry| {
            [
                entry.study_date.format(DATE_FORMAT).to_string(),
                entry.session.to_string(),
                flatten(&entry.course_name),
                flatten(&entry.course_code),
                truncate_cell(&flatten(entry.lesson.as_deref().unwrap_or_default())),
                flatten(&entry.teacher),
                truncate_cell(&flatten(entry.notes.as_deref().unwrap_or_default())),
            ]
        })
        .collect()
}

/// Body rows drawn on each page, in order.
///
/// Every page starts with the header row and the first page also carries the
/// title, so an empty table still yields one page.
pub fn page_layout(row_count: usize) -> Vec<Range<usize>> {
    let first_top = PAGE_HEIGHT - TOP_MARGIN - TITLE_SIZE * PT_TO_MM - TITLE_SPACE_AFTER;
    let mut pages = Vec::new();
    let mut page_start = 0;
    let mut cursor = first_top - HEADER_ROW_HEIGHT;

    for row in 0..row_count {
        if cursor - BODY_ROW_HEIGHT < BOTTOM_MARGIN {
            pages.push(page_start..row);
            page_start = row;
            cursor = PAGE_HEIGHT - TOP_MARGIN - HEADER_ROW_HEIGHT;
        }
        cursor -= BODY_ROW_HEIGHT;
    }
    pages.push(page_start..row_count);
    pages
}

/// Renders entries as an A4 document: centered title, then a banded table
/// whose header row repeats on every page.
pub fn to_pdf(entries: &[ScheduleEntry]) -> ExportResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };
    let rows = pdf_table_rows(entries);

    for (page_no, range) in page_layout(rows.len()).into_iter().enumerate() {
        let mut cursor = PAGE_HEIGHT - TOP_MARGIN;
        let canvas = if page_no == 0 {
            let canvas = doc.get_page(page).get_layer(layer);
            draw_title(&canvas, &fonts, cursor);
            cursor -= TITLE_SIZE * PT_TO_MM + TITLE_SPACE_AFTER;
            canvas
        } else {
            new_page(&doc)
        };

        draw_header(&canvas, &fonts, cursor);
        cursor -= HEADER_ROW_HEIGHT;
        for idx in range {
            draw_body_row(&canvas, &fonts, cursor, &rows[idx], ROW_BANDS[idx % ROW_BANDS.len()]);
            cursor -= BODY_ROW_HEIGHT;
        }
    }

    Ok(doc.save_to_bytes()?)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    doc.get_page(page).get_layer(layer)
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn table_left() -> f32 {
    (PAGE_WIDTH - COLUMN_WIDTHS.iter().sum::<f32>()) / 2.0
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH * PT_TO_MM
}

/// Clips `text` with "..." so it fits a column of `width` mm.
fn fit_to_column(text: &str, width: f32, size: f32) -> String {
    let usable = (width - 2.0 * CELL_PADDING).max(0.0);
    let max_chars = (usable / (size * AVG_GLYPH_WIDTH * PT_TO_MM)) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

fn draw_title(canvas: &PdfLayerReference, fonts: &Fonts, top: f32) {
    let baseline = top - TITLE_SIZE * PT_TO_MM;
    let x = ((PAGE_WIDTH - text_width(TITLE, TITLE_SIZE)) / 2.0).max(0.0);
    canvas.set_fill_color(rgb(TITLE_COLOR));
    canvas.use_text(TITLE, TITLE_SIZE, Mm(x), Mm(baseline), &fonts.bold);
}

fn draw_header(canvas: &PdfLayerReference, fonts: &Fonts, top: f32) {
    let cells = HEADERS.map(str::to_string);
    draw_row(
        canvas,
        RowStyle {
            top,
            height: HEADER_ROW_HEIGHT,
            background: TITLE_COLOR,
            text_color: HEADER_TEXT,
            font: &fonts.bold,
            font_size: HEADER_SIZE,
        },
        &cells,
    );
}

fn draw_body_row(
    canvas: &PdfLayerReference,
    fonts: &Fonts,
    top: f32,
    cells: &[String; 7],
    band: (u8, u8, u8),
) {
    draw_row(
        canvas,
        RowStyle {
            top,
            height: BODY_ROW_HEIGHT,
            background: band,
            text_color: BODY_TEXT,
            font: &fonts.regular,
            font_size: BODY_SIZE,
        },
        cells,
    );
}

struct RowStyle<'a> {
    top: f32,
    height: f32,
    background: (u8, u8, u8),
    text_color: (u8, u8, u8),
    font: &'a IndirectFontRef,
    font_size: f32,
}

fn draw_row(canvas: &PdfLayerReference, style: RowStyle<'_>, cells: &[String; 7]) {
    let left = table_left();
    let right = left + COLUMN_WIDTHS.iter().sum::<f32>();
    let bottom = style.top - style.height;

    canvas.set_fill_color(rgb(style.background));
    canvas.add_rect(
        Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(style.top)).with_mode(PaintMode::Fill),
    );

    canvas.set_fill_color(rgb(style.text_color));
    let baseline = bottom + (style.height - style.font_size * PT_TO_MM) / 2.0 + 0.8;
    let mut x = left;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        let text = fit_to_column(cell, width, style.font_size);
        let offset = ((width - text_width(&text, style.font_size)) / 2.0).max(CELL_PADDING);
        canvas.use_text(text, style.font_size, Mm(x + offset), Mm(baseline), style.font);
        x += width;
    }

    canvas.set_outline_color(rgb(GRID_COLOR));
    canvas.set_outline_thickness(GRID_THICKNESS);
    for y in [style.top, bottom] {
        canvas.add_line(segment((left, y), (right, y)));
    }
    let mut x = left;
    canvas.add_line(segment((x, bottom), (x, style.top)));
    for width in COLUMN_WIDTHS {
        x += width;
        canvas.add_line(segment((x, bottom), (x, style.top)));
    }
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    }
}
