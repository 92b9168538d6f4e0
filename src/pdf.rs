use std::io::BufWriter;

use printpdf::*;

use crate::analytics::{monthly_totals, overall_totals};
use crate::error::{MedlogError, Result};
use crate::fmt::{clip, rupees};
use crate::models::VisitEntry;

// US Letter dimensions (mm)
const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 8.5;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

impl Col {
    /// Characters that fit in the column at FONT_SIZE.
    fn max_chars(&self) -> usize {
        (self.width / (FONT_SIZE * 0.18)) as usize
    }
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| MedlogError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| MedlogError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, title: &str, owner: &str, generated: &str) {
        self.text(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        if !owner.is_empty() {
            self.text(owner, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        self.text(generated, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            let value = clip(value, col.max_chars());
            match col.align {
                Align::Left => self.text(&value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(&value, FONT_SIZE);
                    self.text(&value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        self.table_row(cols, headers, true);
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H * 3.0);
        self.text(label, MARGIN_LEFT, SUBTITLE_SIZE, true);
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| MedlogError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| MedlogError::Pdf(e.to_string()))
    }
}

/// Render the visit register followed by a monthly summary.
pub fn render_visits(entries: &[VisitEntry], owner: &str, generated: &str) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Hospital Visit Records")?;
    pdf.header("Hospital Visit Records", owner, generated);

    let cols = &[
        Col { width: 20.0, align: Align::Left },
        Col { width: 40.0, align: Align::Left },
        Col { width: 30.0, align: Align::Left },
        Col { width: 30.0, align: Align::Left },
        Col { width: 19.3, align: Align::Right },
        Col { width: 19.3, align: Align::Right },
        Col { width: 19.2, align: Align::Right },
    ];
    pdf.table_header(
        cols,
        &["Date", "Hospital", "Doctor", "Patient", "Hospital Rs", "Medicine Rs", "Total Rs"],
    );

    for e in entries {
        let date = e.visit_day().format("%Y-%m-%d").to_string();
        let hospital = rupees(e.hospital_rs);
        let medicine = rupees(e.medicine_rs);
        let total = rupees(e.total_rs());
        pdf.table_row(
            cols,
            &[&date, &e.hospital_name, &e.doctor_name, &e.patient_name, &hospital, &medicine, &total],
            false,
        );
    }

    let totals = overall_totals(entries);
    pdf.separator();
    let count = format!("{} entries", totals.entries);
    let hospital = rupees(totals.hospital_rs);
    let medicine = rupees(totals.medicine_rs);
    let total = rupees(totals.total);
    pdf.table_row(cols, &["Total", &count, "", "", &hospital, &medicine, &total], true);

    let months = monthly_totals(entries);
    if !months.is_empty() {
        pdf.blank_row();
        pdf.section_label("Monthly Totals");
        let mcols = &[
            Col { width: 60.0, align: Align::Left },
            Col { width: 39.3, align: Align::Right },
            Col { width: 39.3, align: Align::Right },
            Col { width: 39.2, align: Align::Right },
        ];
        pdf.table_header(mcols, &["Month", "Hospital Rs", "Medicine Rs", "Total Rs"]);
        for m in &months {
            let hospital = rupees(m.hospital_rs);
            let medicine = rupees(m.medicine_rs);
            let total = rupees(m.total);
            pdf.table_row(mcols, &[&m.label, &hospital, &medicine, &total], false);
        }
    }

    pdf.to_bytes()
}
