//! Branded PDF report rendering via `printpdf`.
//!
//! The renderer is a pure function of the diagnosis record plus the
//! timestamp handed in by the caller — identical inputs produce identical
//! bytes. XMP metadata (which carries a random document ID) and ICC profile
//! embedding are disabled to keep output stable across runs.

use chrono::{DateTime, Local};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::io::BufWriter;

use crate::diagnosis::Diagnosis;

// ── Defaults for partially-filled report requests ──

pub const DEFAULT_SUBJECT: &str = "Unknown Plant";
pub const DEFAULT_CONDITION: &str = "Healthy";
pub const DEFAULT_ADVICE: &str = "No specific treatment required.";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const HEADER_BAND_MM: f32 = 40.0;
const ADVICE_WRAP_CHARS: usize = 90;

const REPORT_TITLE: &str = "LEAFSCAN PLANT HEALTH REPORT";
const REPORT_SUBTITLE: &str = "AI-Powered Plant & Vegetable Diagnosis";
const SERVICE_LABEL: &str = "LeafScan Cloud Service";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),
    #[error("PDF write error: {0}")]
    Write(String),
}

/// Two-tone status policy: the condition renders in the safe color when it
/// is empty or a healthy/none sentinel (case-insensitive), otherwise in the
/// warning color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Safe,
    Warning,
}

pub fn status_tone(condition: &str) -> StatusTone {
    let normalized = condition.trim().to_lowercase();
    if normalized.is_empty() || normalized == "none" || normalized == "healthy" {
        StatusTone::Safe
    } else {
        StatusTone::Warning
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn header_color() -> Color {
    rgb(46, 204, 113)
}

fn body_color() -> Color {
    rgb(44, 62, 80)
}

fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Safe => rgb(39, 174, 96),
        StatusTone::Warning => rgb(231, 76, 60),
    }
}

/// Suggested attachment filename, derived from the subject. Non-alphanumeric
/// characters are flattened to `_` so the name survives Content-Disposition.
pub fn report_filename(subject: &str) -> String {
    let mut stem: String = subject
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        stem.push_str("Plant");
    }
    format!("LeafScan_Report_{stem}.pdf")
}

/// Render the single-page report and return its bytes.
pub fn render_report(
    diagnosis: &Diagnosis,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    // Identical input must yield identical layout bytes: skip XMP metadata
    // and ICC profile embedding, and pin the first trailer /ID component
    // (the second is freshly randomized on every save).
    let doc = doc
        .with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }))
        .with_document_id(REPORT_TITLE.to_string());

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Font(e.to_string()))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);

    // Full-width header band
    layer.set_fill_color(header_color());
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(0.0), Mm(PAGE_HEIGHT_MM)), false),
            (Point::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM)), false),
            (
                Point::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM - HEADER_BAND_MM)),
                false,
            ),
            (
                Point::new(Mm(0.0), Mm(PAGE_HEIGHT_MM - HEADER_BAND_MM)),
                false,
            ),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });

    // Title + subtitle, light-on-green
    layer.set_fill_color(rgb(255, 255, 255));
    layer.use_text(REPORT_TITLE, 22.0, Mm(20.0), Mm(276.0), &bold);
    layer.use_text(REPORT_SUBTITLE, 10.0, Mm(20.0), Mm(267.0), &font);

    // Subject
    layer.set_fill_color(body_color());
    layer.use_text(
        format!("Analysis Results for: {}", diagnosis.subject),
        16.0,
        Mm(20.0),
        Mm(240.0),
        &bold,
    );

    // Status line, colored by the two-tone policy
    layer.set_fill_color(rgb(0, 0, 0));
    layer.use_text("Current Status:", 12.0, Mm(20.0), Mm(224.0), &bold);
    layer.set_fill_color(tone_color(status_tone(&diagnosis.condition)));
    layer.use_text(&diagnosis.condition, 12.0, Mm(70.0), Mm(224.0), &font);

    // Advice, wrapped; long text continues on a fresh page instead of
    // running off the sheet
    layer.set_fill_color(body_color());
    layer.use_text(
        "Recommended Treatment / Advice:",
        12.0,
        Mm(20.0),
        Mm(208.0),
        &bold,
    );
    layer.set_fill_color(rgb(50, 50, 50));
    let mut y = Mm(200.0);
    for line in wrap_text(&diagnosis.advice, ADVICE_WRAP_CHARS) {
        if y < Mm(22.0) {
            let (page, overflow_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(overflow_layer);
            layer.set_fill_color(rgb(50, 50, 50));
            y = Mm(280.0);
        }
        layer.use_text(&line, 11.0, Mm(20.0), y, &font);
        y -= Mm(6.0);
    }

    // Footer
    layer.set_fill_color(rgb(128, 128, 128));
    layer.use_text(
        format!(
            "Report generated on: {} | {}",
            generated_at.format("%Y-%m-%d %H:%M"),
            SERVICE_LABEL
        ),
        8.0,
        Mm(20.0),
        Mm(12.0),
        &italic,
    );

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Write(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ReportError::Write(e.to_string()))
}

/// Greedy word wrap at `max_chars` per line. Tokens longer than a full line
/// are hard-split so they cannot run off the page edge. Always yields at
/// least one (possibly empty) line so layout code never skips a section.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            let (head, tail) = word.split_at(split);
            lines.push(head.to_string());
            word = tail;
        }
        if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
