//! Printable card document rendering.
//!
//! [`render_document`] turns a normalized [`ContactCard`] into a
//! [`Document`]: a fixed 85×55 mm page described as an ordered list of
//! drawing operations, ready for a print backend. Two templates exist: the
//! styled `custom` layout and a minimal left-aligned fallback. Malformed
//! embedded images are logged and skipped; rendering always completes.

pub mod image;

use tracing::warn;

use crate::card::ContactCard;

pub use image::ImageFormat;

/// Card width in millimeters.
pub const CARD_WIDTH_MM: f32 = 85.0;

/// Card height in millimeters.
pub const CARD_HEIGHT_MM: f32 = 55.0;

/// An RGB color.
pub type Rgb = (u8, u8, u8);

const BACKGROUND: Rgb = (28, 28, 60);
const TEXT: Rgb = (255, 255, 255);
const LIGHT: Rgb = (200, 200, 200);
const INK: Rgb = (30, 30, 30);

/// Approximate character budget of the 60 mm centered column at 9 pt.
const CENTER_COLUMN_CHARS: usize = 38;

/// Approximate character budget of the 65 mm fallback column at 12 pt.
const FALLBACK_COLUMN_CHARS: usize = 34;

/// Card template identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    /// Styled layout: dark background, centered identity block, optional
    /// logo and QR code at fixed positions.
    #[default]
    Custom,
    /// Plain fallback: left-aligned stacked lines.
    Minimal,
}

impl Template {
    /// Parse a template identifier.
    ///
    /// Unrecognized identifiers fall back to [`Template::Minimal`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "custom" => Self::Custom,
            _ => Self::Minimal,
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom => write!(f, "custom"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Anchored at the x coordinate.
    Left,
    /// Centered on the x coordinate.
    Center,
}

/// One drawing operation on the card page.
///
/// Coordinates and dimensions are in millimeters from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A filled rectangle.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Fill color.
        fill: Rgb,
    },
    /// A line of text.
    Text {
        /// Anchor x coordinate (see `align`).
        x: f32,
        /// Baseline y coordinate.
        y: f32,
        /// The text to draw.
        text: String,
        /// Font size in points.
        size_pt: f32,
        /// Text color.
        color: Rgb,
        /// Bold weight.
        bold: bool,
        /// Horizontal alignment relative to x.
        align: Align,
    },
    /// An embedded raster image.
    Image {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Decoded image format.
        format: ImageFormat,
        /// Raw image bytes.
        data: Vec<u8>,
    },
}

/// Document metadata, mirrored into the output file's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Document title.
    pub title: String,
    /// Document subject.
    pub subject: String,
    /// Document author.
    pub author: String,
    /// Keyword list.
    pub keywords: String,
}

/// A rendered, fixed-size printable card.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Page width in millimeters.
    pub width_mm: f32,
    /// Page height in millimeters.
    pub height_mm: f32,
    /// Document metadata.
    pub info: DocumentInfo,
    /// Drawing operations, in paint order.
    pub ops: Vec<DrawOp>,
}

/// Render a card into a printable document using the given template.
#[must_use]
pub fn render_document(card: &ContactCard, template: Template) -> Document {
    let ops = match template {
        Template::Custom => custom_ops(card),
        Template::Minimal => minimal_ops(card),
    };

    Document {
        width_mm: CARD_WIDTH_MM,
        height_mm: CARD_HEIGHT_MM,
        info: DocumentInfo {
            title: format!("Business card - {}", card.last_name),
            subject: "Professional business card".to_string(),
            author: card.full_name(),
            keywords: "business, card, contact".to_string(),
        },
        ops,
    }
}

/// The styled template: dark full-page background, centered identity block,
/// phone bottom-left, optional logo and QR code at fixed coordinates.
fn custom_ops(card: &ContactCard) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::Rect {
        x: 0.0,
        y: 0.0,
        width: CARD_WIDTH_MM,
        height: CARD_HEIGHT_MM,
        fill: BACKGROUND,
    }];

    if let Some(url) = &card.logo_url {
        push_image(&mut ops, url, 5.0, 5.0, 15.0, 15.0, "logo");
    }

    let full_name = format!(
        "{} {}",
        card.first_name.to_uppercase(),
        card.last_name.to_uppercase()
    );
    ops.push(DrawOp::Text {
        x: 42.5,
        y: 22.0,
        text: full_name,
        size_pt: 14.0,
        color: TEXT,
        bold: true,
        align: Align::Center,
    });
    ops.push(DrawOp::Text {
        x: 42.5,
        y: 30.0,
        text: card.profession.clone(),
        size_pt: 11.0,
        color: TEXT,
        bold: false,
        align: Align::Center,
    });

    let mut y = 38.0;
    for line in wrap_text(card.address.as_deref().unwrap_or(""), CENTER_COLUMN_CHARS) {
        ops.push(DrawOp::Text {
            x: 42.5,
            y,
            text: line,
            size_pt: 9.0,
            color: LIGHT,
            bold: false,
            align: Align::Center,
        });
        y += 4.0;
    }
    ops.push(DrawOp::Text {
        x: 42.5,
        y: 45.0,
        text: card.email.clone().unwrap_or_default(),
        size_pt: 9.0,
        color: LIGHT,
        bold: false,
        align: Align::Center,
    });
    ops.push(DrawOp::Text {
        x: 10.0,
        y: 53.0,
        text: card.phone.clone().unwrap_or_default(),
        size_pt: 9.0,
        color: LIGHT,
        bold: false,
        align: Align::Left,
    });

    if let Some(url) = &card.qr_code_url {
        push_image(&mut ops, url, 65.0, 36.0, 16.0, 16.0, "qr code");
    }

    ops
}

/// The fallback template: left-aligned stacked lines on a white page.
fn minimal_ops(card: &ContactCard) -> Vec<DrawOp> {
    let headline = match &card.title {
        Some(title) => format!("{title} {}", card.full_name()),
        None => card.full_name(),
    };

    let mut lines = vec![
        headline,
        card.profession.clone(),
        card.email.clone().unwrap_or_default(),
    ];
    lines.extend(wrap_text(
        card.address.as_deref().unwrap_or(""),
        FALLBACK_COLUMN_CHARS,
    ));

    let mut ops = Vec::new();
    let mut y = 20.0;
    for line in lines {
        ops.push(DrawOp::Text {
            x: 10.0,
            y,
            text: line,
            size_pt: 12.0,
            color: INK,
            bold: false,
            align: Align::Left,
        });
        y += 5.0;
    }
    ops
}

/// Decode and append an embedded image, or log and skip it.
///
/// A malformed payload must not block producing the document; the warning
/// is the only trace it leaves.
fn push_image(ops: &mut Vec<DrawOp>, url: &str, x: f32, y: f32, width: f32, height: f32, what: &str) {
    match image::decode_data_url(url) {
        Ok((format, data)) => ops.push(DrawOp::Image {
            x,
            y,
            width,
            height,
            format,
            data,
        }),
        Err(err) => warn!("skipping {} image: {}", what, err),
    }
}

/// Greedy word wrap to a fixed character budget per line.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
