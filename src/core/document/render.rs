use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};
use log::debug;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Px, Rect, Rgb,
};

use crate::error::{ReportError, Result};

use super::layout::{Op, Page, PageGeometry};
use super::{Block, ImageSource, MM_PER_INCH, NBSP};

const IMAGE_DPI: f32 = 300.0;
const JPEG_QUALITY: u8 = 90;
const RULE_THICKNESS_PT: f32 = 1.0;

fn gray(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

/// Draw laid-out pages into a PDF and return its bytes
pub(super) fn render_pdf(
    geometry: &PageGeometry,
    pages: &[Page],
    blocks: &[Block],
    title: &str,
) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(geometry.width), Mm(geometry.height), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::document(format!("font error: {}", e)))?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(geometry.width), Mm(geometry.height), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };

        for op in &page.ops {
            draw_op(&layer, &font, op, blocks)?;
        }
        debug!("Rendered page {} ({} ops)", index + 1, page.ops.len());
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::document(format!("PDF serialization error: {}", e)))
}

fn draw_op(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    op: &Op,
    blocks: &[Block],
) -> Result<()> {
    match op {
        Op::Text {
            x,
            y,
            size_pt,
            text,
        } => {
            layer.set_fill_color(gray(0.0));
            // Builtin fonts only carry WinAnsi glyphs
            let text: String = text.chars().map(|c| if c == NBSP { ' ' } else { c }).collect();
            layer.use_text(text, *size_pt, Mm(*x), Mm(*y), font);
        }
        Op::Rule { from, to } => {
            layer.set_outline_color(gray(0.0));
            layer.set_outline_thickness(RULE_THICKNESS_PT);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), Mm(from.1)), false),
                    (Point::new(Mm(to.0), Mm(to.1)), false),
                ],
                is_closed: false,
            });
        }
        Op::Fill {
            x,
            y,
            width,
            height,
            gray: level,
        } => {
            layer.set_fill_color(gray(*level));
            layer.add_rect(
                Rect::new(Mm(*x), Mm(*y), Mm(x + width), Mm(y + height))
                    .with_mode(PaintMode::Fill),
            );
        }
        Op::Image {
            block,
            x,
            y,
            width,
            height,
        } => {
            let source = match blocks.get(*block) {
                Some(Block::Image { source, .. }) => source,
                _ => return Err(ReportError::document("image op without image block")),
            };
            let decoded = decode(source)?;
            let natural_w = decoded.width() as f32 / IMAGE_DPI * MM_PER_INCH;
            let natural_h = decoded.height() as f32 / IMAGE_DPI * MM_PER_INCH;

            Image::from(jpeg_xobject(&decoded)?).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(Mm(*y)),
                    scale_x: Some(width / natural_w),
                    scale_y: Some(height / natural_h),
                    dpi: Some(IMAGE_DPI),
                    ..Default::default()
                },
            );
        }
    }
    Ok(())
}

/// DCT-compressed image object; raw pixels would embed at full size
fn jpeg_xobject(image: &RgbImage) -> Result<ImageXObject> {
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY)
        .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .map_err(|e| ReportError::document(format!("cannot encode image: {}", e)))?;

    Ok(ImageXObject {
        width: Px(image.width() as usize),
        height: Px(image.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: encoded,
        image_filter: Some(ImageFilter::DCT),
        smask: None,
        clipping_bbox: None,
    })
}

/// Decode to RGB; alpha channels are flattened
fn decode(source: &ImageSource) -> Result<RgbImage> {
    let image = match source {
        ImageSource::File(path) => image::open(path).map_err(|e| {
            ReportError::document(format!("cannot read image {}: {}", path.display(), e))
        })?,
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes)
            .map_err(|e| ReportError::document(format!("cannot decode image: {}", e)))?,
    };
    if image.width() == 0 || image.height() == 0 {
        return Err(ReportError::document("image has no pixels"));
    }
    Ok(image.to_rgb8())
}
