use crate::geometry::SheetGeometry;
use crate::label::VisualContent;
use crate::layout::{PageBatch, PositionedLabel};
use crate::text_metrics::fit_font_size;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Renders one sheet. Icons are referenced by file name, relative to the page.
pub fn render_page_svg(
    batch: &PageBatch,
    geometry: &SheetGeometry,
    theme: &Theme,
    outline: bool,
) -> String {
    let width = geometry.width;
    let height = geometry.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" \
         xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{:.1}mm\" height=\"{:.1}mm\" viewBox=\"0 0 {width} {height}\">",
        width / 10.0,
        height / 10.0,
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for placed in &batch.labels {
        svg.push_str(&label_svg(placed, geometry, theme, outline));
    }

    svg.push_str("</svg>");
    svg
}

fn label_svg(
    placed: &PositionedLabel,
    geometry: &SheetGeometry,
    theme: &Theme,
    outline: bool,
) -> String {
    let label = &placed.label;
    let (x, y) = (placed.x, placed.y);
    let mut out = String::new();
    out.push_str(&format!("<g class=\"label\" transform=\"translate({x:.2} {y:.2})\">"));

    if outline {
        out.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{r}\" ry=\"{r}\" \
             fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            geometry.label_width,
            geometry.label_height,
            theme.outline_stroke,
            theme.outline_stroke_width,
            r = theme.outline_radius,
        ));
    }

    let has_icons = !label.icon_paths.is_empty();
    let center_y = geometry.label_height / 2.0;
    match &label.content {
        VisualContent::Glyphs(_) if has_icons => {
            out.push_str(&glyphs_svg(&label.icon_paths, center_y, theme));
        }
        VisualContent::Icon(_) if has_icons => {
            let size = theme.icon_size;
            let icon_x = (theme.icon_column_width - size) / 2.0;
            out.push_str(&image_svg(&label.icon_paths[0], icon_x, center_y - size / 2.0, size));
        }
        _ => {}
    }

    let text_left = if has_icons {
        theme.icon_column_width
    } else {
        theme.text_padding
    };
    let text_x = text_left + label.title.x_offset;
    let max_text_width = (geometry.label_width - text_x - theme.text_padding).max(1.0);
    let preferred = label.title.font_size.unwrap_or(theme.title_font_size);
    let font_size = fit_font_size(
        &label.title.text,
        preferred,
        theme.min_title_font_size,
        max_text_width,
        &theme.font_family,
    );
    let weight = label
        .title
        .font_weight
        .as_deref()
        .unwrap_or(&theme.title_font_weight);
    let fill = label.title.fill.as_deref().unwrap_or(&theme.title_fill);

    let baseline = match label.caption {
        Some(_) => center_y - font_size * 0.1,
        None => center_y + font_size * 0.35,
    };
    let title_y = baseline + label.title.y_offset;
    out.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{title_y:.2}\" font-family=\"{}\" \
         font-size=\"{font_size:.1}\" font-weight=\"{weight}\" fill=\"{fill}\">{}</text>",
        escape_xml(&theme.font_family),
        escape_xml(&label.title.text)
    ));

    if let Some(caption) = &label.caption {
        let caption_y = center_y + theme.caption_font_size * 1.2;
        out.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{caption_y:.2}\" font-family=\"{}\" \
             font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.caption_font_size,
            theme.caption_fill,
            escape_xml(caption)
        ));
    }

    out.push_str("</g>");
    out
}

/// Glyphs sit side by side, shrinking when there are too many for the icon column.
fn glyphs_svg(paths: &[std::path::PathBuf], center_y: f32, theme: &Theme) -> String {
    let count = paths.len() as f32;
    let available = theme.icon_column_width - theme.glyph_gap * 2.0;
    let size = theme
        .glyph_size
        .min((available - theme.glyph_gap * (count - 1.0)) / count)
        .max(1.0);
    let total = size * count + theme.glyph_gap * (count - 1.0);
    let mut glyph_x = (theme.icon_column_width - total) / 2.0;
    let mut out = String::new();
    for path in paths {
        out.push_str(&image_svg(path, glyph_x, center_y - size / 2.0, size));
        glyph_x += size + theme.glyph_gap;
    }
    out
}

fn image_svg(path: &Path, x: f32, y: f32, size: f32) -> String {
    let href = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "<image x=\"{x:.2}\" y=\"{y:.2}\" width=\"{size:.2}\" height=\"{size:.2}\" \
         href=\"{0}\" xlink:href=\"{0}\"/>",
        escape_xml(&href)
    )
}

pub fn write_page_svg(svg: &str, output: &Path) -> Result<()> {
    info!("Writing {}...", output.display());
    std::fs::write(output, svg)?;
    Ok(())
}

/// Writes one page PDF in the configured [`PdfMode`](crate::config::PdfMode).
/// Relative image hrefs resolve against `resources_dir`.
#[cfg(feature = "pdf")]
pub fn write_page_pdf(
    svg: &str,
    output: &Path,
    resources_dir: &Path,
    geometry: &SheetGeometry,
    render_cfg: &crate::config::RenderConfig,
) -> Result<()> {
    use crate::config::PdfMode;

    info!("Writing {}...", output.display());
    match render_cfg.pdf_mode {
        PdfMode::Vector => write_vector_pdf(svg, output, resources_dir),
        PdfMode::Raster => write_raster_pdf(svg, output, resources_dir, geometry, render_cfg),
    }
}

/// Converts the page with svg2pdf. Text and outlines stay sharp at any zoom.
#[cfg(feature = "pdf")]
fn write_vector_pdf(svg: &str, output: &Path, resources_dir: &Path) -> Result<()> {
    use svg2pdf::usvg;

    let mut opt = usvg::Options {
        resources_dir: Some(resources_dir.to_path_buf()),
        ..usvg::Options::default()
    };
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    // The page is sized in mm; keep the DPI usvg resolved it with so the PDF matches.
    let mut page = svg2pdf::PageOptions::default();
    page.dpi = opt.dpi;
    let bytes = svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), page)
        .map_err(|err| anyhow::anyhow!("Failed to convert page to PDF: {err:?}"))?;
    std::fs::write(output, bytes)?;
    Ok(())
}

/// Rasterizes `svg` and wraps the image in a single-page PDF sized to the sheet.
#[cfg(feature = "pdf")]
fn write_raster_pdf(
    svg: &str,
    output: &Path,
    resources_dir: &Path,
    geometry: &SheetGeometry,
    render_cfg: &crate::config::RenderConfig,
) -> Result<()> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut opt = usvg::Options {
        resources_dir: Some(resources_dir.to_path_buf()),
        ..usvg::Options::default()
    };
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.raster_scale;
    let pixel_width = (geometry.width * scale).round() as u32;
    let pixel_height = (geometry.height * scale).round() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixel_width, pixel_height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    let size = tree.size();
    let transform = resvg::tiny_skia::Transform::from_scale(
        pixel_width as f32 / size.width(),
        pixel_height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // Opaque white background, so dropping alpha leaves plain RGB.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let points_per_unit = 72.0 / render_cfg.units_per_inch;
    let page_width = geometry.width * points_per_unit;
    let page_height = geometry.height * points_per_unit;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => pixel_width as i64,
            "Height" => pixel_height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        rgb,
    ));
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    page_width.into(),
                    Object::Integer(0),
                    Object::Integer(0),
                    page_height.into(),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            page_width.into(),
            page_height.into(),
        ],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::label::{LabelRecord, Title};
    use crate::layout::layout_pages;
    use crate::symbols::alphabetical_labels;
    use std::path::PathBuf;

    fn geometry() -> SheetGeometry {
        SheetGeometry::from_config(&SheetConfig::default()).unwrap()
    }

    #[test]
    fn renders_every_label_of_the_batch() {
        let geometry = geometry();
        let pages = layout_pages(&alphabetical_labels(), &geometry, true);
        let svg = render_page_svg(&pages[0], &geometry, &Theme::classic(), false);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"label\"").count(), 30);
        assert_eq!(svg.matches(">A-D</text>").count(), 5);
        assert!(svg.contains("viewBox=\"0 0 2160 2790\""));
        assert!(!svg.contains("stroke=\"#9A9A9A\""));
    }

    #[test]
    fn outline_draws_one_frame_per_label() {
        let geometry = geometry();
        let pages = layout_pages(&alphabetical_labels(), &geometry, false);
        let svg = render_page_svg(&pages[0], &geometry, &Theme::classic(), true);
        assert_eq!(svg.matches("fill=\"none\" stroke=").count(), 6);
    }

    #[test]
    fn glyph_labels_reference_icons_by_file_name() {
        let geometry = geometry();
        let mut label = LabelRecord::with_symbol(Title::new("Azorius"), "{W}{U}");
        label.icon_paths = vec![PathBuf::from("/cache/W.svg"), PathBuf::from("/cache/U.svg")];
        let pages = layout_pages(&[label], &geometry, false);
        let svg = render_page_svg(&pages[0], &geometry, &Theme::classic(), false);
        assert!(svg.contains("href=\"W.svg\""));
        assert!(svg.contains("href=\"U.svg\""));
        assert!(!svg.contains("/cache/"));
    }

    #[test]
    fn escapes_titles_and_captions() {
        let geometry = geometry();
        let label = LabelRecord::text("Fire & Lightning").with_caption("<PD2>");
        let pages = layout_pages(&[label], &geometry, false);
        let svg = render_page_svg(&pages[0], &geometry, &Theme::classic(), false);
        assert!(svg.contains("Fire &amp; Lightning"));
        assert!(svg.contains("&lt;PD2&gt;"));
    }

    #[test]
    fn glyphs_shrink_to_fit_the_icon_column() {
        let theme = Theme::classic();
        let paths: Vec<PathBuf> = ["0", "1", "2", "3"]
            .iter()
            .map(|g| PathBuf::from(format!("{g}.svg")))
            .collect();
        let svg = glyphs_svg(&paths, 100.0, &theme);
        assert_eq!(svg.matches("<image").count(), 4);
        assert!(!svg.contains(&format!("width=\"{:.2}\"", theme.glyph_size)));
    }

    #[cfg(feature = "pdf")]
    fn write_single_page(mode: crate::config::PdfMode) -> lopdf::Document {
        let geometry = geometry();
        let pages = layout_pages(&alphabetical_labels(), &geometry, false);
        let svg = render_page_svg(&pages[0], &geometry, &Theme::classic(), true);
        let render_cfg = crate::config::RenderConfig {
            pdf_mode: mode,
            ..crate::config::RenderConfig::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels-30-01.pdf");
        write_page_pdf(&svg, &path, dir.path(), &geometry, &render_cfg).unwrap();
        lopdf::Document::load(&path).unwrap()
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn vector_page_embeds_no_page_image() {
        let doc = write_single_page(crate::config::PdfMode::Vector);
        assert_eq!(doc.get_pages().len(), 1);
        let has_image = doc.objects.values().any(|object| {
            object
                .as_stream()
                .ok()
                .and_then(|stream| stream.dict.get(b"Subtype").ok())
                .and_then(|subtype| subtype.as_name().ok())
                == Some(&b"Image"[..])
        });
        assert!(!has_image);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn raster_page_is_sized_in_points() {
        let doc = write_single_page(crate::config::PdfMode::Raster);
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        assert!((width - 2160.0 * 72.0 / 254.0).abs() < 0.01);
    }
}
