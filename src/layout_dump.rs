use crate::geometry::SheetGeometry;
use crate::label::VisualContent;
use crate::layout::PageBatch;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub geometry: SheetGeometry,
    pub label_count: usize,
    pub pages: Vec<PageDump>,
}

#[derive(Debug, Serialize)]
pub struct PageDump {
    pub number: usize,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub title: String,
    pub content: String,
    pub caption: Option<String>,
    pub x: f32,
    pub y: f32,
    pub column: usize,
    pub row: usize,
    pub icons: Vec<String>,
}

impl LayoutDump {
    pub fn from_pages(geometry: &SheetGeometry, pages: &[PageBatch]) -> Self {
        let pages: Vec<PageDump> = pages
            .iter()
            .map(|batch| PageDump {
                number: batch.number,
                labels: batch
                    .labels
                    .iter()
                    .map(|placed| LabelDump {
                        title: placed.label.title.text.clone(),
                        content: describe_content(&placed.label.content),
                        caption: placed.label.caption.clone(),
                        x: placed.x,
                        y: placed.y,
                        column: placed.slot.column_index,
                        row: placed.slot.row_index,
                        icons: placed
                            .label
                            .icon_paths
                            .iter()
                            .map(|path| path.display().to_string())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        LayoutDump {
            geometry: *geometry,
            label_count: pages.iter().map(|page| page.labels.len()).sum(),
            pages,
        }
    }
}

fn describe_content(content: &VisualContent) -> String {
    match content {
        VisualContent::Glyphs(glyphs) => glyphs.iter().map(|g| format!("{{{g}}}")).collect(),
        VisualContent::Icon(name) => name.clone(),
        VisualContent::None => String::new(),
    }
}

pub fn write_layout_dump(
    path: &Path,
    geometry: &SheetGeometry,
    pages: &[PageBatch],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_pages(geometry, pages);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
