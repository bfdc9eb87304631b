//! Layout and pagination of labels on a sheet.
//!
//! Positions are derived from the flat label index: a label's page, column and row
//! are `index / N`, `(index % N) / rows` and `(index % N) % rows`. Column wrap and page
//! wrap therefore can never drift apart from the batch boundaries.
//!
//! This module does no I/O; asset resolution happens before records reach it.

use crate::geometry::SheetGeometry;
use crate::label::LabelRecord;
use serde::Serialize;

/// Where on which sheet a label lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSlot {
    pub page_index: usize,
    pub column_index: usize,
    pub row_index: usize,
}

impl GridSlot {
    pub fn for_index(index: usize, geometry: &SheetGeometry) -> Self {
        let per_page = geometry.labels_per_sheet;
        let rows = geometry.rows();
        let within_page = index % per_page;
        Self {
            page_index: index / per_page,
            column_index: within_page / rows,
            row_index: within_page % rows,
        }
    }

    pub fn position(&self, geometry: &SheetGeometry) -> (f32, f32) {
        (
            geometry.start_x + self.column_index as f32 * geometry.delta_x,
            geometry.start_y + self.row_index as f32 * geometry.delta_y,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedLabel {
    pub label: LabelRecord,
    pub x: f32,
    pub y: f32,
    pub slot: GridSlot,
}

/// Labels destined for one physical sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBatch {
    /// 1-based, matches the page number in artifact names.
    pub number: usize,
    pub labels: Vec<PositionedLabel>,
}

impl PageBatch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Layout cursor for one run. Owned by [`compute_layout`] and never shared.
struct Cursor<'a> {
    geometry: &'a SheetGeometry,
    placed: usize,
}

impl<'a> Cursor<'a> {
    fn new(geometry: &'a SheetGeometry) -> Self {
        Self { geometry, placed: 0 }
    }

    fn place(&mut self, label: LabelRecord) -> PositionedLabel {
        let slot = GridSlot::for_index(self.placed, self.geometry);
        let (x, y) = slot.position(self.geometry);
        self.placed += 1;
        PositionedLabel { label, x, y, slot }
    }
}

/// Assigns every record a position, in input order.
///
/// With `repeat` set and a partially filled last sheet, the whole input is cycled
/// again from the top until the last sheet is exactly full. The final repetition is
/// cut short rather than spilling onto another sheet.
pub fn compute_layout(
    records: &[LabelRecord],
    geometry: &SheetGeometry,
    repeat: bool,
) -> Vec<PositionedLabel> {
    let mut cursor = Cursor::new(geometry);
    let mut positioned: Vec<PositionedLabel> = records
        .iter()
        .cloned()
        .map(|record| cursor.place(record))
        .collect();

    if repeat && !records.is_empty() {
        let target = fill_target(positioned.len(), geometry.labels_per_sheet);
        for record in records.iter().cycle().take(target - positioned.len()) {
            positioned.push(cursor.place(record.clone()));
        }
    }

    positioned
}

/// Smallest multiple of `per_page` that holds `count` labels.
fn fill_target(count: usize, per_page: usize) -> usize {
    count.div_ceil(per_page) * per_page
}

/// Groups positioned labels into sheets of `labels_per_sheet`, preserving order.
/// Every batch but the last is full.
pub fn paginate(positioned: Vec<PositionedLabel>, geometry: &SheetGeometry) -> Vec<PageBatch> {
    let per_page = geometry.labels_per_sheet;
    let mut batches: Vec<PageBatch> = Vec::new();
    for label in positioned {
        match batches.last_mut() {
            Some(batch) if batch.labels.len() < per_page => batch.labels.push(label),
            _ => batches.push(PageBatch {
                number: batches.len() + 1,
                labels: vec![label],
            }),
        }
    }
    batches
}

/// [`compute_layout`] followed by [`paginate`].
pub fn layout_pages(
    records: &[LabelRecord],
    geometry: &SheetGeometry,
    repeat: bool,
) -> Vec<PageBatch> {
    paginate(compute_layout(records, geometry, repeat), geometry)
}
