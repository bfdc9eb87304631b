pub mod assets;
pub mod catalogue;
#[cfg(feature = "cli")]
pub mod cli;
pub mod combine;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod geometry;
pub mod label;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod symbols;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use generator::{GenerateReport, LabelGenerator};
pub use geometry::SheetGeometry;
pub use layout::{PageBatch, PositionedLabel, compute_layout, layout_pages, paginate};
