//! One run end to end: validate the sheet, clear the previous run, build and resolve
//! label records, lay them out, then write per-page artifacts and the combined document.

use crate::assets::AssetStore;
use crate::catalogue::Catalogue;
use crate::combine::{ArtifactName, clean_up_artifacts};
use crate::config::Config;
use crate::filter::{Selection, filter_catalogue};
use crate::geometry::SheetGeometry;
use crate::label::{LabelRecord, VisualContent};
use crate::layout::{PageBatch, layout_pages};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_page_svg, write_page_svg};
use crate::symbols::LabelKind;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateReport {
    pub pages: usize,
    /// Positioned labels, repeats included.
    pub labels: usize,
    /// Labels dropped because their artwork was missing.
    pub skipped: usize,
    /// Requested set codes the catalogue does not know.
    pub unknown: Vec<String>,
    /// Per-page files in page order.
    pub artifacts: Vec<PathBuf>,
    pub combined: Option<PathBuf>,
}

struct Records {
    labels: Vec<LabelRecord>,
    unknown: Vec<String>,
}

pub struct LabelGenerator<'a> {
    config: Config,
    catalogue: &'a dyn Catalogue,
    assets: AssetStore,
    dump_layout: Option<PathBuf>,
}

impl<'a> LabelGenerator<'a> {
    pub fn new(config: Config, catalogue: &'a dyn Catalogue) -> Self {
        let assets = AssetStore::from_config(&config.assets);
        Self {
            config,
            catalogue,
            assets,
            dump_layout: None,
        }
    }

    /// Also write the computed pages as JSON to `path`.
    pub fn with_layout_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_layout = Some(path.into());
        self
    }

    /// Runs the pipeline. `set_codes` narrows a [`LabelKind::Sets`] run to exactly
    /// those sets and is ignored for the other kinds.
    pub fn generate(&self, set_codes: &[String]) -> Result<GenerateReport> {
        let geometry = SheetGeometry::from_config(&self.config.sheet)
            .context("invalid sheet configuration")?;
        self.config
            .render
            .validate()
            .context("invalid render configuration")?;
        debug!(
            "Sheet pitch {:.2} x {:.2}, {} labels per sheet",
            geometry.delta_x, geometry.delta_y, geometry.labels_per_sheet
        );

        let output_dir = &self.config.render.output_dir;
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;
        clean_up_artifacts(output_dir)?;

        let records = self.build_records(set_codes);
        let resolved = self.assets.resolve_all(records.labels);
        let pages = layout_pages(&resolved.labels, &geometry, self.config.render.repeat);

        let mut report = GenerateReport {
            pages: pages.len(),
            labels: pages.iter().map(PageBatch::len).sum(),
            skipped: resolved.skipped,
            unknown: records.unknown,
            ..GenerateReport::default()
        };

        if pages.is_empty() {
            warn!("No labels to print");
        }
        for batch in &pages {
            report.artifacts.extend(self.write_page(batch, &geometry)?);
        }

        #[cfg(feature = "pdf")]
        if !pages.is_empty() {
            report.combined = Some(crate::combine::combine_pdfs(output_dir)?);
        }

        if let Some(path) = &self.dump_layout {
            write_layout_dump(path, &geometry, &pages)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote layout dump to {}", path.display());
        }

        Ok(report)
    }

    fn write_page(&self, batch: &PageBatch, geometry: &SheetGeometry) -> Result<Vec<PathBuf>> {
        let render = &self.config.render;
        let output_dir = &render.output_dir;
        let per_sheet = geometry.labels_per_sheet;

        let svg = render_page_svg(batch, geometry, &self.config.theme, render.outline);
        let svg_path = ArtifactName::new(per_sheet, batch.number, "svg").path_in(output_dir);
        write_page_svg(&svg, &svg_path)?;
        self.assets.stage(batch, output_dir)?;

        #[allow(unused_mut)]
        let mut written = vec![svg_path];

        #[cfg(feature = "pdf")]
        {
            let pdf_path = ArtifactName::new(per_sheet, batch.number, "pdf").path_in(output_dir);
            crate::render::write_page_pdf(&svg, &pdf_path, output_dir, geometry, render)?;
            written.push(pdf_path);
        }

        Ok(written)
    }

    fn build_records(&self, set_codes: &[String]) -> Records {
        match self.config.render.kind {
            LabelKind::Sets => self.set_records(set_codes),
            kind => {
                let labels = kind.static_labels();
                self.fetch_glyphs(&labels);
                Records {
                    labels,
                    unknown: Vec::new(),
                }
            }
        }
    }

    fn set_records(&self, set_codes: &[String]) -> Records {
        let catalogue = match self.catalogue.sets() {
            Ok(records) => records,
            Err(err) => {
                error!("Error occurred while fetching set data: {err:#}");
                Vec::new()
            }
        };

        let selection = Selection::from_request(&self.config.filter, set_codes);
        let outcome = filter_catalogue(&catalogue, &selection);
        if !outcome.unknown.is_empty() {
            warn!("Unknown sets: {}", outcome.unknown.join(", "));
        }
        info!(
            "Selected {} of {} sets",
            outcome.selected.len(),
            catalogue.len()
        );

        // The catalogue lists the newest set first; labels start with the oldest.
        let mut selected = outcome.selected;
        selected.reverse();

        self.assets
            .fetch_all(self.catalogue, selected.iter().map(|set| set.icon_uri.as_str()));

        Records {
            labels: selected.iter().map(|set| set.to_label()).collect(),
            unknown: outcome.unknown,
        }
    }

    /// Downloads the symbol artwork for glyphs not yet in the cache.
    fn fetch_glyphs(&self, labels: &[LabelRecord]) {
        let missing: BTreeSet<&str> = labels
            .iter()
            .filter_map(|label| match &label.content {
                VisualContent::Glyphs(glyphs) => Some(glyphs),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .filter(|glyph| !self.assets.glyph_path(glyph).is_file())
            .collect();
        if missing.is_empty() {
            return;
        }

        let symbols = match self.catalogue.symbols() {
            Ok(symbols) => symbols,
            Err(err) => {
                error!("Error occurred while fetching symbol data: {err:#}");
                return;
            }
        };
        let uris: Vec<&str> = symbols
            .iter()
            .filter(|symbol| {
                let glyph = symbol.symbol.trim_start_matches('{').trim_end_matches('}');
                missing.contains(glyph)
            })
            .filter_map(|symbol| symbol.svg_uri.as_deref())
            .collect();
        let fetched = self.assets.fetch_all(self.catalogue, uris);
        debug!("Fetched {fetched} of {} missing symbols", missing.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{CatalogueRecord, SymbolRecord};
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct FakeCatalogue {
        symbols: Vec<SymbolRecord>,
        downloads: RefCell<Vec<String>>,
    }

    impl Catalogue for FakeCatalogue {
        fn sets(&self) -> Result<Vec<CatalogueRecord>> {
            Ok(Vec::new())
        }

        fn symbols(&self) -> Result<Vec<SymbolRecord>> {
            Ok(self.symbols.clone())
        }

        fn download(&self, uri: &str) -> Result<Vec<u8>> {
            self.downloads.borrow_mut().push(uri.to_string());
            Ok(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec())
        }
    }

    fn config(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.render.output_dir = root.join("out");
        config.assets.cache_dir = root.join("cache");
        config.assets.icons_dir = root.join("icons");
        config
    }

    #[test]
    fn rejects_bad_sheet_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.sheet.labels_per_sheet = 25;
        let catalogue = FakeCatalogue::default();
        let err = LabelGenerator::new(config, &catalogue)
            .generate(&[])
            .unwrap_err();
        assert!(format!("{err:#}").contains("25"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn non_finite_offset_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.sheet.offset_y = f32::NAN;
        let catalogue = FakeCatalogue::default();
        let err = LabelGenerator::new(config, &catalogue)
            .generate(&[])
            .unwrap_err();
        assert!(format!("{err:#}").contains("offset"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn bad_render_scale_fails_before_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("labels-30-01.svg"), "<svg/>").unwrap();

        let mut config = config(dir.path());
        config.render.units_per_inch = 0.0;
        let catalogue = FakeCatalogue::default();
        let err = LabelGenerator::new(config, &catalogue)
            .generate(&[])
            .unwrap_err();
        assert!(format!("{err:#}").contains("units per inch"));
        assert!(out.join("labels-30-01.svg").is_file());
    }

    #[test]
    fn downloads_only_missing_glyphs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.render.kind = LabelKind::Cost;
        fs::create_dir_all(dir.path().join("cache")).unwrap();
        for glyph in ["0", "1", "2", "3", "4", "5", "6", "7"] {
            fs::write(dir.path().join("cache").join(format!("{glyph}.svg")), "<svg/>").unwrap();
        }
        let catalogue = FakeCatalogue {
            symbols: ["{X}", "{7}", "{T}"]
                .iter()
                .map(|symbol| SymbolRecord {
                    symbol: symbol.to_string(),
                    svg_uri: Some(format!(
                        "https://svgs.example/card-symbols/{}.svg",
                        symbol.trim_matches(['{', '}'])
                    )),
                })
                .collect(),
            ..FakeCatalogue::default()
        };
        let generator = LabelGenerator::new(config, &catalogue);
        generator.fetch_glyphs(&LabelKind::Cost.static_labels());

        assert_eq!(
            *catalogue.downloads.borrow(),
            vec!["https://svgs.example/card-symbols/X.svg".to_string()]
        );
        assert!(dir.path().join("cache").join("X.svg").is_file());
    }
}
