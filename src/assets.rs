//! Icon and glyph files behind label records.
//!
//! Resolution runs before layout: a label whose artwork is missing is dropped with a
//! warning instead of leaving an empty slot on the sheet.

use crate::catalogue::{Catalogue, icon_file_name};
use crate::config::AssetConfig;
use crate::error::AssetError;
use crate::label::{LabelRecord, VisualContent};
use crate::layout::PageBatch;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct AssetStore {
    cache_dir: PathBuf,
    icons_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct Resolved {
    pub labels: Vec<LabelRecord>,
    pub skipped: usize,
}

impl AssetStore {
    pub fn new(cache_dir: impl Into<PathBuf>, icons_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            icons_dir: icons_dir.into(),
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config.cache_dir.clone(), config.icons_dir.clone())
    }

    pub fn glyph_path(&self, glyph: &str) -> PathBuf {
        self.cache_dir.join(format!("{glyph}.svg"))
    }

    /// Bundled icons win over downloaded ones with the same name.
    pub fn icon_path(&self, name: &str) -> PathBuf {
        let local = self.icons_dir.join(name);
        if local.is_file() {
            local
        } else {
            self.cache_dir.join(name)
        }
    }

    /// Attaches the files behind `record`'s visual content.
    pub fn resolve(&self, mut record: LabelRecord) -> Result<LabelRecord, AssetError> {
        let paths = match &record.content {
            VisualContent::Glyphs(glyphs) => glyphs.iter().map(|g| self.glyph_path(g)).collect(),
            VisualContent::Icon(name) => vec![self.icon_path(name)],
            VisualContent::None => Vec::new(),
        };
        if let Some(missing) = paths.iter().find(|path| !path.is_file()) {
            return Err(AssetError::Missing {
                path: missing.clone(),
            });
        }
        record.icon_paths = paths;
        Ok(record)
    }

    /// Resolves every record, skipping (and logging) the ones with missing artwork.
    pub fn resolve_all(&self, records: Vec<LabelRecord>) -> Resolved {
        let mut resolved = Resolved::default();
        for record in records {
            let title = record.title.text.clone();
            match self.resolve(record) {
                Ok(record) => resolved.labels.push(record),
                Err(err) => {
                    warn!("Skipping label {title:?}: {err}");
                    resolved.skipped += 1;
                }
            }
        }
        resolved
    }

    /// Downloads `uri` into the cache unless a file of the same name is already there.
    pub fn fetch(&self, catalogue: &dyn Catalogue, uri: &str) -> anyhow::Result<PathBuf> {
        let path = self.cache_dir.join(icon_file_name(uri));
        if path.is_file() {
            debug!("Skipping download. File already exists: {uri}");
            return Ok(path);
        }
        fs::create_dir_all(&self.cache_dir)?;
        let bytes = catalogue.download(uri)?;
        fs::write(&path, bytes)?;
        debug!("Downloaded {uri} to {}", path.display());
        Ok(path)
    }

    /// Fetches every uri, logging failures. Returns how many files are available.
    pub fn fetch_all<'a>(
        &self,
        catalogue: &dyn Catalogue,
        uris: impl IntoIterator<Item = &'a str>,
    ) -> usize {
        let mut available = 0;
        for uri in uris {
            match self.fetch(catalogue, uri) {
                Ok(_) => available += 1,
                Err(err) => error!("Failed to download {uri}: {err:#}"),
            }
        }
        available
    }

    /// Copies the icons used on `batch` next to the page so relative hrefs resolve.
    pub fn stage(&self, batch: &PageBatch, output_dir: &Path) -> Result<usize, AssetError> {
        let sources: BTreeSet<&PathBuf> = batch
            .labels
            .iter()
            .flat_map(|placed| placed.label.icon_paths.iter())
            .collect();
        let mut copied = 0;
        for source in sources {
            let Some(name) = source.file_name() else {
                continue;
            };
            let target = output_dir.join(name);
            if target == *source || target.is_file() {
                continue;
            }
            fs::copy(source, &target).map_err(|err| AssetError::Stage {
                path: source.clone(),
                source: err,
            })?;
            copied += 1;
        }
        if copied > 0 {
            info!("Staged {copied} icons in {}", output_dir.display());
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::geometry::SheetGeometry;
    use crate::label::Title;
    use crate::layout::layout_pages;

    fn store(root: &Path) -> AssetStore {
        let cache = root.join("cache");
        let icons = root.join("icons");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&icons).unwrap();
        fs::write(cache.join("W.svg"), "<svg/>").unwrap();
        fs::write(cache.join("U.svg"), "<svg/>").unwrap();
        fs::write(icons.join("artifact.png"), [0u8; 4]).unwrap();
        AssetStore::new(cache, icons)
    }

    #[test]
    fn resolves_glyphs_and_icons() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let label = store
            .resolve(LabelRecord::with_symbol(Title::new("Azorius"), "{W}{U}"))
            .unwrap();
        assert_eq!(
            label.icon_paths,
            vec![store.glyph_path("W"), store.glyph_path("U")]
        );

        let label = store
            .resolve(LabelRecord::with_icon(Title::new("Artifact"), "artifact.png"))
            .unwrap();
        assert_eq!(label.icon_paths, vec![dir.path().join("icons").join("artifact.png")]);

        let label = store.resolve(LabelRecord::text("A-D")).unwrap();
        assert!(label.icon_paths.is_empty());
    }

    #[test]
    fn skips_labels_with_missing_artwork() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let resolved = store.resolve_all(vec![
            LabelRecord::with_symbol(Title::new("White"), "{W}"),
            LabelRecord::with_symbol(Title::new("Boros"), "{W}{R}"),
            LabelRecord::with_icon(Title::new("Creature"), "creature.png"),
            LabelRecord::text("A-D"),
        ]);
        let titles: Vec<&str> = resolved.labels.iter().map(|l| l.title.text.as_str()).collect();
        assert_eq!(titles, vec!["White", "A-D"]);
        assert_eq!(resolved.skipped, 2);
    }

    #[test]
    fn stages_each_icon_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let resolved = store.resolve_all(vec![
            LabelRecord::with_symbol(Title::new("White"), "{W}"),
            LabelRecord::with_symbol(Title::new("Azorius"), "{W}{U}"),
        ]);
        let geometry = SheetGeometry::from_config(&SheetConfig::default()).unwrap();
        let pages = layout_pages(&resolved.labels, &geometry, false);
        assert_eq!(store.stage(&pages[0], &out).unwrap(), 2);
        assert!(out.join("W.svg").is_file());
        assert!(out.join("U.svg").is_file());
        assert_eq!(store.stage(&pages[0], &out).unwrap(), 0);
    }
}
