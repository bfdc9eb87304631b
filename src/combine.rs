//! Per-page artifact naming, cleanup of a previous run, and merging pages into one
//! document.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const ARTIFACT_PREFIX: &str = "labels";
pub const COMBINED_FILE_NAME: &str = "combined_labels.pdf";

static ARTIFACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^labels-(\d+)-(\d+)\.(\w+)$").unwrap());

/// `labels-<labels_per_sheet>-<page>.<ext>`, e.g. `labels-30-02.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub labels_per_sheet: usize,
    pub page: usize,
    pub extension: String,
}

impl ArtifactName {
    pub fn new(labels_per_sheet: usize, page: usize, extension: &str) -> Self {
        Self {
            labels_per_sheet,
            page,
            extension: extension.to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{ARTIFACT_PREFIX}-{}-{:02}.{}",
            self.labels_per_sheet, self.page, self.extension
        )
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Inverse of [`ArtifactName::file_name`]; `None` for anything else.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = ARTIFACT_RE.captures(file_name)?;
        Some(Self {
            labels_per_sheet: caps[1].parse().ok()?,
            page: caps[2].parse().ok()?,
            extension: caps[3].to_string(),
        })
    }
}

/// Page artifacts in `dir` with extension `ext`, ordered by page number. Directory
/// iteration order plays no part.
pub fn page_artifacts(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut found: Vec<(usize, usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(artifact) = ArtifactName::parse(name)
            && artifact.extension == ext
        {
            found.push((artifact.page, artifact.labels_per_sheet, path));
        }
    }
    found.sort();
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}

/// Deletes page artifacts and the combined document left by an earlier run.
/// A missing directory or no matching files is not an error.
pub fn clean_up_artifacts(dir: &Path) -> Result<usize> {
    let mut stale = page_artifacts(dir, "pdf")?;
    stale.extend(page_artifacts(dir, "svg")?);
    let combined = dir.join(COMBINED_FILE_NAME);
    if combined.is_file() {
        stale.push(combined);
    }

    let mut deleted = 0;
    for path in stale {
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                deleted += 1;
            }
            Err(err) => error!("Error deleting {}: {err}", path.display()),
        }
    }
    Ok(deleted)
}

/// Concatenates the page PDFs of `dir`, in page order, into [`COMBINED_FILE_NAME`].
#[cfg(feature = "pdf")]
pub fn combine_pdfs(dir: &Path) -> Result<PathBuf> {
    let pages = page_artifacts(dir, "pdf")?;
    let documents = pages
        .iter()
        .map(|path| {
            lopdf::Document::load(path)
                .map_err(|err| anyhow::anyhow!("failed to read {}: {err}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut combined = merge_documents(documents)?;
    let output = dir.join(COMBINED_FILE_NAME);
    combined.save(&output)?;
    info!("Writing {}...", output.display());
    Ok(output)
}

/// Appends the pages of every document, in order, under a fresh page tree.
#[cfg(feature = "pdf")]
pub fn merge_documents(documents: Vec<lopdf::Document>) -> Result<lopdf::Document> {
    use lopdf::{Document, Object, ObjectId, dictionary};

    let mut merged = Document::with_version("1.5");
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut max_id = 1;

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;
        page_ids.extend(doc.get_pages().into_values());
        for (id, object) in doc.objects {
            if matches!(object_type(&object), Some(b"Catalog") | Some(b"Pages")) {
                continue;
            }
            merged.objects.insert(id, object);
        }
    }

    merged.max_id = max_id;
    let pages_id = merged.new_object_id();
    for page_id in &page_ids {
        if let Some(Object::Dictionary(page)) = merged.objects.get_mut(page_id) {
            page.set("Parent", pages_id);
        }
    }
    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);
    merged.compress();
    Ok(merged)
}

#[cfg(feature = "pdf")]
fn object_type(object: &lopdf::Object) -> Option<&[u8]> {
    match object {
        lopdf::Object::Dictionary(dict) => dict.get(b"Type").ok()?.as_name().ok(),
        _ => None,
    }
}
