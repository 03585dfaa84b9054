use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::Document;

/// One listing entry: metadata plus the saved page it points to.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub company: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    pub path: PathBuf,
}

pub fn read_entries(path: &Path) -> Result<Vec<ManifestEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse manifest {:?}", path))?;
    Ok(entries)
}

/// Load every listed page. Repeated URLs keep their first entry; unreadable
/// pages are logged and skipped.
pub fn load(path: &Path) -> Result<Vec<Document>> {
    let entries = read_entries(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let total = entries.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut docs = Vec::with_capacity(total);
    for entry in entries {
        if !seen.insert(entry.url.clone()) {
            continue;
        }
        let file = if entry.path.is_absolute() {
            entry.path.clone()
        } else {
            base.join(&entry.path)
        };
        match std::fs::read_to_string(&file) {
            Ok(html) => docs.push(Document {
                company: entry.company,
                url: entry.url,
                category: entry.category,
                html,
            }),
            Err(e) => warn!(url = %entry.url, file = ?file, "Skipping document: {}", e),
        }
    }

    info!(
        "Manifest {:?}: {} entries, {} unique, {} loaded",
        path,
        total,
        seen.len(),
        docs.len()
    );
    Ok(docs)
}
