//! Bring a glyph directory from an earlier run up to the current naming.
//!
//! Older runs wrote some glyphs under descriptive names (`hash.png`,
//! `lbracket.png`) and, when copied through macOS, with decomposed (NFD)
//! Unicode filenames. [`rename_glyphs`] maps every PNG back to its character,
//! renames it to [`char_to_filename`], rewrites `glyphs.json`, and removes
//! PNGs the new manifest does not reference.

use crate::charset::{char_to_filename, filename_to_char, CharacterSet};
use crate::error::GlyphExtractorError;
use crate::output::{CellSize, GlyphManifest, MANIFEST_FILENAME};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

/// What [`rename_glyphs`] did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameReport {
    /// `(old, new)` filenames that were renamed.
    pub renamed: Vec<(String, String)>,
    /// Characters with no file in the directory.
    pub missing: Vec<char>,
    /// `(old, target)` pairs skipped because the target already existed.
    pub conflicts: Vec<(String, String)>,
    /// `(old, error)` pairs whose rename failed; the old file is kept.
    pub failed: Vec<(String, String)>,
    /// PNGs deleted because nothing referenced them.
    pub removed: Vec<String>,
    /// The manifest written to `<dir>/glyphs.json`.
    pub manifest: GlyphManifest,
}

fn nfc(s: &str) -> String {
    s.nfc().collect()
}

fn nfd(s: &str) -> String {
    s.nfd().collect()
}

fn png_names(dir: &Path) -> Result<Vec<String>, GlyphExtractorError> {
    let read_failed = |source| GlyphExtractorError::RenameFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!("Skipping non-UTF-8 filename {:?}", entry.file_name());
            continue;
        };
        if name.ends_with(".png") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Index PNG filenames by the character they hold, under both NFC and NFD.
fn index_by_character(names: &[String]) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for name in names {
        let stem = name.trim_end_matches(".png");
        let character = filename_to_char(stem);
        let composed = nfc(&character);
        let decomposed = nfd(&character);
        if decomposed != composed {
            index.insert(decomposed, name.clone());
        }
        index.insert(composed, name.clone());
    }
    index
}

/// Rename every glyph in `dir` to its canonical filename.
///
/// For each character of `charset`, in order: look up its file through the
/// NFC index, then the NFD one, and rename it to the canonical name unless
/// that name is already taken (conflict, skipped). The manifest lists every
/// character that ended up with a file; PNGs outside it are then deleted.
///
/// # Errors
/// Returns [`GlyphExtractorError::RenameFailed`] if `dir` cannot be listed and
/// [`GlyphExtractorError::ManifestFailed`] if `glyphs.json` cannot be written.
/// Individual rename or delete failures are logged and reported, not fatal.
pub fn rename_glyphs(
    dir: &Path,
    charset: &CharacterSet,
    cell_size: CellSize,
) -> Result<RenameReport, GlyphExtractorError> {
    let names = png_names(dir)?;
    let index = index_by_character(&names);
    info!("Found {} PNG files in {}", names.len(), dir.display());

    let mut manifest = GlyphManifest::new(cell_size);
    let mut renamed = Vec::new();
    let mut missing = Vec::new();
    let mut conflicts = Vec::new();
    let mut failed = Vec::new();

    for c in charset.iter() {
        let new_name = format!("{}.png", char_to_filename(c));
        let new_path = dir.join(&new_name);

        let character = c.to_string();
        let old_name = index
            .get(&nfc(&character))
            .or_else(|| index.get(&nfd(&character)));

        let Some(old_name) = old_name else {
            warn!("MISSING: '{}' (U+{:04X})", c, c as u32);
            missing.push(c);
            continue;
        };

        if *old_name == new_name {
            manifest.insert(c, new_name);
            continue;
        }

        if new_path.exists() {
            warn!("CONFLICT: {} already exists, skipping {}", new_name, old_name);
            conflicts.push((old_name.clone(), new_name.clone()));
            manifest.insert(c, new_name);
            continue;
        }

        match std::fs::rename(dir.join(old_name), &new_path) {
            Ok(()) => {
                info!("RENAMED: {} → {}", old_name, new_name);
                renamed.push((old_name.clone(), new_name.clone()));
                manifest.insert(c, new_name);
            }
            Err(e) => {
                warn!("Failed to rename {} → {}: {}", old_name, new_name, e);
                failed.push((old_name.clone(), e.to_string()));
                manifest.insert(c, old_name.clone());
            }
        }
    }

    info!(
        "Renamed {} files, {} missing, {} conflicts",
        renamed.len(),
        missing.len(),
        conflicts.len()
    );

    let manifest_path = dir.join(MANIFEST_FILENAME);
    manifest.write_to(&manifest_path)?;
    info!(
        "Written {} with {} glyphs",
        manifest_path.display(),
        manifest.len()
    );

    let referenced: HashSet<&str> = manifest.glyphs.values().map(String::as_str).collect();
    let mut removed = Vec::new();
    for name in png_names(dir)? {
        if referenced.contains(name.as_str()) {
            continue;
        }
        match std::fs::remove_file(dir.join(&name)) {
            Ok(()) => {
                info!("REMOVING unused: {}", name);
                removed.push(name);
            }
            Err(e) => warn!("Failed to remove {}: {}", name, e),
        }
    }
    info!("Cleaned up {} unused files", removed.len());

    Ok(RenameReport {
        renamed,
        missing,
        conflicts,
        failed,
        removed,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CELL: CellSize = CellSize {
        width: 22.5,
        height: 26.2,
    };

    fn touch(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write");
        path
    }

    fn files(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = std::fs::read_dir(dir)
            .expect("read_dir")
            .filter_map(|e| e.ok()?.file_name().into_string().ok())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn legacy_names_are_renamed() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "hash.png", "#");
        touch(dir.path(), "A.png", "A");

        let set = CharacterSet::parse("A#");
        let report = rename_glyphs(dir.path(), &set, CELL).expect("rename");

        assert_eq!(report.renamed, vec![("hash.png".into(), "#.png".into())]);
        assert!(report.missing.is_empty());
        assert_eq!(std::fs::read_to_string(dir.path().join("#.png")).expect("read"), "#");
        assert_eq!(report.manifest.glyphs.get("#").map(String::as_str), Some("#.png"));
        assert_eq!(report.manifest.glyphs.get("A").map(String::as_str), Some("A.png"));
    }

    #[test]
    fn decomposed_filenames_are_matched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let decomposed: String = "Č".nfd().collect();
        assert_ne!(decomposed, "Č");
        touch(dir.path(), &format!("{decomposed}.png"), "C-caron");

        let set = CharacterSet::parse("Č");
        let report = rename_glyphs(dir.path(), &set, CELL).expect("rename");

        assert_eq!(report.renamed.len(), 1);
        assert!(dir.path().join("Č.png").exists());
        assert_eq!(report.manifest.glyphs.get("Č").map(String::as_str), Some("Č.png"));
    }

    #[test]
    fn missing_characters_are_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.png", "");
        let report = rename_glyphs(dir.path(), &CharacterSet::parse("abc"), CELL).expect("rename");
        assert_eq!(report.missing, vec!['b', 'c']);
        assert_eq!(report.manifest.len(), 1);
    }

    #[test]
    fn unreferenced_pngs_are_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.png", "");
        touch(dir.path(), "stray.png", "");
        touch(dir.path(), "notes.txt", "keep me");

        let report = rename_glyphs(dir.path(), &CharacterSet::parse("a"), CELL).expect("rename");

        assert_eq!(report.removed, vec!["stray.png".to_string()]);
        assert_eq!(files(dir.path()), vec!["a.png", "glyphs.json", "notes.txt"]);
    }

    #[test]
    fn existing_target_is_a_conflict() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "hash.png", "old");
        touch(dir.path(), "#.png", "new");

        let report = rename_glyphs(dir.path(), &CharacterSet::parse("#"), CELL).expect("rename");

        // Both files index '#'; the sorted listing puts hash.png last, so it
        // is the candidate and the canonical file blocks it.
        assert_eq!(report.conflicts, vec![("hash.png".into(), "#.png".into())]);
        assert_eq!(std::fs::read_to_string(dir.path().join("#.png")).expect("read"), "new");
        assert_eq!(report.removed, vec!["hash.png".to_string()]);
    }

    #[test]
    fn manifest_is_written_and_readable() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "dot.png", "");
        rename_glyphs(dir.path(), &CharacterSet::parse("."), CELL).expect("rename");
        let back = GlyphManifest::read_from(&dir.path().join(MANIFEST_FILENAME)).expect("read");
        assert_eq!(back.cell_size, CELL);
        assert_eq!(back.glyphs.get(".").map(String::as_str), Some("dot.png"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = rename_glyphs(&dir.path().join("nope"), &CharacterSet::parse("a"), CELL)
            .unwrap_err();
        assert!(matches!(err, GlyphExtractorError::RenameFailed { .. }));
    }
}
