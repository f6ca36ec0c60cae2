use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use crate::admin::{apply_script, HierarchyStore, Operation, ScriptReport};

/// Load a store from an exported hierarchy file, or from the first
/// research round when no file is given.
///
/// The file replaces the baseline tree, so the result starts with no
/// pending changes.
pub fn open_store(path: Option<&Path>) -> Result<HierarchyStore> {
    let mut store =
        HierarchyStore::from_catalog().context("Failed to build hierarchy from research data")?;

    if let Some(path) = path {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read hierarchy file at {}", path.display()))?;
        store
            .import_hierarchy(&json)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        store.save_changes();
    }

    Ok(store)
}

/// Write the store's export atomically
///
/// The target is never left half-written. Parent directories are created.
pub fn save_export(path: &Path, store: &HierarchyStore) -> Result<()> {
    let json = store.export_hierarchy()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(json.as_bytes())
        .context("Failed to write hierarchy export")?;
    file.write_all(b"\n")?;
    file.commit().context("Failed to save hierarchy export")?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "export written");
    Ok(())
}

/// Read a batch of operations from a YAML or JSON file
pub fn load_script(path: &Path) -> Result<Vec<Operation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script at {}", path.display()))?;
    crate::admin::parse_script(&content)
        .with_context(|| format!("Failed to parse script {}", path.display()))
}

/// Apply a batch, then export to `target` if anything changed.
///
/// With no target nothing is written and the edited store is left as is.
/// Returns whether a file was written.
pub fn apply_and_save(
    store: &mut HierarchyStore,
    operations: Vec<Operation>,
    target: Option<&Path>,
) -> Result<(ScriptReport, bool)> {
    let report = apply_script(store, operations);

    let written = match target {
        Some(path) if store.has_unsaved_changes() => {
            save_export(path, store)?;
            store.save_changes();
            true
        }
        _ => false,
    };

    Ok((report, written))
}
