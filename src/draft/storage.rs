use super::types::EvaluationDraft;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::Path;

/// Load an evaluation draft from a JSON file
///
/// Unlike optional state files, a draft is the user's input: a missing file
/// is an error, not an empty default.
pub fn load_draft(path: &Path) -> Result<EvaluationDraft> {
    if !path.exists() {
        anyhow::bail!("Draft file not found at {}", path.display());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open draft file at {}", path.display()))?;

    let draft: EvaluationDraft =
        serde_json::from_reader(file).context("Failed to parse draft file")?;

    // Version check
    if draft.version != 1 {
        anyhow::bail!("Unsupported draft file version: {}", draft.version);
    }

    Ok(draft)
}

/// Save an evaluation draft to a JSON file atomically
///
/// Uses atomic-write-file so an interrupted save never leaves a corrupted
/// draft behind.
pub fn save_draft(path: &Path, draft: &EvaluationDraft) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, draft).context("Failed to serialize draft")?;

    file.commit().context("Failed to save draft")?;

    Ok(())
}
