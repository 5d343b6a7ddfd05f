use super::types::TemplateIndex;
use super::TemplateError;
use std::path::Path;
use tokio::fs;

/// Read the template index from disk. A missing file yields an empty
/// index; a corrupted document is an operational error and propagates.
pub async fn read_index(path: &Path) -> Result<TemplateIndex, TemplateError> {
    if !path.exists() {
        return Ok(TemplateIndex::new());
    }

    let content = fs::read_to_string(path).await?;
    let index: TemplateIndex = serde_json::from_str(&content)?;
    Ok(index)
}

/// Write the index to disk atomically using temp file + rename. Never
/// leaves a partially written document behind; failures propagate.
pub async fn write_index(path: &Path, index: &TemplateIndex) -> Result<(), TemplateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(index)?;
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, &path).await?;

    Ok(())
}
