use crate::prelude::*;
use crate::writers::csv_writer::ensure_parent_dir;

/// Writes `content` as UTF-8 text, replacing any existing file.
pub fn write_text_file(path: &Path, content: &str) -> CubeResult<()> {
    ensure_parent_dir(path)?;
    fs::write(path, content).map_err(|e| CubeError::WriteError {
        path: path.display().to_string(),
        operation: "write_text".to_string(),
        reason: e.to_string(),
        suggestion: "💡 Check file permissions and path validity".to_string(),
    })?;
    debug!(path = %path.display(), bytes = content.len(), "wrote text file");
    Ok(())
}
