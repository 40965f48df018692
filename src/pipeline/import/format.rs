use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ImportError;
use crate::models::enums::MatchFormat;

/// Result of format detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDetection {
    pub format: Option<MatchFormat>,
    pub file_size_bytes: u64,
}

impl FormatDetection {
    pub fn is_supported(&self) -> bool {
        self.format.is_some()
    }
}

const XG_MAGIC: &[u8] = b"RGMH";
const SGF_MAGIC: &[u8] = b"(;FF[";
const SGF_BACKGAMMON_GAME: &[u8] = b"GM[6]";

/// Detect the transcript format from the file extension, falling back to
/// magic bytes when the extension is missing or unknown.
pub fn detect_format(path: &Path) -> Result<FormatDetection, ImportError> {
    let metadata = std::fs::metadata(path)?;
    let file_size = metadata.len();

    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MatchFormat::from_extension);

    let format = match by_extension {
        Some(format) => Some(format),
        None => detect_from_magic(path)?,
    };

    Ok(FormatDetection {
        format,
        file_size_bytes: file_size,
    })
}

fn detect_from_magic(path: &Path) -> Result<Option<MatchFormat>, ImportError> {
    let file = std::fs::File::open(path)?;
    let mut header = Vec::with_capacity(512);
    file.take(512).read_to_end(&mut header)?;

    if header.starts_with(XG_MAGIC) {
        return Ok(Some(MatchFormat::Xg));
    }
    let trimmed = header
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(&header[..0], |start| &header[start..]);
    if trimmed.starts_with(SGF_MAGIC)
        && trimmed
            .windows(SGF_BACKGAMMON_GAME.len())
            .any(|w| w == SGF_BACKGAMMON_GAME)
    {
        return Ok(Some(MatchFormat::GnubgSgf));
    }
    Ok(None)
}

/// Sanitize a filename — strip path components, limit length
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("match");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "match".to_string()
    } else {
        clean
    }
}
