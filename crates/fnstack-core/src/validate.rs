//! Upload request validation
//!
//! Rules run in order and stop at the first failure: content, then
//! filename, then mimetype. Nothing here touches the object store.

use crate::error::ValidationError;
use crate::metadata::{ContentSource, FileMetadata};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum filename length in characters
pub const MAX_FILENAME_CHARS: usize = 255;

/// Characters allowed in an object key: letters and digits in any script
/// plus the S3 "safe" and "special handling" punctuation that needs no
/// escaping in a path segment.
static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N} !_.*'()+,=@&$;:~/-]+$").expect("filename pattern is valid")
});

static MIMETYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+.-]+/[A-Za-z0-9+.-]+$").expect("mimetype pattern is valid")
});

/// Validate an upload request
pub fn validate(metadata: &FileMetadata) -> Result<(), ValidationError> {
    validate_content(metadata.content.as_ref())?;
    validate_filename(&metadata.filename)?;
    validate_mimetype(&metadata.mimetype)
}

fn validate_content(content: Option<&ContentSource>) -> Result<(), ValidationError> {
    let source = content
        .ok_or_else(|| ValidationError::MissingContent("no content supplied".to_string()))?;

    let size = source
        .size()
        .map_err(|e| ValidationError::MissingContent(e.to_string()))?;

    if let ContentSource::File(path) = source {
        std::fs::File::open(path).map_err(|e| {
            ValidationError::MissingContent(format!("{} is not readable: {}", path.display(), e))
        })?;
    }

    if size == 0 {
        return Err(ValidationError::MissingContent("content is empty".to_string()));
    }

    Ok(())
}

fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    let chars = filename.chars().count();
    if chars == 0 || chars > MAX_FILENAME_CHARS {
        return Err(ValidationError::InvalidFilename(format!(
            "filename must be between 1 and {} characters",
            MAX_FILENAME_CHARS
        )));
    }

    if filename.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFilename(
            "filename must not contain control characters".to_string(),
        ));
    }

    if !FILENAME_PATTERN.is_match(filename) {
        return Err(ValidationError::InvalidFilename(format!(
            "{filename:?} contains characters not allowed in an object key"
        )));
    }

    if filename
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(ValidationError::InvalidFilename(format!(
            "{filename:?} contains an empty or relative path segment"
        )));
    }

    Ok(())
}

fn validate_mimetype(mimetype: &str) -> Result<(), ValidationError> {
    if !MIMETYPE_PATTERN.is_match(mimetype) {
        return Err(ValidationError::InvalidMimetype(format!(
            "{mimetype:?} is not of the form type/subtype"
        )));
    }
    Ok(())
}
