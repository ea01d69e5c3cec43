use anyhow::{Result, anyhow};

/// Maximum stored filename length
const MAX_FILENAME_LEN: usize = 200;

/// Extensions accepted for avatar uploads
const AVATAR_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Reduce an uploaded filename to a safe storage-key segment: anything
/// outside `[A-Za-z0-9._-]` becomes `_`, truncated to 200 characters.
/// This also flattens path separators, so a sanitized filename can never
/// introduce new key segments.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    if filename.trim().is_empty() {
        return Err(anyhow!("Filename must not be empty"));
    }

    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    if sanitized.chars().all(|c| c == '.' || c == '_') {
        return Err(anyhow!("Filename has no usable characters"));
    }

    Ok(sanitized)
}

/// Avatar keys are client-proposed and stored verbatim, so their shape is
/// strict: `{owner-id}/{name}.{jpg|jpeg|png}` where the owner id is
/// lowercase hex with dashes and the name is a single word.
pub fn is_valid_avatar_key(key: &str) -> bool {
    let Some((owner, filename)) = key.split_once('/') else {
        return false;
    };

    if owner.is_empty()
        || !owner
            .chars()
            .all(|c| (c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) || c == '-')
    {
        return false;
    }

    let Some((stem, extension)) = filename.rsplit_once('.') else {
        return false;
    };

    if stem.is_empty()
        || !stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return false;
    }

    AVATAR_EXTENSIONS.contains(&extension)
}
