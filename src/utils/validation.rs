use crate::utils::error::{QuoteError, Result};
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> QuoteError {
    QuoteError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Service endpoints must be absolute http(s) URLs with a host.
pub fn endpoint(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }

    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        "http" | "https" => Err(invalid(field, value, "URL has no host")),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn at_least<T: PartialOrd + Display>(field: &str, value: T, min: T) -> Result<()> {
    if value < min {
        let reason = format!("Value must be at least {}", min);
        return Err(invalid(field, value, reason));
    }
    Ok(())
}

pub fn in_range<T: PartialOrd + Display>(field: &str, value: T, range: RangeInclusive<T>) -> Result<()> {
    if !range.contains(&value) {
        let reason = format!("Value must be between {} and {}", range.start(), range.end());
        return Err(invalid(field, value, reason));
    }
    Ok(())
}

/// Logistics codes are opaque but never blank.
pub fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// A file referenced from configuration, with the one extension it may carry.
pub fn file_path(field: &str, path: &str, extension: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }

    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(extension) => Ok(()),
        Some(ext) => Err(invalid(
            field,
            path,
            format!("Expected a .{} file, got .{}", extension, ext),
        )),
        None => Err(invalid(field, path, format!("Expected a .{} file", extension))),
    }
}
