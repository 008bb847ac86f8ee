use crate::utils::error::{Result, SyncError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SyncError::Config {
            field: field_name.to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SyncError::Config {
                field: field_name.to_string(),
                message: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SyncError::Config {
            field: field_name.to_string(),
            message: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SyncError::Config {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SyncError::Config {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SyncError::Config {
            field: field_name.to_string(),
            message: format!("Value {} must be between {} and {}", value, min, max),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::Config {
            field: field_name.to_string(),
            message: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
