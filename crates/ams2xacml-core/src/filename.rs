//! Output file naming from handles.

use crate::error::PolicyError;

/// Extension of generated policy files.
pub const POLICY_EXTENSION: &str = "xml";

/// Derive the file stem for a handle.
///
/// The part identifier after the first `@` is dropped, every character
/// outside `[A-Za-z0-9]` becomes `_`, and a leading `hdl_` becomes `lat_`.
///
/// ```
/// use ams2xacml_core::policy_file_stem;
///
/// assert_eq!(policy_file_stem("hdl:1234/ab@format=cmdi").unwrap(), "lat_1234_ab");
/// ```
pub fn policy_file_stem(handle: &str) -> Result<String, PolicyError> {
    let without_part = match handle.find('@') {
        Some(at) => &handle[..at],
        None => handle,
    };

    let stem: String = without_part
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        return Err(PolicyError::InvalidHandle(handle.to_string()));
    }

    Ok(match stem.strip_prefix("hdl_") {
        Some(rest) => format!("lat_{}", rest),
        None => stem,
    })
}

/// File name (stem plus extension) for a handle.
pub fn policy_file_name(handle: &str) -> Result<String, PolicyError> {
    Ok(format!("{}.{}", policy_file_stem(handle)?, POLICY_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_with_part_identifier() {
        assert_eq!(policy_file_stem("hdl:1234/ab@format=cmdi").unwrap(), "lat_1234_ab");
    }

    #[test]
    fn test_plain_handle_only_substitutes() {
        assert_eq!(policy_file_stem("11142/00-ABCD").unwrap(), "11142_00_ABCD");
        assert_eq!(policy_file_stem("abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_prefix_replaced_only_at_start() {
        assert_eq!(policy_file_stem("x:hdl:1").unwrap(), "x_hdl_1");
        assert_eq!(policy_file_stem("hdl_9").unwrap(), "lat_9");
    }

    #[test]
    fn test_non_ascii_becomes_underscore() {
        assert_eq!(policy_file_stem("é1").unwrap(), "_1");
    }

    #[test]
    fn test_empty_stem_rejected() {
        assert!(policy_file_stem("").is_err());
        assert!(policy_file_stem("@only-part").is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(policy_file_name("hdl:1839/00-1").unwrap(), "lat_1839_00_1.xml");
    }
}
