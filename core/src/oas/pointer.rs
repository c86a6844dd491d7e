#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for `$ref` targets and JSON Pointer segments.
//!
//! Only references local to the current document are resolved; nothing is ever
//! fetched.

use percent_encoding::percent_decode_str;

/// Extracts a component name from a `$ref` if it points to `#/components/{section}/{name}`.
///
/// Returns `None` if the reference is not local to the current document.
pub fn extract_component_name(ref_str: &str, section: &str) -> Option<String> {
    let pointer = ref_str.strip_prefix("#/")?;
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 {
        return None;
    }
    if segments[0] != "components" || segments[1] != section {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent escapes).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Escapes a JSON Pointer segment (`~` -> `~0`, `/` -> `~1`).
pub fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Returns the last segment of a pointer, decoded.
pub fn last_segment(pointer: &str) -> String {
    decode_pointer_segment(pointer.rsplit('/').next().unwrap_or(pointer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_component_name_success() {
        let name = extract_component_name("#/components/schemas/User", "schemas").unwrap();
        assert_eq!(name, "User");
    }

    #[test]
    fn test_extract_component_name_wrong_section() {
        let name = extract_component_name("#/components/responses/Limit", "schemas");
        assert!(name.is_none());
    }

    #[test]
    fn test_extract_component_name_rejects_remote_and_nested() {
        assert!(extract_component_name("other.yaml#/components/schemas/User", "schemas").is_none());
        assert!(
            extract_component_name("#/components/schemas/User/properties/id", "schemas").is_none()
        );
        assert!(extract_component_name("#/components/schemas/", "schemas").is_none());
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let decoded = decode_pointer_segment("User%20Profile~1details");
        assert_eq!(decoded, "User Profile/details");
    }

    #[test]
    fn test_escape_then_last_segment() {
        let pointer = format!("#/paths/{}", escape_pointer_segment("/a~b"));
        assert_eq!(pointer, "#/paths/~1a~0b");
        assert_eq!(last_segment(&pointer), "/a~b");
    }
}
