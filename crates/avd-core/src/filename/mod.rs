//! Destination filename derivation for downloaded components.
//!
//! A component keeps its own name when it already carries the version name
//! as a prefix; otherwise the version name is prepended so media from many
//! versions stays distinguishable in one flat directory.

mod sanitize;

pub use sanitize::sanitize_file_name;

/// Number of leading characters compared between version and component names.
const PREFIX_LEN: usize = 10;

/// Derives the destination filename for one component.
///
/// If the first [`PREFIX_LEN`] characters of `version_name` and
/// `component_name` agree, the version name is considered redundant and the
/// result is `component_name + file_type`; otherwise it is
/// `version_name + "_" + component_name + file_type`. The result is
/// sanitized for Linux filesystems.
pub fn derive_file_name(version_name: &str, component_name: &str, file_type: &str) -> String {
    let raw = if prefix_matches(version_name, component_name) {
        format!("{}{}", component_name, file_type)
    } else {
        format!("{}_{}{}", version_name, component_name, file_type)
    };
    sanitize_file_name(&raw)
}

/// True when the leading [`PREFIX_LEN`] characters of both names agree.
/// Names shorter than the prefix compare with whatever is available, so
/// short or multi-byte names never index out of bounds.
fn prefix_matches(a: &str, b: &str) -> bool {
    a.chars().take(PREFIX_LEN).eq(b.chars().take(PREFIX_LEN))
}
