//! Output naming: `<stem>-<page>.<ext>`, page numbers 1-based.

/// Strip `suffix` from the end of `key`. Keys without the suffix are returned
/// unchanged; no other dots are touched.
pub fn derive_stem<'a>(key: &'a str, suffix: &str) -> &'a str {
    key.strip_suffix(suffix).unwrap_or(key)
}

/// Output key for 1-based `page_num`.
pub fn output_key(stem: &str, page_num: usize, extension: &str) -> String {
    format!("{}-{}.{}", stem, page_num, extension)
}

/// Whether `key` names a source document (ends in `suffix` and has a name
/// before it).
pub fn is_source_key(key: &str, suffix: &str) -> bool {
    key.len() > suffix.len() && key.ends_with(suffix)
}
