pub mod sync;
pub mod token;

/// GitHub Actions passes unset inputs as empty strings.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
