//! Slug derivation. A slug is the stable remote identifier of a document and
//! is always derived from its path, so a removed file can still be matched.

/// Lowercase `input`, collapse runs of characters other than ASCII letters
/// and digits to `-`, and trim leading/trailing dashes.
///
/// Non-ASCII letters are treated as separators. The CMS transliterates them in
/// its own slug normalization, so keeping them would make a later lookup by
/// the local slug miss.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug derived from the file stem of a repository path.
///
/// `blog/posts/Hello World.md` → `hello-world`.
pub fn slug_for_path(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    slugify(stem)
}
