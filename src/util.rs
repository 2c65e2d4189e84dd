//! Small utilities: shell escaping for remote command lines and previews.

/// Escape a single word for embedding into a `bash -c` command line.
///
/// Plain words pass through untouched; anything else gets single-quoted with
/// embedded quotes rewritten as `'"'"'`.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{escaped}'")
    }
}

/// Join argv into a copy-pasteable single line for verbose previews.
pub fn shell_join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|a| shell_escape(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
