//! Syntactic URL check used only to flag suspicious links to the user.
//! Links with odd urls are still stored as-is.

/// True for `http://` or `https://` urls with a non-empty host and no whitespace.
pub fn looks_like_url(url: &str) -> bool {
    let rest = match url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return false,
    };
    if url.chars().any(char::is_whitespace) {
        return false;
    }
    let host = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    !host.is_empty() && !host.starts_with('.') && !host.ends_with('.')
}
