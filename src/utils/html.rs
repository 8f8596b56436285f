use ammonia;

/// Clean HTML content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: it preserves safe tags
/// (like <b>, <p>) while stripping dangerous tags (like <script>, <iframe>)
/// and malicious attributes (like onclick).
///
/// Applied to operator-entered free text that is stored and re-displayed
/// (test instructions, result remarks), as a fail-safe against Stored XSS
/// in the admin dashboards.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
