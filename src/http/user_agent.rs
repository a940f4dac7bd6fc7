//! User-Agent header parsing.
//!
//! Best-effort extraction of platform, browser family and browser version
//! for audit records. Unknown components are `None`; the raw string is
//! always kept.

/// Platform markers, checked in order. Mobile markers come before the
/// desktop ones they embed (Android UAs also say "Linux").
const PLATFORMS: &[(&str, &str)] = &[
    ("android", "android"),
    ("iphone", "iphone"),
    ("ipad", "ipad"),
    ("windows", "windows"),
    ("cros ", "chromeos"),
    ("macintosh", "macos"),
    ("mac os x", "macos"),
    ("freebsd", "freebsd"),
    ("linux", "linux"),
];

/// Browser product tokens, checked in order. Edge and Opera advertise
/// Chrome too, and Chrome advertises Safari, so specific tokens go first.
const BROWSERS: &[(&str, &str)] = &[
    ("edg/", "edge"),
    ("edge/", "edge"),
    ("opr/", "opera"),
    ("opera/", "opera"),
    ("crios/", "chrome"),
    ("chrome/", "chrome"),
    ("fxios/", "firefox"),
    ("firefox/", "firefox"),
    ("msie ", "msie"),
    ("curl/", "curl"),
    ("python-requests/", "requests"),
    ("postmanruntime/", "postman"),
];

/// Parsed view of a User-Agent header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgent {
    pub raw: String,
    pub platform: Option<String>,
    pub browser: Option<String>,
    pub version: Option<String>,
}

impl UserAgent {
    /// Parse a raw header value. An empty string yields all `None`.
    pub fn parse(raw: &str) -> Self {
        // ASCII lowercasing keeps byte offsets aligned with `raw`.
        let lower = raw.to_ascii_lowercase();

        let platform = PLATFORMS
            .iter()
            .find(|(marker, _)| lower.contains(marker))
            .map(|(_, name)| name.to_string());

        let (browser, version) = detect_browser(raw, &lower);

        Self {
            raw: raw.to_string(),
            platform,
            browser,
            version,
        }
    }
}

fn detect_browser(raw: &str, lower: &str) -> (Option<String>, Option<String>) {
    for (token, name) in BROWSERS {
        if let Some(idx) = lower.find(token) {
            return (Some(name.to_string()), version_at(raw, idx + token.len()));
        }
    }

    if let Some(idx) = lower.find("trident/") {
        let version = lower
            .find("rv:")
            .and_then(|rv| version_at(raw, rv + 3))
            .or_else(|| version_at(raw, idx + "trident/".len()));
        return (Some("msie".to_string()), version);
    }

    if lower.contains("safari/") {
        let version = lower
            .find("version/")
            .and_then(|idx| version_at(raw, idx + "version/".len()));
        return (Some("safari".to_string()), version);
    }

    (None, None)
}

/// Read a version token (digits, letters, dots) starting at byte `start`.
fn version_at(raw: &str, start: usize) -> Option<String> {
    let rest = raw.get(start..)?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
        .unwrap_or(rest.len());
    let version = &rest[..end];
    (!version.is_empty()).then(|| version.to_string())
}
