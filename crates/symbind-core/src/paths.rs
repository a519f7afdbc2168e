//! # Path Heuristics
//!
//! Debug information records the paths of the machine that built the
//! binary, not the machine reading it. These helpers guess the dialect from
//! the path itself and apply that platform's rules as plain string algebra,
//! independent of the host's `std::path` rules.
//!
//! A path is Windows-style when it contains a backslash, or is absolute by
//! Windows rules (`C:/...`) without being absolute by POSIX rules.

use std::fmt;

/// Path dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle
{
    /// `/`-separated, rooted at `/`.
    Posix,
    /// `\`-separated (`/` accepted), with drive letters and UNC shares.
    Windows,
}

impl PathStyle
{
    /// Guess the dialect of `path`.
    pub fn detect(path: &str) -> Self
    {
        if is_windows_style(path) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    /// The canonical separator.
    pub fn separator(self) -> char
    {
        match self {
            PathStyle::Posix => '/',
            PathStyle::Windows => '\\',
        }
    }

    /// Whether `path` is absolute under this dialect.
    pub fn is_absolute(self, path: &str) -> bool
    {
        match self {
            PathStyle::Posix => path.starts_with('/'),
            PathStyle::Windows => {
                let path = path.replace('/', "\\");
                let (drive, rest) = split_drive(&path);
                if drive.starts_with("\\\\") {
                    return true;
                }
                !drive.is_empty() && rest.starts_with('\\')
            }
        }
    }

    /// Lexically normalise `path`: collapse separators, drop `.`, resolve
    /// `..` against the preceding segment. An empty result becomes `.`.
    pub fn normalize(self, path: &str) -> String
    {
        match self {
            PathStyle::Posix => normalize_posix(path),
            PathStyle::Windows => normalize_windows(path),
        }
    }

    /// Join `b` onto `a` and normalise. An absolute `b` replaces `a`.
    pub fn join(self, a: &str, b: &str) -> String
    {
        match self {
            PathStyle::Posix => normalize_posix(&join_posix(a, b)),
            PathStyle::Windows => normalize_windows(&join_windows(a, b)),
        }
    }
}

impl fmt::Display for PathStyle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            PathStyle::Posix => "posix",
            PathStyle::Windows => "windows",
        };
        write!(f, "{label}")
    }
}

/// Whether `path` looks like a Windows path.
pub fn is_windows_style(path: &str) -> bool
{
    path.contains('\\') || (PathStyle::Windows.is_absolute(path) && !PathStyle::Posix.is_absolute(path))
}

/// Join two paths, guessing the dialect from `a`.
///
/// ```
/// use symbind_core::paths::join;
///
/// assert_eq!(join(r"C:\a", "b"), r"C:\a\b");
/// assert_eq!(join("/a", "b"), "/a/b");
/// ```
pub fn join(a: &str, b: &str) -> String
{
    PathStyle::detect(a).join(a, b)
}

/// Strip `prefix` from `base`, segment by segment.
///
/// Returns the normalised `base` unchanged when the segments of `prefix`
/// are not a leading run of the segments of `base`.
///
/// ```
/// use symbind_core::paths::strip_prefix;
///
/// assert_eq!(strip_prefix("/a/b/c", "/a/b"), "c");
/// assert_eq!(strip_prefix("/a/b/c", "/x/y"), "/a/b/c");
/// ```
pub fn strip_prefix(base: &str, prefix: &str) -> String
{
    let style = PathStyle::detect(base);
    let sep = style.separator();

    let base = style.normalize(base);
    let prefix = style.normalize(prefix);
    let base_pieces: Vec<&str> = base.split(sep).collect();
    let prefix_pieces: Vec<&str> = prefix.split(sep).collect();

    if base_pieces.starts_with(&prefix_pieces) {
        base_pieces[prefix_pieces.len()..].join(&sep.to_string())
    } else {
        base
    }
}

/// Split a `\`-separated path into drive (`C:` or `\\server\share`) and rest.
fn split_drive(path: &str) -> (&str, &str)
{
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return path.split_at(2);
    }

    if path.starts_with("\\\\") && !path.starts_with("\\\\\\") {
        let Some(server_end) = path[2..].find('\\').map(|i| i + 2) else {
            return (path, "");
        };
        let share_end = path[server_end + 1..].find('\\').map_or(path.len(), |i| i + server_end + 1);
        return path.split_at(share_end);
    }

    ("", path)
}

/// Resolve `.` and `..` in separator-split segments.
fn resolve_segments<'a>(segments: impl Iterator<Item = &'a str>, rooted: bool) -> Vec<&'a str>
{
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => match out.last().copied() {
                Some(parent) if parent != ".." => {
                    out.pop();
                }
                // `..` directly under a root goes nowhere.
                None if rooted => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

fn normalize_posix(path: &str) -> String
{
    if path.is_empty() {
        return ".".to_string();
    }

    let root = if path.starts_with("//") && !path.starts_with("///") {
        "//"
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    };

    let segments = resolve_segments(path.split('/'), !root.is_empty());
    let joined = format!("{root}{}", segments.join("/"));
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn normalize_windows(path: &str) -> String
{
    let path = path.replace('/', "\\");
    let (drive, rest) = split_drive(&path);
    let (root, rest) = if rest.starts_with('\\') {
        ("\\", rest.trim_start_matches('\\'))
    } else {
        ("", rest)
    };

    let segments = resolve_segments(rest.split('\\'), !root.is_empty());
    let joined = format!("{drive}{root}{}", segments.join("\\"));
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn join_posix(a: &str, b: &str) -> String
{
    if b.starts_with('/') {
        b.to_string()
    } else if a.is_empty() || a.ends_with('/') {
        format!("{a}{b}")
    } else {
        format!("{a}/{b}")
    }
}

fn join_windows(a: &str, b: &str) -> String
{
    let a = a.replace('/', "\\");
    let b = b.replace('/', "\\");
    let (a_drive, a_path) = split_drive(&a);
    let (b_drive, b_path) = split_drive(&b);

    let mut drive = a_drive;
    let mut path = a_path.to_string();

    if b_path.starts_with('\\') {
        // Rooted right-hand side: keep our drive unless it brings its own.
        if !b_drive.is_empty() || drive.is_empty() {
            drive = b_drive;
        }
        path = b_path.to_string();
    } else if !b_drive.is_empty() && !b_drive.eq_ignore_ascii_case(drive) {
        drive = b_drive;
        path = b_path.to_string();
    } else {
        if !b_drive.is_empty() {
            drive = b_drive;
        }
        if !path.is_empty() && !path.ends_with('\\') {
            path.push('\\');
        }
        path.push_str(b_path);
    }

    // A UNC share needs a separator before a relative remainder.
    if !path.is_empty() && !path.starts_with('\\') && !drive.is_empty() && !drive.ends_with(':') {
        return format!("{drive}\\{path}");
    }
    format!("{drive}{path}")
}
