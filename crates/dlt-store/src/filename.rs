//! Artifact filename conventions.
//!
//! Every tracked artifact is a tarball whose name encodes its identity,
//! so a missing `dltracker.json` can be rebuilt from the directory
//! contents alone:
//!
//! - semver: `{name}-{version}.tar.gz`
//! - git:    `{encoded-repo}#{40-hex-commit}.tar.gz`
//! - url:    `{encoded-url}.tar.gz`
//!
//! Repository identifiers and urls are percent-encoded so they are safe
//! as filenames; `#` only ever appears as the git repo/commit separator.

use dlt_types::is_commit_hash;

const TARBALL_EXTENSIONS: [&str; 3] = [".tar.gz", ".tgz", ".tar"];

/// The identity parsed out of an artifact filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedFilename {
    Semver { name: String, version: String },
    Git { repo: String, commit: String },
    Url { spec: String },
}

/// Returns `true` if `name` ends in a recognized tarball extension.
pub fn has_tarball_extension(name: &str) -> bool {
    TARBALL_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Strip the tarball extension, or `None` if there is none.
fn strip_extension(name: &str) -> Option<&str> {
    TARBALL_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
}

fn keep_verbatim(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}

/// Percent-encode a repo identifier or url for use in a filename.
pub fn encode_spec(spec: &str) -> String {
    let mut out = String::with_capacity(spec.len());
    for b in spec.bytes() {
        if keep_verbatim(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Reverse [`encode_spec`]. Malformed escapes are passed through as-is.
pub fn decode_spec(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(hex) = encoded.get(i + 1..i + 3) {
                if let Ok(b) = u8::from_str_radix(hex, 16) {
                    out.push(b);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Build the filename for a semver artifact.
pub fn semver_filename(name: &str, version: &str) -> String {
    format!("{name}-{version}.tar.gz")
}

/// Build the filename for a git commit artifact.
pub fn git_filename(repo: &str, commit: &str) -> String {
    format!("{}#{commit}.tar.gz", encode_spec(repo))
}

/// Build the filename for a url artifact.
pub fn url_filename(spec: &str) -> String {
    format!("{}.tar.gz", encode_spec(spec))
}

/// Returns `true` if `s` parses as `major.minor.patch` with optional
/// `-prerelease` and `+build` suffixes.
fn is_version(s: &str) -> bool {
    let s = match s.split_once('+') {
        Some((_, build)) if build.is_empty() => return false,
        Some((core, _)) => core,
        None => s,
    };
    let (core, prerelease) = match s.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (s, None),
    };
    if let Some(pre) = prerelease {
        if pre.is_empty()
            || !pre
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-'))
        {
            return false;
        }
    }
    let mut parts = 0;
    for part in core.split('.') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        parts += 1;
    }
    parts == 3
}

/// Split a semver artifact stem into (name, version), trying each dash
/// from the left until the suffix parses as a version.
fn split_name_version(stem: &str) -> Option<(String, String)> {
    for (idx, _) in stem.match_indices('-') {
        let (name, version) = (&stem[..idx], &stem[idx + 1..]);
        if !name.is_empty() && is_version(version) {
            return Some((name.to_string(), version.to_string()));
        }
    }
    None
}

/// Parse an artifact filename back into the identity it encodes.
///
/// Returns `None` for filenames that do not follow the conventions
/// (no tarball extension, or an unrecognizable stem).
pub fn parse(filename: &str) -> Option<ParsedFilename> {
    let stem = strip_extension(filename)?;
    if let Some((repo, commit)) = stem.rsplit_once('#') {
        if repo.is_empty() || !is_commit_hash(commit) {
            return None;
        }
        return Some(ParsedFilename::Git {
            repo: decode_spec(repo),
            commit: commit.to_string(),
        });
    }
    if stem.contains('%') {
        return Some(ParsedFilename::Url {
            spec: decode_spec(stem),
        });
    }
    split_name_version(stem).map(|(name, version)| ParsedFilename::Semver { name, version })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    #[test]
    fn encode_decode_round_trip() {
        let spec = "https://example.com/pkgs/a.tgz?x=1&y=2";
        let encoded = encode_spec(spec);
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('#'));
        assert_eq!(decode_spec(&encoded), spec);
    }

    #[test]
    fn decode_passes_malformed_escapes_through() {
        assert_eq!(decode_spec("a%zz"), "a%zz");
        assert_eq!(decode_spec("trailing%2"), "trailing%2");
    }

    // -----------------------------------------------------------------------
    // Version recognition
    // -----------------------------------------------------------------------

    #[test]
    fn versions_accepted() {
        assert!(is_version("1.0.0"));
        assert!(is_version("10.2.33"));
        assert!(is_version("1.0.0-beta.1"));
        assert!(is_version("1.0.0-rc-2"));
        assert!(is_version("1.0.0+build5"));
        assert!(is_version("1.0.0-beta+exp.sha"));
    }

    #[test]
    fn versions_rejected() {
        assert!(!is_version("1.0"));
        assert!(!is_version("1.0.0.0"));
        assert!(!is_version("v1.0.0"));
        assert!(!is_version("1.0.x"));
        assert!(!is_version("1.0.0-"));
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parse_semver_with_dashed_name() {
        let parsed = parse("left-pad-1.3.0.tar.gz").unwrap();
        assert_eq!(
            parsed,
            ParsedFilename::Semver {
                name: "left-pad".into(),
                version: "1.3.0".into()
            }
        );
    }

    #[test]
    fn parse_semver_prerelease() {
        let parsed = parse("foo-2.0.0-beta.1.tgz").unwrap();
        assert_eq!(
            parsed,
            ParsedFilename::Semver {
                name: "foo".into(),
                version: "2.0.0-beta.1".into()
            }
        );
    }

    #[test]
    fn parse_git_round_trip() {
        let name = git_filename("github.com/example/repo", COMMIT);
        let parsed = parse(&name).unwrap();
        assert_eq!(
            parsed,
            ParsedFilename::Git {
                repo: "github.com/example/repo".into(),
                commit: COMMIT.into()
            }
        );
    }

    #[test]
    fn parse_url_round_trip() {
        let spec = "https://example.com/dl/thing.tgz";
        let parsed = parse(&url_filename(spec)).unwrap();
        assert_eq!(parsed, ParsedFilename::Url { spec: spec.into() });
    }

    #[test]
    fn parse_rejects_unconventional_names() {
        assert!(parse("README.md").is_none());
        assert!(parse("no-version-here.tar.gz").is_none());
        assert!(parse("repo#notahash.tar.gz").is_none());
    }

    #[test]
    fn tarball_extension_check() {
        assert!(has_tarball_extension("a-1.0.0.tgz"));
        assert!(has_tarball_extension("a-1.0.0.tar"));
        assert!(!has_tarball_extension("dltracker.json"));
    }
}
