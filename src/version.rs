use regex::Regex;
use tracing::warn;

/// Used when no version can be extracted from the image name.
/// Most recent known major at the time of writing.
pub const FALLBACK_MAJOR_VERSION: u32 = 8;

/// Extract the major version from an image name like `elasticsearch:8.1.0`.
///
/// Only a tag starting with `MAJOR.MINOR.PATCH` counts; anything else
/// (`latest`, `8`, `8.1`, a digest) falls back to
/// [`FALLBACK_MAJOR_VERSION`] with a warning. A missing match is a
/// recoverable condition, not an error.
pub fn major_version(image: &str) -> u32 {
    let tag = image.rsplit(':').next().unwrap_or(image);
    let re = Regex::new(r"^(\d+)\.\d+\.\d+").expect("valid regex");
    match re.captures(tag).and_then(|c| c[1].parse::<u32>().ok()) {
        Some(major) => major,
        None => {
            warn!(
                image = image,
                fallback = FALLBACK_MAJOR_VERSION,
                "could not determine major version from image name, using fallback"
            );
            FALLBACK_MAJOR_VERSION
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_version_from_full_semver_tag() {
        assert_eq!(major_version("elasticsearch:8.1.0"), 8);
        assert_eq!(major_version("elasticsearch:6.8.23"), 6);
        assert_eq!(major_version("docker.elastic.co/elasticsearch/elasticsearch:7.17.9"), 7);
    }

    #[test]
    fn test_major_version_ignores_suffix_after_patch() {
        assert_eq!(major_version("elasticsearch:7.10.2-arm64"), 7);
    }

    #[test]
    fn test_major_version_fallback_on_non_semver_tag() {
        assert_eq!(major_version("elasticsearch:latest"), FALLBACK_MAJOR_VERSION);
        assert_eq!(major_version("elasticsearch"), FALLBACK_MAJOR_VERSION);
        // Pattern is anchored at the start of the tag
        assert_eq!(major_version("elasticsearch:v8.1.0"), FALLBACK_MAJOR_VERSION);
        // Partial versions do not match
        assert_eq!(major_version("elasticsearch:8.1"), FALLBACK_MAJOR_VERSION);
        assert_eq!(major_version("elasticsearch:8"), FALLBACK_MAJOR_VERSION);
    }

    #[test]
    fn test_major_version_uses_text_after_last_colon() {
        assert_eq!(major_version("localhost:5000/elasticsearch:6.0.1"), 6);
    }
}
