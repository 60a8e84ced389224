//! Version tag utilities.
//!
//! Tags look like `16.1.4` (an upstream release) or `16.1.4-2` (the second
//! module release built against that upstream release). Tags are always
//! compared as tuples of integers, never as strings.

use thiserror::Error;

/// Upper bound on candidates tried by [`next_revision`].
pub const MAX_REVISION_ATTEMPTS: u32 = 1000;

/// Errors produced while parsing or deriving version tags.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A segment between separators is empty (e.g. `1..2` or `1.2-`).
    #[error("Empty version segment in tag '{tag}'")]
    EmptySegment {
        /// The offending tag.
        tag: String,
    },

    /// A segment is not a non-negative integer.
    #[error("Non-numeric version segment '{segment}' in tag '{tag}'")]
    NonNumeric {
        /// The offending tag.
        tag: String,
        /// The segment that failed to parse.
        segment: String,
    },

    /// A segment does not fit the two-digit version code field.
    #[error("Version segment {segment} in tag '{tag}' does not fit in two digits")]
    SegmentTooWide {
        /// The offending tag.
        tag: String,
        /// The parsed segment value.
        segment: u64,
    },

    /// The concatenated version code exceeds the integer range.
    #[error("Version code for tag '{0}' overflows")]
    Overflow(String),

    /// Every candidate revision up to the safety bound was reported as taken.
    #[error("No free revision for '{base}' after {attempts} attempts")]
    RevisionLimit {
        /// Base tag the revisions were derived from.
        base: String,
        /// Number of candidates checked.
        attempts: u32,
    },
}

/// Split a tag into its numeric segments (separators are `.` and `-`).
///
/// # Errors
///
/// Returns [`VersionError::EmptySegment`] or [`VersionError::NonNumeric`]
/// if any segment is not a non-negative integer.
pub fn parse_segments(tag: &str) -> Result<Vec<u64>, VersionError> {
    tag.split(['.', '-'])
        .map(|segment| {
            if segment.is_empty() {
                return Err(VersionError::EmptySegment {
                    tag: tag.to_string(),
                });
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::NonNumeric {
                    tag: tag.to_string(),
                    segment: segment.to_string(),
                });
            }
            segment.parse::<u64>().map_err(|_| VersionError::NonNumeric {
                tag: tag.to_string(),
                segment: segment.to_string(),
            })
        })
        .collect()
}

/// Drop the revision suffix: `12.7.5-2` becomes `12.7.5`.
///
/// Tags without a `-` are returned unchanged.
///
/// ```
/// use magiskfrida_schema::version::strip_revision;
///
/// assert_eq!(strip_revision("12.7.5-2"), "12.7.5");
/// assert_eq!(strip_revision("12.7.5"), "12.7.5");
/// ```
pub fn strip_revision(tag: &str) -> &str {
    tag.split_once('-').map_or(tag, |(base, _)| base)
}

/// Sort tags in ascending numeric order (`1.9` before `1.11`).
///
/// The sort is stable, so tags with identical numeric keys keep their
/// input order.
///
/// # Errors
///
/// Fails on the first tag containing a non-numeric segment.
pub fn sort_tags<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, VersionError> {
    let mut keyed = tags
        .iter()
        .map(|tag| {
            let tag = tag.as_ref();
            parse_segments(tag).map(|key| (key, tag.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, tag)| tag).collect())
}

/// Numerically greatest tag, or `None` for an empty list.
///
/// # Errors
///
/// Same as [`sort_tags`].
pub fn latest_tag<S: AsRef<str>>(tags: &[S]) -> Result<Option<String>, VersionError> {
    Ok(sort_tags(tags)?.pop())
}

/// Numeric version code: every segment zero-padded to two digits and
/// concatenated (`12.7.5` -> `120705`, `16.1.4-1` -> `16010401`).
///
/// # Errors
///
/// Fails if a segment is empty, non-numeric, or 100 and above, or if the
/// concatenation does not fit in a `u64`.
pub fn version_code(tag: &str) -> Result<u64, VersionError> {
    parse_segments(tag)?
        .into_iter()
        .try_fold(0u64, |code, segment| {
            if segment > 99 {
                return Err(VersionError::SegmentTooWide {
                    tag: tag.to_string(),
                    segment,
                });
            }
            code.checked_mul(100)
                .and_then(|c| c.checked_add(segment))
                .ok_or_else(|| VersionError::Overflow(tag.to_string()))
        })
}

/// Find the first free revision of `base`: `base-1`, `base-2`, ...
///
/// `exists` is asked about each candidate in turn. The search gives up with
/// [`VersionError::RevisionLimit`] after [`MAX_REVISION_ATTEMPTS`] taken
/// candidates. Errors from `exists` abort the search unchanged.
///
/// # Errors
///
/// Propagates oracle failures and returns the revision limit error when no
/// free candidate is found.
pub fn next_revision<F, E>(base: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<bool, E>,
    E: From<VersionError>,
{
    for revision in 1..=MAX_REVISION_ATTEMPTS {
        let candidate = format!("{base}-{revision}");
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(VersionError::RevisionLimit {
        base: base.to_string(),
        attempts: MAX_REVISION_ATTEMPTS,
    }
    .into())
}
