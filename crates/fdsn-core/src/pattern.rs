//! FDSN wildcard matching for network, station, location and channel codes.
//!
//! Patterns are checked by a fixed cascade of rules rather than as a general
//! glob:
//!
//! 1. `*` or the empty pattern matches anything.
//! 2. A pattern with exactly one `*` is a prefix and a suffix; the candidate
//!    must start with the one and end with the other. The two checks are
//!    independent, so they may overlap (`AB*BC` matches `ABC`), and any `?`
//!    in them is literal.
//! 3. A pattern with `?` must have the candidate's length, with each `?`
//!    standing for one character.
//! 4. Anything else is exact, case-sensitive equality.
//!
//! The same matcher filters stored rows on the server and is available to any
//! client-side filtering.

/// Does `candidate` match `pattern`?
pub fn matches(pattern: &str, candidate: &str) -> bool {
  if pattern.is_empty() || pattern == "*" {
    return true;
  }

  let mut parts = pattern.split('*');
  if let (Some(prefix), Some(suffix), None) = (parts.next(), parts.next(), parts.next()) {
    return candidate.starts_with(prefix) && candidate.ends_with(suffix);
  }

  if pattern.contains('?') {
    return pattern.chars().count() == candidate.chars().count()
      && pattern
        .chars()
        .zip(candidate.chars())
        .all(|(p, c)| p == '?' || p == c);
  }

  // Several `*` fall through to here and are compared literally.
  pattern == candidate
}

/// Does `candidate` match any pattern in `patterns`? An empty list matches
/// everything.
pub fn matches_any<P: AsRef<str>>(patterns: &[P], candidate: &str) -> bool {
  patterns.is_empty() || patterns.iter().any(|p| matches(p.as_ref(), candidate))
}
