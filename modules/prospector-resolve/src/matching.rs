//! Normalization and similarity primitives used by the identity resolver.

/// Case-fold and collapse runs of whitespace. `"  Jane   DOE "` → `"jane doe"`.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A record's own email when it has a non-blank one, else `fallback`.
/// Blank values on either side count as absent.
pub fn effective_email(own: Option<String>, fallback: Option<String>) -> Option<String> {
    let usable = |email: &String| !normalize_email(email).is_empty();
    own.filter(usable).or_else(|| fallback.filter(usable))
}

/// Lowercase and strip scheme, a leading `www.`, and trailing slashes, so
/// `https://www.JaneFit.com/` and `http://janefit.com` compare equal.
/// Returns `None` when nothing is left.
pub fn normalize_website(url: &str) -> Option<String> {
    let lowered = url.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let trimmed = without_www.trim_end_matches('/');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Similarity ratio in `[0, 1]` between two already-normalized names:
/// `1 - levenshtein / max_len`, counted in chars.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_collapses_whitespace_and_case() {
        assert_eq!(normalize_name("  Jane   DOE "), "jane doe");
        assert_eq!(normalize_name("Jane\tDoe"), "jane doe");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn blank_emails_count_as_absent() {
        assert_eq!(effective_email(Some("".into()), None), None);
        assert_eq!(
            effective_email(Some("  ".into()), Some("jane@fit.com".into())).as_deref(),
            Some("jane@fit.com")
        );
        assert_eq!(
            effective_email(Some("own@fit.com".into()), Some("other@fit.com".into())).as_deref(),
            Some("own@fit.com")
        );
        assert_eq!(effective_email(None, Some(" \t".into())), None);
    }

    #[test]
    fn normalize_website_ignores_scheme_www_and_slash() {
        let a = normalize_website("https://www.JaneFit.com/");
        let b = normalize_website("http://janefit.com");
        assert_eq!(a.as_deref(), Some("janefit.com"));
        assert_eq!(a, b);
        assert_eq!(normalize_website("https://"), None);
        assert_eq!(
            normalize_website("janefit.com/coaching").as_deref(),
            Some("janefit.com/coaching")
        );
    }

    #[test]
    fn similarity_separates_close_and_distinct_names() {
        assert_eq!(name_similarity("jane doe", "jane doe"), 1.0);
        assert!(name_similarity("jane doe", "john doe") < 0.85);
        assert!(name_similarity("jane fit", "jane fitness") < 0.85);
        assert!(name_similarity("sarah fitness", "sarah fitnes") >= 0.85);
    }
}
