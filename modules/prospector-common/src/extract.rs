//! Default extraction behaviors shared by every adapter: emails and
//! social profile references from free text, niche tags from keywords,
//! and source identifiers from profile references.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

// =============================================================================
// Email
// =============================================================================

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

/// First email-shaped substring in `text`, if any.
pub fn first_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

// =============================================================================
// Social references
// =============================================================================

static RE_INSTAGRAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:instagram\.com|instagr\.am)/([a-zA-Z0-9_.]+)").unwrap());
static RE_TIKTOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tiktok\.com/@([a-zA-Z0-9_.]+)").unwrap());
static RE_TWITTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:twitter\.com|x\.com)/([a-zA-Z0-9_]+)").unwrap());
static RE_FACEBOOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)facebook\.com/([a-zA-Z0-9.]+)").unwrap());
static RE_YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)youtube\.com/(?:@|channel/|c/)([a-zA-Z0-9_-]+)").unwrap()
});
static RE_LINKEDIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)linkedin\.com/in/([a-zA-Z0-9_-]+)").unwrap());
static RE_SKOOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)skool\.com/([a-zA-Z0-9_-]+)").unwrap());
static RE_PATREON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)patreon\.com/([a-zA-Z0-9_-]+)").unwrap());

const INSTAGRAM_SKIP: &[&str] = &["p", "reel", "reels", "stories", "explore", "accounts", "tv"];
const TWITTER_SKIP: &[&str] = &["intent", "share", "hashtag", "search", "i", "home"];
const FACEBOOK_SKIP: &[&str] = &["photo", "photos", "sharer", "events", "groups", "watch"];
const PATREON_SKIP: &[&str] = &["posts", "login", "join", "c"];
const NO_SKIP: &[&str] = &[];

struct SocialPattern {
    platform: &'static str,
    regex: &'static LazyLock<Regex>,
    skip_segments: &'static [&'static str],
}

const SOCIAL_PATTERNS: &[SocialPattern] = &[
    SocialPattern {
        platform: "instagram",
        regex: &RE_INSTAGRAM,
        skip_segments: INSTAGRAM_SKIP,
    },
    SocialPattern {
        platform: "tiktok",
        regex: &RE_TIKTOK,
        skip_segments: NO_SKIP,
    },
    SocialPattern {
        platform: "twitter",
        regex: &RE_TWITTER,
        skip_segments: TWITTER_SKIP,
    },
    SocialPattern {
        platform: "facebook",
        regex: &RE_FACEBOOK,
        skip_segments: FACEBOOK_SKIP,
    },
    SocialPattern {
        platform: "youtube",
        regex: &RE_YOUTUBE,
        skip_segments: NO_SKIP,
    },
    SocialPattern {
        platform: "linkedin",
        regex: &RE_LINKEDIN,
        skip_segments: NO_SKIP,
    },
    SocialPattern {
        platform: "skool",
        regex: &RE_SKOOL,
        skip_segments: NO_SKIP,
    },
    SocialPattern {
        platform: "patreon",
        regex: &RE_PATREON,
        skip_segments: PATREON_SKIP,
    },
];

/// Scan `text` for social profile links. Returns the first profile match per
/// platform, keyed by platform name, with the matched link text as value.
pub fn social_references(text: &str) -> BTreeMap<String, String> {
    let mut references = BTreeMap::new();

    for pattern in SOCIAL_PATTERNS {
        let first = pattern.regex.captures_iter(text).find(|cap| {
            let handle = cap[1].to_lowercase();
            !pattern.skip_segments.contains(&handle.as_str())
        });

        if let Some(cap) = first {
            references.insert(pattern.platform.to_string(), cap[0].to_string());
        }
    }

    references
}

/// Reduce a profile reference (URL or handle) to the identifier an adapter
/// expects: the last non-empty path segment, without query, fragment, or a
/// leading `@`.
pub fn source_id_from_reference(reference: &str) -> Option<String> {
    let without_query = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let segment = without_query
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .last()?;

    let id = segment.trim_start_matches('@');
    if id.is_empty() || id.contains(':') {
        return None;
    }
    Some(id.to_string())
}

// =============================================================================
// Niche tags
// =============================================================================

const NICHE_KEYWORDS: &[(&str, &[&str])] = &[
    ("fitness", &["fitness", "workout", "exercise", "training"]),
    ("yoga", &["yoga", "vinyasa", "ashtanga", "meditation"]),
    ("nutrition", &["nutrition", "diet", "meal prep", "macros", "calories"]),
    ("strength", &["strength", "powerlifting", "weightlifting", "bodybuilding"]),
    ("cardio", &["cardio", "running", "hiit", "endurance"]),
    ("pilates", &["pilates", "barre"]),
    ("wellness", &["wellness", "mindfulness", "mental health", "self-care"]),
    ("crossfit", &["crossfit", "wod", "functional fitness"]),
    ("calisthenics", &["calisthenics", "bodyweight"]),
    ("martial_arts", &["martial arts", "mma", "boxing", "kickboxing"]),
];

/// Fitness/wellness niche tags whose keywords appear in `text`.
pub fn niche_tags(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    NICHE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(tag, _)| tag.to_string())
        .collect()
}
