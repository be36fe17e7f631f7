use serde::{Deserialize, Deserializer};

/// Normalizes free text by stripping surrounding whitespace and
/// decomposing it into Unicode Normalization Form D, so that names
/// compare the same however the client composed them.
///
/// ```
/// use skysquare::normalization::normalize_text;
/// assert_eq!(normalize_text(" Café "), "Cafe\u{301}");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.as_ref().trim().nfd().to_string()
}

/// Normalizes an email address: trimmed and lower-cased.
///
/// ```
/// use skysquare::normalization::normalize_email;
/// assert_eq!(normalize_email(" Ana@Example.COM "), "ana@example.com");
/// ```
pub fn normalize_email(email: impl AsRef<str>) -> String {
    email.as_ref().trim().to_lowercase()
}

/// Deserializes an optional `String` after running it through
/// `normalize_text`. Blank strings become `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_text).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use unicode_normalization::is_nfd;

    use super::normalize_text;

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 2000, ..ProptestConfig::default()
        })]

        #[test]
        fn normalization_works(string in "(\\S.*\\S|\\S+)", space_before in "\\s*", space_after in "\\s*") {
            let normalized = normalize_text(format!("{}{}{}", space_before, string, space_after));

            prop_assert!(is_nfd(&normalized), "{:?} (normalized form of {:?}) is in NFD", normalized, string);

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, string);

            let trimmed = normalized.trim();

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&trimmed), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, string);
        }
    }
}
