//! Session naming rules

use std::collections::HashSet;

/// Prefix of automatically numbered session names
pub const DEFAULT_NAME_PREFIX: &str = "New Conversation";

/// Return `candidate` if unused, otherwise `candidate (n)` with the
/// smallest free `n >= 1`
///
/// # Examples
///
/// ```
/// use llamachat::session::naming::unique_name;
///
/// assert_eq!(unique_name("Plans", ["Notes"]), "Plans");
/// assert_eq!(unique_name("Plans", ["Plans", "Plans (1)"]), "Plans (2)");
/// ```
pub fn unique_name<'a, I>(candidate: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = existing.into_iter().collect();
    if !taken.contains(candidate) {
        return candidate.to_string();
    }

    (1..)
        .map(|i| format!("{} ({})", candidate, i))
        .find(|name| !taken.contains(name.as_str()))
        .unwrap_or_else(|| candidate.to_string())
}

/// Default name for a fresh session: `New Conversation k` with the first
/// free `k` starting at `count + 1`
pub fn default_name<'a, I>(count: usize, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = existing.into_iter().collect();
    (count + 1..)
        .map(|k| format!("{} {}", DEFAULT_NAME_PREFIX, k))
        .find(|name| !taken.contains(name.as_str()))
        .unwrap_or_else(|| format!("{} {}", DEFAULT_NAME_PREFIX, count + 1))
}

/// Session title derived from the first prompt: its first `max_chars`
/// characters after trimming
pub fn title_from_prompt(prompt: &str, max_chars: usize) -> String {
    prompt.trim().chars().take(max_chars).collect()
}
