//! Chooses the task a capture is attributed to.

use snaptrack_domain::{extract_domain, SelectedTask, UrlMapping};

/// First mapping (in list order) whose URL shares `active_domain`'s origin.
///
/// Mappings without a URL never match.
pub fn find_mapping<'a>(active_domain: &str, mappings: &'a [UrlMapping]) -> Option<&'a UrlMapping> {
    mappings.iter().find(|mapping| {
        mapping
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .is_some_and(|url| extract_domain(url) == active_domain)
    })
}

/// The matching mapping's task, or `fallback` when no mapping matches.
pub fn resolve_task(active_domain: &str, mappings: &[UrlMapping], fallback: &SelectedTask) -> SelectedTask {
    find_mapping(active_domain, mappings)
        .map_or_else(|| fallback.clone(), UrlMapping::as_selected_task)
}
