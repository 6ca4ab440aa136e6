//! Screenshot object names

use rand::Rng;
use snaptrack_domain::constants::{
    FILENAME_SUFFIX_LEN, SCREENSHOT_FILE_EXTENSION, UNASSIGNED_TASK_LABEL,
};
use snaptrack_domain::TaskId;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `"{task}_{timestamp_ms}{suffix}.png"` where `suffix` is random base-36.
///
/// Characters outside `[A-Za-z0-9_-]` in textual task ids are replaced so the
/// name stays a single path segment.
pub fn screenshot_filename<R: Rng + ?Sized>(
    task_id: Option<&TaskId>,
    timestamp_ms: i64,
    rng: &mut R,
) -> String {
    let label = task_id.map_or_else(|| UNASSIGNED_TASK_LABEL.to_string(), |id| sanitize(&id.to_string()));
    let suffix = random_suffix(rng, FILENAME_SUFFIX_LEN);
    format!("{label}_{timestamp_ms}{suffix}.{SCREENSHOT_FILE_EXTENSION}")
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())])).collect()
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        UNASSIGNED_TASK_LABEL.to_string()
    } else {
        cleaned
    }
}
