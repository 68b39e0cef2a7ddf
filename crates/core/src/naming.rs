//! Deterministic output naming for element references and scene renders.
//!
//! Filenames depend only on stable storyboard data (element names, scene
//! index and timestamp), so reruns over the same storyboard target the same
//! files and the skip-if-exists check can detect completed work.

use std::collections::HashMap;

use crate::hashing::short_hash;

/// Extension of every generated image.
pub const IMAGE_EXTENSION: &str = "png";

/// Base used when an element name sanitizes to nothing.
const EMPTY_KEY_BASE: &str = "element";

/// Reduce an element name to a filesystem-safe key.
///
/// Keeps alphanumerics, spaces, hyphens and underscores, trims surrounding
/// spaces, then turns each remaining space into an underscore.
///
/// ```
/// use dreamer_core::naming::sanitize_name;
///
/// assert_eq!(sanitize_name("Hero!"), "Hero");
/// assert_eq!(sanitize_name(" Red Car "), "Red_Car");
/// assert_eq!(sanitize_name("x-wing_2"), "x-wing_2");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// Derive a unique key for every element name, preserving input order.
///
/// Names whose sanitized form is unique keep it as-is. Names that sanitize
/// to a key shared with another element, or to nothing at all, get a
/// `_<short hash of the name>` suffix. Exact duplicate names additionally get
/// `_<n>` for their n-th occurrence (starting at 2).
///
/// ```
/// use dreamer_core::naming::element_keys;
///
/// let keys = element_keys(&["Char1", "Hero!", "Hero?"]);
/// assert_eq!(keys[0], "Char1");
/// assert!(keys[1].starts_with("Hero_"));
/// assert_ne!(keys[1], keys[2]);
/// ```
pub fn element_keys<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let sanitized: Vec<String> = names.iter().map(|n| sanitize_name(n.as_ref())).collect();

    let mut group_sizes: HashMap<&str, usize> = HashMap::new();
    for key in &sanitized {
        *group_sizes.entry(key.as_str()).or_default() += 1;
    }

    let mut occurrences: HashMap<String, u32> = HashMap::new();
    names
        .iter()
        .zip(&sanitized)
        .map(|(name, clean)| {
            let name = name.as_ref();
            let shared = group_sizes.get(clean.as_str()).copied().unwrap_or(0) > 1;
            let mut key = if clean.is_empty() {
                format!("{EMPTY_KEY_BASE}_{}", short_hash(name))
            } else if shared {
                format!("{clean}_{}", short_hash(name))
            } else {
                clean.clone()
            };

            let seen = occurrences.entry(key.clone()).or_default();
            *seen += 1;
            if *seen > 1 {
                key.push('_');
                key.push_str(&seen.to_string());
            }
            key
        })
        .collect()
}

/// Filename of an element reference image.
pub fn element_image_filename(key: &str) -> String {
    format!("{key}.{IMAGE_EXTENSION}")
}

/// Filename of a rendered scene.
///
/// Convention: `scene_{index:03}_{timestamp:05.1}s.png` with the decimal
/// point replaced by an underscore.
///
/// ```
/// use dreamer_core::naming::scene_image_filename;
///
/// assert_eq!(scene_image_filename(0, 0.0), "scene_000_000_0s.png");
/// assert_eq!(scene_image_filename(12, 83.27), "scene_012_083_3s.png");
/// ```
pub fn scene_image_filename(index: usize, timestamp: f64) -> String {
    let stamp = format!("{timestamp:05.1}").replace('.', "_");
    format!("scene_{index:03}_{stamp}s.{IMAGE_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- sanitize_name -------------------------------------------------------

    #[test]
    fn strips_punctuation() {
        assert_eq!(sanitize_name("Hero!"), "Hero");
        assert_eq!(sanitize_name("The (Old) Man."), "The_Old_Man");
    }

    #[test]
    fn keeps_hyphen_and_underscore() {
        assert_eq!(sanitize_name("sub-zero_unit"), "sub-zero_unit");
    }

    #[test]
    fn spaces_become_underscores_without_collapsing() {
        assert_eq!(sanitize_name("Slow  Walk"), "Slow__Walk");
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(sanitize_name("Café Noir"), "Café_Noir");
    }

    #[test]
    fn path_separators_removed() {
        assert_eq!(sanitize_name("../etc/passwd"), "etcpasswd");
    }

    // -- element_keys --------------------------------------------------------

    #[test]
    fn unique_names_keep_bare_keys() {
        assert_eq!(element_keys(&["Char1", "Red Car"]), vec!["Char1", "Red_Car"]);
    }

    #[test]
    fn sanitized_collisions_get_hash_suffix() {
        let keys = element_keys(&["Hero!", "Hero?", "Sidekick"]);
        assert_eq!(keys[0], format!("Hero_{}", short_hash("Hero!")));
        assert_eq!(keys[1], format!("Hero_{}", short_hash("Hero?")));
        assert_eq!(keys[2], "Sidekick");
    }

    #[test]
    fn collision_with_clean_name_suffixes_both() {
        let keys = element_keys(&["Hero", "Hero!"]);
        assert_ne!(keys[0], keys[1]);
        assert!(keys[0].starts_with("Hero_"));
        assert!(keys[1].starts_with("Hero_"));
    }

    #[test]
    fn exact_duplicates_get_occurrence_suffix() {
        let keys = element_keys(&["Hero", "Hero", "Hero"]);
        let base = format!("Hero_{}", short_hash("Hero"));
        assert_eq!(keys, vec![base.clone(), format!("{base}_2"), format!("{base}_3")]);
    }

    #[test]
    fn empty_sanitized_name_gets_fallback_base() {
        let keys = element_keys(&["!!!"]);
        assert_eq!(keys[0], format!("element_{}", short_hash("!!!")));
    }

    #[test]
    fn keys_are_deterministic_across_calls() {
        let names = ["Hero!", "Hero?", "Villain", "Villain"];
        assert_eq!(element_keys(&names), element_keys(&names));
    }

    // -- filenames -----------------------------------------------------------

    #[test]
    fn element_filename_appends_png() {
        assert_eq!(element_image_filename("Char1"), "Char1.png");
    }

    #[test]
    fn scene_filename_zero() {
        assert_eq!(scene_image_filename(0, 0.0), "scene_000_000_0s.png");
    }

    #[test]
    fn scene_filename_rounds_to_one_decimal() {
        assert_eq!(scene_image_filename(3, 5.0), "scene_003_005_0s.png");
        assert_eq!(scene_image_filename(7, 12.34), "scene_007_012_3s.png");
    }

    #[test]
    fn scene_filename_wide_values() {
        assert_eq!(scene_image_filename(1234, 1234.5), "scene_1234_1234_5s.png");
    }
}
