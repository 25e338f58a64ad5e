//! Human-readable labels for property URIs
//!
//! Properties arrive as URIs with camelCase local names
//! (`http://dbpedia.org/ontology/wikiPageID`). The label is what gets shown
//! to users and fed to the text heuristics; the normalized key is used only
//! to detect two URIs that describe the same thing.

/// Derive a display label from a property URI
///
/// Takes the last path segment and splits camelCase into words: a space is
/// inserted before an uppercase letter preceded by a lowercase letter, or
/// followed by a lowercase letter when it is not the first character.
pub fn derive_label(property_uri: &str) -> String {
    let local = property_uri.rsplit('/').next().unwrap_or(property_uri);
    let chars: Vec<char> = local.chars().collect();
    let mut label = String::with_capacity(local.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let before_lower = i > 0 && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if after_lower || before_lower {
                label.push(' ');
            }
        }
        label.push(c);
    }

    label
}

/// Key under which labels are deduplicated within one ranking run
pub fn normalized_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "")
}
