//! Projection of the catalog into the video picker.

use vidshelf_api_models::VideoId;

use crate::catalog::Catalog;

/// Label of the leading entry standing for "nothing selected".
pub const PLACEHOLDER_LABEL: &str = "Choose a video";

/// One rendered picker entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionOption {
    /// Option value; empty for the placeholder.
    pub value: String,
    /// Visible text.
    pub label: String,
    /// Whether this entry reflects the current selection.
    pub selected: bool,
}

/// Render `catalog` into picker entries, placeholder first, catalog order kept.
///
/// The placeholder is marked whenever the selection is absent or not listed,
/// so exactly one entry is always marked.
#[must_use]
pub fn project(catalog: &Catalog, selection: Option<&VideoId>) -> Vec<SelectionOption> {
    let selection = selection.filter(|video| catalog.contains(video));
    let mut options = Vec::with_capacity(catalog.len() + 1);
    options.push(SelectionOption {
        value: String::new(),
        label: PLACEHOLDER_LABEL.to_string(),
        selected: selection.is_none(),
    });
    options.extend(catalog.iter().map(|video| SelectionOption {
        value: video.as_str().to_string(),
        label: video.as_str().to_string(),
        selected: selection == Some(video),
    }));
    options
}

/// Parse a picker value back into a selection.
#[must_use]
pub fn parse_choice(value: &str) -> Option<VideoId> {
    (!value.is_empty()).then(|| VideoId::from(value))
}
