//! Row selection for bulk actions
//!
//! A selection only ever holds ids that are visible in the current view.
//! Any change to the filter criteria clears it.

use serde::{Deserialize, Serialize};

/// Selected transaction ids, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(Vec<String>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|selected| selected == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    fn insert(&mut self, id: &str) {
        if !self.contains(id) {
            self.0.push(id.to_string());
        }
    }

    fn remove(&mut self, id: &str) {
        self.0.retain(|selected| selected != id);
    }

    pub(super) fn retain_visible(&mut self, view_ids: &[String]) {
        self.0.retain(|selected| view_ids.contains(selected));
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for id in iter {
            set.insert(&id.into());
        }
        set
    }
}

/// What the user did to the selection checkboxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum SelectionAction {
    /// Row checkbox
    Toggle(String),
    /// Select exactly the rows in the current view
    SelectAll,
    /// Header checkbox: select the view unless it is already fully selected
    ToggleAll,
    Clear,
}

/// Apply `action` against the ids of the current view
///
/// The result never contains an id outside `view_ids`.
pub fn update_selection(
    current: &SelectionSet,
    view_ids: &[String],
    action: &SelectionAction,
) -> SelectionSet {
    let mut next = current.clone();
    next.retain_visible(view_ids);

    match action {
        SelectionAction::Toggle(id) => {
            if !view_ids.contains(id) {
                tracing::debug!(id = %id, "Ignoring toggle for a row outside the view");
            } else if next.contains(id) {
                next.remove(id);
            } else {
                next.insert(id);
            }
            next
        }
        SelectionAction::SelectAll => view_ids.iter().cloned().collect(),
        SelectionAction::ToggleAll => {
            let all_selected = !view_ids.is_empty() && view_ids.iter().all(|id| next.contains(id));
            if all_selected {
                SelectionSet::new()
            } else {
                view_ids.iter().cloned().collect()
            }
        }
        SelectionAction::Clear => SelectionSet::new(),
    }
}

/// The empty selection every filter change starts from
pub fn reset_selection() -> SelectionSet {
    SelectionSet::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle() {
        let view = ids(&["3", "5", "7"]);
        let selection = update_selection(&SelectionSet::new(), &view, &SelectionAction::Toggle("5".into()));
        assert_eq!(selection.ids(), ["5"]);

        let selection = update_selection(&selection, &view, &SelectionAction::Toggle("5".into()));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_outside_view_is_ignored() {
        let view = ids(&["3", "5"]);
        let selection = update_selection(&SelectionSet::new(), &view, &SelectionAction::Toggle("9".into()));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_takes_exactly_the_view() {
        let view = ids(&["3", "5", "7"]);
        let current: SelectionSet = ["1", "5"].into_iter().collect();

        let selection = update_selection(&current, &view, &SelectionAction::SelectAll);
        assert_eq!(selection.ids(), ["3", "5", "7"]);
    }

    #[test]
    fn test_toggle_all() {
        let view = ids(&["3", "5"]);
        let partial: SelectionSet = ["3"].into_iter().collect();

        let all = update_selection(&partial, &view, &SelectionAction::ToggleAll);
        assert_eq!(all.len(), 2);

        let none = update_selection(&all, &view, &SelectionAction::ToggleAll);
        assert!(none.is_empty());

        let empty_view = update_selection(&SelectionSet::new(), &[], &SelectionAction::ToggleAll);
        assert!(empty_view.is_empty());
    }

    #[test]
    fn test_clear() {
        let view = ids(&["3"]);
        let current: SelectionSet = ["3"].into_iter().collect();
        assert!(update_selection(&current, &view, &SelectionAction::Clear).is_empty());
        assert!(reset_selection().is_empty());
    }

    #[test]
    fn test_action_serde() {
        let action: SelectionAction = serde_json::from_str(r#"{"kind": "toggle", "id": "tx_1"}"#).unwrap();
        assert_eq!(action, SelectionAction::Toggle("tx_1".into()));

        let action: SelectionAction = serde_json::from_str(r#"{"kind": "selectAll"}"#).unwrap();
        assert_eq!(action, SelectionAction::SelectAll);
    }
}
