//! Cross-page selection bookkeeping. The registry remembers every record the
//! user checked on any page; the page selection tracks which of the visible
//! rows are checked right now plus the snapshot needed to tell an unchecked
//! box apart from a row that merely scrolled off the page.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::models::Artwork;

/// Every selected record keyed by id, in the order it was first checked.
#[derive(Debug, Default, Clone)]
pub struct SelectionRegistry {
    entries: IndexMap<u64, Artwork>,
}

impl SelectionRegistry {
    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Artwork> {
        self.entries.get(&id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Artwork> {
        self.entries.get_index(index).map(|(_, art)| art)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artwork> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    /// Insert unless already present. An existing entry keeps its position
    /// and its stored record.
    fn insert(&mut self, art: &Artwork) -> bool {
        if self.entries.contains_key(&art.id) {
            return false;
        }
        self.entries.insert(art.id, art.clone());
        true
    }

    /// Remove while preserving the order of the remaining entries.
    fn remove(&mut self, id: u64) -> Option<Artwork> {
        self.entries.shift_remove(&id)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Registry plus the per-page view of it.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    registry: SelectionRegistry,
    current: Vec<Artwork>,
    previous_ids: HashSet<u64>,
}

impl Selection {
    pub fn registry(&self) -> &SelectionRegistry {
        &self.registry
    }

    /// Checked rows on the visible page.
    pub fn current(&self) -> &[Artwork] {
        &self.current
    }

    /// Ids that were checked on the page at the last reconciliation.
    pub fn previous_ids(&self) -> &HashSet<u64> {
        &self.previous_ids
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.registry.contains(id)
    }

    /// Recompute the page view from the registry after a new page arrived.
    /// The result is exactly the visible rows whose id is registered.
    pub fn reconcile_page(&mut self, visible: &[Artwork]) {
        self.current = visible
            .iter()
            .filter(|art| self.registry.contains(art.id))
            .cloned()
            .collect();
        self.previous_ids = self.current.iter().map(|art| art.id).collect();
    }

    /// Forget the page view without touching the registry.
    pub fn reset_page(&mut self) {
        self.current.clear();
        self.previous_ids.clear();
    }

    /// Apply the full set of rows the table now reports as checked.
    ///
    /// New rows are added to the registry; ids that were checked at the last
    /// reconciliation and are missing now are removed. Registry entries for
    /// rows outside `visible` are never touched, and reported rows that are
    /// not on the visible page are ignored.
    pub fn apply_selection_change(&mut self, visible: &[Artwork], new_selection: &[Artwork]) {
        let visible_ids: HashSet<u64> = visible.iter().map(|art| art.id).collect();
        let mut new_ids = HashSet::new();
        let mut accepted = Vec::with_capacity(new_selection.len());

        for art in new_selection {
            if !visible_ids.contains(&art.id) {
                debug!(id = art.id, "ignoring selection of a row that is not visible");
                continue;
            }
            if new_ids.insert(art.id) {
                accepted.push(art.clone());
            }
        }

        for art in &accepted {
            if self.registry.insert(art) {
                debug!(artwork = %art, "selected artwork");
            }
        }

        for id in self.previous_ids.difference(&new_ids) {
            if let Some(art) = self.registry.remove(*id) {
                debug!(artwork = %art, "deselected artwork");
            }
        }

        self.current = accepted;
        self.previous_ids = new_ids;
    }

    /// Drop one record from the registry wherever it lives. If it is on the
    /// visible page, the page view forgets it too.
    pub fn deselect(&mut self, id: u64, visible: &[Artwork]) -> Option<Artwork> {
        let removed = self.registry.remove(id);
        if visible.iter().any(|art| art.id == id) {
            self.current.retain(|art| art.id != id);
            self.previous_ids.remove(&id);
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.reset_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: std::ops::RangeInclusive<u64>) -> Vec<Artwork> {
        ids.map(Artwork::with_id).collect()
    }

    fn ids(arts: &[Artwork]) -> Vec<u64> {
        arts.iter().map(|art| art.id).collect()
    }

    #[test]
    fn reconcile_is_the_intersection_with_the_registry() {
        let first = page(1..=10);
        let mut selection = Selection::default();
        selection.reconcile_page(&first);
        selection.apply_selection_change(&first, &[first[2].clone(), first[7].clone()]);

        let overlapping = page(6..=15);
        selection.reconcile_page(&overlapping);
        assert_eq!(ids(selection.current()), vec![8]);
        assert_eq!(selection.previous_ids(), &HashSet::from([8]));
        assert!(selection.is_selected(3));
    }

    #[test]
    fn unchecking_a_previously_checked_row_removes_it() {
        let rows = page(1..=5);
        let mut selection = Selection::default();
        selection.reconcile_page(&rows);

        selection.apply_selection_change(&rows, &[rows[0].clone(), rows[1].clone()]);
        assert_eq!(selection.registry().len(), 2);

        selection.apply_selection_change(&rows, &[rows[1].clone()]);
        assert!(!selection.is_selected(1));
        assert!(selection.is_selected(2));
        assert_eq!(ids(selection.current()), vec![2]);
    }

    #[test]
    fn selection_change_leaves_other_pages_alone() {
        let first = page(1..=5);
        let second = page(6..=10);
        let mut selection = Selection::default();

        selection.reconcile_page(&first);
        selection.apply_selection_change(&first, &[first[0].clone()]);

        selection.reconcile_page(&second);
        selection.apply_selection_change(&second, &[second[4].clone()]);
        selection.apply_selection_change(&second, &[]);

        assert!(selection.is_selected(1));
        assert!(!selection.is_selected(10));
        assert!(selection.current().is_empty());
    }

    #[test]
    fn rows_outside_the_visible_page_are_ignored() {
        let rows = page(1..=3);
        let mut selection = Selection::default();
        selection.reconcile_page(&rows);

        selection.apply_selection_change(&rows, &[Artwork::with_id(99), rows[0].clone()]);
        assert!(!selection.is_selected(99));
        assert_eq!(ids(selection.current()), vec![1]);
    }

    #[test]
    fn duplicate_rows_in_a_selection_are_collapsed() {
        let rows = page(1..=3);
        let mut selection = Selection::default();
        selection.reconcile_page(&rows);

        selection.apply_selection_change(&rows, &[rows[1].clone(), rows[1].clone()]);
        assert_eq!(ids(selection.current()), vec![2]);
        assert_eq!(selection.registry().len(), 1);
    }

    #[test]
    fn deselect_works_for_off_page_and_on_page_items() {
        let first = page(1..=3);
        let second = page(4..=6);
        let mut selection = Selection::default();
        selection.reconcile_page(&first);
        selection.apply_selection_change(&first, &first);
        selection.reconcile_page(&second);
        selection.apply_selection_change(&second, &[second[0].clone()]);

        assert_eq!(selection.deselect(2, &second).map(|art| art.id), Some(2));
        assert!(!selection.is_selected(2));
        assert_eq!(ids(selection.current()), vec![4]);

        assert!(selection.deselect(4, &second).is_some());
        assert!(selection.current().is_empty());
        assert!(selection.previous_ids().is_empty());
        assert!(selection.deselect(4, &second).is_none());
    }

    #[test]
    fn registry_keeps_selection_order_after_removals() {
        let rows = page(1..=4);
        let mut selection = Selection::default();
        selection.reconcile_page(&rows);
        selection.apply_selection_change(&rows, &[rows[3].clone()]);
        selection.apply_selection_change(&rows, &[rows[3].clone(), rows[0].clone()]);
        selection.apply_selection_change(
            &rows,
            &[rows[3].clone(), rows[0].clone(), rows[2].clone()],
        );
        selection.deselect(1, &rows);

        let order: Vec<u64> = selection.registry().ids().collect();
        assert_eq!(order, vec![4, 3]);
    }

    #[test]
    fn clear_all_empties_everything() {
        let rows = page(1..=3);
        let mut selection = Selection::default();
        selection.reconcile_page(&rows);
        selection.apply_selection_change(&rows, &rows);

        selection.clear_all();
        assert!(selection.registry().is_empty());
        assert!(selection.current().is_empty());
        assert!(selection.previous_ids().is_empty());
    }
}
