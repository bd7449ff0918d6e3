//! Pagination state, the visible page, and the selection registry behind the
//! table. The controller never performs I/O on its own: `begin_load` hands out
//! a tagged [`LoadRequest`], somebody fetches it, and `apply_load` folds the
//! outcome back in. Outcomes for anything but the newest request are dropped,
//! so a slow response can never overwrite a newer page.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::api::ArtworkSource;
use crate::error::FetchError;
use crate::models::{Artwork, ArtworkPage};
use crate::selection::{Selection, SelectionRegistry};

/// One page fetch the caller should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    /// Monotonic tag; only the latest one is applied.
    pub seq: u64,
    /// 1-based page number.
    pub page: u32,
    pub rows: u32,
}

/// What happened to a fetch outcome handed to [`TableController::apply_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    Stale,
}

pub struct TableController {
    page: u32,
    rows_per_page: u32,
    total_records: u64,
    /// Total from the last successful load. A failed load zeroes
    /// `total_records` but keeps this, so the page range stays navigable.
    known_total: u64,
    visible_rows: Vec<Artwork>,
    selection: Selection,
    loading: bool,
    next_seq: u64,
    latest_seq: Option<u64>,
    last_error: Option<String>,
}

impl TableController {
    /// Start on `page` (1-based) with `rows_per_page` rows. Zero values are
    /// bumped to one.
    pub fn new(page: u32, rows_per_page: u32) -> Self {
        Self {
            page: page.max(1),
            rows_per_page: rows_per_page.max(1),
            total_records: 0,
            known_total: 0,
            visible_rows: Vec::new(),
            selection: Selection::default(),
            loading: false,
            next_seq: 0,
            latest_seq: None,
            last_error: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn rows_per_page(&self) -> u32 {
        self.rows_per_page
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn visible_rows(&self) -> &[Artwork] {
        &self.visible_rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn registry(&self) -> &SelectionRegistry {
        self.selection.registry()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.registry().len()
    }

    pub fn current_page_selection(&self) -> &[Artwork] {
        self.selection.current()
    }

    pub fn previous_page_selected_ids(&self) -> &HashSet<u64> {
        self.selection.previous_ids()
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.is_selected(id)
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of pages the last known server total spans. Always at least one
    /// so the paginator has something to show, and never less than the
    /// current page, so a page that failed to load stays reachable.
    pub fn page_count(&self) -> u32 {
        let pages = self.known_total.div_ceil(u64::from(self.rows_per_page));
        u32::try_from(pages)
            .unwrap_or(u32::MAX)
            .max(1)
            .max(self.page)
    }

    /// 0-based offset of the first row on the current page.
    pub fn first_record_offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.rows_per_page)
    }

    /// Tag a fetch for the current page and row count and mark the table as
    /// loading. Any request handed out earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadRequest {
        self.next_seq += 1;
        self.latest_seq = Some(self.next_seq);
        self.loading = true;
        let request = LoadRequest {
            seq: self.next_seq,
            page: self.page,
            rows: self.rows_per_page,
        };
        debug!(?request, "page load started");
        request
    }

    /// Fold a fetch outcome back into the table. Failures never escape: the
    /// table falls back to an empty page, while the registry is kept.
    pub fn apply_load(&mut self, seq: u64, result: Result<ArtworkPage, FetchError>) -> LoadOutcome {
        if self.latest_seq != Some(seq) {
            debug!(seq, latest = ?self.latest_seq, "discarding stale page load");
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                info!(
                    page = self.page,
                    rows = page.rows.len(),
                    total = page.total,
                    "loaded artworks page"
                );
                self.visible_rows = page.rows;
                self.total_records = page.total;
                self.known_total = page.total;
                self.selection.reconcile_page(&self.visible_rows);
                self.last_error = None;
                LoadOutcome::Loaded
            }
            Err(err) => {
                error!(page = self.page, error = %err, "error fetching artworks");
                self.visible_rows.clear();
                self.total_records = 0;
                self.selection.reset_page();
                self.last_error = Some(err.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch the current page from `source` and apply the result in one go.
    pub async fn load_page<S>(&mut self, source: &S) -> LoadOutcome
    where
        S: ArtworkSource + ?Sized,
    {
        let request = self.begin_load();
        let result = source.fetch_page(request.page, request.rows).await;
        self.apply_load(request.seq, result)
    }

    /// Fetch the current page again with the current row count.
    pub fn reload(&mut self) -> LoadRequest {
        self.begin_load()
    }

    /// Page-change event from the paginator: a 0-based page index plus the
    /// row count. Always asks for a fresh fetch.
    pub fn change_page(&mut self, page_index: u32, rows: u32) -> LoadRequest {
        self.page = page_index.saturating_add(1);
        self.rows_per_page = rows.max(1);
        self.begin_load()
    }

    /// Switch the page size while keeping the first visible record on screen.
    pub fn change_rows_per_page(&mut self, rows: u32) -> LoadRequest {
        let rows = rows.max(1);
        let index = self.first_record_offset() / u64::from(rows);
        self.change_page(u32::try_from(index).unwrap_or(u32::MAX - 1), rows)
    }

    /// Jump to a 1-based page, clamped to the known page range.
    pub fn go_to_page(&mut self, page: u32) -> LoadRequest {
        let page = page.clamp(1, self.page_count());
        self.change_page(page - 1, self.rows_per_page)
    }

    pub fn next_page(&mut self) -> Option<LoadRequest> {
        (self.page < self.page_count()).then(|| self.change_page(self.page, self.rows_per_page))
    }

    pub fn previous_page(&mut self) -> Option<LoadRequest> {
        (self.page > 1).then(|| self.change_page(self.page - 2, self.rows_per_page))
    }

    pub fn first_page(&mut self) -> Option<LoadRequest> {
        (self.page != 1).then(|| self.change_page(0, self.rows_per_page))
    }

    pub fn last_page(&mut self) -> Option<LoadRequest> {
        let last = self.page_count();
        (self.page != last).then(|| self.change_page(last - 1, self.rows_per_page))
    }

    /// The table reports the complete set of checked rows on the visible page.
    pub fn selection_change(&mut self, new_selection: &[Artwork]) {
        self.selection
            .apply_selection_change(&self.visible_rows, new_selection);
    }

    /// Remove one record from the registry, wherever it was selected.
    pub fn deselect(&mut self, id: u64) -> Option<Artwork> {
        self.selection.deselect(id, &self.visible_rows)
    }

    pub fn clear_all(&mut self) {
        info!(count = self.selected_count(), "clearing all selections");
        self.selection.clear_all();
    }
}
