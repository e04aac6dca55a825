//! Server-side list views
//!
//! A [`QuerySession`] holds what one open transaction table has chosen:
//! criteria, sort, page and selection. The [`SessionRegistry`] keeps them
//! by id so clients can drive a view one change at a time.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query::{query, FilterCriteria, FilterRequest, SortKey, SortSpec, TransactionView};
use super::selection::{reset_selection, update_selection, SelectionAction, SelectionSet};
use super::Transaction;

/// State of one transaction list view: criteria, sort, page and selection
#[derive(Debug, Clone)]
pub struct QuerySession {
    criteria: FilterCriteria,
    sort: SortSpec,
    page: usize,
    page_size: usize,
    selection: SelectionSet,
    view_ids: Vec<String>,
}

impl QuerySession {
    pub fn new(page_size: usize) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
            selection: SelectionSet::new(),
            view_ids: Vec::new(),
        }
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// New filter input. Always clears the selection and returns to page 1.
    pub fn set_filters(&mut self, request: &FilterRequest) {
        self.criteria = FilterCriteria::from_request(request);
        self.page = 1;
        self.reset_selection();
    }

    /// Header click on a sortable column
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggled(key);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn reset_selection(&mut self) {
        self.selection = reset_selection();
        self.view_ids.clear();
    }

    /// Recompute the view and drop selected ids that scrolled out of it
    pub fn refresh(&mut self, transactions: &[Transaction]) -> TransactionView {
        let view = query(transactions, &self.criteria, self.sort, self.page, self.page_size);
        self.view_ids = view.ids();
        self.selection.retain_visible(&self.view_ids);
        view
    }

    /// Apply a checkbox action to the last refreshed view
    pub fn select(&mut self, action: &SelectionAction) -> &SelectionSet {
        self.selection = update_selection(&self.selection, &self.view_ids, action);
        &self.selection
    }
}

/// A session's state after a change, as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub view: TransactionView,
    pub sort: SortSpec,
    pub selection: SelectionSet,
}

/// Open sessions by id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, QuerySession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session on the default view
    pub async fn create(&self, page_size: usize, transactions: &[Transaction]) -> SessionView {
        let id = Uuid::new_v4();
        let mut session = QuerySession::new(page_size);
        let view = snapshot(id, &mut session, transactions);

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);
        tracing::debug!(session = %id, open = sessions.len(), "Opened list session");
        view
    }

    /// Apply `change` to a session, then refresh it against `transactions`
    ///
    /// Returns `None` for an unknown id.
    pub async fn update<F>(&self, id: Uuid, transactions: &[Transaction], change: F) -> Option<SessionView>
    where
        F: FnOnce(&mut QuerySession),
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        change(session);
        Some(snapshot(id, session, transactions))
    }

    /// Current state of a session
    pub async fn view(&self, id: Uuid, transactions: &[Transaction]) -> Option<SessionView> {
        self.update(id, transactions, |_| {}).await
    }

    /// Close a session. Returns false if it was not open.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }
}

fn snapshot(id: Uuid, session: &mut QuerySession, transactions: &[Transaction]) -> SessionView {
    let view = session.refresh(transactions);
    SessionView {
        session_id: id,
        view,
        sort: session.sort_spec(),
        selection: session.selection().clone(),
    }
}
