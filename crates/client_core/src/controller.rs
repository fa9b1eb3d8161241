//! Catalog controller: pagination cursor, list fetches, row actions and dialogs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{BookId, Severity},
    protocol::Book,
};
use tracing::{debug, info, warn};

use crate::{
    api::CatalogApi,
    error::ClientError,
    notify::Notifier,
    render::{RowAction, TableBody},
    view::{BookForm, CatalogView, DialogKind, PaginationControls, StatusRegion},
};

pub const PAGE_SIZE: u32 = 10;
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this book?";

/// User-facing context of a request; each has one fixed failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionContext {
    LoadPage,
    Search,
    Create,
    LoadBook,
    Update,
    ToggleAvailability,
    Delete,
}

impl ActionContext {
    pub fn name(self) -> &'static str {
        match self {
            Self::LoadPage => "load_page",
            Self::Search => "search",
            Self::Create => "create",
            Self::LoadBook => "load_book",
            Self::Update => "update",
            Self::ToggleAvailability => "toggle_availability",
            Self::Delete => "delete",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Self::LoadPage => "Failed to load books",
            Self::Search => "Failed to search books",
            Self::Create => "Failed to add the book",
            Self::LoadBook => "Failed to load book details",
            Self::Update => "Failed to update the book",
            Self::ToggleAvailability => "Failed to change book availability",
            Self::Delete => "Failed to delete the book",
        }
    }
}

struct ControllerState {
    current_page: u32,
    /// Last ticket issued to a list fetch; only its result may render.
    generation: u64,
}

impl ControllerState {
    fn next_ticket(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

pub struct CatalogController {
    api: Arc<dyn CatalogApi>,
    view: Arc<dyn CatalogView>,
    notifier: Notifier,
    page_size: u32,
    state: Mutex<ControllerState>,
}

impl CatalogController {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        view: Arc<dyn CatalogView>,
        status: Arc<dyn StatusRegion>,
    ) -> Self {
        Self::with_notifier(api, view, Notifier::new(status))
    }

    pub fn with_notifier(
        api: Arc<dyn CatalogApi>,
        view: Arc<dyn CatalogView>,
        notifier: Notifier,
    ) -> Self {
        Self {
            api,
            view,
            notifier,
            page_size: PAGE_SIZE,
            state: Mutex::new(ControllerState {
                current_page: 1,
                generation: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.state().generation == ticket
    }

    pub async fn load_page(&self, page: u32) {
        let page = page.max(1);
        let ticket = {
            let mut state = self.state();
            state.current_page = page;
            state.next_ticket()
        };
        debug!(page, page_size = self.page_size, ticket, "loading catalog page");

        let result = self.api.list_books(page, self.page_size).await;
        if !self.is_latest(ticket) {
            debug!(page, ticket, "discarding stale page response");
            return;
        }
        match result {
            Ok(books) => {
                self.render(&books);
                self.view.set_pagination(PaginationControls::browse(
                    page,
                    books.len(),
                    self.page_size,
                ));
            }
            Err(err) => self.report_failure(ActionContext::LoadPage, &err),
        }
    }

    /// Reloads the page under the cursor.
    pub async fn reload(&self) {
        let page = self.current_page();
        self.load_page(page).await;
    }

    pub async fn next_page(&self) {
        let page = {
            let mut state = self.state();
            state.current_page = state.current_page.saturating_add(1);
            state.current_page
        };
        self.load_page(page).await;
    }

    /// No-op on the first page.
    pub async fn previous_page(&self) {
        let page = {
            let mut state = self.state();
            if state.current_page <= 1 {
                return;
            }
            state.current_page -= 1;
            state.current_page
        };
        self.load_page(page).await;
    }

    /// Blank queries fall back to browsing from page 1.
    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.load_page(1).await;
            return;
        }

        let ticket = self.state().next_ticket();
        debug!(query, ticket, "searching catalog");
        let result = self.api.search_books(query).await;
        if !self.is_latest(ticket) {
            debug!(query, ticket, "discarding stale search response");
            return;
        }
        match result {
            Ok(books) => {
                self.render(&books);
                self.view.set_pagination(PaginationControls::search());
            }
            Err(err) => self.report_failure(ActionContext::Search, &err),
        }
    }

    pub fn render(&self, books: &[Book]) {
        self.view.render_table(&TableBody::render(books));
    }

    /// Single entry point for the delegated row triggers.
    pub async fn dispatch(&self, action: RowAction) {
        debug!(action = action.name(), id = %action.id(), "row action");
        match action {
            RowAction::Edit(id) => self.begin_edit(id).await,
            RowAction::ToggleAvailability(id) => self.toggle_availability(id).await,
            RowAction::Delete(id) => self.delete(id).await,
        }
    }

    pub fn open_create(&self) {
        self.view.open_dialog(DialogKind::Create);
    }

    pub async fn submit_create(&self) {
        let payload = self.view.dialog_form(DialogKind::Create).to_payload();
        match self.api.create_book(&payload).await {
            Ok(book) => {
                info!(id = %book.id, title = %book.title, "book created");
                self.view.close_dialog(DialogKind::Create);
                self.view.reset_dialog(DialogKind::Create);
                self.reload().await;
                self.show_message("Book added", Severity::Success);
            }
            Err(err) => self.report_failure(ActionContext::Create, &err),
        }
    }

    pub async fn begin_edit(&self, id: BookId) {
        match self.api.get_book(id).await {
            Ok(book) => {
                self.view
                    .fill_dialog(DialogKind::Edit, &BookForm::from_book(&book));
                self.view.open_dialog(DialogKind::Edit);
            }
            Err(err) => self.report_failure(ActionContext::LoadBook, &err),
        }
    }

    pub async fn submit_edit(&self) {
        let form = self.view.dialog_form(DialogKind::Edit);
        let Some(id) = form.id else {
            warn!("edit submitted without a loaded book");
            self.show_message(ActionContext::Update.failure_message(), Severity::Danger);
            return;
        };
        match self.api.update_book(id, &form.to_payload()).await {
            Ok(book) => {
                info!(id = %book.id, "book updated");
                self.view.close_dialog(DialogKind::Edit);
                self.reload().await;
                self.show_message("Book updated", Severity::Success);
            }
            Err(err) => self.report_failure(ActionContext::Update, &err),
        }
    }

    pub async fn toggle_availability(&self, id: BookId) {
        match self.api.toggle_availability(id).await {
            Ok(book) => {
                let availability = book.availability();
                info!(id = %book.id, %availability, "book availability toggled");
                self.reload().await;
                self.show_message(
                    &format!("Book marked as {availability}"),
                    Severity::Success,
                );
            }
            Err(err) => self.report_failure(ActionContext::ToggleAvailability, &err),
        }
    }

    pub async fn delete(&self, id: BookId) {
        if !self.view.confirm(DELETE_PROMPT).await {
            debug!(%id, "delete declined");
            return;
        }
        match self.api.delete_book(id).await {
            Ok(()) => {
                info!(%id, "book deleted");
                self.reload().await;
                self.show_message("Book deleted", Severity::Success);
            }
            Err(err) => self.report_failure(ActionContext::Delete, &err),
        }
    }

    pub fn show_message(&self, text: &str, severity: Severity) {
        self.notifier.show_message(text, severity);
    }

    fn report_failure(&self, context: ActionContext, err: &ClientError) {
        warn!(
            action = context.name(),
            status = ?err.status_code(),
            error = %err,
            "catalog request failed"
        );
        self.show_message(context.failure_message(), Severity::Danger);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
