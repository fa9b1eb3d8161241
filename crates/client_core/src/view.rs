//! View-side collaborators consumed by the controller.

use async_trait::async_trait;
use shared::{
    domain::{BookId, Severity},
    protocol::{parse_year, Book, BookPayload},
};

use crate::render::TableBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationControls {
    pub page: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationControls {
    /// A short page means the last page; the API exposes no total count.
    pub fn browse(page: u32, returned: usize, page_size: u32) -> Self {
        Self {
            page,
            prev_enabled: page > 1,
            next_enabled: returned >= page_size as usize,
        }
    }

    /// Search results are not paginated.
    pub fn search() -> Self {
        Self {
            page: 1,
            prev_enabled: false,
            next_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Create,
    Edit,
}

/// Dialog field values as entered. `id` is only set on the edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub description: String,
    pub year: String,
    pub publisher: String,
}

impl BookForm {
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            description: book.description().unwrap_or_default().to_string(),
            year: book.year.to_string(),
            publisher: book.publisher().unwrap_or_default().to_string(),
        }
    }

    pub fn to_payload(&self) -> BookPayload {
        BookPayload {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            description: self.description.clone(),
            year: parse_year(&self.year),
            publisher: self.publisher.clone(),
        }
    }
}

/// Table, pagination controls and the two book dialogs.
///
/// Methods take `&self`: several controller actions may be in flight at
/// once, so implementations keep their state behind interior mutability.
#[async_trait]
pub trait CatalogView: Send + Sync {
    /// Replaces the whole table body.
    fn render_table(&self, body: &TableBody);
    fn set_pagination(&self, controls: PaginationControls);

    fn open_dialog(&self, kind: DialogKind);
    fn close_dialog(&self, kind: DialogKind);
    fn reset_dialog(&self, kind: DialogKind);
    fn dialog_form(&self, kind: DialogKind) -> BookForm;
    fn fill_dialog(&self, kind: DialogKind, form: &BookForm);

    /// Blocks the action until the user answers.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// The single status-message region.
pub trait StatusRegion: Send + Sync {
    /// Shows `text`, replacing whatever is displayed.
    fn show(&self, text: &str, severity: Severity);
    fn fade(&self);
    fn hide(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_controls_follow_page_and_length() {
        assert_eq!(
            PaginationControls::browse(1, 10, 10),
            PaginationControls {
                page: 1,
                prev_enabled: false,
                next_enabled: true
            }
        );
        let last = PaginationControls::browse(2, 3, 10);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
        assert!(!PaginationControls::browse(5, 0, 10).next_enabled);
    }

    #[test]
    fn form_round_trips_book_fields_and_defaults_optionals() {
        let book = Book {
            id: BookId(5),
            title: "Solaris".into(),
            author: "Stanislaw Lem".into(),
            isbn: "978-0156027601".into(),
            description: None,
            year: 1961,
            publisher: None,
            available: true,
            created_at: None,
            updated_at: None,
        };
        let form = BookForm::from_book(&book);
        assert_eq!(form.id, Some(BookId(5)));
        assert_eq!(form.description, "");
        assert_eq!(form.publisher, "");
        assert_eq!(form.to_payload().year, Some(1961));
    }

    #[test]
    fn form_shows_backend_empty_strings_as_blank_fields() {
        let book = Book {
            id: BookId(6),
            title: "Ubik".into(),
            author: "Philip K. Dick".into(),
            isbn: "978-0547572291".into(),
            description: Some(String::new()),
            year: 1969,
            publisher: Some("Doubleday".into()),
            available: false,
            created_at: None,
            updated_at: None,
        };
        let form = BookForm::from_book(&book);
        assert_eq!(form.description, "");
        assert_eq!(form.publisher, "Doubleday");
    }

    #[test]
    fn form_with_non_numeric_year_yields_null_year() {
        let form = BookForm {
            year: "nineteen".into(),
            ..BookForm::default()
        };
        assert_eq!(form.to_payload().year, None);
    }
}
