//! Table rendering for the catalog list.
//!
//! Rendering produces a [`TableBody`] value; views either walk its rows or
//! serialise it with [`TableBody::to_html`], which escapes every
//! server-supplied string.

use shared::{
    domain::{Availability, BookId},
    protocol::Book,
};

pub const COLUMN_COUNT: usize = 8;
pub const EMPTY_TABLE_TEXT: &str = "No books found";
pub const ABSENT_PLACEHOLDER: &str = "-";

/// A row-level trigger, keyed by the target book.
///
/// Views register one delegated handler per table and turn the clicked
/// element's `data-action`/`data-id` attributes into a `RowAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Edit(BookId),
    ToggleAvailability(BookId),
    Delete(BookId),
}

impl RowAction {
    pub fn id(self) -> BookId {
        match self {
            Self::Edit(id) | Self::ToggleAvailability(id) | Self::Delete(id) => id,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Edit(_) => "edit",
            Self::ToggleAvailability(_) => "toggle-availability",
            Self::Delete(_) => "delete",
        }
    }

    pub fn from_attributes(action: &str, id: &str) -> Option<Self> {
        let id: BookId = id.parse().ok()?;
        match action {
            "edit" => Some(Self::Edit(id)),
            "toggle-availability" => Some(Self::ToggleAvailability(id)),
            "delete" => Some(Self::Delete(id)),
            _ => None,
        }
    }

    pub fn all_for(id: BookId) -> [Self; 3] {
        [Self::Edit(id), Self::ToggleAvailability(id), Self::Delete(id)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i32,
    pub publisher: String,
    pub availability: Availability,
}

impl BookRow {
    fn from_book(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            year: book.year,
            publisher: book.publisher().unwrap_or(ABSENT_PLACEHOLDER).to_string(),
            availability: book.availability(),
        }
    }

    /// The six plain text columns, in display order.
    pub fn text_cells(&self) -> [String; 6] {
        [
            self.id.to_string(),
            self.title.clone(),
            self.author.clone(),
            self.isbn.clone(),
            self.year.to_string(),
            self.publisher.clone(),
        ]
    }

    pub fn actions(&self) -> [RowAction; 3] {
        RowAction::all_for(self.id)
    }
}

pub fn badge_label(availability: Availability) -> &'static str {
    match availability {
        Availability::Available => "Available",
        Availability::Unavailable => "Unavailable",
    }
}

pub fn badge_class(availability: Availability) -> &'static str {
    match availability {
        Availability::Available => "book-available",
        Availability::Unavailable => "book-unavailable",
    }
}

pub fn action_label(action: RowAction, availability: Availability) -> &'static str {
    match (action, availability) {
        (RowAction::Edit(_), _) => "Edit",
        (RowAction::ToggleAvailability(_), Availability::Available) => "Mark unavailable",
        (RowAction::ToggleAvailability(_), Availability::Unavailable) => "Mark available",
        (RowAction::Delete(_), _) => "Delete",
    }
}

fn action_class(action: RowAction) -> &'static str {
    match action {
        RowAction::Edit(_) => "btn btn-sm btn-outline-primary",
        RowAction::ToggleAvailability(_) => "btn btn-sm btn-outline-warning",
        RowAction::Delete(_) => "btn btn-sm btn-outline-danger",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    /// Single full-width row shown for an empty result.
    Placeholder { colspan: usize, text: &'static str },
    Book(BookRow),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBody {
    pub rows: Vec<TableRow>,
}

impl TableBody {
    /// One row per book in input order, or the placeholder row when empty.
    pub fn render(books: &[Book]) -> Self {
        if books.is_empty() {
            return Self {
                rows: vec![TableRow::Placeholder {
                    colspan: COLUMN_COUNT,
                    text: EMPTY_TABLE_TEXT,
                }],
            };
        }
        Self {
            rows: books
                .iter()
                .map(|book| TableRow::Book(BookRow::from_book(book)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn book_rows(&self) -> impl Iterator<Item = &BookRow> {
        self.rows.iter().filter_map(|row| match row {
            TableRow::Book(book) => Some(book),
            TableRow::Placeholder { .. } => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            match row {
                TableRow::Placeholder { colspan, text } => {
                    out.push_str(&format!(
                        "<tr><td colspan=\"{colspan}\" class=\"text-center\">{}</td></tr>\n",
                        escape_html(text)
                    ));
                }
                TableRow::Book(book) => push_book_row(&mut out, book),
            }
        }
        out
    }
}

fn push_book_row(out: &mut String, row: &BookRow) {
    let id = escape_html(&row.id.to_string());
    out.push_str(&format!("<tr data-id=\"{id}\">"));
    for cell in row.text_cells() {
        out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
    }
    out.push_str(&format!(
        "<td><span class=\"{}\">{}</span></td>",
        badge_class(row.availability),
        badge_label(row.availability)
    ));
    out.push_str("<td class=\"action-buttons\">");
    for action in row.actions() {
        out.push_str(&format!(
            "<button class=\"{}\" data-action=\"{}\" data-id=\"{id}\">{}</button>",
            action_class(action),
            action.name(),
            action_label(action, row.availability)
        ));
    }
    out.push_str("</td></tr>\n");
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str, publisher: Option<&str>, available: bool) -> Book {
        Book {
            id: BookId(id),
            title: title.to_string(),
            author: "Author".to_string(),
            isbn: format!("isbn-{id}"),
            description: None,
            year: 2000 + id as i32,
            publisher: publisher.map(str::to_string),
            available,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_input_renders_single_placeholder_spanning_all_columns() {
        let body = TableBody::render(&[]);
        assert_eq!(
            body.rows,
            vec![TableRow::Placeholder {
                colspan: COLUMN_COUNT,
                text: EMPTY_TABLE_TEXT
            }]
        );
        assert!(body.to_html().contains("colspan=\"8\""));
    }

    #[test]
    fn rows_follow_input_order() {
        let books = vec![
            book(3, "C", None, true),
            book(1, "A", None, true),
            book(2, "B", None, false),
        ];
        let body = TableBody::render(&books);
        let ids: Vec<_> = body.book_rows().map(|row| row.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn absent_or_empty_publisher_uses_placeholder() {
        let body = TableBody::render(&[
            book(1, "A", None, true),
            book(2, "B", Some(""), true),
            book(3, "C", Some("Ace"), true),
        ]);
        let publishers: Vec<_> = body.book_rows().map(|row| row.publisher.as_str()).collect();
        assert_eq!(publishers, vec!["-", "-", "Ace"]);
    }

    #[test]
    fn badge_and_toggle_label_follow_availability() {
        let html = TableBody::render(&[book(1, "A", None, false)]).to_html();
        assert!(html.contains("<span class=\"book-unavailable\">Unavailable</span>"));
        assert!(html.contains(">Mark available</button>"));
        assert!(!html.contains("book-available\""));
    }

    #[test]
    fn html_escapes_hostile_text() {
        let mut hostile = book(1, "<img src=x onerror=alert(1)>", Some("\"Q\" & 'S'"), true);
        hostile.author = "</td><script>".to_string();
        let html = TableBody::render(&[hostile]).to_html();
        assert!(!html.contains("<img"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("&quot;Q&quot; &amp; &#39;S&#39;"));
    }

    #[test]
    fn every_trigger_carries_row_id() {
        let html = TableBody::render(&[book(42, "A", None, true)]).to_html();
        assert_eq!(html.matches("data-id=\"42\"").count(), 4);
        for name in ["edit", "toggle-availability", "delete"] {
            assert!(html.contains(&format!("data-action=\"{name}\"")));
        }
    }

    #[test]
    fn row_action_parses_delegated_attributes() {
        assert_eq!(
            RowAction::from_attributes("toggle-availability", "9"),
            Some(RowAction::ToggleAvailability(BookId(9)))
        );
        assert_eq!(
            RowAction::from_attributes("delete", " 4 "),
            Some(RowAction::Delete(BookId(4)))
        );
        assert_eq!(RowAction::from_attributes("archive", "4"), None);
        assert_eq!(RowAction::from_attributes("edit", "four"), None);
    }
}
