//! Terminal implementations of the catalog view and status region.

use std::{
    collections::HashMap,
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use client_core::{
    render::{badge_label, TableRow},
    BookForm, CatalogController, CatalogView, DialogKind, PaginationControls, RowAction,
    StatusRegion, TableBody,
};
use shared::domain::{BookId, Severity};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex as AsyncMutex,
};
use tracing::trace;

const HEADERS: [&str; 7] = ["ID", "Title", "Author", "ISBN", "Year", "Publisher", "Status"];

/// Line reader shared by the command loop, form prompts and confirmations.
pub struct Prompt {
    lines: AsyncMutex<Lines<BufReader<Stdin>>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: AsyncMutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// `None` on end of input.
    pub async fn ask(&self, label: &str) -> io::Result<Option<String>> {
        {
            let mut stdout = io::stdout().lock();
            stdout.write_all(label.as_bytes())?;
            stdout.flush()?;
        }
        self.lines.lock().await.next_line().await
    }
}

/// Prompts for every form field, offering `current` values as defaults.
pub async fn prompt_form(prompt: &Prompt, current: &BookForm) -> io::Result<Option<BookForm>> {
    let mut form = current.clone();
    let fields: [(&str, &mut String); 6] = [
        ("Title", &mut form.title),
        ("Author", &mut form.author),
        ("ISBN", &mut form.isbn),
        ("Description", &mut form.description),
        ("Year", &mut form.year),
        ("Publisher", &mut form.publisher),
    ];
    for (label, value) in fields {
        let label = if value.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{value}]: ")
        };
        let Some(answer) = prompt.ask(&label).await? else {
            return Ok(None);
        };
        let answer = answer.trim();
        if !answer.is_empty() {
            *value = answer.to_string();
        }
    }
    Ok(Some(form))
}

/// Replaces control characters so server text cannot drive the terminal.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect()
}

pub fn format_table(body: &TableBody) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(body.len());
    for row in &body.rows {
        match row {
            TableRow::Placeholder { text, .. } => return format!("  {text}"),
            TableRow::Book(book) => {
                let mut cells: Vec<String> =
                    book.text_cells().iter().map(|c| sanitize(c)).collect();
                cells.push(badge_label(book.availability).to_string());
                rows.push(cells);
            }
        }
    }

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    for cells in std::iter::once(&header).chain(rows.iter()) {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out.push_str("actions: edit <id> | toggle <id> | delete <id>");
    out
}

/// Enabled controls in square brackets, disabled ones in parentheses.
pub fn format_pagination(controls: PaginationControls) -> String {
    let prev = if controls.prev_enabled { "[< prev]" } else { "(< prev)" };
    let next = if controls.next_enabled { "[next >]" } else { "(next >)" };
    format!("{prev}  page {}  {next}", controls.page)
}

/// Loads `id` into the edit dialog and returns its form, or `None` when the
/// load failed. A dialog left open by an earlier failed save is discarded
/// first so its record can never be submitted in place of `id`.
pub async fn begin_edit_session(
    controller: &CatalogController,
    view: &TerminalView,
    id: BookId,
) -> Option<BookForm> {
    view.close_dialog(DialogKind::Edit);
    view.reset_dialog(DialogKind::Edit);
    controller.dispatch(RowAction::Edit(id)).await;
    view.edit_form_for(id)
}

#[derive(Debug, Clone, Default)]
struct DialogSlot {
    open: bool,
    form: BookForm,
}

pub struct TerminalView {
    prompt: Arc<Prompt>,
    dialogs: Mutex<HashMap<DialogKind, DialogSlot>>,
    pagination: Mutex<Option<PaginationControls>>,
}

impl TerminalView {
    pub fn new(prompt: Arc<Prompt>) -> Self {
        Self {
            prompt,
            dialogs: Mutex::new(HashMap::new()),
            pagination: Mutex::new(None),
        }
    }

    fn dialogs(&self) -> MutexGuard<'_, HashMap<DialogKind, DialogSlot>> {
        self.dialogs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_open(&self, kind: DialogKind) -> bool {
        self.dialogs().get(&kind).is_some_and(|slot| slot.open)
    }

    /// The open edit dialog's form, only if it holds `id`.
    pub fn edit_form_for(&self, id: BookId) -> Option<BookForm> {
        self.dialogs()
            .get(&DialogKind::Edit)
            .filter(|slot| slot.open && slot.form.id == Some(id))
            .map(|slot| slot.form.clone())
    }

    fn pagination(&self) -> Option<PaginationControls> {
        *self.pagination.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Nothing rendered yet counts as enabled.
    pub fn next_enabled(&self) -> bool {
        self.pagination().map_or(true, |c| c.next_enabled)
    }

    pub fn prev_enabled(&self) -> bool {
        self.pagination().map_or(true, |c| c.prev_enabled)
    }
}

#[async_trait]
impl CatalogView for TerminalView {
    fn render_table(&self, body: &TableBody) {
        println!("{}", format_table(body));
    }

    fn set_pagination(&self, controls: PaginationControls) {
        println!("{}", format_pagination(controls));
        *self.pagination.lock().unwrap_or_else(PoisonError::into_inner) = Some(controls);
    }

    fn open_dialog(&self, kind: DialogKind) {
        self.dialogs().entry(kind).or_default().open = true;
    }

    fn close_dialog(&self, kind: DialogKind) {
        self.dialogs().entry(kind).or_default().open = false;
    }

    fn reset_dialog(&self, kind: DialogKind) {
        self.dialogs().entry(kind).or_default().form = BookForm::default();
    }

    fn dialog_form(&self, kind: DialogKind) -> BookForm {
        self.dialogs()
            .get(&kind)
            .map(|slot| slot.form.clone())
            .unwrap_or_default()
    }

    fn fill_dialog(&self, kind: DialogKind, form: &BookForm) {
        self.dialogs().entry(kind).or_default().form = form.clone();
    }

    async fn confirm(&self, prompt: &str) -> bool {
        match self.prompt.ask(&format!("{prompt} [y/N] ")).await {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

#[derive(Default)]
pub struct TerminalStatus {
    current: Mutex<Option<(String, Severity)>>,
}

impl TerminalStatus {
    fn current(&self) -> MutexGuard<'_, Option<(String, Severity)>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusRegion for TerminalStatus {
    fn show(&self, text: &str, severity: Severity) {
        println!("[{severity}] {text}");
        *self.current() = Some((text.to_string(), severity));
    }

    fn fade(&self) {
        trace!("status message fading");
    }

    fn hide(&self) {
        if let Some((text, _)) = self.current().take() {
            trace!(%text, "status message hidden");
        }
    }
}
