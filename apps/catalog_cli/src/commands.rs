//! Line commands accepted by the interactive loop.

use shared::domain::BookId;

pub const HELP: &str = "\
commands:
  list [page]      show a page of the catalog (default: current page)
  next | prev      move between pages
  search [query]   search by title or author; empty query returns to browsing
  add              add a book
  edit <id>        edit a book
  toggle <id>      flip a book's availability
  delete <id>      delete a book (asks for confirmation)
  help             show this text
  quit             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Option<u32>),
    Next,
    Prev,
    Search(String),
    Add,
    Edit(BookId),
    Toggle(BookId),
    Delete(BookId),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => {
                if rest.is_empty() {
                    return Ok(Self::List(None));
                }
                match rest.parse::<u32>() {
                    Ok(page) if page >= 1 => Ok(Self::List(Some(page))),
                    _ => Err(format!("expected a page number >= 1, got '{rest}'")),
                }
            }
            "next" | "n" => Ok(Self::Next),
            "prev" | "p" => Ok(Self::Prev),
            "search" | "s" => Ok(Self::Search(rest.to_string())),
            "add" => Ok(Self::Add),
            "edit" => parse_id(rest).map(Self::Edit),
            "toggle" => parse_id(rest).map(Self::Toggle),
            "delete" | "rm" => parse_id(rest).map(Self::Delete),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Search(_) => "search",
            Self::Add => "add",
            Self::Edit(_) => "edit",
            Self::Toggle(_) => "toggle",
            Self::Delete(_) => "delete",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

fn parse_id(raw: &str) -> Result<BookId, String> {
    raw.parse()
        .map_err(|_| format!("expected a numeric book id, got '{raw}'"))
}
