//! Client side of the book catalog: REST access, list rendering and the
//! controller that ties user actions to both.

pub mod api;
pub mod controller;
pub mod error;
pub mod notify;
pub mod render;
pub mod view;

pub use api::{CatalogApi, HttpCatalogApi};
pub use controller::{ActionContext, CatalogController, PAGE_SIZE};
pub use error::ClientError;
pub use notify::Notifier;
pub use render::{RowAction, TableBody, TableRow};
pub use view::{BookForm, CatalogView, DialogKind, PaginationControls, StatusRegion};

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod api_tests;
