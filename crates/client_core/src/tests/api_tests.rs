use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::BookId,
    error::ApiError,
    protocol::{Book, BookPayload},
};
use tokio::net::TcpListener;

use crate::{api::CatalogApi, error::ClientError, HttpCatalogApi};

#[derive(Default)]
struct Store {
    books: Vec<Book>,
    next_id: i64,
    last_search: Option<String>,
    last_page_query: Option<(u32, u32)>,
}

type Shared = Arc<Mutex<Store>>;

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
    page_size: u32,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

fn new_book(id: i64, payload: &BookPayload) -> Book {
    Book {
        id: BookId(id),
        title: payload.title.clone(),
        author: payload.author.clone(),
        isbn: payload.isbn.clone(),
        description: Some(payload.description.clone()),
        year: payload.year.unwrap_or_default(),
        publisher: Some(payload.publisher.clone()),
        available: true,
        created_at: None,
        updated_at: None,
    }
}

fn not_found() -> axum::response::Response {
    (StatusCode::NOT_FOUND, Json(ApiError::new("book not found"))).into_response()
}

async fn list_books(State(store): State<Shared>, Query(q): Query<PageQuery>) -> Json<Vec<Book>> {
    let mut store = store.lock().expect("store");
    store.last_page_query = Some((q.page, q.page_size));
    let skip = ((q.page.max(1) - 1) * q.page_size) as usize;
    Json(
        store
            .books
            .iter()
            .skip(skip)
            .take(q.page_size as usize)
            .cloned()
            .collect(),
    )
}

async fn search_books(
    State(store): State<Shared>,
    Query(q): Query<SearchQuery>,
) -> Json<Vec<Book>> {
    let mut store = store.lock().expect("store");
    let hits: Vec<Book> = store
        .books
        .iter()
        .filter(|b| b.title.contains(&q.q) || b.author.contains(&q.q))
        .cloned()
        .collect();
    store.last_search = Some(q.q);
    Json(hits)
}

async fn create_book(
    State(store): State<Shared>,
    Json(payload): Json<BookPayload>,
) -> axum::response::Response {
    if payload.year.is_none() {
        return (StatusCode::BAD_REQUEST, Json(ApiError::new("invalid payload"))).into_response();
    }
    let mut store = store.lock().expect("store");
    store.next_id += 1;
    let book = new_book(store.next_id, &payload);
    store.books.push(book.clone());
    (StatusCode::CREATED, Json(book)).into_response()
}

async fn get_book(State(store): State<Shared>, Path(id): Path<i64>) -> axum::response::Response {
    let store = store.lock().expect("store");
    match store.books.iter().find(|b| b.id == BookId(id)) {
        Some(book) => Json(book.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_book(
    State(store): State<Shared>,
    Path(id): Path<i64>,
    Json(payload): Json<BookPayload>,
) -> axum::response::Response {
    let mut store = store.lock().expect("store");
    match store.books.iter_mut().find(|b| b.id == BookId(id)) {
        Some(book) => {
            let available = book.available;
            *book = new_book(id, &payload);
            book.available = available;
            Json(book.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_book(State(store): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut store = store.lock().expect("store");
    let before = store.books.len();
    store.books.retain(|b| b.id != BookId(id));
    if store.books.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn toggle_availability(
    State(store): State<Shared>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let mut store = store.lock().expect("store");
    match store.books.iter_mut().find(|b| b.id == BookId(id)) {
        Some(book) => {
            book.available = !book.available;
            Json(book.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn broken_json() -> &'static str {
    "[{\"id\": 1, \"title\": "
}

async fn spawn_books_server() -> (String, Shared) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let store: Shared = Arc::new(Mutex::new(Store::default()));
    let app = Router::new()
        .route("/api/books", get(list_books).post(create_book))
        .route("/api/books/search", get(search_books))
        .route(
            "/api/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/:id/toggle-availability", post(toggle_availability))
        .route("/broken/books", get(broken_json))
        .with_state(store.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), store)
}

fn payload(title: &str) -> BookPayload {
    BookPayload {
        title: title.to_string(),
        author: "Iain M. Banks".to_string(),
        isbn: format!("isbn-{title}"),
        description: String::new(),
        year: Some(1987),
        publisher: String::new(),
    }
}

async fn seeded_api(titles: &[&str]) -> (HttpCatalogApi, Shared) {
    let (server_url, store) = spawn_books_server().await;
    let api = HttpCatalogApi::new(&format!("{server_url}/api/")).expect("api");
    for title in titles {
        api.create_book(&payload(title)).await.expect("seed");
    }
    (api, store)
}

#[tokio::test]
async fn list_books_sends_page_and_page_size() {
    let titles: Vec<String> = (1..=12).map(|i| format!("Culture {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let (api, store) = seeded_api(&refs).await;

    let page = api.list_books(2, 10).await.expect("list");

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].title, "Culture 11");
    assert_eq!(store.lock().expect("store").last_page_query, Some((2, 10)));
}

#[tokio::test]
async fn search_query_is_escaped_on_the_wire() {
    let (api, store) = seeded_api(&["Use of Weapons", "Look to Windward"]).await;

    let hits = api.search_books("Weapons & more?#").await.expect("search");
    assert!(hits.is_empty());
    assert_eq!(
        store.lock().expect("store").last_search.as_deref(),
        Some("Weapons & more?#")
    );

    let hits = api.search_books("Use of").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Use of Weapons");
}

#[tokio::test]
async fn crud_round_trip_against_server() {
    let (api, _store) = seeded_api(&[]).await;

    let created = api.create_book(&payload("Excession")).await.expect("create");
    assert_eq!(created.id, BookId(1));
    assert!(created.available);

    let fetched = api.get_book(created.id).await.expect("get");
    assert_eq!(fetched.title, "Excession");

    let updated = api
        .update_book(created.id, &payload("Excession (2nd ed.)"))
        .await
        .expect("update");
    assert_eq!(updated.title, "Excession (2nd ed.)");

    let toggled = api.toggle_availability(created.id).await.expect("toggle");
    assert!(!toggled.available);

    api.delete_book(created.id).await.expect("delete");
    let err = api.get_book(created.id).await.expect_err("gone");
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn error_status_carries_server_message() {
    let (api, _store) = seeded_api(&[]).await;
    let mut bad = payload("Matter");
    bad.year = None;

    let err = api.create_book(&bad).await.expect_err("rejected");

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "invalid payload");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn delete_of_missing_book_is_a_status_error() {
    let (api, _store) = seeded_api(&[]).await;
    let err = api.delete_book(BookId(77)).await.expect_err("missing");
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (server_url, _store) = spawn_books_server().await;
    let api = HttpCatalogApi::new(&format!("{server_url}/broken")).expect("api");

    let err = api.list_books(1, 10).await.expect_err("malformed");

    assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let api = HttpCatalogApi::new(&format!("http://{addr}/api")).expect("api");

    let err = api.list_books(1, 10).await.expect_err("refused");

    assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
}

#[test]
fn rejects_non_hierarchical_base_url() {
    assert!(matches!(
        HttpCatalogApi::new("mailto:books@example.com"),
        Err(ClientError::Url(_))
    ));
    assert!(matches!(
        HttpCatalogApi::new("not a url"),
        Err(ClientError::Url(_))
    ));
}

#[test]
fn base_url_trailing_slash_is_normalised() {
    let api = HttpCatalogApi::new("http://localhost:8080/api/").expect("api");
    assert_eq!(api.base_url().as_str(), "http://localhost:8080/api");
}
