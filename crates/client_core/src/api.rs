//! Books REST API: the [`CatalogApi`] seam and its `reqwest` implementation.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::BookId,
    protocol::{Book, BookPayload},
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub type ApiResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_books(&self, page: u32, page_size: u32) -> ApiResult<Vec<Book>>;
    async fn search_books(&self, query: &str) -> ApiResult<Vec<Book>>;
    async fn get_book(&self, id: BookId) -> ApiResult<Book>;
    async fn create_book(&self, payload: &BookPayload) -> ApiResult<Book>;
    async fn update_book(&self, id: BookId, payload: &BookPayload) -> ApiResult<Book>;
    async fn toggle_availability(&self, id: BookId) -> ApiResult<Book>;
    async fn delete_book(&self, id: BookId) -> ApiResult<()>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    http: Client,
    base_url: Url,
}

impl HttpCatalogApi {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8080/api`.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn book_endpoint(&self, id: BookId, tail: Option<&str>) -> Url {
        let id = id.to_string();
        match tail {
            Some(tail) => self.endpoint(&["books", id.as_str(), tail]),
            None => self.endpoint(&["books", id.as_str()]),
        }
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::status(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = ensure_success(response).await?.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_books(&self, page: u32, page_size: u32) -> ApiResult<Vec<Book>> {
        let mut url = self.endpoint(&["books"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());
        debug!(%url, "GET books page");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    async fn search_books(&self, query: &str) -> ApiResult<Vec<Book>> {
        let mut url = self.endpoint(&["books", "search"]);
        url.query_pairs_mut().append_pair("q", query);
        debug!(%url, "GET books search");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    async fn get_book(&self, id: BookId) -> ApiResult<Book> {
        let url = self.book_endpoint(id, None);
        debug!(%url, "GET book");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    async fn create_book(&self, payload: &BookPayload) -> ApiResult<Book> {
        let url = self.endpoint(&["books"]);
        debug!(%url, title = %payload.title, "POST book");
        let response = self.http.post(url).json(payload).send().await?;
        read_json(response).await
    }

    async fn update_book(&self, id: BookId, payload: &BookPayload) -> ApiResult<Book> {
        let url = self.book_endpoint(id, None);
        debug!(%url, "PUT book");
        let response = self.http.put(url).json(payload).send().await?;
        read_json(response).await
    }

    async fn toggle_availability(&self, id: BookId) -> ApiResult<Book> {
        let url = self.book_endpoint(id, Some("toggle-availability"));
        debug!(%url, "POST toggle availability");
        let response = self.http.post(url).send().await?;
        read_json(response).await
    }

    async fn delete_book(&self, id: BookId) -> ApiResult<()> {
        let url = self.book_endpoint(id, None);
        debug!(%url, "DELETE book");
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
