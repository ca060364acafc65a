//! Downloading remote scripts.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::FetchError;

/// Name used when a URL path carries no usable final segment.
const FALLBACK_FILE_NAME: &str = "index.js";

/// Body of a successfully downloaded script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedScript {
  /// URL the content was finally served from, after redirects.
  pub final_url: String,
  /// Response body.
  pub body: Vec<u8>,
}

/// Network capability used for remote script references.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
  /// Download `url`, following redirects. Non-success statuses are errors.
  async fn fetch(&self, url: &str) -> Result<FetchedScript, FetchError>;
}

/// [`RemoteFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
  client: Client,
}

impl HttpFetcher {
  /// Create a fetcher with a default client.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a fetcher around an existing client, e.g. one with a proxy configured.
  pub fn with_client(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<FetchedScript, FetchError> {
    let transport = |source: reqwest::Error| FetchError::Transport {
      url: url.to_string(),
      source,
    };

    let response = self.client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      });
    }

    let final_url = response.url().to_string();
    let body = response.bytes().await.map_err(transport)?;

    Ok(FetchedScript {
      final_url,
      body: body.to_vec(),
    })
  }
}

/// Derive an asset file name from the last path segment of `url`.
pub fn file_name_from_url(url: &str) -> String {
  let segment = match Url::parse(url) {
    Ok(parsed) => parsed
      .path_segments()
      .and_then(|mut segments| segments.next_back().map(str::to_string)),
    Err(_) => url
      .split(['?', '#'])
      .next()
      .and_then(|path| path.rsplit('/').next())
      .map(str::to_string),
  };

  segment
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Serve a single canned HTTP response on a local port and return its base URL.
  async fn serve_once(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buffer = [0u8; 2048];
      let _ = socket.read(&mut buffer).await;
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.ok();
    });
    format!("http://{addr}")
  }

  fn local_fetcher() -> HttpFetcher {
    HttpFetcher::with_client(Client::builder().no_proxy().build().unwrap())
  }

  #[test]
  fn uses_last_path_segment() {
    assert_eq!(
      file_name_from_url("https://unpkg.com/hyperscript.org@0.9.12/dist/_hyperscript.min.js"),
      "_hyperscript.min.js"
    );
    assert_eq!(
      file_name_from_url("https://cdn.example.com/lib.js?v=3#frag"),
      "lib.js"
    );
  }

  #[test]
  fn falls_back_for_directory_urls() {
    assert_eq!(file_name_from_url("https://example.com/"), FALLBACK_FILE_NAME);
    assert_eq!(file_name_from_url("https://example.com/pkg/"), FALLBACK_FILE_NAME);
  }

  #[tokio::test]
  async fn returns_body_on_success() {
    let base = serve_once(
      "HTTP/1.1 200 OK\r\nContent-Type: text/javascript\r\nContent-Length: 9\r\nConnection: close\r\n\r\nlet a=1;\n",
    )
    .await;
    let url = format!("{base}/lib/a.js");

    let fetched = local_fetcher().fetch(&url).await.unwrap();
    assert_eq!(fetched.body, b"let a=1;\n");
    assert_eq!(fetched.final_url, url);
  }

  #[tokio::test]
  async fn reports_non_success_status() {
    let base = serve_once(
      "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    )
    .await;

    let err = local_fetcher()
      .fetch(&format!("{base}/missing.js"))
      .await
      .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
  }
}
