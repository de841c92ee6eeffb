use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result as EyreResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use crate::config::DirectoryConfig;

use super::error::{DirectoryError, Result};
use super::types::Project;

/// The backend source of truth for project records.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
  /// Fetch every project the directory knows about
  async fn fetch_all(&self) -> Result<Vec<Project>>;

  async fn fetch_one(&self, id: &str) -> Result<Project>;

  async fn create(&self, project: &Project) -> Result<()>;

  async fn update(&self, id: &str, project: &Project) -> Result<()>;

  async fn delete(&self, id: &str) -> Result<()>;
}

/// Directory client speaking the depository REST API over HTTP
#[derive(Clone)]
pub struct HttpDirectoryClient {
  http: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

impl HttpDirectoryClient {
  pub fn new(config: &DirectoryConfig, token: Option<String>) -> EyreResult<Self> {
    let base_url = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid directory url {}: {}", config.url, e))?;

    if base_url.cannot_be_a_base() {
      return Err(eyre!("Directory url {} cannot be used as a base", config.url));
    }

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create directory client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  /// Build `{base}/api/projects[/{id}]`, percent-encoding the id.
  fn endpoint(&self, id: Option<&str>) -> Url {
    let mut url = self.base_url.clone();
    // Checked in `new`: the base url always has path segments.
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(["api", "projects"]);
      if let Some(id) = id {
        path.push(id);
      }
    }
    url
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    let request = self.http.request(method, url);
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  /// Send a request and map non-success statuses to errors.
  ///
  /// A 404 on an item endpoint becomes `NotFound`.
  async fn send(&self, request: RequestBuilder, id: Option<&str>) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
      return Ok(response);
    }

    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
      return Err(DirectoryError::NotFound { id: id.to_string() });
    }

    let body = response.text().await.unwrap_or_default();
    Err(DirectoryError::Backend { status, body })
  }

  async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

#[async_trait]
impl ProjectDirectory for HttpDirectoryClient {
  async fn fetch_all(&self) -> Result<Vec<Project>> {
    let started = Instant::now();
    let request = self.request(Method::GET, self.endpoint(None));
    let response = self.send(request, None).await?;
    let projects: Vec<Project> = Self::decode(response).await?;

    debug!(
      count = projects.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "fetched all projects from directory"
    );
    Ok(projects)
  }

  async fn fetch_one(&self, id: &str) -> Result<Project> {
    let request = self.request(Method::GET, self.endpoint(Some(id)));
    let response = self.send(request, Some(id)).await?;
    Self::decode(response).await
  }

  async fn create(&self, project: &Project) -> Result<()> {
    let request = self.request(Method::POST, self.endpoint(None)).json(project);
    self.send(request, None).await?;
    Ok(())
  }

  async fn update(&self, id: &str, project: &Project) -> Result<()> {
    let request = self
      .request(Method::PUT, self.endpoint(Some(id)))
      .json(project);
    self.send(request, Some(id)).await?;
    Ok(())
  }

  async fn delete(&self, id: &str) -> Result<()> {
    let request = self.request(Method::DELETE, self.endpoint(Some(id)));
    self.send(request, Some(id)).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Matcher;

  fn client(url: &str, token: Option<&str>) -> HttpDirectoryClient {
    let config = DirectoryConfig {
      url: url.to_string(),
      timeout_secs: 5,
    };
    HttpDirectoryClient::new(&config, token.map(String::from)).unwrap()
  }

  #[test]
  fn test_endpoint_keeps_base_path_and_encodes_id() {
    let c = client("http://directory.local/depository/", None);
    assert_eq!(
      c.endpoint(None).as_str(),
      "http://directory.local/depository/api/projects"
    );
    assert_eq!(
      c.endpoint(Some("a b/c")).as_str(),
      "http://directory.local/depository/api/projects/a%20b%2Fc"
    );
  }

  #[test]
  fn test_new_rejects_bad_url() {
    let config = DirectoryConfig {
      url: "not a url".to_string(),
      timeout_secs: 5,
    };
    assert!(HttpDirectoryClient::new(&config, None).is_err());
  }

  #[tokio::test]
  async fn test_fetch_all_sends_token_and_decodes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("GET", "/api/projects")
      .match_header("authorization", "Bearer secret")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"[{"id":"1","name":"API-Gateway","group":"TEAMA","tags":["BACKEND"]}]"#)
      .create_async()
      .await;

    let projects = client(&server.url(), Some("secret"))
      .fetch_all()
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "API-Gateway");
    assert_eq!(projects[0].tags, vec!["BACKEND"]);
  }

  #[tokio::test]
  async fn test_fetch_one_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/api/projects/missing")
      .with_status(404)
      .create_async()
      .await;

    let err = client(&server.url(), None)
      .fetch_one("missing")
      .await
      .unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { id } if id == "missing"));
  }

  #[tokio::test]
  async fn test_fetch_all_server_error_is_backend_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/api/projects")
      .with_status(503)
      .with_body("maintenance")
      .create_async()
      .await;

    let err = client(&server.url(), None).fetch_all().await.unwrap_err();
    match err {
      DirectoryError::Backend { status, body } => {
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "maintenance");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_fetch_all_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/api/projects")
      .with_status(200)
      .with_body("{not json")
      .create_async()
      .await;

    let err = client(&server.url(), None).fetch_all().await.unwrap_err();
    assert!(matches!(err, DirectoryError::Decode(_)));
  }

  #[tokio::test]
  async fn test_mutations_hit_expected_routes() {
    let mut server = mockito::Server::new_async().await;
    let project = Project {
      id: "p1".into(),
      name: "Docs".into(),
      ..Default::default()
    };

    let post = server
      .mock("POST", "/api/projects")
      .match_body(Matcher::PartialJson(serde_json::json!({"id": "p1", "name": "Docs"})))
      .with_status(201)
      .create_async()
      .await;
    let put = server
      .mock("PUT", "/api/projects/p1")
      .match_body(Matcher::PartialJson(serde_json::json!({"name": "Docs"})))
      .with_status(200)
      .create_async()
      .await;
    let delete = server
      .mock("DELETE", "/api/projects/p1")
      .with_status(200)
      .create_async()
      .await;

    let c = client(&server.url(), None);
    c.create(&project).await.unwrap();
    c.update("p1", &project).await.unwrap();
    c.delete("p1").await.unwrap();

    post.assert_async().await;
    put.assert_async().await;
    delete.assert_async().await;
  }

  #[tokio::test]
  async fn test_delete_missing_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("DELETE", "/api/projects/gone")
      .with_status(404)
      .create_async()
      .await;

    let err = client(&server.url(), None).delete("gone").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
  }
}
