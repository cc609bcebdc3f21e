//! HTTP implementation of [`ComicRemote`]

use crate::errors::EditorError;
use crate::remote::{
    AckResponse, ComicRemote, CreateComicRequest, CreateComicResponse, CreatedComic,
    LoadComicResponse, LoadedComic, RegenerateImageRequest, RegenerateImageResponse,
    UpdateComicRequest,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Image and story generation is slow; keep this generous
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,

    /// Bounds every request so a hung call cannot hold the save channel forever
    pub timeout: Duration,

    /// Raw `Cookie` header of an already authenticated server session
    pub session_cookie: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            session_cookie: None,
        }
    }
}

/// Talks to the comic server's JSON endpoints
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: Url,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Result<Self, EditorError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| EditorError::transport(format!("invalid server url {}: {}", config.base_url, e)))?;
        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| EditorError::transport(format!("invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| EditorError::transport(format!("failed to build http client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, EditorError> {
        self.base_url
            .join(path)
            .map_err(|e| EditorError::transport(format!("bad endpoint {}: {}", path, e)))
    }

    /// `load-comic/<id>` with the id as one encoded path segment
    fn load_endpoint(&self, id: &str) -> Result<Url, EditorError> {
        let mut url = self.endpoint("load-comic/")?;
        url.path_segments_mut()
            .map_err(|_| EditorError::transport("server url cannot carry a path"))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Send a request and decode the JSON envelope
    ///
    /// Non-2xx responses still carry `{success: false, message}` from the
    /// server, so the body is decoded regardless of status. Only an
    /// undecodable body falls back to a transport failure.
    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, EditorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "request failed");
            EditorError::transport(e.to_string())
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(%method, %url, %status, error = %e, "failed to read response body");
            EditorError::transport(e.to_string())
        })?;

        match serde_json::from_slice::<T>(&bytes) {
            Ok(decoded) => {
                tracing::debug!(%method, %url, %status, "response decoded");
                Ok(decoded)
            }
            Err(e) => {
                tracing::warn!(%method, %url, %status, error = %e, "unparseable response body");
                Err(EditorError::transport(format!("{} {}: {}", status, url, e)))
            }
        }
    }
}

#[async_trait]
impl ComicRemote for HttpRemote {
    async fn create_comic(&self, request: CreateComicRequest) -> Result<CreatedComic, EditorError> {
        let response: CreateComicResponse = self
            .send(Method::POST, self.endpoint("create-comic")?, Some(&request))
            .await?;
        response.into_result()
    }

    async fn load_comic(&self, id: &str) -> Result<LoadedComic, EditorError> {
        let response: LoadComicResponse = self
            .send::<(), _>(Method::GET, self.load_endpoint(id)?, None)
            .await?;
        response.into_result(id)
    }

    async fn update_comic(&self, request: UpdateComicRequest) -> Result<(), EditorError> {
        let response: AckResponse = self
            .send(Method::POST, self.endpoint("update-comic")?, Some(&request))
            .await?;
        response.into_result()
    }

    async fn regenerate_image(&self, request: RegenerateImageRequest) -> Result<String, EditorError> {
        let response: RegenerateImageResponse = self
            .send(Method::POST, self.endpoint("generate-image")?, Some(&request))
            .await?;
        response.into_result()
    }

    async fn logout(&self) -> Result<(), EditorError> {
        let response: AckResponse = self
            .send::<(), _>(Method::POST, self.endpoint("logout")?, None)
            .await?;
        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let remote = HttpRemote::new(RemoteConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..RemoteConfig::default()
        })
        .unwrap();

        assert_eq!(
            remote.endpoint("load-comic/abc").unwrap().as_str(),
            "http://localhost:5000/load-comic/abc"
        );
    }

    #[test]
    fn test_load_id_is_one_encoded_segment() {
        let remote = HttpRemote::new(RemoteConfig {
            base_url: "http://localhost:5000/api".to_string(),
            ..RemoteConfig::default()
        })
        .unwrap();

        assert_eq!(
            remote.load_endpoint("abc").unwrap().as_str(),
            "http://localhost:5000/api/load-comic/abc"
        );
        assert_eq!(
            remote.load_endpoint("../logout").unwrap().path(),
            "/api/load-comic/..%2Flogout"
        );
        assert_eq!(
            remote.load_endpoint("a b?c#d").unwrap().path(),
            "/api/load-comic/a%20b%3Fc%23d"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpRemote::new(RemoteConfig {
            base_url: "not a url".to_string(),
            ..RemoteConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, EditorError::Transport { .. }));
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let remote = HttpRemote::new(RemoteConfig {
            base_url: "http://localhost:5000/api".to_string(),
            ..RemoteConfig::default()
        })
        .unwrap();

        assert_eq!(
            remote.endpoint("update-comic").unwrap().as_str(),
            "http://localhost:5000/api/update-comic"
        );
    }
}
