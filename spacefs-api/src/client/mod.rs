use reqwest::{Url, RequestBuilder};

pub mod error;
pub mod fs;

use error::{ApiClientError, RequestError};

pub struct Info {
    pub url: Url
}

/// async client for the file store.
///
/// every request carries the bearer token given to the builder. the token is
/// obtained elsewhere, the client never logs in by itself.
pub struct ApiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) token: Option<String>,
    pub(crate) info: Info
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder {
            scheme: "http",
            host: String::from("localhost"),
            port: None,
            token: None,
            agent: None
        }
    }

    pub fn url(&self) -> &Url {
        &self.info.url
    }

    fn request<U>(&self, method: reqwest::Method, path: U) -> Result<RequestBuilder, RequestError>
    where
        U: AsRef<str>,
    {
        let url = self.info.url.join(path.as_ref())?;
        let builder = self.client.request(method, url);

        if let Some(token) = &self.token {
            Ok(builder.bearer_auth(token))
        } else {
            Ok(builder)
        }
    }

    pub(crate) fn get<U>(&self, path: U) -> Result<RequestBuilder, RequestError>
    where
        U: AsRef<str>,
    {
        self.request(reqwest::Method::GET, path)
    }

    pub(crate) fn post<U>(&self, path: U) -> Result<RequestBuilder, RequestError>
    where
        U: AsRef<str>
    {
        self.request(reqwest::Method::POST, path)
    }

    pub(crate) fn patch<U>(&self, path: U) -> Result<RequestBuilder, RequestError>
    where
        U: AsRef<str>
    {
        self.request(reqwest::Method::PATCH, path)
    }

    pub(crate) fn delete<U>(&self, path: U) -> Result<RequestBuilder, RequestError>
    where
        U: AsRef<str>
    {
        self.request(reqwest::Method::DELETE, path)
    }
}

pub struct ApiClientBuilder {
    scheme: &'static str,
    host: String,
    port: Option<u16>,
    token: Option<String>,
    agent: Option<String>
}

impl ApiClientBuilder {
    pub fn secure(&mut self, is_secure: bool) {
        if is_secure {
            self.scheme = "https";
        } else {
            self.scheme = "http";
        }
    }

    pub fn host<H>(&mut self, host: H) -> bool
    where
        H: AsRef<str>
    {
        let host = host.as_ref();

        if host.is_empty() || host.contains(|ch: char| matches!(ch, '/' | '?' | '#' | '@') || ch.is_whitespace()) {
            return false;
        }

        self.host = host.to_owned();
        true
    }

    pub fn port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    pub fn token<T>(&mut self, token: Option<T>)
    where
        T: Into<String>
    {
        self.token = token.map(|v| v.into());
    }

    pub fn user_agent<U>(&mut self, user_agent: U)
    where
        U: Into<String>
    {
        self.agent = Some(user_agent.into());
    }

    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let user_agent = self.agent.unwrap_or("spacefs-api-client/0.1.0".into());

        let base = if let Some(port) = self.port {
            format!("{}://{}:{}/", self.scheme, self.host, port)
        } else {
            format!("{}://{}/", self.scheme, self.host)
        };

        let url = Url::parse(&base).map_err(ApiClientError::Url)?;

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(ApiClientError::Reqwest)?;

        tracing::debug!("api client base url {url}");

        Ok(ApiClient {
            client,
            token: self.token,
            info: Info {
                url
            }
        })
    }
}
