use crate::config::Config;
use crate::error::FetchError;
use async_trait::async_trait;
use url::Url;

/// Source of the raw page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Single GET of a fixed url with a browser user agent and a hard timeout.
/// No retries and no caching.
pub struct HttpFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<HttpFetcher, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(FetchError::Client)?;
        Ok(HttpFetcher {
            client,
            url: config.url.clone(),
        })
    }
}

fn is_html(content_type: &str) -> bool {
    match content_type.parse::<mime::Mime>() {
        Ok(mime) => matches!((mime.type_(), mime.subtype()), (mime::TEXT, mime::HTML)),
        Err(_) => false,
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !is_html(content_type) {
                return Err(FetchError::ContentType(content_type.to_string()));
            }
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, timeout_secs: u64) -> Config {
        Config {
            url: Url::parse(&format!("{}/tashkent", server.uri())).unwrap(),
            timeout_secs,
            ..Config::default()
        }
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(!is_html("application/json"));
        assert!(!is_html(""));
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tashkent"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>145 Нездорово</p>", "text/html; charset=utf-8"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(&server, 5)).unwrap();
        assert_eq!(fetcher.fetch().await.unwrap(), "<p>145 Нездорово</p>");
    }

    #[tokio::test]
    async fn test_fetch_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(&server, 5)).unwrap();
        match fetcher.fetch().await {
            Err(FetchError::Status(status)) => assert_eq!(status.as_u16(), 503),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_not_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(&server, 5)).unwrap();
        assert!(matches!(fetcher.fetch().await, Err(FetchError::ContentType(_))));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>late</p>", "text/html")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&config(&server, 1)).unwrap();
        match fetcher.fetch().await {
            Err(FetchError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
