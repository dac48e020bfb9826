// src/fetch.rs

//! Fetching rendered pages from the authenticated archive.
//!
//! The archive sits behind a login wall and may drop the session at any
//! point. Every fetch therefore goes through [`FetchClient::fetch_page`],
//! which detects the wall, re-authenticates once, and re-fetches before
//! treating the page as final content. Anything beyond that single
//! re-authentication cycle is the caller's retry policy's problem.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{ArchiveConfig, FetchConfig};

/// Environment variable holding the archive account email.
pub const USERNAME_ENV: &str = "ARCHIVE_USERNAME";

/// Environment variable holding the archive account password.
pub const PASSWORD_ENV: &str = "ARCHIVE_PASSWORD";

/// Login credentials for the archive.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from the environment.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var(USERNAME_ENV)
            .map_err(|_| AppError::config(format!("{USERNAME_ENV} is not set")))?;
        let password = std::env::var(PASSWORD_ENV)
            .map_err(|_| AppError::config(format!("{PASSWORD_ENV} is not set")))?;
        Ok(Self { username, password })
    }
}

/// Capability to retrieve rendered page content for a URL.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Fetch the rendered markup for a URL, waiting out the settle delay.
    async fn fetch_rendered(&self, url: &str) -> Result<String>;

    /// Whether the markup is the archive's login prompt rather than content.
    fn is_auth_wall(&self, markup: &str) -> bool;

    /// Submit stored credentials, refreshing the session.
    async fn reauthenticate(&self) -> Result<()>;

    /// Fetch a page, applying the auth-wall protocol: on a detected wall,
    /// re-authenticate and re-fetch the same URL once. A page that is still
    /// a wall after that is an error for the outer retry loop to handle.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let markup = self.fetch_rendered(url).await?;
        if !self.is_auth_wall(&markup) {
            return Ok(markup);
        }

        log::info!("Auth wall detected at {url}; re-authenticating");
        self.reauthenticate().await?;

        let markup = self.fetch_rendered(url).await?;
        if self.is_auth_wall(&markup) {
            return Err(AppError::Auth(url.to_string()));
        }
        Ok(markup)
    }
}

/// HTTP fetch client holding the authenticated archive session.
///
/// The cookie store carries the login session; the client is exclusively
/// owned by the run and torn down when dropped, on failure paths included.
pub struct SessionClient {
    client: reqwest::Client,
    archive: ArchiveConfig,
    credentials: Credentials,
    settle_delay: Duration,
}

impl SessionClient {
    /// Build a session client from configuration and credentials.
    pub fn new(
        archive: ArchiveConfig,
        fetch: &FetchConfig,
        credentials: Credentials,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&fetch.user_agent)
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            archive,
            credentials,
            settle_delay: Duration::from_secs(fetch.settle_delay_secs),
        })
    }
}

#[async_trait]
impl FetchClient for SessionClient {
    async fn fetch_rendered(&self, url: &str) -> Result<String> {
        let markup = self.client.get(url).send().await?.text().await?;
        // The archive backend is slow; pace it with a fixed settle window
        // per navigation. Over plain HTTP the body is already complete once
        // read, so the window sits between requests rather than before the
        // read.
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(markup)
    }

    fn is_auth_wall(&self, markup: &str) -> bool {
        markup.contains(&self.archive.login_prompt)
    }

    async fn reauthenticate(&self) -> Result<()> {
        let form = [
            (
                self.archive.email_field.as_str(),
                self.credentials.username.as_str(),
            ),
            (
                self.archive.password_field.as_str(),
                self.credentials.password.as_str(),
            ),
        ];
        self.client
            .post(&self.archive.login_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory fetch client for pipeline tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Marker that makes a scripted page read as the login wall.
    pub const WALL_MARKER: &str = "PLEASE LOG IN TO CONTINUE";

    enum Scripted {
        /// Responses served in order; the last one repeats.
        Pages(Vec<String>),
        /// Every fetch fails.
        Failing,
    }

    /// Fake [`FetchClient`] serving canned markup without network access.
    #[derive(Default)]
    pub struct FakeClient {
        scripts: HashMap<String, Scripted>,
        counts: Mutex<HashMap<String, usize>>,
        fetches: Mutex<Vec<String>>,
        reauths: AtomicUsize,
    }

    impl FakeClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `markup` for every fetch of `url`.
        pub fn with_page(mut self, url: &str, markup: &str) -> Self {
            self.scripts
                .insert(url.to_string(), Scripted::Pages(vec![markup.to_string()]));
            self
        }

        /// Serve responses in order for `url`; the last repeats.
        pub fn with_sequence(mut self, url: &str, pages: &[&str]) -> Self {
            self.scripts.insert(
                url.to_string(),
                Scripted::Pages(pages.iter().map(|p| p.to_string()).collect()),
            );
            self
        }

        /// Fail every fetch of `url`.
        pub fn with_failing_page(mut self, url: &str) -> Self {
            self.scripts.insert(url.to_string(), Scripted::Failing);
            self
        }

        /// URLs fetched, in order.
        pub fn fetched_urls(&self) -> Vec<String> {
            self.fetches.lock().unwrap().clone()
        }

        /// Number of re-authentication calls.
        pub fn reauth_count(&self) -> usize {
            self.reauths.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FetchClient for FakeClient {
        async fn fetch_rendered(&self, url: &str) -> Result<String> {
            self.fetches.lock().unwrap().push(url.to_string());
            match self.scripts.get(url) {
                Some(Scripted::Pages(pages)) => {
                    let mut counts = self.counts.lock().unwrap();
                    let count = counts.entry(url.to_string()).or_insert(0);
                    let page = pages[(*count).min(pages.len() - 1)].clone();
                    *count += 1;
                    Ok(page)
                }
                Some(Scripted::Failing) => {
                    Err(AppError::extraction("fake fetch", format!("{url} unreachable")))
                }
                None => Err(AppError::extraction(
                    "fake fetch",
                    format!("no scripted page for {url}"),
                )),
            }
        }

        fn is_auth_wall(&self, markup: &str) -> bool {
            markup.contains(WALL_MARKER)
        }

        async fn reauthenticate(&self) -> Result<()> {
            self.reauths.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fetch_page_reauths_once_behind_wall() {
        let client = FakeClient::new().with_sequence(
            "https://archive.example/page",
            &[WALL_MARKER, "real content"],
        );

        let markup = client.fetch_page("https://archive.example/page").await.unwrap();
        assert_eq!(markup, "real content");
        assert_eq!(client.reauth_count(), 1);
        assert_eq!(client.fetched_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_page_errors_if_wall_persists() {
        let client = FakeClient::new().with_page("https://archive.example/page", WALL_MARKER);

        let error = client
            .fetch_page("https://archive.example/page")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Auth(_)));
        assert_eq!(client.reauth_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_page_skips_reauth_for_content() {
        let client = FakeClient::new().with_page("https://archive.example/page", "content");

        let markup = client.fetch_page("https://archive.example/page").await.unwrap();
        assert_eq!(markup, "content");
        assert_eq!(client.reauth_count(), 0);
    }
}
