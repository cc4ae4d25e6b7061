// src/fetch/http.rs
// =============================================================================
// This module fetches one crawl target over HTTP.
//
// Key functionality:
// - Optional HEAD request first: non-HTML resources (images, PDFs, ...) are
//   confirmed without downloading their body
// - GET for everything else, then link extraction on HTML responses
// - Every request is bounded by the configured timeout
// - Redirects are followed only while they stay on the allowed domains
//
// What counts as a failure?
// Only requests that never complete: timeout, DNS failure, refused
// connection, TLS problems, redirect loops, redirects off the allowed
// domains, a body cut off mid-way.
// A 404 or a 500 is still a response. It is reported as a successful visit
// with that status code, and its body is scanned for links like any other.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Result<T, E> + `?`: The happy path reads top to bottom
// - Enums: FetchOutcome is either a Success or a Failure
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE, REFERER};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

use super::html::{extract_links, PageLinks};
use crate::config::CrawlConfig;
use crate::crawl::{in_scope, CrawlTarget};
use crate::error::{FetchError, RedirectBlocked};

const MAX_REDIRECTS: usize = 10;

/// What happened when a target was fetched.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A response came back (any status code)
    Success {
        url: Url,
        /// Where the request ended up; differs from `url` after redirects
        final_url: Url,
        status: u16,
        /// Empty when the response was not HTML
        page: PageLinks,
    },
    /// The request never completed
    Failure { url: Url, error: FetchError },
}

pub struct Fetcher {
    client: Client,
    check_head: bool,
}

impl Fetcher {
    // Creates the HTTP client shared by every fetch task
    //
    // Client is cheap to clone (it's a reference counter internally) and
    // pools connections, so one per crawl is all we need.
    pub fn new(config: &CrawlConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .redirect(redirect_policy(config.allowed_domains.clone()))
            .user_agent(concat!("link-crawler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Fetcher {
            client,
            check_head: config.check_head,
        })
    }

    pub async fn fetch(&self, target: &CrawlTarget) -> FetchOutcome {
        match self.try_fetch(target).await {
            Ok((status, final_url, page)) => FetchOutcome::Success {
                url: target.url.clone(),
                final_url,
                status,
                page,
            },
            Err(error) => FetchOutcome::Failure {
                url: target.url.clone(),
                error,
            },
        }
    }

    async fn try_fetch(&self, target: &CrawlTarget) -> Result<(u16, Url, PageLinks), FetchError> {
        if self.check_head {
            let head = self
                .request(Method::HEAD, target)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;

            // A HEAD that says "not HTML" is the whole answer
            if !may_contain_links(head.headers()) {
                return Ok((head.status().as_u16(), head.url().clone(), no_links(head.url())));
            }
        }

        let response = self
            .request(Method::GET, target)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        // After redirects, relative links are relative to where we landed
        let final_url = response.url().clone();
        let is_html = may_contain_links(response.headers());

        // The body is read even when we won't parse it: a request is only
        // complete once the whole response has arrived
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let page = if is_html {
            extract_links(&body, &final_url)
        } else {
            no_links(&final_url)
        };

        Ok((status, final_url, page))
    }

    fn request(&self, method: Method, target: &CrawlTarget) -> RequestBuilder {
        let request = self.client.request(method, target.url.clone());
        match &target.referer {
            Some(referer) => request.header(REFERER, referer.as_str()),
            None => request,
        }
    }
}

// Same hop limit as reqwest's default policy, plus the domain allowlist:
// a redirect may not take the crawler where a link could not
fn redirect_policy(allowed: HashSet<String>) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if !in_scope(attempt.url(), &allowed) {
            let host = attempt.url().host_str().unwrap_or_default().to_string();
            attempt.error(RedirectBlocked(host))
        } else {
            attempt.follow()
        }
    })
}

// No Content-Type at all is treated as "maybe HTML"
fn may_contain_links(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some(content_type) => content_type.to_ascii_lowercase().contains("html"),
        None => true,
    }
}

fn no_links(url: &Url) -> PageLinks {
    PageLinks {
        base: url.clone(),
        links: Vec::new(),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD before GET?
//    - HEAD returns only the headers, no body
//    - If Content-Type says "image/png" there are no links to find, so the
//      HEAD response is all we need and the download is skipped
//    - If it says HTML (or says nothing), we still need the body: GET it
//
// 2. Why is a 404 a "success" here?
//    - The server answered, so the request completed
//    - Failures are requests that never got an answer (timeouts, DNS, ...)
//    - The status code travels with the success so the report can show it
//
// 3. What is Policy::custom?
//    - reqwest calls our closure before following each redirect
//    - attempt.follow() goes on, attempt.error(...) stops with an error
//    - The closure must be Send + Sync + 'static, so it takes its own copy
//      of the allowed domains (`move`) instead of borrowing the config
//
// 4. Why map_err(|e| FetchError::from_reqwest(&e))?
//    - The `?` operator needs the error types to line up
//    - We turn reqwest's error into our own FetchError right away, so the
//      rest of the crawler never deals with reqwest directly
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use reqwest::header::HeaderValue;

    fn fetcher(check_head: bool) -> Fetcher {
        let config = CrawlConfig::new("http://127.0.0.1/")
            .unwrap()
            .with_request_timeout(Duration::from_secs(2))
            .unwrap()
            .with_check_head(check_head);
        Fetcher::new(&config).unwrap()
    }

    fn target(url: &str) -> CrawlTarget {
        CrawlTarget::seed(Url::parse(url).unwrap())
    }

    #[test]
    fn test_may_contain_links() {
        let mut headers = HeaderMap::new();
        assert!(may_contain_links(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/HTML; charset=utf-8"));
        assert!(may_contain_links(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        assert!(!may_contain_links(&headers));
    }

    #[tokio::test]
    async fn test_get_extracts_links_from_html() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/next">next</a><img src="logo.png">"#)
            .create_async()
            .await;

        let outcome = fetcher(false).fetch(&target(&server.url())).await;
        page.assert_async().await;

        match outcome {
            FetchOutcome::Success { status, page, .. } => {
                assert_eq!(status, 200);
                assert_eq!(page.links, vec!["/next", "logo.png"]);
            }
            FetchOutcome::Failure { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_http_error_status_is_success_with_links() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/home">home</a>"#)
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        match fetcher(false).fetch(&target(&url)).await {
            FetchOutcome::Success { status, page, .. } => {
                assert_eq!(status, 404);
                assert_eq!(page.links, vec!["/home"]);
            }
            FetchOutcome::Failure { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_non_html_body_is_not_parsed() {
        let mut server = mockito::Server::new_async().await;
        let _text = server
            .mock("GET", "/notes.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(r#"<a href="/looks-like-a-link">"#)
            .create_async()
            .await;

        let url = format!("{}/notes.txt", server.url());
        match fetcher(false).fetch(&target(&url)).await {
            FetchOutcome::Success { page, .. } => assert!(page.links.is_empty()),
            FetchOutcome::Failure { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_head_check_skips_get_for_non_html() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/logo.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .expect(1)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/logo.png")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let url = format!("{}/logo.png", server.url());
        let outcome = fetcher(true).fetch(&target(&url)).await;

        head.assert_async().await;
        get.assert_async().await;
        assert!(matches!(outcome, FetchOutcome::Success { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_head_check_then_get_for_html() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .expect(1)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/a">a</a>"#)
            .expect(1)
            .create_async()
            .await;

        let outcome = fetcher(true).fetch(&target(&server.url())).await;

        head.assert_async().await;
        get.assert_async().await;
        match outcome {
            FetchOutcome::Success { page, .. } => assert_eq!(page.links, vec!["/a"]),
            FetchOutcome::Failure { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_referer_header_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let child = server
            .mock("GET", "/child")
            .match_header("referer", format!("{}/", server.url()).as_str())
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let parent = target(&format!("{}/", server.url()));
        let child_target = parent.child(Url::parse(&format!("{}/child", server.url())).unwrap());
        let outcome = fetcher(false).fetch(&child_target).await;

        child.assert_async().await;
        assert!(matches!(outcome, FetchOutcome::Success { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_failure() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let outcome = fetcher(false)
            .fetch(&target(&format!("http://127.0.0.1:{}/", port)))
            .await;

        match outcome {
            FetchOutcome::Failure { error, .. } => assert_eq!(error.kind, FetchErrorKind::Connect),
            FetchOutcome::Success { .. } => panic!("closed port should not answer"),
        }
    }

    #[tokio::test]
    async fn test_redirect_within_allowed_domains_reports_final_url() {
        let mut server = mockito::Server::new_async().await;
        let _old = server
            .mock("GET", "/old")
            .with_status(301)
            .with_header("location", "/new")
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/new")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="next">next</a>"#)
            .create_async()
            .await;

        let url = format!("{}/old", server.url());
        match fetcher(false).fetch(&target(&url)).await {
            FetchOutcome::Success { url, final_url, page, .. } => {
                assert!(url.path().ends_with("/old"));
                assert_eq!(final_url.path(), "/new");
                assert_eq!(page.base.path(), "/new");
            }
            FetchOutcome::Failure { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    #[tokio::test]
    async fn test_redirect_to_disallowed_host_is_blocked() {
        let mut server = mockito::Server::new_async().await;
        let port = Url::parse(&server.url()).unwrap().port().unwrap();
        let _away = server
            .mock("GET", "/away")
            .with_status(302)
            .with_header("location", &format!("http://localhost:{}/elsewhere", port))
            .create_async()
            .await;
        let elsewhere = server.mock("GET", "/elsewhere").expect(0).create_async().await;

        // The fetcher's config only allows 127.0.0.1
        let url = format!("{}/away", server.url());
        let outcome = fetcher(false).fetch(&target(&url)).await;

        elsewhere.assert_async().await;
        match outcome {
            FetchOutcome::Failure { error, .. } => {
                assert_eq!(error.kind, FetchErrorKind::RedirectOutOfScope)
            }
            FetchOutcome::Success { .. } => panic!("redirect off the allowed domains was followed"),
        }
    }
}
