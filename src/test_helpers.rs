//! Shared test helpers for building configurations and fixture pages.

use crate::config::{Config, RetryConfig, SourceConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Cookie every test configuration sends
pub(crate) const TEST_COOKIE: &str = "zeit_sso=test-session";

/// Configuration pointing every endpoint at `origin` with fast, deterministic retries
pub(crate) fn test_config(origin: &str, base_path: &Path) -> Config {
    Config {
        auth_cookie: TEST_COOKIE.to_string(),
        base_path: base_path.to_path_buf(),
        endpoints: SourceConfig::with_origin(origin),
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..Default::default()
    }
}

/// One audio listing entry as the archive renders it
pub(crate) fn audio_entry(asset_url: &str, year: &str, edition: &str) -> String {
    format!(
        r#"<div class="episode">
             <div class="episode__meta">
               <p><strong>Jahr:</strong> {year}</p>
               <p><strong>Ausgabe:</strong> {edition}</p>
               <p><strong>MP3 Download:</strong> <a href="{asset_url}">Download</a></p>
             </div>
           </div>"#
    )
}

/// An audio listing page with the given entries and an optional last pager link
pub(crate) fn audio_listing(entries: &[String], last_page: Option<u32>) -> String {
    let pager = match last_page {
        Some(page) => format!(
            r#"<ul class="pager">
                 <li class="pager__page"><a href="/abo/zeit-audio?page=1">2</a></li>
                 <li class="pager__page"><a href="/abo/zeit-audio?page={page}">Last</a></li>
               </ul>"#
        ),
        None => String::new(),
    };
    format!(
        "<html><body>{}{}</body></html>",
        entries.join("\n"),
        pager
    )
}

/// The e-paper landing page with its year and issue select controls
pub(crate) fn epaper_landing(years: &[&str], editions: &[&str]) -> String {
    let options = |values: &[&str]| {
        values
            .iter()
            .map(|v| format!(r#"<option value="{v}">{v}</option>"#))
            .collect::<String>()
    };
    format!(
        r#"<html><body><form>
             <select id="year"><option value="">Jahr</option>{}</select>
             <select id="issue"><option value="">Ausgabe</option>{}</select>
           </form></body></html>"#,
        options(years),
        options(editions)
    )
}

/// An e-paper search result page; `None` renders an empty result list
pub(crate) fn epaper_search_result(detail_path: Option<&str>) -> String {
    let cover = match detail_path {
        Some(href) => format!(
            r#"<div class="epaper-cover"><a href="{href}"><img src="/cover.jpg"></a></div>"#
        ),
        None => String::new(),
    };
    format!(
        r#"<html><body><div class="archives-filter-results">{cover}</div></body></html>"#
    )
}

/// An e-paper detail page with teaser, download buttons and an optional audio link
pub(crate) fn epaper_detail(teaser: &str, downloads: &[&str], audio_url: Option<&str>) -> String {
    let buttons: String = downloads
        .iter()
        .map(|href| format!(r#"<a class="epaper-info-filesize" href="{href}">PDF</a>"#))
        .collect();
    let audio = audio_url
        .map(|href| format!(r#"<a href="{href}">Audio</a>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
             <p class="article-teaser-issue">{teaser}</p>
             {buttons}
             {audio}
           </body></html>"#
    )
}

/// A file served by [`SlowServer`], trickled out chunk by chunk
pub(crate) struct SlowRoute {
    path: &'static str,
    filename: &'static str,
    chunks: Vec<&'static str>,
    pause: Duration,
    declared_length: Option<usize>,
}

impl SlowRoute {
    /// Serve `chunks` at `path`, sleeping `pause` before each one
    pub(crate) fn new(
        path: &'static str,
        filename: &'static str,
        chunks: Vec<&'static str>,
        pause: Duration,
    ) -> Self {
        Self {
            path,
            filename,
            chunks,
            pause,
            declared_length: None,
        }
    }

    /// Announce `length` bytes in Content-Length but hang up after the chunks
    pub(crate) fn truncated(mut self, length: usize) -> Self {
        self.declared_length = Some(length);
        self
    }

    fn body_len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.len()).sum()
    }
}

/// Bare HTTP/1.1 server that sends headers at once and the body slowly
///
/// wiremock can only delay a whole response, so this one is hand-rolled on a
/// TCP listener. Every connection serves a single request.
pub(crate) struct SlowServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl SlowServer {
    pub(crate) async fn start(routes: Vec<SlowRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(routes);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let _ = serve_slowly(stream, &routes).await;
                });
            }
        });
        Self { addr, task }
    }

    pub(crate) fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for SlowServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_slowly(mut stream: TcpStream, routes: &[SlowRoute]) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buf).await?;
        if read == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..read]);
    }
    let request = String::from_utf8_lossy(&request);
    let target = request.split_whitespace().nth(1).unwrap_or_default();

    let Some(route) = routes.iter().find(|route| route.path == target) else {
        stream
            .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await?;
        return stream.shutdown().await;
    };

    let head = format!(
        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\ncontent-disposition: attachment; filename=\"{}\"\r\nconnection: close\r\n\r\n",
        route.declared_length.unwrap_or_else(|| route.body_len()),
        route.filename
    );
    stream.write_all(head.as_bytes()).await?;
    stream.flush().await?;
    for chunk in &route.chunks {
        tokio::time::sleep(route.pause).await;
        stream.write_all(chunk.as_bytes()).await?;
        stream.flush().await?;
    }
    stream.shutdown().await
}
