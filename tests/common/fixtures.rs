//! A fake archive site served by wiremock
//!
//! Mirrors the markup the aggregators rely on: the paginated audio listing,
//! the e-paper landing page with its select controls, search result pages,
//! detail pages and the downloadable files themselves.

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An audio listing entry: asset file name below `/media/` plus its labels
#[derive(Debug, Clone)]
pub struct AudioEntry {
    /// Year label
    pub year: &'static str,
    /// Edition label as the listing shows it (unpadded)
    pub edition: &'static str,
    /// File name below `/media/`
    pub file: &'static str,
}

/// A downloadable e-paper file served below `/download/`
#[derive(Debug, Clone)]
pub struct EpaperFile {
    /// Route below `/download/`
    pub id: &'static str,
    /// Name announced in Content-Disposition
    pub filename: &'static str,
}

/// Body served for every downloadable file
pub fn file_body(name: &str) -> String {
    format!("content of {}", name)
}

/// Wiremock server impersonating both archive hosts
pub struct FakeArchive {
    /// The underlying mock server
    pub server: MockServer,
}

impl FakeArchive {
    /// Start a server whose searches find nothing until issues are added
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abo/diezeit"))
            .and(query_param("title", "diezeit"))
            .respond_with(html(
                r#"<html><body><div class="archives-filter-results"></div></body></html>"#
                    .to_string(),
            ))
            .with_priority(10)
            .mount(&server)
            .await;
        Self { server }
    }

    /// Origin of the fake site
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Serve a single-page audio listing and every listed asset
    pub async fn audio_listing(&self, entries: &[AudioEntry]) {
        let rows: String = entries
            .iter()
            .map(|entry| {
                format!(
                    r#"<article class="episode"><div class="episode__info">
                         <p><strong>Jahr:</strong> {}</p>
                         <p><strong>Ausgabe:</strong> {}</p>
                         <p><strong>MP3 Download:</strong> <a href="{}/media/{}">MP3</a></p>
                       </div></article>"#,
                    entry.year,
                    entry.edition,
                    self.uri(),
                    entry.file
                )
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/abo/zeit-audio"))
            .and(query_param_is_missing("page"))
            .respond_with(html(format!("<html><body>{}</body></html>", rows)))
            .mount(&self.server)
            .await;

        for entry in entries {
            self.media(entry.file).await;
        }
    }

    /// Serve an asset below `/media/`, named only by its URL
    pub async fn media(&self, file: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/media/{}", file)))
            .respond_with(ResponseTemplate::new(200).set_body_string(file_body(file)))
            .mount(&self.server)
            .await;
    }

    /// Serve the e-paper landing page
    pub async fn epaper_landing(&self, years: &[&str], editions: &[&str]) {
        let options = |values: &[&str]| -> String {
            values
                .iter()
                .map(|v| format!(r#"<option value="{v}">{v}</option>"#))
                .collect()
        };
        let body = format!(
            r#"<html><body><form>
                 <select id="year"><option value="">Jahr</option>{}</select>
                 <select id="issue"><option value="">Ausgabe</option>{}</select>
               </form></body></html>"#,
            options(years),
            options(editions)
        );

        Mock::given(method("GET"))
            .and(path("/abo/diezeit"))
            .and(query_param_is_missing("title"))
            .respond_with(html(body))
            .mount(&self.server)
            .await;
    }

    /// Serve one issue: its search result, detail page and files
    pub async fn epaper_issue(
        &self,
        year: &str,
        edition: &str,
        files: &[EpaperFile],
        audio: Option<&str>,
    ) {
        let detail_path = format!("/abo/diezeit/{}/{}", year, edition);

        Mock::given(method("GET"))
            .and(path("/abo/diezeit"))
            .and(query_param("title", "diezeit"))
            .and(query_param("year", year))
            .and(query_param("issue", edition))
            .respond_with(html(format!(
                r#"<html><body><div class="archives-filter-results">
                     <div class="epaper-cover"><a href="{}"><img src="/c.jpg"></a></div>
                   </div></body></html>"#,
                detail_path
            )))
            .mount(&self.server)
            .await;

        let buttons: String = files
            .iter()
            .map(|file| {
                format!(
                    r#"<a class="epaper-info-filesize" href="/download/{}">{}</a>"#,
                    file.id, file.filename
                )
            })
            .collect();
        let audio_link = audio
            .map(|file| format!(r#"<a href="{}/media/{}">Anhören</a>"#, self.uri(), file))
            .unwrap_or_default();

        Mock::given(method("GET"))
            .and(path(detail_path.as_str()))
            .respond_with(html(format!(
                r#"<html><body>
                     <p class="article-teaser-issue"> DIE ZEIT {}/{} vom 01.01.{} </p>
                     {}{}
                   </body></html>"#,
                edition, year, year, buttons, audio_link
            )))
            .mount(&self.server)
            .await;

        for file in files {
            Mock::given(method("GET"))
                .and(path(format!("/download/{}", file.id)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header(
                            "content-disposition",
                            format!(r#"attachment; filename="{}""#, file.filename).as_str(),
                        )
                        .set_body_string(file_body(file.filename)),
                )
                .mount(&self.server)
                .await;
        }
        if let Some(file) = audio {
            self.media(file).await;
        }
    }

    /// Requests received so far whose URL contains `needle`
    pub async fn requests_matching(&self, needle: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.as_str().contains(needle))
            .count()
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}
