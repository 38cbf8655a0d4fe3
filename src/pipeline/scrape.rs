// src/pipeline/scrape.rs

//! Top-level scraping run: one browser session walks courses × sections ×
//! pages sequentially, feeding the extractors and the download step, then
//! writes the calendar once at the end.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use url::Url;

use crate::calendar::{build_calendar, write_calendar};
use crate::error::Result;
use crate::models::{Config, Course, EventSet, Section};
use crate::pipeline::download::{DownloadStats, Downloader, ScratchDir};
use crate::services::{
    extract_control_events, extract_courses, extract_material_files, extract_novedades,
    extract_tarea_events, novedades_page_indices,
};
use crate::session::{BrowserSession, Credentials, WebDriverSession};
use crate::storage::{ensure_category_folders, ensure_course_folders, resolve_course_folder};

/// Options for one scraping run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Case-insensitive substring filter on course names
    pub course_filter: Option<String>,

    /// Sections to walk per course
    pub sections: Vec<Section>,

    /// Run the browser without a window
    pub headless: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            course_filter: None,
            sections: Section::ALL.to_vec(),
            headless: true,
        }
    }
}

/// Run a full scrape: log in, walk every selected course section, download
/// files, and export the calendar.
///
/// The browser and the scratch directory are released on every exit path.
pub async fn run(config: &Config, credentials: &Credentials, options: &ScrapeOptions) -> Result<()> {
    config.validate()?;
    let scratch = ScratchDir::create()?;

    let session =
        WebDriverSession::connect(&config.portal, options.headless, scratch.path()).await?;
    if let Err(e) = session
        .login(&config.portal, &config.selectors, credentials)
        .await
    {
        shutdown(Box::new(session)).await;
        return Err(e);
    }

    let session: Box<dyn BrowserSession> = Box::new(session);
    let result = scrape_portal(session.as_ref(), config, options, scratch.path()).await;
    shutdown(session).await;
    result
}

/// Close the browser, logging instead of failing when the shutdown itself
/// errors. The scrape outcome already carries the interesting error.
async fn shutdown(session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        log::warn!("Browser did not shut down cleanly: {e}");
    }
}

async fn scrape_portal(
    session: &dyn BrowserSession,
    config: &Config,
    options: &ScrapeOptions,
    scratch: &Path,
) -> Result<()> {
    let base_url = Url::parse(&config.portal.base_url)?;

    session.navigate(&config.portal.base_url).await?;
    settle(config).await;
    let source = session.source().await?;
    let mut courses = {
        let html = Html::parse_document(&source);
        extract_courses(&html, &config.selectors, &base_url)?
    };

    if let Some(filter) = &options.course_filter {
        courses.retain(|c| c.matches_filter(filter));
        log::info!("{} course(s) match filter '{filter}'", courses.len());
    }
    if courses.is_empty() {
        log::warn!("Nothing to scrape");
        return Ok(());
    }

    let output_root = PathBuf::from(&config.output.root);
    let folders = ensure_course_folders(&output_root, &courses, |name| {
        config.abbreviations.get(name).cloned()
    })?;
    log::info!(
        "Course folders: {} created, {} already present",
        folders.created,
        folders.existing
    );

    let mut pipeline = Pipeline {
        session,
        config,
        downloader: Downloader::new(session, config, scratch)?,
        base_url,
        events: EventSet::default(),
        stats: DownloadStats::default(),
    };

    for course in &courses {
        log::info!("Scraping {} ({})", course.name, course.code);
        let folder = resolve_course_folder(
            &output_root,
            &course.name,
            config.abbreviations.get(&course.name).map(String::as_str),
        );

        for section in &options.sections {
            if let Err(e) = pipeline.scrape_section(course, *section, &folder).await {
                if e.is_fatal() {
                    return Err(e);
                }
                log::warn!("Section {} of {} skipped: {e}", section.path(), course.code);
            }
        }
    }

    let calendar = build_calendar(&pipeline.events, config, Utc::now());
    write_calendar(&output_root.join(&config.output.calendar_file), &calendar)?;

    log::info!(
        "Done: {} control(s), {} tarea(s), {} calendar entries; \
         {} file(s) downloaded, {} skipped, {} failed of {}",
        pipeline.events.controls.len(),
        pipeline.events.tareas.len(),
        pipeline.events.entry_count(),
        pipeline.stats.downloaded,
        pipeline.stats.skipped,
        pipeline.stats.failed,
        pipeline.stats.total,
    );
    Ok(())
}

struct Pipeline<'a> {
    session: &'a dyn BrowserSession,
    config: &'a Config,
    downloader: Downloader<'a>,
    base_url: Url,
    events: EventSet,
    stats: DownloadStats,
}

impl Pipeline<'_> {
    async fn scrape_section(
        &mut self,
        course: &Course,
        section: Section,
        folder: &Path,
    ) -> Result<()> {
        let url = course.section_url(section.path());
        match section {
            Section::Calendario => {
                let source = self.fetch(&url, &self.config.selectors.section_table).await?;
                let controls = {
                    let html = Html::parse_document(&source);
                    extract_control_events(&html, &self.config.selectors, course, &self.base_url)?
                };
                log::info!("{}: {} control(s)", course.code, controls.len());
                self.events.controls.extend(controls);
            }
            Section::Tareas => {
                let source = self.fetch(&url, &self.config.selectors.section_table).await?;
                let tareas = {
                    let html = Html::parse_document(&source);
                    extract_tarea_events(&html, &self.config.selectors, course, &self.base_url)?
                };
                log::info!("{}: {} tarea(s)", course.code, tareas.len());
                self.events.tareas.extend(tareas);
            }
            Section::MaterialDocente => {
                let source = self.fetch(&url, &self.config.selectors.section_table).await?;
                let files = {
                    let html = Html::parse_document(&source);
                    extract_material_files(&html, &self.config.selectors, &self.base_url)?
                };
                log::info!("{}: {} material file(s)", course.code, files.len());
                precreate_category_folders(folder, &files)?;
                let stats = self.downloader.download_all(folder, &files).await;
                self.stats.absorb(stats);
            }
            Section::Novedades => {
                let files = self.scrape_novedades(&url).await?;
                log::info!("{}: {} attachment(s) in novedades", course.code, files.len());
                precreate_category_folders(folder, &files)?;
                let stats = self.downloader.download_all(folder, &files).await;
                self.stats.absorb(stats);
            }
        }
        Ok(())
    }

    /// Walk every page of the Novedades feed, merging attachments across
    /// pages by download URL.
    async fn scrape_novedades(&self, url: &str) -> Result<Vec<crate::models::FileRecord>> {
        let source = self.fetch(url, &self.config.selectors.post_block).await?;
        let (mut files, indices) = {
            let html = Html::parse_document(&source);
            (
                extract_novedades(&html, &self.config.selectors, &self.base_url)?,
                novedades_page_indices(&html, &self.config.selectors)?,
            )
        };

        // Page 0 is the landing page itself.
        for index in indices.into_iter().filter(|i| *i != 0) {
            let page_url = format!("{url}?pagina={index}");
            let source = self.fetch(&page_url, &self.config.selectors.post_block).await?;
            let more = {
                let html = Html::parse_document(&source);
                extract_novedades(&html, &self.config.selectors, &self.base_url)?
            };
            files.extend(more);
        }

        let mut seen: HashSet<String> = HashSet::new();
        files.retain(|f| seen.insert(f.download_url.clone()));
        Ok(files)
    }

    /// Navigate to a page, wait for its content marker, let it settle, and
    /// return the source. A missing marker means "section empty", not an
    /// error.
    async fn fetch(&self, url: &str, wait_css: &str) -> Result<String> {
        self.session.navigate(url).await?;
        let timeout = Duration::from_secs(self.config.portal.table_timeout_secs);
        if !self.session.wait_for(wait_css, timeout).await? {
            log::debug!("'{wait_css}' never appeared at {url}");
        }
        settle(self.config).await;
        self.session.source().await
    }
}

/// Create the category subfolders before any download runs, so the course
/// tree mirrors the section layout even when individual transfers fail.
fn precreate_category_folders(folder: &Path, files: &[crate::models::FileRecord]) -> Result<()> {
    let categories: Vec<String> = files
        .iter()
        .map(|f| f.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if categories.is_empty() {
        return Ok(());
    }
    let stats = ensure_category_folders(folder, &categories)?;
    log::info!(
        "{}: {} section folder(s) created, {} already present",
        folder.display(),
        stats.created,
        stats.existing
    );
    Ok(())
}

async fn settle(config: &Config) {
    tokio::time::sleep(Duration::from_millis(config.portal.page_settle_ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Replays canned page sources; downloads drop a fixed file into the
    /// scratch directory like a real browser would.
    struct FakeSession {
        pages: HashMap<String, String>,
        current: Mutex<String>,
        scratch: PathBuf,
        visited: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn navigate(&self, url: &str) -> Result<()> {
            *self.current.lock().unwrap() = url.to_string();
            self.visited.lock().unwrap().push(url.to_string());
            Ok(())
        }

        async fn source(&self) -> Result<String> {
            let current = self.current.lock().unwrap().clone();
            Ok(self
                .pages
                .get(&current)
                .cloned()
                .unwrap_or_else(|| "<html><body></body></html>".to_string()))
        }

        async fn wait_for(&self, _css: &str, _timeout: Duration) -> Result<bool> {
            Ok(true)
        }

        async fn cookies(&self) -> Result<Vec<(String, String)>> {
            Ok(Vec::new())
        }

        async fn trigger_download(&self, _url: &str) -> Result<()> {
            std::fs::write(self.scratch.join("descarga.pdf"), b"contenido")?;
            Ok(())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    const COURSE_URL: &str = "https://www.u-cursos.cl/ingenieria/2026/1/CC3201/1/";

    fn listing_page() -> String {
        r#"<html><body><div id="cursos"><ul>
             <li id="curso.100">
               <a title="Bases de Datos" href="/ingenieria/2026/1/CC3201/1/"></a>
               <h1><span>Bases de Datos</span></h1>
               <h2>CC3201-1</h2>
             </li>
           </ul></div></body></html>"#
            .to_string()
    }

    fn calendario_page() -> String {
        r#"<html><body><table class="sortable">
             <tbody><tr class="separador"><td>Control</td></tr></tbody>
             <tbody><tr><td class="string" rel="1789000000">
               <h1><a href="/eventos/1">Control 1</a></h1>
               <h2>Sala B04 (13:00 - 16:00)</h2>
             </td></tr></tbody>
           </table></body></html>"#
            .to_string()
    }

    fn material_page() -> String {
        r#"<html><body><table class="sortable">
             <tbody><tr class="separador"><td>Clases</td></tr></tbody>
             <tbody><tr id="material.1">
               <td class="string"><h1><a href="/material/detalle?id=1">apunte.pdf</a></h1></td>
               <td class="tamano">2 MB</td>
               <td><a href="/material/bajar?id_material=1">bajar</a></td>
             </tr></tbody>
           </table></body></html>"#
            .to_string()
    }

    fn novedades_page(with_pagination: bool) -> String {
        let pagination = if with_pagination {
            r#"<ul class="paginas"><li><a href="?pagina=1">1</a></li></ul>"#
        } else {
            ""
        };
        format!(r#"<html><body><div class="post"></div>{pagination}</body></html>"#)
    }

    fn tareas_page() -> String {
        r#"<html><body><table class="sortable">
             <tbody><tr class="separador"><td>Tareas</td></tr></tbody>
             <tbody><tr>
               <td class="string"><h1><a href="/tareas/1">Tarea 1</a></h1></td>
               <td rel="1789000000">inicio</td>
               <td rel="1789600000">entrega</td>
               <td class="estado">Entregada</td>
               <td>En Plazo</td>
             </tr></tbody>
           </table></body></html>"#
            .to_string()
    }

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.output.root = root.to_string_lossy().into_owned();
        config.portal.page_settle_ms = 0;
        config.portal.request_delay_ms = 0;
        config.portal.download_timeout_secs = 2;
        config
    }

    #[tokio::test]
    async fn test_full_run_over_fake_session() {
        let output = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let config = test_config(output.path());

        let mut pages = HashMap::new();
        pages.insert(config.portal.base_url.clone(), listing_page());
        pages.insert(format!("{COURSE_URL}calendario/"), calendario_page());
        pages.insert(format!("{COURSE_URL}material_docente/"), material_page());
        pages.insert(format!("{COURSE_URL}novedades/"), novedades_page(true));
        pages.insert(
            format!("{COURSE_URL}novedades/?pagina=1"),
            novedades_page(false),
        );
        pages.insert(format!("{COURSE_URL}tareas/"), tareas_page());

        let session = FakeSession {
            pages,
            current: Mutex::new(String::new()),
            scratch: scratch.path().to_path_buf(),
            visited: Mutex::new(Vec::new()),
        };

        scrape_portal(&session, &config, &ScrapeOptions::default(), scratch.path())
            .await
            .unwrap();

        // The material file went through the in-browser path: dropped in
        // scratch, then moved and renamed to its resolved destination.
        let file = output.path().join("Bases_de_Datos/Clases/apunte.pdf");
        assert_eq!(std::fs::read(&file).unwrap(), b"contenido");
        assert!(!scratch.path().join("descarga.pdf").exists());

        // One control and one tarea without late deadline: two entries.
        let ics =
            std::fs::read_to_string(output.path().join(&config.output.calendar_file)).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("Control 1"));
        assert!(ics.contains("Tarea 1 ✓"));

        // The pagination link was followed.
        let visited = session.visited.lock().unwrap();
        assert!(visited.contains(&format!("{COURSE_URL}novedades/?pagina=1")));
    }

    #[tokio::test]
    async fn test_course_filter_skips_everything_else() {
        let output = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let config = test_config(output.path());

        let mut pages = HashMap::new();
        pages.insert(config.portal.base_url.clone(), listing_page());

        let session = FakeSession {
            pages,
            current: Mutex::new(String::new()),
            scratch: scratch.path().to_path_buf(),
            visited: Mutex::new(Vec::new()),
        };

        let options = ScrapeOptions {
            course_filter: Some("algoritmos".to_string()),
            ..ScrapeOptions::default()
        };
        scrape_portal(&session, &config, &options, scratch.path())
            .await
            .unwrap();

        // Nothing matched: no folders, no calendar.
        assert!(!output.path().join("Bases_de_Datos").exists());
        assert!(!output.path().join(&config.output.calendar_file).exists());
    }

    #[tokio::test]
    async fn test_shutdown_logs_instead_of_failing() {
        struct StubbornSession;

        #[async_trait]
        impl BrowserSession for StubbornSession {
            async fn navigate(&self, _url: &str) -> Result<()> {
                Ok(())
            }
            async fn source(&self) -> Result<String> {
                Ok(String::new())
            }
            async fn wait_for(&self, _css: &str, _timeout: Duration) -> Result<bool> {
                Ok(true)
            }
            async fn cookies(&self) -> Result<Vec<(String, String)>> {
                Ok(Vec::new())
            }
            async fn trigger_download(&self, _url: &str) -> Result<()> {
                Ok(())
            }
            async fn close(self: Box<Self>) -> Result<()> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into())
            }
        }

        // Both exit paths hand the browser to shutdown; a failing close must
        // not turn into a second error.
        shutdown(Box::new(StubbornSession)).await;
    }

    #[tokio::test]
    async fn test_existing_file_skipped_without_refetch() {
        let output = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let config = test_config(output.path());

        let target = output.path().join("Bases_de_Datos/Clases/apunte.pdf");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"antiguo").unwrap();

        let mut pages = HashMap::new();
        pages.insert(config.portal.base_url.clone(), listing_page());
        pages.insert(format!("{COURSE_URL}material_docente/"), material_page());

        let session = FakeSession {
            pages,
            current: Mutex::new(String::new()),
            scratch: scratch.path().to_path_buf(),
            visited: Mutex::new(Vec::new()),
        };

        let options = ScrapeOptions {
            sections: vec![Section::MaterialDocente],
            ..ScrapeOptions::default()
        };
        scrape_portal(&session, &config, &options, scratch.path())
            .await
            .unwrap();

        // The old bytes survive and nothing landed in scratch.
        assert_eq!(std::fs::read(&target).unwrap(), b"antiguo");
        assert!(!scratch.path().join("descarga.pdf").exists());
    }
}
