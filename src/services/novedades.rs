// src/services/novedades.rs

//! Attachment extractor for the Novedades feed.
//!
//! Posts in the feed link PDFs and ZIPs; a ZIP that immediately follows a
//! PDF is treated as that PDF's companion archive and lands in the same
//! subfolder, named after the PDF.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{FileRecord, PortalSelectors};
use crate::services::{classify_transport, element_text, parse_selector};
use crate::utils::{file_stem, resolve_url, same_origin, sanitize_component};

const CATEGORY: &str = "Novedades";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Pdf,
    Zip,
}

/// Page indices advertised by the feed's pagination bar.
///
/// Page 0 is always present even when the bar is missing or only lists
/// later pages.
pub fn novedades_page_indices(html: &Html, selectors: &PortalSelectors) -> Result<Vec<u32>> {
    let page_sel = parse_selector(&selectors.page_list)?;

    let mut indices = vec![0];
    for link in html.select(&page_sel) {
        if let Ok(index) = element_text(&link).parse::<u32>() {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// Extract downloadable attachments from one page of the Novedades feed.
pub fn extract_novedades(
    html: &Html,
    selectors: &PortalSelectors,
    base_url: &Url,
) -> Result<Vec<FileRecord>> {
    let post_sel = parse_selector(&selectors.post_block)?;
    let link_sel = parse_selector(&selectors.post_link)?;

    let mut files = Vec::new();
    for post in html.select(&post_sel) {
        // Adjacency is judged per post, over file links only.
        let mut open_group: Option<String> = None;

        for link in post.select(&link_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let url = resolve_url(base_url, href);
            if !same_origin(base_url, &url) {
                continue;
            }

            let label = element_text(&link);
            let name = if label.is_empty() {
                url.rsplit('/').next().unwrap_or(&url).to_string()
            } else {
                label
            };
            let Some(kind) = link_kind(&name, &url) else {
                continue;
            };

            let subfolder = match kind {
                LinkKind::Pdf => {
                    let folder = sanitize_component(file_stem(&name));
                    open_group = Some(folder.clone());
                    folder
                }
                LinkKind::Zip => match open_group.take() {
                    Some(folder) => folder,
                    None => {
                        log::debug!("ZIP '{name}' has no preceding PDF, dropped");
                        continue;
                    }
                },
            };

            let transport = classify_transport(base_url, &url);
            files.push(FileRecord {
                name,
                download_url: url,
                category: CATEGORY.to_string(),
                subfolder: Some(subfolder),
                size_label: String::new(),
                transport,
            });
        }
    }

    Ok(files)
}

fn link_kind(name: &str, url: &str) -> Option<LinkKind> {
    let name = name.to_ascii_lowercase();
    let url = url.to_ascii_lowercase();
    if name.ends_with(".pdf") || url.ends_with(".pdf") {
        Some(LinkKind::Pdf)
    } else if name.ends_with(".zip") || url.ends_with(".zip") {
        Some(LinkKind::Zip)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.u-cursos.cl/").unwrap()
    }

    fn page(posts: &str) -> Html {
        Html::parse_document(&format!("<html><body>{posts}</body></html>"))
    }

    fn post(links: &[(&str, &str)]) -> String {
        let body: String = links
            .iter()
            .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
            .collect();
        format!(r#"<div class="post">{body}</div>"#)
    }

    #[test]
    fn test_zip_joins_preceding_pdf_group() {
        let html = page(&post(&[
            ("/files/enunciado.pdf", "enunciado.pdf"),
            ("/files/codigo.zip", "codigo.zip"),
            ("/files/pauta.pdf", "pauta.pdf"),
        ]));

        let files = extract_novedades(&html, &PortalSelectors::default(), &base()).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].subfolder.as_deref(), Some("enunciado"));
        assert_eq!(files[1].subfolder.as_deref(), Some("enunciado"));
        assert_eq!(files[2].subfolder.as_deref(), Some("pauta"));
        assert!(files.iter().all(|f| f.category == "Novedades"));
    }

    #[test]
    fn test_zip_without_preceding_pdf_dropped() {
        let html = page(&post(&[
            ("/files/suelto.zip", "suelto.zip"),
            ("/files/apunte.pdf", "apunte.pdf"),
        ]));

        let files = extract_novedades(&html, &PortalSelectors::default(), &base()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "apunte.pdf");
    }

    #[test]
    fn test_group_consumed_by_first_zip() {
        let html = page(&post(&[
            ("/files/tarea.pdf", "tarea.pdf"),
            ("/files/base.zip", "base.zip"),
            ("/files/extra.zip", "extra.zip"),
        ]));

        let files = extract_novedades(&html, &PortalSelectors::default(), &base()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].name, "base.zip");
    }

    #[test]
    fn test_cross_origin_and_plain_links_ignored() {
        let html = page(&post(&[
            ("https://example.com/ajeno.pdf", "ajeno.pdf"),
            ("/foro/hilo/123", "ver el hilo"),
            ("/files/local.pdf", "local.pdf"),
        ]));

        let files = extract_novedades(&html, &PortalSelectors::default(), &base()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "local.pdf");
    }

    #[test]
    fn test_adjacency_does_not_cross_posts() {
        let html = page(&format!(
            "{}{}",
            post(&[("/files/clase.pdf", "clase.pdf")]),
            post(&[("/files/anexo.zip", "anexo.zip")]),
        ));

        let files = extract_novedades(&html, &PortalSelectors::default(), &base()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "clase.pdf");
    }

    #[test]
    fn test_page_indices_include_zero_and_dedup() {
        let html = page(
            r#"<ul class="paginas">
                 <li><a href="?pagina=1">1</a></li>
                 <li><a href="?pagina=2">2</a></li>
                 <li><a href="?pagina=2">2</a></li>
                 <li><a href="?pagina=3">siguiente</a></li>
               </ul>"#,
        );
        let indices = novedades_page_indices(&html, &PortalSelectors::default()).unwrap();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_page_indices_without_pagination_bar() {
        let html = page("<div class=\"post\"></div>");
        let indices = novedades_page_indices(&html, &PortalSelectors::default()).unwrap();
        assert_eq!(indices, vec![0]);
    }
}
