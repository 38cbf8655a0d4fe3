// src/services/courses.rs

//! Course listing extractor.
//!
//! Reads the enrolled courses from the current academic-term container,
//! ignoring sibling containers (communities, institutions).

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{Course, PortalSelectors};
use crate::services::{element_text, parse_selector};
use crate::utils::resolve_url;

/// Extract the course list from the portal home page.
///
/// Malformed course elements (missing expected sub-elements) are skipped
/// individually; extraction of the whole page never aborts on one bad
/// element.
pub fn extract_courses(
    html: &Html,
    selectors: &PortalSelectors,
    base_url: &Url,
) -> Result<Vec<Course>> {
    let container_sel = parse_selector(&selectors.term_container)?;
    let item_sel = parse_selector(&selectors.course_item)?;
    let link_sel = parse_selector(&selectors.course_link)?;
    let name_sel = parse_selector(&selectors.course_name)?;
    let code_sel = parse_selector(&selectors.course_code)?;

    let Some(container) = html.select(&container_sel).next() else {
        log::warn!(
            "Term container '{}' not found on listing page",
            selectors.term_container
        );
        return Ok(Vec::new());
    };

    let mut courses = Vec::new();
    for (idx, item) in container.select(&item_sel).enumerate() {
        let link = item.select(&link_sel).next();
        let name = item.select(&name_sel).next();
        let code = item.select(&code_sel).next();
        let external_id = item.value().attr("id");

        let (Some(link), Some(name), Some(code), Some(external_id)) =
            (link, name, code, external_id)
        else {
            log::warn!("Skipping malformed course element {}", idx + 1);
            continue;
        };

        let Some(href) = link.value().attr("href") else {
            log::warn!("Skipping course element {} without link target", idx + 1);
            continue;
        };

        courses.push(Course {
            code: element_text(&code),
            name: element_text(&name),
            url: resolve_url(base_url, href),
            external_id: external_id.to_string(),
        });
    }

    log::info!("Parsed {} course(s) from listing", courses.len());
    Ok(courses)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <div id="cursos">
          <ul>
            <li id="curso.100">
              <a title="Bases de Datos" href="/ingenieria/2025/2/CC3201/1/"></a>
              <h1><span>Bases de Datos</span></h1>
              <h2>CC3201-1</h2>
            </li>
            <li id="curso.200">
              <a title="PSS" href="https://www.u-cursos.cl/ingenieria/2025/2/CC4101/1/"></a>
              <h1><span>Programación de Software de Sistemas</span></h1>
              <h2>CC4101-1</h2>
            </li>
            <li id="curso.300">
              <h1><span>Sin Enlace</span></h1>
            </li>
          </ul>
        </div>
        <div id="comunidades">
          <li id="curso.999">
            <a title="Comunidad" href="/comunidad/"></a>
            <h1><span>Comunidad</span></h1>
            <h2>COM-1</h2>
          </li>
        </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.u-cursos.cl/").unwrap()
    }

    #[test]
    fn test_extracts_courses_from_term_container_only() {
        let html = Html::parse_document(LISTING);
        let courses = extract_courses(&html, &PortalSelectors::default(), &base()).unwrap();

        // The malformed element and the sibling container are both skipped.
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].code, "CC3201-1");
        assert_eq!(courses[0].name, "Bases de Datos");
        assert_eq!(
            courses[0].url,
            "https://www.u-cursos.cl/ingenieria/2025/2/CC3201/1/"
        );
        assert_eq!(courses[0].external_id, "curso.100");
        assert_eq!(courses[1].external_id, "curso.200");
    }

    #[test]
    fn test_missing_container_yields_empty() {
        let html = Html::parse_document("<html><body><p>login</p></body></html>");
        let courses = extract_courses(&html, &PortalSelectors::default(), &base()).unwrap();
        assert!(courses.is_empty());
    }
}
