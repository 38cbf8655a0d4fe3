// src/services/tareas.rs

//! Assignment deadline extractor for the Tareas section.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{
    naive_from_timestamp, CompletionState, Course, PortalSelectors, SubmissionState, TareaEvent,
};
use crate::services::{element_text, parse_selector, separator_category};
use crate::utils::resolve_url;

/// Sentinel category for rows that appear before any separator.
const DEFAULT_CATEGORY: &str = "Tareas";

/// Extract assignment deadlines from a course's Tareas page.
///
/// A valid row carries at least two timestamp sub-elements (start and
/// deadline); a third, when present, is the late-submission deadline. Rows
/// with fewer than two timestamps are dropped.
pub fn extract_tarea_events(
    html: &Html,
    selectors: &PortalSelectors,
    course: &Course,
    base_url: &Url,
) -> Result<Vec<TareaEvent>> {
    let table_sel = parse_selector(&selectors.section_table)?;
    let group_sel = parse_selector(&selectors.table_group)?;
    let row_sel = parse_selector("tr")?;
    let timestamp_sel = parse_selector(&selectors.tarea_timestamp)?;
    let title_sel = parse_selector(&selectors.title_link)?;
    let status_sel = parse_selector(&selectors.tarea_status)?;

    let Some(table) = html.select(&table_sel).next() else {
        log::debug!("No tareas table for {}", course.code);
        return Ok(Vec::new());
    };

    let mut events = Vec::new();
    let mut current_category: Option<String> = None;

    for group in table.select(&group_sel) {
        if let Some(category) = separator_category(&group, selectors)? {
            current_category = Some(category);
            continue;
        }

        for row in group.select(&row_sel) {
            let timestamps: Vec<i64> = row
                .select(&timestamp_sel)
                .filter_map(|el| el.value().attr(&selectors.timestamp_attr))
                .filter_map(|v| v.trim().parse::<i64>().ok())
                .collect();

            // Start and deadline are mandatory; anything less is noise.
            if timestamps.len() < 2 {
                continue;
            }

            let Some(title_link) = row.select(&title_sel).next() else {
                continue;
            };
            let (Some(start_time), Some(deadline)) = (
                naive_from_timestamp(timestamps[0]),
                naive_from_timestamp(timestamps[1]),
            ) else {
                continue;
            };
            let late_deadline = timestamps.get(2).and_then(|ts| naive_from_timestamp(*ts));

            let row_text = element_text(&row);
            let completion = if row_text.contains("Finalizada") {
                CompletionState::Finalizada
            } else {
                CompletionState::EnPlazo
            };

            let submission = row
                .select(&status_sel)
                .next()
                .map(|el| SubmissionState::parse(&element_text(&el)))
                .unwrap_or_default();

            events.push(TareaEvent {
                title: element_text(&title_link),
                course_code: course.code.clone(),
                course_name: course.name.clone(),
                category: current_category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                start_time,
                deadline,
                late_deadline,
                completion,
                submission,
                url: title_link
                    .value()
                    .attr("href")
                    .map(|href| resolve_url(base_url, href))
                    .unwrap_or_default(),
            });
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_course() -> Course {
        Course {
            code: "CC3201-1".to_string(),
            name: "Bases de Datos".to_string(),
            url: "https://www.u-cursos.cl/ingenieria/2025/2/CC3201/1/".to_string(),
            external_id: "curso.100".to_string(),
        }
    }

    fn base() -> Url {
        Url::parse("https://www.u-cursos.cl/").unwrap()
    }

    fn page(body: &str) -> Html {
        Html::parse_document(&format!(
            "<html><body><table class=\"sortable\">{body}</table></body></html>"
        ))
    }

    #[test]
    fn test_three_timestamps_produce_late_deadline() {
        let html = page(
            r#"<tbody><tr>
                 <td class="string"><h1><a href="/tareas/1">Tarea 1</a></h1></td>
                 <td rel="1700000000"></td>
                 <td rel="1700600000"></td>
                 <td rel="1700700000"></td>
                 <td class="estado">Pendiente</td>
                 <td>En Plazo</td>
               </tr></tbody>"#,
        );

        let events =
            extract_tarea_events(&html, &PortalSelectors::default(), &sample_course(), &base())
                .unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Tarea 1");
        assert!(event.late_deadline.is_some());
        assert_eq!(event.completion, CompletionState::EnPlazo);
        assert_eq!(event.submission, SubmissionState::Pendiente);
        assert_eq!(event.category, "Tareas");
    }

    #[test]
    fn test_two_timestamps_no_late_deadline() {
        let html = page(
            r#"<tbody><tr>
                 <td class="string"><h1><a href="/tareas/2">Tarea 2</a></h1></td>
                 <td rel="1700000000"></td>
                 <td rel="1700600000"></td>
                 <td class="estado">Entregada</td>
               </tr></tbody>"#,
        );

        let events =
            extract_tarea_events(&html, &PortalSelectors::default(), &sample_course(), &base())
                .unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].late_deadline.is_none());
        assert_eq!(events[0].submission, SubmissionState::Entregada);
    }

    #[test]
    fn test_single_timestamp_row_dropped() {
        let html = page(
            r#"<tbody><tr>
                 <td class="string"><h1><a href="/tareas/3">Tarea rota</a></h1></td>
                 <td rel="1700000000"></td>
               </tr></tbody>"#,
        );
        let events =
            extract_tarea_events(&html, &PortalSelectors::default(), &sample_course(), &base())
                .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_finalizada_state_and_category_from_separator() {
        let html = page(
            r#"<tbody><tr class="separador"><td>Controles</td></tr></tbody>
               <tbody><tr>
                 <td class="string"><h1><a href="/tareas/4">Tarea 4</a></h1></td>
                 <td rel="1700000000"></td>
                 <td rel="1700600000"></td>
                 <td>Finalizada</td>
                 <td class="estado">Sin Entrega</td>
               </tr></tbody>"#,
        );
        let events =
            extract_tarea_events(&html, &PortalSelectors::default(), &sample_course(), &base())
                .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "Controles");
        assert_eq!(events[0].completion, CompletionState::Finalizada);
        assert_eq!(events[0].submission, SubmissionState::SinEntrega);
    }
}
