// src/calendar/export.rs

//! ICS calendar construction from extracted event records.
//!
//! Calendar clients re-import the same file, so every entry carries a UID
//! derived from the record's stable signature: re-running the scraper
//! updates entries in place instead of duplicating them.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use icalendar::{Alarm, Calendar, Component, Event, EventLike, Property};

use crate::error::Result;
use crate::models::{Config, ControlEvent, EventSet, TareaEvent};

/// Build the full calendar for one scraping run.
///
/// Abbreviations apply only to entry titles; category tags always carry the
/// full course name.
pub fn build_calendar(events: &EventSet, config: &Config, now: DateTime<Utc>) -> Calendar {
    let mut calendar = Calendar::new();
    calendar
        .name("U-Cursos")
        .timezone("America/Santiago")
        .append_property(Property::new("PRODID", "-//U-Cursos Scraper//EN"))
        .append_property(Property::new(
            "X-WR-CALDESC",
            "Controles y tareas de U-Cursos",
        ));

    for control in &events.controls {
        calendar.push(control_entry(control, config, now));
    }
    for tarea in &events.tareas {
        calendar.push(deadline_entry(tarea, config, now));
        if let Some(entry) = late_entry(tarea, config, now) {
            calendar.push(entry);
        }
    }
    calendar
}

/// Serialize the calendar to disk in a single write.
pub fn write_calendar(path: &Path, calendar: &Calendar) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, calendar.to_string())?;
    log::info!("Wrote calendar to {}", path.display());
    Ok(())
}

/// Display alarm with a deterministic UID, so re-running the export never
/// invents new identifiers.
fn display_alarm(text: &str, trigger: Duration, uid: &str) -> Alarm {
    Alarm::display(text, trigger).uid(uid).done()
}

fn control_entry(event: &ControlEvent, config: &Config, now: DateTime<Utc>) -> Event {
    let title = format!("[{}] {}", config.abbreviate(&event.course_name), event.title);
    let uid = format!(
        "control-{}-{}@ucursos",
        event.course_code,
        event.signature()
    );
    Event::new()
        .uid(&uid)
        .summary(&title)
        .description(&format!(
            "Duración: {} minutos\n\nURL: {}",
            event.duration_minutes, event.url
        ))
        .starts(event.start_time)
        .ends(event.end_time)
        .add_property("CATEGORIES", format!("Controles,{}", event.course_name))
        .alarm(display_alarm(
            &format!("Control tomorrow: {}", event.title),
            -Duration::days(1),
            &format!("{uid}-reminder-1d"),
        ))
        .alarm(display_alarm(
            &format!("Control in 1 hour: {}", event.title),
            -Duration::hours(1),
            &format!("{uid}-reminder-1h"),
        ))
        .timestamp(now)
        .done()
}

fn deadline_entry(event: &TareaEvent, config: &Config, now: DateTime<Utc>) -> Event {
    let title = format!(
        "[{}] {}{}",
        config.abbreviate(&event.course_name),
        event.title,
        event.submission.title_suffix()
    );
    let uid = format!(
        "tarea-{}-{}@ucursos",
        event.course_code,
        event.signature()
    );
    Event::new()
        .uid(&uid)
        .summary(&title)
        .description(&tarea_description(event, false))
        .starts(event.deadline)
        .ends(event.deadline)
        .add_property(
            "CATEGORIES",
            format!("{},{}", event.category, event.course_name),
        )
        .alarm(display_alarm(
            &format!("Tarea mañana: {}", event.title),
            -Duration::days(1),
            &format!("{uid}-reminder-1d"),
        ))
        .timestamp(now)
        .done()
}

/// Independent entry for the late-submission deadline, when one exists.
fn late_entry(event: &TareaEvent, config: &Config, now: DateTime<Utc>) -> Option<Event> {
    let late_deadline = event.late_deadline?;
    let title = format!(
        "[{}] {}{} - Atraso",
        config.abbreviate(&event.course_name),
        event.title,
        event.submission.title_suffix()
    );
    let uid = format!(
        "tarea-late-{}-{}@ucursos",
        event.course_code,
        event.signature()
    );
    Some(
        Event::new()
            .uid(&uid)
            .summary(&title)
            .description(&tarea_description(event, true))
            .starts(late_deadline)
            .ends(late_deadline)
            .add_property(
                "CATEGORIES",
                format!("{},{}", event.category, event.course_name),
            )
            .alarm(display_alarm(
                &format!("Plazo de atrasos mañana: {}", event.title),
                -Duration::days(1),
                &format!("{uid}-reminder-1d"),
            ))
            .timestamp(now)
            .done(),
    )
}

fn tarea_description(event: &TareaEvent, for_late: bool) -> String {
    let mut description = format!(
        "Estado: {}\nEntrega: {}\n",
        event.completion.as_str(),
        event.submission.as_str()
    );
    if for_late {
        description.push_str("Plazo de atrasos\n");
    } else if let Some(late) = event.late_deadline {
        description.push_str(&format!(
            "Acepta atrasos hasta: {}\n",
            late.format("%Y-%m-%d %H:%M")
        ));
    }
    description.push('\n');
    description.push_str(&format!("URL: {}", event.url));
    description
}
