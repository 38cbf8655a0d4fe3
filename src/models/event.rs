//! Calendar event records extracted from course pages.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An exam/test event from the Calendario section.
///
/// Only rows under a "Control" separator produce these; every other
/// category in the same table is skipped entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlEvent {
    /// Event title
    pub title: String,

    /// Course code
    pub course_code: String,

    /// Full course name (used for category tags, never abbreviated)
    pub course_name: String,

    /// Origin Unix timestamp from the row's `rel` attribute
    pub origin_timestamp: i64,

    /// Event start (same calendar date as the origin timestamp)
    pub start_time: NaiveDateTime,

    /// Event end (always after `start_time`)
    pub end_time: NaiveDateTime,

    /// Duration in whole minutes
    pub duration_minutes: i64,

    /// Link to the event on the portal
    pub url: String,
}

impl ControlEvent {
    /// Duplicate-detection key: (title, origin timestamp, time-range text).
    ///
    /// The same event often appears nested in several table groups of one
    /// page; later occurrences of an identical key are discarded.
    pub fn dedup_key(&self) -> (String, i64, String) {
        use chrono::Timelike;
        (
            self.title.clone(),
            self.origin_timestamp,
            format!(
                "{}:{:02}-{}:{:02}",
                self.start_time.hour(),
                self.start_time.minute(),
                self.end_time.hour(),
                self.end_time.minute(),
            ),
        )
    }

    /// Stable per-record signature used to derive the calendar UID.
    pub fn signature(&self) -> String {
        stable_digest(&[
            "control",
            &self.title,
            &self.course_code,
            &self.origin_timestamp.to_string(),
            &self.start_time.to_string(),
            &self.end_time.to_string(),
        ])
    }
}

/// Completion state of a tarea, derived from the row text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompletionState {
    Finalizada,
    EnPlazo,
}

impl CompletionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionState::Finalizada => "Finalizada",
            CompletionState::EnPlazo => "En Plazo",
        }
    }
}

/// Submission state of a tarea, derived from the status indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// No submission yet (also the fallback for unrecognized indicators)
    #[default]
    Pendiente,
    Entregada,
    SinEntrega,
}

impl SubmissionState {
    /// Parse an indicator's text content. Unknown text maps to `Pendiente`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.contains("Sin Entrega") {
            SubmissionState::SinEntrega
        } else if text.contains("Entregada") {
            SubmissionState::Entregada
        } else {
            SubmissionState::Pendiente
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Pendiente => "Pendiente",
            SubmissionState::Entregada => "Entregada",
            SubmissionState::SinEntrega => "Sin Entrega",
        }
    }

    /// Glyph appended to calendar titles: checkmark when delivered, cross
    /// when the deadline passed without a submission, nothing while pending.
    pub fn title_suffix(&self) -> &'static str {
        match self {
            SubmissionState::Pendiente => "",
            SubmissionState::Entregada => " ✓",
            SubmissionState::SinEntrega => " ✗",
        }
    }
}

/// An assignment deadline from the Tareas section.
///
/// Produces one calendar entry for the deadline and, if `late_deadline` is
/// present, an independent second entry for the late-submission grace period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TareaEvent {
    /// Assignment title
    pub title: String,

    /// Course code
    pub course_code: String,

    /// Full course name
    pub course_name: String,

    /// Category the row appeared under (sentinel "Tareas" by default)
    pub category: String,

    /// Assignment start
    pub start_time: NaiveDateTime,

    /// Submission deadline
    pub deadline: NaiveDateTime,

    /// Late-submission deadline ("Atraso"), when the course grants one
    pub late_deadline: Option<NaiveDateTime>,

    /// Whether the assignment window has closed
    pub completion: CompletionState,

    /// Submission status
    pub submission: SubmissionState,

    /// Link to the assignment on the portal
    pub url: String,
}

impl TareaEvent {
    /// Stable per-record signature used to derive the calendar UID.
    pub fn signature(&self) -> String {
        stable_digest(&[
            "tarea",
            &self.title,
            &self.course_code,
            &self.start_time.to_string(),
            &self.deadline.to_string(),
        ])
    }
}

/// Events collected from one scraping run, ready for calendar export.
#[derive(Debug, Default)]
pub struct EventSet {
    pub controls: Vec<ControlEvent>,
    pub tareas: Vec<TareaEvent>,
}

impl EventSet {
    /// Number of calendar entries this set will produce: one per control,
    /// one per tarea plus one more per late deadline.
    pub fn entry_count(&self) -> usize {
        let late = self
            .tareas
            .iter()
            .filter(|t| t.late_deadline.is_some())
            .count();
        self.controls.len() + self.tareas.len() + late
    }
}

/// Hex digest over the given fields, stable across runs.
fn stable_digest(fields: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(&hasher.finalize()[..8])
}

/// Convert a Unix timestamp to a naive local datetime.
///
/// The portal emits timestamps that already refer to wall-clock time in the
/// portal's timezone, so the date is taken as-is.
pub fn naive_from_timestamp(timestamp: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.naive_utc())
}
