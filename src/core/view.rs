use crate::domain::model::{Coordinate, CountryResolution, HolidayRecord, SessionState};
use crate::utils::error::AppError;
use serde::Serialize;
use std::fmt::Write;

pub const PAGE_TITLE: &str = "World Holiday Calendar";
pub const INSTRUCTIONS: &str =
    "Click a country on the map to see its public holidays for the current year.";
pub const PROMPT: &str = "Click the map to choose a country.";
pub const TABLE_HEADERS: [&str; 3] = ["Date", "Holiday", "Description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Soft upstream failures become warnings, everything else an error.
    pub fn from_error(context: &str, err: &AppError) -> Self {
        let message = format!("{}: {}", context, err.user_friendly_message());
        if err.is_soft() {
            Self::warning(message)
        } else {
            Self::error(message)
        }
    }
}

/// What the map widget should show after a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker: Option<Coordinate>,
}

impl From<&SessionState> for MapView {
    fn from(state: &SessionState) -> Self {
        Self {
            center: state.center,
            zoom: state.zoom,
            marker: state.clicked_location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultsPanel {
    Prompt {
        message: String,
    },
    HolidaysLoaded {
        header: String,
        country: CountryResolution,
        year: i32,
        columns: [&'static str; 3],
        rows: Vec<HolidayRecord>,
    },
    HolidaysUnavailable {
        header: String,
        country: CountryResolution,
        year: i32,
        message: String,
    },
    /// Header only; the reason is in the page notices.
    FetchFailed {
        header: String,
        country: CountryResolution,
        year: i32,
    },
}

impl ResultsPanel {
    pub fn prompt() -> Self {
        ResultsPanel::Prompt {
            message: PROMPT.to_string(),
        }
    }

    pub fn loaded(country: &CountryResolution, year: i32, rows: Vec<HolidayRecord>) -> Self {
        ResultsPanel::HolidaysLoaded {
            header: header(country, year),
            country: country.clone(),
            year,
            columns: TABLE_HEADERS,
            rows,
        }
    }

    pub fn unavailable(country: &CountryResolution, year: i32) -> Self {
        ResultsPanel::HolidaysUnavailable {
            header: header(country, year),
            country: country.clone(),
            year,
            message: format!("No public holidays found for {}.", country.display_name),
        }
    }

    pub fn failed(country: &CountryResolution, year: i32) -> Self {
        ResultsPanel::FetchFailed {
            header: header(country, year),
            country: country.clone(),
            year,
        }
    }

    pub fn rows(&self) -> &[HolidayRecord] {
        match self {
            ResultsPanel::HolidaysLoaded { rows, .. } => rows,
            _ => &[],
        }
    }
}

fn header(country: &CountryResolution, year: i32) -> String {
    format!(
        "Public holidays in {} ({}) for {}",
        country.display_name, country.code, year
    )
}

/// Everything the page shows after one interaction pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub title: &'static str,
    pub instructions: &'static str,
    pub map: MapView,
    pub notices: Vec<Notice>,
    pub results: ResultsPanel,
}

impl PageView {
    pub fn new(state: &SessionState, results: ResultsPanel) -> Self {
        Self {
            title: PAGE_TITLE,
            instructions: INSTRUCTIONS,
            map: MapView::from(state),
            notices: Vec::new(),
            results,
        }
    }

    pub fn has_level(&self, level: NoticeLevel) -> bool {
        self.notices.iter().any(|n| n.level == level)
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for notice in &self.notices {
            let tag = match notice.level {
                NoticeLevel::Info => "ℹ️ ",
                NoticeLevel::Warning => "⚠️ ",
                NoticeLevel::Error => "❌",
            };
            let _ = writeln!(out, "{} {}", tag, notice.message);
        }

        match &self.results {
            ResultsPanel::Prompt { message } => {
                let _ = writeln!(out, "{}", message);
            }
            ResultsPanel::HolidaysLoaded {
                header,
                columns,
                rows,
                ..
            } => {
                let _ = writeln!(out, "📅 {}", header);
                out.push_str(&render_table(columns, rows));
            }
            ResultsPanel::HolidaysUnavailable {
                header, message, ..
            } => {
                let _ = writeln!(out, "📅 {}", header);
                let _ = writeln!(out, "{}", message);
            }
            ResultsPanel::FetchFailed { header, .. } => {
                let _ = writeln!(out, "📅 {}", header);
            }
        }

        out
    }
}

fn render_table(columns: &[&str; 3], rows: &[HolidayRecord]) -> String {
    let cells: Vec<[&str; 3]> = rows
        .iter()
        .map(|r| [r.iso_date.as_str(), r.name.as_str(), r.description.as_str()])
        .collect();

    let mut widths = (*columns).map(|c| c.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cols: &[&str; 3]| {
        let line = cols
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line(columns);
    let rule = widths.map(|w| "-".repeat(w));
    push_line(&[rule[0].as_str(), rule[1].as_str(), rule[2].as_str()]);
    for row in &cells {
        push_line(row);
    }

    out
}
