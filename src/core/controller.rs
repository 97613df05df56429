use crate::core::view::{Notice, PageView, ResultsPanel};
use crate::domain::model::{Coordinate, SessionState, CLICK_ZOOM};
use crate::domain::ports::{Geocoder, HolidayProvider};

/// Result of the first phase of a pass: the updated state and, when the
/// geocoder could not name a country, the message to show for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickOutcome {
    pub state: SessionState,
    pub notice: Option<Notice>,
}

/// Drives click → geocode → holidays → view for one session at a time.
///
/// Session state is passed in and handed back; the controller keeps none of
/// its own, so one controller serves every session.
pub struct InteractionController<G: Geocoder, H: HolidayProvider> {
    geocoder: G,
    holidays: H,
    click_zoom: u8,
}

impl<G: Geocoder, H: HolidayProvider> InteractionController<G, H> {
    pub fn new(geocoder: G, holidays: H) -> Self {
        Self {
            geocoder,
            holidays,
            click_zoom: CLICK_ZOOM,
        }
    }

    pub fn with_click_zoom(mut self, zoom: u8) -> Self {
        self.click_zoom = zoom;
        self
    }

    /// Phase 1: record the click and resolve it to a country.
    ///
    /// Any earlier country is dropped as soon as the click lands, so a failed
    /// lookup leaves the session without one.
    pub async fn handle_click(&self, mut state: SessionState, click: Coordinate) -> ClickOutcome {
        state.select_location(click, self.click_zoom);
        tracing::debug!(
            "Location selected at ({}, {})",
            click.latitude,
            click.longitude
        );

        match self.geocoder.resolve_country(click).await {
            Ok(country) => {
                state.resolve_country(country);
                ClickOutcome {
                    state,
                    notice: None,
                }
            }
            Err(e) => {
                if e.is_soft() {
                    tracing::warn!("⚠️ Country lookup failed: {}", e);
                } else {
                    tracing::error!(
                        "❌ Country lookup failed: {} (Category: {:?}, Severity: {:?})",
                        e,
                        e.category(),
                        e.severity()
                    );
                }
                state.mark_unresolved();
                ClickOutcome {
                    state,
                    notice: Some(Notice::from_error("Country lookup", &e)),
                }
            }
        }
    }

    /// Phase 2: build the view for the current state.
    ///
    /// Holidays are fetched whenever a country is set, on every call.
    pub async fn render(&self, state: &SessionState, year: i32) -> PageView {
        let Some(country) = state.country() else {
            return PageView::new(state, ResultsPanel::prompt());
        };

        match self.holidays.fetch_holidays(&country.code, year).await {
            Ok(holidays) if holidays.is_empty() => {
                let mut view = PageView::new(state, ResultsPanel::unavailable(country, year));
                view.notices.push(Notice::info(format!(
                    "No public holidays found for {}.",
                    country.display_name
                )));
                view
            }
            Ok(holidays) => PageView::new(state, ResultsPanel::loaded(country, year, holidays)),
            Err(e) => {
                tracing::error!(
                    "❌ Holiday lookup for {} {} failed: {} (Category: {:?})",
                    country.code,
                    year,
                    e,
                    e.category()
                );
                tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

                let mut view = PageView::new(state, ResultsPanel::failed(country, year));
                view.notices.push(Notice::from_error("Holiday lookup", &e));
                view
            }
        }
    }

    /// One full pass: phase 1 when the user clicked, then always phase 2.
    pub async fn interact(
        &self,
        state: SessionState,
        click: Option<Coordinate>,
        year: i32,
    ) -> (SessionState, PageView) {
        let (state, click_notice) = match click {
            Some(click) => {
                let outcome = self.handle_click(state, click).await;
                (outcome.state, outcome.notice)
            }
            None => (state, None),
        };

        let mut view = self.render(&state, year).await;
        if let Some(notice) = click_notice {
            view.notices.insert(0, notice);
        }

        (state, view)
    }
}
