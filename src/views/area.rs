//! Area scatter view: draw a polygon, fetch every grid point inside it and
//! step through the forecast hours with a slider.

use crate::error::FluxError;
use crate::filtering::{HourOffset, HourOffsetRange};
use crate::query::descriptor::{EdrEndpoint, QueryDescriptor, QueryTime, StepSpec};
use crate::query::error::QueryError;
use crate::types::area::{AreaResult, AreaSelection, Popup};
use crate::types::dataset::Dataset;
use crate::types::geo::{LngLat, Polygon};
use crate::types::variable::Variable;
use crate::views::context::ViewContext;
use crate::views::events::{EventKind, MapEvent, Subscription};
use crate::views::surface::{CircleStyle, SampleLayer, SharedSurface, RED};
use crate::views::token::{FetchTicket, SelectionToken, TokenCounter};
use crate::views::with_view;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub const AREA_LAYER_ID: &str = "area";
pub const CIRCLE_RADIUS: f64 = 5.0;
/// How far from a sample the cursor may be for its popup to show.
pub const HOVER_RADIUS_KM: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaState {
    Idle,
    Drawing,
    HasGeometry,
    Fetching,
    Displaying,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaViewConfig {
    pub dataset: Dataset,
    pub variables: Vec<Variable>,
    pub time: QueryTime,
    pub step: Option<StepSpec>,
    /// Slider positions. A single-position range means the view has no slider.
    pub offsets: HourOffsetRange,
    pub style: CircleStyle,
}

impl AreaViewConfig {
    /// Temperature, precipitation and gust one hour into the 2024-11-04 12Z GFS run.
    pub fn gfs_scatter() -> Self {
        Self {
            dataset: Dataset::Gfs,
            variables: vec![
                Variable::Temperature2m,
                Variable::PrecipitationRate,
                Variable::WindGust,
            ],
            time: reference(2024, 11, 4, 12),
            step: Some(StepSpec::Hours(1)),
            offsets: HourOffsetRange { min: 1, max: 1 },
            style: CircleStyle::Solid(RED),
        }
    }

    /// Precipitation rate for hours 1 through 6 of the 2024-11-18 00Z HRRR run.
    pub fn hrrr_precipitation() -> Self {
        Self {
            dataset: Dataset::Hrrr,
            variables: vec![Variable::PrecipitationRate],
            time: reference(2024, 11, 18, 0),
            step: Some(StepSpec::Range { start: 1, end: 6 }),
            offsets: HourOffsetRange::default(),
            style: CircleStyle::precipitation(),
        }
    }
}

fn reference(year: i32, month: u32, day: u32, hour: u32) -> QueryTime {
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN);
    match date.and_hms_opt(hour, 0, 0) {
        Some(dt) => QueryTime::DateTime(dt),
        None => QueryTime::Date(date),
    }
}

pub struct AreaView {
    config: AreaViewConfig,
    endpoint: EdrEndpoint,
    surface: SharedSurface,
    state: AreaState,
    polygon: Option<Polygon>,
    offset: HourOffset,
    tokens: TokenCounter,
    current: Option<SelectionToken>,
    pending: Option<FetchTicket>,
    result: Option<AreaResult>,
    layer_shown: bool,
    popup_shown: bool,
    last_error: Option<String>,
    subscriptions: Vec<Subscription>,
}

impl AreaView {
    /// Creates the view and subscribes it to load, draw and hover events.
    pub fn mount(
        context: &ViewContext,
        config: AreaViewConfig,
    ) -> Result<Rc<RefCell<Self>>, FluxError> {
        let endpoint = context.config.edr(config.dataset)?.clone();
        let view = Rc::new(RefCell::new(Self {
            offset: config.offsets.first(),
            config,
            endpoint,
            surface: Rc::clone(&context.surface),
            state: AreaState::Idle,
            polygon: None,
            tokens: TokenCounter::default(),
            current: None,
            pending: None,
            result: None,
            layer_shown: false,
            popup_shown: false,
            last_error: None,
            subscriptions: Vec::new(),
        }));

        let mut subscriptions = Vec::new();
        for kind in [
            EventKind::Load,
            EventKind::DrawCreate,
            EventKind::DrawUpdate,
            EventKind::DrawDelete,
            EventKind::MouseEnter,
            EventKind::MouseLeave,
        ] {
            let weak = Rc::downgrade(&view);
            subscriptions.push(context.events.subscribe(kind, move |event| {
                with_view(&weak, |view| view.handle(event));
            }));
        }
        view.borrow_mut().subscriptions = subscriptions;
        Ok(view)
    }

    fn handle(&mut self, event: &MapEvent) {
        match event {
            MapEvent::Load => self.on_load(),
            MapEvent::DrawCreate(features) | MapEvent::DrawUpdate(features) => {
                if let Err(e) = self.draw_features(features) {
                    warn!("Ignoring drawn shape: {}", e);
                }
            }
            MapEvent::DrawDelete => self.draw_delete(),
            MapEvent::MouseEnter { layer, position } if layer == AREA_LAYER_ID => {
                self.hover(*position);
            }
            MapEvent::MouseLeave { layer } if layer == AREA_LAYER_ID => self.mouse_leave(),
            _ => {}
        }
    }

    /// The draw control is ready.
    pub fn on_load(&mut self) {
        if self.state == AreaState::Idle {
            self.transition(AreaState::Drawing);
        }
    }

    /// Takes the first feature of a draw event as the selection.
    pub fn draw_features(&mut self, features: &[Value]) -> Result<FetchTicket, QueryError> {
        let feature = features.first().ok_or(QueryError::MalformedGeometry(
            "draw event carried no features".to_string(),
        ))?;
        self.draw_polygon(Polygon::from_geojson(feature)?)
    }

    /// Stores the polygon and issues a ticket for its samples, superseding any
    /// earlier ticket. Samples drawn for a previous polygon are dropped.
    pub fn draw_polygon(&mut self, polygon: Polygon) -> Result<FetchTicket, QueryError> {
        let query = QueryDescriptor::builder()
            .geometry(polygon.clone())
            .variables(self.config.variables.clone())
            .time(self.config.time)
            .maybe_step(self.config.step.clone())
            .build()?;

        self.result = None;
        self.clear_layer();
        self.polygon = Some(polygon);
        self.transition(AreaState::HasGeometry);

        let token = self.tokens.next();
        let ticket = FetchTicket {
            token,
            url: self.endpoint.url(&query),
            query,
        };
        self.current = Some(token);
        self.pending = Some(ticket.clone());
        self.last_error = None;
        self.transition(AreaState::Fetching);
        Ok(ticket)
    }

    /// Drops the polygon and anything drawn for it. Responses still in flight
    /// are ignored when they arrive.
    pub fn draw_delete(&mut self) {
        self.polygon = None;
        self.current = None;
        self.pending = None;
        self.result = None;
        self.last_error = None;
        self.clear_layer();
        self.transition(AreaState::Idle);
    }

    pub fn take_pending(&mut self) -> Option<FetchTicket> {
        self.pending.take()
    }

    /// Hands a fetch outcome back to the view. Returns false, changing
    /// nothing, when `token` is not the current selection's.
    pub fn apply(&mut self, token: SelectionToken, result: Result<AreaResult, FluxError>) -> bool {
        if self.current != Some(token) {
            warn!("Dropping stale area response for selection {}", token.value());
            return false;
        }
        self.clear_layer();
        match result {
            Ok(result) => {
                info!(
                    "Displaying {} area samples, {} in the current band",
                    result.len(),
                    result.visible(self.offset.band()).len()
                );
                let layer = SampleLayer {
                    id: AREA_LAYER_ID.to_string(),
                    radius: CIRCLE_RADIUS,
                    style: self.config.style.clone(),
                    samples: result.samples().to_vec(),
                };
                {
                    let mut surface = self.surface.borrow_mut();
                    surface.add_sample_layer(&layer);
                    surface.set_step_filter(AREA_LAYER_ID, self.offset.band());
                }
                self.layer_shown = true;
                self.result = Some(result);
                self.last_error = None;
                self.transition(AreaState::Displaying);
            }
            Err(e) => {
                warn!("Area request failed: {}", e);
                self.result = None;
                self.last_error = Some(e.to_string());
                self.transition(AreaState::HasGeometry);
            }
        }
        true
    }

    /// Moves the slider. Only the displayed band changes; nothing is refetched.
    pub fn set_hour_offset(&mut self, hours: u32) -> Result<HourOffset, QueryError> {
        let offset = self.config.offsets.offset(hours)?;
        self.offset = offset;
        if self.layer_shown {
            self.surface
                .borrow_mut()
                .set_step_filter(AREA_LAYER_ID, offset.band());
        }
        Ok(offset)
    }

    /// Samples shown at the current slider position, or `None` before any
    /// result has arrived.
    pub fn visible(&self) -> Option<AreaSelection<'_>> {
        self.result
            .as_ref()
            .map(|result| result.visible(self.offset.band()))
    }

    /// Shows the popup for the visible sample under the cursor.
    pub fn hover(&mut self, cursor: LngLat) -> Option<Popup> {
        let popup = self
            .visible()
            .and_then(|selection| selection.popup_at(cursor, HOVER_RADIUS_KM))?;
        self.surface.borrow_mut().show_popup(&popup);
        self.popup_shown = true;
        Some(popup)
    }

    pub fn mouse_leave(&mut self) {
        if self.popup_shown {
            self.surface.borrow_mut().hide_popup();
            self.popup_shown = false;
        }
    }

    pub fn state(&self) -> AreaState {
        self.state
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    pub fn hour_offset(&self) -> HourOffset {
        self.offset
    }

    pub fn offsets(&self) -> HourOffsetRange {
        self.config.offsets
    }

    pub fn has_slider(&self) -> bool {
        self.config.offsets.min != self.config.offsets.max
    }

    /// Reference time plus the slider offset.
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.offset.valid_time(self.config.time.as_utc())
    }

    pub fn result(&self) -> Option<&AreaResult> {
        self.result.as_ref()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.config.variables
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn clear_layer(&mut self) {
        if !self.layer_shown && !self.popup_shown {
            return;
        }
        let mut surface = self.surface.borrow_mut();
        if self.popup_shown {
            surface.hide_popup();
            self.popup_shown = false;
        }
        if self.layer_shown {
            surface.remove_layer(AREA_LAYER_ID);
            self.layer_shown = false;
        }
    }

    fn transition(&mut self, next: AreaState) {
        debug!("Area view {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Drop for AreaView {
    fn drop(&mut self) {
        if !self.layer_shown && !self.popup_shown {
            return;
        }
        if let Ok(mut surface) = self.surface.try_borrow_mut() {
            if self.popup_shown {
                surface.hide_popup();
            }
            if self.layer_shown {
                surface.remove_layer(AREA_LAYER_ID);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FluxConfig;
    use crate::filtering::StepBand;
    use crate::types::area::AreaSample;
    use crate::units::DisplayValue;
    use crate::views::events::EventBus;
    use crate::views::surface::recording::{RecordingSurface, SurfaceCall};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn setup(
        config: AreaViewConfig,
    ) -> (EventBus, Rc<RefCell<RecordingSurface>>, Rc<RefCell<AreaView>>) {
        let events = EventBus::new();
        let surface = RecordingSurface::shared();
        let context = ViewContext::new(FluxConfig::default(), events.clone(), surface.clone());
        let view = AreaView::mount(&context, config).unwrap();
        (events, surface, view)
    }

    fn lake_feature() -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-122.40, 47.50], [-122.20, 47.50], [-122.20, 47.70], [-122.40, 47.70]
                ]]
            }
        })
    }

    fn sample(step: f64, prate: f64) -> AreaSample {
        AreaSample {
            position: LngLat { lng: 237.7, lat: 47.6 },
            step_seconds: step,
            values: BTreeMap::from([(Variable::PrecipitationRate, DisplayValue::Value(prate))]),
        }
    }

    fn hrrr_result() -> AreaResult {
        AreaResult::new(
            vec![Variable::PrecipitationRate],
            (1..=6)
                .map(|h| sample(3600.0 * f64::from(h), f64::from(h)))
                .collect(),
        )
    }

    #[test]
    fn drawing_a_lake_issues_one_area_request() {
        let (events, _surface, view) = setup(AreaViewConfig::gfs_scatter());
        events.emit(&MapEvent::Load);
        assert_eq!(view.borrow().state(), AreaState::Drawing);

        events.emit(&MapEvent::DrawCreate(vec![lake_feature()]));
        let ticket = view.borrow_mut().take_pending().expect("draw issues a ticket");
        assert!(view.borrow_mut().take_pending().is_none());
        assert_eq!(view.borrow().state(), AreaState::Fetching);

        assert!(ticket.url.contains("/area?coords=POLYGON(("));
        assert!(ticket
            .url
            .contains("&time=2024-11-04T12:00:00&step=1%20hour&f=geojson&parameter-name=t2m,prate,gust"));
        let pairs = ticket.url.matches(',').count();
        // three separators between four pairs, two between three variables
        assert_eq!(pairs, 5);
        assert_eq!(view.borrow().polygon().map(Polygon::len), Some(4));
    }

    #[test]
    fn slider_changes_band_without_fetching() {
        let (_events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        let ticket = view
            .borrow_mut()
            .draw_features(&[lake_feature()])
            .unwrap();
        assert!(ticket.url.contains("&step=1%20hours/6%20hours&"));
        view.borrow_mut().take_pending();
        assert!(view.borrow_mut().apply(ticket.token, Ok(hrrr_result())));
        assert_eq!(view.borrow().visible().map(|s| s.len()), Some(1));

        let offset = view.borrow_mut().set_hour_offset(3).unwrap();
        assert_eq!(offset.band(), StepBand { lower: 10770, upper: 10830 });
        assert!(view.borrow_mut().take_pending().is_none());
        assert_eq!(view.borrow().state(), AreaState::Displaying);
        assert_eq!(
            surface.borrow().calls.last(),
            Some(&SurfaceCall::SetStepFilter(
                AREA_LAYER_ID.to_string(),
                StepBand { lower: 10770, upper: 10830 }
            ))
        );
        let visible_prate = view
            .borrow()
            .visible()
            .and_then(|s| s.samples().first().map(|s| s.value(&Variable::PrecipitationRate)));
        assert_eq!(visible_prate, Some(DisplayValue::Value(3.0)));
        assert_eq!(
            view.borrow().valid_time().to_rfc3339(),
            "2024-11-18T03:00:00+00:00"
        );
    }

    #[test]
    fn slider_rejects_out_of_range_hours() {
        let (_events, _surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        assert!(matches!(
            view.borrow_mut().set_hour_offset(7),
            Err(QueryError::HourOffsetOutOfRange { offset: 7, .. })
        ));
        assert_eq!(view.borrow().hour_offset().hours(), 1);
        assert!(view.borrow().has_slider());
    }

    #[test]
    fn redraw_supersedes_in_flight_request() {
        let (_events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        let first = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();
        let second = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();

        assert!(!view.borrow_mut().apply(first.token, Ok(hrrr_result())));
        assert!(view.borrow().result().is_none());
        assert_eq!(
            surface
                .borrow()
                .count(|c| matches!(c, SurfaceCall::AddSampleLayer(..))),
            0
        );

        assert!(view.borrow_mut().apply(second.token, Ok(hrrr_result())));
        assert_eq!(view.borrow().result().map(AreaResult::len), Some(6));
    }

    #[test]
    fn redraw_drops_previous_polygon_samples() {
        let (_events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        let ticket = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();
        assert!(view.borrow_mut().apply(ticket.token, Ok(hrrr_result())));
        assert!(view
            .borrow_mut()
            .hover(LngLat { lng: -122.3, lat: 47.6 })
            .is_some());

        let florida = json!({
            "type": "Polygon",
            "coordinates": [[[-81.0, 27.0], [-80.0, 27.0], [-80.0, 28.0], [-81.0, 28.0]]]
        });
        view.borrow_mut().draw_features(&[florida]).unwrap();
        assert_eq!(view.borrow().state(), AreaState::Fetching);
        assert!(view.borrow().visible().is_none());
        assert!(view
            .borrow_mut()
            .hover(LngLat { lng: -122.3, lat: 47.6 })
            .is_none());
        let calls = surface.borrow().calls.clone();
        assert!(calls.ends_with(&[
            SurfaceCall::HidePopup,
            SurfaceCall::RemoveLayer(AREA_LAYER_ID.to_string()),
        ]));

        let error = FluxError::InvalidBaseUrl("unreachable".to_string());
        let florida_ticket = view.borrow_mut().take_pending().unwrap();
        assert!(view.borrow_mut().apply(florida_ticket.token, Err(error)));
        assert!(view.borrow().visible().is_none());
    }

    #[test]
    fn edited_polygon_refetches_and_drops_late_response() {
        let (events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        events.emit(&MapEvent::Load);
        events.emit(&MapEvent::DrawCreate(vec![lake_feature()]));
        let first = view.borrow_mut().take_pending().unwrap();
        assert!(view.borrow_mut().apply(first.token, Ok(hrrr_result())));
        assert_eq!(view.borrow().state(), AreaState::Displaying);

        let edited = json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-122.40, 47.50], [-122.10, 47.50], [-122.10, 47.80], [-122.40, 47.70]
                ]]
            }
        });
        events.emit(&MapEvent::DrawUpdate(vec![edited]));
        let second = view.borrow_mut().take_pending().expect("update issues a ticket");
        assert_ne!(second.token, first.token);
        assert_eq!(view.borrow().state(), AreaState::Fetching);
        assert!(second.url.contains("237.9 47.8"));
        assert!(!first.url.contains("237.9 47.8"));

        assert!(!view.borrow_mut().apply(first.token, Ok(hrrr_result())));
        assert!(view.borrow().result().is_none());
        assert!(view.borrow_mut().apply(second.token, Ok(hrrr_result())));
        assert_eq!(view.borrow().state(), AreaState::Displaying);
        assert_eq!(
            surface
                .borrow()
                .count(|c| matches!(c, SurfaceCall::AddSampleLayer(..))),
            2
        );
    }

    #[test]
    fn delete_removes_layer_and_ignores_late_response() {
        let (events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        let ticket = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();
        assert!(view.borrow_mut().apply(ticket.token, Ok(hrrr_result())));

        events.emit(&MapEvent::DrawDelete);
        assert_eq!(view.borrow().state(), AreaState::Idle);
        assert!(view.borrow().polygon().is_none());
        assert!(view.borrow().visible().is_none());
        assert_eq!(
            surface.borrow().calls.last(),
            Some(&SurfaceCall::RemoveLayer(AREA_LAYER_ID.to_string()))
        );

        assert!(!view.borrow_mut().apply(ticket.token, Ok(hrrr_result())));
        assert!(view.borrow().result().is_none());
    }

    #[test]
    fn failed_fetch_keeps_geometry_for_retry() {
        let (_events, _surface, view) = setup(AreaViewConfig::gfs_scatter());
        let ticket = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();
        let error = FluxError::InvalidBaseUrl("unreachable".to_string());
        assert!(view.borrow_mut().apply(ticket.token, Err(error)));

        let view = view.borrow();
        assert_eq!(view.state(), AreaState::HasGeometry);
        assert!(view.polygon().is_some());
        assert!(view.last_error().is_some());
    }

    #[test]
    fn degenerate_draw_is_rejected() {
        let (_events, _surface, view) = setup(AreaViewConfig::gfs_scatter());
        let line = json!({
            "type": "Polygon",
            "coordinates": [[[-122.4, 47.5], [-122.2, 47.5]]]
        });
        assert!(matches!(
            view.borrow_mut().draw_features(&[line]),
            Err(QueryError::DegeneratePolygon { points: 2 })
        ));
        assert!(matches!(
            view.borrow_mut().draw_features(&[]),
            Err(QueryError::MalformedGeometry(_))
        ));
        assert!(view.borrow_mut().take_pending().is_none());
    }

    #[test]
    fn hover_shows_popup_and_leave_hides_it() {
        let (events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        let ticket = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();
        view.borrow_mut().apply(ticket.token, Ok(hrrr_result()));

        events.emit(&MapEvent::MouseEnter {
            layer: AREA_LAYER_ID.to_string(),
            position: LngLat { lng: -122.3, lat: 47.6 },
        });
        assert_eq!(
            surface.borrow().calls.last(),
            Some(&SurfaceCall::ShowPopup("-122.300°, 47.600°".to_string()))
        );

        events.emit(&MapEvent::MouseLeave {
            layer: AREA_LAYER_ID.to_string(),
        });
        assert_eq!(surface.borrow().calls.last(), Some(&SurfaceCall::HidePopup));

        let popup = view
            .borrow_mut()
            .hover(LngLat { lng: -122.3, lat: 47.6 })
            .expect("sample under cursor");
        assert_eq!(popup.rows[0].value, "1.00 mm/hr");
        assert!(view.borrow_mut().hover(LngLat { lng: 10.0, lat: 10.0 }).is_none());
    }

    #[test]
    fn unmount_cleans_up() {
        let (events, surface, view) = setup(AreaViewConfig::hrrr_precipitation());
        let ticket = view.borrow_mut().draw_features(&[lake_feature()]).unwrap();
        view.borrow_mut().apply(ticket.token, Ok(hrrr_result()));
        assert_eq!(events.handler_count(), 6);

        drop(view);
        assert_eq!(events.handler_count(), 0);
        assert_eq!(
            surface.borrow().calls.last(),
            Some(&SurfaceCall::RemoveLayer(AREA_LAYER_ID.to_string()))
        );
    }
}
