//! Point timeseries view: click a location, get a chart of one variable over
//! the forecast steps of a model run.

use crate::error::FluxError;
use crate::query::descriptor::{EdrEndpoint, QueryDescriptor, QueryTime};
use crate::query::error::QueryError;
use crate::types::dataset::Dataset;
use crate::types::geo::LngLat;
use crate::types::timeseries::{ChartPoint, Timeseries};
use crate::types::variable::Variable;
use crate::views::context::ViewContext;
use crate::views::events::{EventKind, MapEvent, Subscription};
use crate::views::surface::SharedSurface;
use crate::views::token::{FetchTicket, SelectionToken, TokenCounter};
use crate::views::with_view;
use chrono::NaiveDate;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;

pub const MARKER_ID: &str = "selection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    Idle,
    AwaitingSelection,
    Fetching,
    Displaying,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointViewConfig {
    pub dataset: Dataset,
    /// Options offered by the variable selector.
    pub variables: Vec<Variable>,
    pub initial_variable: Variable,
    pub time: QueryTime,
}

impl Default for PointViewConfig {
    fn default() -> Self {
        Self {
            dataset: Dataset::Gfs,
            variables: vec![
                Variable::Temperature2m,
                Variable::PrecipitationRate,
                Variable::WindGust,
            ],
            initial_variable: Variable::Temperature2m,
            time: NaiveDate::from_ymd_opt(2024, 11, 4)
                .map(QueryTime::Date)
                .unwrap_or(QueryTime::Date(NaiveDate::MIN)),
        }
    }
}

pub struct PointView {
    config: PointViewConfig,
    endpoint: EdrEndpoint,
    surface: SharedSurface,
    state: PointState,
    variable: Variable,
    selected: Option<LngLat>,
    tokens: TokenCounter,
    current: Option<SelectionToken>,
    pending: Option<FetchTicket>,
    series: Option<Timeseries>,
    last_error: Option<String>,
    subscriptions: Vec<Subscription>,
}

impl PointView {
    /// Creates the view and subscribes it to the map's load and click events.
    /// The subscriptions end when the returned view is dropped.
    pub fn mount(
        context: &ViewContext,
        config: PointViewConfig,
    ) -> Result<Rc<RefCell<Self>>, FluxError> {
        let endpoint = context.config.edr(config.dataset)?.clone();
        let view = Rc::new(RefCell::new(Self {
            variable: config.initial_variable.clone(),
            config,
            endpoint,
            surface: Rc::clone(&context.surface),
            state: PointState::Idle,
            selected: None,
            tokens: TokenCounter::default(),
            current: None,
            pending: None,
            series: None,
            last_error: None,
            subscriptions: Vec::new(),
        }));

        let on_load = Rc::downgrade(&view);
        let on_click = Rc::downgrade(&view);
        let subscriptions = vec![
            context.events.subscribe(EventKind::Load, move |_| {
                with_view(&on_load, |view| view.on_load());
            }),
            context.events.subscribe(EventKind::Click, move |event| {
                if let MapEvent::Click(position) = event {
                    with_view(&on_click, |view| {
                        if let Err(e) = view.select_point(*position) {
                            warn!("Ignoring click at {}: {}", position, e);
                        }
                    });
                }
            }),
        ];
        view.borrow_mut().subscriptions = subscriptions;
        Ok(view)
    }

    pub fn on_load(&mut self) {
        if self.state == PointState::Idle {
            self.transition(PointState::AwaitingSelection);
        }
    }

    /// Selects a location and issues a ticket for its timeseries. Any ticket
    /// issued before is superseded.
    pub fn select_point(&mut self, position: LngLat) -> Result<FetchTicket, QueryError> {
        let position = LngLat::new(position.lng, position.lat)?;
        let query = QueryDescriptor::builder()
            .geometry(position)
            .variables(vec![self.variable.clone()])
            .time(self.config.time)
            .build()?;

        {
            let mut surface = self.surface.borrow_mut();
            if self.selected.is_some() {
                surface.remove_marker(MARKER_ID);
            }
            surface.add_marker(MARKER_ID, position);
        }
        self.selected = Some(position);
        Ok(self.issue(query))
    }

    /// Switches variable. Refetches for the selected point, if there is one.
    pub fn set_variable(&mut self, variable: Variable) -> Result<Option<FetchTicket>, QueryError> {
        if variable == self.variable {
            return Ok(None);
        }
        self.variable = variable;
        match self.selected {
            Some(position) => self.select_point(position).map(Some),
            None => Ok(None),
        }
    }

    /// The ticket waiting to be fetched, if any. Each ticket is handed out once.
    pub fn take_pending(&mut self) -> Option<FetchTicket> {
        self.pending.take()
    }

    /// Hands a fetch outcome back to the view. Returns false, changing
    /// nothing, when `token` is not the current selection's.
    pub fn apply(&mut self, token: SelectionToken, result: Result<Timeseries, FluxError>) -> bool {
        if self.current != Some(token) {
            warn!(
                "Dropping stale timeseries response for selection {}",
                token.value()
            );
            return false;
        }
        match result {
            Ok(series) => {
                self.series = Some(series);
                self.last_error = None;
                self.transition(PointState::Displaying);
            }
            Err(e) => {
                warn!("Timeseries request failed: {}", e);
                self.series = None;
                self.last_error = Some(e.to_string());
                self.transition(PointState::AwaitingSelection);
            }
        }
        true
    }

    pub fn state(&self) -> PointState {
        self.state
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn variable_options(&self) -> &[Variable] {
        &self.config.variables
    }

    pub fn selected(&self) -> Option<LngLat> {
        self.selected
    }

    pub fn timeseries(&self) -> Option<&Timeseries> {
        self.series.as_ref()
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.series
            .as_ref()
            .map(Timeseries::chart_points)
            .unwrap_or_default()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn issue(&mut self, query: QueryDescriptor) -> FetchTicket {
        let token = self.tokens.next();
        let ticket = FetchTicket {
            token,
            url: self.endpoint.url(&query),
            query,
        };
        self.current = Some(token);
        self.pending = Some(ticket.clone());
        self.series = None;
        self.last_error = None;
        self.transition(PointState::Fetching);
        ticket
    }

    fn transition(&mut self, next: PointState) {
        debug!("Point view {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Drop for PointView {
    fn drop(&mut self) {
        if self.selected.is_some() {
            if let Ok(mut surface) = self.surface.try_borrow_mut() {
                surface.remove_marker(MARKER_ID);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FluxConfig;
    use crate::edr::error::ResponseError;
    use crate::types::timeseries::TimeseriesSample;
    use crate::units::DisplayValue;
    use crate::views::events::EventBus;
    use crate::views::surface::recording::{RecordingSurface, SurfaceCall};
    use chrono::{TimeZone, Utc};

    fn setup() -> (EventBus, Rc<RefCell<RecordingSurface>>, Rc<RefCell<PointView>>) {
        let events = EventBus::new();
        let surface = RecordingSurface::shared();
        let context = ViewContext::new(FluxConfig::default(), events.clone(), surface.clone());
        let view = PointView::mount(&context, PointViewConfig::default()).unwrap();
        (events, surface, view)
    }

    fn series(position: LngLat) -> Timeseries {
        let reference = Utc.with_ymd_and_hms(2024, 11, 4, 0, 0, 0).unwrap();
        Timeseries::new(
            Variable::Temperature2m,
            position,
            reference,
            vec![TimeseriesSample {
                time: reference,
                value: DisplayValue::Value(26.85),
            }],
        )
    }

    #[test]
    fn load_then_click_issues_position_ticket() {
        let (events, surface, view) = setup();
        assert_eq!(view.borrow().state(), PointState::Idle);

        events.emit(&MapEvent::Load);
        assert_eq!(view.borrow().state(), PointState::AwaitingSelection);

        events.emit(&MapEvent::Click(LngLat { lng: -74.5, lat: 40.0 }));
        let ticket = view.borrow_mut().take_pending().expect("click issues a ticket");
        assert!(ticket.url.contains("/position?coords=POINT(285.5%2040)&time=2024-11-04"));
        assert!(ticket.url.ends_with("&f=cf_covjson&parameter-name=t2m"));
        assert_eq!(view.borrow().state(), PointState::Fetching);
        assert_eq!(
            surface.borrow().calls,
            vec![SurfaceCall::AddMarker(
                MARKER_ID.to_string(),
                LngLat { lng: -74.5, lat: 40.0 }
            )]
        );
        assert!(view.borrow_mut().take_pending().is_none());
    }

    #[test]
    fn newer_selection_supersedes_older_response() {
        let (_events, _surface, view) = setup();
        let first = view
            .borrow_mut()
            .select_point(LngLat { lng: -74.5, lat: 40.0 })
            .unwrap();
        let second = view
            .borrow_mut()
            .select_point(LngLat { lng: 2.35, lat: 48.85 })
            .unwrap();

        let stale = series(LngLat { lng: -74.5, lat: 40.0 });
        assert!(!view.borrow_mut().apply(first.token, Ok(stale)));
        assert_eq!(view.borrow().state(), PointState::Fetching);
        assert!(view.borrow().timeseries().is_none());

        let fresh = series(LngLat { lng: 2.35, lat: 48.85 });
        assert!(view.borrow_mut().apply(second.token, Ok(fresh)));
        assert_eq!(view.borrow().state(), PointState::Displaying);
        assert_eq!(
            view.borrow().timeseries().map(Timeseries::location),
            Some(LngLat { lng: 2.35, lat: 48.85 })
        );
    }

    #[test]
    fn failure_returns_to_awaiting_selection() {
        let (_events, _surface, view) = setup();
        let ticket = view
            .borrow_mut()
            .select_point(LngLat { lng: -74.5, lat: 40.0 })
            .unwrap();
        let error = FluxError::Response(ResponseError::MissingField("domain.axes.t".into()));
        assert!(view.borrow_mut().apply(ticket.token, Err(error)));

        let view = view.borrow();
        assert_eq!(view.state(), PointState::AwaitingSelection);
        assert!(view.last_error().is_some());
        assert!(view.chart_points().is_empty());
    }

    #[test]
    fn changing_variable_refetches_selected_point() {
        let (_events, surface, view) = setup();
        assert!(view
            .borrow_mut()
            .set_variable(Variable::WindGust)
            .unwrap()
            .is_none());

        view.borrow_mut()
            .select_point(LngLat { lng: -74.5, lat: 40.0 })
            .unwrap();
        let ticket = view
            .borrow_mut()
            .set_variable(Variable::PrecipitationRate)
            .unwrap()
            .expect("selected point is refetched");
        assert!(ticket.url.ends_with("parameter-name=prate"));
        assert_eq!(
            surface
                .borrow()
                .count(|c| matches!(c, SurfaceCall::AddMarker(..))),
            2
        );
    }

    #[test]
    fn unmount_removes_marker_and_handlers() {
        let (events, surface, view) = setup();
        view.borrow_mut()
            .select_point(LngLat { lng: -74.5, lat: 40.0 })
            .unwrap();
        assert_eq!(events.handler_count(), 2);

        drop(view);
        assert_eq!(events.handler_count(), 0);
        assert_eq!(
            surface.borrow().calls.last(),
            Some(&SurfaceCall::RemoveMarker(MARKER_ID.to_string()))
        );
        assert_eq!(events.emit(&MapEvent::Load), 0);
    }

    #[test]
    fn invalid_click_is_rejected() {
        let (_events, surface, view) = setup();
        let result = view.borrow_mut().select_point(LngLat { lng: 0.0, lat: 95.0 });
        assert!(matches!(result, Err(QueryError::InvalidCoordinate { .. })));
        assert!(surface.borrow().calls.is_empty());
        assert_eq!(view.borrow().state(), PointState::Idle);
    }
}
