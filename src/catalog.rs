//! The demo views offered in the sidebar and the routes they live at.

use crate::config::FluxConfig;
use crate::error::FluxError;
use crate::query::descriptor::StepSpec;
use crate::types::dataset::Dataset;
use crate::types::geo::LngLat;
use crate::wms::{RasterOverlay, WmsTileTemplate};
use chrono::NaiveDate;

pub const LIGHT_STYLE: &str = "mapbox://styles/mapbox/light-v11";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoView {
    GfsGlobeWms,
    GfsPointTimeseries,
    GfsAreaScatter,
    HrrrAreaScatter,
}

/// Where the map starts when a view opens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    pub center: LngLat,
    pub zoom: f64,
    /// Basemap style, when the view overrides the default.
    pub style: Option<&'static str>,
}

impl DemoView {
    pub const ALL: [DemoView; 4] = [
        DemoView::GfsGlobeWms,
        DemoView::GfsPointTimeseries,
        DemoView::GfsAreaScatter,
        DemoView::HrrrAreaScatter,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DemoView::GfsGlobeWms => "Global GFS Wind Gust",
            DemoView::GfsPointTimeseries => "GFS Point Timeseries",
            DemoView::GfsAreaScatter => "GFS Area Selector",
            DemoView::HrrrAreaScatter => "HRRR Area Precipitation Animation",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            DemoView::GfsGlobeWms => "/wms/gfs-globe",
            DemoView::GfsPointTimeseries => "/edr/gfs-point-timeseries",
            DemoView::GfsAreaScatter => "/edr/gfs-area-scatter",
            DemoView::HrrrAreaScatter => "/edr/hrrr-area-scatter",
        }
    }

    /// Sidebar group label.
    pub fn group(&self) -> &'static str {
        match self {
            DemoView::GfsGlobeWms => "WMS",
            _ => "EDR",
        }
    }

    pub fn dataset(&self) -> Dataset {
        match self {
            DemoView::HrrrAreaScatter => Dataset::Hrrr,
            _ => Dataset::Gfs,
        }
    }

    pub fn camera(&self) -> MapCamera {
        let east_coast = LngLat {
            lng: -74.5,
            lat: 40.0,
        };
        match self {
            DemoView::GfsGlobeWms => MapCamera {
                center: east_coast,
                zoom: 2.0,
                style: Some(LIGHT_STYLE),
            },
            DemoView::GfsPointTimeseries | DemoView::GfsAreaScatter => MapCamera {
                center: east_coast,
                zoom: 6.0,
                style: None,
            },
            DemoView::HrrrAreaScatter => MapCamera {
                center: LngLat {
                    lng: -122.335167,
                    lat: 47.608013,
                },
                zoom: 8.0,
                style: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogGroup {
    pub label: &'static str,
    pub views: Vec<DemoView>,
}

/// Sidebar contents, in display order.
pub fn groups() -> Vec<CatalogGroup> {
    let mut groups: Vec<CatalogGroup> = Vec::new();
    for view in DemoView::ALL {
        match groups.iter_mut().find(|g| g.label == view.group()) {
            Some(group) => group.views.push(view),
            None => groups.push(CatalogGroup {
                label: view.group(),
                views: vec![view],
            }),
        }
    }
    groups
}

/// The view served at `path`. A trailing slash is ignored.
pub fn resolve(path: &str) -> Option<DemoView> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    DemoView::ALL.into_iter().find(|view| view.path() == path)
}

/// The wind gust overlay drawn on the globe view.
pub fn gfs_globe_overlay(config: &FluxConfig) -> Result<RasterOverlay, FluxError> {
    let time = NaiveDate::from_ymd_opt(2024, 11, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default();
    let template = WmsTileTemplate::builder()
        .base(config.wms(Dataset::Gfs)?)
        .layer("gust")
        .time(time)
        .color_scale((0.0, 40.0))
        .step(StepSpec::Hours(1))
        .build();
    Ok(RasterOverlay::new("gfs", &template))
}
