mod catalog;
mod clients;
mod config;
mod edr;
mod error;
mod filtering;
mod flux;
mod query;
mod types;
mod units;
mod views;
mod wms;

pub use error::FluxError;
pub use flux::*;

pub use clients::area_client::*;
pub use clients::position_client::*;

pub use config::*;
pub use filtering::*;
pub use units::*;
pub use wms::*;

pub use query::descriptor::*;
pub use query::error::QueryError;

pub use types::area::*;
pub use types::dataset::Dataset;
pub use types::frames::*;
pub use types::geo::*;
pub use types::timeseries::*;
pub use types::variable::Variable;

pub use edr::coverage::{decode_timeseries, parse_reference_time, CoverageDocument};
pub use edr::error::ResponseError;
pub use edr::features::{decode_area, FeatureCollection};
pub use edr::locate::SampleLocator;

pub use catalog::{gfs_globe_overlay, groups, resolve, CatalogGroup, DemoView, MapCamera};

pub use views::area::*;
pub use views::context::ViewContext;
pub use views::driver::{drive_area, drive_point};
pub use views::events::{EventBus, EventKind, MapEvent, Subscription};
pub use views::point::*;
pub use views::raster::RasterView;
pub use views::surface::{
    CirclePaint, CircleStyle, MapSurface, Ramp, Rgb, SampleLayer, SharedSurface, BLUE, GREEN,
    PURPLE, RED, YELLOW,
};
pub use views::token::{FetchTicket, SelectionToken, TokenCounter};
