//! The main entry point: a client that turns selections into EDR queries,
//! fetches them and decodes the responses into display-ready results.

use crate::clients::area_client::AreaClient;
use crate::clients::position_client::PositionClient;
use crate::config::FluxConfig;
use crate::edr::coverage::{decode_timeseries, CoverageDocument};
use crate::edr::features::{decode_area, FeatureCollection};
use crate::edr::loader::EdrLoader;
use crate::error::FluxError;
use crate::query::descriptor::{QueryDescriptor, StepSpec};
use crate::query::error::QueryError;
use crate::types::area::AreaResult;
use crate::types::dataset::Dataset;
use crate::types::geo::Geometry;
use crate::types::timeseries::Timeseries;
use crate::views::token::FetchTicket;
use crate::wms::WmsTileTemplate;
use bon::bon;
use chrono::{DateTime, Utc};
use log::info;
use std::future::Future;

/// Performs the fetch behind a view's [`FetchTicket`].
///
/// [`FluxClient`] is the real implementation; view tests substitute their own.
pub trait EdrSource {
    fn timeseries(
        &self,
        ticket: &FetchTicket,
    ) -> impl Future<Output = Result<Timeseries, FluxError>>;

    fn area(&self, ticket: &FetchTicket) -> impl Future<Output = Result<AreaResult, FluxError>>;
}

/// Client for the demo WMS and EDR services.
///
/// Create one with [`FluxClient::new()`] for the public demo endpoints or
/// [`FluxClient::with_config()`] to point elsewhere.
///
/// ```no_run
/// # use flux_demos::{FluxClient, FluxError, LngLat, Variable};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), FluxError> {
/// let client = FluxClient::new()?;
/// let series = client
///     .position()
///     .at(LngLat::new(-74.5, 40.0)?)
///     .variable(Variable::Temperature2m)
///     .time(NaiveDate::from_ymd_opt(2024, 11, 4).unwrap())
///     .call()
///     .await?;
/// println!("{} samples", series.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FluxClient {
    loader: EdrLoader,
    config: FluxConfig,
}

#[bon]
impl FluxClient {
    /// A client for the public demo deployment.
    pub fn new() -> Result<Self, FluxError> {
        Self::with_config(FluxConfig::default())
    }

    pub fn with_config(config: FluxConfig) -> Result<Self, FluxError> {
        Ok(Self {
            loader: EdrLoader::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &FluxConfig {
        &self.config
    }

    /// Timeseries at a single location. Finish with `.at(point)...call().await`.
    pub fn position(&self) -> PositionClient<'_> {
        PositionClient::new(self)
    }

    /// Every sample inside a polygon. Finish with `.within(polygon)...call().await`.
    pub fn area(&self) -> AreaClient<'_> {
        AreaClient::new(self)
    }

    /// Tile template for a WMS raster overlay.
    ///
    /// * `.layer(...)`: **Required.** Variable code to render.
    /// * `.time(DateTime<Utc>)`: **Required.**
    /// * `.color_scale((min, max))`: **Required.**
    /// * `.dataset(Dataset)`: Optional, defaults to GFS.
    /// * `.step(StepSpec)`: Optional.
    ///
    /// # Errors
    ///
    /// [`FluxError::DatasetNotConfigured`] when the dataset has no WMS endpoint.
    #[builder]
    pub fn wms_tiles(
        &self,
        #[builder(into)] layer: String,
        time: DateTime<Utc>,
        color_scale: (f64, f64),
        #[builder(default = Dataset::Gfs)] dataset: Dataset,
        step: Option<StepSpec>,
    ) -> Result<WmsTileTemplate, FluxError> {
        let base = self.config.wms(dataset)?;
        Ok(WmsTileTemplate::builder()
            .base(base)
            .layer(layer)
            .time(time)
            .color_scale(color_scale)
            .maybe_step(step)
            .build())
    }

    pub(crate) fn url_for(
        &self,
        dataset: Dataset,
        query: &QueryDescriptor,
    ) -> Result<String, FluxError> {
        Ok(self.config.edr(dataset)?.url(query))
    }

    pub(crate) async fn fetch_timeseries(
        &self,
        url: &str,
        query: &QueryDescriptor,
    ) -> Result<Timeseries, FluxError> {
        let variable = query.variables().first().ok_or(QueryError::NoVariables)?;
        let location = match query.geometry() {
            Geometry::Point(point) => *point,
            Geometry::Polygon(_) => {
                return Err(QueryError::MalformedGeometry(
                    "a timeseries needs a point".to_string(),
                )
                .into())
            }
        };
        let document: CoverageDocument = self.loader.get_json(url).await?;
        let series = decode_timeseries(&document, variable, location)?;
        info!("Decoded {} {} samples", series.len(), variable);
        Ok(series)
    }

    pub(crate) async fn fetch_area(
        &self,
        url: &str,
        query: &QueryDescriptor,
    ) -> Result<AreaResult, FluxError> {
        let collection: FeatureCollection = self.loader.get_json(url).await?;
        Ok(decode_area(&collection, query.variables()))
    }
}

impl EdrSource for FluxClient {
    async fn timeseries(&self, ticket: &FetchTicket) -> Result<Timeseries, FluxError> {
        self.fetch_timeseries(&ticket.url, &ticket.query).await
    }

    async fn area(&self, ticket: &FetchTicket) -> Result<AreaResult, FluxError> {
        self.fetch_area(&ticket.url, &ticket.query).await
    }
}
