//! Provides the `PositionClient` for fetching a variable's timeseries at one location.
//!
//! Obtained via [`FluxClient::position()`].

use crate::{
    Dataset, FluxClient, FluxError, LngLat, QueryDescriptor, QueryTime, StepSpec, Timeseries,
    Variable,
};
use bon::bon;

/// A client builder for EDR position queries.
///
/// Calling `.at(point)...call().await` encodes the query, fetches the
/// CoverageJSON response and returns a [`Timeseries`] in display units.
pub struct PositionClient<'a> {
    client: &'a FluxClient,
}

#[bon]
impl<'a> PositionClient<'a> {
    pub(crate) fn new(client: &'a FluxClient) -> Self {
        Self { client }
    }

    /// Fetches the timeseries of one variable at `location`.
    ///
    /// # Required Builder Methods
    ///
    /// * `.variable(Variable)`
    /// * `.time(...)`: Model run, as a `NaiveDate` or `NaiveDateTime`.
    ///
    /// # Optional Builder Methods
    ///
    /// * `.dataset(Dataset)`: Defaults to GFS.
    /// * `.step(StepSpec)`: Restrict the forecast steps returned.
    ///
    /// # Errors
    ///
    /// * [`FluxError::Query`] for an invalid location.
    /// * [`FluxError::DatasetNotConfigured`] when the dataset has no EDR endpoint.
    /// * [`FluxError::NetworkRequest`], [`FluxError::HttpStatus`], [`FluxError::JsonParse`]
    ///   when the request fails.
    /// * [`FluxError::Response`] when the document lacks its step or time axis.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use flux_demos::{Dataset, FluxClient, FluxError, LngLat, Variable};
    /// use chrono::NaiveDate;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), FluxError> {
    /// let client = FluxClient::new()?;
    /// let gusts = client
    ///     .position()
    ///     .at(LngLat::new(4.9, 52.37)?)
    ///     .variable(Variable::WindGust)
    ///     .time(NaiveDate::from_ymd_opt(2024, 11, 4).unwrap())
    ///     .dataset(Dataset::Gfs)
    ///     .call()
    ///     .await?;
    ///
    /// for point in gusts.chart_points() {
    ///     println!("{} {:?}", point.tooltip_label, point.value);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = at)]
    #[doc(hidden)]
    pub async fn build_at(
        &self,
        #[builder(start_fn)] location: LngLat,
        variable: Variable,
        #[builder(into)] time: QueryTime,
        dataset: Option<Dataset>,
        step: Option<StepSpec>,
    ) -> Result<Timeseries, FluxError> {
        let location = LngLat::new(location.lng, location.lat)?;
        let query = QueryDescriptor::builder()
            .geometry(location)
            .variables(vec![variable])
            .time(time)
            .maybe_step(step)
            .build()?;
        let url = self
            .client
            .url_for(dataset.unwrap_or(Dataset::Gfs), &query)?;
        self.client.fetch_timeseries(&url, &query).await
    }
}
