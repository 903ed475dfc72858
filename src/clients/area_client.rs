//! Provides the `AreaClient` for fetching every grid sample inside a polygon.
//!
//! Obtained via [`FluxClient::area()`].

use crate::{
    AreaResult, Dataset, FluxClient, FluxError, Polygon, QueryDescriptor, QueryTime, StepSpec,
    Variable,
};
use bon::bon;

/// A client builder for EDR area queries.
///
/// Calling `.within(polygon)...call().await` returns an [`AreaResult`] holding
/// one sample per grid point and forecast step, in display units.
pub struct AreaClient<'a> {
    client: &'a FluxClient,
}

#[bon]
impl<'a> AreaClient<'a> {
    pub(crate) fn new(client: &'a FluxClient) -> Self {
        Self { client }
    }

    /// Fetches the requested variables for every sample inside `polygon`.
    ///
    /// # Required Builder Methods
    ///
    /// * `.variables(Vec<Variable>)`: At least one.
    /// * `.time(...)`: Model run, as a `NaiveDate` or `NaiveDateTime`.
    ///
    /// # Optional Builder Methods
    ///
    /// * `.dataset(Dataset)`: Defaults to GFS.
    /// * `.step(StepSpec)`: e.g. `StepSpec::range(1, 6)?` for the first six hours.
    ///
    /// Features the backend returns without a usable position or step are
    /// skipped; missing values come back as "not available".
    ///
    /// # Example
    ///
    /// ```no_run
    /// use flux_demos::{Dataset, FluxClient, FluxError, HourOffsetRange, LngLat, Polygon, StepSpec, Variable};
    /// use chrono::NaiveDate;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), FluxError> {
    /// let client = FluxClient::new()?;
    /// let seattle = Polygon::new(vec![
    ///     LngLat::new(-122.45, 47.55)?,
    ///     LngLat::new(-122.25, 47.55)?,
    ///     LngLat::new(-122.25, 47.70)?,
    ///     LngLat::new(-122.45, 47.70)?,
    /// ])?;
    /// let result = client
    ///     .area()
    ///     .within(seattle)
    ///     .variables(vec![Variable::PrecipitationRate])
    ///     .time(NaiveDate::from_ymd_opt(2024, 11, 18).unwrap().and_hms_opt(0, 0, 0).unwrap())
    ///     .dataset(Dataset::Hrrr)
    ///     .step(StepSpec::range(1, 6)?)
    ///     .call()
    ///     .await?;
    ///
    /// let third_hour = result.visible(HourOffsetRange::default().offset(3)?.band());
    /// println!("{} samples three hours in", third_hour.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = within)]
    #[doc(hidden)]
    pub async fn build_within(
        &self,
        #[builder(start_fn)] polygon: Polygon,
        variables: Vec<Variable>,
        #[builder(into)] time: QueryTime,
        dataset: Option<Dataset>,
        step: Option<StepSpec>,
    ) -> Result<AreaResult, FluxError> {
        let query = QueryDescriptor::builder()
            .geometry(polygon)
            .variables(variables)
            .time(time)
            .maybe_step(step)
            .build()?;
        let url = self
            .client
            .url_for(dataset.unwrap_or(Dataset::Gfs), &query)?;
        self.client.fetch_area(&url, &query).await
    }
}
