//! Endpoint and transport settings for [`crate::FluxClient`].

use crate::error::FluxError;
use crate::query::descriptor::EdrEndpoint;
use crate::types::dataset::Dataset;
use bon::bon;
use reqwest::Url;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_GFS_EDR: &str =
    "https://earthmover-demos.compute.earthmover.io/edr/earthmover-demos/gfs/timeseries/edr";
pub const DEFAULT_HRRR_EDR: &str =
    "https://demo.compute.earthmover.io/edr/earthmover-demos/hrrr/solar/edr";
pub const DEFAULT_GFS_WMS: &str =
    "https://earthmover-demos.compute.earthmover.io/wms/earthmover-demos/gfs/solar/wms";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = concat!("flux_demos/", env!("CARGO_PKG_VERSION"));

/// Where each dataset is served and how to reach it.
///
/// The defaults point at the public demo deployment. ERA5 has no default
/// endpoint; requests for it fail with [`FluxError::DatasetNotConfigured`]
/// until one is set.
#[derive(Debug, Clone)]
pub struct FluxConfig {
    edr: BTreeMap<Dataset, EdrEndpoint>,
    wms: BTreeMap<Dataset, String>,
    timeout: Duration,
    user_agent: String,
}

fn validate_base(base: &str) -> Result<String, FluxError> {
    let url = Url::parse(base).map_err(|_| FluxError::InvalidBaseUrl(base.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.query().is_some() {
        return Err(FluxError::InvalidBaseUrl(base.to_string()));
    }
    Ok(base.trim_end_matches('/').to_string())
}

#[bon]
impl FluxConfig {
    /// Builds a configuration; any endpoint left unset keeps its default.
    ///
    /// ```
    /// use flux_demos::{Dataset, FluxConfig};
    /// use std::time::Duration;
    ///
    /// let config = FluxConfig::builder()
    ///     .hrrr_edr("http://localhost:8080/edr/hrrr")
    ///     .timeout(Duration::from_secs(5))
    ///     .build()?;
    /// assert_eq!(config.edr(Dataset::Hrrr)?.base(), "http://localhost:8080/edr/hrrr");
    /// # Ok::<(), flux_demos::FluxError>(())
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] gfs_edr: Option<String>,
        #[builder(into)] hrrr_edr: Option<String>,
        #[builder(into)] era5_edr: Option<String>,
        #[builder(into)] gfs_wms: Option<String>,
        #[builder(into)] era5_wms: Option<String>,
        timeout: Option<Duration>,
        #[builder(into)] user_agent: Option<String>,
    ) -> Result<Self, FluxError> {
        let mut edr = BTreeMap::new();
        let edr_bases = [
            (Dataset::Gfs, gfs_edr.or_else(|| Some(DEFAULT_GFS_EDR.to_string()))),
            (Dataset::Hrrr, hrrr_edr.or_else(|| Some(DEFAULT_HRRR_EDR.to_string()))),
            (Dataset::Era5, era5_edr),
        ];
        for (dataset, base) in edr_bases {
            if let Some(base) = base {
                edr.insert(dataset, EdrEndpoint::new(validate_base(&base)?));
            }
        }

        let mut wms = BTreeMap::new();
        let wms_bases = [
            (Dataset::Gfs, gfs_wms.or_else(|| Some(DEFAULT_GFS_WMS.to_string()))),
            (Dataset::Era5, era5_wms),
        ];
        for (dataset, base) in wms_bases {
            if let Some(base) = base {
                wms.insert(dataset, validate_base(&base)?);
            }
        }

        Ok(Self {
            edr,
            wms,
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }

    pub fn edr(&self, dataset: Dataset) -> Result<&EdrEndpoint, FluxError> {
        self.edr.get(&dataset).ok_or(FluxError::DatasetNotConfigured {
            service: "EDR",
            dataset,
        })
    }

    pub fn wms(&self, dataset: Dataset) -> Result<&str, FluxError> {
        self.wms
            .get(&dataset)
            .map(String::as_str)
            .ok_or(FluxError::DatasetNotConfigured {
                service: "WMS",
                dataset,
            })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for FluxConfig {
    fn default() -> Self {
        let edr = BTreeMap::from([
            (Dataset::Gfs, EdrEndpoint::new(DEFAULT_GFS_EDR)),
            (Dataset::Hrrr, EdrEndpoint::new(DEFAULT_HRRR_EDR)),
        ]);
        let wms = BTreeMap::from([(Dataset::Gfs, DEFAULT_GFS_WMS.to_string())]);
        Self {
            edr,
            wms,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
