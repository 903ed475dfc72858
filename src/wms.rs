//! WMS GetMap tile templates for the raster overlay views.
//!
//! The map library fetches tiles itself; this module only produces the
//! templated URL (with `{x},{y},{z}` placeholders) and the overlay settings.

use crate::query::descriptor::StepSpec;
use crate::query::error::QueryError;
use bon::bon;
use chrono::{DateTime, SecondsFormat, Utc};

pub const DEFAULT_TILE_SIZE: u32 = 512;
pub const DEFAULT_OPACITY: f64 = 0.5;

/// A GetMap request template for one layer, rendered per tile by the map.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsTileTemplate {
    base: String,
    layer: String,
    style: String,
    tile_size: u32,
    crs: String,
    time: DateTime<Utc>,
    color_scale: (f64, f64),
    step: Option<StepSpec>,
}

#[bon]
impl WmsTileTemplate {
    /// * `.base(...)`: **Required.** WMS endpoint, e.g. `https://host/wms/earthmover-demos/gfs/solar/wms`.
    /// * `.layer(...)`: **Required.** Variable code to render, e.g. `gust`.
    /// * `.time(...)`: **Required.** Valid time.
    /// * `.color_scale((min, max))`: **Required.** Value range mapped onto the palette.
    /// * `.style(...)`: Optional, defaults to `raster/default`.
    /// * `.tile_size(u32)`: Optional, defaults to 512.
    /// * `.crs(...)`: Optional, defaults to `EPSG:3857`.
    /// * `.step(StepSpec)`: Optional.
    #[builder]
    pub fn new(
        #[builder(into)] base: String,
        #[builder(into)] layer: String,
        time: DateTime<Utc>,
        color_scale: (f64, f64),
        #[builder(into)] style: Option<String>,
        tile_size: Option<u32>,
        #[builder(into)] crs: Option<String>,
        step: Option<StepSpec>,
    ) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            layer,
            style: style.unwrap_or_else(|| "raster/default".to_string()),
            tile_size: tile_size.unwrap_or(DEFAULT_TILE_SIZE),
            crs: crs.unwrap_or_else(|| "EPSG:3857".to_string()),
            time,
            color_scale,
            step,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// The URL with literal `{x},{y},{z}` placeholders, as given to a raster source.
    pub fn template(&self) -> String {
        let mut url = format!(
            "{}?version=1.3.0&service=WMS&request=GetMap&layers={}&styles={}&width={}&height={}&tile={{x}},{{y}},{{z}}&crs={}&time={}&colorscalerange={},{}",
            self.base,
            self.layer,
            self.style,
            self.tile_size,
            self.tile_size,
            self.crs,
            self.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.color_scale.0,
            self.color_scale.1,
        );
        if let Some(step) = &self.step {
            url.push_str(&format!("&step={}", step));
        }
        url
    }

    /// The URL for one tile. `x` and `y` must exist at zoom `z`.
    pub fn tile_url(&self, x: u32, y: u32, z: u8) -> Result<String, QueryError> {
        let tiles_per_side = 1u64 << u32::from(z.min(31));
        if z > 30 || u64::from(x) >= tiles_per_side || u64::from(y) >= tiles_per_side {
            return Err(QueryError::InvalidTile { x, y, z });
        }
        Ok(self
            .template()
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{z}", &z.to_string()))
    }
}

/// How a raster overlay is added to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOverlay {
    pub source_id: String,
    pub tiles: Vec<String>,
    pub tile_size: u32,
    pub opacity: f64,
    /// `[west, south, east, north]`; tiles outside are never requested.
    pub bounds: Option<[f64; 4]>,
}

impl RasterOverlay {
    pub fn new(source_id: impl Into<String>, template: &WmsTileTemplate) -> Self {
        Self {
            source_id: source_id.into(),
            tiles: vec![template.template()],
            tile_size: template.tile_size(),
            opacity: DEFAULT_OPACITY,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: [f64; 4]) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}
