//! The calls views make on the map they are drawn onto.

use crate::filtering::StepBand;
use crate::types::area::{AreaSample, Popup};
use crate::types::geo::LngLat;
use crate::types::variable::Variable;
use crate::wms::RasterOverlay;
use std::cell::RefCell;
use std::rc::Rc;

pub type Rgb = [u8; 3];

pub const PURPLE: Rgb = [128, 0, 128];
pub const BLUE: Rgb = [0, 0, 255];
pub const GREEN: Rgb = [0, 128, 0];
pub const YELLOW: Rgb = [255, 255, 0];
pub const RED: Rgb = [255, 0, 0];

/// Map operations a view needs. Implemented by whatever renders the map.
pub trait MapSurface {
    fn add_marker(&mut self, id: &str, position: LngLat);
    fn remove_marker(&mut self, id: &str);
    fn add_raster_overlay(&mut self, overlay: &RasterOverlay);
    /// Adds (or replaces) a circle layer of area samples.
    fn add_sample_layer(&mut self, layer: &SampleLayer);
    /// Restricts a sample layer to samples whose step falls in `band`.
    fn set_step_filter(&mut self, layer_id: &str, band: StepBand);
    /// Removes a layer and its source. Unknown ids are ignored.
    fn remove_layer(&mut self, id: &str);
    fn show_popup(&mut self, popup: &Popup);
    fn hide_popup(&mut self);
}

pub type SharedSurface = Rc<RefCell<dyn MapSurface>>;

/// Linear ramp between `(value, output)` stops, clamped at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp<T> {
    stops: Vec<(f64, T)>,
}

impl<T: Copy> Ramp<T> {
    /// Stops must be given in ascending order of value.
    pub fn new(stops: Vec<(f64, T)>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[(f64, T)] {
        &self.stops
    }

    fn segment(&self, value: f64) -> Option<(T, T, f64)> {
        let (first, last) = (self.stops.first()?, self.stops.last()?);
        if value <= first.0 {
            return Some((first.1, first.1, 0.0));
        }
        if value >= last.0 {
            return Some((last.1, last.1, 0.0));
        }
        self.stops.windows(2).find_map(|pair| {
            let ((lo, a), (hi, b)) = (pair[0], pair[1]);
            (value >= lo && value <= hi).then(|| (a, b, (value - lo) / (hi - lo)))
        })
    }
}

impl Ramp<f64> {
    pub fn at(&self, value: f64) -> f64 {
        self.segment(value)
            .map(|(a, b, t)| a + (b - a) * t)
            .unwrap_or(0.0)
    }
}

impl Ramp<Rgb> {
    pub fn at(&self, value: f64) -> Rgb {
        self.segment(value)
            .map(|(a, b, t)| {
                let mix = |i: usize| (f64::from(a[i]) + (f64::from(b[i]) - f64::from(a[i])) * t).round() as u8;
                [mix(0), mix(1), mix(2)]
            })
            .unwrap_or([0, 0, 0])
    }
}

/// Resolved paint for one circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePaint {
    pub color: Rgb,
    pub opacity: f64,
}

/// How area samples are coloured.
#[derive(Debug, Clone, PartialEq)]
pub enum CircleStyle {
    Solid(Rgb),
    /// Colour and opacity follow one variable's display value. Samples where
    /// it is not available are fully transparent.
    Graduated {
        variable: Variable,
        color: Ramp<Rgb>,
        opacity: Ramp<f64>,
    },
}

impl CircleStyle {
    /// Precipitation rate palette, stops in mm/hr.
    pub fn precipitation() -> Self {
        CircleStyle::Graduated {
            variable: Variable::PrecipitationRate,
            color: Ramp::new(vec![
                (0.0, PURPLE),
                (0.36, BLUE),
                (1.8, GREEN),
                (3.6, YELLOW),
                (7.2, RED),
            ]),
            opacity: Ramp::new(vec![(0.0, 0.0), (0.36, 0.3), (3.6, 0.9)]),
        }
    }

    pub fn paint(&self, sample: &AreaSample) -> CirclePaint {
        match self {
            CircleStyle::Solid(color) => CirclePaint {
                color: *color,
                opacity: 1.0,
            },
            CircleStyle::Graduated {
                variable,
                color,
                opacity,
            } => match sample.value(variable).value() {
                Some(v) => CirclePaint {
                    color: color.at(v),
                    opacity: opacity.at(v),
                },
                None => CirclePaint {
                    color: color.stops().first().map_or([0, 0, 0], |s| s.1),
                    opacity: 0.0,
                },
            },
        }
    }
}

/// A circle layer of area samples, ready to hand to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLayer {
    pub id: String,
    pub radius: f64,
    pub style: CircleStyle,
    pub samples: Vec<AreaSample>,
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// One call made on a [`RecordingSurface`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        AddMarker(String, LngLat),
        RemoveMarker(String),
        AddRaster(String),
        AddSampleLayer(String, usize),
        SetStepFilter(String, StepBand),
        RemoveLayer(String),
        ShowPopup(String),
        HidePopup,
    }

    /// Records every call so view tests can assert on them.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<SurfaceCall>,
    }

    impl RecordingSurface {
        pub fn shared() -> Rc<RefCell<RecordingSurface>> {
            Rc::new(RefCell::new(RecordingSurface::default()))
        }

        pub fn count(&self, predicate: impl Fn(&SurfaceCall) -> bool) -> usize {
            self.calls.iter().filter(|c| predicate(c)).count()
        }
    }

    impl MapSurface for RecordingSurface {
        fn add_marker(&mut self, id: &str, position: LngLat) {
            self.calls.push(SurfaceCall::AddMarker(id.to_string(), position));
        }

        fn remove_marker(&mut self, id: &str) {
            self.calls.push(SurfaceCall::RemoveMarker(id.to_string()));
        }

        fn add_raster_overlay(&mut self, overlay: &RasterOverlay) {
            self.calls.push(SurfaceCall::AddRaster(overlay.source_id.clone()));
        }

        fn add_sample_layer(&mut self, layer: &SampleLayer) {
            self.calls
                .push(SurfaceCall::AddSampleLayer(layer.id.clone(), layer.samples.len()));
        }

        fn set_step_filter(&mut self, layer_id: &str, band: StepBand) {
            self.calls
                .push(SurfaceCall::SetStepFilter(layer_id.to_string(), band));
        }

        fn remove_layer(&mut self, id: &str) {
            self.calls.push(SurfaceCall::RemoveLayer(id.to_string()));
        }

        fn show_popup(&mut self, popup: &Popup) {
            self.calls.push(SurfaceCall::ShowPopup(popup.title.clone()));
        }

        fn hide_popup(&mut self) {
            self.calls.push(SurfaceCall::HidePopup);
        }
    }
}
