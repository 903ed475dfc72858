use crate::config::FluxConfig;
use crate::views::events::EventBus;
use crate::views::surface::SharedSurface;

/// What a view receives when it is mounted: where to send queries, where map
/// events come from and what to draw on.
#[derive(Clone)]
pub struct ViewContext {
    pub config: FluxConfig,
    pub events: EventBus,
    pub surface: SharedSurface,
}

impl ViewContext {
    pub fn new(config: FluxConfig, events: EventBus, surface: SharedSurface) -> Self {
        Self {
            config,
            events,
            surface,
        }
    }
}
