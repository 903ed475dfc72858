use crate::views::context::ViewContext;
use crate::views::events::{EventKind, Subscription};
use crate::views::surface::SharedSurface;
use crate::views::with_view;
use crate::wms::RasterOverlay;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Shows a WMS raster overlay once the map has loaded and removes it when the
/// view goes away.
pub struct RasterView {
    overlay: RasterOverlay,
    surface: SharedSurface,
    shown: bool,
    _subscription: Option<Subscription>,
}

impl RasterView {
    pub fn mount(context: &ViewContext, overlay: RasterOverlay) -> Rc<RefCell<Self>> {
        let view = Rc::new(RefCell::new(Self {
            overlay,
            surface: Rc::clone(&context.surface),
            shown: false,
            _subscription: None,
        }));
        let weak = Rc::downgrade(&view);
        let subscription = context.events.subscribe(EventKind::Load, move |_| {
            with_view(&weak, RasterView::on_load);
        });
        view.borrow_mut()._subscription = Some(subscription);
        view
    }

    pub fn on_load(&mut self) {
        if self.shown {
            return;
        }
        debug!("Adding raster overlay {}", self.overlay.source_id);
        self.surface.borrow_mut().add_raster_overlay(&self.overlay);
        self.shown = true;
    }

    pub fn overlay(&self) -> &RasterOverlay {
        &self.overlay
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

impl Drop for RasterView {
    fn drop(&mut self) {
        if self.shown {
            if let Ok(mut surface) = self.surface.try_borrow_mut() {
                surface.remove_layer(&self.overlay.source_id);
            }
        }
    }
}
