//! Per-view orchestration for the demo maps.
//!
//! Each view is a small state machine owned by whoever mounted it. Views
//! never perform network requests themselves: they hand out a
//! [`token::FetchTicket`], the caller fetches it, and the outcome comes back
//! through the view's `apply`, which drops anything superseded in the meantime.

pub mod area;
pub mod context;
pub mod driver;
pub mod events;
pub mod point;
pub mod raster;
pub mod surface;
pub mod token;

use std::cell::RefCell;
use std::rc::Weak;

/// Runs `f` on the view if it is still alive and not already borrowed.
pub(crate) fn with_view<V>(view: &Weak<RefCell<V>>, f: impl FnOnce(&mut V)) {
    if let Some(view) = view.upgrade() {
        if let Ok(mut view) = view.try_borrow_mut() {
            f(&mut view);
        }
    }
}
