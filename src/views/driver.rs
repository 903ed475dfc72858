//! Runs a view's pending fetches against an [`EdrSource`].
//!
//! No view borrow is held across an await, so map events that arrive while a
//! request is in flight (a new click, a redraw) are handled right away. Their
//! tickets supersede the one being fetched and are picked up on the next
//! iteration.

use crate::flux::EdrSource;
use crate::views::area::AreaView;
use crate::views::point::PointView;
use std::cell::RefCell;

/// Fetches until the point view has nothing pending. Returns how many
/// responses the view accepted.
pub async fn drive_point(view: &RefCell<PointView>, source: &impl EdrSource) -> usize {
    let mut applied = 0;
    loop {
        let Some(ticket) = view.borrow_mut().take_pending() else {
            return applied;
        };
        let result = source.timeseries(&ticket).await;
        if view.borrow_mut().apply(ticket.token, result) {
            applied += 1;
        }
    }
}

/// Fetches until the area view has nothing pending. Returns how many
/// responses the view accepted.
pub async fn drive_area(view: &RefCell<AreaView>, source: &impl EdrSource) -> usize {
    let mut applied = 0;
    loop {
        let Some(ticket) = view.borrow_mut().take_pending() else {
            return applied;
        };
        let result = source.area(&ticket).await;
        if view.borrow_mut().apply(ticket.token, result) {
            applied += 1;
        }
    }
}
