//! Frame Clock - deferred work queued for the next display refresh.
//!
//! Stands in for the host's animation-frame API. Work is queued with
//! [`request_frame`], cancelled with [`cancel_frame`], and run by the host
//! calling [`tick`] once per refresh.
//!
//! # Ordering
//!
//! A tick runs only the callbacks that were queued before it started, in
//! queue order. Anything queued while a tick is running (a `did_update` hook
//! queued by a re-render, say) waits for the next tick, so hooks always
//! observe the surface after the mutation that caused them.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::pipeline::settings;
use crate::surface::Surface;
use crate::types::FrameToken;

/// Work run on a frame boundary.
pub type FrameCallback = Box<dyn FnOnce(&mut dyn Surface) -> Result<()>>;

// =============================================================================
// Queue State
// =============================================================================

thread_local! {
    /// Pending callbacks. Tokens grow monotonically, so map order is queue order.
    static CALLBACKS: RefCell<BTreeMap<FrameToken, FrameCallback>> = RefCell::new(BTreeMap::new());

    /// Next token to hand out.
    static NEXT_TOKEN: Cell<u64> = const { Cell::new(1) };
}

// =============================================================================
// Public API
// =============================================================================

/// Queue `callback` for the next frame.
pub fn request_frame(
    callback: impl FnOnce(&mut dyn Surface) -> Result<()> + 'static,
) -> FrameToken {
    let token = NEXT_TOKEN.with(|next| {
        let value = next.get();
        next.set(value + 1);
        FrameToken(value)
    });
    CALLBACKS.with(|callbacks| {
        callbacks.borrow_mut().insert(token, Box::new(callback));
    });
    tracing::trace!(%token, "frame requested");
    token
}

/// Cancel a queued callback. Returns false if it already ran or was cancelled.
pub fn cancel_frame(token: FrameToken) -> bool {
    let removed = CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&token).is_some());
    if removed {
        tracing::trace!(%token, "frame cancelled");
    }
    removed
}

/// True if `token` is still waiting to run.
pub fn is_pending(token: FrameToken) -> bool {
    CALLBACKS.with(|callbacks| callbacks.borrow().contains_key(&token))
}

/// Number of callbacks waiting to run.
pub fn pending_frames() -> usize {
    CALLBACKS.with(|callbacks| callbacks.borrow().len())
}

/// Run one frame.
///
/// Runs the callbacks queued before this call, oldest first, up to
/// `max_callbacks_per_tick` if configured (the rest stay queued in order).
/// A callback cancelled by an earlier callback of the same tick does not run.
///
/// Every eligible callback runs even if one fails; the first error is
/// returned after the frame completes.
///
/// Returns the number of callbacks run.
pub fn tick(surface: &mut dyn Surface) -> Result<usize> {
    let cutoff = FrameToken(NEXT_TOKEN.with(|next| next.get()));
    let limit = settings().max_callbacks_per_tick.unwrap_or(usize::MAX);

    let mut ran = 0;
    let mut first_error = None;

    while ran < limit {
        // Take one at a time: a running callback may cancel later ones.
        let next = CALLBACKS.with(|callbacks| {
            let mut callbacks = callbacks.borrow_mut();
            let token = *callbacks.keys().next()?;
            if token >= cutoff {
                return None;
            }
            callbacks.remove(&token).map(|callback| (token, callback))
        });
        let Some((token, callback)) = next else { break };

        ran += 1;
        if let Err(error) = callback(surface) {
            tracing::error!(%token, %error, "frame callback failed");
            first_error.get_or_insert(error);
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(ran),
    }
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Drop all queued callbacks (for testing).
pub fn reset_scheduler() {
    CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcileError;
    use crate::pipeline::{reset_settings, set_settings, Settings};
    use crate::surface::MemorySurface;
    use crate::types::InstanceId;
    use std::rc::Rc;

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_runs_in_order() {
        reset_scheduler();
        let mut surface = MemorySurface::new();
        let seen = log();

        for name in ["a", "b", "c"] {
            let seen = seen.clone();
            request_frame(move |_| {
                seen.borrow_mut().push(name);
                Ok(())
            });
        }

        assert_eq!(pending_frames(), 3);
        assert_eq!(tick(&mut surface).unwrap(), 3);
        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
        assert_eq!(pending_frames(), 0);
    }

    #[test]
    fn test_cancel() {
        reset_scheduler();
        let mut surface = MemorySurface::new();
        let seen = log();

        let seen_clone = seen.clone();
        let token = request_frame(move |_| {
            seen_clone.borrow_mut().push("cancelled");
            Ok(())
        });

        assert!(is_pending(token));
        assert!(cancel_frame(token));
        assert!(!cancel_frame(token));
        assert_eq!(tick(&mut surface).unwrap(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_work_queued_during_tick_waits() {
        reset_scheduler();
        let mut surface = MemorySurface::new();
        let seen = log();

        let seen_outer = seen.clone();
        request_frame(move |_| {
            seen_outer.borrow_mut().push("first");
            let seen_inner = seen_outer.clone();
            request_frame(move |_| {
                seen_inner.borrow_mut().push("second");
                Ok(())
            });
            Ok(())
        });

        assert_eq!(tick(&mut surface).unwrap(), 1);
        assert_eq!(*seen.borrow(), vec!["first"]);
        assert_eq!(tick(&mut surface).unwrap(), 1);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_cancel_during_tick() {
        reset_scheduler();
        let mut surface = MemorySurface::new();
        let seen = log();

        let victim_slot: Rc<Cell<Option<FrameToken>>> = Rc::new(Cell::new(None));
        let victim_for_killer = victim_slot.clone();
        request_frame(move |_| {
            if let Some(token) = victim_for_killer.get() {
                cancel_frame(token);
            }
            Ok(())
        });
        let seen_clone = seen.clone();
        let victim = request_frame(move |_| {
            seen_clone.borrow_mut().push("victim");
            Ok(())
        });
        victim_slot.set(Some(victim));

        assert_eq!(tick(&mut surface).unwrap(), 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_errors_do_not_stop_frame() {
        reset_scheduler();
        let mut surface = MemorySurface::new();
        let seen = log();

        request_frame(|_| Err(ReconcileError::NotMounted(InstanceId(1))));
        let seen_clone = seen.clone();
        request_frame(move |_| {
            seen_clone.borrow_mut().push("after");
            Ok(())
        });

        assert_eq!(tick(&mut surface), Err(ReconcileError::NotMounted(InstanceId(1))));
        assert_eq!(*seen.borrow(), vec!["after"]);
    }

    #[test]
    fn test_callback_limit() {
        reset_scheduler();
        reset_settings();
        let mut surface = MemorySurface::new();

        for _ in 0..5 {
            request_frame(|_| Ok(()));
        }
        set_settings(Settings { max_callbacks_per_tick: Some(2), ..Settings::default() });

        assert_eq!(tick(&mut surface).unwrap(), 2);
        assert_eq!(pending_frames(), 3);
        reset_settings();
        assert_eq!(tick(&mut surface).unwrap(), 3);
    }
}
