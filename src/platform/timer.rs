//! Cancellable `requestAnimationFrame` loop and `setInterval` timer
//!
//! Both handles unregister from the browser when cancelled or dropped.
//! Neither may be dropped from inside its own callback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Repaint loop. Runs until the frame callback returns false or the handle
/// is cancelled.
pub struct FrameLoop {
    inner: Rc<FrameLoopInner>,
}

struct FrameLoopInner {
    request_id: Cell<Option<i32>>,
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoopInner {
    fn request(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = self.closure.borrow();
        let Some(closure) = closure.as_ref() else {
            return;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => self.request_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

impl FrameLoop {
    pub fn start<F>(mut on_frame: F) -> Self
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let inner = Rc::new(FrameLoopInner {
            request_id: Cell::new(None),
            closure: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.request_id.set(None);
            if on_frame(time) {
                inner.request();
            }
        });

        *inner.closure.borrow_mut() = Some(closure);
        inner.request();
        Self { inner }
    }

    /// A repaint is scheduled
    pub fn is_active(&self) -> bool {
        self.inner.request_id.get().is_some()
    }

    pub fn cancel(&self) {
        if let Some(id) = self.inner.request_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
        self.inner.closure.borrow_mut().take();
    }
}

/// Fixed-period timer
pub struct Interval {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn start<F>(period_ms: f64, callback: F) -> Option<Self>
    where
        F: FnMut() + 'static,
    {
        let window = web_sys::window()?;
        let closure = Closure::<dyn FnMut()>::new(callback);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            )
            .map_err(|e| log::error!("setInterval failed: {:?}", e))
            .ok()?;
        Some(Self {
            id,
            _closure: closure,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
    }
}
