//! Two-way bridge between externally owned component properties and internal
//! reactive state.
//!
//! Outward: internal cells emit `update:*` events when they change.
//! Inward: changes to the external properties are adopted by the internal
//! cells. Geometry adoption is silent so a parent feeding positions back in
//! never sees its own value echoed.

use crate::dataflow::{Reactive, StateSetter, SubscriptionSet, use_state};
use draggable_shared::LayoutSection;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Properties owned by the parent component.
#[derive(Clone, Debug)]
pub struct ExternalProps {
    pub init_w: f64,
    pub init_h: f64,
    pub w: Reactive<f64>,
    pub h: Reactive<f64>,
    pub x: Reactive<f64>,
    pub y: Reactive<f64>,
    pub active: Reactive<bool>,
}

impl ExternalProps {
    pub fn new(init_w: f64, init_h: f64, x: f64, y: f64, active: bool) -> Self {
        Self {
            init_w,
            init_h,
            w: Reactive::new(init_w),
            h: Reactive::new(init_h),
            x: Reactive::new(x),
            y: Reactive::new(y),
            active: Reactive::new(active),
        }
    }

    pub fn from_layout(layout: &LayoutSection) -> Self {
        Self::new(layout.width, layout.height, layout.x, layout.y, layout.active)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncEvent {
    UpdateW(f64),
    UpdateH(f64),
    UpdateX(f64),
    UpdateY(f64),
    UpdateActive(bool),
    Activated,
    Deactivated,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventPayload {
    Number(f64),
    Flag(bool),
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::UpdateW(_) => "update:w",
            SyncEvent::UpdateH(_) => "update:h",
            SyncEvent::UpdateX(_) => "update:x",
            SyncEvent::UpdateY(_) => "update:y",
            SyncEvent::UpdateActive(_) => "update:active",
            SyncEvent::Activated => "activated",
            SyncEvent::Deactivated => "deactivated",
        }
    }

    pub fn payload(&self) -> Option<EventPayload> {
        match *self {
            SyncEvent::UpdateW(value)
            | SyncEvent::UpdateH(value)
            | SyncEvent::UpdateX(value)
            | SyncEvent::UpdateY(value) => Some(EventPayload::Number(value)),
            SyncEvent::UpdateActive(active) => Some(EventPayload::Flag(active)),
            SyncEvent::Activated | SyncEvent::Deactivated => None,
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(EventPayload::Number(value)) => write!(f, "{}({value})", self.name()),
            Some(EventPayload::Flag(flag)) => write!(f, "{}({flag})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Internal state produced by [`watch_properties`].
///
/// `dragging` and `resizing` have no external counterpart and never emit.
pub struct SyncedProperties {
    pub width: Reactive<f64>,
    pub set_width: StateSetter<f64>,
    pub height: Reactive<f64>,
    pub set_height: StateSetter<f64>,
    pub left: Reactive<f64>,
    pub set_left: StateSetter<f64>,
    pub top: Reactive<f64>,
    pub set_top: StateSetter<f64>,
    pub enable: Reactive<bool>,
    pub set_enable: StateSetter<bool>,
    pub dragging: Reactive<bool>,
    pub set_dragging: StateSetter<bool>,
    pub resizing: Reactive<bool>,
    pub set_resizing: StateSetter<bool>,
    watches: SubscriptionSet,
}

impl fmt::Debug for SyncedProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedProperties")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("enable", &self.enable)
            .field("dragging", &self.dragging)
            .field("resizing", &self.resizing)
            .field("watches", &self.watches.len())
            .finish()
    }
}

/// Restores the adoption flag when dropped, including during unwinding.
struct AdoptGuard<'a> {
    adopting: &'a Cell<bool>,
    previous: bool,
}

impl Drop for AdoptGuard<'_> {
    fn drop(&mut self) {
        self.adopting.set(self.previous);
    }
}

/// Run `f` with outward geometry emission muted.
fn adopt(adopting: &Cell<bool>, f: impl FnOnce()) {
    let _guard = AdoptGuard {
        previous: adopting.replace(true),
        adopting,
    };
    f();
}

/// Build internal state from `props` and keep both sides converged.
///
/// `width` announces its initial value right away; every other cell emits only
/// on later changes.
pub fn watch_properties(props: &ExternalProps, emit: impl Fn(SyncEvent) + 'static) -> SyncedProperties {
    let emit: Rc<dyn Fn(SyncEvent)> = Rc::new(emit);
    let adopting = Rc::new(Cell::new(false));

    let (width, set_width) = use_state(props.init_w);
    let (height, set_height) = use_state(props.init_h);
    let (left, set_left) = use_state(props.x.get());
    let (top, set_top) = use_state(props.y.get());
    let (enable, set_enable) = use_state(props.active.get());
    let (dragging, set_dragging) = use_state(false);
    let (resizing, set_resizing) = use_state(false);

    let mut watches = SubscriptionSet::new();

    let outward = |event: fn(f64) -> SyncEvent| {
        let emit = emit.clone();
        let adopting = adopting.clone();
        move |value: &f64, _: Option<&f64>| {
            if !adopting.get() {
                emit(event(*value));
            }
        }
    };
    watches.push(width.watch_immediate(outward(SyncEvent::UpdateW)));
    watches.push(height.watch(outward(SyncEvent::UpdateH)));
    watches.push(top.watch(outward(SyncEvent::UpdateY)));
    watches.push(left.watch(outward(SyncEvent::UpdateX)));

    watches.push(enable.watch({
        let emit = emit.clone();
        move |active, was_active| {
            emit(SyncEvent::UpdateActive(*active));
            match (was_active.copied(), *active) {
                (Some(false), true) => emit(SyncEvent::Activated),
                (Some(true), false) => emit(SyncEvent::Deactivated),
                _ => {}
            }
        }
    }));

    let inward = |setter: &StateSetter<f64>| {
        let setter = setter.clone();
        let adopting = adopting.clone();
        move |value: &f64, _: Option<&f64>| {
            tracing::trace!(value, "adopting external property");
            adopt(&adopting, || setter.set(*value));
        }
    };
    watches.push(props.w.watch(inward(&set_width)));
    watches.push(props.h.watch(inward(&set_height)));
    watches.push(props.x.watch(inward(&set_left)));
    watches.push(props.y.watch(inward(&set_top)));

    // Activation changes are announced even when they come from outside.
    watches.push(props.active.watch({
        let set_enable = set_enable.clone();
        move |active, _| set_enable.set(*active)
    }));

    SyncedProperties {
        width,
        set_width,
        height,
        set_height,
        left,
        set_left,
        top,
        set_top,
        enable,
        set_enable,
        dragging,
        set_dragging,
        resizing,
        set_resizing,
        watches,
    }
}
