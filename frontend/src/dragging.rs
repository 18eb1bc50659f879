//! Pointer-drag controller
//!
//! Data flows: pointer events → drag session → position cells → callbacks / style
//!
//! A pointer-down on the container opens a session, document-wide move events
//! shift the `x`/`y` cells by the pointer delta, and pointer-up closes it. All
//! listeners are held as subscriptions so mount/unmount and session start/end
//! release exactly what they attached.

use crate::dataflow::{Reactive, Subscription, SubscriptionSet};
use crate::dom::{Container, ContainerRef, EventSource, PointerEvent, PointerEventKind, PointerHandler};
use draggable_shared::{DragSection, Position};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub type DragCallback = Rc<dyn Fn(Position)>;
pub type PressCallback = Rc<dyn Fn()>;
pub type UnselectCallback = Rc<dyn Fn()>;

/// Optional configuration for [`DragController::new`].
#[derive(Clone)]
pub struct DragOptions {
    pub x: Option<Reactive<f64>>,
    pub y: Option<Reactive<f64>>,
    /// Drag sessions only start while this cell is `true`. `None` never gates.
    pub enable: Option<Reactive<bool>>,
    pub auto_update: bool,
    /// Runs on every press on the container, before the `enable` gate.
    pub on_press: Option<PressCallback>,
    pub on_drag_start: Option<DragCallback>,
    pub on_dragging: Option<DragCallback>,
    pub on_drag_end: Option<DragCallback>,
    pub on_unselect: Option<UnselectCallback>,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            enable: None,
            auto_update: true,
            on_press: None,
            on_drag_start: None,
            on_dragging: None,
            on_drag_end: None,
            on_unselect: None,
        }
    }
}

impl DragOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options derived from the `[drag]` config section. `active` gates the
    /// controller when the section asks for it.
    pub fn from_config(section: &DragSection, active: &Reactive<bool>) -> Self {
        let options = Self::new().auto_update(section.auto_update);
        if section.require_active {
            options.enable(active.clone())
        } else {
            options
        }
    }

    pub fn x(mut self, x: Reactive<f64>) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: Reactive<f64>) -> Self {
        self.y = Some(y);
        self
    }

    pub fn enable(mut self, enable: Reactive<bool>) -> Self {
        self.enable = Some(enable);
        self
    }

    pub fn auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    pub fn on_press(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_press = Some(Rc::new(callback));
        self
    }

    pub fn on_drag_start(mut self, callback: impl Fn(Position) + 'static) -> Self {
        self.on_drag_start = Some(Rc::new(callback));
        self
    }

    pub fn on_dragging(mut self, callback: impl Fn(Position) + 'static) -> Self {
        self.on_dragging = Some(Rc::new(callback));
        self
    }

    pub fn on_drag_end(mut self, callback: impl Fn(Position) + 'static) -> Self {
        self.on_drag_end = Some(Rc::new(callback));
        self
    }

    pub fn on_unselect(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_unselect = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for DragOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragOptions")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("enable", &self.enable)
            .field("auto_update", &self.auto_update)
            .field("on_press", &self.on_press.is_some())
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_dragging", &self.on_dragging.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .field("on_unselect", &self.on_unselect.is_some())
            .finish()
    }
}

/// Ephemeral state between pointer-down and pointer-up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging { last_x: f64, last_y: f64 },
}

impl DragSession {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragSession::Dragging { .. })
    }
}

struct ControllerInner<D, C> {
    self_ref: Weak<ControllerInner<D, C>>,
    document: D,
    container_ref: ContainerRef<C>,
    x: Reactive<f64>,
    y: Reactive<f64>,
    enable: Option<Reactive<bool>>,
    auto_update: bool,
    on_press: Option<PressCallback>,
    on_dragging: Option<DragCallback>,
    on_unselect: Option<UnselectCallback>,
    is_dragging: Reactive<bool>,
    session: RefCell<DragSession>,
    mount_listeners: RefCell<SubscriptionSet>,
    session_listeners: RefCell<SubscriptionSet>,
    _phase_watch: Subscription,
}

/// Turns pointer events on a container into position updates.
///
/// `D` is the document-wide event source; `C` the draggable element. Bind the
/// element through [`DragController::container_ref`], then call `mount` /
/// `unmount` from the owning component's lifecycle.
pub struct DragController<D, C> {
    inner: Rc<ControllerInner<D, C>>,
}

impl<D, C> Clone for DragController<D, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D, C> DragController<D, C>
where
    D: EventSource + 'static,
    C: Container<Target = D::Target> + Clone + 'static,
{
    pub fn new(document: D, options: DragOptions) -> Self {
        let DragOptions {
            x,
            y,
            enable,
            auto_update,
            on_press,
            on_drag_start,
            on_dragging,
            on_drag_end,
            on_unselect,
        } = options;
        let x = x.unwrap_or_else(|| Reactive::new(0.0));
        let y = y.unwrap_or_else(|| Reactive::new(0.0));
        let is_dragging = Reactive::new(false);

        // Fires only on real transitions, never at setup.
        let phase_watch = is_dragging.watch({
            let x = x.clone();
            let y = y.clone();
            move |dragging, was_dragging| {
                let was_dragging = was_dragging.copied().unwrap_or(false);
                let position = Position::new(x.get(), y.get());
                if *dragging && !was_dragging {
                    tracing::debug!(x = position.x, y = position.y, "drag started");
                    if let Some(on_drag_start) = &on_drag_start {
                        on_drag_start(position);
                    }
                } else if !*dragging && was_dragging {
                    tracing::debug!(x = position.x, y = position.y, "drag ended");
                    if let Some(on_drag_end) = &on_drag_end {
                        on_drag_end(position);
                    }
                }
            }
        });

        Self {
            inner: Rc::new_cyclic(|self_ref| ControllerInner {
                self_ref: self_ref.clone(),
                document,
                container_ref: ContainerRef::new(),
                x,
                y,
                enable,
                auto_update,
                on_press,
                on_dragging,
                on_unselect,
                is_dragging,
                session: RefCell::new(DragSession::Idle),
                mount_listeners: RefCell::new(SubscriptionSet::new()),
                session_listeners: RefCell::new(SubscriptionSet::new()),
                _phase_watch: phase_watch,
            }),
        }
    }

    /// Handle the owning component binds its element to.
    pub fn container_ref(&self) -> ContainerRef<C> {
        self.inner.container_ref.clone()
    }

    pub fn x(&self) -> Reactive<f64> {
        self.inner.x.clone()
    }

    pub fn y(&self) -> Reactive<f64> {
        self.inner.y.clone()
    }

    pub fn is_dragging(&self) -> Reactive<bool> {
        self.inner.is_dragging.clone()
    }

    pub fn position(&self) -> Position {
        Position::new(self.inner.x.get(), self.inner.y.get())
    }

    pub fn session(&self) -> DragSession {
        *self.inner.session.borrow()
    }

    /// Sync the element style with the position cells and attach the
    /// pointer-down listeners. Without a bound container this does nothing.
    pub fn mount(&self) {
        let inner = &self.inner;
        let Some(element) = inner.container_ref.get() else {
            tracing::debug!("mount skipped, container not bound");
            return;
        };
        // A second mount replaces the first set of listeners.
        inner.mount_listeners.borrow_mut().cancel_all();

        element.set_style_px("left", inner.x.get());
        element.set_style_px("top", inner.y.get());

        let outside_press = inner.document.listen(
            PointerEventKind::Down,
            handler(Rc::downgrade(inner), ControllerInner::handle_outside_press),
        );
        let press = element.listen(
            PointerEventKind::Down,
            handler(Rc::downgrade(inner), ControllerInner::handle_press),
        );

        let mut mount_listeners = inner.mount_listeners.borrow_mut();
        mount_listeners.push(outside_press);
        mount_listeners.push(press);
    }

    /// Detach everything this controller attached. An open session is ended
    /// first, so `on_drag_end` still fires. Runs whenever a container was ever
    /// bound, even if it has been released since.
    pub fn unmount(&self) {
        let inner = &self.inner;
        if !inner.container_ref.was_bound() {
            return;
        }
        if inner.session.borrow().is_dragging() {
            inner.end_session();
        }
        inner.session_listeners.borrow_mut().cancel_all();
        inner.mount_listeners.borrow_mut().cancel_all();
    }
}

fn handler<D, C>(
    inner: Weak<ControllerInner<D, C>>,
    handle: fn(&ControllerInner<D, C>, &PointerEvent<D::Target>),
) -> PointerHandler<D::Target>
where
    D: EventSource + 'static,
    C: Container<Target = D::Target> + Clone + 'static,
{
    Rc::new(move |event: &PointerEvent<D::Target>| {
        if let Some(inner) = inner.upgrade() {
            handle(&inner, event);
        }
    })
}

impl<D, C> ControllerInner<D, C>
where
    D: EventSource + 'static,
    C: Container<Target = D::Target> + Clone + 'static,
{
    fn handle_outside_press(&self, event: &PointerEvent<D::Target>) {
        let Some(on_unselect) = &self.on_unselect else {
            return;
        };
        let inside = event
            .target
            .as_ref()
            .and_then(|target| self.container_ref.with(|element| element.contains(target)))
            .unwrap_or(false);
        if !inside {
            on_unselect();
        }
    }

    fn handle_press(&self, event: &PointerEvent<D::Target>) {
        if let Some(on_press) = &self.on_press {
            on_press();
        }
        if let Some(enable) = &self.enable {
            if !enable.get() {
                tracing::trace!("press ignored, dragging disabled");
                return;
            }
        }
        self.begin_session(event.page_x, event.page_y);
    }

    fn begin_session(&self, page_x: f64, page_y: f64) {
        // Drop listeners of a session that never saw its pointer-up.
        self.session_listeners.borrow_mut().cancel_all();
        *self.session.borrow_mut() = DragSession::Dragging {
            last_x: page_x,
            last_y: page_y,
        };

        let move_listener = self
            .document
            .listen(PointerEventKind::Move, handler(self.self_ref.clone(), Self::handle_move));
        let up_listener = self
            .document
            .listen(PointerEventKind::Up, handler(self.self_ref.clone(), Self::handle_release));
        {
            let mut session_listeners = self.session_listeners.borrow_mut();
            session_listeners.push(move_listener);
            session_listeners.push(up_listener);
        }

        self.is_dragging.set(true);
    }

    fn handle_move(&self, event: &PointerEvent<D::Target>) {
        let DragSession::Dragging { last_x, last_y } = *self.session.borrow() else {
            return;
        };
        if !self.container_ref.is_bound() {
            return;
        }

        let delta_x = event.page_x - last_x;
        let delta_y = event.page_y - last_y;
        self.x.update(|x| x + delta_x);
        self.y.update(|y| y + delta_y);
        *self.session.borrow_mut() = DragSession::Dragging {
            last_x: event.page_x,
            last_y: event.page_y,
        };

        let position = Position::new(self.x.get(), self.y.get());
        tracing::trace!(delta_x, delta_y, x = position.x, y = position.y, "drag moved");
        if let Some(on_dragging) = &self.on_dragging {
            on_dragging(position);
        }
        if self.auto_update {
            self.container_ref.with(|element| {
                element.set_style_px("left", position.x);
                element.set_style_px("top", position.y);
            });
        }
    }

    fn handle_release(&self, _event: &PointerEvent<D::Target>) {
        self.end_session();
    }

    fn end_session(&self) {
        *self.session.borrow_mut() = DragSession::Idle;
        self.session_listeners.borrow_mut().cancel_all();
        self.is_dragging.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDom, FakeElement, FakeEventSource, NodeId};
    use proptest::prelude::*;
    use std::cell::Cell;

    type TestController = DragController<FakeEventSource, FakeElement>;

    fn mounted(dom: &FakeDom, options: DragOptions) -> (TestController, FakeElement) {
        let element = FakeElement::new(NodeId(1), vec![NodeId(2)]);
        let controller = DragController::new(dom.document.clone(), options);
        controller.container_ref().bind(element.clone());
        controller.mount();
        (controller, element)
    }

    fn phase_log(options: DragOptions) -> (DragOptions, Rc<RefCell<Vec<(&'static str, Position)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let options = options
            .on_drag_start({
                let log = log.clone();
                move |position| log.borrow_mut().push(("start", position))
            })
            .on_drag_end({
                let log = log.clone();
                move |position| log.borrow_mut().push(("end", position))
            });
        (options, log)
    }

    #[test]
    fn moves_accumulate_pointer_deltas() {
        let dom = FakeDom::new();
        let options = DragOptions::new().x(Reactive::new(100.0)).y(Reactive::new(50.0));
        let (controller, element) = mounted(&dom, options);
        assert_eq!(element.style("left").as_deref(), Some("100px"));
        assert_eq!(element.style("top").as_deref(), Some("50px"));

        dom.press_on(&element, 10.0, 10.0);
        dom.move_to(15.0, 12.0);
        dom.move_to(20.0, 30.0);
        dom.move_to(5.0, 5.0);
        dom.release(5.0, 5.0);

        assert_eq!(controller.position(), Position::new(95.0, 45.0));
        assert_eq!(element.style("left").as_deref(), Some("95px"));
        assert_eq!(element.style("top").as_deref(), Some("45px"));
        assert_eq!(controller.session(), DragSession::Idle);
    }

    #[test]
    fn disabled_gate_blocks_session() {
        let dom = FakeDom::new();
        let enable = Reactive::new(false);
        let (controller, element) = mounted(&dom, DragOptions::new().enable(enable.clone()));

        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(40.0, 40.0);

        assert!(!controller.is_dragging().get());
        assert_eq!(dom.document.listener_count(PointerEventKind::Move), 0);
        assert_eq!(dom.document.listener_count(PointerEventKind::Up), 0);
        assert_eq!(controller.position(), Position::ORIGIN);

        enable.set(true);
        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(40.0, 40.0);

        assert!(controller.is_dragging().get());
        assert_eq!(controller.position(), Position::new(40.0, 40.0));
    }

    #[test]
    fn press_callback_runs_before_gate() {
        let dom = FakeDom::new();
        let enable = Reactive::new(false);
        let presses = Rc::new(Cell::new(0));
        let options = DragOptions::new().enable(enable.clone()).on_press({
            let presses = presses.clone();
            move || presses.set(presses.get() + 1)
        });
        let (controller, element) = mounted(&dom, options);

        dom.press_on(&element, 0.0, 0.0);
        assert_eq!(presses.get(), 1);
        assert!(!controller.is_dragging().get());

        dom.press_outside(NodeId(99), 0.0, 0.0);
        assert_eq!(presses.get(), 1, "outside press is not a press on the container");
    }

    #[test]
    fn press_callback_can_open_the_gate() {
        let dom = FakeDom::new();
        let enable = Reactive::new(false);
        let options = DragOptions::new().enable(enable.clone()).on_press({
            let enable = enable.clone();
            move || enable.set(true)
        });
        let (controller, element) = mounted(&dom, options);

        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(6.0, 8.0);

        assert!(controller.is_dragging().get());
        assert_eq!(controller.position(), Position::new(6.0, 8.0));
    }

    #[test]
    fn phase_callbacks_fire_once_per_transition() {
        let dom = FakeDom::new();
        let (options, log) = phase_log(DragOptions::new());
        let (controller, element) = mounted(&dom, options);
        assert!(log.borrow().is_empty(), "no drag-end at setup");

        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(3.0, 4.0);
        dom.release(3.0, 4.0);
        dom.release(3.0, 4.0);

        dom.press_on(&element, 3.0, 4.0);
        dom.release(3.0, 4.0);

        assert_eq!(
            *log.borrow(),
            vec![
                ("start", Position::ORIGIN),
                ("end", Position::new(3.0, 4.0)),
                ("start", Position::new(3.0, 4.0)),
                ("end", Position::new(3.0, 4.0)),
            ]
        );
        assert!(!controller.is_dragging().get());
    }

    #[test]
    fn release_detaches_session_listeners() {
        let dom = FakeDom::new();
        let (_controller, element) = mounted(&dom, DragOptions::new());
        // Outside-press listener only.
        assert_eq!(dom.document.total_listeners(), 1);

        dom.press_on(&element, 0.0, 0.0);
        assert_eq!(dom.document.listener_count(PointerEventKind::Move), 1);
        assert_eq!(dom.document.listener_count(PointerEventKind::Up), 1);

        dom.release(0.0, 0.0);
        assert_eq!(dom.document.total_listeners(), 1);
    }

    #[test]
    fn unmount_removes_every_listener() {
        let dom = FakeDom::new();
        let (controller, element) = mounted(&dom, DragOptions::new());

        controller.unmount();
        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(25.0, 25.0);

        assert_eq!(dom.document.total_listeners(), 0);
        assert_eq!(element.events.total_listeners(), 0);
        assert_eq!(controller.position(), Position::ORIGIN);
        assert!(!controller.is_dragging().get());
    }

    #[test]
    fn unmount_during_drag_ends_session() {
        let dom = FakeDom::new();
        let (options, log) = phase_log(DragOptions::new());
        let (controller, element) = mounted(&dom, options);

        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(1.0, 1.0);
        controller.unmount();
        dom.move_to(50.0, 50.0);

        assert_eq!(controller.position(), Position::new(1.0, 1.0));
        assert_eq!(controller.session(), DragSession::Idle);
        assert_eq!(log.borrow().last(), Some(&("end", Position::new(1.0, 1.0))));
        assert_eq!(dom.document.total_listeners(), 0);
    }

    #[test]
    fn unmount_after_container_release_still_detaches() {
        let dom = FakeDom::new();
        let (controller, element) = mounted(&dom, DragOptions::new());
        dom.press_on(&element, 0.0, 0.0);

        controller.container_ref().release();
        controller.unmount();

        assert_eq!(dom.document.total_listeners(), 0);
        assert_eq!(element.events.total_listeners(), 0);
        assert_eq!(controller.session(), DragSession::Idle);
    }

    #[test]
    fn dragging_callback_sees_updated_cells() {
        let dom = FakeDom::new();
        let x = Reactive::new(0.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let options = DragOptions::new().x(x.clone()).on_dragging({
            let x = x.clone();
            let seen = seen.clone();
            move |position| seen.borrow_mut().push((position.x, x.get()))
        });
        let (_controller, element) = mounted(&dom, options);

        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(7.0, 0.0);
        dom.move_to(9.0, 0.0);

        assert_eq!(*seen.borrow(), vec![(7.0, 7.0), (9.0, 9.0)]);
    }

    #[test]
    fn auto_update_off_leaves_style_alone() {
        let dom = FakeDom::new();
        let (controller, element) = mounted(&dom, DragOptions::new().auto_update(false));

        dom.press_on(&element, 0.0, 0.0);
        dom.move_to(30.0, 20.0);

        assert_eq!(controller.position(), Position::new(30.0, 20.0));
        assert_eq!(element.style("left").as_deref(), Some("0px"));
        assert_eq!(element.style("top").as_deref(), Some("0px"));
    }

    #[test]
    fn outside_press_unselects() {
        let dom = FakeDom::new();
        let unselected = Rc::new(Cell::new(0));
        let options = DragOptions::new().on_unselect({
            let unselected = unselected.clone();
            move || unselected.set(unselected.get() + 1)
        });
        let (_controller, element) = mounted(&dom, options);

        dom.press_on(&element, 0.0, 0.0);
        dom.release(0.0, 0.0);
        dom.press_outside(NodeId(2), 0.0, 0.0);
        assert_eq!(unselected.get(), 0, "descendant press counts as inside");

        dom.press_outside(NodeId(99), 0.0, 0.0);
        assert_eq!(unselected.get(), 1);
    }

    #[test]
    fn unbound_container_is_a_no_op() {
        let dom = FakeDom::new();
        let controller: TestController = DragController::new(dom.document.clone(), DragOptions::new());

        controller.mount();
        controller.unmount();

        assert_eq!(dom.document.total_listeners(), 0);
        assert!(!controller.container_ref().was_bound());
    }

    #[test]
    fn dropping_controller_releases_listeners() {
        let dom = FakeDom::new();
        let (controller, element) = mounted(&dom, DragOptions::new());
        dom.press_on(&element, 0.0, 0.0);
        assert_eq!(dom.document.total_listeners(), 3);

        drop(controller);

        assert_eq!(dom.document.total_listeners(), 0);
        assert_eq!(element.events.total_listeners(), 0);
    }

    #[test]
    fn config_section_gates_on_active() {
        let active = Reactive::new(false);
        let gated = DragOptions::from_config(
            &DragSection {
                auto_update: false,
                require_active: true,
            },
            &active,
        );
        assert!(!gated.auto_update);
        assert!(gated.enable.is_some());

        let ungated = DragOptions::from_config(&DragSection::default(), &active);
        assert!(ungated.auto_update);
        assert!(ungated.enable.is_none());
    }

    fn pointer_path() -> impl Strategy<Value = Vec<(i32, i32)>> {
        prop::collection::vec((-2000i32..2000, -2000i32..2000), 0..24)
    }

    proptest! {
        /// A full press/move/release cycle moves the element by the net pointer
        /// travel and leaves only the outside-press listener on the document.
        #[test]
        fn drag_cycle_moves_by_net_pointer_travel(
            start_x in -1000i32..1000,
            start_y in -1000i32..1000,
            press in (-500i32..500, -500i32..500),
            moves in pointer_path(),
        ) {
            let dom = FakeDom::new();
            let options = DragOptions::new()
                .x(Reactive::new(f64::from(start_x)))
                .y(Reactive::new(f64::from(start_y)));
            let (controller, element) = mounted(&dom, options);

            let (press_x, press_y) = (f64::from(press.0), f64::from(press.1));
            dom.press_on(&element, press_x, press_y);
            let (mut last_x, mut last_y) = (press_x, press_y);
            let (mut travel_x, mut travel_y) = (0.0, 0.0);
            for (x, y) in moves {
                let (x, y) = (f64::from(x), f64::from(y));
                dom.move_to(x, y);
                travel_x += x - last_x;
                travel_y += y - last_y;
                (last_x, last_y) = (x, y);
            }
            dom.release(last_x, last_y);

            prop_assert_eq!(
                controller.position(),
                Position::new(f64::from(start_x) + travel_x, f64::from(start_y) + travel_y)
            );
            prop_assert_eq!(controller.session(), DragSession::Idle);
            prop_assert!(!controller.is_dragging().get());
            prop_assert_eq!(dom.document.total_listeners(), 1);
        }
    }
}
