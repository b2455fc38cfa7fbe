//! A single-threaded, event-driven host for a widget tree.
//!
//! [`Window`] owns the mounted widgets, dispatches pointer input, advances
//! animations by explicit elapsed time, and records each redraw into a
//! [`Frame`]. All work happens inside the caller's invocations of its
//! methods: there is no background thread, and event `N` is always fully
//! settled before event `N + 1` is examined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use figures::units::{Px, UPx};
use figures::{IntoSigned, Point, Rect, Size, Zero};

use crate::animation::Animations;
use crate::context::{
    hit_test_widget, EventContext, GraphicsContext, LayoutContext, WidgetContext,
};
use crate::graphics::Frame;
use crate::tree::{MountedWidget, Tree};
use crate::widget::{EventHandling, MakeWidget, WidgetId, IGNORED};
use crate::ConstraintLimit;

/// The identifier of the pointing device an event came from.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct DeviceId(pub u64);

/// A button on a mouse.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MouseButton {
    /// The primary button.
    Left,
    /// The secondary button.
    Right,
    /// The middle button.
    Middle,
}

/// The cursor appearance the embedding application should show.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum CursorIcon {
    /// The platform's default arrow cursor.
    #[default]
    Default,
    /// A hand indicating a clickable control.
    Pointer,
}

pub(crate) struct WindowShared {
    redraw: AtomicBool,
    pub(crate) animations: Animations,
}

impl WindowShared {
    pub(crate) fn set_needs_redraw(&self) {
        self.redraw.store(true, Ordering::Release);
    }
}

/// A headless window hosting a tree of widgets.
///
/// Dropping the window unmounts every widget, dropping their change callbacks
/// and cancelling their animations.
pub struct Window {
    tree: Tree,
    root: MountedWidget,
    shared: Arc<WindowShared>,
    size: Size<UPx>,
    cursor: Option<Point<Px>>,
    dragging: Option<(WidgetId, MouseButton)>,
    last_frame: Frame,
}

impl Window {
    /// Returns a window of `size` containing `root`, laid out and rendered
    /// once.
    pub fn new(root: impl MakeWidget, size: Size<UPx>) -> Self {
        let tree = Tree::default();
        let shared = Arc::new(WindowShared {
            redraw: AtomicBool::new(true),
            animations: Animations::new(),
        });
        let root = tree.mount(root.make_widget(), None);
        let mut context = EventContext::new(WidgetContext::new(root.clone(), shared.clone()));
        root.instance().lock().widget_mut().mounted(&mut context);

        let mut window = Self {
            tree,
            root,
            shared,
            size,
            cursor: None,
            dragging: None,
            last_frame: Frame::new(size),
        };
        window.redraw();
        window
    }

    /// The size of the window's surface.
    #[must_use]
    pub fn size(&self) -> Size<UPx> {
        self.size
    }

    /// The root widget of the window.
    #[must_use]
    pub fn root(&self) -> &MountedWidget {
        &self.root
    }

    /// The animation pool advanced by this window.
    #[must_use]
    pub fn animations(&self) -> &Animations {
        &self.shared.animations
    }

    /// Returns true if state has changed since the last recorded frame.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.shared.redraw.load(Ordering::Acquire)
    }

    /// The most recently recorded frame.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.last_frame
    }

    /// The cursor appearance for the current pointer position. Hovering a
    /// widget that accepts pointer input requests a pointer hand; disabled
    /// controls never hover, so they never do.
    #[must_use]
    pub fn cursor_icon(&self) -> CursorIcon {
        if self.tree.hovered().is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        }
    }

    /// Returns `widget`'s most recent layout in window coordinates.
    #[must_use]
    pub fn layout_in_window(&self, widget: WidgetId) -> Option<Rect<Px>> {
        self.tree.layout_in_window(widget)
    }

    /// The total number of change callbacks registered by mounted widgets.
    ///
    /// This exists so embedders and tests can verify that unmounting does not
    /// leak listeners.
    #[must_use]
    pub fn tracked_callbacks(&self) -> usize {
        self.tree.tracked_callbacks()
    }

    /// Lays out the tree and records a fresh frame, returning it.
    pub fn redraw(&mut self) -> &Frame {
        self.shared.redraw.store(false, Ordering::Release);
        // Redraw listeners re-register during the traversal below.
        self.tree.clear_tracked_callbacks();

        let mut layout_context = LayoutContext::new(WidgetContext::new(
            self.root.clone(),
            self.shared.clone(),
        ));
        let root_size = layout_context.layout(self.size.map(ConstraintLimit::Known));
        let root_rect = Rect::new(Point::new(Px::ZERO, Px::ZERO), root_size.into_signed());
        self.tree.set_layout(self.root.id(), root_rect);

        let mut frame = Frame::new(self.size);
        {
            let mut surface = frame.graphics();
            let gfx = surface.for_region(root_rect);
            let mut context = GraphicsContext::new(
                gfx,
                WidgetContext::new(self.root.clone(), self.shared.clone()),
            );
            context.redraw();
        }
        self.last_frame = frame;
        &self.last_frame
    }

    /// Advances animations by `elapsed`, re-rendering if anything changed.
    pub fn advance(&mut self, elapsed: Duration) {
        self.shared.animations.advance(elapsed);
        if self.needs_redraw() {
            self.redraw();
        }
    }

    /// The cursor moved to `position` in window coordinates.
    pub fn cursor_moved(&mut self, position: Point<Px>) {
        self.cursor = Some(position);
        if let Some((dragging, button)) = self.dragging {
            if let Some(widget) = self.tree.widget(dragging) {
                let origin = self
                    .tree
                    .layout_in_window(dragging)
                    .map(|layout| layout.origin)
                    .unwrap_or_default();
                let mut context =
                    EventContext::new(WidgetContext::new(widget.clone(), self.shared.clone()));
                widget.instance().lock().widget_mut().mouse_drag(
                    position - origin,
                    DeviceId::default(),
                    button,
                    &mut context,
                );
                self.apply_pending_activation();
            }
        } else {
            self.update_hover(position);
        }
    }

    /// The cursor left the window.
    pub fn cursor_left(&mut self) {
        self.cursor = None;
        self.update_hover_target(None);
    }

    /// A mouse button was pressed at `position`. Returns whether a widget
    /// handled the event.
    pub fn mouse_down(&mut self, position: Point<Px>, button: MouseButton) -> EventHandling {
        self.cursor = Some(position);
        let base = WidgetContext::new(self.root.clone(), self.shared.clone());
        let Some((widget, location)) = hit_test_widget(&base, &self.root, position) else {
            return IGNORED;
        };

        let mut context =
            EventContext::new(WidgetContext::new(widget.clone(), self.shared.clone()));
        let handling = widget.instance().lock().widget_mut().mouse_down(
            location,
            DeviceId::default(),
            button,
            &mut context,
        );
        if handling.is_break() {
            self.dragging = Some((widget.id(), button));
        }
        self.apply_pending_activation();
        handling
    }

    /// A mouse button was released. `position` is `None` when the cursor is
    /// outside the window.
    pub fn mouse_up(&mut self, position: Option<Point<Px>>, button: MouseButton) {
        let Some((dragging, down_button)) = self.dragging else {
            return;
        };
        if down_button != button {
            return;
        }
        self.dragging = None;

        if let Some(widget) = self.tree.widget(dragging) {
            let origin = self
                .tree
                .layout_in_window(dragging)
                .map(|layout| layout.origin)
                .unwrap_or_default();
            let mut context =
                EventContext::new(WidgetContext::new(widget.clone(), self.shared.clone()));
            widget.instance().lock().widget_mut().mouse_up(
                position.map(|position| position - origin),
                DeviceId::default(),
                button,
                &mut context,
            );
            self.apply_pending_activation();
        }

        if let Some(position) = self.cursor {
            self.update_hover(position);
        }
    }

    /// Simulates a complete primary-button click at `position`, re-rendering
    /// if anything changed.
    pub fn click(&mut self, position: Point<Px>) {
        self.cursor_moved(position);
        let _handling = self.mouse_down(position, MouseButton::Left);
        self.mouse_up(Some(position), MouseButton::Left);
        if self.needs_redraw() {
            self.redraw();
        }
    }

    fn update_hover(&mut self, position: Point<Px>) {
        let base = WidgetContext::new(self.root.clone(), self.shared.clone());
        let target = hit_test_widget(&base, &self.root, position);
        self.update_hover_target(target);
    }

    fn update_hover_target(&mut self, target: Option<(MountedWidget, Point<Px>)>) {
        let previous = self.tree.hovered();
        let current = target.as_ref().map(|(widget, _)| widget.id());
        if previous != current {
            self.tree.set_hovered(current);
            if let Some(unhovered) = previous.and_then(|id| self.tree.widget(id)) {
                let mut context = EventContext::new(WidgetContext::new(
                    unhovered.clone(),
                    self.shared.clone(),
                ));
                unhovered
                    .instance()
                    .lock()
                    .widget_mut()
                    .unhover(&mut context);
            }
        }
        if let Some((widget, location)) = target {
            let mut context =
                EventContext::new(WidgetContext::new(widget.clone(), self.shared.clone()));
            widget
                .instance()
                .lock()
                .widget_mut()
                .hover(location, &mut context);
        }
        self.apply_pending_activation();
    }

    /// Applies activation changes requested during the event callback that
    /// just settled, invoking the affected widgets' callbacks.
    fn apply_pending_activation(&mut self) {
        let Some(target) = self.tree.take_pending_activation() else {
            return;
        };
        let previous = self.tree.active();
        if previous == target {
            return;
        }
        self.tree.set_active(target);
        if let Some(deactivated) = previous.and_then(|id| self.tree.widget(id)) {
            let mut context = EventContext::new(WidgetContext::new(
                deactivated.clone(),
                self.shared.clone(),
            ));
            deactivated
                .instance()
                .lock()
                .widget_mut()
                .deactivate(&mut context);
        }
        if let Some(activated) = target.and_then(|id| self.tree.widget(id)) {
            let mut context =
                EventContext::new(WidgetContext::new(activated.clone(), self.shared.clone()));
            activated
                .instance()
                .lock()
                .widget_mut()
                .activate(&mut context);
        }
    }

    fn unmount_subtree(&mut self, widget: &MountedWidget) {
        for child in widget.children() {
            self.unmount_subtree(&child);
        }
        let mut context =
            EventContext::new(WidgetContext::new(widget.clone(), self.shared.clone()));
        widget
            .instance()
            .lock()
            .widget_mut()
            .unmounted(&mut context);
        self.tree.remove(widget.id());
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Some(root) = self.tree.root() {
            self.unmount_subtree(&root);
        }
        debug_assert_eq!(self.tree.tracked_callbacks(), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Color, DrawCommand};
    use crate::styles::components::{ButtonBackground, ButtonHoverBackground};
    use crate::styles::Styles;
    use crate::value::Dynamic;
    use crate::widgets::RippleButton;

    fn window_size() -> Size<UPx> {
        Size::new(UPx::new(200), UPx::new(100))
    }

    fn background_of(window: &Window) -> Color {
        window
            .frame()
            .commands()
            .iter()
            .find_map(|placed| match &placed.command {
                DrawCommand::Fill { color, .. } => Some(*color),
                _ => None,
            })
            .expect("button draws a fill")
    }

    #[test]
    fn unmounting_during_ripple_releases_everything() {
        let label = Dynamic::from("Go");
        let button = RippleButton::new().label(&label).make_widget();
        let mut window = Window::new(button.centered(), window_size());
        let animations = window.animations().clone();

        assert!(window.tracked_callbacks() > 0);
        window.click(Point::new(Px::new(100), Px::new(50)));
        window.advance(Duration::from_millis(100));
        assert!(animations.running() > 0);

        drop(window);
        assert_eq!(animations.running(), 0);
        assert_eq!(label.listeners(), 0);
    }

    #[test]
    fn hover_transitions_background_color() {
        let mut window = Window::new(RippleButton::new().centered(), window_size());
        assert_eq!(
            background_of(&window),
            Styles::default().get_or_default(&ButtonBackground)
        );

        window.cursor_moved(Point::new(Px::new(100), Px::new(50)));
        assert_eq!(window.cursor_icon(), CursorIcon::Pointer);
        // The transition runs over time rather than snapping.
        window.advance(Duration::from_millis(100));
        let mid = background_of(&window);
        assert_ne!(mid, Styles::default().get_or_default(&ButtonBackground));
        window.advance(Duration::from_millis(150));
        assert_eq!(
            background_of(&window),
            Styles::default().get_or_default(&ButtonHoverBackground)
        );

        // Moving away eases the color back.
        window.cursor_left();
        assert_eq!(window.cursor_icon(), CursorIcon::Default);
        window.advance(Duration::from_millis(250));
        assert_eq!(
            background_of(&window),
            Styles::default().get_or_default(&ButtonBackground)
        );
    }

    #[test]
    fn styles_override_per_widget() {
        let button = RippleButton::new()
            .make_widget()
            .with(&ButtonBackground, Color::BLACK);
        let window = Window::new(button.centered(), window_size());
        assert_eq!(background_of(&window), Color::BLACK);
    }
}
