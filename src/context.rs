//! Types that provide widgets access to the window host during event,
//! layout, and render callbacks.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use figures::units::{Px, UPx};
use figures::{Point, Rect, Size};

use crate::animation::Animations;
use crate::graphics::Graphics;
use crate::styles::{ComponentDefinition, ComponentType};
use crate::tree::MountedWidget;
use crate::value::Dynamic;
use crate::widget::WidgetInstance;
use crate::window::WindowShared;
use crate::ConstraintLimit;

/// The context of a widget during any host callback.
#[derive(Clone)]
pub struct WidgetContext {
    widget: MountedWidget,
    shared: Arc<WindowShared>,
}

impl WidgetContext {
    pub(crate) fn new(widget: MountedWidget, shared: Arc<WindowShared>) -> Self {
        Self { widget, shared }
    }

    /// The widget this context is for.
    #[must_use]
    pub fn widget(&self) -> &MountedWidget {
        &self.widget
    }

    /// Returns a context for another widget hosted by the same window.
    #[must_use]
    pub fn for_other(&self, widget: &MountedWidget) -> WidgetContext {
        WidgetContext {
            widget: widget.clone(),
            shared: self.shared.clone(),
        }
    }

    /// Marks the window as needing to be redrawn.
    pub fn set_needs_redraw(&self) {
        self.shared.set_needs_redraw();
    }

    /// Invalidates the window when `value` changes, for as long as this
    /// context's widget remains mounted.
    pub fn redraw_when_changed<T>(&self, value: &Dynamic<T>) {
        let shared = Arc::downgrade(&self.shared);
        let handle = value.on_change_try(move || {
            let shared = shared.upgrade().ok_or(crate::value::CallbackDisconnected)?;
            shared.set_needs_redraw();
            Ok(())
        });
        self.widget.tree().attach_tracked(self.widget.id(), handle);
    }

    /// The animation pool of the window hosting this widget.
    #[must_use]
    pub fn animations(&self) -> &Animations {
        &self.shared.animations
    }

    /// Returns true if this context's widget is the active widget.
    #[must_use]
    pub fn active(&self) -> bool {
        self.widget.tree().active() == Some(self.widget.id())
    }

    /// Returns true if the cursor is hovering this context's widget.
    #[must_use]
    pub fn hovered(&self) -> bool {
        self.widget.tree().hovered() == Some(self.widget.id())
    }

    /// Requests that this widget become the active widget. Returns true if
    /// the request changes the active widget.
    ///
    /// The change is applied, and [`Widget::activate`](crate::widget::Widget::activate)
    /// invoked, after the current event callback returns.
    pub fn activate(&self) -> bool {
        self.widget.tree().request_activation(Some(self.widget.id()))
    }

    /// Requests that no widget be active. Returns true if the request changes
    /// the active widget.
    pub fn deactivate(&self) -> bool {
        self.widget.tree().request_activation(None)
    }

    /// Returns this widget's layout from the most recent layout pass, in its
    /// parent's coordinate space.
    #[must_use]
    pub fn last_layout(&self) -> Option<Rect<Px>> {
        self.widget.last_layout()
    }

    /// Returns true if this widget's instance is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.widget.instance().enabled()
    }

    /// Resolves a style component by consulting the styles attached to this
    /// widget and its ancestors, falling back to the component's default.
    #[must_use]
    pub fn get<C: ComponentDefinition>(&self, component: &C) -> C::ComponentType {
        self.widget
            .tree()
            .query_component(self.widget.id(), &component.name())
            .and_then(|stored| C::ComponentType::try_from_component(&stored))
            .unwrap_or_else(|| component.default_value())
    }
}

/// The context of a widget during event callbacks.
pub struct EventContext {
    widget: WidgetContext,
}

impl EventContext {
    pub(crate) fn new(widget: WidgetContext) -> Self {
        Self { widget }
    }

    /// Mounts `instance` as a child of this context's widget, returning the
    /// mounted widget.
    pub fn push_child(&mut self, instance: WidgetInstance) -> MountedWidget {
        let mounted = self
            .widget
            .widget()
            .tree()
            .mount(instance, Some(self.widget.widget().id()));
        let mut child_context = EventContext::new(self.widget.for_other(&mounted));
        mounted
            .instance()
            .lock()
            .widget_mut()
            .mounted(&mut child_context);
        mounted
    }
}

impl Deref for EventContext {
    type Target = WidgetContext;

    fn deref(&self) -> &Self::Target {
        &self.widget
    }
}

impl DerefMut for EventContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.widget
    }
}

/// The context of a widget while it is being redrawn.
pub struct GraphicsContext<'gfx> {
    /// The graphics recording this widget's drawing operations.
    pub gfx: Graphics<'gfx>,
    widget: WidgetContext,
}

impl<'gfx> GraphicsContext<'gfx> {
    pub(crate) fn new(gfx: Graphics<'gfx>, widget: WidgetContext) -> Self {
        Self { gfx, widget }
    }

    /// Returns a context that renders `widget` within its last layout,
    /// clipped to this widget's bounds.
    pub fn for_other<'child>(&'child mut self, widget: &MountedWidget) -> GraphicsContext<'child> {
        let layout = widget.last_layout().unwrap_or_default();
        let region = Rect::new(self.gfx.region().origin + layout.origin, layout.size);
        GraphicsContext {
            gfx: self.gfx.for_region(region),
            widget: self.widget.for_other(widget),
        }
    }

    /// Redraws this context's widget.
    pub fn redraw(&mut self) {
        let instance = self.widget.widget().instance().clone();
        instance.lock().widget_mut().redraw(self);
    }
}

impl Deref for GraphicsContext<'_> {
    type Target = WidgetContext;

    fn deref(&self) -> &Self::Target {
        &self.widget
    }
}

impl DerefMut for GraphicsContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.widget
    }
}

/// The context of a widget while it is being laid out.
pub struct LayoutContext {
    widget: WidgetContext,
}

impl LayoutContext {
    pub(crate) fn new(widget: WidgetContext) -> Self {
        Self { widget }
    }

    /// Returns a context that can lay out `widget`.
    pub fn for_other(&mut self, widget: &MountedWidget) -> LayoutContext {
        LayoutContext {
            widget: self.widget.for_other(widget),
        }
    }

    /// Lays out this context's widget, returning its ideal size within
    /// `available_space`.
    pub fn layout(&mut self, available_space: Size<ConstraintLimit>) -> Size<UPx> {
        let instance = self.widget.widget().instance().clone();
        instance.lock().widget_mut().layout(available_space, self)
    }

    /// Records `layout` as `child`'s region, in this widget's coordinate
    /// space.
    pub fn set_child_layout(&mut self, child: &MountedWidget, layout: Rect<Px>) {
        self.widget.widget().tree().set_layout(child.id(), layout);
    }
}

impl Deref for LayoutContext {
    type Target = WidgetContext;

    fn deref(&self) -> &Self::Target {
        &self.widget
    }
}

impl DerefMut for LayoutContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.widget
    }
}

/// Locates the deepest enabled widget at `location` within `widget`,
/// returning it and `location` translated into its coordinate space.
pub(crate) fn hit_test_widget(
    context: &WidgetContext,
    widget: &MountedWidget,
    location: Point<Px>,
) -> Option<(MountedWidget, Point<Px>)> {
    if !widget.instance().enabled() {
        return None;
    }

    // Children paint above their parents, so match them in reverse order
    // first.
    for child in widget.children().into_iter().rev() {
        if let Some(layout) = child.last_layout() {
            if layout.contains(location) {
                if let Some(hit) =
                    hit_test_widget(context, &child, location - layout.origin)
                {
                    return Some(hit);
                }
            }
        }
    }

    let mut event_context = EventContext::new(context.for_other(widget));
    let instance = widget.instance().clone();
    if instance
        .lock()
        .widget_mut()
        .hit_test(location, &mut event_context)
    {
        Some((widget.clone(), location))
    } else {
        None
    }
}
