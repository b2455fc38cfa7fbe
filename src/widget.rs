//! Types for creating reusable widgets.

use std::any::Any;
use std::fmt::{self, Debug};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use figures::units::{Px, UPx};
use figures::{Point, Size};
use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};

use crate::context::{EventContext, GraphicsContext, LayoutContext};
use crate::styles::{ComponentDefinition, ComponentType, Styles};
use crate::tree::MountedWidget;
use crate::value::{IntoValue, Value};
use crate::widgets::{Align, Label, Stack};
use crate::window::{DeviceId, MouseButton};
use crate::ConstraintLimit;

/// A type that makes up a graphical user interface.
///
/// Widgets hold their own state, lay themselves out, record draw commands,
/// and react to pointer input delivered by the window host.
pub trait Widget: Send + Debug + 'static {
    /// Redraw the contents of this widget.
    fn redraw(&mut self, context: &mut GraphicsContext<'_>);

    /// Layout this widget and return the ideal size based on its contents and
    /// the `available_space`.
    #[allow(unused_variables)]
    fn layout(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        available_space.map(ConstraintLimit::min)
    }

    /// The widget has been mounted into a parent widget.
    #[allow(unused_variables)]
    fn mounted(&mut self, context: &mut EventContext) {}

    /// The widget has been removed from its parent widget.
    #[allow(unused_variables)]
    fn unmounted(&mut self, context: &mut EventContext) {}

    /// Returns true if this widget should respond to pointer input at
    /// `location`.
    #[allow(unused_variables)]
    fn hit_test(&mut self, location: Point<Px>, context: &mut EventContext) -> bool {
        false
    }

    /// The widget is being hovered by the cursor at `location`.
    #[allow(unused_variables)]
    fn hover(&mut self, location: Point<Px>, context: &mut EventContext) {}

    /// The widget is no longer being hovered.
    #[allow(unused_variables)]
    fn unhover(&mut self, context: &mut EventContext) {}

    /// The widget has become the active widget.
    #[allow(unused_variables)]
    fn activate(&mut self, context: &mut EventContext) {}

    /// The widget is no longer active.
    #[allow(unused_variables)]
    fn deactivate(&mut self, context: &mut EventContext) {}

    /// A mouse button was pressed at `location`. Returns whether the event
    /// has been handled or not.
    ///
    /// If the event is handled, this widget will receive
    /// [`mouse_drag`](Self::mouse_drag) and [`mouse_up`](Self::mouse_up)
    /// callbacks until the button is released.
    #[allow(unused_variables)]
    fn mouse_down(
        &mut self,
        location: Point<Px>,
        device_id: DeviceId,
        button: MouseButton,
        context: &mut EventContext,
    ) -> EventHandling {
        IGNORED
    }

    /// A mouse button is being held down as the cursor moves.
    #[allow(unused_variables)]
    fn mouse_drag(
        &mut self,
        location: Point<Px>,
        device_id: DeviceId,
        button: MouseButton,
        context: &mut EventContext,
    ) {
    }

    /// A mouse button is no longer being pressed.
    ///
    /// `location` is `None` when the cursor left the window while dragging.
    #[allow(unused_variables)]
    fn mouse_up(
        &mut self,
        location: Option<Point<Px>>,
        device_id: DeviceId,
        button: MouseButton,
        context: &mut EventContext,
    ) {
    }
}

/// A widget that has been boxed for dynamic dispatch and downcasting.
pub trait AnyWidget: Widget {
    /// Returns this widget as an [`Any`] reference.
    fn as_any(&self) -> &dyn Any;
    /// Returns this widget as an exclusive [`Any`] reference.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> AnyWidget for T
where
    T: Widget,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A marker type that indicates an event has been handled.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EventHandled;

/// A marker type that indicates an event was ignored.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EventIgnored;

/// Whether an event has been handled or ignored.
pub type EventHandling = ControlFlow<EventHandled, EventIgnored>;

/// An [`EventHandling`] value that indicates an event was handled.
pub const HANDLED: EventHandling = EventHandling::Break(EventHandled);

/// An [`EventHandling`] value that indicates an event was ignored.
pub const IGNORED: EventHandling = EventHandling::Continue(EventIgnored);

/// A function stored and invoked by widgets, such as a click handler.
pub struct Callback<T = (), R = ()>(Box<dyn CallbackFunction<T, R>>);

trait CallbackFunction<T, R>: Send {
    fn invoke(&mut self, value: T) -> R;
}

impl<T, R, F> CallbackFunction<T, R> for F
where
    F: FnMut(T) -> R + Send,
{
    fn invoke(&mut self, value: T) -> R {
        self(value)
    }
}

impl<T, R> Callback<T, R> {
    /// Returns a new callback wrapping `function`.
    pub fn new<F>(function: F) -> Self
    where
        F: FnMut(T) -> R + Send + 'static,
    {
        Self(Box::new(function))
    }

    /// Invokes the callback with `value`.
    pub fn invoke(&mut self, value: T) -> R {
        self.0.invoke(value)
    }
}

impl<T, R> Debug for Callback<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").finish()
    }
}

/// The unique identifier of a mounted or unmounted widget.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct WidgetId(u64);

impl WidgetId {
    pub(crate) fn unique() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A value of a passthrough attribute applied to a widget.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// A numeric value.
    Number(f64),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// An ordered collection of passthrough attributes, preserving insertion
/// order.
pub type Attributes = IndexMap<String, AttributeValue>;

/// An instance of a [`Widget`].
///
/// Instances are cheaply cloneable handles. The widget's state is shared:
/// locking an instance provides access to the underlying [`Widget`] type.
#[derive(Clone, Debug)]
pub struct WidgetInstance {
    id: WidgetId,
    styles: Styles,
    attributes: Arc<Attributes>,
    enabled: Value<bool>,
    widget: Arc<Mutex<Box<dyn AnyWidget>>>,
}

impl WidgetInstance {
    /// Returns an instance containing `widget`.
    pub fn new<W>(widget: W) -> Self
    where
        W: Widget,
    {
        Self {
            id: WidgetId::unique(),
            styles: Styles::new(),
            attributes: Arc::default(),
            enabled: Value::Constant(true),
            widget: Arc::new(Mutex::new(Box::new(widget))),
        }
    }

    /// Returns the unique id of this widget instance.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Associates a style component with this widget and returns self.
    #[must_use]
    pub fn with<C: ComponentDefinition>(mut self, name: &C, component: C::ComponentType) -> Self {
        self.styles = self.styles.with(name, component.into_component());
        self
    }

    /// Applies a passthrough attribute to this widget and returns self.
    ///
    /// Attributes are not interpreted; they are carried verbatim on the
    /// rendered control node for the embedding application to use.
    #[must_use]
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Arc::make_mut(&mut self.attributes).insert(name.into(), value.into());
        self
    }

    /// Sets the value to use for this widget's enabled status.
    ///
    /// A disabled widget does not respond to pointer input at all: the window
    /// host refuses to hit-test or deliver events to it.
    #[must_use]
    pub fn with_enabled(mut self, enabled: impl IntoValue<bool>) -> Self {
        self.enabled = enabled.into_value();
        self
    }

    /// The styles attached to this widget.
    #[must_use]
    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// The passthrough attributes attached to this widget.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the current enabled status of this widget.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    /// The enabled status value of this widget.
    #[must_use]
    pub fn enabled_value(&self) -> &Value<bool> {
        &self.enabled
    }

    /// Locks the widget for exclusive access.
    ///
    /// The widget must not already be locked by the current thread.
    #[must_use]
    pub fn lock(&self) -> WidgetGuard<'_> {
        WidgetGuard(self.widget.lock())
    }
}

impl PartialEq for WidgetInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WidgetInstance {}

/// Exclusive access to a [`WidgetInstance`]'s widget.
pub struct WidgetGuard<'a>(MutexGuard<'a, Box<dyn AnyWidget>>);

impl WidgetGuard<'_> {
    /// Returns a reference to the widget as type `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: Widget,
    {
        self.0.as_any().downcast_ref()
    }

    /// Returns an exclusive reference to the widget as type `T`, if it is
    /// one.
    #[must_use]
    pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Widget,
    {
        self.0.as_any_mut().downcast_mut()
    }

    pub(crate) fn widget_mut(&mut self) -> &mut dyn AnyWidget {
        &mut **self.0
    }
}

/// A type that can be converted into a [`WidgetInstance`].
pub trait MakeWidget: Sized {
    /// Returns a new widget instance.
    fn make_widget(self) -> WidgetInstance;

    /// Associates a style component with this widget.
    fn with<C: ComponentDefinition>(self, name: &C, component: C::ComponentType) -> WidgetInstance {
        self.make_widget().with(name, component)
    }

    /// Applies a passthrough attribute to this widget.
    fn attribute(
        self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> WidgetInstance {
        self.make_widget().attribute(name, value)
    }

    /// Returns this widget centered within the available space.
    fn centered(self) -> Align {
        Align::centered(self)
    }

    /// Chains `self` and `other` into a [`Children`] collection.
    fn and(self, other: impl MakeWidget) -> Children {
        Children::new().and(self).and(other)
    }
}

impl MakeWidget for WidgetInstance {
    fn make_widget(self) -> WidgetInstance {
        self
    }
}

impl MakeWidget for &str {
    fn make_widget(self) -> WidgetInstance {
        Label::new(self).make_widget()
    }
}

impl MakeWidget for String {
    fn make_widget(self) -> WidgetInstance {
        Label::new(self).make_widget()
    }
}

impl<T> MakeWidget for T
where
    T: Widget,
{
    fn make_widget(self) -> WidgetInstance {
        WidgetInstance::new(self)
    }
}

/// An ordered list of widgets.
#[derive(Debug, Default)]
pub struct Children(Vec<WidgetInstance>);

impl Children {
    /// Returns an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `widget` to the end of the list.
    pub fn push(&mut self, widget: impl MakeWidget) {
        self.0.push(widget.make_widget());
    }

    /// Adds `widget` to the end of the list and returns self.
    #[must_use]
    pub fn and(mut self, widget: impl MakeWidget) -> Self {
        self.push(widget);
        self
    }

    /// Returns the number of widgets in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a stack that lays these children out as vertical rows.
    #[must_use]
    pub fn into_rows(self) -> Stack {
        Stack::rows(self)
    }

    /// Returns a stack that lays these children out as horizontal columns.
    #[must_use]
    pub fn into_columns(self) -> Stack {
        Stack::columns(self)
    }
}

impl IntoIterator for Children {
    type IntoIter = std::vec::IntoIter<WidgetInstance>;
    type Item = WidgetInstance;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<WidgetInstance> for Children {
    fn from_iter<T: IntoIterator<Item = WidgetInstance>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A child widget that mounts into the tree the first time
/// [`mounted`](Self::mounted) is called, usually from the parent's own
/// mounted callback.
#[derive(Debug)]
pub enum WidgetRef {
    /// A widget that has not been mounted yet.
    Unmounted(WidgetInstance),
    /// A widget that has been mounted under its parent.
    Mounted(MountedWidget),
}

impl WidgetRef {
    /// Returns a new reference to `widget`.
    pub fn new(widget: impl MakeWidget) -> Self {
        Self::Unmounted(widget.make_widget())
    }

    /// Returns the mounted widget, mounting it under the context's widget if
    /// needed.
    pub fn mounted(&mut self, context: &mut EventContext) -> MountedWidget {
        if let WidgetRef::Unmounted(instance) = self {
            let mounted = context.push_child(instance.clone());
            *self = WidgetRef::Mounted(mounted);
        }

        match self {
            WidgetRef::Mounted(mounted) => mounted.clone(),
            WidgetRef::Unmounted(_) => unreachable!("mounted above"),
        }
    }

    /// Returns the mounted widget, if [`mounted`](Self::mounted) has been
    /// called.
    #[must_use]
    pub fn as_mounted(&self) -> Option<&MountedWidget> {
        match self {
            WidgetRef::Unmounted(_) => None,
            WidgetRef::Mounted(mounted) => Some(mounted),
        }
    }

    /// Returns the underlying widget instance.
    #[must_use]
    pub fn widget(&self) -> &WidgetInstance {
        match self {
            WidgetRef::Unmounted(instance) => instance,
            WidgetRef::Mounted(mounted) => mounted.instance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_apply_verbatim_in_order() {
        let widget = Label::new("ok")
            .attribute("data-testid", "confirm")
            .attribute("aria-label", "Confirm")
            .attribute("tab-index", 3.0);
        let attributes = widget.attributes();
        assert_eq!(
            attributes.get("data-testid"),
            Some(&AttributeValue::String("confirm".to_string()))
        );
        let keys: Vec<_> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["data-testid", "aria-label", "tab-index"]);
    }

    #[test]
    fn instances_compare_by_identity() {
        let a = Label::new("x").make_widget();
        let b = Label::new("x").make_widget();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
