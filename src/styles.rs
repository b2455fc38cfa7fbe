//! Types for styling widgets.
//!
//! Every color, dimension, duration, and easing a widget draws with is a
//! named *style component* with a built-in default. A widget looks its
//! components up through [`WidgetContext::get`](crate::context::WidgetContext::get),
//! which consults the styles attached to the widget and its ancestors before
//! falling back to the component's default. Theming never requires touching
//! widget logic.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use figures::units::Px;

use crate::animation::EasingFunction;
use crate::graphics::Color;

pub mod components;

/// The name of a style component, scoped by a group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ComponentName {
    /// The group this component belongs to, e.g. `"button"`.
    pub group: &'static str,
    /// The name of the component within its group.
    pub name: &'static str,
}

impl ComponentName {
    /// Returns a new name in `group`.
    #[must_use]
    pub const fn new(group: &'static str, name: &'static str) -> Self {
        Self { group, name }
    }
}

impl NamedComponent for ComponentName {
    fn name(&self) -> ComponentName {
        *self
    }
}

/// A value stored in a [`Styles`] collection.
#[derive(Clone, Debug)]
pub enum Component {
    /// A color.
    Color(Color),
    /// A pixel dimension.
    Px(Px),
    /// A duration.
    Duration(Duration),
    /// A floating point factor.
    Float(f32),
    /// An easing function.
    Easing(EasingFunction),
}

impl From<Color> for Component {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Px> for Component {
    fn from(value: Px) -> Self {
        Self::Px(value)
    }
}

impl From<Duration> for Component {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl From<f32> for Component {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<EasingFunction> for Component {
    fn from(value: EasingFunction) -> Self {
        Self::Easing(value)
    }
}

/// A Rust type that can be stored in and extracted from a [`Component`].
pub trait ComponentType: Sized {
    /// Stores this value in a [`Component`].
    fn into_component(self) -> Component;
    /// Extracts this type from `component`, if it contains a matching value.
    fn try_from_component(component: &Component) -> Option<Self>;
}

impl ComponentType for Color {
    fn into_component(self) -> Component {
        Component::Color(self)
    }

    fn try_from_component(component: &Component) -> Option<Self> {
        match component {
            Component::Color(color) => Some(*color),
            _ => None,
        }
    }
}

impl ComponentType for Px {
    fn into_component(self) -> Component {
        Component::Px(self)
    }

    fn try_from_component(component: &Component) -> Option<Self> {
        match component {
            Component::Px(px) => Some(*px),
            _ => None,
        }
    }
}

impl ComponentType for Duration {
    fn into_component(self) -> Component {
        Component::Duration(self)
    }

    fn try_from_component(component: &Component) -> Option<Self> {
        match component {
            Component::Duration(duration) => Some(*duration),
            _ => None,
        }
    }
}

impl ComponentType for f32 {
    fn into_component(self) -> Component {
        Component::Float(self)
    }

    fn try_from_component(component: &Component) -> Option<Self> {
        match component {
            Component::Float(float) => Some(*float),
            _ => None,
        }
    }
}

impl ComponentType for EasingFunction {
    fn into_component(self) -> Component {
        Component::Easing(self)
    }

    fn try_from_component(component: &Component) -> Option<Self> {
        match component {
            Component::Easing(easing) => Some(easing.clone()),
            _ => None,
        }
    }
}

/// A type that has a [`ComponentName`].
pub trait NamedComponent {
    /// Returns the name of this component.
    fn name(&self) -> ComponentName;
}

/// A style component with a strongly typed value and a default.
pub trait ComponentDefinition: NamedComponent {
    /// The type of the component's value.
    type ComponentType: ComponentType;

    /// Returns the value used when no style provides this component.
    fn default_value(&self) -> Self::ComponentType;
}

/// A collection of style components organized by name.
///
/// Cloning is cheap: the contents are shared until mutated.
#[derive(Clone, Debug, Default)]
pub struct Styles(Arc<AHashMap<ComponentName, Component>>);

impl Styles {
    /// Returns an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a component value using the name provided.
    pub fn insert(&mut self, name: &impl NamedComponent, component: impl Into<Component>) {
        Arc::make_mut(&mut self.0).insert(name.name(), component.into());
    }

    /// Adds a component value for the name provided and returns self.
    #[must_use]
    pub fn with(mut self, name: &impl NamedComponent, component: impl Into<Component>) -> Self {
        self.insert(name, component);
        self
    }

    /// Returns the stored component for the given name, if present.
    #[must_use]
    pub fn get<Named>(&self, component: &Named) -> Option<&Component>
    where
        Named: NamedComponent + ?Sized,
    {
        self.0.get(&component.name())
    }

    /// Returns the typed value for `component`, or its default if this
    /// collection does not provide one (or provides one of the wrong type).
    #[must_use]
    pub fn get_or_default<Named>(&self, component: &Named) -> Named::ComponentType
    where
        Named: ComponentDefinition + ?Sized,
    {
        self.get(component)
            .and_then(Named::ComponentType::try_from_component)
            .unwrap_or_else(|| component.default_value())
    }

    /// Returns true if no components are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Defines unit structs implementing [`ComponentDefinition`] for a group of
/// named style components.
#[macro_export]
macro_rules! define_components {
    ($group:literal { $($(#[$meta:meta])* $name:ident($type:ty, $component_name:literal, $default:expr);)+ }) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Eq, PartialEq)]
            pub struct $name;

            impl $crate::styles::NamedComponent for $name {
                fn name(&self) -> $crate::styles::ComponentName {
                    $crate::styles::ComponentName::new($group, $component_name)
                }
            }

            impl $crate::styles::ComponentDefinition for $name {
                type ComponentType = $type;

                fn default_value(&self) -> $type {
                    $default
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::components::{ButtonBackground, RippleTerminalScale, TextColor};
    use super::*;

    #[test]
    fn defaults_resolve_when_unset() {
        let styles = Styles::new();
        assert!(styles.is_empty());
        assert_eq!(styles.get_or_default(&TextColor), Color::WHITE);
        assert_eq!(
            styles.get_or_default(&ButtonBackground),
            Color::new(0x4E, 0x34, 0x2E, 255)
        );
    }

    #[test]
    fn inserted_components_override_defaults() {
        let styles = Styles::new()
            .with(&ButtonBackground, Color::BLACK)
            .with(&RippleTerminalScale, 2.0);
        assert_eq!(styles.get_or_default(&ButtonBackground), Color::BLACK);
        assert_eq!(styles.get_or_default(&RippleTerminalScale), 2.0);
        // Unrelated components still fall back to their defaults.
        assert_eq!(styles.get_or_default(&TextColor), Color::WHITE);
    }

    #[test]
    fn clones_share_until_mutated() {
        let a = Styles::new().with(&ButtonBackground, Color::BLACK);
        let mut b = a.clone();
        b.insert(&TextColor, Color::BLACK);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
    }
}
