//! Named style components and their default values.
//!
//! The defaults describe the kit's stock look: a warm-brown control with
//! white text and a semi-transparent white ripple.

use std::time::Duration;

use figures::units::Px;

use crate::animation::easings::CubicBezier;
use crate::animation::EasingFunction;
use crate::define_components;
use crate::graphics::Color;

define_components! { "widget" {
    /// The color of text content.
    TextColor(Color, "text_color", Color::WHITE);
    /// The easing applied to color transitions.
    Easing(EasingFunction, "easing", EasingFunction::from(CubicBezier::EASE));
    /// The gap between children in layout widgets.
    LayoutGap(Px, "layout_gap", Px::new(16));
    /// The horizontal padding between a control's content and its edges.
    HorizontalPadding(Px, "horizontal_padding", Px::new(16));
    /// The vertical padding between a control's content and its edges.
    VerticalPadding(Px, "vertical_padding", Px::new(8));
} }

define_components! { "button" {
    /// The background color of the button.
    ButtonBackground(Color, "background_color", Color::new(0x4E, 0x34, 0x2E, 255));
    /// The background color of the button while the cursor hovers it.
    ButtonHoverBackground(Color, "hover_background_color", Color::new(0x36, 0x24, 0x20, 255));
    /// The background color of the button while it is pressed.
    ButtonActiveBackground(Color, "active_background_color", Color::new(0x2B, 0x1D, 0x1A, 255));
    /// The background color of the button while it is disabled.
    ButtonDisabledBackground(Color, "disabled_background_color", Color::new(0x71, 0x5C, 0x57, 102));
    /// The color of the button's label.
    ButtonForeground(Color, "foreground_color", Color::WHITE);
    /// The color of the button's label while it is disabled.
    ButtonDisabledForeground(Color, "disabled_foreground_color", Color::WHITE.with_alpha(153));
    /// The corner radius of the button's fill.
    ButtonCornerRadius(Px, "corner_radius", Px::new(4));
    /// The minimum width of the button.
    ButtonMinimumWidth(Px, "minimum_width", Px::new(40));
    /// The minimum height of the button.
    ButtonMinimumHeight(Px, "minimum_height", Px::new(28));
    /// How long background color changes take.
    ColorTransitionDuration(Duration, "color_transition_duration", Duration::from_millis(200));
    /// The fill color of the ripple overlay.
    RippleColor(Color, "ripple_color", Color::WHITE.with_alpha(77));
    /// How long a ripple takes to expand and fade.
    RippleDuration(Duration, "ripple_duration", Duration::from_millis(700));
    /// The scale, relative to the ripple's diameter, the ripple grows to
    /// before disappearing.
    RippleTerminalScale(f32, "ripple_terminal_scale", 1.5);
    /// The easing applied to the ripple's expansion.
    RippleEasing(EasingFunction, "ripple_easing", EasingFunction::from(CubicBezier::EASE));
} }
