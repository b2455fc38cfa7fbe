//! A clickable, labeled button with ripple feedback.

use figures::units::{Px, UPx};
use figures::{FloatConversion, IntoUnsigned, Point, Rect, Size};

use crate::animation::{AnimationHandle, IntoAnimate, Spawn, ZeroToOne};
use crate::context::{EventContext, GraphicsContext, LayoutContext, WidgetContext};
use crate::graphics::{measure_text, Color};
use crate::styles::components::{
    ButtonActiveBackground, ButtonBackground, ButtonCornerRadius, ButtonDisabledBackground,
    ButtonDisabledForeground, ButtonForeground, ButtonHoverBackground, ButtonMinimumHeight,
    ButtonMinimumWidth, ColorTransitionDuration, Easing, HorizontalPadding, RippleColor,
    RippleDuration, RippleEasing, RippleTerminalScale, VerticalPadding,
};
use crate::value::{Dynamic, IntoValue, Value};
use crate::widget::{Callback, EventHandling, Widget, HANDLED};
use crate::window::{DeviceId, MouseButton};
use crate::ConstraintLimit;

/// The submission role a button advertises to the embedding application.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonKind {
    /// A plain button that never triggers a submission.
    #[default]
    Button,
    /// A button that submits the enclosing form.
    Submit,
    /// A button that resets the enclosing form.
    Reset,
}

impl ButtonKind {
    /// Returns the conventional name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ButtonKind::Button => "button",
            ButtonKind::Submit => "submit",
            ButtonKind::Reset => "reset",
        }
    }
}

/// The geometry of one ripple burst, in the control's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    /// The top-left corner of the square the ripple is inscribed in.
    pub origin: Point<Px>,
    /// The diameter of the fully-scaled ripple.
    pub diameter: Px,
}

impl Ripple {
    /// Computes the ripple for a click at `location` within a control of
    /// `size`.
    ///
    /// The diameter is the larger of the control's dimensions so that the
    /// burst covers the control no matter where the click lands, and the
    /// origin is offset by the radius so the burst is centered on the click
    /// point. A zero-sized control produces a zero-diameter ripple.
    #[must_use]
    pub fn for_click(size: Size<Px>, location: Point<Px>) -> Self {
        let diameter = size.width.max(size.height);
        let radius = diameter / 2;
        Self {
            origin: location - Point::new(radius, radius),
            diameter,
        }
    }

    /// The center of the ripple: the point that was clicked.
    #[must_use]
    pub fn center(&self) -> Point<Px> {
        self.origin + Point::new(self.diameter / 2, self.diameter / 2)
    }
}

/// A clickable push button that plays an expanding, fading ripple from the
/// pointer position on each completed click.
///
/// The ripple is a single slot of declarative state: `Some(geometry)` while a
/// burst is on screen, `None` otherwise. A click that lands while a burst is
/// still in flight replaces it. The expansion animation ends with a
/// completion step that clears the slot, and cancelling the animation (by
/// pre-emption or unmount) drops that step along with it.
#[derive(Debug)]
pub struct RippleButton {
    /// The text displayed on the button.
    pub label: Value<String>,
    /// The callback invoked each time the button is clicked, regardless of
    /// whether a ripple plays.
    pub on_click: Option<Callback<()>>,
    /// The enabled state of the button. A disabled button does not respond to
    /// pointer input at all.
    pub enabled: Value<bool>,
    /// Suppresses ripple playback while leaving the button interactive.
    pub disable_ripple: Value<bool>,
    /// The submission role of the button.
    pub kind: Value<ButtonKind>,
    currently_enabled: bool,
    buttons_pressed: usize,
    background_color: Option<Dynamic<Color>>,
    color_animation: AnimationHandle,
    ripple: Dynamic<Option<Ripple>>,
    ripple_progress: Dynamic<ZeroToOne>,
    ripple_animation: AnimationHandle,
}

impl RippleButton {
    /// The label rendered when none is provided.
    pub const DEFAULT_LABEL: &'static str = "button";

    /// Returns a button with the default label.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: Value::Constant(Self::DEFAULT_LABEL.to_string()),
            on_click: None,
            enabled: Value::Constant(true),
            disable_ripple: Value::Constant(false),
            kind: Value::Constant(ButtonKind::Button),
            currently_enabled: true,
            buttons_pressed: 0,
            background_color: None,
            color_animation: AnimationHandle::new(),
            ripple: Dynamic::new(None),
            ripple_progress: Dynamic::new(ZeroToOne::ZERO),
            ripple_animation: AnimationHandle::new(),
        }
    }

    /// Sets the button's label and returns self.
    #[must_use]
    pub fn label(mut self, label: impl IntoValue<String>) -> Self {
        self.label = label.into_value();
        self
    }

    /// Sets the `on_click` callback and returns self.
    ///
    /// This callback is invoked each time the button is clicked, even when
    /// ripples are suppressed.
    #[must_use]
    pub fn on_click<F>(mut self, callback: F) -> Self
    where
        F: FnMut(()) + Send + 'static,
    {
        self.on_click = Some(Callback::new(callback));
        self
    }

    /// Sets the value to use for the button's enabled status and returns
    /// self.
    #[must_use]
    pub fn enabled(mut self, enabled: impl IntoValue<bool>) -> Self {
        self.enabled = enabled.into_value();
        self.currently_enabled = self.enabled.get();
        self
    }

    /// Sets whether ripple playback is suppressed and returns self.
    #[must_use]
    pub fn disable_ripple(mut self, disable_ripple: impl IntoValue<bool>) -> Self {
        self.disable_ripple = disable_ripple.into_value();
        self
    }

    /// Sets the submission role of the button and returns self.
    #[must_use]
    pub fn kind(mut self, kind: impl IntoValue<ButtonKind>) -> Self {
        self.kind = kind.into_value();
        self
    }

    /// The geometry of the ripple currently on screen, if one is.
    #[must_use]
    pub fn current_ripple(&self) -> Option<Ripple> {
        self.ripple.get()
    }

    /// The submission role currently in effect.
    #[must_use]
    pub fn effective_kind(&self) -> ButtonKind {
        self.kind.get()
    }

    fn invoke_on_click(&mut self) {
        if self.enabled.get() {
            if let Some(on_click) = self.on_click.as_mut() {
                on_click.invoke(());
            }
        }
    }

    fn play_ripple(&mut self, location: Point<Px>, context: &mut EventContext) {
        if self.disable_ripple.get() {
            return;
        }

        let size = context
            .last_layout()
            .map(|layout| layout.size)
            .unwrap_or_default();
        let ripple = Ripple::for_click(size, location);
        tracing::debug!(?ripple, "ripple started");
        self.ripple_progress.set(ZeroToOne::ZERO);
        self.ripple.set(Some(ripple));

        let slot = self.ripple.downgrade();
        // Replacing the handle pre-empts a ripple still in flight, cancelling
        // its completion step along with it.
        self.ripple_animation = self
            .ripple_progress
            .transition_to(ZeroToOne::ONE)
            .over(context.get(&RippleDuration))
            .with_easing(context.get(&RippleEasing))
            .on_complete(move || {
                // The button may be gone by the time the burst finishes.
                if let Some(ripple) = slot.upgrade() {
                    ripple.set(None);
                }
            })
            .spawn(context.animations());
    }

    fn update_colors(&mut self, context: &WidgetContext, immediate: bool) {
        let background = if !self.enabled.get() {
            context.get(&ButtonDisabledBackground)
        } else if context.active() {
            context.get(&ButtonActiveBackground)
        } else if context.hovered() {
            context.get(&ButtonHoverBackground)
        } else {
            context.get(&ButtonBackground)
        };

        match (immediate, &self.background_color) {
            (false, Some(current)) => {
                self.color_animation = current
                    .transition_to(background)
                    .over(context.get(&ColorTransitionDuration))
                    .with_easing(context.get(&Easing))
                    .spawn(context.animations());
            }
            (true, Some(current)) => {
                current.set(background);
                self.color_animation.clear();
            }
            (_, None) => {
                self.background_color = Some(Dynamic::new(background));
            }
        }
    }

    fn current_background(&mut self, context: &WidgetContext) -> Color {
        if self.background_color.is_none() {
            self.update_colors(context, true);
        }

        let background = self.background_color.as_ref().expect("always initialized");
        context.redraw_when_changed(background);
        background.get()
    }
}

impl Default for RippleButton {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for RippleButton {
    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        let enabled = self.enabled.get();
        if self.currently_enabled != enabled {
            self.update_colors(context, false);
            self.currently_enabled = enabled;
        }

        if let Value::Dynamic(enabled) = &self.enabled {
            context.redraw_when_changed(enabled);
        }
        if let Value::Dynamic(label) = &self.label {
            context.redraw_when_changed(label);
        }
        context.redraw_when_changed(&self.ripple);
        context.redraw_when_changed(&self.ripple_progress);

        let background = self.current_background(context);
        context
            .gfx
            .fill_rounded(background, context.get(&ButtonCornerRadius));

        let foreground = if enabled {
            context.get(&ButtonForeground)
        } else {
            context.get(&ButtonDisabledForeground)
        };
        let center = Point::from(context.gfx.size()) / 2;
        self.label
            .map(|label| context.gfx.draw_text(label, foreground, center));

        if let Some(ripple) = self.ripple.get() {
            let progress = self.ripple_progress.get();
            let scale = *progress * context.get(&RippleTerminalScale);
            let radius = ripple.diameter.into_float() / 2. * scale;
            let color = context
                .get(&RippleColor)
                .with_alpha_scaled(*progress.one_minus());
            #[allow(clippy::cast_possible_truncation)]
            let radius = Px::new(radius.round() as i32);
            // The ripple is clipped to the control's bounds by the region
            // this widget draws into.
            context.gfx.draw_circle(ripple.center(), radius, color);
        }
    }

    fn layout(
        &mut self,
        _available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        let horizontal = context.get(&HorizontalPadding).into_unsigned();
        let vertical = context.get(&VerticalPadding).into_unsigned();
        let content = self.label.map(|label| measure_text(label));
        Size::new(
            (content.width + horizontal * 2).max(context.get(&ButtonMinimumWidth).into_unsigned()),
            (content.height + vertical * 2).max(context.get(&ButtonMinimumHeight).into_unsigned()),
        )
    }

    fn hit_test(&mut self, _location: Point<Px>, _context: &mut EventContext) -> bool {
        // A disabled control does not respond to pointer input at all.
        self.enabled.get()
    }

    fn hover(&mut self, _location: Point<Px>, context: &mut EventContext) {
        self.update_colors(context, false);
    }

    fn unhover(&mut self, context: &mut EventContext) {
        self.update_colors(context, false);
    }

    fn activate(&mut self, context: &mut EventContext) {
        self.update_colors(context, true);
    }

    fn deactivate(&mut self, context: &mut EventContext) {
        self.update_colors(context, false);
    }

    fn mouse_down(
        &mut self,
        _location: Point<Px>,
        _device_id: DeviceId,
        _button: MouseButton,
        context: &mut EventContext,
    ) -> EventHandling {
        self.buttons_pressed += 1;
        context.activate();
        HANDLED
    }

    fn mouse_drag(
        &mut self,
        location: Point<Px>,
        _device_id: DeviceId,
        _button: MouseButton,
        context: &mut EventContext,
    ) {
        let changed = if Rect::from(context.last_layout().expect("must have been rendered").size)
            .contains(location)
        {
            context.activate()
        } else {
            context.deactivate()
        };

        if changed {
            context.set_needs_redraw();
        }
    }

    fn mouse_up(
        &mut self,
        location: Option<Point<Px>>,
        _device_id: DeviceId,
        _button: MouseButton,
        context: &mut EventContext,
    ) {
        self.buttons_pressed -= 1;
        if self.buttons_pressed == 0 {
            context.deactivate();

            if let Some(location) = location {
                // The control may have been disabled while the button was
                // held down.
                if self.enabled.get()
                    && Rect::from(context.last_layout().expect("must have been rendered").size)
                        .contains(location)
                {
                    tracing::debug!("button clicked");
                    self.play_ripple(location, context);
                    self.invoke_on_click();
                }
            }
        }
    }

    fn unmounted(&mut self, _context: &mut EventContext) {
        // Cancel any in-flight animations and clear the slot so nothing
        // lingers past the control.
        self.ripple_animation.clear();
        self.color_animation.clear();
        self.ripple.set(None);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use figures::Zero;

    use super::*;
    use crate::graphics::DrawCommand;
    use crate::widget::MakeWidget;
    use crate::window::{CursorIcon, Window};

    fn window_size() -> Size<UPx> {
        Size::new(UPx::new(200), UPx::new(100))
    }

    #[test]
    fn click_geometry_matches_pointer() {
        // "Go" measures 16x16; with padding the control is 48x32, centered in
        // a 200x100 window at (76, 34).
        let button = RippleButton::new().label("Go").make_widget();
        let mut window = Window::new(button.clone().centered(), window_size());

        let control = window.layout_in_window(button.id()).expect("laid out");
        assert_eq!(control.origin, Point::new(Px::new(76), Px::new(34)));

        let click = Point::new(Px::new(100), Px::new(50));
        window.click(click);

        let guard = button.lock();
        let ripple = guard
            .downcast_ref::<RippleButton>()
            .expect("button")
            .current_ripple()
            .expect("ripple present after click");
        let diameter = control.size.width.max(control.size.height);
        assert_eq!(ripple.diameter, diameter);
        assert_eq!(
            ripple.origin,
            click - control.origin - Point::new(diameter / 2, diameter / 2)
        );
        // The burst stays centered on the click point in window coordinates.
        assert_eq!(ripple.center() + control.origin, click);
    }

    #[test]
    fn zero_size_control_degrades_to_zero_diameter() {
        let ripple = Ripple::for_click(Size::ZERO, Point::ZERO);
        assert_eq!(ripple.diameter, Px::ZERO);
        assert_eq!(ripple.origin, Point::ZERO);
    }

    #[test]
    fn ripple_removed_after_duration_elapses() {
        let button = RippleButton::new().make_widget();
        let mut window = Window::new(button.clone().centered(), window_size());
        window.click(Point::new(Px::new(100), Px::new(50)));

        assert!(button
            .lock()
            .downcast_ref::<RippleButton>()
            .expect("button")
            .current_ripple()
            .is_some());

        window.advance(Duration::from_millis(750));
        assert!(button
            .lock()
            .downcast_ref::<RippleButton>()
            .expect("button")
            .current_ripple()
            .is_none());
        assert_eq!(window.animations().running(), 0);
    }

    #[test]
    fn disabled_button_never_ripples() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let button = RippleButton::new()
            .enabled(false)
            .on_click({
                let clicks = clicks.clone();
                move |()| {
                    clicks.fetch_add(1, Ordering::Relaxed);
                }
            })
            .make_widget();
        let mut window = Window::new(button.clone().centered(), window_size());
        window.click(Point::new(Px::new(100), Px::new(50)));

        assert!(button
            .lock()
            .downcast_ref::<RippleButton>()
            .expect("button")
            .current_ripple()
            .is_none());
        assert_eq!(clicks.load(Ordering::Relaxed), 0);
        assert_eq!(window.animations().running(), 0);
    }

    #[test]
    fn instance_disabled_button_receives_no_events() {
        let button = RippleButton::new().make_widget().with_enabled(false);
        let mut window = Window::new(button.clone().centered(), window_size());
        window.click(Point::new(Px::new(100), Px::new(50)));

        assert!(button
            .lock()
            .downcast_ref::<RippleButton>()
            .expect("button")
            .current_ripple()
            .is_none());
        // The cursor never signals clickability over an inert control.
        assert_eq!(window.cursor_icon(), CursorIcon::Default);
    }

    #[test]
    fn suppressed_ripple_still_invokes_click_handler() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let button = RippleButton::new()
            .disable_ripple(true)
            .on_click({
                let clicks = clicks.clone();
                move |()| {
                    clicks.fetch_add(1, Ordering::Relaxed);
                }
            })
            .make_widget();
        let mut window = Window::new(button.clone().centered(), window_size());
        window.click(Point::new(Px::new(100), Px::new(50)));

        assert_eq!(clicks.load(Ordering::Relaxed), 1);
        assert!(button
            .lock()
            .downcast_ref::<RippleButton>()
            .expect("button")
            .current_ripple()
            .is_none());
        // Once the background transition settles, nothing else is animating.
        window.advance(Duration::from_millis(250));
        assert_eq!(window.animations().running(), 0);
    }

    #[test]
    fn omitted_label_renders_the_default() {
        let mut window = Window::new(RippleButton::new().centered(), window_size());
        let frame = window.redraw();
        assert!(frame.commands().iter().any(|placed| matches!(
            &placed.command,
            DrawCommand::Text { text, .. } if text == "button"
        )));

        let mut window = Window::new(
            RippleButton::new().label("Go").centered(),
            window_size(),
        );
        let frame = window.redraw();
        assert!(frame.commands().iter().any(|placed| matches!(
            &placed.command,
            DrawCommand::Text { text, .. } if text == "Go"
        )));
    }

    #[test]
    fn ripple_draws_clipped_to_the_control() {
        let button = RippleButton::new().make_widget();
        let mut window = Window::new(button.clone().centered(), window_size());
        let click = Point::new(Px::new(100), Px::new(50));
        window.click(click);
        window.advance(Duration::from_millis(100));

        let control = window.layout_in_window(button.id()).expect("laid out");
        let frame = window.frame();
        let circle = frame
            .commands()
            .iter()
            .find(|placed| matches!(placed.command, DrawCommand::Circle { .. }))
            .expect("ripple drawn");
        assert_eq!(circle.clip, control);
        let DrawCommand::Circle { center, radius, .. } = &circle.command else {
            unreachable!("matched above")
        };
        assert_eq!(*center, click);
        assert!(*radius > Px::ZERO);
    }

    #[test]
    fn new_click_preempts_inflight_ripple() {
        let button = RippleButton::new().make_widget();
        let mut window = Window::new(button.clone().centered(), window_size());
        window.click(Point::new(Px::new(90), Px::new(45)));
        window.advance(Duration::from_millis(100));
        let second_click = Point::new(Px::new(110), Px::new(55));
        window.click(second_click);
        window.advance(Duration::from_millis(16));

        // One slot: the second burst replaced the first.
        let circles = window
            .frame()
            .commands()
            .iter()
            .filter(|placed| matches!(placed.command, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 1);

        let control = window.layout_in_window(button.id()).expect("laid out");
        let guard = button.lock();
        let button = guard.downcast_ref::<RippleButton>().expect("button");
        assert_eq!(
            button.current_ripple(),
            Some(Ripple::for_click(
                control.size,
                second_click - control.origin
            ))
        );
    }

    #[test]
    fn default_configuration() {
        let button = RippleButton::new();
        assert_eq!(button.label.get(), RippleButton::DEFAULT_LABEL);
        assert_eq!(button.effective_kind(), ButtonKind::Button);
        assert!(!button.disable_ripple.get());
        assert!(button.enabled.get());
        assert_eq!(ButtonKind::Submit.as_str(), "submit");
    }
}
