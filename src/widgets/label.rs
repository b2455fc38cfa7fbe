//! A read-only text widget.

use figures::units::UPx;
use figures::{Point, Size};

use crate::context::{GraphicsContext, LayoutContext};
use crate::graphics::measure_text;
use crate::styles::components::TextColor;
use crate::value::{IntoValue, Value};
use crate::widget::Widget;
use crate::ConstraintLimit;

/// A widget that displays a line of text.
#[derive(Debug)]
pub struct Label {
    /// The text to display.
    pub contents: Value<String>,
}

impl Label {
    /// Returns a label that displays `contents`.
    pub fn new(contents: impl IntoValue<String>) -> Self {
        Self {
            contents: contents.into_value(),
        }
    }
}

impl Widget for Label {
    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        if let Value::Dynamic(contents) = &self.contents {
            context.redraw_when_changed(contents);
        }
        let color = context.get(&TextColor);
        let center = Point::from(context.gfx.size()) / 2;
        self.contents
            .map(|contents| context.gfx.draw_text(contents, color, center));
    }

    fn layout(
        &mut self,
        _available_space: Size<ConstraintLimit>,
        _context: &mut LayoutContext,
    ) -> Size<UPx> {
        self.contents.map(|contents| measure_text(contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dynamic;

    #[test]
    fn contents_accept_dynamics() {
        let contents = Dynamic::from("a");
        let label = Label::new(&contents);
        assert_eq!(label.contents.get(), "a");
        contents.set("b".to_string());
        assert_eq!(label.contents.get(), "b");
    }
}
