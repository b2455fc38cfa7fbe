//! A widget that centers its child within the space it is given.

use figures::units::{Px, UPx};
use figures::{IntoSigned, Point, Rect, Size};

use crate::context::{EventContext, GraphicsContext, LayoutContext};
use crate::widget::{MakeWidget, Widget, WidgetRef};
use crate::ConstraintLimit;

/// A widget that fills the available space and centers its child within it.
#[derive(Debug)]
pub struct Align {
    child: WidgetRef,
}

impl Align {
    /// Returns a widget that centers `child`.
    pub fn centered(child: impl MakeWidget) -> Self {
        Self {
            child: WidgetRef::new(child),
        }
    }
}

impl Widget for Align {
    fn mounted(&mut self, context: &mut EventContext) {
        self.child.mounted(context);
    }

    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        let child = self.child.as_mounted().expect("mounted").clone();
        context.for_other(&child).redraw();
    }

    fn layout(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        let child = self.child.as_mounted().expect("mounted").clone();
        let full = available_space.map(ConstraintLimit::max);
        let child_size = context
            .for_other(&child)
            .layout(full.map(ConstraintLimit::ClippedAfter));

        let offset = Point::new(
            centering_offset(full.width, child_size.width),
            centering_offset(full.height, child_size.height),
        );
        context.set_child_layout(&child, Rect::new(offset, child_size.into_signed()));

        full
    }
}

fn centering_offset(available: UPx, content: UPx) -> Px {
    (available.into_signed() - content.into_signed()) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_center_content() {
        assert_eq!(
            centering_offset(UPx::new(100), UPx::new(40)),
            Px::new(30)
        );
        // Oversized content hangs off both edges evenly.
        assert_eq!(
            centering_offset(UPx::new(40), UPx::new(100)),
            Px::new(-30)
        );
    }
}
