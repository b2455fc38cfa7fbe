//! A widget that lays out its children as a horizontal or vertical flow with
//! a gap between them.

use figures::units::UPx;
use figures::{IntoSigned, IntoUnsigned, Point, Rect, Size, Zero};

use crate::context::{EventContext, GraphicsContext, LayoutContext};
use crate::styles::components::LayoutGap;
use crate::widget::{Children, Widget, WidgetRef};
use crate::ConstraintLimit;

/// The direction a [`Stack`] lays its children out in.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StackDirection {
    /// Children flow top to bottom.
    Rows,
    /// Children flow left to right.
    Columns,
}

/// A widget that sizes itself to its children, placing them sequentially
/// along one axis and centering them on the other.
#[derive(Debug)]
pub struct Stack {
    direction: StackDirection,
    children: Vec<WidgetRef>,
}

impl Stack {
    /// Returns a stack that lays out `children` as rows.
    #[must_use]
    pub fn rows(children: Children) -> Self {
        Self::new(StackDirection::Rows, children)
    }

    /// Returns a stack that lays out `children` as columns.
    #[must_use]
    pub fn columns(children: Children) -> Self {
        Self::new(StackDirection::Columns, children)
    }

    /// Returns a stack laying out `children` in `direction`.
    #[must_use]
    pub fn new(direction: StackDirection, children: Children) -> Self {
        Self {
            direction,
            children: children.into_iter().map(WidgetRef::Unmounted).collect(),
        }
    }
}

impl Widget for Stack {
    fn mounted(&mut self, context: &mut EventContext) {
        for child in &mut self.children {
            child.mounted(context);
        }
    }

    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        for child in &self.children {
            let child = child.as_mounted().expect("mounted").clone();
            context.for_other(&child).redraw();
        }
    }

    fn layout(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        let gap = context.get(&LayoutGap).into_unsigned();
        let child_constraints = available_space
            .map(ConstraintLimit::max)
            .map(ConstraintLimit::ClippedAfter);

        let mut main = UPx::ZERO;
        let mut cross = UPx::ZERO;
        let mut placements = Vec::with_capacity(self.children.len());
        for (index, child) in self.children.iter().enumerate() {
            let child = child.as_mounted().expect("mounted").clone();
            let size = context.for_other(&child).layout(child_constraints);
            if index > 0 {
                main += gap;
            }
            placements.push((child, main, size));
            main += match self.direction {
                StackDirection::Rows => size.height,
                StackDirection::Columns => size.width,
            };
            cross = cross.max(match self.direction {
                StackDirection::Rows => size.width,
                StackDirection::Columns => size.height,
            });
        }

        for (child, offset, size) in placements {
            let center = (cross.into_signed()
                - match self.direction {
                    StackDirection::Rows => size.width,
                    StackDirection::Columns => size.height,
                }
                .into_signed())
                / 2;
            let origin = match self.direction {
                StackDirection::Rows => Point::new(center, offset.into_signed()),
                StackDirection::Columns => Point::new(offset.into_signed(), center),
            };
            context.set_child_layout(&child, Rect::new(origin, size.into_signed()));
        }

        match self.direction {
            StackDirection::Rows => Size::new(cross, main),
            StackDirection::Columns => Size::new(main, cross),
        }
    }
}

#[cfg(test)]
mod tests {
    use figures::units::Px;

    use super::*;
    use crate::widget::MakeWidget;
    use crate::window::Window;

    #[test]
    fn columns_flow_left_to_right_with_gap() {
        // Two 2-grapheme labels measure 16x16 each; the default gap is 16.
        let first = "ab".make_widget();
        let second = "cd".make_widget();
        let window = Window::new(
            first.clone().and(second.clone()).into_columns(),
            Size::new(UPx::new(200), UPx::new(100)),
        );
        let first_layout = window.layout_in_window(first.id()).expect("laid out");
        let second_layout = window.layout_in_window(second.id()).expect("laid out");
        assert_eq!(
            second_layout.origin.x - first_layout.origin.x,
            Px::new(16 + 16)
        );
        assert_eq!(first_layout.origin.y, second_layout.origin.y);
    }
}
