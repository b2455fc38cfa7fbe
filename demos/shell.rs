//! The two-button application shell, driven through a simulated pointer
//! session: a default button that reacts to clicks with a ripple, and a
//! disabled button that ignores the pointer entirely.

use std::time::Duration;

use figures::units::{Px, UPx};
use figures::{Point, Rect, Size};
use ripplet::widget::{MakeWidget, WidgetInstance};
use ripplet::widgets::RippleButton;
use ripplet::window::Window;

fn main() {
    ripplet::initialize_tracing();

    let primary = RippleButton::new()
        .on_click(|()| println!("default button clicked"))
        .make_widget();
    let disabled = RippleButton::new()
        .label("🦊 disabled button 🌲")
        .enabled(false)
        .make_widget();
    let shell = primary.clone().and(disabled.clone()).into_columns().centered();

    let mut window = Window::new(shell, Size::new(UPx::new(640), UPx::new(480)));

    println!("clicking the default button:");
    window.click(center_of(&window, &primary));
    // Let the ripple play out at a 60 Hz cadence.
    for _ in 0..45 {
        window.advance(Duration::from_millis(16));
    }
    println!(
        "ripple finished; final frame holds {} draw commands",
        window.frame().commands().len()
    );

    println!("clicking the disabled button:");
    window.click(center_of(&window, &disabled));
    println!(
        "nothing happened; {} animations running",
        window.animations().running()
    );
}

fn center_of(window: &Window, widget: &WidgetInstance) -> Point<Px> {
    let layout: Rect<Px> = window.layout_in_window(widget.id()).expect("laid out");
    layout.origin + Point::new(layout.size.width / 2, layout.size.height / 2)
}
