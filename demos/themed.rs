//! Re-themes the ripple through style components and prints the burst's
//! geometry frame by frame, showing the deterministic animation timeline.

use std::time::Duration;

use figures::units::{Px, UPx};
use figures::{Point, Size};
use ripplet::graphics::{Color, DrawCommand};
use ripplet::styles::components::{
    ButtonBackground, RippleColor, RippleDuration, RippleTerminalScale,
};
use ripplet::widget::MakeWidget;
use ripplet::widgets::RippleButton;
use ripplet::window::Window;

fn main() {
    ripplet::initialize_tracing();

    let button = RippleButton::new()
        .label("slow ripple")
        .with(&ButtonBackground, Color::new(0x1D, 0x3A, 0x2F, 0xFF))
        .with(&RippleColor, Color::new(0xFF, 0xE0, 0x82, 0x66))
        .with(&RippleDuration, Duration::from_millis(600))
        .with(&RippleTerminalScale, 2.0);

    let mut window = Window::new(button.centered(), Size::new(UPx::new(320), UPx::new(240)));
    window.click(Point::new(Px::new(160), Px::new(120)));

    for frame in 0..=12 {
        if let Some((radius, alpha)) = ripple_of(&window) {
            println!("t={:>3}ms radius={radius} alpha={alpha}", frame * 50);
        } else {
            println!("t={:>3}ms ripple gone", frame * 50);
        }
        window.advance(Duration::from_millis(50));
    }
}

fn ripple_of(window: &Window) -> Option<(Px, u8)> {
    window
        .frame()
        .commands()
        .iter()
        .find_map(|placed| match placed.command {
            DrawCommand::Circle { radius, color, .. } => Some((radius, color.alpha())),
            _ => None,
        })
}
