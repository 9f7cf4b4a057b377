//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

// Priority colors match the badge colors used in listings.

/// Used for Low priority
pub const GREEN: Color = Color::Rgb(76, 175, 80);
/// Used for Medium priority
pub const ORANGE: Color = Color::Rgb(255, 152, 0);
/// Used for High priority
pub const RED: Color = Color::Rgb(244, 67, 54);
/// Used for Urgent priority
pub const PURPLE: Color = Color::Rgb(156, 39, 176);

/// Map a priority level to its display color.
pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Low => GREEN,
        Priority::Medium => ORANGE,
        Priority::High => RED,
        Priority::Urgent => PURPLE,
    }
}
