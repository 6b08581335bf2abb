//! Styling helpers for terminal output.
//!
//! The [`MapStyle`] trait wraps the `colored` crate so report text can be
//! styled in place. Colors are dropped automatically when `--no-color` is
//! given or output is not a terminal.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to report output.
pub trait MapStyle {
    fn heading_style(&self) -> ColoredString;
    fn map_style(&self) -> ColoredString;
    fn warning_style(&self) -> ColoredString;
    fn item_style(&self) -> ColoredString;
    fn level_style(&self) -> ColoredString;
}

impl MapStyle for &str {
    fn heading_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn map_style(&self) -> ColoredString {
        self.truecolor(190, 190, 190)
    }
    fn warning_style(&self) -> ColoredString {
        self.bold().truecolor(230, 80, 80)
    }
    fn item_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn level_style(&self) -> ColoredString {
        self.italic().truecolor(110, 220, 110)
    }
}

impl MapStyle for String {
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn map_style(&self) -> ColoredString {
        self.as_str().map_style()
    }
    fn warning_style(&self) -> ColoredString {
        self.as_str().warning_style()
    }
    fn item_style(&self) -> ColoredString {
        self.as_str().item_style()
    }
    fn level_style(&self) -> ColoredString {
        self.as_str().level_style()
    }
}
