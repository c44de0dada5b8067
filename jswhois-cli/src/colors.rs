//! Terminal colors for diagnostics, in the Catppuccin-inspired palette
//! mapped onto ANSI bright colors.

use colored::{ColoredString, Colorize};

pub trait CatppuccinExt {
    fn ctp_red(&self) -> ColoredString;
    fn ctp_yellow(&self) -> ColoredString;
}

impl<S: AsRef<str>> CatppuccinExt for S {
    // Red -> bright red
    fn ctp_red(&self) -> ColoredString {
        self.as_ref().bright_red()
    }

    // Yellow -> bright yellow
    fn ctp_yellow(&self) -> ColoredString {
        self.as_ref().bright_yellow()
    }
}
