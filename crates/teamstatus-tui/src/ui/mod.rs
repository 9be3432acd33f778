//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, status bar and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color palette and text styling
//! - `views`: Screen content (team roster, team form)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
