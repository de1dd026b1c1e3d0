//! Render layer - subprocess execution of the manim engine and output discovery.

pub mod manim;
pub mod output;

pub use manim::{ManimRenderer, Renderer};
