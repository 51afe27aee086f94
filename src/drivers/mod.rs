//! Adapters through which external collaborators (mode source, render-quality
//! observer) bind to the single pipeline core.

pub mod mode;
pub mod render;
