//! Ratatui widgets for the skein viewer.

pub mod filter_bar;
pub mod log_view;
