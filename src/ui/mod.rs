//! Presentational primitives: closed variant enums mapped to style
//! configuration, plus their plain-text terminal renderings.

pub mod card;
pub mod progress;
pub mod toggle;

pub use card::{CardStyle, CardVariant, render_card};
pub use progress::progress_bar;
pub use toggle::{Toggle, toggle_id};
