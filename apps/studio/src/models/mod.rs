pub mod analysis;
pub mod resume;
pub mod style;
