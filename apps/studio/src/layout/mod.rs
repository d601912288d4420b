// Layout: measures and positions a template's tree on a print-size surface,
// and keeps the registry of mounted surfaces the preview and capture share.
// Layout is cheap enough to run inline; rasterizing its output is not (see export::raster).

pub mod flow;
pub mod font_metrics;
pub mod surface;

pub use flow::{layout, Paint, Surface, TextRun};
pub use surface::{SurfaceRegistry, PREVIEW_SURFACE_ID};
