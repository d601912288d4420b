pub mod actions;
pub mod handlers;
pub mod ids;
pub mod session;

pub use actions::Action;
pub use session::{EditorState, ExportKind, Session};
