pub(crate) mod editor;

pub use editor::ComposeFileEditor;
