use crate::notice::Notice;

/// Presentation side of the catalog screen.
pub trait SessionScreen: Send + Sync {
    fn set_title(&self, title: &str);
    fn show_catalog(&self);
    fn hide_catalog(&self);
    fn notify(&self, notice: Notice);
}
