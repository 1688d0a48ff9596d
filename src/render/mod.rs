pub mod html;
pub mod text;

pub use html::HtmlList;
pub use text::TextList;

use crate::list::Entry;

/// A full-replacement view target.
///
/// Every call replaces the entire previous view with the given entries;
/// implementations must not diff against earlier state. The rendered view
/// is a pure function of the most recent call.
pub trait Render: Send {
    fn render(&mut self, entries: &[Entry]);
}

impl<F> Render for F
where
    F: FnMut(&[Entry]) + Send,
{
    fn render(&mut self, entries: &[Entry]) {
        self(entries)
    }
}
