use super::Render;
use crate::list::Entry;

/// Renders the list as `<li><a>` markup, each entry becoming one link item
/// whose href and label are both the entry value. The buffer is replaced
/// wholesale on every render.
#[derive(Debug, Default)]
pub struct HtmlList {
    view: String,
}

impl HtmlList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view markup. Empty string when the list is empty.
    pub fn html(&self) -> &str {
        &self.view
    }
}

impl Render for HtmlList {
    fn render(&mut self, entries: &[Entry]) {
        let mut items = String::new();
        for entry in entries {
            let value = escape(entry.as_str());
            items.push_str(&format!(
                "<li><a target=\"_blank\" href=\"{value}\">{value}</a></li>"
            ));
        }
        self.view = items;
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_one_link_item() {
        let mut list = HtmlList::new();
        list.render(&[Entry::from("https://a.com")]);
        assert_eq!(
            list.html(),
            "<li><a target=\"_blank\" href=\"https://a.com\">https://a.com</a></li>"
        );
    }

    #[test]
    fn test_render_replaces_previous_view() {
        let mut list = HtmlList::new();
        list.render(&[Entry::from("https://a.com"), Entry::from("https://b.com")]);
        assert_eq!(list.html().matches("<li>").count(), 2);

        list.render(&[]);
        assert_eq!(list.html(), "");
    }

    #[test]
    fn test_escapes_markup_in_values() {
        let mut list = HtmlList::new();
        list.render(&[Entry::from("https://a.com/?q=<b>&r=\"x\"")]);
        assert!(list.html().contains("&lt;b&gt;"));
        assert!(list.html().contains("&amp;r=&quot;x&quot;"));
        assert!(!list.html().contains("<b>"));
    }
}
