//! Server-side HTML for every page. Plain string building; all user and
//! backend text goes through [`escape`].

mod about;
mod flood_detection;
mod home;
mod layout;

pub use about::about_page;
pub use flood_detection::{flood_detection_page, page_path};
pub use home::home_page;
pub use layout::{layout, NavItem};

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
