//! Server-rendered pages.
//!
//! Each page is a handler that renders its body as `maud` markup and wraps
//! it in the shared layout. The layout depends only on the template mode, so
//! with `template.cache` on it is rendered once and reused.

pub mod admin;
pub mod home;
pub mod signin;

pub use admin::admin_page;
pub use home::home_page;
pub use signin::sign_in_page;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::config::{TemplateConfig, TemplateMode};

const SITE_NAME: &str = "docsite";

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Page renderer configured by the template flags.
#[derive(Debug)]
pub struct Pages {
    mode: TemplateMode,
    cache: bool,
    layout: OnceLock<Layout>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    /// XML declaration, XHTML only.
    prologue: Option<&'static str>,
    xmlns: Option<&'static str>,
    /// Head void elements, closed the way the mode expects.
    meta: String,
    content_type: &'static str,
}

impl Layout {
    fn render(mode: TemplateMode) -> Self {
        let (prologue, xmlns, content_type) = match mode {
            TemplateMode::Html5 | TemplateMode::LegacyHtml5 => {
                (None, None, "text/html; charset=utf-8")
            }
            TemplateMode::Xhtml => (
                Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
                Some(XHTML_NAMESPACE),
                "application/xhtml+xml; charset=utf-8",
            ),
        };

        let meta = [
            "meta charset=\"utf-8\"",
            "meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"",
        ]
        .into_iter()
        .map(|element| void_element(mode, element))
        .collect::<Vec<_>>()
        .join("\n");

        Self {
            prologue,
            xmlns,
            meta,
            content_type,
        }
    }

    fn wrap(&self, title: &str, body: Markup) -> Markup {
        html! {
            @if let Some(prologue) = self.prologue {
                (PreEscaped(prologue))
            }
            (DOCTYPE)
            html lang="en" xmlns=[self.xmlns] {
                head {
                    (PreEscaped(self.meta.as_str()))
                    title { (title) " | " (SITE_NAME) }
                }
                body {
                    header { a href="/" { (SITE_NAME) } }
                    main { (body) }
                }
            }
        }
    }
}

/// `<br>` in HTML5, `<br />` where an XML-minded parser may read the page.
///
/// `maud` always emits the HTML5 form, so the head's void elements are
/// written here.
fn void_element(mode: TemplateMode, element: &str) -> String {
    match mode {
        TemplateMode::Html5 => format!("<{element}>"),
        TemplateMode::LegacyHtml5 | TemplateMode::Xhtml => format!("<{element} />"),
    }
}

impl Pages {
    /// Creates a renderer for the given flags.
    #[must_use]
    pub fn new(config: &TemplateConfig) -> Self {
        Self {
            mode: config.mode,
            cache: config.cache,
            layout: OnceLock::new(),
        }
    }

    /// Returns the template mode.
    #[must_use]
    pub fn mode(&self) -> TemplateMode {
        self.mode
    }

    fn layout(&self) -> Cow<'_, Layout> {
        if self.cache {
            Cow::Borrowed(self.layout.get_or_init(|| Layout::render(self.mode)))
        } else {
            Cow::Owned(Layout::render(self.mode))
        }
    }

    /// Wraps `body` in the layout.
    #[must_use]
    pub fn render(&self, title: &str, body: Markup) -> Response {
        let layout = self.layout();
        let page = layout.wrap(title, body);
        ([(header::CONTENT_TYPE, layout.content_type)], page.into_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(mode: TemplateMode, cache: bool) -> Pages {
        Pages::new(&TemplateConfig { mode, cache })
    }

    fn page(mode: TemplateMode, title: &str, body: Markup) -> String {
        Layout::render(mode).wrap(title, body).into_string()
    }

    #[test]
    fn legacy_html5_self_closes_void_elements() {
        let html = page(TemplateMode::LegacyHtml5, "Home", html! { p { "hi" } });
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"utf-8\" />"));
        assert!(!html.contains("xmlns"));
    }

    #[test]
    fn html5_uses_bare_void_elements() {
        let html = page(TemplateMode::Html5, "Home", html! {});
        assert!(html.contains("<meta charset=\"utf-8\">"));
    }

    #[test]
    fn xhtml_is_served_as_xml() {
        let layout = Layout::render(TemplateMode::Xhtml);
        assert_eq!(layout.content_type, "application/xhtml+xml; charset=utf-8");

        let html = layout.wrap("Home", html! {}).into_string();
        assert!(html.starts_with("<?xml"));
        assert!(html.contains("xmlns=\"http://www.w3.org/1999/xhtml\""));
    }

    #[test]
    fn title_and_body_are_escaped() {
        let html = page(
            TemplateMode::Html5,
            "Tom & Jerry",
            html! { p { "<script>" } },
        );
        assert!(html.contains("<title>Tom &amp; Jerry | docsite</title>"));
        assert!(html.contains("<main><p>&lt;script&gt;</p></main>"));
    }

    #[test]
    fn cached_layout_is_rendered_once() {
        let pages = pages(TemplateMode::LegacyHtml5, true);
        let first = pages.layout();
        let second = pages.layout();
        assert!(matches!(first, Cow::Borrowed(_)));
        assert!(matches!(second, Cow::Borrowed(_)));
        assert!(pages.layout.get().is_some());
    }

    #[test]
    fn uncached_layout_is_rendered_per_request() {
        let pages = pages(TemplateMode::LegacyHtml5, false);
        assert!(matches!(pages.layout(), Cow::Owned(_)));
        assert!(pages.layout.get().is_none());
    }

    #[test]
    fn render_sets_content_type() {
        let response = pages(TemplateMode::Xhtml, false).render("Home", html! { p { "hi" } });
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xhtml+xml; charset=utf-8"
        );
    }
}
