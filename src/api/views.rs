//! Server-rendered pages. Templates are compiled into the binary.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::errors::AppResult;

const VIEWS: &[(&str, &str)] = &[
    ("layout.html", include_str!("views/layout.html")),
    ("login.html", include_str!("views/login.html")),
];

/// View engine
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut env = Environment::new();
        for (name, source) in VIEWS {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> AppResult<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(context)?))
    }
}

#[cfg(test)]
mod tests {
    use minijinja::context;

    use super::*;
    use crate::api::flash::{Flash, FlashKind};

    #[test]
    fn test_login_page_shows_flashes_escaped() {
        let views = Views::new().unwrap();
        let flashes = vec![Flash::new(FlashKind::Error, "<b>Invalid</b>")];
        let Html(page) = views.render("login.html", context! { flashes }).unwrap();

        assert!(page.contains("action=\"/auth/login\""));
        assert!(page.contains("flash-error"));
        assert!(page.contains("&lt;b&gt;Invalid&lt;"));
        assert!(!page.contains("<b>"));
    }
}
