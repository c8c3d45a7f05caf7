use std::sync::Arc;

use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("hello.html", include_str!("../../templates/hello.html")),
    ("greeting.html", include_str!("../../templates/greeting.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    ("signup-result.html", include_str!("../../templates/signup-result.html")),
    ("signup-error.html", include_str!("../../templates/signup-error.html")),
];

/// Compiled page templates, HTML-escaped on render.
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn render(&self, name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.tera.render(name, ctx)?))
    }
}
