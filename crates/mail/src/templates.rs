//! Handlebars templates for e-mail bodies, loaded once at startup.

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::MailError;

/// Named, pre-compiled e-mail body templates.
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        Self { handlebars }
    }

    /// Compile `source` under `name`, replacing any previous template.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), MailError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| MailError::Template(format!("{name}: {e}")))
    }

    /// Read a template file and register it under its path.
    pub fn register_file(&mut self, path: &Path) -> Result<String, MailError> {
        let name = path.display().to_string();
        let source = std::fs::read_to_string(path)
            .map_err(|e| MailError::Template(format!("{name}: {e}")))?;
        self.register(&name, &source)?;
        Ok(name)
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, MailError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| MailError::Template(format!("{name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_registered_template() {
        let mut registry = TemplateRegistry::new();
        registry
            .register("reset", "Hello {{email}}, your code is {{token}}.")
            .unwrap();

        let body = registry
            .render("reset", &json!({"email": "a@b.com", "token": "abc"}))
            .unwrap();
        assert_eq!(body, "Hello a@b.com, your code is abc.");
    }

    #[test]
    fn unknown_template_and_missing_fields_fail() {
        let mut registry = TemplateRegistry::new();
        registry.register("t", "{{token}}").unwrap();

        assert_matches!(registry.render("other", &json!({})), Err(MailError::Template(_)));
        assert_matches!(registry.render("t", &json!({})), Err(MailError::Template(_)));
    }

    #[test]
    fn missing_file_is_a_template_error() {
        let mut registry = TemplateRegistry::new();
        assert_matches!(
            registry.register_file(Path::new("/nonexistent/activation.hbs")),
            Err(MailError::Template(_))
        );
    }
}
