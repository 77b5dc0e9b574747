use crate::error::{Result, StepperError};
use handlebars::Handlebars;
use serde::Serialize;

/// `<index>,<StepID>` per line.
pub const DEFAULT_PRINT_TEMPLATE: &str = "{{#each this}}{{@index}},{{StepID}}\n{{/each}}";

/// Renders data through a user supplied Handlebars template, without HTML escaping.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| StepperError::Template(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
