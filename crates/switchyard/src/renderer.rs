use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use switchyard_router::{Dispatcher, Renderer, RendererSpec, Response};

/// Renders data as JSON
///
/// The `pretty` option on a route's renderer overrides the renderer default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    fn render(&self, data: Value, spec: &RendererSpec) -> Result<Response> {
        let pretty = spec
            .options
            .get("pretty")
            .and_then(Value::as_bool)
            .unwrap_or(self.pretty);

        let body = if pretty {
            serde_json::to_vec_pretty(&data)?
        } else {
            serde_json::to_vec(&data)?
        };
        Ok(Response::with_body("application/json", body))
    }
}

/// Renders strings verbatim and anything else as its JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, data: Value, _spec: &RendererSpec) -> Result<Response> {
        let body = match data {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(Response::with_body("text/plain; charset=utf-8", body))
    }
}

/// Fills `{name}` placeholders of the `template` option with top-level
/// fields of the view data
///
/// Unknown placeholders are left as written. Anything richer belongs in a
/// dedicated template engine behind its own renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl Renderer for TemplateRenderer {
    fn render(&self, data: Value, spec: &RendererSpec) -> Result<Response> {
        static VAR_REGEX: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

        let Some(template) = spec.option("template") else {
            bail!("template renderer requires a `template` option");
        };

        let body = VAR_REGEX.replace_all(template, |caps: &regex::Captures| {
            match data.get(&caps[1]) {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => caps[0].to_string(),
            }
        });
        Ok(Response::with_body("text/html; charset=utf-8", body.as_ref()))
    }
}

/// Registers `json`, `text` and `template` on a dispatcher
pub fn register_defaults(dispatcher: &mut Dispatcher) {
    dispatcher
        .add_renderer("json", JsonRenderer::default())
        .add_renderer("text", TextRenderer)
        .add_renderer("template", TemplateRenderer);
}
