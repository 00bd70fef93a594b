//! KaTeX rendering hook.
//!
//! Turns the text of a [`MathToken`](crate::delimiters::MathToken) into
//! markup. Errors from KaTeX are returned as-is; deciding how to show a broken
//! formula is the caller's job (see [`crate::pipeline`]).

use std::collections::BTreeMap;

use katex::{OptsBuilder, OutputType};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to build KaTeX options: {0}")]
    Options(String),
    #[error(transparent)]
    Katex(#[from] katex::Error),
}

/// Markup KaTeX should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Html,
    Mathml,
    HtmlAndMathml,
}

impl From<OutputFormat> for OutputType {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Html => OutputType::Html,
            OutputFormat::Mathml => OutputType::Mathml,
            OutputFormat::HtmlAndMathml => OutputType::HtmlAndMathml,
        }
    }
}

/// Caller-supplied KaTeX settings. Unset fields keep KaTeX's defaults.
///
/// Display mode is not part of this struct: it always comes from the token
/// being rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub output: Option<OutputFormat>,
    pub leqno: Option<bool>,
    pub fleqn: Option<bool>,
    pub throw_on_error: Option<bool>,
    pub error_color: Option<String>,
    pub trust: Option<bool>,
    pub min_rule_thickness: Option<f64>,
    pub macros: BTreeMap<String, String>,
}

impl RenderOptions {
    fn to_katex(&self, display_mode: bool) -> Result<katex::Opts, RenderError> {
        let mut builder = OptsBuilder::default();
        builder.display_mode(display_mode);
        if let Some(output) = self.output {
            builder.output_type(OutputType::from(output));
        }
        if let Some(leqno) = self.leqno {
            builder.leqno(leqno);
        }
        if let Some(fleqn) = self.fleqn {
            builder.fleqn(fleqn);
        }
        if let Some(throw_on_error) = self.throw_on_error {
            builder.throw_on_error(throw_on_error);
        }
        if let Some(error_color) = &self.error_color {
            builder.error_color(error_color.clone());
        }
        if let Some(trust) = self.trust {
            builder.trust(trust);
        }
        if let Some(thickness) = self.min_rule_thickness {
            builder.min_rule_thickness(thickness);
        }
        for (name, expansion) in &self.macros {
            builder = builder.add_macro(name.clone(), expansion.clone());
        }

        builder
            .build()
            .map_err(|err| RenderError::Options(err.to_string()))
    }
}

/// Renders `text` with KaTeX, in display mode when `display_mode` is set.
pub fn render(
    text: &str,
    display_mode: bool,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let opts = options.to_katex(display_mode)?;
    Ok(katex::render_with_opts(text, opts)?)
}
