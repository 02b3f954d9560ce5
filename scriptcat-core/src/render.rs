//! Concatenator
//!
//! Turns an ordered script list (as produced by the resolver) into one
//! JavaScript text: a declaration header per script followed by its
//! preprocessed content, optionally wrapped in a function scope.

use scriptcat_config::{RenderConfig, TemplateConfig};
use tracing::{debug, instrument};

use crate::error::{Result, ScriptError};
use crate::node::Script;
use crate::template::{self, TemplateValue, TemplateVars};

/// Per-build rendering options
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Wrap the output in `(function(window, undefined) { ... })(window);`
    pub wrap: bool,
    /// Template dictionary; never modified, rendering works on a copy
    pub dictionary: &'a TemplateVars,
}

/// Renders scripts with fixed template and output settings
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    render: RenderConfig,
    template: TemplateConfig,
}

impl Renderer {
    pub fn new(render: RenderConfig, template: TemplateConfig) -> Self {
        Self { render, template }
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    pub fn template_config(&self) -> &TemplateConfig {
        &self.template
    }

    /// Statement emitted before a script's content.
    ///
    /// Path-dialect modules create their namespace object if nothing has yet;
    /// symbol-dialect modules manage their own namespace and only get a marker.
    pub fn declaration_header(&self, script: &Script) -> Result<String> {
        let Some(name) = script.name() else {
            return Ok("/* virtual script */".to_string());
        };
        if script.is_symbol_dialect()? || script.is_foundation() {
            return Ok(format!("/* Closure-style module: {} */", name));
        }
        Ok(format!(
            "if(typeof {0} == 'undefined') {{ {0} = {{}} }}; {0}.__name__ = '{0}'",
            name
        ))
    }

    /// Content of one script after template expansion, ending in one newline
    pub fn render_content(&self, script: &Script, dictionary: &TemplateVars) -> Result<String> {
        let content = script.content()?;
        template::render(&content, dictionary, &self.template).map_err(|source| {
            ScriptError::Template {
                origin: script.to_string(),
                source,
            }
        })
    }

    /// Concatenate `scripts` in the given order.
    #[instrument(target = "scriptcat::render", skip_all, fields(scripts = scripts.len(), wrap = options.wrap))]
    pub fn mega_script(&self, scripts: &[Script], options: RenderOptions<'_>) -> Result<String> {
        let mut dictionary = options.dictionary.clone();
        dictionary.insert(
            self.render.wrapped_flag.clone(),
            TemplateValue::Bool(options.wrap),
        );

        let mut body = String::new();
        for script in scripts {
            body.push_str(&self.declaration_header(script)?);
            body.push_str(";\n");
            body.push_str(&self.render_content(script, &dictionary)?);
        }

        let out = if options.wrap {
            let global = &self.render.global_name;
            format!(
                "(function({0}, undefined) {{\nvar document = {0}.document;\n{1}}})({0});\n",
                global, body
            )
        } else {
            body
        };
        debug!(target: "scriptcat::render", bytes = out.len(), "concatenated");
        Ok(out)
    }
}
