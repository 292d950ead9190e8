use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::types::AppResult;

/// A named prompt template. Variables use `{{ name }}` syntax and must all
/// be supplied; a missing variable is a render error rather than an empty
/// string.
pub struct PromptTemplate {
    name: &'static str,
    env: Environment<'static>,
}

impl PromptTemplate {
    pub fn new(name: &'static str, source: &'static str) -> AppResult<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(name, source)?;
        Ok(Self { name, env })
    }

    pub fn render(&self, vars: &PromptVars) -> AppResult<String> {
        let template = self.env.get_template(self.name)?;
        Ok(template.render(vars)?)
    }
}

/// Variables handed to a template. Structured values are rendered to
/// pretty JSON up front so every template sees plain text.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PromptVars(BTreeMap<&'static str, String>);

impl PromptVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, value.into());
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, key: &'static str, value: &T) -> AppResult<Self> {
        self.0.insert(key, serde_json::to_string_pretty(value)?);
        Ok(self)
    }
}
