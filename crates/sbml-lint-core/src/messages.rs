//! Message templates and the error synthesizer.

use crate::document::{HasAttributes, HasId, ObjectRef};
use crate::log::Diagnostic;
use crate::rule::RuleDecl;
use crate::types::{Category, RuleId, Severity};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Text and classification for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageTemplate {
    /// Default severity.
    pub severity: Severity,
    /// Category the template was written for.
    pub category: Category,
    /// Message with positional placeholders `{0}`, `{1}`, ...
    pub message: String,
}

/// Errors while rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A placeholder refers to an argument that was not supplied.
    #[error("placeholder {{{index}}} has no argument")]
    MissingArgument {
        /// Placeholder index.
        index: usize,
    },
    /// A `{` is never closed.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening brace.
        offset: usize,
    },
}

impl MessageTemplate {
    /// Substitutes positional arguments.
    ///
    /// A `{` not followed by digits and `}` is copied literally.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range or unterminated placeholder.
    pub fn render(&self, args: &[&str]) -> Result<String, RenderError> {
        let text = self.message.as_str();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                out.push('{');
                rest = after;
                continue;
            }
            if !after[digits..].starts_with('}') {
                return Err(RenderError::Unterminated {
                    offset: text.len() - rest.len() + open,
                });
            }
            let index: usize = after[..digits]
                .parse()
                .map_err(|_| RenderError::MissingArgument { index: usize::MAX })?;
            let arg = args
                .get(index)
                .ok_or(RenderError::MissingArgument { index })?;
            out.push_str(arg);
            rest = &after[digits + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Errors while loading a message resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum MessageError {
    /// The resource is not valid TOML or a template is malformed.
    #[error("failed to parse message catalog: {message}")]
    #[diagnostic(code(sbml_lint::messages::parse))]
    Parse {
        /// Parser message.
        message: String,
    },

    /// A table key is not a decimal rule id.
    #[error("message key `{key}` is not a rule id")]
    #[diagnostic(
        code(sbml_lint::messages::key),
        help("template tables are keyed by decimal rule id, e.g. [21211]")
    )]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// Templates keyed by rule id, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<RuleId, MessageTemplate>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML resource of `[<id>] severity/category/message` tables.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, malformed templates or non-numeric keys.
    pub fn from_toml(content: &str) -> Result<Self, MessageError> {
        let raw: BTreeMap<String, MessageTemplate> =
            toml::from_str(content).map_err(|e| MessageError::Parse {
                message: e.to_string(),
            })?;
        let mut templates = HashMap::with_capacity(raw.len());
        for (key, template) in raw {
            let id = key
                .parse::<RuleId>()
                .map_err(|_| MessageError::InvalidKey { key: key.clone() })?;
            templates.insert(id, template);
        }
        Ok(Self { templates })
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, id: RuleId, template: MessageTemplate) {
        self.templates.insert(id, template);
    }

    /// Returns the template for a rule.
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&MessageTemplate> {
        self.templates.get(&id)
    }

    /// Returns the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterates over the templated rule ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.templates.keys().copied()
    }
}

/// Turns rule events into diagnostics. Never fails.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    messages: &'a MessageCatalog,
    overrides: &'a BTreeMap<RuleId, Severity>,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer with per-rule severity overrides.
    #[must_use]
    pub fn new(messages: &'a MessageCatalog, overrides: &'a BTreeMap<RuleId, Severity>) -> Self {
        Self {
            messages,
            overrides,
        }
    }

    /// Builds the diagnostic for a failed rule.
    ///
    /// The category is always the rule's own; a missing or unrenderable
    /// template degrades to a message-less diagnostic at `Error`.
    #[must_use]
    pub fn on_rule_failed(&self, rule: &RuleDecl, obj: ObjectRef<'_>) -> Diagnostic {
        let id = rule.id();
        let (element, object_id) = obj.describe();
        let detail = rule
            .detail_attribute()
            .and_then(|attr| obj.attribute(attr))
            .unwrap_or("");

        let (severity, message) = match self.messages.get(id) {
            Some(template) => {
                if template.category != rule.category() {
                    warn!(
                        rule = %id,
                        template = %template.category,
                        declared = %rule.category(),
                        "message template category disagrees with rule"
                    );
                }
                match template.render(&[element, object_id, detail]) {
                    Ok(text) => (template.severity, text),
                    Err(err) => {
                        warn!(rule = %id, error = %err, "failed to render message template");
                        (Severity::Error, String::new())
                    }
                }
            }
            None => {
                warn!(rule = %id, "no message template for rule");
                (Severity::Error, String::new())
            }
        };

        let severity = self.overrides.get(&id).copied().unwrap_or(severity);
        Diagnostic::new(id, severity, rule.category(), message)
            .with_object(obj.kind(), obj.id())
            .with_location(obj.node().location())
    }

    /// Builds the diagnostic for a rule whose predicate panicked.
    #[must_use]
    pub fn on_evaluation_failed(
        &self,
        rule: &RuleDecl,
        obj: ObjectRef<'_>,
        reason: &str,
    ) -> Diagnostic {
        Diagnostic::evaluation_failed(rule.id(), rule.category(), reason)
            .with_object(obj.kind(), obj.id())
            .with_location(obj.node().location())
    }
}
