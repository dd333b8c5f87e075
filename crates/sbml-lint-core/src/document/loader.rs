//! DTO → domain model conversion with validation.

use super::dto::{DocumentDto, NodeDto};
use super::model::{Document, Node, ObjectKind};
use crate::types::PackageTag;

/// Errors while loading a document.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LoadError {
    /// The input is not valid JSON for the document schema.
    #[error("malformed document: {0}")]
    #[diagnostic(code(sbml_lint::load::json))]
    Json(#[from] serde_json::Error),

    /// An element name that no known kind uses.
    #[error("{context}: unknown element `{name}`")]
    #[diagnostic(code(sbml_lint::load::unknown_element))]
    UnknownElement {
        /// Where the error occurred (e.g. "model.listOfSpecies[2]").
        context: String,
        /// The rejected element name.
        name: String,
    },

    /// A package prefix that is not supported.
    #[error("{context}: unknown package `{name}`")]
    #[diagnostic(
        code(sbml_lint::load::unknown_package),
        help("supported packages: qual, fbc")
    )]
    UnknownPackage {
        /// Where the error occurred.
        context: String,
        /// The rejected prefix.
        name: String,
    },

    /// An attribute whose value is not a JSON scalar.
    #[error("{context}: attribute `{name}` must be a string, number or boolean")]
    #[diagnostic(code(sbml_lint::load::attribute))]
    InvalidAttribute {
        /// Where the error occurred.
        context: String,
        /// Attribute name.
        name: String,
    },

    /// An extension root whose element belongs to another package.
    #[error("{context}: element `{element}` cannot be attached as `{package}` extension")]
    #[diagnostic(code(sbml_lint::load::extension))]
    MisplacedExtension {
        /// Where the error occurred.
        context: String,
        /// Package key used.
        package: PackageTag,
        /// Element found.
        element: String,
    },

    /// The document root holds something other than a model.
    #[error("{context}: expected a `model` element, found `{element}`")]
    #[diagnostic(code(sbml_lint::load::root))]
    NotAModel {
        /// Where the error occurred.
        context: String,
        /// Element found.
        element: String,
    },
}

/// Parses a JSON document.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or names unknown elements or packages.
pub fn from_json(content: &str) -> Result<Document, LoadError> {
    let dto: DocumentDto = serde_json::from_str(content)?;
    load(dto)
}

/// Converts a `DocumentDto` to a validated [`Document`].
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DocumentDto) -> Result<Document, LoadError> {
    let packages = dto
        .packages
        .iter()
        .map(|p| parse_package(p, "packages"))
        .collect::<Result<Vec<_>, _>>()?;

    let model = dto
        .model
        .map(|m| {
            let node = convert_node(m, "model")?;
            if node.kind() == ObjectKind::Model {
                Ok(node)
            } else {
                Err(LoadError::NotAModel {
                    context: "model".to_string(),
                    element: node.kind().element_name().to_string(),
                })
            }
        })
        .transpose()?;

    let mut document = Document::new(dto.level, dto.version, model);
    for package in packages {
        document = document.with_package(package);
    }
    Ok(document)
}

fn parse_package(name: &str, context: &str) -> Result<PackageTag, LoadError> {
    name.parse().map_err(|_| LoadError::UnknownPackage {
        context: context.to_string(),
        name: name.to_string(),
    })
}

fn convert_node(dto: NodeDto, context: &str) -> Result<Node, LoadError> {
    let kind =
        ObjectKind::from_element_name(&dto.element).ok_or_else(|| LoadError::UnknownElement {
            context: context.to_string(),
            name: dto.element.clone(),
        })?;

    let mut node = Node::new(kind);
    if let (Some(line), Some(column)) = (dto.line, dto.column) {
        node = node.at(line, column);
    }

    for (name, value) in dto.attributes {
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => {
                return Err(LoadError::InvalidAttribute {
                    context: context.to_string(),
                    name,
                })
            }
        };
        node = node.with_attr(name, text);
    }

    if let Some(math) = dto.math {
        node = node.with_math(math);
    }

    for (list, items) in dto.children {
        if !kind.child_lists().contains(&list.as_str()) {
            tracing::debug!("{context}: `{list}` is not a declared list of {kind}, it will not be traversed");
        }
        node = node.with_list(list.clone());
        for (i, item) in items.into_iter().enumerate() {
            let child = convert_node(item, &format!("{context}.{list}[{i}]"))?;
            node = node.with_child(list.clone(), child);
        }
    }

    for (prefix, ext) in dto.extensions {
        let ext_context = format!("{context}.extensions.{prefix}");
        let package = parse_package(&prefix, &ext_context)?;
        let root = convert_node(ext, &ext_context)?;
        if root.kind().package() != Some(package) {
            return Err(LoadError::MisplacedExtension {
                context: ext_context,
                package,
                element: root.kind().element_name().to_string(),
            });
        }
        node = node.with_extension(package, root);
    }

    Ok(node)
}
