//! Pre-parsed content MathML.
//!
//! MathML compilation happens upstream; the engine only inspects the tree
//! to answer structural questions (which identifiers are referenced, does an
//! expression yield a boolean).

use serde::{Deserialize, Serialize};

/// A content MathML expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Math {
    /// `<cn>`: a numeric literal with optional units (level 3).
    Cn {
        /// Literal value.
        value: f64,
        /// `sbml:units` annotation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        units: Option<String>,
    },
    /// `<ci>`: a reference to an identifier.
    Ci(String),
    /// `<csymbol>`: a predefined symbol such as `time` or `avogadro`.
    Csymbol(String),
    /// `<apply>` of a built-in operator (`plus`, `lt`, `and`, ... or the constants `true`/`false`).
    Apply {
        /// Operator element name.
        op: String,
        /// Operands.
        #[serde(default)]
        args: Vec<Math>,
    },
    /// `<apply>` whose first child is a `<ci>`: a user function call.
    Call {
        /// Called function identifier.
        function: String,
        /// Arguments.
        #[serde(default)]
        args: Vec<Math>,
    },
    /// `<lambda>` with bound variables.
    Lambda {
        /// Bound variable names.
        #[serde(default)]
        bvars: Vec<String>,
        /// Function body.
        body: Box<Math>,
    },
    /// `<piecewise>`.
    Piecewise {
        /// `(value, condition)` pairs.
        #[serde(default)]
        pieces: Vec<(Math, Math)>,
        /// `<otherwise>` value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Math>>,
    },
}

/// Operators whose result is boolean.
const BOOLEAN_OPS: &[&str] = &[
    "eq", "neq", "gt", "lt", "geq", "leq", "and", "or", "xor", "not", "implies", "true", "false",
];

/// Statically inferred result type of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathType {
    /// Always a boolean.
    Boolean,
    /// Always a number.
    Numeric,
    /// Depends on something the tree alone cannot tell (e.g. a function call).
    Unknown,
}

impl Math {
    /// Shorthand for an identifier reference.
    #[must_use]
    pub fn ci(name: impl Into<String>) -> Self {
        Self::Ci(name.into())
    }

    /// Shorthand for a plain number.
    #[must_use]
    pub fn cn(value: f64) -> Self {
        Self::Cn { value, units: None }
    }

    /// Shorthand for an operator application.
    #[must_use]
    pub fn apply(op: impl Into<String>, args: Vec<Math>) -> Self {
        Self::Apply {
            op: op.into(),
            args,
        }
    }

    /// Collects the free identifiers referenced by `<ci>` elements.
    ///
    /// Lambda-bound variables are excluded; called function names are not `<ci>` operands
    /// and are reported by [`Math::called_functions`] instead.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_identifiers(&[], &mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, bound: &[&str], out: &mut Vec<&'a str>) {
        match self {
            Self::Ci(name) => {
                if !bound.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Self::Cn { .. } | Self::Csymbol(_) => {}
            Self::Apply { args, .. } | Self::Call { args, .. } => {
                for arg in args {
                    arg.collect_identifiers(bound, out);
                }
            }
            Self::Lambda { bvars, body } => {
                let mut inner: Vec<&str> = bound.to_vec();
                inner.extend(bvars.iter().map(String::as_str));
                body.collect_identifiers(&inner, out);
            }
            Self::Piecewise { pieces, otherwise } => {
                for (value, condition) in pieces {
                    value.collect_identifiers(bound, out);
                    condition.collect_identifiers(bound, out);
                }
                if let Some(otherwise) = otherwise {
                    otherwise.collect_identifiers(bound, out);
                }
            }
        }
    }

    /// Collects the names of user functions called anywhere in the expression.
    #[must_use]
    pub fn called_functions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit(&mut |m| {
            if let Self::Call { function, .. } = m {
                out.push(function.as_str());
            }
        });
        out
    }

    /// Visits every sub-expression, pre-order.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Math)) {
        f(self);
        match self {
            Self::Cn { .. } | Self::Ci(_) | Self::Csymbol(_) => {}
            Self::Apply { args, .. } | Self::Call { args, .. } => {
                for arg in args {
                    arg.visit(f);
                }
            }
            Self::Lambda { body, .. } => body.visit(f),
            Self::Piecewise { pieces, otherwise } => {
                for (value, condition) in pieces {
                    value.visit(f);
                    condition.visit(f);
                }
                if let Some(otherwise) = otherwise {
                    otherwise.visit(f);
                }
            }
        }
    }

    /// Infers the result type of the expression.
    #[must_use]
    pub fn value_type(&self) -> MathType {
        match self {
            Self::Cn { .. } | Self::Ci(_) => MathType::Numeric,
            Self::Csymbol(symbol) => match symbol.as_str() {
                "time" | "avogadro" | "delay" | "rateOf" => MathType::Numeric,
                _ => MathType::Unknown,
            },
            Self::Apply { op, .. } => {
                if BOOLEAN_OPS.contains(&op.as_str()) {
                    MathType::Boolean
                } else {
                    MathType::Numeric
                }
            }
            Self::Call { .. } => MathType::Unknown,
            Self::Lambda { body, .. } => body.value_type(),
            Self::Piecewise { pieces, otherwise } => {
                let mut types = pieces
                    .iter()
                    .map(|(value, _)| value.value_type())
                    .chain(otherwise.iter().map(|o| o.value_type()));
                let Some(first) = types.next() else {
                    return MathType::Unknown;
                };
                if types.all(|t| t == first) {
                    first
                } else {
                    MathType::Unknown
                }
            }
        }
    }
}
