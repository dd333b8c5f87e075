//! Predicates and rule declarations.
//!
//! A rule is a pure predicate over one object of the tree, tagged with its
//! identifier, category and level/version gate. Evaluation never unwinds past
//! [`RuleDecl::evaluate`]: a panicking predicate becomes a [`RuleEvent::Defect`].
//! The panic message is carried by the defect; the process panic hook stays
//! silent for panics raised inside a predicate.

use crate::context::CheckContext;
use crate::document::ObjectRef;
use crate::types::{Category, RuleId};
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

/// A side-effect-free check over one document object.
///
/// Returns `true` when the object conforms.
///
/// # Example
///
/// ```ignore
/// use sbml_lint_core::{CheckContext, ObjectRef, Predicate, HasAttributes};
///
/// struct Required(&'static str);
///
/// impl Predicate for Required {
///     fn holds(&self, _ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
///         obj.is_set(self.0)
///     }
/// }
/// ```
pub trait Predicate: Send + Sync {
    /// Evaluates the predicate.
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool;
}

/// Shared predicate trait object.
pub type PredicateBox = Arc<dyn Predicate>;

struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&CheckContext<'_>, ObjectRef<'_>) -> bool + Send + Sync,
{
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        (self.0)(ctx, obj)
    }
}

/// Wraps a closure or function as a predicate.
pub fn predicate<F>(f: F) -> PredicateBox
where
    F: Fn(&CheckContext<'_>, ObjectRef<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(FnPredicate(f))
}

/// Group predicate: true iff every delegate is true, evaluated in order.
#[derive(Clone, Default)]
pub struct AllOf {
    delegates: Vec<PredicateBox>,
}

impl AllOf {
    /// Creates an empty group (vacuously true).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a delegate.
    #[must_use]
    pub fn and<P: Predicate + 'static>(mut self, delegate: P) -> Self {
        self.delegates.push(Arc::new(delegate));
        self
    }

    /// Appends an already shared delegate.
    #[must_use]
    pub fn and_box(mut self, delegate: PredicateBox) -> Self {
        self.delegates.push(delegate);
        self
    }

    /// Returns the number of delegates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    /// Returns true if the group has no delegates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl Predicate for AllOf {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        self.delegates.iter().all(|p| p.holds(ctx, obj))
    }
}

/// Level/version guard attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    /// Applies to every level and version.
    #[default]
    Always,
    /// Applies when `level >= n`.
    LevelAtLeast(u32),
    /// Applies when `level == n`.
    LevelExactly(u32),
    /// Applies when `(level, version) >= (l, v)`.
    LevelVersionAtLeast(u32, u32),
    /// Applies when `(level, version) == (l, v)`.
    LevelVersionExactly(u32, u32),
    /// Applies when `(level, version) <= (l, v)`.
    LevelVersionAtMost(u32, u32),
}

impl Gate {
    /// Returns true if a document at `(level, version)` is subject to the rule.
    #[must_use]
    pub const fn admits(self, level: u32, version: u32) -> bool {
        match self {
            Self::Always => true,
            Self::LevelAtLeast(l) => level >= l,
            Self::LevelExactly(l) => level == l,
            Self::LevelVersionAtLeast(l, v) => level > l || (level == l && version >= v),
            Self::LevelVersionExactly(l, v) => level == l && version == v,
            Self::LevelVersionAtMost(l, v) => level < l || (level == l && version <= v),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("all"),
            Self::LevelAtLeast(l) => write!(f, "L{l}+"),
            Self::LevelExactly(l) => write!(f, "L{l}"),
            Self::LevelVersionAtLeast(l, v) => write!(f, "L{l}V{v}+"),
            Self::LevelVersionExactly(l, v) => write!(f, "L{l}V{v}"),
            Self::LevelVersionAtMost(l, v) => write!(f, "up to L{l}V{v}"),
        }
    }
}

/// One numbered consistency rule.
#[derive(Clone)]
pub struct RuleDecl {
    id: RuleId,
    category: Category,
    gate: Gate,
    summary: &'static str,
    detail: Option<&'static str>,
    predicate: PredicateBox,
}

impl RuleDecl {
    /// Declares a rule implemented by a predicate value (typically a template).
    #[must_use]
    pub fn new<P: Predicate + 'static>(
        id: u32,
        category: Category,
        summary: &'static str,
        predicate: P,
    ) -> Self {
        Self::with_predicate(id, category, summary, Arc::new(predicate))
    }

    /// Declares a rule implemented by a closure or function.
    #[must_use]
    pub fn check<F>(id: u32, category: Category, summary: &'static str, f: F) -> Self
    where
        F: Fn(&CheckContext<'_>, ObjectRef<'_>) -> bool + Send + Sync + 'static,
    {
        Self::with_predicate(id, category, summary, predicate(f))
    }

    /// Declares a rule implemented by a shared predicate.
    #[must_use]
    pub fn with_predicate(
        id: u32,
        category: Category,
        summary: &'static str,
        predicate: PredicateBox,
    ) -> Self {
        Self {
            id: RuleId::new(id),
            category,
            gate: Gate::Always,
            summary,
            detail: None,
            predicate,
        }
    }

    /// Restricts the rule to some levels/versions.
    #[must_use]
    pub fn gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Names the attribute whose value is rendered as the message detail.
    #[must_use]
    pub fn detail(mut self, attribute: &'static str) -> Self {
        self.detail = Some(attribute);
        self
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the rule category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the level/version gate.
    #[must_use]
    pub fn level_gate(&self) -> Gate {
        self.gate
    }

    /// Returns a one-line description.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Returns the detail attribute name, if any.
    #[must_use]
    pub fn detail_attribute(&self) -> Option<&'static str> {
        self.detail
    }

    /// Evaluates the predicate, converting a panic into [`RuleEvent::Defect`].
    ///
    /// The first call wraps the process panic hook so that panics raised by a
    /// predicate are not printed; every other panic reaches the previous hook.
    /// A hook installed later replaces the wrapper.
    #[must_use]
    pub fn evaluate(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> RuleEvent {
        install_quiet_hook();
        let outer = EVALUATING.with(|flag| flag.replace(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.predicate.holds(ctx, obj)));
        EVALUATING.with(|flag| flag.set(outer));
        match result {
            Ok(true) => RuleEvent::Passed(self.id),
            Ok(false) => RuleEvent::Failed(self.id),
            Err(payload) => RuleEvent::Defect {
                id: self.id,
                reason: panic_payload_to_string(payload.as_ref()),
            },
        }
    }
}

impl fmt::Debug for RuleDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDecl")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("gate", &self.gate)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Outcome of one rule evaluation, consumed synchronously by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEvent {
    /// The object conforms.
    Passed(RuleId),
    /// The object violates the rule.
    Failed(RuleId),
    /// The predicate panicked.
    Defect {
        /// Offending rule.
        id: RuleId,
        /// Panic message.
        reason: String,
    },
}

impl RuleEvent {
    /// Returns the rule this event is about.
    #[must_use]
    pub fn id(&self) -> RuleId {
        match self {
            Self::Passed(id) | Self::Failed(id) | Self::Defect { id, .. } => *id,
        }
    }
}

thread_local! {
    static EVALUATING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !EVALUATING.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::IdIndex;
    use crate::document::{Document, HasAttributes, Node, ObjectKind};
    use std::collections::BTreeSet;

    fn with_object(f: impl FnOnce(&CheckContext<'_>, ObjectRef<'_>)) {
        let doc = Document::new(
            3,
            1,
            Some(Node::new(ObjectKind::Model).with_attr("id", "m")),
        );
        let index = IdIndex::build(&doc, &BTreeSet::new());
        let ctx = CheckContext::new(3, 1, &doc, &index);
        let model = doc.model().unwrap();
        let ancestors = [doc.root()];
        f(&ctx, ObjectRef::new(model, &ancestors, &doc));
    }

    #[test]
    fn gate_bounds() {
        assert!(Gate::LevelAtLeast(2).admits(3, 1));
        assert!(!Gate::LevelAtLeast(2).admits(1, 2));
        assert!(Gate::LevelVersionAtLeast(2, 2).admits(2, 4));
        assert!(!Gate::LevelVersionAtLeast(2, 2).admits(2, 1));
        assert!(Gate::LevelVersionAtLeast(2, 2).admits(3, 1));
        assert!(Gate::LevelVersionAtMost(3, 1).admits(2, 5));
        assert!(!Gate::LevelVersionAtMost(3, 1).admits(3, 2));
        assert!(Gate::LevelVersionExactly(3, 1).admits(3, 1));
        assert!(!Gate::LevelExactly(2).admits(3, 1));
    }

    #[test]
    fn evaluate_reports_pass_and_fail() {
        with_object(|ctx, obj| {
            let has_id = RuleDecl::check(20100, Category::GeneralConsistency, "", |_, o| {
                o.is_set("id")
            });
            let has_name = RuleDecl::check(20101, Category::GeneralConsistency, "", |_, o| {
                o.is_set("name")
            });
            assert_eq!(has_id.evaluate(ctx, obj), RuleEvent::Passed(RuleId::new(20100)));
            assert_eq!(has_name.evaluate(ctx, obj), RuleEvent::Failed(RuleId::new(20101)));
        });
    }

    #[test]
    fn panics_become_defects() {
        with_object(|ctx, obj| {
            let rule = RuleDecl::check(20102, Category::GeneralConsistency, "", |_, _| {
                panic!("malformed input")
            });
            assert_eq!(
                rule.evaluate(ctx, obj),
                RuleEvent::Defect {
                    id: RuleId::new(20102),
                    reason: "malformed input".to_string()
                }
            );
        });
    }

    #[test]
    fn evaluation_flag_is_cleared_after_a_panic() {
        with_object(|ctx, obj| {
            let rule = RuleDecl::check(20102, Category::GeneralConsistency, "", |_, _| {
                panic!("malformed input")
            });
            assert!(!EVALUATING.with(Cell::get));
            let _ = rule.evaluate(ctx, obj);
            assert!(!EVALUATING.with(Cell::get));
            assert!(QUIET_HOOK.is_completed());
        });
    }

    #[test]
    fn nested_evaluation_keeps_the_outer_flag() {
        with_object(|ctx, obj| {
            let inner = RuleDecl::check(20103, Category::GeneralConsistency, "", |_, _| true);
            let outer = RuleDecl::check(20102, Category::GeneralConsistency, "", move |c, o| {
                let _ = inner.evaluate(c, o);
                EVALUATING.with(Cell::get)
            });
            assert_eq!(outer.evaluate(ctx, obj), RuleEvent::Passed(RuleId::new(20102)));
            assert!(!EVALUATING.with(Cell::get));
        });
    }

    #[test]
    fn all_of_requires_every_delegate() {
        with_object(|ctx, obj| {
            let group = AllOf::new()
                .and_box(predicate(|_, o| o.is_set("id")))
                .and_box(predicate(|_, o| o.is_set("name")));
            assert_eq!(group.len(), 2);
            assert!(!group.holds(ctx, obj));
            assert!(AllOf::new().holds(ctx, obj));
        });
    }
}
