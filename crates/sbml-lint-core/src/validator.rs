//! Validation context and dispatch engine.

use crate::catalog::{Catalog, Selection};
use crate::config::{Config, ConfigError};
use crate::context::{CheckContext, IdIndex};
use crate::document::{Document, HasChildren, HasExtensions, Node, ObjectKind, ObjectRef};
use crate::log::ErrorLog;
use crate::messages::{MessageCatalog, Synthesizer};
use crate::rule::RuleEvent;
use crate::types::{is_supported_level_version, Category, PackageTag, RuleId, Severity};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Phase of a [`ValidationContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Settings applied, nothing resolved yet.
    Configured,
    /// Computing the rules for the root type.
    Resolving,
    /// Walking the tree.
    Traversing,
    /// The walk returned to the root; the log is stable until [`ValidationContext::clear`].
    Finished,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Objects visited.
    pub objects: usize,
    /// Predicate evaluations.
    pub evaluations: usize,
    /// Evaluations that returned false.
    pub failures: usize,
    /// Evaluations that panicked.
    pub defects: usize,
}

/// Builder for configuring a [`ValidationContext`].
#[derive(Debug)]
pub struct ValidationContextBuilder {
    catalog: Arc<Catalog>,
    messages: Arc<MessageCatalog>,
    level: Option<u32>,
    version: Option<u32>,
    categories: Option<BTreeSet<Category>>,
    packages: Option<BTreeSet<PackageTag>>,
    disabled: BTreeSet<RuleId>,
    overrides: BTreeMap<RuleId, Severity>,
}

impl ValidationContextBuilder {
    fn new(catalog: Arc<Catalog>, messages: Arc<MessageCatalog>) -> Self {
        Self {
            catalog,
            messages,
            level: None,
            version: None,
            categories: None,
            packages: None,
            disabled: BTreeSet::new(),
            overrides: BTreeMap::new(),
        }
    }

    /// Validates against this level instead of the document's.
    #[must_use]
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Validates against this version instead of the document's.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Restricts the run to these categories (default: all).
    #[must_use]
    pub fn categories<I: IntoIterator<Item = Category>>(mut self, categories: I) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    /// Sets the packages to check (default: those the document declares).
    #[must_use]
    pub fn packages<I: IntoIterator<Item = PackageTag>>(mut self, packages: I) -> Self {
        self.packages = Some(packages.into_iter().collect());
        self
    }

    /// Removes a rule from resolution.
    #[must_use]
    pub fn disable(mut self, id: impl Into<RuleId>) -> Self {
        self.disabled.insert(id.into());
        self
    }

    /// Overrides the severity of a rule's diagnostics.
    #[must_use]
    pub fn severity(mut self, id: impl Into<RuleId>, severity: Severity) -> Self {
        self.overrides.insert(id.into(), severity);
        self
    }

    /// Applies a loaded configuration. Later builder calls win.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule key is not a decimal id.
    pub fn config(mut self, config: &Config) -> Result<Self, ConfigError> {
        let validation = &config.validation;
        if let Some(level) = validation.level {
            self.level = Some(level);
        }
        if let Some(version) = validation.version {
            self.version = Some(version);
        }
        if let Some(categories) = &validation.categories {
            self.categories = Some(categories.iter().copied().collect());
        }
        if let Some(packages) = &validation.packages {
            self.packages = Some(packages.iter().copied().collect());
        }
        for (id, _) in config.rule_overrides()? {
            if !config.is_rule_enabled(id) {
                self.disabled.insert(id);
            }
            if let Some(severity) = config.rule_severity(id) {
                self.overrides.insert(id, severity);
            }
        }
        Ok(self)
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty category set, an impossible
    /// level/version pair, packages below level 3 or unknown rule ids.
    pub fn build(self) -> Result<ValidationContext, ConfigError> {
        let mut context = ValidationContext {
            catalog: self.catalog,
            messages: self.messages,
            level: self.level,
            version: self.version,
            categories: self
                .categories
                .unwrap_or_else(|| Category::ALL.into_iter().collect()),
            packages: self.packages,
            disabled: self.disabled,
            overrides: self.overrides,
            state: RunState::Configured,
            resolved: BTreeMap::new(),
            quarantined: BTreeSet::new(),
            stats: RunStats::default(),
            log: ErrorLog::new(),
        };
        context.check_settings()?;
        Ok(context)
    }
}

/// Run-scoped configuration, resolved rules and error log.
///
/// A context validates one document at a time. Reuse it with
/// [`ValidationContext::clear`] between runs; the log is never cleared
/// implicitly.
///
/// # Example
///
/// ```ignore
/// let mut context = ValidationContext::builder(catalog, messages)
///     .categories([Category::GeneralConsistency])
///     .build()?;
/// let log = context.validate(&document)?;
/// println!("{}", log.format_report());
/// ```
#[derive(Debug)]
pub struct ValidationContext {
    catalog: Arc<Catalog>,
    messages: Arc<MessageCatalog>,
    level: Option<u32>,
    version: Option<u32>,
    categories: BTreeSet<Category>,
    packages: Option<BTreeSet<PackageTag>>,
    disabled: BTreeSet<RuleId>,
    overrides: BTreeMap<RuleId, Severity>,
    state: RunState,
    resolved: BTreeMap<ObjectKind, Arc<[RuleId]>>,
    quarantined: BTreeSet<RuleId>,
    stats: RunStats,
    log: ErrorLog,
}

impl ValidationContext {
    /// Creates a new builder over a catalog and its message templates.
    #[must_use]
    pub fn builder(catalog: Arc<Catalog>, messages: Arc<MessageCatalog>) -> ValidationContextBuilder {
        ValidationContextBuilder::new(catalog, messages)
    }

    /// Returns the current phase.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns the diagnostics accumulated so far.
    #[must_use]
    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    /// Returns the counters of the last run.
    #[must_use]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns every rule id resolved during the last run, markers excluded.
    #[must_use]
    pub fn resolved_rules(&self) -> BTreeSet<RuleId> {
        self.resolved
            .values()
            .flat_map(|ids| ids.iter().copied())
            .filter(|id| !id.is_sentinel())
            .collect()
    }

    /// Returns the active categories.
    #[must_use]
    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    /// Replaces the active categories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoCategories`] for an empty set.
    pub fn set_categories<I: IntoIterator<Item = Category>>(
        &mut self,
        categories: I,
    ) -> Result<(), ConfigError> {
        let categories: BTreeSet<Category> = categories.into_iter().collect();
        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        self.categories = categories;
        self.reconfigure();
        Ok(())
    }

    /// Replaces the level/version override.
    ///
    /// # Errors
    ///
    /// Returns an error for an impossible pair or packages below level 3.
    pub fn set_level_version(&mut self, level: u32, version: u32) -> Result<(), ConfigError> {
        let previous = (self.level, self.version);
        self.level = Some(level);
        self.version = Some(version);
        if let Err(err) = self.check_settings() {
            (self.level, self.version) = previous;
            return Err(err);
        }
        self.reconfigure();
        Ok(())
    }

    /// Replaces the package set (`None` restores the document default).
    ///
    /// # Errors
    ///
    /// Returns an error if packages are requested below level 3.
    pub fn set_packages(&mut self, packages: Option<BTreeSet<PackageTag>>) -> Result<(), ConfigError> {
        let previous = std::mem::replace(&mut self.packages, packages);
        if let Err(err) = self.check_settings() {
            self.packages = previous;
            return Err(err);
        }
        self.reconfigure();
        Ok(())
    }

    /// Discards the log and the per-run caches; settings are kept.
    pub fn clear(&mut self) {
        self.log.clear();
        self.reconfigure();
    }

    fn reconfigure(&mut self) {
        self.resolved.clear();
        self.quarantined.clear();
        self.stats = RunStats::default();
        self.state = RunState::Configured;
    }

    fn check_settings(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if let (Some(level), Some(version)) = (self.level, self.version) {
            if !is_supported_level_version(level, version) {
                return Err(ConfigError::UnsupportedLevelVersion { level, version });
            }
        }
        if let (Some(level), Some(packages)) = (self.level, &self.packages) {
            if let Some(package) = packages.iter().next() {
                if level < 3 {
                    return Err(ConfigError::PackageRequiresLevel3 {
                        package: *package,
                        level,
                    });
                }
            }
        }
        let configured = self.disabled.iter().chain(self.overrides.keys());
        for id in configured {
            if !self.catalog.contains(*id) {
                return Err(ConfigError::UnknownRule { id: *id });
            }
        }
        Ok(())
    }

    /// Computes the selection for a document, rejecting impossible settings.
    fn select(&self, document: &Document) -> Result<Selection, ConfigError> {
        let level = self.level.unwrap_or_else(|| document.level());
        let version = self.version.unwrap_or_else(|| document.version());
        if !is_supported_level_version(level, version) {
            return Err(ConfigError::UnsupportedLevelVersion { level, version });
        }

        let packages = match &self.packages {
            Some(requested) => {
                if let Some(package) = requested.iter().next() {
                    if level < 3 {
                        return Err(ConfigError::PackageRequiresLevel3 {
                            package: *package,
                            level,
                        });
                    }
                }
                for package in requested.difference(document.packages()) {
                    debug!(%package, "package not declared by the document, skipping");
                }
                requested
                    .intersection(document.packages())
                    .copied()
                    .collect()
            }
            None if level < 3 => {
                if !document.packages().is_empty() {
                    debug!(level, "ignoring package declarations below level 3");
                }
                BTreeSet::new()
            }
            None => document.packages().clone(),
        };

        Ok(Selection {
            level,
            version,
            categories: self.categories.clone(),
            packages,
            disabled: self.disabled.clone(),
        })
    }

    /// Validates a document and returns the accumulated log.
    ///
    /// Diagnostics are appended to whatever the log already holds; call
    /// [`ValidationContext::clear`] first to start fresh.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any traversal if the effective
    /// settings are impossible for this document.
    pub fn validate(&mut self, document: &Document) -> Result<&ErrorLog, ConfigError> {
        let selection = self.select(document)?;
        self.reconfigure();

        self.state = RunState::Resolving;
        let catalog = Arc::clone(&self.catalog);
        let root_rules = catalog.resolve(ObjectKind::Document, &selection);
        debug!(
            level = selection.level,
            version = selection.version,
            packages = ?selection.packages,
            root_rules = root_rules.len(),
            "resolved root rules"
        );
        self.resolved.insert(ObjectKind::Document, root_rules.into());

        self.state = RunState::Traversing;
        let index = IdIndex::build(document, &selection.packages);
        let ctx = CheckContext::new(selection.level, selection.version, document, &index);
        let before = self.log.count();
        let mut dispatch = Dispatch {
            catalog: &catalog,
            selection: &selection,
            ctx: &ctx,
            synthesizer: Synthesizer::new(&self.messages, &self.overrides),
            resolved: &mut self.resolved,
            quarantined: &mut self.quarantined,
            stats: &mut self.stats,
            log: &mut self.log,
        };
        let mut ancestors = Vec::new();
        dispatch.visit(document.root(), &mut ancestors);

        self.state = RunState::Finished;
        info!(
            objects = self.stats.objects,
            evaluations = self.stats.evaluations,
            diagnostics = self.log.count() - before,
            defects = self.stats.defects,
            "validation complete"
        );
        Ok(&self.log)
    }
}

/// One traversal: borrows the context's caches and log for the run.
struct Dispatch<'v, 'd> {
    catalog: &'v Catalog,
    selection: &'v Selection,
    ctx: &'v CheckContext<'d>,
    synthesizer: Synthesizer<'v>,
    resolved: &'v mut BTreeMap<ObjectKind, Arc<[RuleId]>>,
    quarantined: &'v mut BTreeSet<RuleId>,
    stats: &'v mut RunStats,
    log: &'v mut ErrorLog,
}

impl<'d> Dispatch<'_, 'd> {
    fn rules_for(&mut self, kind: ObjectKind) -> Arc<[RuleId]> {
        let catalog = self.catalog;
        let selection = self.selection;
        Arc::clone(
            self.resolved
                .entry(kind)
                .or_insert_with(|| catalog.resolve(kind, selection).into()),
        )
    }

    fn visit(&mut self, node: &'d Node, ancestors: &mut Vec<&'d Node>) {
        self.stats.objects += 1;
        let kind = node.kind();
        let ids = self.rules_for(kind);
        let obj = ObjectRef::new(node, ancestors.as_slice(), self.ctx.document());

        let mut recurse = false;
        let mut group = false;
        for &id in ids.iter() {
            if id == RuleId::RECURSE_TREE {
                recurse = true;
                continue;
            }
            if id == RuleId::VALIDATE_GROUP {
                group = true;
                continue;
            }
            if self.quarantined.contains(&id) {
                continue;
            }
            let Some(rule) = self.catalog.rule(id) else {
                continue;
            };
            self.stats.evaluations += 1;
            match rule.evaluate(self.ctx, obj) {
                RuleEvent::Passed(_) => {}
                RuleEvent::Failed(_) => {
                    self.stats.failures += 1;
                    self.log.push(self.synthesizer.on_rule_failed(rule, obj));
                }
                RuleEvent::Defect { reason, .. } => {
                    warn!(rule = %id, element = %kind, %reason, "rule evaluation failed");
                    self.stats.defects += 1;
                    self.quarantined.insert(id);
                    self.log
                        .push(self.synthesizer.on_evaluation_failed(rule, obj, &reason));
                }
            }
        }

        if !recurse && !group {
            return;
        }
        ancestors.push(node);
        if recurse {
            for list in kind.child_lists() {
                for child in node.children_in(list) {
                    self.visit(child, ancestors);
                }
            }
        }
        if group {
            let catalog = self.catalog;
            for package in catalog.packages() {
                let tag = package.tag();
                if !self.selection.packages.contains(&tag) || !package.hosts(kind) {
                    continue;
                }
                if let Some(extension) = node.extension(tag) {
                    self.visit(extension, ancestors);
                }
            }
        }
        ancestors.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DeclarationGroup, PackageDecl};
    use crate::document::HasAttributes;
    use crate::rule::RuleDecl;

    fn catalog() -> Arc<Catalog> {
        let catalog = Catalog::builder()
            .package(
                PackageDecl::new(PackageTag::Fbc, 2_000_000..=2_999_999)
                    .extends(ObjectKind::Species, ObjectKind::FbcSpeciesPlugin),
            )
            .group(DeclarationGroup::core(ObjectKind::Species).rule(RuleDecl::check(
                20601,
                Category::GeneralConsistency,
                "species has a compartment",
                |_, o| o.is_set("compartment"),
            )))
            .group(
                DeclarationGroup::package(PackageTag::Fbc, ObjectKind::FbcSpeciesPlugin).rule(
                    RuleDecl::check(2_020_601, Category::GeneralConsistency, "charge", |_, o| {
                        o.number("charge").is_some()
                    }),
                ),
            )
            .build()
            .unwrap();
        Arc::new(catalog)
    }

    fn document() -> Document {
        let species = Node::new(ObjectKind::Species)
            .with_attr("id", "s1")
            .with_extension(
                PackageTag::Fbc,
                Node::new(ObjectKind::FbcSpeciesPlugin).with_attr("charge", "x"),
            );
        let model = Node::new(ObjectKind::Model).with_child("listOfSpecies", species);
        Document::new(3, 1, Some(model)).with_package(PackageTag::Fbc)
    }

    fn context() -> ValidationContext {
        ValidationContext::builder(catalog(), Arc::new(MessageCatalog::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn walks_children_and_extensions() {
        let mut ctx = context();
        let doc = document();
        let codes = ctx.validate(&doc).unwrap().codes();
        assert_eq!(codes, vec![RuleId::new(20601), RuleId::new(2_020_601)]);
        assert_eq!(ctx.state(), RunState::Finished);
        assert_eq!(ctx.stats().objects, 4);
    }

    #[test]
    fn log_accumulates_until_cleared() {
        let mut ctx = context();
        let doc = document();
        ctx.validate(&doc).unwrap();
        ctx.validate(&doc).unwrap();
        assert_eq!(ctx.log().count(), 4);
        ctx.clear();
        assert_eq!(ctx.state(), RunState::Configured);
        assert_eq!(ctx.validate(&doc).unwrap().count(), 2);
    }

    #[test]
    fn undeclared_package_is_not_traversed() {
        let mut ctx = ValidationContext::builder(catalog(), Arc::new(MessageCatalog::new()))
            .packages([PackageTag::Fbc])
            .build()
            .unwrap();
        let species = Node::new(ObjectKind::Species).with_extension(
            PackageTag::Fbc,
            Node::new(ObjectKind::FbcSpeciesPlugin),
        );
        let doc = Document::new(3, 1, Some(Node::new(ObjectKind::Model).with_child("listOfSpecies", species)));
        let log = ctx.validate(&doc).unwrap();
        assert_eq!(log.codes(), vec![RuleId::new(20601)]);
        assert!(!ctx.resolved_rules().contains(&RuleId::new(2_020_601)));
    }

    #[test]
    fn builder_rejects_bad_settings() {
        let err = ValidationContext::builder(catalog(), Arc::new(MessageCatalog::new()))
            .categories([])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoCategories));

        let err = ValidationContext::builder(catalog(), Arc::new(MessageCatalog::new()))
            .disable(99_999u32)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { .. }));

        let err = ValidationContext::builder(catalog(), Arc::new(MessageCatalog::new()))
            .level(2)
            .packages([PackageTag::Fbc])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::PackageRequiresLevel3 { .. }));
    }

    #[test]
    fn impossible_document_level_is_rejected_before_traversal() {
        let mut ctx = context();
        let doc = Document::new(3, 7, None);
        assert!(matches!(
            ctx.validate(&doc),
            Err(ConfigError::UnsupportedLevelVersion { level: 3, version: 7 })
        ));
        assert_eq!(ctx.state(), RunState::Configured);
        assert!(ctx.log().is_empty());
    }

    #[test]
    fn setters_keep_previous_settings_on_error() {
        let mut ctx = context();
        assert!(ctx.set_level_version(2, 9).is_err());
        assert!(ctx.set_categories([]).is_err());
        ctx.set_categories([Category::UnitsConsistency]).unwrap();
        let doc = document();
        assert!(ctx.validate(&doc).unwrap().is_empty());
    }
}
