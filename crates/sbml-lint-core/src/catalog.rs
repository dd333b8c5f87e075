//! The rule catalog and the applicability resolver.
//!
//! Declarations are registered explicitly through [`CatalogBuilder`]: one
//! [`DeclarationGroup`] per object type (or set of types), optionally scoped to
//! a package. The built [`Catalog`] is immutable and can be shared across
//! threads.

use crate::document::ObjectKind;
use crate::rule::RuleDecl;
use crate::types::{Category, PackageTag, RuleId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::debug;

/// Object types a declaration group applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A single kind.
    Kind(ObjectKind),
    /// Several kinds sharing the same rules.
    AnyOf(&'static [ObjectKind]),
}

impl Target {
    /// Returns the targeted kinds.
    #[must_use]
    pub fn kinds(&self) -> &[ObjectKind] {
        match self {
            Self::Kind(kind) => std::slice::from_ref(kind),
            Self::AnyOf(kinds) => kinds,
        }
    }

    /// Returns true if the target covers `kind`.
    #[must_use]
    pub fn contains(&self, kind: ObjectKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl From<ObjectKind> for Target {
    fn from(kind: ObjectKind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.kinds().iter().map(|k| k.element_name()).collect();
        f.write_str(&names.join("|"))
    }
}

/// Ordered rules for one object type, from the core or from one package.
#[derive(Debug, Clone)]
pub struct DeclarationGroup {
    package: Option<PackageTag>,
    target: Target,
    rules: Vec<RuleDecl>,
}

impl DeclarationGroup {
    /// Starts a core group.
    #[must_use]
    pub fn core(target: impl Into<Target>) -> Self {
        Self {
            package: None,
            target: target.into(),
            rules: Vec::new(),
        }
    }

    /// Starts a group contributed by a package.
    #[must_use]
    pub fn package(package: PackageTag, target: impl Into<Target>) -> Self {
        Self {
            package: Some(package),
            target: target.into(),
            rules: Vec::new(),
        }
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, rule: RuleDecl) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules.
    #[must_use]
    pub fn rules<I: IntoIterator<Item = RuleDecl>>(mut self, rules: I) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Returns the contributing package, `None` for core.
    #[must_use]
    pub fn scope(&self) -> Option<PackageTag> {
        self.package
    }

    /// Returns the targeted kinds.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the rules in registration order.
    #[must_use]
    pub fn declarations(&self) -> &[RuleDecl] {
        &self.rules
    }
}

/// Registration record of an optional package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    tag: PackageTag,
    ids: RangeInclusive<u32>,
    extension_points: Vec<(ObjectKind, ObjectKind)>,
}

impl PackageDecl {
    /// Declares a package and its reserved id range.
    #[must_use]
    pub fn new(tag: PackageTag, ids: RangeInclusive<u32>) -> Self {
        Self {
            tag,
            ids,
            extension_points: Vec::new(),
        }
    }

    /// Declares that the package attaches a `plugin` sub-tree to `host` objects.
    #[must_use]
    pub fn extends(mut self, host: ObjectKind, plugin: ObjectKind) -> Self {
        self.extension_points.push((host, plugin));
        self
    }

    /// Returns the package tag.
    #[must_use]
    pub fn tag(&self) -> PackageTag {
        self.tag
    }

    /// Returns the reserved id range.
    #[must_use]
    pub fn ids(&self) -> &RangeInclusive<u32> {
        &self.ids
    }

    /// Returns true if the package attaches data to `host` objects.
    #[must_use]
    pub fn hosts(&self, host: ObjectKind) -> bool {
        self.extension_points.iter().any(|(h, _)| *h == host)
    }

    /// Returns the `(host, plugin)` pairs.
    #[must_use]
    pub fn extension_points(&self) -> &[(ObjectKind, ObjectKind)] {
        &self.extension_points
    }

    fn owns(&self, id: RuleId) -> bool {
        self.ids.contains(&id.get())
    }
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum CatalogError {
    /// Two declarations share an identifier.
    #[error("rule {id} is declared more than once")]
    #[diagnostic(
        code(sbml_lint::catalog::duplicate_rule),
        help("each rule id must map to exactly one predicate")
    )]
    DuplicateRule {
        /// The duplicated identifier.
        id: RuleId,
    },

    /// A declaration uses one of the recursion markers.
    #[error("rule id {id} is reserved for traversal markers")]
    #[diagnostic(code(sbml_lint::catalog::reserved_id))]
    ReservedId {
        /// The reserved identifier.
        id: RuleId,
    },

    /// The same (scope, target) pair is registered twice.
    #[error("{scope} declarations for <{target}> are registered twice")]
    #[diagnostic(code(sbml_lint::catalog::duplicate_group))]
    DuplicateGroup {
        /// `core` or the package tag.
        scope: String,
        /// Targeted kinds.
        target: String,
    },

    /// A package rule lies outside the package's reserved range.
    #[error("rule {id} of package `{package}` lies outside its reserved range")]
    #[diagnostic(code(sbml_lint::catalog::outside_range))]
    OutsidePackageRange {
        /// Offending identifier.
        id: RuleId,
        /// Declaring package.
        package: PackageTag,
    },

    /// A core rule lies inside a package's reserved range.
    #[error("core rule {id} lies inside the range reserved for `{package}`")]
    #[diagnostic(code(sbml_lint::catalog::core_in_package_range))]
    CoreRuleInPackageRange {
        /// Offending identifier.
        id: RuleId,
        /// Package owning the range.
        package: PackageTag,
    },

    /// A group names a package that was never registered.
    #[error("package `{package}` has declarations but is not registered")]
    #[diagnostic(code(sbml_lint::catalog::unknown_package))]
    UnknownPackage {
        /// The unregistered package.
        package: PackageTag,
    },

    /// A group targets a kind defined by a different package.
    #[error("{scope} declarations cannot target <{kind}>")]
    #[diagnostic(code(sbml_lint::catalog::kind_mismatch))]
    KindPackageMismatch {
        /// `core` or the package tag.
        scope: String,
        /// Offending kind.
        kind: ObjectKind,
    },

    /// A package is registered twice.
    #[error("package `{package}` is registered twice")]
    #[diagnostic(code(sbml_lint::catalog::duplicate_package))]
    DuplicatePackage {
        /// The duplicated package.
        package: PackageTag,
    },

    /// Two packages reserve overlapping id ranges.
    #[error("id ranges of `{first}` and `{second}` overlap")]
    #[diagnostic(code(sbml_lint::catalog::overlapping_ranges))]
    OverlappingRanges {
        /// Earlier package.
        first: PackageTag,
        /// Later package.
        second: PackageTag,
    },
}

fn scope_name(package: Option<PackageTag>) -> String {
    package.map_or_else(|| "core".to_string(), |p| p.to_string())
}

/// Builder for [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    packages: Vec<PackageDecl>,
    groups: Vec<DeclarationGroup>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package. Registration order fixes diagnostic order.
    #[must_use]
    pub fn package(mut self, package: PackageDecl) -> Self {
        self.packages.push(package);
        self
    }

    /// Registers a declaration group.
    #[must_use]
    pub fn group(mut self, group: DeclarationGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Registers several declaration groups.
    #[must_use]
    pub fn groups<I: IntoIterator<Item = DeclarationGroup>>(mut self, groups: I) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Validates the declarations and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found among the declarations.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for (i, package) in self.packages.iter().enumerate() {
            for earlier in &self.packages[..i] {
                if earlier.tag == package.tag {
                    return Err(CatalogError::DuplicatePackage {
                        package: package.tag,
                    });
                }
                if earlier.ids.start() <= package.ids.end()
                    && package.ids.start() <= earlier.ids.end()
                {
                    return Err(CatalogError::OverlappingRanges {
                        first: earlier.tag,
                        second: package.tag,
                    });
                }
            }
        }

        let mut index = HashMap::new();
        for (g, group) in self.groups.iter().enumerate() {
            self.check_group(g, group)?;
            for (r, rule) in group.rules.iter().enumerate() {
                let id = rule.id();
                if id.is_sentinel() {
                    return Err(CatalogError::ReservedId { id });
                }
                self.check_range(group.package, id)?;
                if index.insert(id, (g, r)).is_some() {
                    return Err(CatalogError::DuplicateRule { id });
                }
            }
        }

        debug!(
            packages = self.packages.len(),
            groups = self.groups.len(),
            rules = index.len(),
            "rule catalog built"
        );

        Ok(Catalog {
            packages: self.packages,
            groups: self.groups,
            index,
        })
    }

    fn check_group(&self, position: usize, group: &DeclarationGroup) -> Result<(), CatalogError> {
        if let Some(package) = group.package {
            if !self.packages.iter().any(|p| p.tag == package) {
                return Err(CatalogError::UnknownPackage { package });
            }
        }
        for kind in group.target.kinds() {
            if let Some(owner) = kind.package() {
                if group.package != Some(owner) {
                    return Err(CatalogError::KindPackageMismatch {
                        scope: scope_name(group.package),
                        kind: *kind,
                    });
                }
            }
        }
        let duplicate = self.groups[..position]
            .iter()
            .any(|g| g.package == group.package && g.target == group.target);
        if duplicate {
            return Err(CatalogError::DuplicateGroup {
                scope: scope_name(group.package),
                target: group.target.to_string(),
            });
        }
        Ok(())
    }

    fn check_range(&self, scope: Option<PackageTag>, id: RuleId) -> Result<(), CatalogError> {
        match scope {
            Some(package) => {
                let inside = self
                    .packages
                    .iter()
                    .find(|p| p.tag == package)
                    .is_some_and(|p| p.owns(id));
                if inside {
                    Ok(())
                } else {
                    Err(CatalogError::OutsidePackageRange { id, package })
                }
            }
            None => match self.packages.iter().find(|p| p.owns(id)) {
                Some(p) => Err(CatalogError::CoreRuleInPackageRange { id, package: p.tag }),
                None => Ok(()),
            },
        }
    }
}

/// The parameters one run resolves rules for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Effective SBML level.
    pub level: u32,
    /// Effective SBML version.
    pub version: u32,
    /// Active categories.
    pub categories: BTreeSet<Category>,
    /// Active packages.
    pub packages: BTreeSet<PackageTag>,
    /// Rules removed by configuration.
    pub disabled: BTreeSet<RuleId>,
}

impl Selection {
    /// Selects every category, no package and no disabled rule.
    #[must_use]
    pub fn new(level: u32, version: u32) -> Self {
        Self {
            level,
            version,
            categories: Category::ALL.into_iter().collect(),
            packages: BTreeSet::new(),
            disabled: BTreeSet::new(),
        }
    }

    /// Replaces the category set.
    #[must_use]
    pub fn with_categories<I: IntoIterator<Item = Category>>(mut self, categories: I) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Replaces the package set.
    #[must_use]
    pub fn with_packages<I: IntoIterator<Item = PackageTag>>(mut self, packages: I) -> Self {
        self.packages = packages.into_iter().collect();
        self
    }

    fn admits(&self, rule: &RuleDecl) -> bool {
        self.categories.contains(&rule.category())
            && rule.level_gate().admits(self.level, self.version)
            && !self.disabled.contains(&rule.id())
    }
}

/// Immutable, shareable rule catalog.
#[derive(Debug)]
pub struct Catalog {
    packages: Vec<PackageDecl>,
    groups: Vec<DeclarationGroup>,
    index: HashMap<RuleId, (usize, usize)>,
}

impl Catalog {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Returns the number of declared rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no rule is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks a rule up by identifier.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&RuleDecl> {
        let (g, r) = self.index.get(&id)?;
        self.groups.get(*g)?.rules.get(*r)
    }

    /// Returns true if the identifier is declared.
    #[must_use]
    pub fn contains(&self, id: RuleId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns the group declaring `id`.
    #[must_use]
    pub fn group_of(&self, id: RuleId) -> Option<&DeclarationGroup> {
        let (g, _) = self.index.get(&id)?;
        self.groups.get(*g)
    }

    /// Returns every group in registration order.
    #[must_use]
    pub fn groups(&self) -> &[DeclarationGroup] {
        &self.groups
    }

    /// Returns the registered packages in registration order.
    #[must_use]
    pub fn packages(&self) -> &[PackageDecl] {
        &self.packages
    }

    /// Returns the package whose range contains `id`.
    #[must_use]
    pub fn package_for(&self, id: RuleId) -> Option<PackageTag> {
        self.packages.iter().find(|p| p.owns(id)).map(PackageDecl::tag)
    }

    /// Iterates over every rule, ordered by identifier.
    pub fn rules(&self) -> impl Iterator<Item = &RuleDecl> {
        let mut ids: Vec<RuleId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().filter_map(move |id| self.rule(id))
    }

    /// Returns the rules that apply to `kind` for one category.
    ///
    /// Containers get the two traversal markers first. Core contributions
    /// precede package contributions; packages contribute in registration
    /// order and only when listed in `packages`.
    #[must_use]
    pub fn applicable_ids(
        &self,
        kind: ObjectKind,
        level: u32,
        version: u32,
        category: Category,
        packages: &BTreeSet<PackageTag>,
    ) -> Vec<RuleId> {
        let selection = Selection::new(level, version)
            .with_categories([category])
            .with_packages(packages.iter().copied());
        self.resolve(kind, &selection)
    }

    /// Returns the rules that apply to `kind` for every selected category.
    #[must_use]
    pub fn resolve(&self, kind: ObjectKind, selection: &Selection) -> Vec<RuleId> {
        let mut ids = Vec::new();
        if self.is_container(kind, &selection.packages) {
            ids.push(RuleId::RECURSE_TREE);
            ids.push(RuleId::VALIDATE_GROUP);
        }

        let scopes = std::iter::once(None).chain(
            self.packages
                .iter()
                .map(PackageDecl::tag)
                .filter(|tag| selection.packages.contains(tag))
                .map(Some),
        );
        for scope in scopes {
            for group in self
                .groups
                .iter()
                .filter(|g| g.package == scope && g.target.contains(kind))
            {
                ids.extend(
                    group
                        .rules
                        .iter()
                        .filter(|rule| selection.admits(rule))
                        .map(RuleDecl::id),
                );
            }
        }
        ids
    }

    fn is_container(&self, kind: ObjectKind, packages: &BTreeSet<PackageTag>) -> bool {
        matches!(kind, ObjectKind::Document | ObjectKind::Model)
            || !kind.child_lists().is_empty()
            || self
                .packages
                .iter()
                .any(|p| packages.contains(&p.tag) && p.hosts(kind))
    }
}
