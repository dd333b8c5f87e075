//! Reactions, species references and kinetic laws.
//!
//! # Rationale
//!
//! A reaction consumes or produces something. Its participants name species,
//! and a kinetic law may only mention species that take part in the
//! reaction, as reactant, product or modifier. Local parameters are scoped to
//! their kinetic law and should not hide a species of the same name.

use crate::identifiers;
use crate::templates::{sbo_rule, MathSet, Parses, RefersTo, ValueKind};
use sbml_lint_core::{
    Category, DeclarationGroup, HasAttributes, HasChildren, HasId, HasMath, Node, ObjectKind,
    RuleDecl, Target,
};

const PARTICIPANT_LISTS: [&str; 3] = ["listOfReactants", "listOfProducts", "listOfModifiers"];

const SPECIES_REFERENCES: &[ObjectKind] = &[
    ObjectKind::SpeciesReference,
    ObjectKind::ModifierSpeciesReference,
];

fn participates(reaction: &Node, species: &str) -> bool {
    PARTICIPANT_LISTS.iter().any(|list| {
        reaction
            .children_in(list)
            .iter()
            .any(|sr| sr.attribute("species") == Some(species))
    })
}

pub(crate) fn groups() -> Vec<DeclarationGroup> {
    vec![
        DeclarationGroup::core(ObjectKind::Reaction)
            .rule(RuleDecl::check(
                21101,
                Category::GeneralConsistency,
                "reaction has a reactant or product",
                |_, r| {
                    !r.children_in("listOfReactants").is_empty()
                        || !r.children_in("listOfProducts").is_empty()
                },
            ))
            .rule(sbo_rule(10707, "reaction sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::SpeciesReference)
            .rule(
                RuleDecl::new(
                    21111,
                    Category::GeneralConsistency,
                    "species reference names a species",
                    RefersTo::new("species", &[ObjectKind::Species]),
                )
                .detail("species"),
            )
            .rule(
                RuleDecl::new(
                    21113,
                    Category::GeneralConsistency,
                    "stoichiometry is a double",
                    Parses::new("stoichiometry", ValueKind::Double),
                )
                .detail("stoichiometry"),
            ),
        DeclarationGroup::core(ObjectKind::ModifierSpeciesReference).rule(
            RuleDecl::new(
                21112,
                Category::GeneralConsistency,
                "modifier names a species",
                RefersTo::new("species", &[ObjectKind::Species]),
            )
            .detail("species"),
        ),
        DeclarationGroup::core(Target::AnyOf(SPECIES_REFERENCES))
            .rule(sbo_rule(10708, "species reference sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::KineticLaw)
            .rule(RuleDecl::check(
                21121,
                Category::GeneralConsistency,
                "kinetic law mentions only participating species",
                |ctx, law| {
                    let (Some(reaction), Some(math)) = (law.parent(), law.math()) else {
                        return true;
                    };
                    let locals: Vec<&str> = law
                        .children_in("listOfLocalParameters")
                        .iter()
                        .filter_map(|p| p.id())
                        .collect();
                    math.identifiers()
                        .into_iter()
                        .filter(|id| !locals.contains(id))
                        .filter(|id| ctx.resolves_to(id, &[ObjectKind::Species]))
                        .all(|id| participates(reaction, id))
                },
            ))
            .rule(RuleDecl::new(
                21130,
                Category::GeneralConsistency,
                "kinetic law has math",
                MathSet,
            ))
            .rule(sbo_rule(10709, "kinetic law sboTerm is well formed")),
        DeclarationGroup::core(ObjectKind::LocalParameter)
            .rule(identifiers::local_parameter_unique())
            .rule(
                RuleDecl::check(
                    81121,
                    Category::ModelingPractice,
                    "local parameter does not shadow a species",
                    |ctx, p| p.id().map_or(true, |id| !ctx.resolves_to(id, &[ObjectKind::Species])),
                )
                .detail("id"),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::testing::{failures, run};
    use sbml_lint_core::{Document, Math, Node, ObjectKind};

    fn species(id: &str) -> Node {
        Node::new(ObjectKind::Species)
            .with_attr("id", id)
            .with_attr("compartment", "c")
            .with_attr("hasOnlySubstanceUnits", "false")
            .with_attr("boundaryCondition", "false")
            .with_attr("constant", "false")
            .with_attr("initialAmount", "0")
    }

    fn reference(list_kind: ObjectKind, species: &str) -> Node {
        Node::new(list_kind).with_attr("species", species)
    }

    fn local(id: &str) -> Node {
        Node::new(ObjectKind::LocalParameter)
            .with_attr("id", id)
            .with_attr("value", "1")
            .with_attr("units", "per_second")
    }

    fn model(reaction: Node) -> Document {
        let m = Node::new(ObjectKind::Model)
            .with_child(
                "listOfUnitDefinitions",
                Node::new(ObjectKind::UnitDefinition).with_attr("id", "per_second").with_child(
                    "listOfUnits",
                    Node::new(ObjectKind::Unit)
                        .with_attr("kind", "second")
                        .with_attr("exponent", "-1")
                        .with_attr("scale", "0")
                        .with_attr("multiplier", "1"),
                ),
            )
            .with_child(
                "listOfCompartments",
                Node::new(ObjectKind::Compartment)
                    .with_attr("id", "c")
                    .with_attr("constant", "true")
                    .with_attr("size", "1"),
            )
            .with_child("listOfSpecies", species("a"))
            .with_child("listOfSpecies", species("b"))
            .with_child("listOfSpecies", species("e"))
            .with_child("listOfReactions", reaction);
        Document::new(3, 2, Some(m))
    }

    fn reaction(law: Node) -> Node {
        Node::new(ObjectKind::Reaction)
            .with_attr("id", "r")
            .with_child("listOfReactants", reference(ObjectKind::SpeciesReference, "a"))
            .with_child("listOfProducts", reference(ObjectKind::SpeciesReference, "b"))
            .with_child("listOfModifiers", reference(ObjectKind::ModifierSpeciesReference, "e"))
            .with_child("kineticLaw", law)
    }

    fn mass_action(ids: &[&str]) -> Math {
        Math::apply("times", ids.iter().map(|id| Math::ci(*id)).collect())
    }

    #[test]
    fn participating_species_only() {
        let law = Node::new(ObjectKind::KineticLaw)
            .with_math(mass_action(&["k", "a", "e"]))
            .with_child("listOfLocalParameters", local("k"));
        assert!(failures(&run(&model(reaction(law)))).is_empty());
    }

    #[test]
    fn outsider_species_in_kinetic_law() {
        let r = Node::new(ObjectKind::Reaction)
            .with_attr("id", "r")
            .with_child("listOfReactants", reference(ObjectKind::SpeciesReference, "a"))
            .with_child(
                "kineticLaw",
                Node::new(ObjectKind::KineticLaw)
                    .with_math(mass_action(&["k", "b"]))
                    .with_child("listOfLocalParameters", local("k")),
            );
        assert_eq!(failures(&run(&model(r))), vec![21121]);
    }

    #[test]
    fn local_parameters() {
        let law = Node::new(ObjectKind::KineticLaw)
            .with_math(mass_action(&["k", "a"]))
            .with_child("listOfLocalParameters", local("k"))
            .with_child("listOfLocalParameters", local("k"))
            .with_child("listOfLocalParameters", local("b"));
        assert_eq!(failures(&run(&model(reaction(law)))), vec![10303, 81121]);
    }

    #[test]
    fn empty_reaction_and_dangling_references() {
        let r = Node::new(ObjectKind::Reaction)
            .with_attr("id", "r")
            .with_child("listOfModifiers", reference(ObjectKind::ModifierSpeciesReference, "z"));
        assert_eq!(failures(&run(&model(r))), vec![21101, 21112]);

        let r = Node::new(ObjectKind::Reaction).with_attr("id", "r").with_child(
            "listOfReactants",
            reference(ObjectKind::SpeciesReference, "a").with_attr("stoichiometry", "two"),
        );
        assert_eq!(failures(&run(&model(r))), vec![21113]);
    }
}
