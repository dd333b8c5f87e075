//! Predefined SBML unit kinds.

/// Unit kinds valid at every level.
const COMMON_KINDS: &[&str] = &[
    "ampere",
    "becquerel",
    "candela",
    "coulomb",
    "dimensionless",
    "farad",
    "gram",
    "gray",
    "henry",
    "hertz",
    "item",
    "joule",
    "katal",
    "kelvin",
    "kilogram",
    "lumen",
    "lux",
    "mole",
    "newton",
    "ohm",
    "pascal",
    "radian",
    "second",
    "siemens",
    "sievert",
    "steradian",
    "tesla",
    "volt",
    "watt",
    "weber",
];

/// Returns true if `name` is a predefined unit kind at the given level.
///
/// Level 3 spells lengths and volumes `metre`/`litre` only and adds `avogadro`;
/// levels 1 and 2 also accept `meter`/`liter`, and `Celsius` survives until level 2.
#[must_use]
pub fn is_base_unit(name: &str, level: u32) -> bool {
    if COMMON_KINDS.contains(&name) || name == "metre" || name == "litre" {
        return true;
    }
    match level {
        3 => name == "avogadro",
        1 | 2 => matches!(name, "meter" | "liter" | "Celsius"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_specific_kinds() {
        assert!(is_base_unit("mole", 3));
        assert!(is_base_unit("avogadro", 3));
        assert!(!is_base_unit("avogadro", 2));
        assert!(is_base_unit("liter", 2));
        assert!(!is_base_unit("liter", 3));
        assert!(!is_base_unit("furlong", 3));
    }
}
