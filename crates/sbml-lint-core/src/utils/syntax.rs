//! Lexical checks for SBML identifier and term syntax.

/// Checks the `SId` production: `(letter | '_') (letter | digit | '_')*`.
///
/// # Examples
///
/// ```ignore
/// assert!(is_sid("k_1"));
/// assert!(!is_sid("1k"));
/// ```
#[must_use]
pub fn is_sid(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks the `UnitSId` production, which shares the `SId` syntax.
#[must_use]
pub fn is_unit_sid(value: &str) -> bool {
    is_sid(value)
}

/// Checks an `sboTerm` value: `SBO:` followed by exactly seven digits.
#[must_use]
pub fn is_sbo_term(value: &str) -> bool {
    value
        .strip_prefix("SBO:")
        .is_some_and(|digits| digits.len() == 7 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Checks a Hill-system chemical formula such as `C6H12O6`: a sequence of
/// element symbols (uppercase letter, optional lowercase letter) each followed
/// by an optional count.
#[must_use]
pub fn is_chemical_formula(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_uppercase() {
            return false;
        }
        i += 1;
        if i < bytes.len() && bytes[i].is_ascii_lowercase() {
            i += 1;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    true
}
