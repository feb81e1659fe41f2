//! Derive environment variable names from field identifiers.

/// Turn a field identifier into an environment variable token.
///
/// Letters are upper-cased and a `_` is inserted wherever a run of uppercase
/// letters or a run of digits begins. Acronyms stay glued together
/// (`OTLPConfig` → `OTLPCONFIG`). Other ASCII characters pass through as-is
/// and break any run, so `OTLP_Config` becomes `OTLP__CONFIG`. Non-ASCII
/// characters are dropped.
///
/// Returns an empty string when the identifier has no ASCII letters or digits.
pub fn env_variable_name(identifier: &str) -> String {
    if !identifier.chars().any(|c| c.is_ascii_alphanumeric()) {
        return String::new();
    }

    let mut out = String::with_capacity(identifier.len() + identifier.len() / 2);
    let mut previous_upper = true;
    let mut previous_digit = false;

    for c in identifier.chars().filter(char::is_ascii) {
        if c.is_ascii_digit() {
            if !previous_digit {
                out.push('_');
            }
            previous_digit = true;
        } else {
            previous_digit = false;
        }

        if c.is_ascii_uppercase() {
            if !previous_upper {
                out.push('_');
            }
            previous_upper = true;
        } else {
            previous_upper = false;
        }

        out.push(c.to_ascii_uppercase());
    }

    out
}

/// Join a parent's variable name and a child's derived token with `_`.
pub(crate) fn join(parent: &str, child: &str) -> String {
    format!("{parent}_{child}")
}
