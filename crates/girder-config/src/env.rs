use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional fallback may be given as `{{ env.VAR | default("value") }}`;
/// when the variable is unset the fallback is substituted instead of the
/// expansion failing. Expansion runs before deserialization so config
/// structs hold plain `String`/`SecretString` values.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
                .expect("must be valid regex")
        })
    }

    let re = re();
    let mut missing: Option<String> = None;

    let expanded = re.replace_all(input, |caps: &Captures<'_>| {
        let var = &caps[1];
        match std::env::var(var) {
            Ok(value) => value,
            Err(_) => match caps.get(2) {
                Some(fallback) => fallback.as_str().to_owned(),
                None => {
                    missing.get_or_insert_with(|| var.to_owned());
                    String::new()
                }
            },
        }
    });

    match missing {
        Some(var) => Err(format!("environment variable not found: `{var}`")),
        None => Ok(expanded.into_owned()),
    }
}
