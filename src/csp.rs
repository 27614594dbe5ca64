//! Content-Security-Policy header construction
//!
//! Builds the CSP value the API attaches to every HTML-bearing response.
//! The directive table is fixed; callers may relax the style/script
//! directives for pages with inline content and append extra sources per
//! directive (e.g. a CDN host for `img-src`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Base directive table, in emission order
const BASE_DIRECTIVES: &[(&str, &str)] = &[
    ("default-src", "'self'"),
    ("script-src", "'self'"),
    ("style-src", "'self'"),
    ("img-src", "'self' data: https:"),
    ("font-src", "'self'"),
    ("connect-src", "'self'"),
    ("frame-src", "'none'"),
    ("object-src", "'none'"),
    ("base-uri", "'self'"),
    ("form-action", "'self'"),
];

/// Options controlling how the fixed directive table is relaxed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CspOptions {
    /// Add `'unsafe-inline'` to `style-src`
    pub allow_inline_styles: bool,
    /// Add `'unsafe-inline'` to `script-src`
    pub allow_inline_scripts: bool,
    /// Add `'unsafe-eval'` to `script-src`
    pub allow_eval: bool,
    /// Extra sources appended per directive
    pub additional_sources: BTreeMap<String, Vec<String>>,
}

/// Builds a Content-Security-Policy header value
///
/// # Examples
///
/// ```
/// use palisade::csp::{generate_csp, CspOptions};
///
/// let policy = generate_csp(&CspOptions::default());
/// assert!(policy.starts_with("default-src 'self'"));
/// ```
pub fn generate_csp(options: &CspOptions) -> String {
    let mut directives = Vec::with_capacity(BASE_DIRECTIVES.len());

    for (name, base_sources) in BASE_DIRECTIVES {
        let mut sources = base_sources.to_string();

        if *name == "style-src" && options.allow_inline_styles {
            sources.push_str(" 'unsafe-inline'");
        }
        if *name == "script-src" {
            if options.allow_inline_scripts {
                sources.push_str(" 'unsafe-inline'");
            }
            if options.allow_eval {
                sources.push_str(" 'unsafe-eval'");
            }
        }

        if let Some(extra) = options.additional_sources.get(*name) {
            for source in extra {
                sources.push(' ');
                sources.push_str(source);
            }
        }

        directives.push(format!("{} {}", name, sources));
    }

    directives.join("; ")
}
