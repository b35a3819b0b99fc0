//! Identifier Normalization
//!
//! Converts Go-style mixed-case identifiers (`FeedItem`, `UserID`,
//! `HTTPServer`) into the lowercase, underscore-delimited names used as
//! mapping keys. Runs of capitals are treated as one acronym word, except
//! that the last capital of a run starts a new word when a lowercase letter
//! follows it.

/// Convert a mixed-case identifier to snake_case, keeping acronyms together.
///
/// ```
/// use es_mappings::names::camel_to_snake;
///
/// assert_eq!(camel_to_snake("UserID"), "user_id");
/// assert_eq!(camel_to_snake("HTTPServer"), "http_server");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);

    // Uppercase character held back until we know whether a delimiter
    // must precede it.
    let mut pending_upper: Option<char> = None;
    let mut in_upper_run = false;
    let mut last_verbatim: Option<char> = None;

    for c in name.chars() {
        // A non-lowercase character after an uppercase one counts as uppercase.
        let is_upper = c.is_uppercase() || (pending_upper.is_some() && !c.is_lowercase());

        if let Some(upper) = pending_upper {
            let first_in_run = !in_upper_run;
            let last_in_run = !is_upper;

            if !out.is_empty() && (first_in_run || last_in_run) && last_verbatim != Some('_') {
                out.push('_');
            }
            out.extend(upper.to_lowercase());
        }

        if is_upper {
            in_upper_run = pending_upper.is_some();
            pending_upper = Some(c);
            continue;
        }

        out.push(c);
        pending_upper = None;
        last_verbatim = Some(c);
        in_upper_run = false;
    }

    if let Some(upper) = pending_upper {
        out.extend(upper.to_lowercase());
    }

    out
}
