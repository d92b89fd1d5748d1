//! Page templates
//!
//! Templates are compiled into the binary and use `{{ name }}`
//! placeholders. Substituted values are always HTML-escaped.

/// The pages this application can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Ballot,
    Ineligible,
    NotFound,
    Error,
}

impl Template {
    fn source(self) -> &'static str {
        match self {
            Template::Index => include_str!("../templates/index.html"),
            Template::Ballot => include_str!("../templates/ballot.html"),
            Template::Ineligible => include_str!("../templates/ineligible.html"),
            Template::NotFound => include_str!("../templates/404.html"),
            Template::Error => include_str!("../templates/error.html"),
        }
    }
}

/// Render a template, replacing each `{{ name }}` with its value
///
/// Placeholders without a value render as empty text.
pub fn render(template: Template, values: &[(&str, &str)]) -> String {
    let source = template.source();
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = after_open[..end].trim();
        if let Some((_, value)) = values.iter().find(|(key, _)| *key == name) {
            out.push_str(&html_escape::encode_quoted_attribute(value));
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}
