//! Placeholder substitution for resolved templates.
//!
//! Lookup hands back templates with their placeholders intact; the UI layer
//! fills them in with these helpers. Supported tokens are `{}` (next
//! positional argument), `{0}` (positional by index) and `{name}` (named).
//! `{{` and `}}` produce literal braces. Anything else, including Qt's
//! `%p%` / `%n` tokens and placeholders without a matching argument, is
//! copied through untouched.

use std::fmt::Display;

enum Placeholder<'t> {
    Next,
    Index(usize),
    Name(&'t str),
}

/// Fill `{}` and `{N}` placeholders from `args`.
pub fn format_positional(template: &str, args: &[&dyn Display]) -> String {
    let mut next = 0;
    substitute(template, |placeholder| match placeholder {
        Placeholder::Next => {
            let value = args.get(next).map(|arg| arg.to_string());
            next += 1;
            value
        }
        Placeholder::Index(i) => args.get(i).map(|arg| arg.to_string()),
        Placeholder::Name(_) => None,
    })
}

/// Fill `{name}` placeholders from `args`.
pub fn format_named(template: &str, args: &[(&str, &dyn Display)]) -> String {
    substitute(template, |placeholder| match placeholder {
        Placeholder::Name(name) => args
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string()),
        _ => None,
    })
}

fn substitute<'t>(
    template: &'t str,
    mut value_for: impl FnMut(Placeholder<'t>) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        let token = &tail[..=close];
        let inner = &tail[1..close];

        let placeholder = if inner.is_empty() {
            Some(Placeholder::Next)
        } else if inner.bytes().all(|b| b.is_ascii_digit()) {
            inner.parse().ok().map(Placeholder::Index)
        } else if inner.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            Some(Placeholder::Name(inner))
        } else {
            None
        };

        match placeholder.and_then(&mut value_for) {
            Some(value) => out.push_str(&value),
            None => out.push_str(token),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}
