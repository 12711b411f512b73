use std::ops::Range;

use pulldown_cmark::{CowStr, Event};
use rayon::prelude::*;
use tracing::warn;

use crate::error::{Error, Location};
use crate::fix::{Outcome, Resolver};
use crate::qualify::Qualifier;

/// Rewrites the `src` of `img` elements in raw HTML events.
///
/// pulldown-cmark emits an HTML block one line at a time, so every run of
/// consecutive HTML events is handled as a single fragment.
pub fn fix(events: &mut [Event<'_>], resolver: &Resolver<'_>, qualifier: &dyn Qualifier) -> Outcome {
    let fragments: Vec<&mut [Event<'_>]> = events
        .chunk_by_mut(|a, b| is_html(a) && is_html(b))
        .filter(|run| run.first().is_some_and(is_html))
        .collect();
    fragments
        .into_par_iter()
        .map(|run| fix_fragment(run, resolver, qualifier))
        .reduce(Outcome::default, Outcome::merge)
}

fn is_html(event: &Event<'_>) -> bool {
    matches!(event, Event::Html(_))
}

fn fix_fragment(run: &mut [Event<'_>], resolver: &Resolver<'_>, qualifier: &dyn Qualifier) -> Outcome {
    let markup: String = run
        .iter()
        .filter_map(|event| match event {
            Event::Html(raw) => Some(&**raw),
            _ => None,
        })
        .collect();

    let mut outcome = Outcome::default();
    let result = rewrite_sources(&markup, |src| {
        outcome.record(resolver.rewrite(src, qualifier, &Location::Html))
    });
    match result {
        Ok(Some(markup)) => {
            // the whole fragment moves into the first event, keeping the count
            if let Some((first, rest)) = run.split_first_mut() {
                *first = Event::Html(markup.into());
                for event in rest {
                    *event = Event::Html(CowStr::Borrowed(""));
                }
            }
        }
        Ok(None) => {}
        Err(reason) if resolver.is_strict() => outcome.errors.push(Error::MalformedHtml { reason }),
        Err(reason) => warn!(%reason, "leaving unparsable HTML fragment unchanged"),
    }
    outcome
}

/// Offers the `src` of every `img` element in `markup` to `rewrite`.
///
/// Replacements are spliced into the original text in place of the old
/// value, everything else is copied through untouched. `None` means nothing
/// was replaced and the markup should be kept byte for byte.
pub fn rewrite_sources<F>(markup: &str, mut rewrite: F) -> Result<Option<String>, String>
where
    F: FnMut(&str) -> Option<String>,
{
    if !has_img_tag(markup) {
        return Ok(None);
    }

    let dom = tl::parse(markup, tl::ParserOptions::default()).map_err(|err| format!("{err:?}"))?;
    let parser = dom.parser();
    let Some(images) = dom.query_selector("img") else {
        return Ok(None);
    };

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    for handle in images {
        let Some(tag) = handle.get(parser).and_then(|node| node.as_tag()) else {
            continue;
        };
        let Some(Some(src)) = tag.attributes().get("src") else {
            continue;
        };
        let Some(span) = span_of(markup, src.as_bytes()) else {
            continue;
        };
        let Some(new) = rewrite(&markup[span.clone()]) else {
            continue;
        };
        let quoted = matches!(markup[..span.start].chars().next_back(), Some('"' | '\''));
        let value = escape(&new);
        edits.push((span, if quoted { value } else { format!("\"{value}\"") }));
    }

    let dirty = !edits.is_empty();
    if !dirty {
        return Ok(None);
    }

    edits.sort_by_key(|(span, _)| span.start);
    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for (span, value) in edits {
        out.push_str(&markup[last..span.start]);
        out.push_str(&value);
        last = span.end;
    }
    out.push_str(&markup[last..]);
    Ok(Some(out))
}

/// Locates an attribute value borrowed from `markup` by the parser.
fn span_of(markup: &str, value: &[u8]) -> Option<Range<usize>> {
    let start = (value.as_ptr() as usize).checked_sub(markup.as_ptr() as usize)?;
    let end = start.checked_add(value.len())?;
    let valid = end <= markup.len() && markup.is_char_boundary(start) && markup.is_char_boundary(end);
    valid.then_some(start..end)
}

fn escape(value: &str) -> String {
    value.replace('"', "&quot;").replace('\'', "&#39;")
}

fn has_img_tag(markup: &str) -> bool {
    markup
        .as_bytes()
        .windows(4)
        .any(|w| w.eq_ignore_ascii_case(b"<img"))
}
