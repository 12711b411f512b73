use pulldown_cmark::{CowStr, Event, Tag};
use rayon::prelude::*;

use crate::error::Location;
use crate::fix::{Outcome, Resolver};
use crate::qualify::Qualifier;

/// Rewrites the destination of Markdown images.
pub fn fix(events: &mut [Event<'_>], resolver: &Resolver<'_>, qualifier: &dyn Qualifier) -> Outcome {
    let outcome = events
        .par_iter_mut()
        .filter_map(|event| match event {
            Event::Start(Tag::Image(_, url, _)) => Some(url),
            _ => None,
        })
        .map(|url| fix_url(url, resolver, qualifier))
        .reduce(Outcome::default, Outcome::merge);

    if outcome.rewritten > 0 {
        sync_ends(events);
    }
    outcome
}

fn fix_url(url: &mut CowStr<'_>, resolver: &Resolver<'_>, qualifier: &dyn Qualifier) -> Outcome {
    let mut outcome = Outcome::default();
    if let Some(new) = outcome.record(resolver.rewrite(&**url, qualifier, &Location::Image)) {
        *url = new.into();
    }
    outcome
}

/// Copies each image's destination onto its closing event.
fn sync_ends(events: &mut [Event<'_>]) {
    let mut open = Vec::new();
    for event in events.iter_mut() {
        match event {
            Event::Start(Tag::Image(_, url, _)) => open.push(url.clone()),
            Event::End(Tag::Image(_, url, _)) => {
                if let Some(start) = open.pop() {
                    *url = start;
                }
            }
            _ => {}
        }
    }
}
