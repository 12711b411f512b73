mod frontmatter;
mod html;
mod images;

use tracing::{debug, trace, warn};

use crate::error::{Error, Location};
use crate::matcher::{Matcher, Resolution};
use crate::options::{OnMissing, Options};
use crate::qualify::Qualifier;
use crate::relative::to_relative;

pub use crate::fix::frontmatter::fix as frontmatter;
pub use crate::fix::html::fix as html;
pub use crate::fix::html::rewrite_sources;
pub use crate::fix::images::fix as images;

/// Turns candidates into replacement strings for one document.
pub struct Resolver<'a> {
    matcher: Matcher<'a>,
    options: &'a Options,
}

impl<'a> Resolver<'a> {
    pub fn new(matcher: Matcher<'a>, options: &'a Options) -> Self {
        Self { matcher, options }
    }

    pub fn is_strict(&self) -> bool {
        self.options.on_missing == OnMissing::Error
    }

    /// Returns the replacement for `candidate`, or `None` to keep it.
    pub fn rewrite(
        &self,
        candidate: &str,
        qualifier: &dyn Qualifier,
        location: &Location,
    ) -> Result<Option<String>, Error> {
        match self.matcher.resolve(candidate, qualifier) {
            Resolution::Found { record, tail } => {
                let relative = to_relative(self.matcher.base_dir(), record.absolute_path());
                let rewritten = format!("{relative}{tail}");
                if rewritten == candidate {
                    return Ok(None);
                }
                debug!(%location, from = candidate, to = %rewritten, "rewrote image path");
                Ok(Some(rewritten))
            }
            Resolution::Skipped(reason) => {
                trace!(%location, candidate, ?reason, "skipped");
                Ok(None)
            }
            Resolution::NotFound { expected } => {
                if self.is_strict() {
                    return Err(Error::NotFound {
                        candidate: candidate.to_owned(),
                        static_folder: self.matcher.static_folder().to_owned(),
                        location: location.clone(),
                    });
                }
                debug!(%location, candidate, %expected, "no matching file, leaving as is");
                Ok(None)
            }
            Resolution::Ambiguous { matches } => {
                let matches: Vec<String> = matches
                    .iter()
                    .map(|m| m.absolute_path().to_owned())
                    .collect();
                if self.is_strict() {
                    return Err(Error::Ambiguous {
                        candidate: candidate.to_owned(),
                        matches,
                        location: location.clone(),
                    });
                }
                warn!(%location, candidate, ?matches, "several files match, leaving as is");
                Ok(None)
            }
        }
    }
}

/// What a rewriting stage did.
#[derive(Debug, Default)]
pub struct Outcome {
    pub rewritten: usize,
    pub errors: Vec<Error>,
}

impl Outcome {
    /// Counts a rewrite or keeps the error, passing the replacement through.
    fn record(&mut self, result: Result<Option<String>, Error>) -> Option<String> {
        match result {
            Ok(Some(value)) => {
                self.rewritten += 1;
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.rewritten += other.rewritten;
        self.errors.extend(other.errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::matcher::FileIndex;
    use crate::qualify::PathPolicy;

    fn strict() -> Options {
        Options {
            on_missing: OnMissing::Error,
            ..Options::default()
        }
    }

    #[test]
    fn found_candidates_become_relative() {
        let files = FileIndex::new(["/site/static/img/x.png"]);
        let options = Options::default();
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site/posts/a"), &options);
        let res = resolver.rewrite("/img/x.png#top", &PathPolicy::RelativeUrl, &Location::Image);
        assert_eq!(res, Ok(Some("../../static/img/x.png#top".to_owned())));
    }

    #[test]
    fn missing_is_silent_when_lenient() {
        let files = FileIndex::default();
        let options = Options::default();
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site"), &options);
        let res = resolver.rewrite("/static/missing.png", &PathPolicy::RelativeUrl, &Location::Image);
        assert_eq!(res, Ok(None));
    }

    #[test]
    fn missing_is_an_error_when_strict() {
        let files = FileIndex::default();
        let options = strict();
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site"), &options);
        let err = resolver
            .rewrite("/static/missing.png", &PathPolicy::RelativeUrl, &Location::Image)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing.png"), "{msg}");
        assert!(msg.contains("`static`"), "{msg}");
    }

    #[test]
    fn ambiguity_is_an_error_when_strict() {
        let files = FileIndex::new(["/site/static/a/x.png", "/site/static/b/x.png"]);
        let options = Options {
            strategy: crate::matcher::MatchStrategy::FileName,
            ..strict()
        };
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site"), &options);
        let err = resolver
            .rewrite("/x.png", &PathPolicy::RelativeUrl, &Location::Html)
            .unwrap_err();
        assert!(matches!(err, Error::Ambiguous { ref matches, .. } if matches.len() == 2));
    }

    #[test]
    fn outcomes_merge() {
        let mut a = Outcome::default();
        a.record(Ok(Some("x".into())));
        let mut b = Outcome::default();
        b.record(Err(Error::MalformedHtml { reason: "bad".into() }));
        b.record(Ok(None));
        let merged = a.merge(b);
        assert_eq!(merged.rewritten, 1);
        assert_eq!(merged.errors.len(), 1);
    }
}
