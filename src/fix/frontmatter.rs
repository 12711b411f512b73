use serde_json::Value;

use crate::error::Location;
use crate::fix::{Outcome, Resolver};
use crate::qualify::Qualifier;
use crate::walk::{self, Selection};

/// Rewrites selected string fields of the front-matter.
pub fn fix(
    frontmatter: &mut Value,
    resolver: &Resolver<'_>,
    qualifier: &dyn Qualifier,
    selection: &Selection<'_>,
) -> Outcome {
    let mut outcome = Outcome::default();
    walk::walk_strings(frontmatter, |value, path| {
        if !selection.allows(path) {
            return None;
        }
        let location = Location::Frontmatter(path.to_string());
        outcome.record(resolver.rewrite(value, qualifier, &location))
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::error::Error;
    use crate::matcher::{FileIndex, Matcher};
    use crate::options::{OnMissing, Options};
    use crate::qualify::PathPolicy;

    fn files() -> FileIndex {
        FileIndex::new(["/site/static/img/x.png", "/site/static/img/y.png"])
    }

    #[test]
    fn rewrites_nested_fields() {
        let files = files();
        let options = Options::default();
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site/posts/a"), &options);

        let mut fm = json!({
            "title": "Not a path",
            "banner": "/site/static/img/x.png",
            "gallery": [{ "src": "/img/y.png" }, "https://example.com/z.png"],
            "weight": 3,
        });

        let outcome = fix(&mut fm, &resolver, &PathPolicy::AbsolutePath, &Selection::new(&[], &[]));

        assert_eq!(outcome.rewritten, 2);
        assert_eq!(
            fm,
            json!({
                "title": "Not a path",
                "banner": "../../static/img/x.png",
                "gallery": [{ "src": "../../static/img/y.png" }, "https://example.com/z.png"],
                "weight": 3,
            })
        );
    }

    #[test]
    fn excluded_fields_are_kept() {
        let files = files();
        let options = Options::default();
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site/posts/a"), &options);

        let mut fm = json!({
            "hero": { "image": "/img/x.png", "thumb": "/img/y.png" },
        });
        let include = vec!["hero".to_owned()];
        let exclude = vec!["hero.thumb".to_owned()];

        let outcome = fix(
            &mut fm,
            &resolver,
            &PathPolicy::AbsolutePath,
            &Selection::new(&include, &exclude),
        );

        assert_eq!(outcome.rewritten, 1);
        assert_eq!(fm["hero"]["image"], "../../static/img/x.png");
        assert_eq!(fm["hero"]["thumb"], "/img/y.png");
    }

    #[test]
    fn errors_carry_the_key_path() {
        let files = files();
        let options = Options {
            on_missing: OnMissing::Error,
            ..Options::default()
        };
        let resolver = Resolver::new(Matcher::new(&files, &options, "/site"), &options);

        let mut fm = json!({ "cover": { "image": "/img/missing.png" } });

        let outcome = fix(&mut fm, &resolver, &PathPolicy::AbsolutePath, &Selection::new(&[], &[]));

        assert_eq!(outcome.rewritten, 0);
        assert!(matches!(
            &outcome.errors[..],
            [Error::NotFound { location: Location::Frontmatter(path), .. }] if path == "cover.image"
        ));
        assert_eq!(fm["cover"]["image"], "/img/missing.png");
    }
}
