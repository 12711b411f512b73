use tracing::debug;

use crate::document::{DirectoryResolver, Document};
use crate::error::ProcessError;
use crate::fix::{self, Resolver};
use crate::matcher::{FileIndex, Matcher};
use crate::options::Options;
use crate::path;
use crate::qualify::Qualifier;
use crate::walk::Selection;

/// Number of references rewritten in each part of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub images: usize,
    pub html: usize,
    pub frontmatter: usize,
}

impl Summary {
    /// Rewrites in the Markdown body, images and HTML together.
    pub fn body(&self) -> usize {
        self.images + self.html
    }

    pub fn total(&self) -> usize {
        self.body() + self.frontmatter
    }
}

/// Rewrites the image references of documents against a file snapshot.
///
/// A processor holds no state between calls, the same one can be used for
/// every document of a site, from several threads at once.
pub struct Processor {
    options: Options,
    body_qualifier: Box<dyn Qualifier>,
    frontmatter_qualifier: Box<dyn Qualifier>,
    resolver: Option<Box<dyn DirectoryResolver>>,
}

impl Processor {
    pub fn new(options: Options) -> Self {
        Self {
            body_qualifier: Box::new(options.qualifier),
            frontmatter_qualifier: Box::new(options.frontmatter.qualifier),
            resolver: None,
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Sets the fallback used to find the directory of documents without a
    /// file path.
    pub fn with_resolver(mut self, resolver: impl DirectoryResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Replaces the policy for Markdown images and HTML `src` attributes.
    pub fn with_body_qualifier(mut self, qualifier: impl Qualifier + 'static) -> Self {
        self.body_qualifier = Box::new(qualifier);
        self
    }

    /// Replaces the policy for front-matter strings.
    pub fn with_frontmatter_qualifier(mut self, qualifier: impl Qualifier + 'static) -> Self {
        self.frontmatter_qualifier = Box::new(qualifier);
        self
    }

    /// Rewrites every resolvable image reference of `document` in place.
    ///
    /// Documents whose directory cannot be determined are left untouched. On
    /// failure every rewrite that did succeed stays applied and the error
    /// lists each reference that could not be handled.
    pub fn process(
        &self,
        document: &mut Document<'_>,
        files: &FileIndex,
    ) -> Result<Summary, ProcessError> {
        let Some(base_dir) = self.directory_of(document) else {
            debug!(document = %document.id, "no directory for document, skipping");
            return Ok(Summary::default());
        };

        let matcher = Matcher::new(files, &self.options, &base_dir);
        let resolver = Resolver::new(matcher, &self.options);
        let selection = Selection::new(
            &self.options.frontmatter.include,
            &self.options.frontmatter.exclude,
        );
        let body_qualifier = &*self.body_qualifier;
        let frontmatter_qualifier = &*self.frontmatter_qualifier;

        let events = &mut document.events;
        let data = &mut document.frontmatter;
        let ((images, html), frontmatter) = rayon::join(
            || {
                let images = fix::images(events, &resolver, body_qualifier);
                let html = fix::html(events, &resolver, body_qualifier);
                (images, html)
            },
            || fix::frontmatter(data, &resolver, frontmatter_qualifier, &selection),
        );

        let summary = Summary {
            images: images.rewritten,
            html: html.rewritten,
            frontmatter: frontmatter.rewritten,
        };
        debug!(document = %document.id, %base_dir, ?summary, "processed document");

        let errors: Vec<_> = [images.errors, html.errors, frontmatter.errors]
            .into_iter()
            .flatten()
            .collect();
        if errors.is_empty() {
            Ok(summary)
        } else {
            Err(ProcessError {
                document: document.id.clone(),
                summary,
                errors,
            })
        }
    }

    fn directory_of(&self, document: &Document<'_>) -> Option<String> {
        if let Some(file) = &document.file_absolute_path {
            return Some(path::dirname(file));
        }
        let dir = self.resolver.as_ref()?.resolve_directory(document)?;
        Some(path::normalize(&dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pulldown_cmark::{Event, Tag};
    use serde_json::json;

    use crate::error::{Error, Location};
    use crate::options::OnMissing;

    fn image_urls(document: &Document<'_>) -> Vec<String> {
        document
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Start(Tag::Image(_, url, _)) => Some(url.to_string()),
                _ => None,
            })
            .collect()
    }

    fn strict() -> Options {
        Options {
            on_missing: OnMissing::Error,
            ..Options::default()
        }
    }

    #[test]
    fn frontmatter_banner_becomes_relative() {
        let files = FileIndex::new(["/site/static/img/x.png"]);
        let mut doc = Document::new("a")
            .with_path("/site/posts/a/index.md")
            .with_frontmatter(json!({ "banner": "/site/static/img/x.png" }));

        let summary = Processor::new(Options::default())
            .process(&mut doc, &files)
            .unwrap();

        assert_eq!(summary.frontmatter, 1);
        assert_eq!(doc.frontmatter, json!({ "banner": "../../static/img/x.png" }));
    }

    #[test]
    fn rewrites_every_part_of_a_document() {
        let files = FileIndex::new(["/site/static/img/x.png", "/site/static/img/y.png"]);
        let text = "![x](/img/x.png)\n\n<img src=\"/static/img/y.png\">\n";
        let mut doc = Document::parse("a", text)
            .with_path("/site/posts/a/index.md")
            .with_frontmatter(json!({ "hero": { "image": "/img/y.png" } }));

        let summary = Processor::new(Options::default())
            .process(&mut doc, &files)
            .unwrap();

        assert_eq!(
            summary,
            Summary {
                images: 1,
                html: 1,
                frontmatter: 1
            }
        );
        assert_eq!(summary.body(), 2);
        assert_eq!(summary.total(), 3);
        assert_eq!(image_urls(&doc), ["../../static/img/x.png"]);
        assert_eq!(doc.frontmatter["hero"]["image"], "../../static/img/y.png");
    }

    #[test]
    fn missing_image_is_left_alone_when_lenient() {
        let files = FileIndex::default();
        let mut doc = Document::parse("a", "![m](/static/missing.png)").with_path("/site/a.md");
        let before = doc.clone();

        let summary = Processor::new(Options::default())
            .process(&mut doc, &files)
            .unwrap();

        assert_eq!(summary, Summary::default());
        assert_eq!(doc, before);
    }

    #[test]
    fn missing_image_is_reported_when_strict() {
        let files = FileIndex::default();
        let mut doc = Document::parse("a", "![m](/static/missing.png)").with_path("/site/a.md");

        let err = Processor::new(strict())
            .process(&mut doc, &files)
            .unwrap_err();

        assert_eq!(err.document, "a");
        assert_eq!(err.errors.len(), 1);
        let msg = err.to_string();
        assert!(msg.contains("missing.png"), "{msg}");
        assert!(msg.contains("static"), "{msg}");
        assert_eq!(image_urls(&doc), ["/static/missing.png"]);
    }

    #[test]
    fn failures_do_not_stop_other_rewrites() {
        let files = FileIndex::new(["/site/static/ok.png"]);
        let text = "![a](/missing.png) ![b](/ok.png)";
        let mut doc = Document::parse("a", text)
            .with_path("/site/a.md")
            .with_frontmatter(json!({ "cover": "/gone.png" }));

        let err = Processor::new(strict())
            .process(&mut doc, &files)
            .unwrap_err();

        assert_eq!(err.summary.images, 1);
        assert_eq!(err.errors.len(), 2);
        assert!(err.errors.iter().any(|e| matches!(
            e,
            Error::NotFound { location: Location::Frontmatter(path), .. } if path == "cover"
        )));
        assert_eq!(image_urls(&doc), ["/missing.png", "static/ok.png"]);
    }

    #[test]
    fn processing_twice_changes_nothing() {
        let files = FileIndex::new(["/site/static/img/x.png"]);
        let text = "![x](/img/x.png?v=2)\n\n<p><img src=\"/img/x.png\"></p>\n";
        let mut doc = Document::parse("a", text)
            .with_path("/site/posts/a/index.md")
            .with_frontmatter(json!({ "banner": "/site/static/img/x.png" }));
        let processor = Processor::new(strict());

        processor.process(&mut doc, &files).unwrap();
        let once = doc.clone();
        let summary = processor.process(&mut doc, &files).unwrap();

        assert_eq!(summary, Summary::default());
        assert_eq!(doc, once);
        assert_eq!(image_urls(&doc), ["../../static/img/x.png?v=2"]);
    }

    #[test]
    fn no_directory_is_a_no_op() {
        let files = FileIndex::new(["/site/static/img/x.png"]);
        let mut doc = Document::parse("a", "![x](/img/x.png)")
            .with_frontmatter(json!({ "banner": "/site/static/img/x.png" }));
        let before = doc.clone();

        let summary = Processor::new(strict()).process(&mut doc, &files).unwrap();

        assert_eq!(summary, Summary::default());
        assert_eq!(doc, before);
    }

    #[test]
    fn resolver_is_asked_without_a_path() {
        let files = FileIndex::new(["/site/static/img/x.png"]);
        let mut doc = Document::parse("a", "![x](/img/x.png)").with_parent("posts/b");
        let processor = Processor::new(Options::default()).with_resolver(|doc: &Document<'_>| {
            doc.parent.as_ref().map(|parent| format!("/site/{parent}/./"))
        });

        processor.process(&mut doc, &files).unwrap();

        assert_eq!(image_urls(&doc), ["../../static/img/x.png"]);
    }

    #[test]
    fn stored_path_wins_over_resolver() {
        let files = FileIndex::new(["/site/static/img/x.png"]);
        let mut doc = Document::parse("a", "![x](/img/x.png)").with_path("/site/a.md");
        let processor =
            Processor::new(Options::default()).with_resolver(|_: &Document<'_>| -> Option<String> {
                panic!("the stored path should be used")
            });

        processor.process(&mut doc, &files).unwrap();

        assert_eq!(image_urls(&doc), ["static/img/x.png"]);
    }

    #[test]
    fn include_limits_frontmatter_fields() {
        let files = FileIndex::new(["/site/static/a.png", "/site/static/b.png"]);
        let mut doc = Document::new("a").with_path("/site/posts/a.md").with_frontmatter(json!({
            "hero": { "image": "/site/static/a.png", "caption": "/site/static/b.png" }
        }));
        let options = Options {
            frontmatter: crate::options::FrontmatterOptions {
                include: vec!["hero.image".into()],
                ..Default::default()
            },
            ..Options::default()
        };

        Processor::new(options).process(&mut doc, &files).unwrap();

        assert_eq!(doc.frontmatter["hero"]["image"], "../static/a.png");
        assert_eq!(doc.frontmatter["hero"]["caption"], "/site/static/b.png");
    }

    #[test]
    fn exclude_wins() {
        let files = FileIndex::new(["/site/static/a.png", "/site/static/logo.png"]);
        let mut doc = Document::new("a").with_path("/site/posts/a.md").with_frontmatter(json!({
            "cover": "/site/static/a.png",
            "meta": { "logo": "/site/static/logo.png" },
        }));
        let options = Options {
            frontmatter: crate::options::FrontmatterOptions {
                exclude: vec!["meta.logo".into()],
                ..Default::default()
            },
            ..Options::default()
        };

        Processor::new(options).process(&mut doc, &files).unwrap();

        assert_eq!(doc.frontmatter["cover"], "../static/a.png");
        assert_eq!(doc.frontmatter["meta"]["logo"], "/site/static/logo.png");
    }

    #[test]
    fn custom_body_qualifier() {
        let files = FileIndex::new(["/site/static/a.png", "/site/static/b.gif"]);
        let mut doc = Document::parse("a", "![a](/a.png) ![b](/b.gif)").with_path("/site/a.md");
        let processor = Processor::new(Options::default())
            .with_body_qualifier(|path: &str| path.ends_with(".png"));

        let summary = processor.process(&mut doc, &files).unwrap();

        assert_eq!(summary.images, 1);
        assert_eq!(image_urls(&doc), ["static/a.png", "/b.gif"]);
    }
}
