use std::borrow::Borrow;

use anyhow::Result;
use pulldown_cmark::Event;
use pulldown_cmark_to_cmark::{cmark_resume_with_options, Options};

/// Render a rewritten document body back to Markdown.
///
/// The result ends with a single newline, like the files it replaces.
pub fn to_cmark<'a, I, E>(events: I) -> Result<String>
where
    I: IntoIterator<Item = E>,
    E: Borrow<Event<'a>>,
{
    let mut buf = String::new();
    let opts = Options {
        code_block_token_count: 3,
        list_token: '-',
        ..Default::default()
    };
    cmark_resume_with_options(events.into_iter(), &mut buf, None, opts)?.finalize(&mut buf)?;
    let len = buf.trim_end_matches('\n').len();
    buf.truncate(len);
    buf.push('\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pulldown_cmark::Parser;

    #[test]
    fn renders_images_with_their_url() {
        let events: Vec<_> = Parser::new("# Title\n\n![alt](../static/a.png)").collect();
        let text = to_cmark(&events).unwrap();
        assert!(text.contains("![alt](../static/a.png)"), "{text}");
        assert!(text.ends_with(")\n"), "{text:?}");
    }
}
