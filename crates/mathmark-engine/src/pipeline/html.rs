use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html};

use crate::{
    delimiters::{CompiledMatcher, MathToken},
    render::{RenderOptions, render},
};

use super::scan::{Segment, tokenize};

// Private-use code points mark where a rendered span goes. Markdown treats
// them as ordinary text, so they survive parsing untouched.
const MARK_OPEN: char = '\u{E000}';
const MARK_CLOSE: char = '\u{E001}';

struct Rendered {
    token: MathToken,
    markup: String,
}

/// Renders a markdown document to HTML with math spans typeset by KaTeX.
///
/// Math is located with `matcher` before the markdown parser runs, so
/// emphasis or escapes inside a formula never reach it. A formula KaTeX
/// rejects is shown as a `katex-error` span holding the original source.
pub fn render_markdown(matcher: &CompiledMatcher, src: &str, options: &RenderOptions) -> String {
    let mut spans = Vec::new();
    let mut marked = String::with_capacity(src.len());

    for segment in tokenize(matcher, src) {
        match segment {
            Segment::Text(text) | Segment::Raw(text) => marked.push_str(text),
            Segment::Math { token, .. } => {
                marked.push(MARK_OPEN);
                marked.push_str(&spans.len().to_string());
                marked.push(MARK_CLOSE);
                let markup = render_or_error(&token, options);
                spans.push(Rendered { token, markup });
            }
        }
    }

    let parser = Parser::new_ext(&marked, markdown_options());
    let mut in_code_block = false;
    let events = TextMergeStream::new(parser).flat_map(|event| {
        match &event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            _ => {}
        }
        splice(event, &spans, in_code_block)
    });

    let mut out = String::with_capacity(marked.len() * 2);
    html::push_html(&mut out, events);
    out
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

fn render_or_error(token: &MathToken, options: &RenderOptions) -> String {
    match render(&token.text, token.display_mode, options) {
        Ok(markup) => markup,
        Err(err) => {
            log::warn!("Failed to render math {:?}: {err}", token.raw);
            format!(
                r#"<span class="katex-error" title="{}">{}</span>"#,
                html_escape::encode_double_quoted_attribute(&err.to_string()),
                html_escape::encode_text(&token.raw)
            )
        }
    }
}

/// Replaces span markers with rendered markup in body text. Where markup
/// cannot go (code blocks, raw HTML, link and image attributes) the original
/// source is put back instead.
fn splice<'e>(event: Event<'e>, spans: &[Rendered], in_code_block: bool) -> Vec<Event<'e>> {
    match event {
        Event::Text(text) if in_code_block => vec![Event::Text(restore_source(text, spans))],
        Event::Text(text) if text.contains(MARK_OPEN) => render_spans(&text, spans),
        Event::Html(html) => vec![Event::Html(restore_source(html, spans))],
        Event::InlineHtml(html) => vec![Event::InlineHtml(restore_source(html, spans))],
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => vec![Event::Start(Tag::Link {
            link_type,
            dest_url: restore_source(dest_url, spans),
            title: restore_source(title, spans),
            id,
        })],
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => vec![Event::Start(Tag::Image {
            link_type,
            dest_url: restore_source(dest_url, spans),
            title: restore_source(title, spans),
            id,
        })],
        other => vec![other],
    }
}

enum Piece<'t> {
    Text(&'t str),
    Span(&'t Rendered),
}

/// Splits `text` at span markers. A marker that names no span stays text.
fn pieces<'t>(text: &'t str, spans: &'t [Rendered]) -> Vec<Piece<'t>> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(MARK_OPEN) {
        let after = &rest[open + MARK_OPEN.len_utf8()..];
        let span = after.find(MARK_CLOSE).and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            Some((spans.get(index)?, close))
        });
        match span {
            Some((span, close)) => {
                out.push(Piece::Text(&rest[..open]));
                out.push(Piece::Span(span));
                rest = &after[close + MARK_CLOSE.len_utf8()..];
            }
            None => {
                out.push(Piece::Text(&rest[..open + MARK_OPEN.len_utf8()]));
                rest = after;
            }
        }
    }
    out.push(Piece::Text(rest));
    out
}

fn render_spans<'e>(text: &str, spans: &[Rendered]) -> Vec<Event<'e>> {
    let mut out = Vec::new();
    let mut pending = String::new();

    for piece in pieces(text, spans) {
        match piece {
            Piece::Text(t) => pending.push_str(t),
            Piece::Span(span) => {
                if !pending.is_empty() {
                    out.push(Event::Text(CowStr::from(std::mem::take(&mut pending))));
                }
                out.push(Event::InlineHtml(CowStr::from(span.markup.clone())));
            }
        }
    }
    if !pending.is_empty() {
        out.push(Event::Text(CowStr::from(pending)));
    }
    out
}

fn restore_source<'e>(text: CowStr<'e>, spans: &[Rendered]) -> CowStr<'e> {
    if !text.contains(MARK_OPEN) {
        return text;
    }
    let restored: String = pieces(&text, spans)
        .into_iter()
        .map(|piece| match piece {
            Piece::Text(t) => t,
            Piece::Span(span) => span.token.raw.as_str(),
        })
        .collect();
    CowStr::from(restored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_html(src: &str) -> String {
        render_markdown(CompiledMatcher::default_matcher(), src, &RenderOptions::default())
    }

    #[test]
    fn plain_markdown_is_untouched() {
        assert_eq!(to_html("Hello *world*"), "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn inline_math_is_rendered_inside_paragraph() {
        let html = to_html("Area $a_1 * b_2$ here");
        assert!(html.starts_with("<p>Area <span class=\"katex\">"));
        assert!(html.ends_with(" here</p>\n"));
        assert!(!html.contains("<em>"));
        assert!(!html.contains('\u{E000}'));
    }

    #[test]
    fn block_math_uses_display_mode() {
        let html = to_html("Intro\n\n$$\nE=mc^2\n$$\n\nOutro");
        assert!(html.contains("katex-display"));
        assert!(html.contains("<p>Intro</p>"));
        assert!(html.contains("<p>Outro</p>"));
    }

    #[test]
    fn code_keeps_math_source() {
        let html = to_html("`$x$`\n\n```\n$y$\n```");
        assert!(html.contains("<code>$x$</code>"));
        assert!(html.contains("<pre><code>$y$\n</code></pre>"));
        assert!(!html.contains("katex"));
    }

    #[test]
    fn indented_code_restores_source() {
        let html = to_html("para\n\n    $x$ in code\n");
        assert!(html.contains("<pre><code>$x$ in code\n</code></pre>"));
    }

    #[test]
    fn html_block_keeps_math_source() {
        let html = to_html("<div>\n$x$\n</div>\n\n[l](http://a/$b$)\n");
        assert!(html.starts_with("<div>\n$x$\n</div>\n"));
        assert!(html.contains(r#"<a href="http://a/$b$">l</a>"#));
        assert!(!html.contains('\u{E000}'));
        assert!(!html.contains("katex"));
    }

    #[test]
    fn inline_html_and_image_title_keep_math_source() {
        let html = to_html("a <span title=\"$y$\">b</span> ![alt](i.png \"$t$\")\n");
        assert!(html.contains(r#"<span title="$y$">"#));
        assert!(html.contains(r#"title="$t$""#));
        assert!(!html.contains('\u{E000}'));
    }

    #[test]
    fn math_in_link_text_is_rendered() {
        let html = to_html("[see $x$](http://a/)\n");
        assert!(html.contains(r#"<a href="http://a/">see <span class="katex">"#));
    }

    #[test]
    fn broken_math_becomes_error_span() {
        let html = to_html(r"bad $\frac{a$ formula");
        assert!(html.contains(r#"<span class="katex-error" title=""#));
        assert!(html.contains(r"$\frac{a$</span>"));
        assert!(html.contains("formula"));
    }

    #[test]
    fn error_markup_escapes_source() {
        let token = MathToken {
            raw: "$<b>$".to_string(),
            text: r"\notacommand<b>".to_string(),
            display_mode: false,
        };
        let markup = render_or_error(&token, &RenderOptions::default());
        assert!(markup.ends_with(">$&lt;b&gt;$</span>"));
    }

    #[test]
    fn unknown_marker_is_kept_as_text() {
        let events = splice(Event::Text(CowStr::from("a\u{E000}9\u{E001}b")), &[], false);
        assert_eq!(events, vec![Event::Text(CowStr::from("a\u{E000}9\u{E001}b"))]);
    }
}
