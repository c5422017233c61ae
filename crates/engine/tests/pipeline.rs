use std::fs;
use std::sync::Arc;

use tagtext_core::{Diagnostic, Page, RenderOptions, SourceText, TagtextError, split_document};
use tagtext_engine::{RenderPipeline, TagRegistry};

fn code_of(html: &str) -> String {
    let start = html.find("<code>").expect("code element") + "<code>".len();
    let end = html.find("</code>").expect("closing code element");
    html_escape::decode_html_entities(&html[start..end]).into_owned()
}

#[test]
fn plain_options_leave_text_untouched() {
    let text = "Some *text* -- with \"quotes\" and 'apostrophes'...\n\n- a list";
    let html = RenderPipeline::new(text, RenderOptions::plain()).get().unwrap();
    assert_eq!(html, text);
}

#[test]
fn unknown_tags_pass_through_byte_for_byte() {
    let text = "Before (unknowntag: some value  with  spaces) after";
    let html = RenderPipeline::new(text, RenderOptions::plain()).get().unwrap();
    assert_eq!(html, text);
}

#[test]
fn markdown_link_targets_are_not_tags() {
    let text = "[mail me](mailto:me@example.com)";
    let html = RenderPipeline::new(text, RenderOptions::plain()).get().unwrap();
    assert_eq!(html, text);
}

#[test]
fn full_pipeline_renders_tags_markdown_and_typography() {
    let html = RenderPipeline::new("Say \"hi\" -- (email: a@b.c)", RenderOptions::default())
        .get()
        .unwrap();
    assert_eq!(
        html,
        "<p>Say \u{201c}hi\u{201d} \u{2013} <a href=\"mailto:a@b.c\">a@b.c</a></p>"
    );
}

#[test]
fn fenced_code_survives_every_stage() {
    let body = "fn main() {\n    let s = \"(link: not-a-tag)\";\n    if 1 < 2 && 'a' != 'b' { println!(\"{s} -- ok\"); }\n}";
    let text = format!("Intro\n\n```rust\n{}\n```\n\nOutro", body);

    let html = RenderPipeline::new(text, RenderOptions::default()).get().unwrap();

    assert_eq!(html.matches("<figure class=\"code\">").count(), 1);
    assert!(html.contains("<pre class=\"rust\">"));
    assert!(html.contains("<p>Intro</p>"));
    assert!(html.contains("<p>Outro</p>"));
    assert_eq!(code_of(&html), body);
}

#[test]
fn fenced_code_without_highlighter_is_escaped() {
    let body = "<script>alert('x & y')</script>";
    let text = format!("```html\n{}\n```", body);
    let html = RenderPipeline::new(text, RenderOptions::plain()).get().unwrap();

    assert!(!html.contains("<script>"));
    assert_eq!(code_of(&html), body);
}

#[test]
fn highlighter_output_is_used_verbatim() {
    let html = RenderPipeline::new("```\nx\n```", RenderOptions::plain())
        .with_highlighter(|code: &str, lang: &str| format!("<i data-lang=\"{lang}\">{code}</i>"))
        .get()
        .unwrap();
    insta::assert_snapshot!(
        html,
        @r#"<figure class="code"><pre class="highlight"><code><i data-lang="markup">x</i></code></pre></figure>"#
    );
}

#[test]
fn single_images_unwrap_only_when_enabled() {
    let text = "![Alt](a.png)";

    let wrapped = RenderPipeline::new(text, RenderOptions::default()).get().unwrap();
    assert_eq!(wrapped, "<p><img src=\"a.png\" alt=\"Alt\" /></p>");

    let unwrapped = RenderPipeline::new(text, RenderOptions::default().unwrap_images(true))
        .get()
        .unwrap();
    assert_eq!(unwrapped, "<img src=\"a.png\" alt=\"Alt\" />");
}

#[test]
fn stray_backtick_keeps_typography_on() {
    let html = RenderPipeline::new(r#"Type a ` then say "hi" -- done"#, RenderOptions::default())
        .get()
        .unwrap();
    assert_eq!(html, "<p>Type a ` then say \u{201c}hi\u{201d} \u{2013} done</p>");
}

#[test]
fn paragraphs_with_two_images_stay_wrapped() {
    let html = RenderPipeline::new(
        "![a](a.png) and ![b](b.png)",
        RenderOptions::default().unwrap_images(true),
    )
    .get()
    .unwrap();
    assert_eq!(
        html,
        r#"<p><img src="a.png" alt="a" /> and <img src="b.png" alt="b" /></p>"#
    );
}

#[test]
fn registry_is_shared_between_pipelines() {
    let registry = Arc::new(TagRegistry::new());
    let first = RenderPipeline::new("(twitter: a)", RenderOptions::plain())
        .with_registry(Arc::clone(&registry))
        .get()
        .unwrap();
    let second = RenderPipeline::new("(twitter: b)", RenderOptions::plain())
        .with_registry(Arc::clone(&registry))
        .get()
        .unwrap();
    assert!(first.contains("twitter.com/a"));
    assert!(second.contains("twitter.com/b"));
}

#[test]
fn frontmatter_supplies_the_page() {
    let input = "---\nuid: team\nurl: /about/team\ntitle: Team\n---\n(image: group.jpg)\n";
    let source = split_document(input).unwrap().into_source();
    let html = RenderPipeline::new(source, RenderOptions::plain()).get().unwrap();
    assert_eq!(html, "<img src=\"/about/team/group.jpg\" alt=\"\" />\n");
}

#[test]
fn set_page_overrides_the_wrapped_page() {
    let mut pipeline = RenderPipeline::new(
        SourceText::with_page("(file: a.pdf)", Page::new("one", "/one")),
        RenderOptions::plain(),
    );
    pipeline.set_page(Page::new("two", "/two"));
    assert_eq!(pipeline.get().unwrap(), "<a href=\"/two/a.pdf\">a.pdf</a>");
}

#[test]
fn template_recursion_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("loop.html"), "(loop: again)").unwrap();

    let registry = TagRegistry::new().with_tag_dir(dir.path());
    let pipeline = RenderPipeline::new("(loop: start)", RenderOptions::plain().max_tag_depth(3))
        .with_registry(registry);

    let rendered = pipeline.render().unwrap();
    assert_eq!(rendered.html, "(loop: again)");
    assert!(
        rendered
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::RecursionLimit { limit: 3, .. }))
    );
}

#[test]
fn open_reads_frontmatter_and_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("post.md");
    fs::write(&path, "---\nurl: /blog/post\n---\n(file: a.pdf)\n(nothing: here)").unwrap();

    let rendered = RenderPipeline::open(&path, RenderOptions::plain())
        .unwrap()
        .render()
        .unwrap();
    assert_eq!(
        rendered.html,
        "<a href=\"/blog/post/a.pdf\">a.pdf</a>\n(nothing: here)"
    );
    let diagnostic = rendered.diagnostics.iter().next().unwrap();
    assert_eq!(
        diagnostic.location().to_string(),
        format!("{}:2:1", path.display())
    );
}

#[test]
fn open_reports_unreadable_documents() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        RenderPipeline::open(dir.path().join("missing.md"), RenderOptions::plain()),
        Err(TagtextError::Io(_))
    ));

    let broken = dir.path().join("broken.md");
    fs::write(&broken, "---\ntitle: never closed\n").unwrap();
    assert!(matches!(
        RenderPipeline::open(&broken, RenderOptions::plain()),
        Err(TagtextError::Frontmatter(_))
    ));
}
