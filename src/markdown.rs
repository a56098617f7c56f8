use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Flatten bot markdown into transcript text: block structure becomes blank
/// lines, list items get a bullet, code keeps its content. User and error
/// turns bypass this and render literally.
pub fn markdown_to_text(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::new();
    let mut list_depth: usize = 0;

    for event in Parser::new_ext(input, options) {
        match event {
            Event::Start(Tag::List(_)) => {
                list_depth += 1;
                ensure_line_break(&mut out);
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                ensure_blank_line(&mut out);
            }
            Event::Start(Tag::Item) => {
                ensure_line_break(&mut out);
                for _ in 1..list_depth {
                    out.push_str("  ");
                }
                out.push_str("• ");
            }
            Event::Start(Tag::CodeBlock(_)) => ensure_blank_line(&mut out),
            Event::End(TagEnd::CodeBlock) => ensure_blank_line(&mut out),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => {
                ensure_blank_line(&mut out);
            }
            Event::Text(text) => out.push_str(&text),
            Event::Code(code) => out.push_str(&code),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str("———");
                ensure_blank_line(&mut out);
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn ensure_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    ensure_line_break(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}
