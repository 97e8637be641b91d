//! Integration tests for extended-markdown parsing.

use mdpage::{parse, parse_with_options, Block, Color, ParagraphRole, ParseOptions};

fn heading(block: &Block) -> (u8, String) {
    match block {
        Block::Heading { level, content } => (*level, content.plain_text()),
        other => panic!("expected heading, got {:?}", other),
    }
}

#[test]
fn test_title_subtitle_rule() {
    let doc = parse("# Title\n\nSubtitle line\n\n---\n");
    let blocks = doc.blocks();

    assert_eq!(blocks.len(), 3);
    assert_eq!(heading(&blocks[0]), (1, "Title".to_string()));
    assert_eq!(blocks[1].kind(), "paragraph");
    assert_eq!(blocks[1].plain_text(), "Subtitle line");
    assert_eq!(blocks[2], Block::Rule);
}

#[test]
fn test_consecutive_items_form_one_list() {
    let doc = parse("- a\n- b\n");
    assert_eq!(doc.block_count(), 1);
    match &doc.blocks()[0] {
        Block::List { items } => {
            let texts: Vec<_> = items.iter().map(|i| i.plain_text()).collect();
            assert_eq!(texts, vec!["a", "b"]);
        }
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn test_heading_levels() {
    let doc = parse("# one\n## two\n### three\n#### four");
    let blocks = doc.blocks();
    assert_eq!(heading(&blocks[0]).0, 1);
    assert_eq!(heading(&blocks[1]).0, 2);
    assert_eq!(heading(&blocks[2]).0, 3);
    assert_eq!(blocks[3].kind(), "paragraph");
    assert_eq!(blocks[3].plain_text(), "#### four");
}

#[test]
fn test_heading_needs_space() {
    let doc = parse("#nospace");
    assert_eq!(doc.blocks()[0].kind(), "paragraph");
}

#[test]
fn test_blank_line_separates_paragraphs() {
    let doc = parse("first\nstill first\n\nsecond");
    assert_eq!(doc.block_count(), 2);
    match &doc.blocks()[0] {
        Block::Paragraph { lines, .. } => assert_eq!(lines.len(), 2),
        other => panic!("expected paragraph, got {:?}", other),
    }
    assert_eq!(doc.blocks()[0].plain_text(), "first\nstill first");
}

#[test]
fn test_whitespace_line_is_blank() {
    let doc = parse("first\n   \t\nsecond");
    assert_eq!(doc.block_count(), 2);
}

#[test]
fn test_list_followed_by_paragraph() {
    let doc = parse("- item\nafter the list");
    let kinds: Vec<_> = doc.blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec!["list", "paragraph"]);
}

#[test]
fn test_blank_line_splits_lists() {
    let doc = parse("- a\n\n- b");
    let kinds: Vec<_> = doc.blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec!["list", "list"]);
}

#[test]
fn test_malformed_emphasis_is_literal() {
    let doc = parse("**bold");
    assert_eq!(doc.plain_text(), "**bold");
    assert!(!doc.runs().any(|r| r.is_decorated()));
}

#[test]
fn test_emphasis_does_not_cross_lines() {
    let doc = parse("**start\nend**");
    assert_eq!(doc.plain_text(), "**start\nend**");
}

#[test]
fn test_angle_brackets_never_become_markup() {
    let source = "<b>not bold</b> & <a href=\"x\">no link</a>";
    let doc = parse(source);
    assert_eq!(doc.plain_text(), source);
    assert!(!doc.runs().any(|r| r.is_decorated()));
}

#[test]
fn test_entity_text_is_preserved() {
    let doc = parse("AT&amp;T &lt;literal&gt;");
    assert_eq!(doc.plain_text(), "AT&amp;T &lt;literal&gt;");
}

#[test]
fn test_parse_is_deterministic() {
    for source in [
        mdpage::SAMPLE_MARKDOWN,
        "",
        "\n\n\n",
        "->{red}**x<-",
        "# ->a<- ->b<-\n- {blue}c\n- d{/}",
    ] {
        assert_eq!(parse(source), parse(source));
    }
}

#[test]
fn test_parse_never_drops_plain_text() {
    let doc = parse("just some words, nothing else");
    assert_eq!(doc.plain_text(), "just some words, nothing else");
}

#[test]
fn test_color_scope_is_block() {
    let doc = parse("{red}one\ntwo\n\nthree");
    let red = Color::parse("red");

    match &doc.blocks()[0] {
        Block::Paragraph { lines, .. } => {
            assert_eq!(lines[0].spans()[0].decorations.color, red);
            assert_eq!(lines[1].spans()[0].decorations.color, red);
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
    match &doc.blocks()[1] {
        Block::Paragraph { lines, .. } => {
            assert_eq!(lines[0].spans()[0].decorations.color, None);
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
}

#[test]
fn test_roles_after_title() {
    let doc = parse("# Name\n\nRole\n\nContact\n\nSkills\n\nFourth");
    let roles: Vec<_> = doc.blocks().iter().map(|b| b.role()).collect();
    assert_eq!(
        roles,
        vec![
            None,
            Some(ParagraphRole::Subtitle),
            Some(ParagraphRole::ContactLine),
            Some(ParagraphRole::Tagline),
            None
        ]
    );
}

#[test]
fn test_roles_stop_at_other_blocks() {
    let doc = parse("# Name\n\nRole\n\n---\n\nNot a contact line");
    let roles: Vec<_> = doc.blocks().iter().filter_map(|b| b.role()).collect();
    assert_eq!(roles, vec![ParagraphRole::Subtitle]);
}

#[test]
fn test_plain_options_keep_extensions_literal() {
    let doc = parse_with_options("->{red}x<-\n\n>> y", ParseOptions::plain());
    assert_eq!(doc.plain_text(), "->{red}x<-\n\n>> y");
    assert!(doc.blocks().iter().all(|b| b.role().is_none()));
}

#[test]
fn test_title_metadata() {
    let doc = parse("## Not the title\n\n# ->**Jane** Doe<-");
    assert_eq!(doc.metadata.title.as_deref(), Some("Jane Doe"));

    let doc = parse("no heading");
    assert_eq!(doc.metadata.title, None);
}

#[test]
fn test_sample_document_structure() {
    let doc = parse(mdpage::SAMPLE_MARKDOWN);
    let kinds: Vec<_> = doc.blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds.iter().filter(|k| **k == "rule").count(), 3);
    assert_eq!(kinds.iter().filter(|k| **k == "list").count(), 2);

    let highlight = doc
        .runs()
        .flat_map(|r| r.spans())
        .find(|s| s.text.starts_with("Highlight"))
        .unwrap();
    assert_eq!(highlight.decorations.color, Color::parse("#0d9488"));
}

#[test]
fn test_adjacent_centered_spans_are_separate() {
    let doc = parse("->a<-->b<-");
    match &doc.blocks()[0] {
        Block::Paragraph { lines, .. } => {
            let texts: Vec<_> = lines[0].spans().iter().map(|s| s.text.as_str()).collect();
            assert_eq!(texts, vec!["a", "b"]);
            assert!(lines[0].spans().iter().all(|s| s.decorations.centered));
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
}
