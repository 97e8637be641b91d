//! Block parser: raw source text to [`Document`].
//!
//! Parsing runs in two passes. The source is escaped, then scanned line by
//! line into coarse tokens (blank, rule, heading, list item, text). A second
//! pass groups the tokens into blocks and hands every text payload to the
//! [`InlineFormatter`]. Parsing never fails: any input yields a document.

use super::escape::escape_reserved;
use super::inline::{InlineFormatter, InlineState};
use super::ParseOptions;
use crate::model::{Block, Document, InlineRun, ParagraphRole};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A classified source line. Payloads are still escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// Empty or whitespace-only line
    Blank,
    /// `---`
    Rule,
    /// `#`, `##` or `###` followed by a space
    Heading {
        /// Marker count
        level: u8,
        /// Heading text
        text: &'a str,
    },
    /// `- ` followed by text
    ListItem(&'a str),
    /// Anything else
    Text(&'a str),
}

/// Classifies single lines with precompiled patterns.
pub struct LineClassifier {
    rule_re: Regex,
    heading_re: Regex,
    list_re: Regex,
}

impl LineClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self {
            rule_re: Regex::new(r"^---\s*$").unwrap(),
            heading_re: Regex::new(r"^(#{1,3}) +(\S.*)$").unwrap(),
            list_re: Regex::new(r"^- +(\S.*)$").unwrap(),
        }
    }

    /// Classify one (escaped) line.
    pub fn classify<'a>(&self, line: &'a str) -> LineToken<'a> {
        if line.trim().is_empty() {
            return LineToken::Blank;
        }
        if self.rule_re.is_match(line) {
            return LineToken::Rule;
        }
        if let Some(caps) = self.heading_re.captures(line) {
            if let (Some(marker), Some(text)) = (caps.get(1), caps.get(2)) {
                return LineToken::Heading {
                    level: marker.as_str().len() as u8,
                    text: text.as_str().trim_end(),
                };
            }
        }
        if let Some(text) = self.list_re.captures(line).and_then(|c| c.get(1)) {
            return LineToken::ListItem(text.as_str().trim_end());
        }
        LineToken::Text(line.trim())
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses extended markdown into a [`Document`].
pub struct BlockParser {
    options: ParseOptions,
    classifier: LineClassifier,
    formatter: InlineFormatter,
}

impl BlockParser {
    /// Create a parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        let formatter = InlineFormatter::new(&options);
        Self {
            options,
            classifier: LineClassifier::new(),
            formatter,
        }
    }

    /// Parse source text into a document.
    pub fn parse(&self, source: &str) -> Document {
        let source = if self.options.normalize_unicode {
            source.nfc().collect::<String>()
        } else {
            source.to_string()
        };
        let escaped = escape_reserved(&source.replace("\r\n", "\n").replace('\r', "\n"));

        let tokens: Vec<LineToken<'_>> = escaped
            .split('\n')
            .map(|line| self.classifier.classify(line))
            .collect();

        let mut blocks = self.group(&tokens);
        if self.options.tag_roles {
            tag_roles(&mut blocks);
        }

        log::debug!(
            "Parsed {} lines into {} blocks",
            tokens.len(),
            blocks.len()
        );
        Document::from_blocks(blocks)
    }

    /// Group tokens into blocks, formatting payloads on the way.
    fn group(&self, tokens: &[LineToken<'_>]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut list: Vec<&str> = Vec::new();

        for token in tokens {
            match *token {
                LineToken::Blank => {
                    self.flush_paragraph(&mut paragraph, &mut blocks);
                    self.flush_list(&mut list, &mut blocks);
                }
                LineToken::Rule => {
                    self.flush_paragraph(&mut paragraph, &mut blocks);
                    self.flush_list(&mut list, &mut blocks);
                    blocks.push(Block::Rule);
                }
                LineToken::Heading { level, text } => {
                    self.flush_paragraph(&mut paragraph, &mut blocks);
                    self.flush_list(&mut list, &mut blocks);
                    let content = self.formatter.format_line(text, &mut InlineState::new());
                    blocks.push(Block::heading(level, content));
                }
                LineToken::ListItem(text) => {
                    self.flush_paragraph(&mut paragraph, &mut blocks);
                    list.push(text);
                }
                LineToken::Text(text) => {
                    self.flush_list(&mut list, &mut blocks);
                    paragraph.push(text);
                }
            }
        }

        self.flush_paragraph(&mut paragraph, &mut blocks);
        self.flush_list(&mut list, &mut blocks);
        blocks
    }

    fn flush_paragraph(&self, lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if lines.is_empty() {
            return;
        }
        let runs = self.format_lines(lines);
        lines.clear();
        // Lines made only of consumed markup leave nothing to show.
        if runs.iter().any(|run| !run.is_empty()) {
            blocks.push(Block::paragraph(runs));
        }
    }

    fn flush_list(&self, items: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if items.is_empty() {
            return;
        }
        let runs = self.format_lines(items);
        items.clear();
        blocks.push(Block::List { items: runs });
    }

    /// Format the lines of one block with a shared inline state.
    fn format_lines(&self, lines: &[&str]) -> Vec<InlineRun> {
        let mut state = InlineState::new();
        lines
            .iter()
            .map(|line| self.formatter.format_line(line, &mut state))
            .collect()
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// Tag the paragraphs directly following each level-1 heading.
fn tag_roles(blocks: &mut [Block]) {
    let mut position: Option<usize> = None;

    for block in blocks.iter_mut() {
        match block {
            Block::Heading { level: 1, .. } => position = Some(0),
            Block::Paragraph { role, .. } => {
                if let Some(index) = position {
                    *role = ParagraphRole::for_position(index);
                    position = Some(index + 1);
                }
            }
            _ => position = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        BlockParser::default().parse(source)
    }

    #[test]
    fn test_classify_lines() {
        let classifier = LineClassifier::new();
        assert_eq!(classifier.classify("   "), LineToken::Blank);
        assert_eq!(classifier.classify("---"), LineToken::Rule);
        assert_eq!(classifier.classify("--- "), LineToken::Rule);
        assert_eq!(
            classifier.classify("## Skills"),
            LineToken::Heading {
                level: 2,
                text: "Skills"
            }
        );
        assert_eq!(classifier.classify("#### Deep"), LineToken::Text("#### Deep"));
        assert_eq!(classifier.classify("#NoSpace"), LineToken::Text("#NoSpace"));
        assert_eq!(classifier.classify("- item"), LineToken::ListItem("item"));
        assert_eq!(classifier.classify("-item"), LineToken::Text("-item"));
        assert_eq!(classifier.classify("----"), LineToken::Text("----"));
    }

    #[test]
    fn test_title_subtitle_rule() {
        let doc = parse("# Title\n\nSubtitle line\n\n---\n");
        let blocks = doc.blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], Block::heading(1, InlineRun::plain("Title")));
        assert!(matches!(blocks[1], Block::Paragraph { .. }));
        assert_eq!(blocks[1].plain_text(), "Subtitle line");
        assert_eq!(blocks[2], Block::Rule);
    }

    #[test]
    fn test_consecutive_items_form_one_list() {
        let doc = parse("- a\n- b\n");
        assert_eq!(doc.block_count(), 1);
        match &doc.blocks()[0] {
            Block::List { items } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].plain_text(), "b");
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_list_followed_by_paragraph() {
        let doc = parse("- a\n- b\nafter the list");
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.blocks()[0].kind(), "list");
        assert_eq!(doc.blocks()[1].plain_text(), "after the list");
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let doc = parse("- a\n\n- b");
        assert_eq!(doc.block_count(), 2);
    }

    #[test]
    fn test_paragraph_line_breaks() {
        let doc = parse("one\ntwo\n\nthree");
        assert_eq!(doc.block_count(), 2);
        match &doc.blocks()[0] {
            Block::Paragraph { lines, .. } => assert_eq!(lines.len(), 2),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_line_is_blank() {
        let doc = parse("one\n   \t\ntwo");
        assert_eq!(doc.block_count(), 2);
        let doc = parse("\n\n   \n");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_heading_levels() {
        let doc = parse("# a\n## b\n### c\n#### d");
        let levels: Vec<_> = doc
            .blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(doc.blocks()[3].plain_text(), "#### d");
    }

    #[test]
    fn test_emphasis_does_not_cross_lines() {
        let doc = parse("**start\nend**");
        assert_eq!(doc.blocks()[0].plain_text(), "**start\nend**");
    }

    #[test]
    fn test_escaping_precedes_matching() {
        let doc = parse("<h1>not a heading</h1> & more");
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].plain_text(), "<h1>not a heading</h1> & more");
    }

    #[test]
    fn test_roles_after_h1() {
        let doc = parse("# Name\n\nRole\n\nContact\n\nTagline\n\nBody");
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
    fn test_roles_interrupted_by_other_block() {
        let doc = parse("# Name\n\nRole\n\n---\n\nAfter rule");
        assert_eq!(doc.blocks()[1].role(), Some(ParagraphRole::Subtitle));
        assert_eq!(doc.blocks()[3].role(), None);
    }

    #[test]
    fn test_roles_disabled() {
        let parser = BlockParser::new(ParseOptions::new().with_role_tagging(false));
        let doc = parser.parse("# Name\n\nRole");
        assert_eq!(doc.blocks()[1].role(), None);
    }

    #[test]
    fn test_color_scope_is_block() {
        let doc = parse("{red}one\ntwo\n\nthree");
        let red = crate::model::Color::parse("red");
        match &doc.blocks()[0] {
            Block::Paragraph { lines, .. } => {
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
    fn test_crlf_input() {
        let doc = parse("# A\r\n\r\nbody\r\n");
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.blocks()[1].plain_text(), "body");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "# ->Jane<-\n\n*x* **y**\n\n- [a](b)\n---";
        assert_eq!(parse(source), parse(source));
    }
}
