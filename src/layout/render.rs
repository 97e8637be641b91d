//! Renderer: lays a [`Document`] out on a [`RenderedSurface`].
//!
//! Blocks stack top to bottom inside the page padding. Vertical margins of
//! neighbouring blocks collapse (the larger one wins). Text is broken into
//! lines greedily using the Type1 metrics; a word wider than the content box
//! is split between characters, so nothing extends past the page width.

use super::metrics::FontFace;
use super::surface::{ElementKind, PositionedElement, RenderedSurface, TextElement};
use crate::model::{Block, Color, Document, InlineRun, InlineSpan};
use crate::style::{ResolvedStyle, TextAlign, TextRule};

const EPSILON: f32 = 0.01;

/// Ratio of the ascent to the font size used to place baselines.
const ASCENT: f32 = 0.8;

/// Render a document with a resolved style.
pub fn render(document: &Document, style: &ResolvedStyle) -> RenderedSurface {
    let mut renderer = Renderer::new(style, document.metadata.title.clone());
    for block in document.blocks() {
        renderer.block(block);
    }
    renderer.finish()
}

#[derive(Debug, Clone, PartialEq)]
struct FragmentStyle {
    face: FontFace,
    size: f32,
    color: Color,
    link: Option<String>,
}

impl FragmentStyle {
    fn advance(&self, ch: char) -> f32 {
        self.face.char_width(ch) as f32 * self.size / 1000.0
    }
}

#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    width: f32,
    style: FragmentStyle,
}

#[derive(Debug, Clone, Default)]
struct Word {
    fragments: Vec<Fragment>,
    width: f32,
    space_before: f32,
}

impl Word {
    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, ch: char, style: &FragmentStyle) {
        let w = style.advance(ch);
        self.width += w;
        if let Some(last) = self.fragments.last_mut() {
            if last.style == *style {
                last.text.push(ch);
                last.width += w;
                return;
            }
        }
        self.fragments.push(Fragment {
            text: ch.to_string(),
            width: w,
            style: style.clone(),
        });
    }

    /// Split into pieces no wider than `max_width` (at least one character
    /// per piece).
    fn split(self, max_width: f32) -> Vec<Word> {
        let mut pieces = Vec::new();
        let mut current = Word {
            space_before: self.space_before,
            ..Default::default()
        };
        for fragment in self.fragments {
            for ch in fragment.text.chars() {
                let w = fragment.style.advance(ch);
                if !current.is_empty() && current.width + w > max_width + EPSILON {
                    pieces.push(std::mem::take(&mut current));
                }
                current.push(ch, &fragment.style);
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    }
}

#[derive(Debug, Default)]
struct Line {
    words: Vec<Word>,
    width: f32,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A run of text that is laid out as a unit with one alignment.
struct LineGroup<'a> {
    spans: &'a [InlineSpan],
    centered: bool,
}

struct Renderer<'a> {
    style: &'a ResolvedStyle,
    surface: RenderedSurface,
    y: f32,
    pending_margin: f32,
}

impl<'a> Renderer<'a> {
    fn new(style: &'a ResolvedStyle, title: Option<String>) -> Self {
        Self {
            style,
            surface: RenderedSurface::new(style.page.width, style.page.font_family, title),
            y: style.page.padding_top,
            pending_margin: 0.0,
        }
    }

    fn content_x(&self) -> f32 {
        self.style.page.padding_left
    }

    fn content_width(&self) -> f32 {
        self.style.page.content_width()
    }

    /// Start a box with a top margin; collapses with the pending margin.
    fn open(&mut self, margin_top: f32) {
        self.pending_margin = self.pending_margin.max(margin_top);
    }

    /// End a box with a bottom margin; collapses with the pending margin.
    fn close(&mut self, margin_bottom: f32) {
        self.pending_margin = self.pending_margin.max(margin_bottom);
    }

    /// Commit the pending margin before placing content.
    fn settle(&mut self) {
        self.y += self.pending_margin;
        self.pending_margin = 0.0;
    }

    fn block(&mut self, block: &Block) {
        log::trace!("Rendering {} block at y={:.1}", block.kind(), self.y);
        let style = self.style;
        let (x, width) = (self.content_x(), self.content_width());

        match block {
            Block::Heading { level, content } => {
                let rule = style.heading(*level);
                self.open(rule.text.margin_top);
                self.runs(std::slice::from_ref(content), &rule.text, x, width, None);
                if let Some(border) = &rule.border_bottom {
                    self.settle();
                    self.y += border.padding;
                    self.rect(x, width, border.width, border.color);
                }
                self.close(rule.text.margin_bottom);
            }
            Block::Paragraph { lines, role } => {
                let rule = style.paragraph(*role);
                self.open(rule.margin_top);
                self.runs(lines, rule, x, width, None);
                self.close(rule.margin_bottom);
            }
            Block::List { items } => {
                let list = &style.list;
                // Large body sizes widen the indent so the bullet stays inside the padding.
                let face = FontFace::select(style.page.font_family, false, false);
                let bullet_width =
                    face.char_width(list.bullet) as f32 * list.item.font_size / 1000.0;
                let indent = list.indent.max(bullet_width + bullet_gap(&list.item));
                self.open(list.margin_top);
                for item in items {
                    self.open(list.item.margin_top);
                    self.runs(
                        std::slice::from_ref(item),
                        &list.item,
                        x + indent,
                        (width - indent).max(0.0),
                        Some(list.bullet),
                    );
                    self.close(list.item.margin_bottom);
                }
                self.close(list.margin_bottom);
            }
            Block::Rule => {
                let rule = &style.rule;
                self.open(rule.margin_top);
                self.settle();
                self.rect(x, width, rule.thickness, rule.color);
                self.close(rule.margin_bottom);
            }
        }
    }

    fn rect(&mut self, x: f32, width: f32, height: f32, color: Color) {
        self.surface.push(PositionedElement {
            x,
            y: self.y,
            width,
            height,
            kind: ElementKind::Rect { color },
        });
        self.y += height;
    }

    /// Lay out the runs of one block, each run starting on a new line.
    fn runs(
        &mut self,
        runs: &[InlineRun],
        rule: &TextRule,
        x: f32,
        width: f32,
        mut bullet: Option<char>,
    ) {
        self.settle();
        for run in runs {
            let groups = line_groups(run);
            if groups.is_empty() {
                self.y += rule.line_box();
                continue;
            }
            for group in groups {
                let align = if group.centered {
                    TextAlign::Center
                } else {
                    rule.align
                };
                let words = self.words(group.spans, rule);
                let lines = break_lines(words, width);
                let count = lines.len();
                for (i, line) in lines.into_iter().enumerate() {
                    if let Some(glyph) = bullet.take() {
                        self.bullet(glyph, rule, x);
                    }
                    self.place_line(&line, rule, x, width, align, i + 1 == count);
                }
            }
        }
    }

    fn fragment_style(&self, span: &InlineSpan, rule: &TextRule) -> FragmentStyle {
        let d = &span.decorations;
        let link_color = d.link.as_ref().map(|_| self.style.link.color);
        FragmentStyle {
            face: FontFace::select(
                self.style.page.font_family,
                rule.bold || d.bold,
                rule.italic || d.italic,
            ),
            size: rule.font_size,
            color: d.color.or(link_color).unwrap_or(rule.color),
            link: d.link.clone(),
        }
    }

    /// Split spans into words at whitespace; runs of whitespace collapse to
    /// one space.
    fn words(&self, spans: &[InlineSpan], rule: &TextRule) -> Vec<Word> {
        let mut words = Vec::new();
        let mut current = Word::default();
        let mut space: Option<f32> = None;

        for span in spans {
            let style = self.fragment_style(span, rule);
            let space_width = style.advance(' ');
            for ch in span.text.chars() {
                if ch.is_whitespace() && ch != '\u{00A0}' {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                    if !words.is_empty() {
                        space = Some(space_width);
                    }
                    continue;
                }
                if current.is_empty() {
                    current.space_before = space.take().unwrap_or(0.0);
                }
                current.push(ch, &style);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    fn bullet(&mut self, glyph: char, rule: &TextRule, text_x: f32) {
        let face = FontFace::select(self.style.page.font_family, false, false);
        let width = face.char_width(glyph) as f32 * rule.font_size / 1000.0;
        self.surface.push(PositionedElement {
            x: (text_x - width - bullet_gap(rule)).max(self.content_x()),
            y: self.y,
            width,
            height: rule.line_box(),
            kind: ElementKind::Text(TextElement {
                text: glyph.to_string(),
                face,
                font_size: rule.font_size,
                color: rule.color,
                baseline: baseline(rule),
                underline: false,
                link: None,
            }),
        });
    }

    fn place_line(
        &mut self,
        line: &Line,
        rule: &TextRule,
        x: f32,
        width: f32,
        align: TextAlign,
        last: bool,
    ) {
        let slack = (width - line.width).max(0.0);
        let gaps = line.words.len().saturating_sub(1);
        let (start, extra) = match align {
            TextAlign::Left => (x, 0.0),
            TextAlign::Center => (x + slack / 2.0, 0.0),
            TextAlign::Justify if !last && gaps > 0 => (x, slack / gaps as f32),
            TextAlign::Justify => (x, 0.0),
        };

        let height = rule.line_box();
        let underline = self.style.link.underline;
        let mut open: Option<PositionedElement> = None;
        let mut cursor = start;

        for (i, word) in line.words.iter().enumerate() {
            if i > 0 {
                cursor += word.space_before + extra;
            }
            for fragment in &word.fragments {
                if let Some(current) = open.as_mut() {
                    let gap = cursor - current.right();
                    let space = fragment.style.advance(' ');
                    if let ElementKind::Text(text) = &mut current.kind {
                        let same = text.face == fragment.style.face
                            && text.font_size == fragment.style.size
                            && text.color == fragment.style.color
                            && text.link == fragment.style.link;
                        if same && (gap.abs() < EPSILON || (gap - space).abs() < EPSILON) {
                            if gap > EPSILON {
                                text.text.push(' ');
                            }
                            text.text.push_str(&fragment.text);
                            current.width = cursor + fragment.width - current.x;
                            cursor += fragment.width;
                            continue;
                        }
                    }
                }

                if let Some(done) = open.take() {
                    self.surface.push(done);
                }
                open = Some(PositionedElement {
                    x: cursor,
                    y: self.y,
                    width: fragment.width,
                    height,
                    kind: ElementKind::Text(TextElement {
                        text: fragment.text.clone(),
                        face: fragment.style.face,
                        font_size: fragment.style.size,
                        color: fragment.style.color,
                        baseline: baseline(rule),
                        underline: underline && fragment.style.link.is_some(),
                        link: fragment.style.link.clone(),
                    }),
                });
                cursor += fragment.width;
            }
        }

        if let Some(done) = open.take() {
            self.surface.push(done);
        }
        self.y += height;
    }

    fn finish(mut self) -> RenderedSurface {
        self.y += self.pending_margin + self.style.page.padding_bottom;
        let height = self.y.max(self.style.page.min_height);
        self.surface.set_height(height);
        log::debug!(
            "Rendered {} elements, surface {:.1}x{:.1}pt",
            self.surface.elements().len(),
            self.surface.width(),
            height
        );
        self.surface
    }
}

/// Space between a bullet and its item text.
fn bullet_gap(rule: &TextRule) -> f32 {
    rule.font_size * 0.5
}

fn baseline(rule: &TextRule) -> f32 {
    (rule.line_box() - rule.font_size) / 2.0 + ASCENT * rule.font_size
}

/// Split a run into line groups: every centered segment is a group of its
/// own, as is every stretch of flowing spans between them. Groups without
/// visible text are dropped.
fn line_groups(run: &InlineRun) -> Vec<LineGroup<'_>> {
    let spans = run.spans();
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=spans.len() {
        let boundary = i == spans.len()
            || spans[i].starts_line
            || spans[i].decorations.centered != spans[start].decorations.centered;
        if boundary {
            let slice = &spans[start..i];
            if slice.iter().any(|s| !s.text.trim().is_empty()) {
                groups.push(LineGroup {
                    spans: slice,
                    centered: spans[start].decorations.centered,
                });
            }
            start = i;
        }
    }
    groups
}

/// Greedy line breaking.
fn break_lines(words: Vec<Word>, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    for word in words {
        let pieces = if word.width > max_width + EPSILON {
            word.split(max_width)
        } else {
            vec![word]
        };
        for mut piece in pieces {
            if line.is_empty() {
                piece.space_before = 0.0;
            } else if line.width + piece.space_before + piece.width > max_width + EPSILON {
                lines.push(std::mem::take(&mut line));
                piece.space_before = 0.0;
            }
            line.width += piece.space_before + piece.width;
            line.words.push(piece);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
