//! Inline formatter: emphasis, links, centering and color markup.
//!
//! Lines arrive HTML-escaped. The formatter first splits a line into
//! centered and flowing segments, then decodes each segment into character
//! cells and resolves the remaining markup in a fixed order: color tags,
//! `***`, `**`, `*`, links. Every pass hides the delimiter cells it consumes,
//! so a later pass only ever sees the visible text left by the earlier ones.
//! Unmatched markup is left alone and ends up as literal text.

use super::escape::decode_entity_at;
use super::ParseOptions;
use crate::model::{Color, Decorations, InlineRun, InlineSpan};
use regex::{Match, Regex};
use std::ops::Range;

/// Color tokens accepted inside `{...}`.
const COLOR_TOKEN: &str = r"#[0-9a-fA-F]{6}|#[0-9a-fA-F]{3}|[a-zA-Z]+";

/// State carried from line to line within one block.
///
/// A color tag colors the rest of its block, so paragraph lines and list
/// items share one state. The block parser starts a fresh state per block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineState {
    color: Option<Color>,
}

impl InlineState {
    /// Create a state with no active color.
    pub fn new() -> Self {
        Self::default()
    }

    /// The color currently in effect.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Drop the active color.
    pub fn reset(&mut self) {
        self.color = None;
    }
}

/// A slice of a line that is either centered or part of the normal flow.
#[derive(Debug)]
struct Segment<'a> {
    text: &'a str,
    centered: bool,
    color: Option<Color>,
}

#[derive(Debug, Clone)]
struct Cell {
    ch: char,
    bold: bool,
    italic: bool,
    link: Option<String>,
    color: Option<Color>,
    hidden: bool,
}

impl Cell {
    fn new(ch: char) -> Self {
        Self {
            ch,
            bold: false,
            italic: false,
            link: None,
            color: None,
            hidden: false,
        }
    }
}

/// The visible characters of a cell row, with a byte-offset index back into
/// the row so regex matches can be mapped onto cells.
struct Visible {
    text: String,
    index: Vec<(usize, usize)>,
}

impl Visible {
    fn of(cells: &[Cell]) -> Self {
        let mut text = String::with_capacity(cells.len());
        let mut index = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            if cell.hidden {
                continue;
            }
            index.push((text.len(), i));
            text.push(cell.ch);
        }
        Self { text, index }
    }

    /// Cell indices covered by a byte range of `text`.
    fn cells(&self, bytes: Range<usize>) -> impl Iterator<Item = usize> + '_ {
        let start = self.index.partition_point(|(b, _)| *b < bytes.start);
        let end = self.index.partition_point(|(b, _)| *b < bytes.end);
        self.index[start..end].iter().map(|(_, cell)| *cell)
    }
}

/// Resolves inline markup of escaped text into [`InlineRun`]s.
pub struct InlineFormatter {
    centering: bool,
    line_prefix: bool,
    colors: bool,
    center_re: Regex,
    prefix_re: Regex,
    color_re: Regex,
    triple_re: Regex,
    bold_re: Regex,
    italic_re: Regex,
    link_re: Regex,
}

impl InlineFormatter {
    /// Create a formatter for the given dialect options.
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            centering: options.centering,
            line_prefix: options.line_prefix_centering,
            colors: options.colors,
            center_re: Regex::new(&format!(
                r"(?:\{{({c})\}})?-&gt;(?:\{{({c})\}})?(.*?)&lt;-",
                c = COLOR_TOKEN
            ))
            .unwrap(),
            prefix_re: Regex::new(&format!(r"^&gt;&gt; (?:\{{({c})\}})?(.*)$", c = COLOR_TOKEN))
                .unwrap(),
            color_re: Regex::new(&format!(r"\{{({c}|/)\}}", c = COLOR_TOKEN)).unwrap(),
            triple_re: Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap(),
            bold_re: Regex::new(r"\*\*(.+?)\*\*").unwrap(),
            italic_re: Regex::new(r"\*(.+?)\*").unwrap(),
            link_re: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap(),
        }
    }

    /// Format one escaped line, reading and updating the block state.
    pub fn format_line(&self, line: &str, state: &mut InlineState) -> InlineRun {
        let mut run = InlineRun::new();

        for segment in self.segments(line) {
            let mut cells = to_cells(segment.text);

            if self.colors {
                if segment.centered {
                    // Colors started inside a centered span end with it.
                    let mut scoped = segment.color.or(state.color);
                    self.apply_colors(&mut cells, &mut scoped);
                } else {
                    self.apply_colors(&mut cells, &mut state.color);
                }
            }

            apply_emphasis(&mut cells, &self.triple_re, true, true);
            apply_emphasis(&mut cells, &self.bold_re, true, false);
            apply_emphasis(&mut cells, &self.italic_re, false, true);
            apply_links(&mut cells, &self.link_re);

            for (i, cell) in cells.into_iter().filter(|c| !c.hidden).enumerate() {
                let decorations = Decorations {
                    bold: cell.bold,
                    italic: cell.italic,
                    link: cell.link,
                    centered: segment.centered,
                    color: cell.color,
                };
                let span = InlineSpan::decorated(cell.ch.to_string(), decorations);
                if segment.centered && i == 0 {
                    run.push(span.starting_line());
                } else {
                    run.push(span);
                }
            }
        }

        run
    }

    /// Format the escaped text of a whole block. Lines share one state and
    /// are joined with `\n` in the resulting run.
    pub fn format_text(&self, text: &str) -> InlineRun {
        let mut state = InlineState::new();
        let mut run = InlineRun::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                run.push(InlineSpan::new("\n"));
            }
            for span in self.format_line(line, &mut state).spans() {
                run.push(span.clone());
            }
        }
        run
    }

    fn color_token(&self, token: Option<Match<'_>>) -> Option<Color> {
        if !self.colors {
            return None;
        }
        token.and_then(|m| Color::parse(m.as_str()))
    }

    /// Split a line into centered and flowing segments.
    fn segments<'a>(&self, line: &'a str) -> Vec<Segment<'a>> {
        if self.line_prefix {
            if let Some(caps) = self.prefix_re.captures(line) {
                let color = self.color_token(caps.get(1));
                let body = match (color, caps.get(1), caps.get(2)) {
                    (Some(_), _, Some(rest)) => rest.as_str(),
                    (None, Some(tag), _) => &line[tag.start() - 1..],
                    (None, None, Some(rest)) => rest.as_str(),
                    _ => "",
                };
                if !body.trim().is_empty() {
                    return vec![Segment {
                        text: body,
                        centered: true,
                        color,
                    }];
                }
            }
        }

        if !self.centering {
            return vec![flowing(line)];
        }

        let mut segments = Vec::new();
        let mut last = 0;

        for caps in self.center_re.captures_iter(line) {
            let (Some(whole), Some(content)) = (caps.get(0), caps.get(3)) else {
                continue;
            };

            let outer = self.color_token(caps.get(1));
            let inner = self.color_token(caps.get(2));

            // An unknown outer tag stays in the flowing text before the span.
            let plain_end = match (caps.get(1), outer) {
                (Some(tag), None) => tag.end() + 1,
                _ => whole.start(),
            };

            // An unknown inner tag is part of the centered text.
            let body_start = match (caps.get(2), inner) {
                (Some(tag), None) => tag.start() - 1,
                _ => content.start(),
            };
            let body = &line[body_start..content.end()];
            if body.is_empty() {
                continue;
            }

            if plain_end > last {
                segments.push(flowing(&line[last..plain_end]));
            }
            segments.push(Segment {
                text: body,
                centered: true,
                color: inner.or(outer),
            });
            last = whole.end();
        }

        if last < line.len() || segments.is_empty() {
            segments.push(flowing(&line[last..]));
        }
        segments
    }

    /// Resolve `{color}` tags and `{/}` resets, then paint every visible
    /// cell with the color in effect at its position.
    fn apply_colors(&self, cells: &mut [Cell], color: &mut Option<Color>) {
        let visible = Visible::of(cells);
        let mut changes: Vec<(usize, Option<Color>)> = Vec::new();

        for caps in self.color_re.captures_iter(&visible.text) {
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let next = if token.as_str() == "/" {
                None
            } else {
                match Color::parse(token.as_str()) {
                    // A tag needs text after it to color.
                    Some(c) if whole.end() < visible.text.len() => Some(c),
                    _ => continue,
                }
            };

            let tag: Vec<usize> = visible.cells(whole.range()).collect();
            for &i in &tag {
                cells[i].hidden = true;
            }
            if let Some(&first) = tag.first() {
                changes.push((first, next));
            }
        }

        let mut current = *color;
        let mut pending = changes.into_iter().peekable();
        for (i, cell) in cells.iter_mut().enumerate() {
            while let Some(&(at, next)) = pending.peek() {
                if at > i {
                    break;
                }
                current = next;
                pending.next();
            }
            if !cell.hidden && cell.color.is_none() {
                cell.color = current;
            }
        }
        *color = current;
    }
}

fn flowing(text: &str) -> Segment<'_> {
    Segment {
        text,
        centered: false,
        color: None,
    }
}

/// Decode an escaped segment into one cell per display character.
fn to_cells(text: &str) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if let Some((ch, len)) = decode_entity_at(text, i) {
            cells.push(Cell::new(ch));
            i += len;
            continue;
        }
        let Some(ch) = text[i..].chars().next() else {
            break;
        };
        cells.push(Cell::new(ch));
        i += ch.len_utf8();
    }
    cells
}

fn apply_emphasis(cells: &mut [Cell], re: &Regex, bold: bool, italic: bool) {
    let visible = Visible::of(cells);
    for caps in re.captures_iter(&visible.text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        for i in visible
            .cells(whole.start()..inner.start())
            .chain(visible.cells(inner.end()..whole.end()))
        {
            cells[i].hidden = true;
        }
        for i in visible.cells(inner.range()) {
            cells[i].bold |= bold;
            cells[i].italic |= italic;
        }
    }
}

fn apply_links(cells: &mut [Cell], re: &Regex) {
    let visible = Visible::of(cells);
    for caps in re.captures_iter(&visible.text) {
        let (Some(whole), Some(label), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let href = target.as_str().trim().to_string();
        for i in visible
            .cells(whole.start()..label.start())
            .chain(visible.cells(label.end()..whole.end()))
        {
            cells[i].hidden = true;
        }
        for i in visible.cells(label.range()) {
            cells[i].link = Some(href.clone());
        }
    }
}
