/// Placeholder templating for the template detail view.
///
/// A template body is split into paragraph blocks and every `[Name]` span becomes an
/// independently editable placeholder. Edits mutate the rendering in place; the
/// original record is never touched. `extract_plain_text` flattens the rendering back
/// into the text that gets copied.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::model::TemplateRecord;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid regex"));
static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("valid regex"));
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

const SUBJECT_LABEL: &str = "Subject: ";

/// Used when a record has no body.
const FALLBACK_PARAGRAPHS: &[&str] = &[
    "Dear [Teacher's Name],",
    "[Template content would be customized based on the specific communication needs.]",
    "Best regards,\n[Your Name]\n[Your Contact Information]",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Subject,
    Separator,
    Paragraph,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Separator => "separator",
            Self::Paragraph => "paragraph",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Position among all placeholders in document order.
    pub id: usize,
    /// Text between the brackets, e.g. "Teacher's Name".
    pub name: String,
    /// Current editable content. Starts as the bracketed form.
    pub content: String,
    touched: bool,
}

impl Placeholder {
    fn new(id: usize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            content: format!("[{name}]"),
            touched: false,
        }
    }

    /// The bracketed text this placeholder was built from.
    pub fn original(&self) -> String {
        format!("[{}]", self.name)
    }

    /// First focus on untouched content clears it; later focus never does.
    fn focus(&mut self) {
        if !self.touched && self.content == self.original() {
            self.content.clear();
        }
        self.touched = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Placeholder(p) => &p.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub segments: Vec<Segment>,
}

impl Block {
    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }
}

/// Editable rendering of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    blocks: Vec<Block>,
    edit_mode: bool,
    focused: Option<usize>,
}

/// Build the editable rendering of `record`.
pub fn build_rendering(record: &TemplateRecord) -> Rendering {
    let mut next_id = 0;
    let mut blocks = Vec::new();

    match record.body.as_deref() {
        Some(body) => {
            if let Some(subject) = record.subject.as_deref() {
                let mut segments = vec![Segment::Literal(SUBJECT_LABEL.to_string())];
                segments.extend(segment(subject, &mut next_id));
                blocks.push(Block {
                    kind: BlockKind::Subject,
                    segments,
                });
                blocks.push(Block {
                    kind: BlockKind::Separator,
                    segments: Vec::new(),
                });
            }
            for paragraph in PARAGRAPH_BREAK_RE.split(body) {
                if paragraph.trim().is_empty() {
                    continue;
                }
                blocks.push(paragraph_block(paragraph, &mut next_id));
            }
        }
        None => {
            for paragraph in FALLBACK_PARAGRAPHS {
                blocks.push(paragraph_block(paragraph, &mut next_id));
            }
        }
    }

    Rendering {
        blocks,
        edit_mode: false,
        focused: None,
    }
}

fn paragraph_block(text: &str, next_id: &mut usize) -> Block {
    Block {
        kind: BlockKind::Paragraph,
        segments: segment(text, next_id),
    }
}

fn segment(text: &str, next_id: &mut usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Literal(text[last..whole.start()].to_string()));
        }
        segments.push(Segment::Placeholder(Placeholder::new(*next_id, name.as_str())));
        *next_id += 1;
        last = whole.end();
    }
    if last < text.len() {
        segments.push(Segment::Literal(text[last..].to_string()));
    }
    segments
}

impl Rendering {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.blocks
            .iter()
            .flat_map(|b| b.segments.iter())
            .filter_map(|s| match s {
                Segment::Placeholder(p) => Some(p),
                Segment::Literal(_) => None,
            })
    }

    fn placeholder_mut(&mut self, id: usize) -> Result<&mut Placeholder, AppError> {
        self.blocks
            .iter_mut()
            .flat_map(|b| b.segments.iter_mut())
            .find_map(|s| match s {
                Segment::Placeholder(p) if p.id == id => Some(p),
                _ => None,
            })
            .ok_or(AppError::UnknownPlaceholder(id))
    }

    /// Enter edit mode and focus the first placeholder in document order.
    ///
    /// Returns the focused placeholder, or `None` when there is nothing to edit.
    pub fn activate_editing(&mut self) -> Option<usize> {
        self.edit_mode = true;
        let first = self.placeholders().next().map(|p| p.id)?;
        self.focus(first).ok()?;
        Some(first)
    }

    pub fn deactivate_editing(&mut self) {
        self.edit_mode = false;
        self.focused = None;
    }

    pub fn focus(&mut self, id: usize) -> Result<(), AppError> {
        self.placeholder_mut(id)?.focus();
        self.focused = Some(id);
        Ok(())
    }

    /// Replace a placeholder's content, as typing into it would.
    pub fn edit(&mut self, id: usize, text: &str) -> Result<(), AppError> {
        let placeholder = self.placeholder_mut(id)?;
        placeholder.touched = true;
        placeholder.content = text.to_string();
        Ok(())
    }
}

/// Flatten a rendering into clipboard text.
///
/// Blocks are joined by a blank line, any whitespace run holding two or more newlines
/// collapses to a single blank line, and the result is trimmed.
pub fn extract_plain_text(rendering: &Rendering) -> String {
    let joined = rendering
        .blocks
        .iter()
        .map(Block::text)
        .collect::<Vec<_>>()
        .join("\n\n");
    BLANK_RUN_RE.replace_all(&joined, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(rendering: &Rendering, id: usize) -> &str {
        rendering
            .placeholders()
            .find(|p| p.id == id)
            .map(|p| p.content.as_str())
            .expect("placeholder exists")
    }

    fn record(subject: Option<&str>, body: Option<&str>) -> TemplateRecord {
        TemplateRecord {
            id: 1,
            title: "Parent-Teacher Meeting Request".to_string(),
            category: "meeting".to_string(),
            description: "Request a meeting.".to_string(),
            subject: subject.map(str::to_string),
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn single_placeholder_is_isolated() {
        let rendering = build_rendering(&record(None, Some("Dear [Teacher's Name],")));
        let placeholders: Vec<&Placeholder> = rendering.placeholders().collect();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].name, "Teacher's Name");
        assert_eq!(placeholders[0].content, "[Teacher's Name]");
        assert_eq!(
            rendering.blocks()[0].segments,
            vec![
                Segment::Literal("Dear ".to_string()),
                Segment::Placeholder(placeholders[0].clone()),
                Segment::Literal(",".to_string()),
            ]
        );
    }

    #[test]
    fn body_without_placeholders_round_trips() {
        let body = "First paragraph.\n\nSecond paragraph,\nwith a line break.\n\nThird.";
        let rendering = build_rendering(&record(None, Some(body)));
        assert_eq!(rendering.blocks().len(), 3);
        assert_eq!(rendering.placeholders().count(), 0);
        assert_eq!(extract_plain_text(&rendering), body);
    }

    #[test]
    fn outer_whitespace_and_extra_blank_lines_collapse() {
        let body = "  \nFirst.\n\n\n\nSecond.\n  \t\nThird.\n\n";
        let rendering = build_rendering(&record(None, Some(body)));
        assert_eq!(extract_plain_text(&rendering), "First.\n\nSecond.\n\nThird.");
    }

    #[test]
    fn subject_block_and_separator_are_prepended() {
        let rendering = build_rendering(&record(
            Some("Meeting about [Child's Name]"),
            Some("Dear [Teacher's Name],\n\nThanks."),
        ));
        let kinds: Vec<BlockKind> = rendering.blocks().iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            [BlockKind::Subject, BlockKind::Separator, BlockKind::Paragraph, BlockKind::Paragraph]
        );
        let names: Vec<(usize, &str)> = rendering
            .placeholders()
            .map(|p| (p.id, p.name.as_str()))
            .collect();
        assert_eq!(names, [(0, "Child's Name"), (1, "Teacher's Name")]);
        assert_eq!(
            extract_plain_text(&rendering),
            "Subject: Meeting about [Child's Name]\n\nDear [Teacher's Name],\n\nThanks."
        );
    }

    #[test]
    fn missing_body_uses_fallback() {
        let rendering = build_rendering(&record(None, None));
        let names: Vec<&str> = rendering.placeholders().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Teacher's Name",
                "Template content would be customized based on the specific communication needs.",
                "Your Name",
                "Your Contact Information",
            ]
        );
        assert!(rendering.blocks().iter().all(|b| b.kind == BlockKind::Paragraph));
    }

    #[test]
    fn placeholder_span_ends_at_first_closing_bracket() {
        let rendering = build_rendering(&record(None, Some("[a] and [b]] then [] and [c [d]")));
        let names: Vec<&str> = rendering.placeholders().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c [d"]);
        assert_eq!(extract_plain_text(&rendering), "[a] and [b]] then [] and [c [d]");
    }

    #[test]
    fn first_focus_clears_untouched_placeholder_once() {
        let mut rendering = build_rendering(&record(None, Some("Dear [Teacher's Name],")));
        rendering.focus(0).unwrap();
        assert_eq!(content(&rendering, 0), "");

        rendering.edit(0, "Ms. Rivera").unwrap();
        rendering.focus(0).unwrap();
        assert_eq!(content(&rendering, 0), "Ms. Rivera");

        // restored to the bracketed form after the first touch: not cleared again
        rendering.edit(0, "[Teacher's Name]").unwrap();
        rendering.focus(0).unwrap();
        assert_eq!(content(&rendering, 0), "[Teacher's Name]");
    }

    #[test]
    fn focus_after_edit_keeps_typed_text() {
        let mut rendering = build_rendering(&record(None, Some("Dear [Teacher's Name],")));
        rendering.edit(0, "Mr. Chen").unwrap();
        rendering.focus(0).unwrap();
        assert_eq!(extract_plain_text(&rendering), "Dear Mr. Chen,");
    }

    #[test]
    fn activate_editing_focuses_first_placeholder() {
        let mut rendering = build_rendering(&record(
            Some("Hello [Child's Name]"),
            Some("Dear [Teacher's Name],"),
        ));
        assert!(!rendering.edit_mode());
        assert_eq!(rendering.activate_editing(), Some(0));
        assert!(rendering.edit_mode());
        assert_eq!(rendering.focused(), Some(0));
        assert_eq!(content(&rendering, 0), "");
        assert_eq!(content(&rendering, 1), "[Teacher's Name]");

        rendering.deactivate_editing();
        assert!(!rendering.edit_mode());
        assert_eq!(rendering.focused(), None);
    }

    #[test]
    fn activate_editing_without_placeholders() {
        let mut rendering = build_rendering(&record(None, Some("Nothing to fill in.")));
        assert_eq!(rendering.activate_editing(), None);
        assert!(rendering.edit_mode());
    }

    #[test]
    fn plain_text_reflects_edits_and_empty_units() {
        let mut rendering = build_rendering(&record(
            None,
            Some("Dear [Teacher's Name],\n\nBest regards,\n[Your Name]\n[Your Contact Information]"),
        ));
        rendering.edit(0, "Ms. Rivera").unwrap();
        rendering.focus(1).unwrap();
        assert_eq!(
            extract_plain_text(&rendering),
            "Dear Ms. Rivera,\n\nBest regards,\n\n[Your Contact Information]"
        );
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let mut rendering = build_rendering(&record(None, Some("No placeholders.")));
        assert!(matches!(rendering.focus(3), Err(AppError::UnknownPlaceholder(3))));
        assert!(matches!(rendering.edit(0, "x"), Err(AppError::UnknownPlaceholder(0))));
    }
}
