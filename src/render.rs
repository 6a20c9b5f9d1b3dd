use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref NUMBERED_ITEM: Regex = Regex::new(r"^[0-9]+\.").unwrap();
    // Optional book ordinal ("1 John"), capitalized book word(s), chapter:verse, optional range.
    static ref VERSE_REFERENCE: Regex =
        Regex::new(r"^(?:[1-3] )?[A-Z][A-Za-z]*(?: (?:of|[A-Z][A-Za-z]*))* [0-9]+:[0-9]+(?:-[0-9]+)?")
            .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    NumberedItem,
    VerseReference,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    Regular,
    Medium,
    Semibold,
}

impl LineKind {
    pub fn weight(&self) -> Weight {
        match self {
            LineKind::NumberedItem => Weight::Medium,
            LineKind::VerseReference => Weight::Semibold,
            LineKind::Plain => Weight::Regular,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    pub text: String,
    pub kind: LineKind,
    pub weight: Weight,
}

pub fn classify(line: &str) -> LineKind {
    if NUMBERED_ITEM.is_match(line) {
        LineKind::NumberedItem
    } else if VERSE_REFERENCE.is_match(line) {
        LineKind::VerseReference
    } else {
        LineKind::Plain
    }
}

/// Split guidance text into classified display lines.
pub fn render(text: &str) -> Vec<RenderedLine> {
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let kind = classify(line);
            RenderedLine {
                text: line.to_string(),
                kind,
                weight: kind.weight(),
            }
        })
        .collect()
}

/// What a share action hands to the platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: &'static str,
    pub text: String,
    pub url: String,
}

/// Rendered guidance plus like/save toggles. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct ResponseView {
    guidance: String,
    lines: Vec<RenderedLine>,
    liked: bool,
    saved: bool,
}

impl ResponseView {
    pub fn new(guidance: impl Into<String>) -> Self {
        let guidance = guidance.into();
        let lines = render(&guidance);
        Self {
            guidance,
            lines,
            liked: false,
            saved: false,
        }
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<RenderedLine> {
        self.lines
    }

    pub fn is_liked(&self) -> bool {
        self.liked
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn toggle_like(&mut self) -> bool {
        self.liked = !self.liked;
        self.liked
    }

    pub fn toggle_save(&mut self) -> bool {
        self.saved = !self.saved;
        self.saved
    }

    pub fn share(&self, url: impl Into<String>) -> SharePayload {
        SharePayload {
            title: "Biblical Guidance",
            text: self.guidance.clone(),
            url: url.into(),
        }
    }
}
