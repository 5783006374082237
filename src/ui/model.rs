/// Severity used to color a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Normal,
    Muted,
    Good,
    Warn,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLine {
    pub text: String,
    pub tone: Tone,
}

impl ScreenLine {
    #[must_use]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Normal,
        }
    }

    #[must_use]
    pub fn toned<S: Into<String>>(text: S, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<ScreenLine>,
}

impl Section {
    #[must_use]
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn line<S: Into<String>>(mut self, text: S) -> Self {
        self.lines.push(ScreenLine::new(text));
        self
    }

    #[must_use]
    pub fn toned<S: Into<String>>(mut self, text: S, tone: Tone) -> Self {
        self.lines.push(ScreenLine::toned(text, tone));
        self
    }
}

/// One full refresh of a live tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
    pub footer: Option<String>,
}

impl Screen {
    #[must_use]
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            sections: Vec::new(),
            footer: None,
        }
    }

    #[must_use]
    pub fn subtitle<S: Into<String>>(mut self, subtitle: S) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    #[must_use]
    pub fn footer<S: Into<String>>(mut self, footer: S) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// First line of the named section whose text contains `needle`.
    #[must_use]
    pub fn find_line(&self, section: &str, needle: &str) -> Option<&ScreenLine> {
        self.sections
            .iter()
            .find(|candidate| candidate.title == section)?
            .lines
            .iter()
            .find(|line| line.text.contains(needle))
    }
}
