use serde::Deserialize;

/// One streamed chunk; only the first choice's delta text is consumed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreamChunk {
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChunkChoice {
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChunkDelta {
    pub content: Option<String>,
}

impl StreamChunk {
    /// Delta text of the first choice, empty when absent.
    #[must_use]
    pub fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .unwrap_or_default()
    }
}

/// Non-streaming completion object.
#[derive(Debug, Default, Deserialize)]
pub struct CompletionBody {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompletionChoice {
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl CompletionBody {
    #[must_use]
    pub fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}
