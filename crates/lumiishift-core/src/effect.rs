/// One-shot visual flourish shown after a reply lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Uplifting animation (balloons)
    Cheerful,
    /// Calming animation (snow)
    Serene,
    /// No flourish
    Neutral,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Cheerful => "cheerful",
            Effect::Serene => "serene",
            Effect::Neutral => "neutral",
        }
    }
}

/// Map a mood id to its effect bucket. Ids outside the two named groups,
/// including ids not in any catalog, are `Neutral`.
pub fn classify(mood_id: &str) -> Effect {
    match mood_id {
        "happy" | "excited" | "overjoyed" | "joyful" => Effect::Cheerful,
        "calm" | "peaceful" | "relaxed" => Effect::Serene,
        _ => Effect::Neutral,
    }
}
