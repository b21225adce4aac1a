use std::fmt;

/// Five ordinal sentiment classes, most negative first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 5] = [
        SentimentLabel::VeryNegative,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
        SentimentLabel::VeryPositive,
    ];

    pub fn from_class(class: u8) -> Option<Self> {
        Self::ALL.get(class as usize).copied()
    }

    pub fn class(self) -> u8 {
        match self {
            SentimentLabel::VeryNegative => 0,
            SentimentLabel::Negative => 1,
            SentimentLabel::Neutral => 2,
            SentimentLabel::Positive => 3,
            SentimentLabel::VeryPositive => 4,
        }
    }

    /// Text written to the `emocion` column of an export.
    pub fn sentiment_name(self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "Muy negativa",
            SentimentLabel::Negative => "Negativa",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positiva",
            SentimentLabel::VeryPositive => "Muy positiva",
        }
    }

    /// Text shown on screen after a comment is analyzed.
    pub fn depression_level(self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "depresion muy alta",
            SentimentLabel::Negative => "depresión alta",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Depresion minima",
            SentimentLabel::VeryPositive => "Sin depresión",
        }
    }
}

// Display follows the class number so neither text table gets picked implicitly.
impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())
    }
}
