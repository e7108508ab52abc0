use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The judge's categorical decision. Anything the judge returns outside the
/// three known values lands in `Unknown` and is treated as `Proceed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Heal,
    Intervene,
    Unknown(String),
}

impl Verdict {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "proceed" => Verdict::Proceed,
            "heal" => Verdict::Heal,
            "intervene" => Verdict::Intervene,
            _ => Verdict::Unknown(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Proceed => "proceed",
            Verdict::Heal => "heal",
            Verdict::Intervene => "intervene",
            Verdict::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Verdict::parse(&raw))
    }
}

/// Judge's quality assessment of one prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuardResult {
    pub verdict: Verdict,
    pub reason: String,
    pub confidence: f64,
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    /// Set only when the judge could not be reached or understood
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Which heal instruction template to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealMode {
    Clarity,
    Anger,
    Auto,
}

impl HealMode {
    /// Unknown names fall back to clarity
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "anger" => HealMode::Anger,
            "auto" => HealMode::Auto,
            _ => HealMode::Clarity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealMode::Clarity => "clarity",
            HealMode::Anger => "anger",
            HealMode::Auto => "auto",
        }
    }
}

/// Outcome of rewriting a prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealResult {
    pub healed_prompt: String,
    pub changes_made: Vec<String>,
    /// Template actually used (never `Auto`)
    pub mode: HealMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub prompt: String,
    pub improvements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionsResult {
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscussResult {
    pub questions: Vec<String>,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Acknowledgement that the user chose to keep their original prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProceedAck {
    pub verdict: Verdict,
    pub note: String,
    pub prompt: String,
}
