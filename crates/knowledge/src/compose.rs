//! Prompt Composer — persona plus optional knowledge block.
//!
//! Deterministic string assembly, nothing more. Length budgeting is the
//! provider's concern; composition never truncates or reorders.

/// Header introducing the matched-knowledge section of the system channel.
pub const RELEVANT_DATA_HEADER: &str = "\n\n## RELEVANT DATA:\n";

/// Compose the system-channel text.
///
/// Returns `persona` unchanged when the knowledge block carries no content.
/// A block of only whitespace counts as no content — that is what a matched
/// category with empty text produces — so an empty header section is never
/// emitted.
pub fn compose(persona: &str, knowledge: &str) -> String {
    if knowledge.trim().is_empty() {
        return persona.to_string();
    }
    format!("{persona}{RELEVANT_DATA_HEADER}{knowledge}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_knowledge_returns_persona_exactly() {
        assert_eq!(compose("You are Homie.", ""), "You are Homie.");
    }

    #[test]
    fn whitespace_only_knowledge_returns_persona_exactly() {
        assert_eq!(compose("You are Homie.", "\n"), "You are Homie.");
        assert_eq!(compose("You are Homie.", "  \n "), "You are Homie.");
    }

    #[test]
    fn knowledge_appended_under_header() {
        assert_eq!(
            compose("You are Homie.", "X"),
            "You are Homie.\n\n## RELEVANT DATA:\nX"
        );
    }

    #[test]
    fn composition_preserves_knowledge_verbatim() {
        let knowledge = "line one\nline two\n";
        let composed = compose("P", knowledge);
        assert!(composed.ends_with(knowledge));
    }
}
