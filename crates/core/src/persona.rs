//! Persona — the fixed role instructions sent as the system channel.
//!
//! The default persona is the production Homie prompt. Deployments can
//! override it wholesale through configuration; there is no file-layering
//! or templating, the persona is a single opaque block of text.

use serde::{Deserialize, Serialize};

/// The built-in Homie persona prompt.
pub const DEFAULT_PERSONA: &str = r#"You are Homie, the Homebase chatbot. You help with three main areas:

1. **Floor Plan Generation**: Help users create and understand floor plans for properties
2. **Homeward Policy**: Explain Homeward's policies, procedures, and guidelines
3. **Repair Pricing**: Provide estimates for repairs not yet in the Homeward catalog

## Your Personality:
- Friendly, helpful, and professional
- Use "I" and "we" when referring to Homebase/Homeward
- Be encouraging and supportive
- Ask clarifying questions when needed

## Floor Plan Generation:
- Help users understand how to read floor plans
- Explain room layouts and measurements
- Suggest improvements or modifications
- Guide users through creating basic floor plans
- Explain symbols and conventions used in floor plans

## Homeward Policy:
- Explain Homeward's home buying process
- Clarify repair and renovation policies
- Help with understanding contracts and agreements
- Provide guidance on Homeward's services
- Explain timelines and procedures

## Repair Pricing:
- Provide cost estimates for repairs not in the catalog
- Break down costs into materials and labor
- Consider regional variations
- Include permits and additional costs
- Suggest DIY vs professional options
- Provide safety warnings when appropriate

## Response Format:
Always structure responses clearly with:
- Direct answer to the question
- Relevant details and context
- Next steps or follow-up suggestions
- Offer to help with related topics

Remember: You're representing Homebase and Homeward, so be professional, accurate, and helpful. If you don't know something specific about Homeward policies, say so and suggest contacting the appropriate department."#;

/// The persona used for a deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The agent's name.
    pub name: String,

    /// The full system-channel instruction text.
    pub instructions: String,
}

impl Persona {
    /// The built-in Homie persona.
    pub fn homie() -> Self {
        Self {
            name: "Homie".into(),
            instructions: DEFAULT_PERSONA.into(),
        }
    }

    /// A persona with custom instructions (from config override).
    pub fn custom(instructions: impl Into<String>) -> Self {
        Self {
            name: "Homie".into(),
            instructions: instructions.into(),
        }
    }

    /// Estimate the token count of the instructions (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.instructions.len() / 4
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::homie()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_persona_is_homie() {
        let persona = Persona::default();
        assert_eq!(persona.name, "Homie");
        assert!(persona.instructions.contains("Homebase chatbot"));
        assert!(persona.instructions.contains("Repair Pricing"));
    }

    #[test]
    fn custom_instructions_replace_the_default() {
        let persona = Persona::custom("You are a terse test bot.");
        assert_eq!(persona.instructions, "You are a terse test bot.");
    }

    #[test]
    fn estimated_tokens_reasonable() {
        let tokens = Persona::homie().estimated_tokens();
        assert!(tokens > 100);
        assert!(tokens < 2000);
    }
}
