//! Builds the outbound prompt text from a dream submission.
//!
//! Adapters compose [`dream_brief`] with their own reply-format instruction
//! when they need a non-canonical shape (the Gemini two-stage pipeline), or
//! use [`build_analysis_prompt`] directly for the single-stage path.

use crate::dream::{DreamData, InterpretationMethod};

/// System instruction shared by chat-style adapters.
pub const SYSTEM_INSTRUCTION: &str = "You are an experienced dream psychologist. \
You interpret dreams with care, grounded in established psychological schools, \
and you always answer in the exact JSON format the user requests, with no text \
outside the JSON object.";

/// Method-specific framing placed at the top of every analysis prompt.
fn method_instruction(method: InterpretationMethod) -> &'static str {
    match method {
        InterpretationMethod::Jungian => {
            "Interpret this dream through a Jungian lens: archetypes, the \
             shadow, anima/animus, and the individuation process."
        }
        InterpretationMethod::Freudian => {
            "Interpret this dream through a Freudian lens: latent versus \
             manifest content, wish fulfillment, and unconscious drives."
        }
        InterpretationMethod::Gestalt => {
            "Interpret this dream through a Gestalt lens: treat every element \
             of the dream as a disowned part of the dreamer and explore what \
             each part expresses."
        }
        InterpretationMethod::Cognitive => {
            "Interpret this dream through a cognitive lens: continuity with \
             waking concerns, memory consolidation, and rehearsal of real \
             situations."
        }
        InterpretationMethod::Existential => {
            "Interpret this dream through an existential lens: freedom, \
             responsibility, meaning, finitude, and the dreamer's stance \
             toward their own life."
        }
        InterpretationMethod::Auto => {
            "Choose the psychological school (Jungian, Freudian, Gestalt, \
             cognitive, or existential) that best fits this dream, say which \
             one you chose and why, and interpret the dream through it."
        }
    }
}

/// The method framing, the dream description, and every set context field in
/// a fixed, labeled order. No reply-format instruction is appended here.
pub fn dream_brief(dream: &DreamData) -> String {
    let mut out = String::new();
    out.push_str(method_instruction(dream.method));
    out.push_str("\n\nDream description:\n");
    out.push_str(&dream.description);

    let ctx = &dream.context;
    push_field(&mut out, "Dominant emotion", &ctx.emotion);
    push_field(&mut out, "Life situation", &ctx.life_situation);
    push_field(&mut out, "Associations", &ctx.associations);
    if let Some(recurring) = ctx.recurring {
        out.push_str("\nRecurring dream: ");
        out.push_str(if recurring { "yes" } else { "no" });
    }
    push_field(&mut out, "Day residue", &ctx.day_residue);
    push_field(&mut out, "Characters in the dream", &ctx.characters);
    push_field(&mut out, "Dreamer's role", &ctx.dreamer_role);
    push_field(
        &mut out,
        "Physical sensation on waking",
        &ctx.waking_sensation,
    );

    out
}

fn push_field(out: &mut String, label: &str, value: &Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            out.push('\n');
            out.push_str(label);
            out.push_str(": ");
            out.push_str(v);
        }
    }
}

/// Full single-stage prompt: brief plus the canonical-JSON reply instruction.
pub fn build_analysis_prompt(dream: &DreamData) -> String {
    let mut out = dream_brief(dream);
    out.push_str(
        "\n\nReply with exactly one JSON object and nothing else, in this shape:\n\
         {\n\
         \x20 \"summary\": \"short summary of the interpretation\",\n\
         \x20 \"symbolism\": [{\"name\": \"symbol\", \"meaning\": \"detailed meaning\"}],\n\
         \x20 \"analysis\": \"long-form analysis, markdown allowed\",\n\
         \x20 \"advice\": [\"practical advice\"],\n\
         \x20 \"questions\": [\"reflective question for the dreamer\"]\n\
         }",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dream::{DreamContext, DreamData, InterpretationMethod};

    fn dream() -> DreamData {
        DreamData {
            description: "I was flying over a frozen lake.".into(),
            context: DreamContext {
                emotion: Some("awe".into()),
                life_situation: Some("changing jobs".into()),
                associations: None,
                recurring: Some(true),
                day_residue: None,
                characters: Some("strangers".into()),
                dreamer_role: Some("observer".into()),
                waking_sensation: Some("cold hands".into()),
            },
            method: InterpretationMethod::Jungian,
        }
    }

    #[test]
    fn brief_contains_description_and_labeled_fields_in_order() {
        let brief = dream_brief(&dream());
        assert!(brief.contains("Jungian"));
        assert!(brief.contains("Dream description:\nI was flying over a frozen lake."));

        let emotion = brief.find("Dominant emotion: awe").unwrap();
        let situation = brief.find("Life situation: changing jobs").unwrap();
        let recurring = brief.find("Recurring dream: yes").unwrap();
        let role = brief.find("Dreamer's role: observer").unwrap();
        let sensation = brief.find("Physical sensation on waking: cold hands").unwrap();
        assert!(emotion < situation);
        assert!(situation < recurring);
        assert!(recurring < role);
        assert!(role < sensation);
    }

    #[test]
    fn unset_fields_are_omitted() {
        let brief = dream_brief(&dream());
        assert!(!brief.contains("Associations"));
        assert!(!brief.contains("Day residue"));
    }

    #[test]
    fn auto_method_asks_model_to_choose() {
        let mut d = dream();
        d.method = InterpretationMethod::Auto;
        let brief = dream_brief(&d);
        assert!(brief.contains("say which one you chose"));
    }

    #[test]
    fn full_prompt_requests_canonical_json() {
        let prompt = build_analysis_prompt(&dream());
        assert!(prompt.contains("exactly one JSON object"));
        assert!(prompt.contains("\"symbolism\""));
        assert!(prompt.contains("\"questions\""));
    }
}
