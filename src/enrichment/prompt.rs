//! Prompt template for member biography classification.

/// Persona vocabulary the model is asked to choose from.
pub const PERSONAS: &[&str] = &[
    "Mentor Material",
    "Needs Guidance",
    "Passive",
    "Observer",
    "Contributor",
];

/// Build the classification prompt for one member biography.
pub fn member_classification_prompt(biography: &str) -> String {
    format!(
        r#"You are an expert community manager and data analyst. Your task is to analyze the following member bio/comment and extract structured data.

Member Input:
"{biography}"

Please extract the following:
1. Skills: A list of specific technical or soft skills mentioned or implied.
2. Persona: Classify the member into ONE of these categories: "Mentor Material", "Needs Guidance", "Passive", "Observer", "Contributor".
3. Confidence Score: A numeric score between 0.0 and 1.0 reflecting how confident you are in the extraction and classification based on the richness of the input. 1.0 is very confident, 0.0 is a guess.

Return the result as a valid JSON object matching the following schema:
{{
    "skills": ["string"],
    "persona": "string",
    "confidence_score": float
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_biography() {
        let prompt = member_classification_prompt("Loves mentoring new volunteers");
        assert!(prompt.contains("\"Loves mentoring new volunteers\""));
    }

    #[test]
    fn test_prompt_lists_all_personas() {
        let prompt = member_classification_prompt("bio");
        for persona in PERSONAS {
            assert!(prompt.contains(persona), "prompt missing persona {persona}");
        }
    }
}
