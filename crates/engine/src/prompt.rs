//! Assist prompt construction.
//!
//! Pure text assembly. No I/O and no knowledge of which backend will
//! receive the prompt.

use harada_core::CellRole;

const GOAL_DESCRIPTION: &str = "the main goal cell (the central purpose or achievement \
you're working towards); this should be measurable in some way";

const ATTRIBUTE_DESCRIPTION: &str = "a goal attribute cell (a key characteristic or \
quality needed to achieve the goal)";

const REQUIREMENT_DESCRIPTION: &str = "a requirement cell (a specific action, practice, \
or step needed to develop the goal attribute)";

const REFERENCE_DESCRIPTION: &str = "a reference cell";

const GENERIC_DESCRIPTION: &str = "a cell";

/// Natural-language description of what a cell of this role holds.
pub fn role_description(role: CellRole) -> &'static str {
    match role {
        CellRole::Goal => GOAL_DESCRIPTION,
        CellRole::Section | CellRole::Accent => ATTRIBUTE_DESCRIPTION,
        CellRole::Plain => REQUIREMENT_DESCRIPTION,
        CellRole::Ref => REFERENCE_DESCRIPTION,
    }
}

/// Description for a role given by wire name. Unknown names get the
/// generic description.
pub fn role_description_for(role_name: &str) -> &'static str {
    role_name
        .parse::<CellRole>()
        .map(role_description)
        .unwrap_or(GENERIC_DESCRIPTION)
}

/// Build the cell-help instruction for a text generation service.
pub fn build_cell_help_prompt(
    cell_id: &str,
    role_name: &str,
    existing_text: &str,
    user_question: &str,
) -> String {
    let description = role_description_for(role_name);
    let mut prompt = String::new();

    prompt.push_str(
        "You are helping someone fill out a Harada Method goal-setting board. \
This is a 9x9 grid system designed to help break down and achieve ambitious goals.\n\n",
    );
    prompt.push_str(&format!(
        "The user is working on {} (cell ID: {}).\n",
        description, cell_id
    ));

    if !existing_text.is_empty() {
        prompt.push_str(&format!(
            "Current content in this cell: \"{}\"\n",
            existing_text
        ));
    }

    prompt.push_str(&format!("The user's question: {}\n\n", user_question));

    prompt.push_str(
        "Please provide a helpful, concise suggestion for what they could write in this cell. \
Your response should be:\n",
    );
    prompt.push_str("1. Specific and actionable\n");
    prompt.push_str(&format!(
        "2. Appropriate for {} in the Harada Method\n",
        description
    ));
    prompt.push_str("3. Clear and concise (short enough to fit in a small cell)\n");
    prompt.push_str("4. Directly responsive to their question\n\n");
    prompt.push_str(
        "Provide ONLY the suggested text for the cell, without any additional explanation, \
formatting, or markup.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_prompt() {
        let prompt = build_cell_help_prompt("r2c2", "section", "Fast", "make it measurable");
        assert!(prompt.contains("\"Fast\""));
        assert!(prompt.contains("make it measurable"));
        assert!(prompt.contains("a goal attribute cell"));
        assert!(prompt.contains("cell ID: r2c2"));
    }

    #[test]
    fn test_empty_existing_text_omitted() {
        let prompt = build_cell_help_prompt("r1c1", "plain", "", "ideas?");
        assert!(!prompt.contains("Current content"));
        assert!(prompt.contains("a requirement cell"));
    }

    #[test]
    fn test_goal_prompt_mentions_measurable() {
        let prompt = build_cell_help_prompt("goal", "goal", "", "help me phrase my goal");
        assert!(prompt.contains("main goal cell"));
        assert!(prompt.contains("measurable"));
    }

    #[test]
    fn test_unknown_role_falls_back() {
        assert_eq!(role_description_for("mystery"), "a cell");
        let prompt = build_cell_help_prompt("x", "mystery", "", "q");
        assert!(prompt.contains("working on a cell (cell ID: x)"));
    }

    #[test]
    fn test_accent_and_section_share_description() {
        assert_eq!(
            role_description(CellRole::Accent),
            role_description(CellRole::Section)
        );
        assert_eq!(role_description(CellRole::Ref), "a reference cell");
    }

    #[test]
    fn test_output_instructions() {
        let prompt = build_cell_help_prompt("r1c1", "plain", "", "q");
        assert!(prompt.contains("Specific and actionable"));
        assert!(prompt.contains("fit in a small cell"));
        assert!(prompt.contains("Provide ONLY the suggested text"));
    }
}
