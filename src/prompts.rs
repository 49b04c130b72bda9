//! Natural-language instructions sent alongside the images.
//!
//! Everything here is a pure function of its arguments: identical inputs
//! always produce byte-identical prompts.

use crate::models::{DigitalTwinStyle, GenerationMode};

const OUTPUT_ONLY_IMAGE: &str = "Output only the image, no commentary.";

fn topic_clause(topic: &str) -> String {
    if topic.trim().is_empty() {
        "The user has not provided a specific topic, so use your expert judgment to make it universally funny.".to_string()
    } else {
        format!(
            "The user wants the meme to be about: \"{}\". Use this as your primary inspiration.",
            topic
        )
    }
}

pub fn build_prompt(
    mode: GenerationMode,
    topic: &str,
    has_template: bool,
    variation_hint: Option<&str>,
) -> String {
    let mut prompt = match mode {
        GenerationMode::Classic => classic_prompt(topic),
        GenerationMode::Popular => popular_prompt(topic),
        GenerationMode::Custom => custom_prompt(topic, has_template),
        GenerationMode::Story => story_overview_prompt(topic),
    };

    if let Some(hint) = variation_hint.filter(|h| !h.trim().is_empty()) {
        prompt.push_str("\n**Variation Focus:** ");
        prompt.push_str(hint);
    }

    prompt
}

fn classic_prompt(topic: &str) -> String {
    format!(
        r#"You are a legendary meme expert and caption writer.
**Mission:** Create a hilarious meme by adding a caption to the provided image(s).
**Instructions:**
1.  **Analyze the Visuals:** Scrutinize the image for expressions, actions, and objects.
2.  **Craft the Caption:** Write a short, punchy, clever caption. {topic}
3.  **Meme Aesthetics:** Superimpose the caption onto the image using the classic "Impact" font (white text, heavy black border). Place it strategically to enhance the humor.
4.  **Output:** Your only output is the final meme image. {output}"#,
        topic = topic_clause(topic),
        output = OUTPUT_ONLY_IMAGE,
    )
}

fn popular_prompt(topic: &str) -> String {
    format!(
        r#"You are a meme expert who recreates images in the style of popular meme formats.
**Mission:** Analyze the user's image and reimagine it as a famous meme.
**Instructions:**
1.  **Identify the Core Concept:** Look at the user's image. What's the mood, the action, the subject?
2.  **Select a Matching Meme Format:** Choose a well-known meme template that fits the image's concept (e.g., "Distracted Boyfriend," "Woman Yelling at a Cat," "Is This a Pigeon?").
3.  **Recreate, Don't Just Caption:** Redraw or artistically reinterpret the user's image to match the style and composition of the chosen format. The original subject(s) must stay recognizable but be transformed into the meme's world.
4.  **Add Witty Text:** Add a caption that is hilarious in the context of the new format. {topic}
5.  **Output:** Your only output is the final, high-quality meme image. Do not explain your choice. {output}"#,
        topic = topic_clause(topic),
        output = OUTPUT_ONLY_IMAGE,
    )
}

fn custom_prompt(instruction: &str, has_template: bool) -> String {
    let instruction_clause = if instruction.trim().is_empty() {
        "The user did not give a specific instruction, so use your expert judgment to place the subject where it is funniest.".to_string()
    } else {
        format!(
            "The user's instruction is: \"{}\". Follow it precisely.",
            instruction
        )
    };

    let (input_analysis, integration) = if has_template {
        (
            r#"*   **Image 1 (The Template):** The background and context. This is the foundational meme format and must stay recognizable.
*   **Image 2+ (The Subject):** The person(s), object(s), or character(s) to be integrated into the template."#,
            "Place the subject from Image 2+ into the template (Image 1), replacing an existing character if needed.",
        )
    } else {
        (
            r#"*   **Image 1+ (The Subject):** The person(s), object(s), or character(s) to feature. No template was supplied, so choose a fitting well-known meme format for them."#,
            "Recreate the chosen meme format and place the subject from Image 1+ into it, taking the role of its main character.",
        )
    };

    format!(
        r#"You are a master image editor and meme expert.
**Mission:** Seamlessly blend the subject into the meme template.
**Input Analysis:**
{input_analysis}
**Instructions:**
1.  **Analyze All Images:** Understand the lighting, style, perspective, and content of the template and the subject.
2.  **Integrate the Subject:** {integration} The integration must be FLAWLESS. {instruction}
3.  **Match the Aesthetics:** Adjust lighting, shadows, color grading, and image quality of the subject to match the template so it looks like part of the original picture.
4.  **Text Policy:** Only add or rewrite caption text if the template already contains text. If the template has no text, do not add any text at all.
5.  **Output:** Your only output is the final, edited meme image. {output}"#,
        input_analysis = input_analysis,
        integration = integration,
        instruction = instruction_clause,
        output = OUTPUT_ONLY_IMAGE,
    )
}

// Story generation goes through `build_story_prompt` per panel; this is
// only what `build_prompt` returns for completeness.
fn story_overview_prompt(topic: &str) -> String {
    format!(
        r#"You are a meme expert and comic book artist.
**Mission:** Turn the character(s) in the provided image into a short, funny comic strip.
**Story Topic:** {topic}
**Output:** Your only output is the comic image. {output}"#,
        topic = story_topic_clause(topic),
        output = OUTPUT_ONLY_IMAGE,
    )
}

fn story_topic_clause(topic: &str) -> String {
    if topic.trim().is_empty() {
        "The user has not provided a topic, so use your expert judgment to make the story universally funny.".to_string()
    } else {
        format!("The story should be about: \"{}\".", topic)
    }
}

const PANEL_INTRODUCE: &str = "This is the first panel. Introduce the character(s) and the setting from the reference image, establishing the beginning of the story.";
const PANEL_RISING: &str = "This panel is the middle of the story. Show a rising action, a problem, or a conflict.";
const PANEL_CONTINUATION: &str = "This panel continues the story. Escalate the situation and build tension toward the ending.";
const PANEL_RESOLUTION: &str = "This is the final panel. Provide a resolution or a punchline that concludes the story.";

fn panel_task(panel: usize, total: usize) -> &'static str {
    match (panel, total) {
        (1, _) => PANEL_INTRODUCE,
        (p, t) if p >= t => PANEL_RESOLUTION,
        (2, _) => PANEL_RISING,
        _ => PANEL_CONTINUATION,
    }
}

/// Prompt for one panel of a story strip. `panel` is 1-based.
pub fn build_story_prompt(
    panel: usize,
    total: usize,
    topic: &str,
    has_previous_panel: bool,
) -> String {
    let continuity = if has_previous_panel {
        format!(
            "\n**Previous Panel:** The second provided image is panel {} of this strip. Continue directly from it, keeping the scene, lighting, and art style consistent.",
            panel.saturating_sub(1)
        )
    } else {
        String::new()
    };

    format!(
        r#"You are a comic book artist creating a {total}-panel comic strip.
**Mission:** Create panel {panel} of {total}.
**Character Reference:** The first provided image contains the main character(s). Their appearance, clothing, and style MUST remain consistent with this reference image throughout the story. Do not change the character.{continuity}
**Story Topic:** {topic}
**Panel Task:** {task}
**Output:** Your only output is the final, high-quality image for this specific panel. Do not add panel numbers, text unrelated to the story, or explanations. {output}"#,
        total = total,
        panel = panel,
        continuity = continuity,
        topic = story_topic_clause(topic),
        task = panel_task(panel, total),
        output = OUTPUT_ONLY_IMAGE,
    )
}

fn twin_style_clause(style: DigitalTwinStyle) -> &'static str {
    match style {
        DigitalTwinStyle::Sticker => "Render the subject(s) as a clean, enhanced photorealistic cutout sticker with crisp edges and a subtle white outline.",
        DigitalTwinStyle::Model3d => "Render the subject(s) as a polished, Pixar-style 3D character model with soft studio lighting and appealing stylized proportions.",
        DigitalTwinStyle::Cartoon => "Render the subject(s) as a vibrant 2D animated cartoon character with bold outlines and flat, saturated colors.",
        DigitalTwinStyle::PixelArt => "Render the subject(s) as a classic 16-bit video game sprite with a limited palette and clearly visible pixels.",
    }
}

pub fn build_digital_twin_prompt(style: DigitalTwinStyle) -> String {
    format!(
        r#"You are a character designer creating a reusable "digital twin" of the subject(s) in the provided image.
**Mission:** Isolate every subject and turn them into a versatile character model that can be dropped into any meme.
**Style:** {style}
**Non-negotiable Requirements:**
1.  **Transparent Background:** Remove the background entirely. The output MUST be a PNG with a fully transparent background (alpha channel). No scenery, floor, shadows on a backdrop, or solid color fill.
2.  **Full Body:** Show each subject's complete full body from head to toe. If the subject is cropped in the photo (for example a half-body or head-and-shoulders shot), invent the missing parts so the figure is complete and consistent with the visible parts.
3.  **Likeness:** Keep the subject's identity, facial features, hairstyle, and clothing recognizable.
4.  **Pose:** Use a neutral, expressive standing pose facing the viewer.
**Output:** Your only output is the final PNG image with a transparent background. {output}"#,
        style = twin_style_clause(style),
        output = OUTPUT_ONLY_IMAGE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_deterministic() {
        for mode in GenerationMode::ALL {
            let a = build_prompt(mode, "cat judging me", true, Some("hint"));
            let b = build_prompt(mode, "cat judging me", true, Some("hint"));
            assert_eq!(a, b);
        }
        assert_eq!(
            build_story_prompt(2, 4, "a heist", true),
            build_story_prompt(2, 4, "a heist", true)
        );
    }

    #[test]
    fn test_topic_is_inserted_verbatim() {
        let prompt = build_prompt(GenerationMode::Classic, "cat judging me", false, None);
        assert!(prompt.contains("\"cat judging me\""));
        assert!(!prompt.contains("expert judgment"));
    }

    #[test]
    fn test_blank_topic_uses_fallback() {
        for topic in ["", "   \t"] {
            let prompt = build_prompt(GenerationMode::Popular, topic, false, None);
            assert!(prompt.contains("use your expert judgment"));
            assert!(!prompt.contains("about: \""));
        }
    }

    #[test]
    fn test_every_mode_demands_image_only_output() {
        for mode in GenerationMode::ALL {
            let prompt = build_prompt(mode, "", mode.requires_template(), None);
            assert!(prompt.contains(OUTPUT_ONLY_IMAGE), "mode {}", mode);
        }
    }

    #[test]
    fn test_variation_hint_is_appended() {
        let plain = build_prompt(GenerationMode::Classic, "x", false, None);
        let hinted = build_prompt(GenerationMode::Classic, "x", false, Some("Be absurd."));
        assert!(hinted.starts_with(&plain));
        assert!(hinted.ends_with("**Variation Focus:** Be absurd."));
    }

    #[test]
    fn test_custom_prompt_orders_inputs_and_restricts_text() {
        let prompt = build_prompt(GenerationMode::Custom, "swap the cat", true, None);
        let template_pos = prompt.find("Image 1 (The Template)").unwrap();
        let subject_pos = prompt.find("Image 2+ (The Subject)").unwrap();
        assert!(template_pos < subject_pos);
        assert!(prompt.contains("Only add or rewrite caption text if the template already contains text"));
        assert!(prompt.contains("\"swap the cat\""));
    }

    #[test]
    fn test_custom_prompt_without_template_never_mentions_one_as_input() {
        let prompt = build_prompt(GenerationMode::Custom, "make it epic", false, None);
        assert!(!prompt.contains("Image 2+"));
        assert!(!prompt.contains("template (Image 1)"));
        assert!(prompt.contains("Image 1+ (The Subject)"));

        let with_template = build_prompt(GenerationMode::Custom, "make it epic", true, None);
        assert!(with_template.contains("Place the subject from Image 2+ into the template (Image 1)"));
    }

    #[test]
    fn test_three_panel_arc() {
        assert!(build_story_prompt(1, 3, "", false).contains(PANEL_INTRODUCE));
        assert!(build_story_prompt(2, 3, "", true).contains(PANEL_RISING));
        assert!(build_story_prompt(3, 3, "", true).contains(PANEL_RESOLUTION));
    }

    #[test]
    fn test_four_panel_arc() {
        assert!(build_story_prompt(1, 4, "", false).contains(PANEL_INTRODUCE));
        assert!(build_story_prompt(2, 4, "", true).contains(PANEL_RISING));
        assert!(build_story_prompt(3, 4, "", true).contains(PANEL_CONTINUATION));
        assert!(build_story_prompt(4, 4, "", true).contains(PANEL_RESOLUTION));
    }

    #[test]
    fn test_story_prompt_mentions_previous_panel_only_when_chained() {
        let first = build_story_prompt(1, 4, "a heist", false);
        assert!(!first.contains("Previous Panel"));
        assert!(first.contains("Create panel 1 of 4"));

        let third = build_story_prompt(3, 4, "a heist", true);
        assert!(third.contains("panel 2 of this strip"));
        assert!(third.contains("\"a heist\""));
    }

    #[test]
    fn test_twin_prompt_always_requires_transparency_and_full_body() {
        for style in DigitalTwinStyle::ALL {
            let prompt = build_digital_twin_prompt(style);
            assert!(prompt.contains("transparent background"), "style {}", style);
            assert!(prompt.contains("PNG"));
            assert!(prompt.contains("full body"));
            assert!(prompt.contains(twin_style_clause(style)));
        }
        assert!(build_digital_twin_prompt(DigitalTwinStyle::PixelArt).contains("16-bit"));
    }
}
