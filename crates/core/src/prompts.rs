//! Edit-instruction prompts sent to image-generation providers.
//!
//! Providers receive a natural-language description of the desired edit
//! alongside the input images. Two registers exist: a terse "flash"
//! style for fast models and a structured "pro" style for higher-end
//! models. Within each register, five numbered instruction sets trade
//! off replacement aggressiveness against subtlety; set 1 is the
//! default. The input-context line differs depending on whether images
//! arrive as separate numbered panels or pre-composited side by side.

/// Prompt register for fast image models.
pub const PROMPT_STYLE_FLASH: &str = "flash";
/// Prompt register for high-fidelity image models.
pub const PROMPT_STYLE_PRO: &str = "pro";

/// Valid instruction-set numbers.
pub const PROMPT_SET_OPTIONS: [u8; 5] = [1, 2, 3, 4, 5];
/// Instruction set used when none (or an invalid one) is configured.
pub const PROMPT_SET_DEFAULT: u8 = 1;

/// Inputs to [`build_hair_prompt`].
#[derive(Debug, Clone, Default)]
pub struct PromptSpec {
    /// Images are pre-composited into one multi-panel image.
    pub composite_input: bool,
    /// A beard reference image is part of the input.
    pub include_beard_reference: bool,
    /// Catalog description text for the target style, if any.
    pub style_description: String,
    /// Target hair color name, or empty to keep the natural tone.
    pub hair_color_name: String,
    /// Target beard color name, or empty to keep it natural.
    pub beard_color_name: String,
    /// Whether the beard should be edited at all.
    pub apply_beard_edit: bool,
    /// Requested instruction set (clamped to [`PROMPT_SET_OPTIONS`]).
    pub prompt_set: u8,
}

/// Clamp a configured prompt-set number to a valid option.
pub fn resolve_prompt_set(raw: u8) -> u8 {
    if PROMPT_SET_OPTIONS.contains(&raw) {
        raw
    } else {
        PROMPT_SET_DEFAULT
    }
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append " in <color> color." to the first style instruction.
fn inject_hair_color(instruction: &str, hair_color: &str) -> String {
    let color = hair_color.trim();
    if color.is_empty() {
        return instruction.to_string();
    }
    let trimmed = instruction.trim_end().trim_end_matches('.');
    format!("{trimmed} in {color} color.")
}

fn flash_input_context(composite: bool, with_beard: bool) -> &'static str {
    match (composite, with_beard) {
        (true, true) => {
            "Input: multi-panel image where LEFT is selfie, MIDDLE is hairstyle reference, \
             and RIGHT is beard reference."
        }
        (true, false) => "Input: two-panel image where LEFT is selfie and RIGHT is hairstyle reference.",
        (false, true) => {
            "Input: Image 1 is selfie, Image 2 is hairstyle reference, and Image 3 is beard reference."
        }
        (false, false) => "Input: Image 1 is selfie and Image 2 is hairstyle reference.",
    }
}

fn pro_input_context(composite: bool, with_beard: bool) -> &'static str {
    match (composite, with_beard) {
        (true, true) => {
            "Input Context: The input is a horizontal multi-panel image. \
             Image 1 (LEFT): The Subject (Selfie). \
             Image 2 (MIDDLE): The Hairstyle Reference. \
             Image 3 (RIGHT): The Beard Reference."
        }
        (true, false) => {
            "Input Context: The input is a two-panel image. \
             Image 1 (LEFT): The Subject (Selfie). \
             Image 2 (RIGHT): The Hairstyle Reference."
        }
        (false, true) => {
            "Input Context: Image 1: The Subject (Selfie). \
             Image 2: The Hairstyle Reference. \
             Image 3: The Beard Reference."
        }
        (false, false) => {
            "Input Context: Image 1: The Subject (Selfie). Image 2: The Hairstyle Reference."
        }
    }
}

fn flash_style_instructions(prompt_set: u8) -> &'static [&'static str] {
    match prompt_set {
        2 => &[
            "Task: replace hairstyle in Image 1 using Image 2 as the only haircut target.",
            "Hard edit: completely remove the current scalp hair in Image 1 before applying the new style.",
            "Do not preserve old hair shape, length, or volume.",
            "Haircut match must be obvious: same silhouette, same fringe or part direction, same top mass, and same side/fade flow.",
            "If the result looks unchanged, regenerate with stronger replacement.",
        ],
        3 => &[
            "Replace only scalp hair in Image 1 with the hairstyle from Image 2.",
            "Match the reference haircut shape clearly, including top volume, part/fringe direction, and side taper.",
            "Prioritize haircut similarity over the original hairstyle.",
        ],
        4 => &[
            "Two-step edit: first remove existing scalp hair, then apply the hairstyle from Image 2.",
            "The final haircut should read as the reference style on the same person, not a light variation of the old cut.",
            "Match outline, layers, top lift, fringe/part, and fade gradient from the reference.",
            "Force a visible style change while preserving photorealism.",
        ],
        5 => &[
            "Change only the scalp hair in Image 1.",
            "Replace the hairstyle in Image 1 with the hairstyle from Image 2.",
            "Reference haircut is the source of truth. Do not keep the original haircut shape.",
            "Match the reference overall silhouette, total length, top volume, fringe/part direction, and side/fade shape.",
        ],
        _ => &[
            "Use Image 2 as the haircut target for Image 1.",
            "Fully replace the current hairstyle in Image 1. Do not preserve the original hair shape or volume.",
            "Match the reference hairstyle clearly: silhouette, fringe/part direction, top volume, and side/fade shape.",
        ],
    }
}

fn pro_process_instruction(prompt_set: u8) -> &'static str {
    match prompt_set {
        2 => {
            "Execution Guidelines: \
             1. REPLACE: Completely remove the subject's original hairstyle. \
             Do not let the original hair volume or shape limit the new style. \
             2. MATCH: Visibly transfer the structure of the reference hairstyle to the subject. \
             You must match the reference silhouette, fringe direction, top volume, side/fade gradation, and parting."
        }
        3 => {
            "Execution Guidelines: Perform a direct hair replacement only. \
             Remove existing scalp hair, then reconstruct the reference style with clear silhouette match, \
             fringe/part match, top-volume match, and side/fade match. \
             The output must show a visible haircut change."
        }
        4 => {
            "Execution Guidelines: Stage 1 erase original scalp hair influence. \
             Stage 2 apply the reference haircut faithfully. \
             Stage 3 verify the output is visibly different from the input haircut while identity and scene remain unchanged."
        }
        5 => {
            "Execution Guidelines: Edit scalp hair only. Replace the hairstyle in Image 1 with Image 2 and treat the reference \
             as the source of truth. Match silhouette, total length, top volume, fringe/part direction, and side/fade shape."
        }
        _ => {
            "Execution Guidelines: Replace the hair in Image 1 with the hairstyle in Image 2. \
             Fully remove original hairstyle constraints and transfer the reference haircut structure, including silhouette, \
             fringe/part direction, top volume, side/fade gradation, and parting."
        }
    }
}

fn build_flash_prompt(spec: &PromptSpec) -> String {
    let style_description = normalize_ws(&spec.style_description);
    let hair_color = spec.hair_color_name.trim();
    let beard_color = spec.beard_color_name.trim();
    let with_beard = spec.include_beard_reference && spec.apply_beard_edit;
    let prompt_set = resolve_prompt_set(spec.prompt_set);

    let description_line = if style_description.is_empty() {
        String::new()
    } else {
        format!(
            "Additional haircut description from style catalog: {style_description}. \
             Use this text together with Image 2 to improve haircut matching."
        )
    };

    let (beard_line, beard_color_line) = if with_beard {
        let color_line = if beard_color.is_empty() {
            "Keep beard color natural.".to_string()
        } else {
            format!("Set beard color to {beard_color}.")
        };
        (
            "Use Image 3 as beard reference and blend sideburns naturally into the haircut.".to_string(),
            color_line,
        )
    } else {
        ("Keep beard shape and color unchanged.".to_string(), String::new())
    };

    let style_instructions = flash_style_instructions(prompt_set);
    let mut parts: Vec<String> = Vec::new();
    parts.push(flash_input_context(spec.composite_input, with_beard).to_string());
    parts.push(description_line);
    parts.push(inject_hair_color(style_instructions[0], hair_color));
    parts.extend(style_instructions[1..].iter().map(|s| s.to_string()));
    parts.push("Keep face, skin tone, body, and clothing unchanged.".to_string());
    parts.push("Keep face direction exactly the same as Image 1.".to_string());
    parts.push("Keep background, camera angle, and lighting unchanged.".to_string());
    parts.push(beard_line);
    parts.push(beard_color_line);
    parts.push("Return one realistic portrait image only.".to_string());

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

fn build_pro_prompt(spec: &PromptSpec) -> String {
    let style_description = normalize_ws(&spec.style_description);
    let hair_color = spec.hair_color_name.trim();
    let beard_color = spec.beard_color_name.trim();
    let with_beard = spec.include_beard_reference && spec.apply_beard_edit;
    let prompt_set = resolve_prompt_set(spec.prompt_set);

    let description_line = if style_description.is_empty() {
        String::new()
    } else {
        format!(
            "REFERENCE TEXT: Additional haircut description from style catalog: {style_description}. \
             Use this text together with Image 2 to improve haircut matching."
        )
    };

    let (beard_line, beard_color_line) = if with_beard {
        let color_line = if beard_color.is_empty() {
            "Keep beard color natural.".to_string()
        } else {
            format!("Set beard color to {beard_color}.")
        };
        (
            "BEARD: Replace beard shape using Image 3, blending sideburns naturally into the haircut."
                .to_string(),
            color_line,
        )
    } else {
        ("BEARD: Keep beard shape and color unchanged.".to_string(), String::new())
    };

    let mut process = pro_process_instruction(prompt_set).to_string();
    if !hair_color.is_empty() {
        process = format!("{process} Apply the hairstyle in {hair_color} color.");
    }

    let mut parts: Vec<String> = Vec::new();
    parts.push("Operation: Hair Replacement.".to_string());
    parts.push(pro_input_context(spec.composite_input, with_beard).to_string());
    parts.push(
        "Primary Instruction: Create a realistic haircut simulation using the reference hairstyle."
            .to_string(),
    );
    parts.push(description_line);
    parts.push(process);
    parts.push(
        "Strict Constraints: IDENTITY: Keep the face, skin tone, body, and clothing of Image 1 exactly unchanged."
            .to_string(),
    );
    parts.push("POSE: Keep face direction exactly the same as Image 1.".to_string());
    parts.push(
        "ENVIRONMENT: Keep the background, camera angle, and lighting of Image 1 exactly unchanged."
            .to_string(),
    );
    parts.push(beard_line);
    parts.push(beard_color_line);
    parts.push("OUTPUT: Return a single, high-fidelity portrait image.".to_string());

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Build the edit-instruction prompt for a generation request.
pub fn build_hair_prompt(prompt_style: &str, spec: &PromptSpec) -> String {
    if prompt_style.trim().eq_ignore_ascii_case(PROMPT_STYLE_FLASH) {
        build_flash_prompt(spec)
    } else {
        build_pro_prompt(spec)
    }
}
