//! Prompt construction and response text hygiene.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::FeedbackRequest;

/// Characters stripped from model-produced feedback before it is spoken.
static FEEDBACK_NOISE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"["*]"#).ok());

/// Builds the feedback prompt. The model must answer in Spanish, in the
/// character's voice, with at most eight words.
#[must_use]
pub fn feedback_prompt(request: &FeedbackRequest) -> String {
    format!(
        "Eres {character}, personaje de la serie infantil \"31 Minutos\".\n\
         Un niño de 6 años terminó el juego \"{game}\" con {score} puntos.\n\
         Felicítalo con una frase MUY CORTA (máximo 8 palabras), tal como hablaría {character}.\n\
         Usa palabras sencillas y alegres. No uses asteriscos ni comillas.",
        character = request.character,
        game = request.game_type,
        score = request.score,
    )
}

/// Wraps a short edit instruction with the house art direction.
#[must_use]
pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "Modify this photo: {}. Style: Bright, colorful, 31 Minutos puppet world, friendly for children, cartoonish.",
        instruction.trim()
    )
}

/// Strips quotes and asterisks and trims surrounding whitespace.
///
/// Returns an empty string when nothing speakable remains; callers decide
/// which fallback phrase to use in that case.
#[must_use]
pub fn clean_feedback(text: &str) -> String {
    let Some(re) = FEEDBACK_NOISE.as_ref() else {
        return text.replace(['"', '*'], "").trim().to_string();
    };
    re.replace_all(text, "").trim().to_string()
}
