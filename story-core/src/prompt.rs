//! Prompt construction for remote story generation.

use crate::params::{GenerationParameters, LanguageLevel, Scenario};

/// System instruction sent with every generation request.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert in creating social stories for children with autism. \
Create clear, age-appropriate, and supportive social stories that help children understand social situations and expectations.";

const GENERIC_SCENARIO_CONTEXT: &str = "the specified scenario";

/// Style directive for a language level.
pub fn style_directive(level: LanguageLevel) -> &'static str {
    match level {
        LanguageLevel::Simple => {
            "Use very short sentences (3-5 words), simple vocabulary, and repetition. Use present tense."
        }
        LanguageLevel::Intermediate => {
            "Use clear sentences (5-10 words), common vocabulary, and simple explanations."
        }
        LanguageLevel::Advanced => {
            "Use varied sentence structures, descriptive language, and can include more complex concepts."
        }
    }
}

/// What the story should be about, per scenario.
pub fn scenario_context(scenario: &Scenario) -> &'static str {
    match scenario {
        Scenario::School => {
            "going to school, being in a classroom, following teacher instructions, interacting with classmates"
        }
        Scenario::Doctor => {
            "visiting the doctor, medical checkup, waiting in the waiting room, meeting healthcare professionals"
        }
        Scenario::Playground => {
            "playing at the playground, taking turns, sharing equipment, playing with other children"
        }
        Scenario::Shopping => {
            "going shopping, walking through stores, selecting items, paying at checkout"
        }
        Scenario::Restaurant => {
            "eating at a restaurant, ordering food, waiting for food, using table manners"
        }
        Scenario::Birthday => {
            "attending a birthday party, celebrating with friends, eating cake, giving gifts"
        }
        Scenario::Haircut => {
            "getting a haircut, sitting in the barber chair, staying still, seeing the result"
        }
        Scenario::Dentist => {
            "visiting the dentist, dental checkup, cleaning teeth, following dentist instructions"
        }
        Scenario::Library => {
            "visiting the library, being quiet, selecting books, checking out books"
        }
        Scenario::Other | Scenario::Unrecognized(_) => GENERIC_SCENARIO_CONTEXT,
    }
}

/// Build the user prompt for a generation request.
pub fn build_prompt(params: &GenerationParameters) -> String {
    let age = params.age;
    let named = params
        .child_name()
        .map(|name| format!(" named {}", name.trim()))
        .unwrap_or_default();

    let mut prompt = format!(
        "Create a personalized social story for a {age}-year-old child{named} about {}.\n\n",
        scenario_context(&params.scenario)
    );

    prompt.push_str("Requirements:\n");
    prompt.push_str(&format!(
        "- Language Level: {}\n",
        style_directive(params.language_level)
    ));
    prompt.push_str(&format!(
        "- Age-appropriate: Content should be suitable for a {age}-year-old\n"
    ));
    prompt.push_str("- Positive and reassuring tone\n");
    prompt.push_str("- Clear, step-by-step narrative\n");
    prompt.push_str("- Include what the child will see, hear, and do\n");
    prompt.push_str("- Emphasize positive outcomes and feelings\n");
    prompt.push_str("- Use \"I\" perspective (first person)\n");
    prompt.push_str("- Keep it concise but complete (approximately 200-400 words)\n");

    if let Some(context) = params.context() {
        prompt.push_str(&format!("\nAdditional Context: {context}\n"));
    }
    if let Some(concerns) = params.concerns() {
        prompt.push_str(&format!("\nSpecific Goals: {concerns}\n"));
    }

    prompt.push_str(
        "\nFormat the story as a clear narrative that can be read aloud or by the child. \
Start with an introduction, then describe the scenario step by step, and end with a positive conclusion.",
    );

    prompt
}
