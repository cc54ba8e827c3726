//! Deterministic fallback stories.
//!
//! Used whenever remote generation is unavailable or fails. A base template is
//! chosen by scenario, personalized with the child's name and age, and then
//! extended by reassurance rules triggered by keywords in the free-text
//! context and concerns.
//!
//! The rules are an ordered list evaluated in fixed precedence; every matching
//! rule contributes one paragraph. Output depends only on the parameters.

use crate::params::{GenerationParameters, LanguageLevel, Scenario};

/// Name used when no child name is given.
pub const DEFAULT_CHILD_NAME: &str = "Alex";

/// Minimum age for the closing paragraph of advanced stories.
pub const ADVANCED_CLOSING_MIN_AGE: u8 = 8;

const ADVANCED_CLOSING: &str =
    "I feel proud when I try new things. Each day I learn something new.";

/// A family of concerns that triggers a reassurance paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcernFamily {
    NoiseSensitivity,
    Anxiety,
    Transitions,
    SocialSharing,
    /// Echo of the free-text context itself.
    CustomDetail,
}

impl ConcernFamily {
    /// All families in the order their paragraphs are inserted.
    pub const PRECEDENCE: [ConcernFamily; 5] = [
        ConcernFamily::NoiseSensitivity,
        ConcernFamily::Anxiety,
        ConcernFamily::Transitions,
        ConcernFamily::SocialSharing,
        ConcernFamily::CustomDetail,
    ];

    /// Lower-case substrings that trigger this family.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ConcernFamily::NoiseSensitivity => &["loud", "noise", "sound"],
            ConcernFamily::Anxiety => &["anxiety", "worry", "nervous", "scared"],
            ConcernFamily::Transitions => &["transition", "change", "adjust"],
            ConcernFamily::SocialSharing => &["share", "turn", "friend"],
            ConcernFamily::CustomDetail => &[],
        }
    }

    fn applies(self, input: &RuleInput<'_>) -> bool {
        match self {
            ConcernFamily::CustomDetail => input.context.is_some(),
            family => family
                .keywords()
                .iter()
                .any(|keyword| input.haystack.contains(keyword)),
        }
    }

    fn paragraph(self, input: &RuleInput<'_>) -> String {
        match self {
            ConcernFamily::NoiseSensitivity if *input.scenario == Scenario::School => {
                "Sometimes school can be loud. The bell might ring. Children might talk. This is okay. \
I can cover my ears if it feels too loud. I can take deep breaths. I am safe."
                    .to_string()
            }
            ConcernFamily::NoiseSensitivity => {
                "Sometimes there might be loud sounds. This is okay. I can cover my ears if I need to. \
I can take deep breaths. I am safe."
                    .to_string()
            }
            ConcernFamily::Anxiety => {
                "If I feel worried, that is okay. I can tell a grown-up how I feel. I can take deep breaths. \
I am brave. Everything will be okay."
                    .to_string()
            }
            ConcernFamily::Transitions => {
                "Things might change during the day. That is okay. I can ask for help if I need it. \
I can take my time."
                    .to_string()
            }
            ConcernFamily::SocialSharing => {
                "I will remember to share. I will wait for my turn. This makes everyone happy."
                    .to_string()
            }
            ConcernFamily::CustomDetail => {
                let detail = input
                    .context
                    .map(|c| {
                        let c = c.trim();
                        capitalize_first(c.strip_suffix('.').unwrap_or(c))
                    })
                    .unwrap_or_default();
                format!("{detail}. I can handle this. I am strong.")
            }
        }
    }
}

/// What the rules look at.
struct RuleInput<'a> {
    scenario: &'a Scenario,
    /// Lower-cased context and concerns, space separated.
    haystack: String,
    context: Option<&'a str>,
}

impl<'a> RuleInput<'a> {
    fn new(params: &'a GenerationParameters) -> Self {
        let haystack = [params.context(), params.concerns()]
            .into_iter()
            .flatten()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            scenario: &params.scenario,
            haystack,
            context: params.context(),
        }
    }
}

/// Families whose rules match these parameters, in precedence order.
pub fn matched_families(params: &GenerationParameters) -> Vec<ConcernFamily> {
    let input = RuleInput::new(params);
    ConcernFamily::PRECEDENCE
        .into_iter()
        .filter(|family| family.applies(&input))
        .collect()
}

/// Generate the fallback story for these parameters.
pub fn fallback_story(params: &GenerationParameters) -> String {
    let name = params
        .child_name()
        .map(str::trim)
        .unwrap_or(DEFAULT_CHILD_NAME);

    let base = base_template(&params.scenario, name, params.age);

    let input = RuleInput::new(params);
    let paragraphs: Vec<String> = ConcernFamily::PRECEDENCE
        .into_iter()
        .filter(|family| family.applies(&input))
        .map(|family| family.paragraph(&input))
        .collect();

    let mut story = insert_paragraphs(&base, &paragraphs);

    if params.language_level == LanguageLevel::Advanced
        && params.age >= ADVANCED_CLOSING_MIN_AGE
    {
        story.push_str("\n\n");
        story.push_str(ADVANCED_CLOSING);
    }

    story
}

/// Insert paragraphs right after the last `!` of `base`, or append them when
/// there is none (or it opens the text).
pub(crate) fn insert_paragraphs(base: &str, paragraphs: &[String]) -> String {
    if paragraphs.is_empty() {
        return base.to_string();
    }

    let block: String = paragraphs.iter().map(|p| format!("\n\n{p}")).collect();

    match base.rfind('!') {
        Some(idx) if idx > 0 => {
            let split = idx + '!'.len_utf8();
            format!("{}{}{}", &base[..split], block, &base[split..])
        }
        _ => format!("{base}{block}"),
    }
}

fn base_template(scenario: &Scenario, name: &str, age: u8) -> String {
    match scenario {
        Scenario::School => format!(
            "My School Day

My name is {name}. I am {age} years old. Today I am going to school.

When I get to school, I will see my teacher. My teacher will say hello. I will say hello back.

I will sit at my desk. I will listen to my teacher. I will raise my hand if I want to talk.

At recess, I will play with my friends. We will take turns. We will share toys.

When school is done, I will go home. I did a good job today!"
        ),
        Scenario::Doctor => format!(
            "Going to the Doctor

My name is {name}. I am {age} years old. Today I am going to see the doctor.

First, we will drive to the doctor's office. I will sit in my car seat.

When we get there, we will wait in the waiting room. I can read a book or play quietly.

Then the nurse will call my name. I will go into a room. The doctor will come in.

The doctor will check my body. The doctor will use tools. This is okay. The doctor helps me stay healthy.

When we are done, I will get a sticker! I am brave."
        ),
        Scenario::Playground => format!(
            "Playing at the Playground

My name is {name}. I am {age} years old. Today I am going to the playground.

At the playground, I will see swings. I will see slides. I will see other children playing.

I can play on the swings. I will wait my turn if someone else is using them.

I can go down the slide. I will wait for the person in front of me to finish first.

I can play with other children. We can play together. This is fun!

When it is time to go, I will say goodbye. I had a good time at the playground."
        ),
        _ => format!(
            "My Social Story

My name is {name}. I am {age} years old.

Today I will do something new. I will be brave. I will try my best.

Everything will be okay. I can do this!"
        ),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(age: u8, level: LanguageLevel) -> GenerationParameters {
        GenerationParameters::new("school", age, level)
    }

    #[test]
    fn test_sam_goes_to_school() {
        let params = school(5, LanguageLevel::Simple)
            .with_child_name("Sam")
            .with_concerns("loud noises");
        let story = fallback_story(&params);

        assert!(story.contains("My name is Sam"));
        assert!(story.contains("5 years old"));
        assert_eq!(story.matches("I can cover my ears").count(), 1);
    }

    #[test]
    fn test_deterministic() {
        for scenario in Scenario::ALL {
            let params = GenerationParameters::new(scenario, 9, LanguageLevel::Advanced)
                .with_context("a new building")
                .with_concerns("worried about loud bells and sharing");
            assert_eq!(fallback_story(&params), fallback_story(&params));
        }
    }

    #[test]
    fn test_default_name() {
        let story = fallback_story(&school(6, LanguageLevel::Simple));
        assert!(story.contains("My name is Alex."));
    }

    #[test]
    fn test_unrecognized_scenario_uses_default_template() {
        let params = GenerationParameters::new("hot air balloon", 6, LanguageLevel::Simple);
        let story = fallback_story(&params);
        assert!(story.starts_with("My Social Story"));
        assert!(story.contains("I can do this!"));
    }

    #[test]
    fn test_templated_scenarios() {
        let doctor = fallback_story(&GenerationParameters::new("doctor", 4, LanguageLevel::Simple));
        assert!(doctor.starts_with("Going to the Doctor"));

        let playground =
            fallback_story(&GenerationParameters::new("playground", 4, LanguageLevel::Simple));
        assert!(playground.starts_with("Playing at the Playground"));

        let library = fallback_story(&GenerationParameters::new("library", 4, LanguageLevel::Simple));
        assert!(library.starts_with("My Social Story"));
    }

    #[test]
    fn test_loud_is_case_insensitive_and_precedes_anxiety() {
        let params = GenerationParameters::new("doctor", 6, LanguageLevel::Simple)
            .with_context("gets SCARED easily")
            .with_concerns("LOUD machines");
        let story = fallback_story(&params);

        let noise = story.find("loud sounds").expect("noise paragraph");
        let anxiety = story.find("If I feel worried").expect("anxiety paragraph");
        assert!(noise < anxiety);
        assert_eq!(story.matches("I can cover my ears").count(), 1);
    }

    #[test]
    fn test_school_noise_wording() {
        let story = fallback_story(&school(5, LanguageLevel::Simple).with_concerns("noise"));
        assert!(story.contains("Sometimes school can be loud."));
        assert!(!story.contains("Sometimes there might be loud sounds."));
    }

    #[test]
    fn test_rule_precedence() {
        let params = GenerationParameters::new("playground", 6, LanguageLevel::Simple)
            .with_context("my friend is moving")
            .with_concerns("sharing, change, nervous, sound");

        assert_eq!(
            matched_families(&params),
            ConcernFamily::PRECEDENCE.to_vec()
        );
    }

    #[test]
    fn test_no_concerns_keeps_base_template() {
        let params = GenerationParameters::new("doctor", 6, LanguageLevel::Simple);
        assert!(matched_families(&params).is_empty());
        assert!(fallback_story(&params).ends_with("I will get a sticker! I am brave."));
    }

    #[test]
    fn test_paragraphs_inserted_after_last_exclamation() {
        let params =
            GenerationParameters::new("doctor", 6, LanguageLevel::Simple).with_concerns("worry");
        let story = fallback_story(&params);

        assert!(story.contains(
            "I will get a sticker!\n\nIf I feel worried, that is okay."
        ));
        assert!(story.ends_with("Everything will be okay. I am brave."));
    }

    #[test]
    fn test_insert_without_exclamation_appends() {
        let paragraphs = vec!["One.".to_string(), "Two.".to_string()];
        assert_eq!(insert_paragraphs("Calm.", &paragraphs), "Calm.\n\nOne.\n\nTwo.");
        assert_eq!(insert_paragraphs("!Start", &paragraphs), "!Start\n\nOne.\n\nTwo.");
        assert_eq!(insert_paragraphs("Hi!", &[]), "Hi!");
    }

    #[test]
    fn test_custom_detail_echo() {
        let params = school(5, LanguageLevel::Simple).with_context("we have a substitute teacher.");
        let story = fallback_story(&params);
        assert!(story.contains("We have a substitute teacher. I can handle this. I am strong."));
        assert_eq!(matched_families(&params), vec![ConcernFamily::CustomDetail]);
    }

    #[test]
    fn test_custom_detail_keeps_ellipsis() {
        let params = school(5, LanguageLevel::Simple).with_context("we wait for the bus...");
        assert!(fallback_story(&params).contains("We wait for the bus... I can handle this."));

        let params = school(5, LanguageLevel::Simple).with_context("it is picture day");
        assert!(fallback_story(&params).contains("It is picture day. I can handle this."));
    }

    #[test]
    fn test_advanced_closing() {
        let closing = "I feel proud when I try new things.";

        assert!(fallback_story(&school(8, LanguageLevel::Advanced)).ends_with(ADVANCED_CLOSING));
        assert!(!fallback_story(&school(7, LanguageLevel::Advanced)).contains(closing));
        assert!(!fallback_story(&school(12, LanguageLevel::Intermediate)).contains(closing));
    }
}
