//! Decorative illustrations for storybook pages.
//!
//! Nothing here fetches images. Illustrations are placeholder descriptors and
//! short visual prompts that a front end may show or ignore.

use crate::params::{GenerationParameters, Scenario};
use serde::{Deserialize, Serialize};

const PLACEHOLDER_BASE_URL: &str = "https://picsum.photos/800/600?random=";

/// Maximum number of visual prompts for a story.
pub const MAX_VISUAL_PROMPTS: usize = 8;

/// Readers younger than this get the simpler picture style.
const SIMPLE_STYLE_MAX_AGE: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Illustration {
    pub url: String,
    pub prompt: String,
    pub alt: String,
}

/// Placeholder illustrations, one per page.
///
/// `seed` keeps the URLs stable for one story and distinct between stories.
pub fn placeholder_images(scenario: &Scenario, count: usize, seed: i64) -> Vec<Illustration> {
    (0..count)
        .map(|i| Illustration {
            url: format!("{PLACEHOLDER_BASE_URL}{seed}-{i}"),
            prompt: format!("Story image {}", i + 1),
            alt: format!("Illustration for {scenario} story"),
        })
        .collect()
}

fn scenario_prompts(scenario: &Scenario) -> &'static [&'static str] {
    match scenario {
        Scenario::School => &[
            "Classroom setting",
            "Teacher at desk",
            "Children sitting",
            "School bus",
            "Lunchroom",
        ],
        Scenario::Doctor => &[
            "Doctor's office",
            "Medical equipment",
            "Doctor with stethoscope",
            "Waiting room",
            "Nurse",
        ],
        Scenario::Playground => &[
            "Playground equipment",
            "Children playing",
            "Swings",
            "Slide",
            "Playing together",
        ],
        Scenario::Shopping => &[
            "Shopping cart",
            "Store aisle",
            "Cashier",
            "Products on shelves",
            "Paying at checkout",
        ],
        Scenario::Restaurant => &[
            "Restaurant table",
            "Menu",
            "Waiter",
            "Food on plate",
            "Eating together",
        ],
        Scenario::Birthday => &[
            "Birthday cake",
            "Party decorations",
            "Gifts",
            "Friends celebrating",
            "Balloons",
        ],
        Scenario::Haircut => &["Barber chair", "Haircut tools", "Mirror", "Barber", "Hair salon"],
        Scenario::Dentist => &[
            "Dental chair",
            "Dentist",
            "Dental tools",
            "Toothbrush",
            "Smiling",
        ],
        Scenario::Library => &[
            "Bookshelves",
            "Reading area",
            "Librarian",
            "Books",
            "Quiet space",
        ],
        Scenario::Other | Scenario::Unrecognized(_) => {
            &["People interacting", "Happy faces", "Calm environment"]
        }
    }
}

fn age_prompts(age: u8) -> &'static [&'static str] {
    if age < SIMPLE_STYLE_MAX_AGE {
        &["Simple illustrations", "Bright colors", "Friendly characters"]
    } else {
        &["Realistic images", "Diverse characters", "Clear scenes"]
    }
}

/// Short prompts describing what the pictures for a story could show.
pub fn visual_prompts(params: &GenerationParameters) -> Vec<&'static str> {
    scenario_prompts(&params.scenario)
        .iter()
        .chain(age_prompts(params.age))
        .copied()
        .take(MAX_VISUAL_PROMPTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LanguageLevel;

    #[test]
    fn test_placeholder_images() {
        let images = placeholder_images(&Scenario::Dentist, 3, 42);
        assert_eq!(images.len(), 3);
        assert_eq!(images[0].url, "https://picsum.photos/800/600?random=42-0");
        assert_eq!(images[2].prompt, "Story image 3");
        assert_eq!(images[1].alt, "Illustration for dentist story");
        assert!(placeholder_images(&Scenario::School, 0, 1).is_empty());
    }

    #[test]
    fn test_visual_prompts_young_child() {
        let prompts = visual_prompts(&GenerationParameters::new("school", 4, LanguageLevel::Simple));
        assert_eq!(prompts.len(), MAX_VISUAL_PROMPTS);
        assert_eq!(prompts[0], "Classroom setting");
        assert_eq!(prompts[5], "Simple illustrations");
        assert!(!prompts.contains(&"Friendly characters"));
    }

    #[test]
    fn test_visual_prompts_generic_scenario() {
        let prompts = visual_prompts(&GenerationParameters::new("aquarium", 10, LanguageLevel::Advanced));
        assert_eq!(
            prompts,
            vec![
                "People interacting",
                "Happy faces",
                "Calm environment",
                "Realistic images",
                "Diverse characters",
                "Clear scenes"
            ]
        );
    }
}
