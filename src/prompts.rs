pub const ETYMOLOGY: &str = include_str!("../data/prompts/etymology.txt");
pub const NUANCES: &str = include_str!("../data/prompts/nuances.txt");
pub const DEFINITION: &str = include_str!("../data/prompts/definition.txt");
pub const STORY: &str = include_str!("../data/prompts/story.txt");
pub const NUANCE_TRANSLATION: &str = include_str!("../data/prompts/nuance_translation.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Join story words the way the story template lists them.
pub fn join_words(words: &[String]) -> String {
    words.join(", ")
}
