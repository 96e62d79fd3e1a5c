pub const VISION: &str = include_str!("../data/prompts/vision.txt");
pub const CONTENT: &str = include_str!("../data/prompts/content.txt");
pub const PROBE: &str = include_str!("../data/prompts/probe.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn build_vision_prompt() -> String {
    VISION.trim_end().to_string()
}

/// Content-package prompt with `description` embedded verbatim.
pub fn build_content_prompt(description: &str) -> String {
    render(CONTENT.trim_end(), &[("description", description)])
}

pub fn build_probe_prompt() -> String {
    PROBE.trim_end().to_string()
}
