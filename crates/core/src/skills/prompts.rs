//! Default prompt templates bundled at compile time.

/// Renewable energy researcher instructions
pub const RENEWABLE_ENERGY: &str = include_str!("defaults/renewable_energy.md");

/// Electric vehicle researcher instructions
pub const EV_TECHNOLOGY: &str = include_str!("defaults/ev_technology.md");

/// Carbon capture researcher instructions
pub const CARBON_CAPTURE: &str = include_str!("defaults/carbon_capture.md");

/// Synthesis agent system instructions
pub const SYNTHESIS: &str = include_str!("defaults/synthesis.md");

/// Synthesis prompt with `{slot}` placeholders for the research results
pub const SYNTHESIS_TEMPLATE: &str = include_str!("defaults/synthesis_template.md");

/// All default prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("renewable_energy", RENEWABLE_ENERGY),
        ("ev_technology", EV_TECHNOLOGY),
        ("carbon_capture", CARBON_CAPTURE),
        ("synthesis", SYNTHESIS),
        ("synthesis_template", SYNTHESIS_TEMPLATE),
    ]
}
