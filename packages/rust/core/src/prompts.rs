//! Prompt templates for the generation stages.

/// System message for the metadata request.
pub const METADATA_SYSTEM: &str = "You are a SEO and digital marketing expert.";

/// System message for the outline request.
pub const OUTLINE_SYSTEM: &str =
    "You are a senior content strategist and technical writer specializing in AI and tech.";

/// System message for each section-expansion request.
pub const SECTION_SYSTEM: &str =
    "You are a senior technical writer and SEO expert specializing in AI and tech.";

/// Maximum slug length requested for suggested page URLs.
pub const MAX_SLUG_CHARS: usize = 74;

/// Maximum meta description length requested from the model.
pub const MAX_DESCRIPTION_CHARS: usize = 160;

pub fn metadata_prompt(topic: &str, site_url: &str) -> String {
    let site_url = site_url.trim_end_matches('/');
    format!(
        "You are an SEO expert. For a website about \"{topic}\", please provide:\n\
         1. Three creative meta titles.\n\
         2. Three engaging meta descriptions within {MAX_DESCRIPTION_CHARS} characters.\n\
         3. Three potential page URLs. Format each URL as: {site_url}/<suggestion>, \
         where <suggestion> is a short string of up to {MAX_SLUG_CHARS} characters.\n\n\
         Format your answer as a JSON object with keys \"meta_titles\", \
         \"meta_descriptions\", and \"site_urls\"."
    )
}

pub fn outline_prompt(topic: &str, harvested: &str) -> String {
    format!(
        "Use the scraped content from top articles about \"{topic}\" given below to generate \
         a comprehensive outline for an article on this topic.\n\
         Outline should have:\n\
         - An engaging introduction.\n\
         - Clearly defined body sections that cover the main points, insights, and data from \
         the scraped content.\n\
         - A conclusion summarizing the key takeaways.\n\
         - Headings, subheadings, and bullet points where appropriate.\n\n\
         Scraped Content:\n{harvested}"
    )
}

/// Prompt for elaborating section `index` (1-based).
pub fn section_prompt(topic: &str, index: usize, section: &str) -> String {
    format!(
        "You are an expert content strategist and technical writer, specializing in AI and \
         tech. I am writing an article on \"{topic}\".\n\
         This is the section I need help with (Section {index}):\n{section}\n\n\
         Please elaborate on this section and provide detailed, engaging, and comprehensive \
         content that fits into a full-length article. Ensure that your response is clear, \
         uses appropriate headings and subheadings if needed, and maintains a friendly yet \
         professional tone."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_prompt_names_keys_and_site() {
        let prompt = metadata_prompt("electric bicycles", "https://bikes.example/");
        assert!(prompt.contains("\"electric bicycles\""));
        assert!(prompt.contains("https://bikes.example/<suggestion>"));
        assert!(prompt.contains("\"meta_titles\""));
        assert!(prompt.contains("\"meta_descriptions\""));
        assert!(prompt.contains("\"site_urls\""));
        assert!(prompt.contains("160 characters"));
        assert!(prompt.contains("74 characters"));
    }

    #[test]
    fn outline_prompt_embeds_content() {
        let prompt = outline_prompt("solar panels", "Panels convert light.");
        assert!(prompt.contains("introduction"));
        assert!(prompt.contains("conclusion"));
        assert!(prompt.ends_with("Scraped Content:\nPanels convert light."));
    }

    #[test]
    fn section_prompt_numbers_section() {
        let prompt = section_prompt("solar panels", 2, "## Costs");
        assert!(prompt.contains("(Section 2)"));
        assert!(prompt.contains("## Costs"));
        assert!(prompt.contains("friendly yet professional tone"));
    }
}
