//! Recommendation prompt, bullet extraction and the recommendations section
//! appended to every formatted analysis.

use serde_json::Value;

use crate::domain::AnalysisKind;

pub const RECOMMENDATIONS_MARKER: &str = "📋 **Recommendations**:";

const BULLET: char = '•';

pub fn introduction(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Demographics => "I just got info from the demographic agent which means I will develop a recommendation that is based on these insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Interests => "I just got info from the interests agent which means I will develop a recommendation that is based on these insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Keywords => "I just got info from the keywords agent which means I will develop a recommendation that is based on these feature insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Usage => "I just got info from the usage behavior agent which means I will develop a recommendation that is based on these usage pattern insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Satisfaction => "I just got info from the satisfaction agent which means I will develop a recommendation that is based on these customer satisfaction insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Purchase => "I just got info from the purchase behavior agent which means I will develop a recommendation that is based on these purchasing pattern insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Personality => "I just got info from the personality agent which means I will develop a recommendation that is based on these personality trait insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Lifestyle => "I just got info from the lifestyle agent which means I will develop a recommendation that is based on these lifestyle pattern insights, concrete and actionable recommendations that can be used.",
        AnalysisKind::Values => "I just got info from the values agent which means I will develop a recommendation that is based on these core values insights, concrete and actionable recommendations that can be used.",
    }
}

pub fn recommendation_prompt(kind: AnalysisKind, audience: &str, insights: &Value) -> String {
    let insights_json =
        serde_json::to_string_pretty(insights).unwrap_or_else(|_| insights.to_string());

    format!(
        r#"
Based on the following {kind} insights about {audience},
provide 3-5 concrete, actionable recommendations.

Each recommendation should:
1. Be specific and practical
2. Directly relate to the insights provided
3. Be implementable without significant resources
4. Include a brief explanation of expected outcomes

Insights:
{insights_json}

Format each recommendation as a bullet point starting with "{BULLET}" followed by the recommendation.
"#
    )
}

fn is_bullet(line: &str) -> bool {
    line.starts_with(BULLET) || line.starts_with('-')
}

/// Keeps the bullet lines of a reply; a reply without bullets becomes one item.
pub fn extract_bullets(reply: &str) -> Vec<String> {
    let bullets: Vec<String> = reply
        .lines()
        .map(str::trim)
        .filter(|line| is_bullet(line))
        .map(str::to_string)
        .collect();

    if bullets.is_empty() {
        vec![format!("{BULLET} {}", reply.trim())]
    } else {
        bullets
    }
}

pub fn append_section(formatted_output: &str, introduction: &str, items: &[String]) -> String {
    let mut output = String::with_capacity(formatted_output.len() + 256);
    output.push_str(formatted_output);
    output.push_str("\n\n");
    output.push_str(RECOMMENDATIONS_MARKER);
    output.push('\n');
    output.push_str(introduction);
    output.push_str("\n\n");
    for item in items {
        output.push_str(item);
        output.push('\n');
    }
    output
}

/// Splits a formatted analysis into its main text and the bullet items that
/// follow the recommendations marker.
pub fn split_recommendations(formatted_output: &str) -> (String, Vec<String>) {
    let Some((main, section)) = formatted_output.split_once(RECOMMENDATIONS_MARKER) else {
        return (formatted_output.trim().to_string(), Vec::new());
    };

    let items = section
        .lines()
        .map(str::trim)
        .filter(|line| is_bullet(line))
        .map(|line| {
            let mut chars = line.chars();
            chars.next();
            chars.as_str().trim().to_string()
        })
        .collect();

    (main.trim().to_string(), items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bullets_are_kept_in_order() {
        let reply = "Here are ideas:\n• Sponsor local races\nfiller\n  - Bundle spare batteries\n";
        assert_eq!(
            extract_bullets(reply),
            vec!["• Sponsor local races", "- Bundle spare batteries"]
        );
    }

    #[test]
    fn reply_without_bullets_becomes_single_item() {
        assert_eq!(
            extract_bullets("  Offer a loyalty program.  "),
            vec!["• Offer a loyalty program."]
        );
    }

    #[test]
    fn section_is_appended_after_output() {
        let output = append_section(
            "Main analysis",
            "Intro line",
            &["• One".to_string(), "• Two".to_string()],
        );
        assert_eq!(
            output,
            "Main analysis\n\n📋 **Recommendations**:\nIntro line\n\n• One\n• Two\n"
        );
    }

    #[test]
    fn split_round_trips_appended_section() {
        let output = append_section("Main analysis", "Intro", &["• One".into(), "- Two".into()]);
        let (main, items) = split_recommendations(&output);
        assert_eq!(main, "Main analysis");
        assert_eq!(items, vec!["One", "Two"]);
    }

    #[test]
    fn split_without_marker_keeps_everything_as_main() {
        let (main, items) = split_recommendations("  Just text \n");
        assert_eq!(main, "Just text");
        assert!(items.is_empty());
    }

    #[test]
    fn prompt_includes_insights_and_kind() {
        let prompt = recommendation_prompt(
            AnalysisKind::Usage,
            "e-bikes",
            &json!({"behavior": {"usage_summary": "daily commute"}}),
        );
        assert!(prompt.contains("usage insights about e-bikes"));
        assert!(prompt.contains("daily commute"));
    }
}
