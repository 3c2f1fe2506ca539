//! Idea ranking
//!
//! Turns scored trends into an ordered list of app ideas. Selection is a pure
//! function of rank position: every third idea (positions 0, 3, 6, ...) is a
//! non-AI "viral" idea, the rest are AI-infused and cycle through a fixed
//! capability catalog. No randomness is involved, so identical input always
//! yields identical output.

use std::collections::BTreeMap;

use shared::{AppIdea, TechStackEntry, TrendRecord};

/// Default number of ideas attempted per cycle
pub const DEFAULT_MAX_IDEAS: usize = 5;

/// Priority boost applied to AI-infused ideas
pub const AI_PRIORITY_BOOST: f64 = 1.0;

const TITLE_CHARS: usize = 40;
const DESCRIPTION_CHARS: usize = 80;

/// An AI capability archetype: display name and short code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiCapability {
    pub name: &'static str,
    pub code: &'static str,
}

/// Ordered capability catalog; position `i` picks entry `i % len`
pub const AI_CAPABILITIES: [AiCapability; 10] = [
    AiCapability { name: "Natural language processing", code: "NLP" },
    AiCapability { name: "Computer vision", code: "CV" },
    AiCapability { name: "Predictive analytics", code: "ML" },
    AiCapability { name: "Generative AI content", code: "GenAI" },
    AiCapability { name: "Voice/speech recognition", code: "ASR" },
    AiCapability { name: "Recommendation engine", code: "RecSys" },
    AiCapability { name: "Automated decision making", code: "Agent" },
    AiCapability { name: "Smart automation", code: "Agent" },
    AiCapability { name: "Personalization engine", code: "ML" },
    AiCapability { name: "Sentiment analysis", code: "NLP" },
];

const VIRAL_FEATURES: [&str; 5] = [
    "Clean, intuitive UI",
    "Gamification elements",
    "Social sharing built-in",
    "Instant gratification",
    "Mobile-first design",
];

/// Whether the idea at rank `position` is AI-infused
pub fn is_ai_position(position: usize) -> bool {
    position % 3 != 0
}

/// Capability assigned to the AI idea at rank `position`
pub fn capability_for(position: usize) -> AiCapability {
    AI_CAPABILITIES[position % AI_CAPABILITIES.len()]
}

/// Rank trends by score and derive at most `max_ideas` ideas
///
/// Sorting is stable: trends with equal scores keep their discovery order.
pub fn rank(trends: &[TrendRecord], max_ideas: usize) -> Vec<AppIdea> {
    let mut ordered: Vec<&TrendRecord> = trends.iter().collect();
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    ordered
        .into_iter()
        .take(max_ideas)
        .enumerate()
        .map(|(position, trend)| {
            if is_ai_position(position) {
                ai_idea(trend, capability_for(position))
            } else {
                viral_idea(trend)
            }
        })
        .collect()
}

fn ai_idea(trend: &TrendRecord, capability: AiCapability) -> AppIdea {
    AppIdea {
        id: format!("ai-idea-{}", trend.id),
        title: format!("AI-Powered: {}", truncate_chars(&trend.title, TITLE_CHARS)),
        description: format!(
            "AI-infused app with {} inspired by: {}",
            capability.name,
            truncate_chars(&trend.description, DESCRIPTION_CHARS)
        ),
        trend_source_id: trend.id.clone(),
        features: vec![
            format!("{} integration", capability.name),
            "Smart automation with AI agents".to_string(),
            "Real-time AI inference".to_string(),
            "Personalized user experience".to_string(),
            "Continuous learning from user behavior".to_string(),
        ],
        tech_stack: tech_stack(true),
        priority: trend.score + AI_PRIORITY_BOOST,
        is_ai_infused: true,
        ai_capabilities: vec![capability.name.to_string(), capability.code.to_string()],
        created_at: trend.created_at,
    }
}

fn viral_idea(trend: &TrendRecord) -> AppIdea {
    AppIdea {
        id: format!("viral-idea-{}", trend.id),
        title: format!("Viral App: {}", truncate_chars(&trend.title, TITLE_CHARS)),
        description: format!(
            "Simple, addictive app inspired by: {}",
            truncate_chars(&trend.description, DESCRIPTION_CHARS)
        ),
        trend_source_id: trend.id.clone(),
        features: VIRAL_FEATURES.iter().map(|f| f.to_string()).collect(),
        tech_stack: tech_stack(false),
        priority: trend.score,
        is_ai_infused: false,
        ai_capabilities: Vec::new(),
        created_at: trend.created_at,
    }
}

fn tech_stack(with_ai: bool) -> BTreeMap<String, TechStackEntry> {
    let mut stack = BTreeMap::new();
    stack.insert("frontend".to_string(), TechStackEntry::from("react"));
    stack.insert("backend".to_string(), TechStackEntry::from("node"));
    stack.insert("database".to_string(), TechStackEntry::from("sqlite"));
    if with_ai {
        stack.insert(
            "ai".to_string(),
            TechStackEntry::from(vec!["langchain", "transformers", "openai-api"]),
        );
    }
    stack
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trend(id: &str, title: &str, score: f64) -> TrendRecord {
        TrendRecord {
            id: id.to_string(),
            source: "test".to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            url: format!("https://example.com/{id}"),
            score,
            tags: Default::default(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_rank_orders_by_score_and_assigns_ai_flags() {
        let trends = vec![trend("a", "A", 9.0), trend("b", "B", 5.0), trend("c", "C", 7.0)];

        let ideas = rank(&trends, 3);

        let sources: Vec<&str> = ideas.iter().map(|i| i.trend_source_id.as_str()).collect();
        assert_eq!(sources, vec!["a", "c", "b"]);
        let flags: Vec<bool> = ideas.iter().map(|i| i.is_ai_infused).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn test_equal_scores_keep_discovery_order() {
        let trends = vec![trend("first", "X", 4.0), trend("second", "Y", 4.0), trend("top", "Z", 6.0)];

        let ideas = rank(&trends, 3);

        let sources: Vec<&str> = ideas.iter().map(|i| i.trend_source_id.as_str()).collect();
        assert_eq!(sources, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_non_ai_count_is_ceil_of_a_third() {
        let trends: Vec<TrendRecord> =
            (0..20).map(|i| trend(&i.to_string(), "T", 20.0 - i as f64)).collect();

        for n in 0..=20 {
            let ideas = rank(&trends, n);
            assert_eq!(ideas.len(), n);
            let viral = ideas.iter().filter(|i| !i.is_ai_infused).count();
            assert_eq!(viral, n.div_ceil(3), "max_ideas = {n}");
        }
    }

    #[test]
    fn test_priority_and_capability_invariants() {
        let trends: Vec<TrendRecord> =
            (0..12).map(|i| trend(&i.to_string(), "T", i as f64 / 2.0)).collect();
        let by_id: BTreeMap<String, f64> = trends.iter().map(|t| (t.id.clone(), t.score)).collect();

        for (position, idea) in rank(&trends, 12).iter().enumerate() {
            let base = by_id[&idea.trend_source_id];
            assert!(idea.priority >= base);
            if idea.is_ai_infused {
                assert_eq!(idea.priority, base + AI_PRIORITY_BOOST);
                assert_eq!(idea.ai_capabilities[0], capability_for(position).name);
                assert!(idea.tech_stack.contains_key("ai"));
            } else {
                assert_eq!(idea.priority, base);
                assert!(idea.ai_capabilities.is_empty());
                assert!(!idea.tech_stack.contains_key("ai"));
            }
        }
    }

    #[test]
    fn test_capability_catalog_wraps_around() {
        assert_eq!(capability_for(1).code, "CV");
        assert_eq!(capability_for(11).code, "CV");
        assert_eq!(capability_for(10).name, "Natural language processing");
    }

    #[test]
    fn test_rank_is_deterministic() {
        let trends = vec![trend("a", "Alpha", 3.0), trend("b", "Beta", 8.5), trend("c", "Gamma", 3.0)];

        let first = serde_json::to_vec(&rank(&trends, 5)).unwrap();
        let second = serde_json::to_vec(&rank(&trends, 5)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_templates_truncate_on_char_boundaries() {
        let long_title = "é".repeat(60);
        let ideas = rank(&[trend("x", &long_title, 1.0)], 1);
        assert_eq!(ideas[0].title, format!("Viral App: {}", "é".repeat(40)));
        assert_eq!(ideas[0].id, "viral-idea-x");
        assert_eq!(ideas[0].features.len(), 5);
    }

    #[test]
    fn test_ai_template_text() {
        let trends = vec![trend("hi", "High", 9.0), trend("lo", "Low", 1.0)];
        let idea = &rank(&trends, 2)[1];
        assert_eq!(idea.id, "ai-idea-lo");
        assert_eq!(idea.title, "AI-Powered: Low");
        assert_eq!(idea.description, "AI-infused app with Computer vision inspired by: Low description");
        assert_eq!(idea.features[0], "Computer vision integration");
        assert_eq!(idea.ai_capabilities, vec!["Computer vision".to_string(), "CV".to_string()]);
    }
}
