//! Knowledge agents: synthesis, insight maps, strategic briefs and trend tracking

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use super::{AgentKind, AgentProfile, AgentTask, KNOWLEDGE_FOOTER, RESEARCH_PROVIDERS};
use crate::agents::prompts::PromptLibrary;
use crate::agents::schema::{FieldKind, FieldSpec, SchemaContract};
use crate::types::ReportLayout;

const KNOWLEDGE_MODEL: &str = "gemini-2.5-flash";

fn default_depth() -> String {
    "comprehensive".to_string()
}

fn default_visualization() -> String {
    "network".to_string()
}

/// Arguments of `synthesize_knowledge_domains`
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SynthesisInput {
    /// Knowledge domains to synthesize, e.g. ["AI", "healthcare", "ethics"]
    pub domains: Vec<String>,
    /// Question or challenge to explore across the domains
    pub research_question: String,
    /// Analysis depth: "surface", "moderate" or "comprehensive"
    #[serde(default = "default_depth")]
    pub depth: String,
}

/// Arguments of `create_insight_maps`
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct InsightMapInput {
    /// Topics or concepts to map
    pub topics: Vec<String>,
    /// Known or suspected connections to explore
    #[serde(default)]
    pub connections: Vec<String>,
    /// "network", "hierarchy", "cluster" or "flow"
    #[serde(default = "default_visualization")]
    pub visualization_type: String,
}

/// Arguments of `generate_strategic_brief`
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct StrategicBriefInput {
    /// Strategic topic or challenge to analyze
    pub topic: String,
    /// Key stakeholders to consider
    pub stakeholders: Vec<String>,
    /// Strategic objectives to address
    pub objectives: Vec<String>,
}

/// Arguments of `track_emerging_trends`
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct TrendInput {
    /// Domain to scan, e.g. "artificial intelligence"
    pub domain: String,
    /// "short-term", "medium-term" or "long-term"
    pub timeframe: String,
    /// Source types, e.g. ["academic", "industry", "patents"]
    pub sources: Vec<String>,
}

static SYNTHESIS_CONTRACT: LazyLock<Arc<SchemaContract>> = LazyLock::new(|| {
    Arc::new(
        SchemaContract::builder("knowledge_synthesis")
            .text("synthesis_summary", "One-paragraph synthesis answering the question")
            .list("domain_connections", "Concrete links between the domains")
            .field(
                FieldSpec::new("cross_domain_insights", FieldKind::TextList)
                    .with_title("Cross-Domain Insights")
                    .with_description("Insights that only appear at domain intersections"),
            )
            .list("convergence_patterns", "Shared principles and parallel developments")
            .list("interdisciplinary_opportunities", "Opportunities for joint work")
            .list("knowledge_gaps", "What is unknown or under-researched")
            .field(
                FieldSpec::new("synthesis_methodology", FieldKind::Text)
                    .with_title("Methodology")
                    .with_description("How the synthesis was carried out"),
            )
            .number_map("confidence_scores", "Confidence from 0 to 1 per key insight")
            .list("supporting_evidence", "Evidence backing the insights")
            .list("citations", "Papers and sources cited")
            .build(),
    )
});

static MAPPING_CONTRACT: LazyLock<Arc<SchemaContract>> = LazyLock::new(|| {
    Arc::new(
        SchemaContract::builder("insight_map")
            .text("map_summary", "Overview of the map")
            .list("relationship_types", "Kinds of relationships found")
            .number_map("connection_strengths", "Strength from 0 to 1 per connection")
            .list("knowledge_clusters", "Groups of closely related concepts")
            .list("bridging_concepts", "Concepts linking clusters")
            .list("visualization_elements", "Elements to draw for the requested visualization")
            .list("interaction_patterns", "How concepts influence each other")
            .list("hierarchical_structures", "Parent and child concept structures")
            .number_map("network_properties", "Network metrics such as density or centrality")
            .list("recommended_explorations", "Paths worth exploring next")
            .build(),
    )
});

static BRIEFING_CONTRACT: LazyLock<Arc<SchemaContract>> = LazyLock::new(|| {
    Arc::new(
        SchemaContract::builder("strategic_brief")
            .text("executive_summary", "Summary for executives")
            .list("key_findings", "Most important findings")
            .list("strategic_implications", "What the findings mean strategically")
            .text_map("stakeholder_impacts", "Impact keyed by stakeholder name")
            .field(
                FieldSpec::new("risk_assessments", FieldKind::TextList)
                    .with_title("Risk Assessment")
                    .with_description("Risks with mitigations"),
            )
            .list("opportunity_analysis", "Opportunities and advantages")
            .list("competitive_landscape", "Competitors and positioning")
            .list("implementation_roadmap", "Ordered implementation steps")
            .list("success_metrics", "Measurable indicators of success")
            .list("recommendations", "Prioritised recommendations")
            .build(),
    )
});

static TRENDS_CONTRACT: LazyLock<Arc<SchemaContract>> = LazyLock::new(|| {
    Arc::new(
        SchemaContract::builder("trend_analysis")
            .text("trend_summary", "Overview of the trend landscape")
            .list("emerging_patterns", "Patterns gaining momentum")
            .text_map("trend_trajectories", "Direction keyed by trend name")
            .list("disruption_indicators", "Signs of coming disruption")
            .list("convergence_signals", "Trends reinforcing each other")
            .list("weak_signals", "Early indicators that are easy to miss")
            .list("scenario_projections", "Plausible scenarios for the timeframe")
            .list("influence_factors", "Forces shaping the trends")
            .number_map("prediction_confidence", "Confidence from 0 to 1 per prediction")
            .list("monitoring_recommendations", "What to keep watching")
            .build(),
    )
});

fn knowledge_profile(
    kind: AgentKind,
    description: &'static str,
    system_prompt: &'static str,
    contract: &Arc<SchemaContract>,
    failure_label: &'static str,
) -> AgentProfile {
    AgentProfile {
        kind,
        description,
        default_model: KNOWLEDGE_MODEL,
        system_prompt,
        providers: RESEARCH_PROVIDERS,
        contract: Arc::clone(contract),
        failure_label,
    }
}

pub(super) fn synthesis_profile() -> AgentProfile {
    knowledge_profile(
        AgentKind::SynthesizeKnowledgeDomains,
        "Synthesize knowledge across several domains into cross-domain insights with \
         evidence and confidence scores.",
        PromptLibrary::synthesis_system(),
        &SYNTHESIS_CONTRACT,
        "Knowledge synthesis",
    )
}

pub(super) fn mapping_profile() -> AgentProfile {
    knowledge_profile(
        AgentKind::CreateInsightMaps,
        "Map the relationships between topics and recommend how to visualize and explore them.",
        PromptLibrary::mapping_system(),
        &MAPPING_CONTRACT,
        "Insight mapping",
    )
}

pub(super) fn briefing_profile() -> AgentProfile {
    knowledge_profile(
        AgentKind::GenerateStrategicBrief,
        "Produce an executive strategic brief with stakeholder impacts, risks, a roadmap and \
         recommendations.",
        PromptLibrary::briefing_system(),
        &BRIEFING_CONTRACT,
        "Strategic briefing",
    )
}

pub(super) fn trends_profile() -> AgentProfile {
    knowledge_profile(
        AgentKind::TrackEmergingTrends,
        "Track emerging trends in a domain and project scenarios with prediction confidences.",
        PromptLibrary::trends_system(),
        &TRENDS_CONTRACT,
        "Trend analysis",
    )
}

impl AgentTask for SynthesisInput {
    const KIND: AgentKind = AgentKind::SynthesizeKnowledgeDomains;

    fn task_prompt(&self) -> String {
        PromptLibrary::synthesis_task(&self.domains, &self.research_question, &self.depth)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new("Cross-Domain Knowledge Synthesis")
            .with_context("Research Question", self.research_question.clone())
            .with_context("Domains Analyzed", self.domains.join(", "))
            .with_footer(KNOWLEDGE_FOOTER)
    }
}

impl AgentTask for InsightMapInput {
    const KIND: AgentKind = AgentKind::CreateInsightMaps;

    fn task_prompt(&self) -> String {
        PromptLibrary::mapping_task(&self.topics, &self.connections, &self.visualization_type)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new("Knowledge Relationship Map")
            .with_context("Topics Analyzed", self.topics.join(", "))
            .with_context("Visualization Type", self.visualization_type.clone())
            .with_footer(KNOWLEDGE_FOOTER)
    }
}

impl AgentTask for StrategicBriefInput {
    const KIND: AgentKind = AgentKind::GenerateStrategicBrief;

    fn task_prompt(&self) -> String {
        PromptLibrary::briefing_task(&self.topic, &self.stakeholders, &self.objectives)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new("Strategic Intelligence Brief")
            .with_context("Topic", self.topic.clone())
            .with_context("Key Stakeholders", self.stakeholders.join(", "))
            .with_context("Strategic Objectives", self.objectives.join(", "))
            .with_footer(KNOWLEDGE_FOOTER)
    }
}

impl AgentTask for TrendInput {
    const KIND: AgentKind = AgentKind::TrackEmergingTrends;

    fn task_prompt(&self) -> String {
        PromptLibrary::trends_task(&self.domain, &self.timeframe, &self.sources)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new("Emerging Trend Analysis")
            .with_context("Domain", self.domain.clone())
            .with_context("Timeframe", self.timeframe.clone())
            .with_context("Sources Analyzed", self.sources.join(", "))
            .with_footer(KNOWLEDGE_FOOTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::render;
    use serde_json::json;

    #[test]
    fn test_synthesis_report_sections() {
        let input = SynthesisInput {
            domains: vec!["AI".into(), "ethics".into()],
            research_question: "How should models be audited?".into(),
            depth: default_depth(),
        };
        let result = SYNTHESIS_CONTRACT
            .validate(&json!({
                "synthesis_summary": "Audits need both.",
                "domain_connections": ["explainability"],
                "cross_domain_insights": [],
                "convergence_patterns": [],
                "interdisciplinary_opportunities": [],
                "knowledge_gaps": [],
                "synthesis_methodology": "Literature review",
                "confidence_scores": {"explainability": 0.8333},
                "supporting_evidence": [],
                "citations": []
            }))
            .expect("answer should validate");

        let text = render(&result, &input.layout());
        assert!(text.starts_with(
            "# Cross-Domain Knowledge Synthesis\n\n## Research Question\nHow should models be audited?\n\n## Domains Analyzed\nAI, ethics\n"
        ));
        assert!(text.contains("\n## Methodology\nLiterature review\n"));
        assert!(text.contains("\n## Confidence Scores\n- explainability: 0.83\n"));
        assert!(text.ends_with("\n---\n*Generated by Knowledge Synthesizer*\n"));
    }

    #[test]
    fn test_brief_renders_stakeholder_map() {
        let result = BRIEFING_CONTRACT
            .validate(&json!({
                "executive_summary": "",
                "key_findings": [],
                "strategic_implications": [],
                "stakeholder_impacts": {"Regulators": "new reporting duties", "Users": "more trust"},
                "risk_assessments": ["vendor lock-in"],
                "opportunity_analysis": [],
                "competitive_landscape": [],
                "implementation_roadmap": [],
                "success_metrics": [],
                "recommendations": []
            }))
            .expect("answer should validate");
        let text = render(&result, &ReportLayout::new("Brief"));
        assert!(text.contains(
            "\n## Stakeholder Impacts\n- **Regulators**: new reporting duties\n- **Users**: more trust\n"
        ));
        assert!(text.contains("\n## Risk Assessment\n- vendor lock-in\n"));
    }

    #[test]
    fn test_insight_map_defaults() {
        let input: InsightMapInput =
            serde_json::from_value(json!({"topics": ["graphs"]})).expect("should parse");
        assert!(input.connections.is_empty());
        assert_eq!(input.visualization_type, "network");
    }
}
