//! Innovation agents: roadblock breakthroughs and literature-backed research

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use super::{AgentKind, AgentProfile, AgentTask, SEMANTIC_SCHOLAR, SEQUENTIAL_THINKING};
use crate::agents::prompts::PromptLibrary;
use crate::agents::schema::{FieldKind, FieldSpec, SchemaContract};
use crate::types::ReportLayout;

/// Arguments of `breakthrough_innovation_roadblock`
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct BreakthroughInput {
    /// Description of the innovative thinking roadblock or challenge
    pub roadblock_description: String,
}

/// Arguments of `research_innovation_idea`
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ResearchInput {
    /// The novel idea to research in depth
    pub innovation_idea: String,
}

static BREAKTHROUGH_CONTRACT: LazyLock<Arc<SchemaContract>> = LazyLock::new(|| {
    let labeled = |name: &str, description: &str| {
        FieldSpec::new(name, FieldKind::LabeledList).with_description(description)
    };
    Arc::new(
        SchemaContract::builder("innovation_breakthrough")
            .field(labeled("novel_perspectives", "Fresh ways to view the challenge"))
            .field(labeled("creative_approaches", "Innovative methods for solving it"))
            .field(labeled(
                "first_principles_insights",
                "Fundamental truths and challengeable assumptions",
            ))
            .field(labeled(
                "breakthrough_opportunities",
                "Transformative possibilities hidden in the roadblock",
            ))
            .field(labeled(
                "implementation_strategies",
                "Practical steps to execute the ideas",
            ))
            .field(labeled(
                "unconventional_solutions",
                "Counterintuitive approaches others would miss",
            ))
            .field(
                labeled("cross_domain_connections", "Insights borrowed from other fields")
                    .with_title("Cross-Domain Connections"),
            )
            .field(labeled("paradigm_shifts", "Fundamental changes in framing"))
            .field(labeled(
                "innovation_frameworks",
                "Structured methods for sustained innovation",
            ))
            .field(labeled("next_exploration_paths", "Where to explore next"))
            .build(),
    )
});

static RESEARCH_CONTRACT: LazyLock<Arc<SchemaContract>> = LazyLock::new(|| {
    Arc::new(
        SchemaContract::builder("innovation_research")
            .field(
                FieldSpec::new("cutting_edge_research_findings", FieldKind::TextList)
                    .with_title("Cutting-Edge Research Findings")
                    .with_description("Key findings from the most recent papers"),
            )
            .field(
                FieldSpec::new("novel_methodologies_2025", FieldKind::TextList)
                    .with_title("Novel Methodologies")
                    .with_description("New methods introduced in current research"),
            )
            .list("emerging_innovation_patterns", "Patterns recurring across papers")
            .list("breakthrough_applications", "Applications enabled by the research")
            .list("interdisciplinary_connections", "Links to other fields")
            .list("future_research_directions", "Open directions named by authors")
            .list("technology_convergence_trends", "Technologies converging on the idea")
            .list("innovation_acceleration_factors", "What speeds progress up")
            .field(
                FieldSpec::new("paradigm_shifting_papers", FieldKind::TextList)
                    .with_title("Paradigm-Shifting Papers")
                    .with_description("Papers that change the framing, with titles"),
            )
            .list("practical_implementation_insights", "How to build on the findings")
            .list("research_gap_opportunities", "Gaps worth pursuing")
            .field(
                FieldSpec::new("next_generation_approaches", FieldKind::TextList)
                    .with_title("Next-Generation Approaches")
                    .with_description("Approaches likely to follow the current state of the art"),
            )
            .build(),
    )
});

pub(super) fn breakthrough_profile() -> AgentProfile {
    AgentProfile {
        kind: AgentKind::BreakthroughInnovationRoadblock,
        description: "Help overcome innovative thinking roadblocks when designing LLM agentic \
                      functions, using first-principles and cross-domain reasoning.",
        default_model: "gemini-2.5-pro",
        system_prompt: PromptLibrary::breakthrough_system(),
        providers: &[SEQUENTIAL_THINKING],
        contract: Arc::clone(&BREAKTHROUGH_CONTRACT),
        failure_label: "Innovation breakthrough analysis",
    }
}

pub(super) fn research_profile() -> AgentProfile {
    AgentProfile {
        kind: AgentKind::ResearchInnovationIdea,
        description: "Research a novel idea in depth against current academic literature \
                      using Semantic Scholar.",
        default_model: "gemini-2.5-flash",
        system_prompt: PromptLibrary::research_system(),
        providers: &[SEQUENTIAL_THINKING, SEMANTIC_SCHOLAR],
        contract: Arc::clone(&RESEARCH_CONTRACT),
        failure_label: "Innovation research",
    }
}

impl AgentTask for BreakthroughInput {
    const KIND: AgentKind = AgentKind::BreakthroughInnovationRoadblock;

    fn task_prompt(&self) -> String {
        PromptLibrary::breakthrough_task(&self.roadblock_description)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new("Innovation Breakthrough Analysis")
            .with_context("Roadblock Challenge", self.roadblock_description.clone())
            .with_footer("Generated by Innovation Breakthrough Agent")
    }
}

impl AgentTask for ResearchInput {
    const KIND: AgentKind = AgentKind::ResearchInnovationIdea;

    fn task_prompt(&self) -> String {
        PromptLibrary::research_task(&self.innovation_idea)
    }

    fn layout(&self) -> ReportLayout {
        ReportLayout::new("Innovation Research Insights")
            .with_context("Innovation Idea", format!("**{}**", self.innovation_idea))
            .with_footer("Generated by Semantic Scholar Innovation Agent")
    }
}
