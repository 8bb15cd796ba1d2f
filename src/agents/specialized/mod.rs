//! The concrete research agents
//!
//! Each [`AgentKind`] pairs a tool input type with a profile: prompts, tool
//! providers, output contract and report framing. Contracts are built once
//! and shared read-only by every session of the same kind.

mod innovation;
mod knowledge;

pub use innovation::{BreakthroughInput, ResearchInput};
pub use knowledge::{InsightMapInput, StrategicBriefInput, SynthesisInput, TrendInput};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::schema::SchemaContract;
use crate::types::ReportLayout;

pub const SEQUENTIAL_THINKING: &str = "sequential_thinking";
pub const SEMANTIC_SCHOLAR: &str = "semantic_scholar";
pub const FETCH: &str = "fetch";
pub const WEB_CRAWLER: &str = "web_crawler";
pub const NOTION: &str = "notion";

const RESEARCH_PROVIDERS: &[&str] = &[SEMANTIC_SCHOLAR, FETCH, WEB_CRAWLER, NOTION];

/// Footer shared by the knowledge agents
const KNOWLEDGE_FOOTER: &str = "Generated by Knowledge Synthesizer";

/// Every agent tool this crate offers; names match the MCP tool names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AgentKind {
    BreakthroughInnovationRoadblock,
    ResearchInnovationIdea,
    SynthesizeKnowledgeDomains,
    CreateInsightMaps,
    GenerateStrategicBrief,
    TrackEmergingTrends,
}

/// Static description of one agent
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub description: &'static str,
    pub default_model: &'static str,
    pub system_prompt: &'static str,
    /// Names of the tool providers the agent reasons with
    pub providers: &'static [&'static str],
    pub contract: Arc<SchemaContract>,
    /// Prefix of the message shown when a run fails
    pub failure_label: &'static str,
}

impl AgentKind {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn profile(self) -> AgentProfile {
        match self {
            Self::BreakthroughInnovationRoadblock => innovation::breakthrough_profile(),
            Self::ResearchInnovationIdea => innovation::research_profile(),
            Self::SynthesizeKnowledgeDomains => knowledge::synthesis_profile(),
            Self::CreateInsightMaps => knowledge::mapping_profile(),
            Self::GenerateStrategicBrief => knowledge::briefing_profile(),
            Self::TrackEmergingTrends => knowledge::trends_profile(),
        }
    }

    /// JSON Schema of the tool's arguments
    pub fn input_schema(self) -> Value {
        match self {
            Self::BreakthroughInnovationRoadblock => parameters_schema::<BreakthroughInput>(),
            Self::ResearchInnovationIdea => parameters_schema::<ResearchInput>(),
            Self::SynthesizeKnowledgeDomains => parameters_schema::<SynthesisInput>(),
            Self::CreateInsightMaps => parameters_schema::<InsightMapInput>(),
            Self::GenerateStrategicBrief => parameters_schema::<StrategicBriefInput>(),
            Self::TrackEmergingTrends => parameters_schema::<TrendInput>(),
        }
    }
}

/// Schema for tool arguments derived from the input type
pub fn parameters_schema<T: JsonSchema>() -> Value {
    Value::from(schemars::schema_for!(T))
}

/// Behaviour shared by all tool inputs
pub trait AgentTask: DeserializeOwned + JsonSchema {
    const KIND: AgentKind;

    /// Task prompt with the inputs substituted in
    fn task_prompt(&self) -> String;

    /// Report title and the input sections shown above the results
    fn layout(&self) -> ReportLayout;
}

/// Parsed arguments for any agent tool
#[derive(Debug, Clone)]
pub enum ToolInput {
    Breakthrough(BreakthroughInput),
    Research(ResearchInput),
    Synthesis(SynthesisInput),
    InsightMap(InsightMapInput),
    StrategicBrief(StrategicBriefInput),
    Trends(TrendInput),
}

impl ToolInput {
    /// Decode tool arguments for `kind`
    pub fn from_arguments(kind: AgentKind, arguments: Value) -> Result<Self, serde_json::Error> {
        let arguments = if arguments.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            arguments
        };
        Ok(match kind {
            AgentKind::BreakthroughInnovationRoadblock => {
                Self::Breakthrough(serde_json::from_value(arguments)?)
            }
            AgentKind::ResearchInnovationIdea => Self::Research(serde_json::from_value(arguments)?),
            AgentKind::SynthesizeKnowledgeDomains => {
                Self::Synthesis(serde_json::from_value(arguments)?)
            }
            AgentKind::CreateInsightMaps => Self::InsightMap(serde_json::from_value(arguments)?),
            AgentKind::GenerateStrategicBrief => {
                Self::StrategicBrief(serde_json::from_value(arguments)?)
            }
            AgentKind::TrackEmergingTrends => Self::Trends(serde_json::from_value(arguments)?),
        })
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Breakthrough(_) => BreakthroughInput::KIND,
            Self::Research(_) => ResearchInput::KIND,
            Self::Synthesis(_) => SynthesisInput::KIND,
            Self::InsightMap(_) => InsightMapInput::KIND,
            Self::StrategicBrief(_) => StrategicBriefInput::KIND,
            Self::Trends(_) => TrendInput::KIND,
        }
    }

    pub fn task_prompt(&self) -> String {
        match self {
            Self::Breakthrough(input) => input.task_prompt(),
            Self::Research(input) => input.task_prompt(),
            Self::Synthesis(input) => input.task_prompt(),
            Self::InsightMap(input) => input.task_prompt(),
            Self::StrategicBrief(input) => input.task_prompt(),
            Self::Trends(input) => input.task_prompt(),
        }
    }

    pub fn layout(&self) -> ReportLayout {
        match self {
            Self::Breakthrough(input) => input.layout(),
            Self::Research(input) => input.layout(),
            Self::Synthesis(input) => input.layout(),
            Self::InsightMap(input) => input.layout(),
            Self::StrategicBrief(input) => input.layout(),
            Self::Trends(input) => input.layout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_kind_names_round_trip() {
        assert_eq!(
            AgentKind::BreakthroughInnovationRoadblock.name(),
            "breakthrough_innovation_roadblock"
        );
        assert_eq!(
            AgentKind::from_str("track_emerging_trends").ok(),
            Some(AgentKind::TrackEmergingTrends)
        );
        assert!(AgentKind::from_str("unknown_tool").is_err());
    }

    #[test]
    fn test_every_profile_is_consistent() {
        for kind in AgentKind::iter() {
            let profile = kind.profile();
            assert_eq!(profile.kind, kind);
            assert!(!profile.contract.fields().is_empty(), "{kind} has no fields");
            assert!(!profile.providers.is_empty(), "{kind} has no providers");
            assert_eq!(kind.input_schema()["type"], "object", "{kind} schema");
        }
    }

    #[test]
    fn test_contracts_are_shared() {
        let first = AgentKind::CreateInsightMaps.profile().contract;
        let second = AgentKind::CreateInsightMaps.profile().contract;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_from_arguments_applies_defaults() {
        let input = ToolInput::from_arguments(
            AgentKind::SynthesizeKnowledgeDomains,
            json!({"domains": ["AI"], "research_question": "q"}),
        )
        .expect("arguments should parse");

        let ToolInput::Synthesis(synthesis) = &input else {
            panic!("expected synthesis input");
        };
        assert_eq!(synthesis.depth, "comprehensive");
        assert_eq!(input.kind(), AgentKind::SynthesizeKnowledgeDomains);
    }

    #[test]
    fn test_from_arguments_rejects_missing_fields() {
        let result = ToolInput::from_arguments(AgentKind::GenerateStrategicBrief, json!({}));
        assert!(result.is_err());
    }
}
