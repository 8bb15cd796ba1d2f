//! Static reference documents served over `resources/*`

use rmcp::model::{AnnotateAble, RawResource, Resource, ResourceContents};

const MARKDOWN: &str = "text/markdown";

struct StaticResource {
    uri: &'static str,
    name: &'static str,
    description: &'static str,
    text: &'static str,
}

const SYNTHESIS_PATTERNS: &str = "\
# Synthesis Patterns

## Convergence analysis
- Look for the same principle discovered independently in different fields
- Track developments that move in parallel and where they meet
- Note shared methods that travel well between disciplines

## Systems thinking
- Follow feedback loops across domain boundaries
- Ask which behaviour emerges only when the parts interact
- Check how a finding changes at a different scale

## Pattern recognition
- Compare structural analogies, not surface vocabulary
- Transfer solutions that worked in one domain to a similar problem in another
- Record the invariants that survive the transfer

## Contradiction analysis
- Treat conflicting results as a signal, not noise
- Identify the hidden assumption that makes both sides plausible
- Use the tension to frame new questions

## Emergence detection
- Watch for new fields forming at intersections
- Flag weak signals before they have a name
- Separate hype cycles from sustained momentum

## Strategic synthesis
- Tie every insight to a decision it could change
- Rank opportunities by impact and feasibility
- State the confidence behind each recommendation
";

const VISUALIZATION_STRATEGIES: &str = "\
# Visualization Strategies

## Network maps
- Nodes are concepts, edges are relationships weighted by strength
- Use for dense, many-to-many topic spaces
- Animate over time to show how connections form

## Concept maps
- Label every edge with the relationship it stands for
- Keep the hierarchy readable from general to specific
- Good for teaching and for checking shared understanding

## Knowledge graphs
- Typed entities and typed relations, queryable
- Suited to linking evidence and citations back to claims
- Grow incrementally as new sources arrive

## Cluster analysis
- Group concepts that co-occur or share structure
- Highlight bridging concepts between clusters
- Compare cluster sizes to spot under-explored areas

## Flow diagrams
- Show causal or temporal direction explicitly
- Useful for processes, value chains and information flow
- Mark bottlenecks and feedback paths

## Interactive exploration
- Let readers expand a node on demand instead of showing everything at once
- Offer filters by domain, confidence or time
- Provide a guided path through the most important connections first
";

const RESOURCES: &[StaticResource] = &[
    StaticResource {
        uri: "synthesis://patterns",
        name: "Synthesis patterns",
        description: "Reference patterns for cross-domain knowledge synthesis",
        text: SYNTHESIS_PATTERNS,
    },
    StaticResource {
        uri: "mapping://visualization",
        name: "Visualization strategies",
        description: "Guidance for choosing a knowledge visualization",
        text: VISUALIZATION_STRATEGIES,
    },
];

pub fn list_resources() -> Vec<Resource> {
    RESOURCES
        .iter()
        .map(|resource| {
            RawResource {
                description: Some(resource.description.to_string()),
                mime_type: Some(MARKDOWN.to_string()),
                ..RawResource::new(resource.uri, resource.name)
            }
            .no_annotation()
        })
        .collect()
}

pub fn read_resource(uri: &str) -> Option<ResourceContents> {
    RESOURCES
        .iter()
        .find(|resource| resource.uri == uri)
        .map(|resource| ResourceContents::TextResourceContents {
            uri: resource.uri.to_string(),
            mime_type: Some(MARKDOWN.to_string()),
            text: resource.text.to_string(),
        })
}
