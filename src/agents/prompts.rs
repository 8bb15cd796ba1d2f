use std::fmt::Write;

/// Prompt library for the research agents
///
/// System prompts describe each agent's role; task prompts carry the caller's
/// inputs. Output format instructions are added separately from the schema.
pub struct PromptLibrary;

impl PromptLibrary {
    pub fn breakthrough_system() -> &'static str {
        "You are an innovation strategist who helps people get past creative roadblocks \
        when designing LLM tools, agent loops and reasoning systems.\n\n\
        Work the problem with these methods: first-principles deconstruction, analogies \
        from distant domains, inversion, constraint removal, combinatorial recombination, \
        edge-case exploration, abstraction laddering and pattern disruption.\n\n\
        Use the sequential thinking tool to break the roadblock down before answering. \
        Treat every roadblock as an opportunity and offer several distinct paths forward, \
        each specific enough to act on."
    }

    pub fn research_system() -> &'static str {
        "You are an innovation researcher. You take a new idea and ground it in the most \
        recent academic literature using Semantic Scholar.\n\n\
        Plan the research with sequential thinking first. Then issue many Semantic Scholar \
        searches in parallel within the same turn rather than one at a time: vary the query \
        wording, combine citation and reference lookups for key papers, and cover adjacent \
        fields of study. Prefer current-year publications, use citation counts to judge \
        credibility and favour open-access papers.\n\n\
        Every item you report must be specific, technically detailed and traceable to \
        the papers you found."
    }

    pub fn synthesis_system() -> &'static str {
        "You are a knowledge synthesizer working across domains. Gather material from \
        every requested domain, find where the domains converge, and state the insights \
        that only appear at their intersection. Back claims with evidence and citations, \
        say where knowledge is missing, and give calibrated confidence scores between 0 \
        and 1."
    }

    pub fn mapping_system() -> &'static str {
        "You are a knowledge cartographer. Given a set of topics you identify the key \
        concepts, the relationships between them and how strong each relationship is, \
        then organise them into clusters, hierarchies and networks. Recommend how to \
        visualise the result and which paths are worth exploring next. Express strengths \
        and network metrics as numbers between 0 and 1 where that makes sense."
    }

    pub fn briefing_system() -> &'static str {
        "You are a strategic intelligence analyst writing for executives. Analyse the \
        strategic context, assess how each stakeholder is affected, weigh risks against \
        opportunities and finish with concrete recommendations, an implementation roadmap \
        and measurable success metrics."
    }

    pub fn trends_system() -> &'static str {
        "You are a trend analyst. Scan the requested source types for emerging patterns, \
        pick out weak signals and early indicators, describe where each trend is heading \
        and how trends converge, judge their disruptive potential, and project plausible \
        scenarios. Give prediction confidences between 0 and 1 and say what should be \
        monitored."
    }

    pub fn breakthrough_task(roadblock: &str) -> String {
        format!(
            "INNOVATION BREAKTHROUGH REQUEST\n\n\
            Roadblock:\n{roadblock}\n\n\
            Deconstruct this roadblock step by step and answer across every dimension of \
            the output schema: novel perspectives, creative approaches, first-principles \
            insights, breakthrough opportunities, implementation strategies, unconventional \
            solutions, cross-domain connections, paradigm shifts, innovation frameworks \
            and next exploration paths.\n\n\
            Each entry has a short label naming the idea and a description explaining it."
        )
    }

    pub fn research_task(idea: &str) -> String {
        format!(
            "INNOVATION RESEARCH REQUEST\n\n\
            Idea to research:\n{idea}\n\n\
            1. Plan a research strategy with sequential thinking.\n\
            2. Run several Semantic Scholar searches in parallel covering the core idea, \
            adjacent technologies, application areas and new methodologies.\n\
            3. Follow citations and references of the most relevant papers.\n\
            4. Synthesise the findings into every field of the output schema, naming \
            papers where you can."
        )
    }

    pub fn synthesis_task(domains: &[String], question: &str, depth: &str) -> String {
        let mut prompt = format!(
            "CROSS-DOMAIN KNOWLEDGE SYNTHESIS REQUEST\n\n\
            Research question: {question}\n\
            Domains: {}\n\
            Depth: {depth}\n\n",
            domains.join(", ")
        );
        prompt.push_str(
            "Steps:\n\
            1. Collect current knowledge and recent papers from each domain.\n\
            2. Identify connections, shared principles and convergence points.\n\
            3. Derive insights and interdisciplinary opportunities; note knowledge gaps.\n\
            4. Support the key insights with evidence and citations and score your \
            confidence in each.\n",
        );
        prompt
    }

    pub fn mapping_task(topics: &[String], connections: &[String], visualization: &str) -> String {
        let mut prompt = String::from("KNOWLEDGE RELATIONSHIP MAPPING REQUEST\n\n");
        let _ = writeln!(prompt, "Topics: {}", topics.join(", "));
        if connections.is_empty() {
            prompt.push_str("Known connections: none given\n");
        } else {
            let _ = writeln!(prompt, "Known connections: {}", connections.join(", "));
        }
        let _ = writeln!(prompt, "Visualization type: {visualization}\n");
        prompt.push_str(
            "Map the concepts behind each topic, the type and strength of every relationship \
            you find, the clusters and bridging concepts that tie them together, and the \
            hierarchical and network structure of the whole. Recommend visualization \
            elements suited to the requested visualization type.\n",
        );
        prompt
    }

    pub fn briefing_task(topic: &str, stakeholders: &[String], objectives: &[String]) -> String {
        format!(
            "STRATEGIC INTELLIGENCE BRIEFING REQUEST\n\n\
            Topic: {topic}\n\
            Stakeholders: {}\n\
            Objectives: {}\n\n\
            Cover the strategic context and competitive landscape, the impact on each \
            stakeholder (keyed by stakeholder name), risks, opportunities, an implementation \
            roadmap, success metrics and prioritised recommendations.\n",
            stakeholders.join(", "),
            objectives.join(", ")
        )
    }

    pub fn trends_task(domain: &str, timeframe: &str, sources: &[String]) -> String {
        format!(
            "EMERGING TREND ANALYSIS REQUEST\n\n\
            Domain: {domain}\n\
            Timeframe: {timeframe}\n\
            Sources: {}\n\n\
            Scan the sources for emerging patterns, describe each trend's trajectory \
            (keyed by trend name), list disruption indicators, convergence and weak \
            signals, project scenarios for the timeframe, and attach a confidence to each \
            prediction.\n",
            sources.join(", ")
        )
    }
}
