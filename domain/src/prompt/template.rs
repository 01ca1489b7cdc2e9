//! Prompt templates for the council flow

use crate::core::string::clip_chars;
use crate::council::label::AnonymizedLabel;
use crate::council::ranking::FINAL_RANKING_MARKER;
use crate::council::reflection::{
    COMPARISON_HEADER, CRITIQUE_HEADER, SUGGESTED_QUERY_HEADER, SUGGESTED_SYSTEM_PROMPT_HEADER,
};
use crate::pipeline::entries::{PreviousIteration, Stage1Entry, Stage2Entry};

/// Characters of each council answer shown to the reflector
const REFLECTION_EXCERPT_CHARS: usize = 200;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Wrap extracted file text around the query.
    pub fn with_file_context(query: &str, file_context: Option<&str>) -> String {
        match file_context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!(
                "[ATTACHED FILES]\n{}\n[END ATTACHED FILES]\n\n{}",
                context, query
            ),
            None => query.to_string(),
        }
    }

    /// Prefix a rerun query with what the previous iteration concluded.
    pub fn with_previous_context(query: &str, previous: &PreviousIteration) -> String {
        format!(
            r#"[CONTEXT FROM PREVIOUS ANALYSIS]
This is a re-analysis. The previous query was: "{}"
The chairman's critique of the previous analysis: {}
[END CONTEXT]

{}"#,
            previous.query, previous.critique, query
        )
    }

    /// Tag connector output so models can tell sources apart.
    pub fn connector_block(name: &str, text: &str) -> String {
        let tag = name.to_ascii_uppercase();
        format!("[{} DATA]\n{}\n[END {} DATA]", tag, text.trim(), tag)
    }

    /// Stage 2 evaluation prompt. Responses appear under their labels only.
    pub fn ranking_prompt(query: &str, responses: &[(&AnonymizedLabel, &str)]) -> String {
        let mut prompt = format!(
            r#"You are evaluating different responses to the following question:

Question: {}

Here are the responses from different models (anonymized):
"#,
            query
        );

        for (label, content) in responses {
            prompt.push_str(&format!("\n{}:\n{}\n", label, content));
        }

        let example: Vec<String> = responses
            .iter()
            .enumerate()
            .map(|(i, (label, _))| format!("{}. {}", i + 1, label))
            .collect();

        prompt.push_str(&format!(
            r#"
Your task:
1. Evaluate each response individually. Explain what it does well and what it does poorly.
2. Then provide a final ranking, best first.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "{marker}" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. {first}")
- Do not add any other text or explanations after the ranking section

Example of the correct format for your ENTIRE response:

Response A provides good detail on X but misses Y...
Response B is accurate but lacks depth on Z...

{marker}
{example}

Now provide your evaluation and ranking:"#,
            marker = FINAL_RANKING_MARKER,
            first = responses
                .first()
                .map(|(label, _)| label.to_string())
                .unwrap_or_else(|| AnonymizedLabel::for_index(0).to_string()),
            example = example.join("\n"),
        ));

        prompt
    }

    /// Stage 3 synthesis prompt. The chairman sees real model names.
    pub fn synthesis_prompt(query: &str, stage1: &[Stage1Entry], stage2: &[Stage2Entry]) -> String {
        let answers: Vec<String> = stage1
            .iter()
            .map(|e| format!("Model: {}\nResponse: {}", e.model, e.response.text()))
            .collect();
        let rankings: Vec<String> = stage2
            .iter()
            .map(|e| format!("Model: {}\nRanking: {}", e.evaluator_model, e.raw_evaluation))
            .collect();

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

Original Question: {}

STAGE 1 - Individual Responses:
{}

STAGE 2 - Peer Rankings:
{}

Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
- The individual responses and their insights
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#,
            query,
            answers.join("\n\n"),
            rankings.join("\n\n")
        )
    }

    /// Stage 4 reflection prompt. `previous` adds the comparison section.
    pub fn reflection_prompt(
        query: &str,
        system_prompt: Option<&str>,
        stage1: &[Stage1Entry],
        synthesis: &str,
        previous: Option<&PreviousIteration>,
    ) -> String {
        let excerpts: Vec<String> = stage1
            .iter()
            .map(|e| {
                format!(
                    "- {}: {}",
                    e.model,
                    clip_chars(e.response.text(), REFLECTION_EXCERPT_CHARS)
                )
            })
            .collect();

        let mut prompt = format!(
            r#"You are the Chairman of an LLM Council reviewing your own synthesis.

Original Question: {}
System Prompt Used: {}

Council responses (excerpts):
{}

Your Synthesis:
{}
"#,
            query,
            system_prompt.filter(|p| !p.trim().is_empty()).unwrap_or("(none)"),
            excerpts.join("\n"),
            synthesis
        );

        if let Some(prev) = previous {
            prompt.push_str(&format!(
                r#"
PREVIOUS ITERATION:
Previous Query: {}
Previous Synthesis: {}
Previous Critique: {}
"#,
                prev.query, prev.stage3_response, prev.critique
            ));
        }

        prompt.push_str(
            r#"
Critically reflect on the synthesis. Identify weaknesses, gaps, unsupported claims and anything the council missed. Then propose how the question and system prompt could be improved for a better next iteration.

Respond using EXACTLY these section headers:
"#,
        );
        prompt.push_str(&format!("\n{}\n<your critique>\n", CRITIQUE_HEADER));
        if previous.is_some() {
            prompt.push_str(&format!(
                "\n{}\n<how this iteration compares to the previous one>\n",
                COMPARISON_HEADER
            ));
        }
        prompt.push_str(&format!(
            "\n{}\n<an improved system prompt>\n\n{}\n<an improved query>",
            SUGGESTED_SYSTEM_PROMPT_HEADER, SUGGESTED_QUERY_HEADER
        ));

        prompt
    }

    /// Short title for a conversation.
    pub fn title_prompt(query: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {}

Title:"#,
            query
        )
    }

    /// System prompt for prompt optimisation
    pub fn optimize_system() -> &'static str {
        r#"You are a prompt-engineering expert. You rewrite system prompts and queries so that a council of language models answers them accurately, completely and without ambiguity. Keep the user's intent intact."#
    }

    /// User prompt for prompt optimisation
    pub fn optimize_prompt(system_prompt: Option<&str>, query: &str) -> String {
        format!(
            r#"Current system prompt:
{}

Current query:
{}

Rewrite both for clarity and precision. Respond using EXACTLY these section headers:

{}
<improved system prompt>

{}
<improved query>"#,
            system_prompt.filter(|p| !p.trim().is_empty()).unwrap_or("(none)"),
            query,
            SUGGESTED_SYSTEM_PROMPT_HEADER,
            SUGGESTED_QUERY_HEADER
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model_id::ModelId;
    use crate::pipeline::entries::ProviderResult;

    fn previous() -> PreviousIteration {
        PreviousIteration {
            query: "What is CRDT?".to_string(),
            system_prompt: None,
            stage3_response: "A replicated data type.".to_string(),
            critique: "Too shallow on merge semantics.".to_string(),
        }
    }

    #[test]
    fn test_file_context_wrapping() {
        let wrapped = PromptTemplate::with_file_context("Summarize", Some("--- a.txt ---\nhello"));
        assert_eq!(
            wrapped,
            "[ATTACHED FILES]\n--- a.txt ---\nhello\n[END ATTACHED FILES]\n\nSummarize"
        );
        assert_eq!(PromptTemplate::with_file_context("Q", Some("  ")), "Q");
        assert_eq!(PromptTemplate::with_file_context("Q", None), "Q");
    }

    #[test]
    fn test_previous_context_mentions_query_and_critique() {
        let prompt = PromptTemplate::with_previous_context("Explain merges", &previous());
        assert!(prompt.starts_with("[CONTEXT FROM PREVIOUS ANALYSIS]"));
        assert!(prompt.contains("What is CRDT?"));
        assert!(prompt.contains("Too shallow on merge semantics."));
        assert!(prompt.ends_with("Explain merges"));
    }

    #[test]
    fn test_connector_block() {
        assert_eq!(
            PromptTemplate::connector_block("web_search", " results \n"),
            "[WEB_SEARCH DATA]\nresults\n[END WEB_SEARCH DATA]"
        );
    }

    #[test]
    fn test_ranking_prompt_uses_labels_only() {
        let a = AnonymizedLabel::for_index(0);
        let b = AnonymizedLabel::for_index(1);
        let prompt = PromptTemplate::ranking_prompt("Q?", &[(&a, "first answer"), (&b, "second answer")]);
        assert!(prompt.contains("Response A:\nfirst answer"));
        assert!(prompt.contains("Response B:\nsecond answer"));
        assert!(prompt.contains("FINAL RANKING:\n1. Response A\n2. Response B"));
    }

    #[test]
    fn test_synthesis_prompt_names_models() {
        let stage1 = vec![Stage1Entry {
            model: ModelId::new("gpt-4.1").unwrap(),
            response: ProviderResult::from_text("forty-two"),
        }];
        let prompt = PromptTemplate::synthesis_prompt("Q?", &stage1, &[]);
        assert!(prompt.contains("Model: gpt-4.1\nResponse: forty-two"));
    }

    #[test]
    fn test_reflection_prompt_comparison_only_with_previous() {
        let stage1 = vec![Stage1Entry {
            model: ModelId::new("m").unwrap(),
            response: ProviderResult::from_text("x".repeat(500)),
        }];
        let first = PromptTemplate::reflection_prompt("Q", None, &stage1, "S", None);
        assert!(!first.contains(COMPARISON_HEADER));
        assert!(first.contains(&format!("- m: {}\n", "x".repeat(200))));
        assert!(!first.contains(&"x".repeat(201)));

        let rerun = PromptTemplate::reflection_prompt("Q", Some("Be brief"), &stage1, "S", Some(&previous()));
        assert!(rerun.contains(COMPARISON_HEADER));
        assert!(rerun.contains("Previous Critique: Too shallow on merge semantics."));
        assert!(rerun.contains("System Prompt Used: Be brief"));
    }
}
