//! Section parsing for chairman reflections.
//!
//! The chairman is asked to answer under fixed headers. Headers are
//! recognised at the start of a line in any case, optionally wrapped in
//! markdown emphasis or preceded by `#`.

use std::collections::HashMap;

pub const CRITIQUE_HEADER: &str = "CRITIQUE:";
pub const COMPARISON_HEADER: &str = "COMPARISON:";
pub const SUGGESTED_SYSTEM_PROMPT_HEADER: &str = "SUGGESTED_SYSTEM_PROMPT:";
pub const SUGGESTED_QUERY_HEADER: &str = "SUGGESTED_QUERY:";

/// Sections of a reflection, trimmed. Missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectionSections {
    pub critique: String,
    pub comparison: Option<String>,
    pub suggested_system_prompt: String,
    pub suggested_query: String,
}

/// Split a reflection into its sections.
///
/// Without any recognised header the whole text is the critique.
pub fn parse_reflection(text: &str) -> ReflectionSections {
    let headers = [
        CRITIQUE_HEADER,
        COMPARISON_HEADER,
        SUGGESTED_SYSTEM_PROMPT_HEADER,
        SUGGESTED_QUERY_HEADER,
    ];
    let mut sections = split_sections(text, &headers);
    if sections.is_empty() {
        return ReflectionSections {
            critique: text.trim().to_string(),
            ..Default::default()
        };
    }

    ReflectionSections {
        critique: sections.remove(CRITIQUE_HEADER).unwrap_or_default(),
        comparison: sections
            .remove(COMPARISON_HEADER)
            .filter(|c| !c.is_empty()),
        suggested_system_prompt: sections
            .remove(SUGGESTED_SYSTEM_PROMPT_HEADER)
            .unwrap_or_default(),
        suggested_query: sections.remove(SUGGESTED_QUERY_HEADER).unwrap_or_default(),
    }
}

/// Collect the text under each header. Text before the first header is
/// dropped; a repeated header appends to its section.
pub fn split_sections<'h>(text: &str, headers: &[&'h str]) -> HashMap<&'h str, String> {
    let mut sections: HashMap<&'h str, String> = HashMap::new();
    let mut current: Option<&'h str> = None;

    for line in text.lines() {
        if let Some((header, rest)) = match_header(line, headers) {
            current = Some(header);
            let body = sections.entry(header).or_default();
            push_line(body, rest);
            continue;
        }
        if let Some(header) = current {
            push_line(sections.entry(header).or_default(), line);
        }
    }

    for body in sections.values_mut() {
        *body = body.trim().to_string();
    }
    sections
}

fn match_header<'l, 'h>(line: &'l str, headers: &[&'h str]) -> Option<(&'h str, &'l str)> {
    let stripped = line
        .trim_start()
        .trim_start_matches('#')
        .trim_start()
        .trim_start_matches("**")
        .trim_start();
    let upper = stripped.to_ascii_uppercase();
    headers.iter().find_map(|header| {
        if upper.starts_with(header) {
            let rest = stripped[header.len()..].trim_start_matches("**");
            Some((*header, rest))
        } else {
            None
        }
    })
}

fn push_line(body: &mut String, line: &str) {
    if !body.is_empty() || !line.trim().is_empty() {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(line);
    }
}
