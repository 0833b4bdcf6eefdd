//! Prompt templates and structured-reply extraction
//!
//! Every prompt sent to the model is built here so wording changes stay in
//! one place.

use std::sync::LazyLock;

use regex::Regex;

use crate::tools::ToolRegistry;

/// Intent classification prompt listing every registered label
pub fn classification_prompt(intents: &[(String, String)], request: &str) -> String {
    let intent_list = intents
        .iter()
        .map(|(label, description)| format!("- {}: {}", label, description))
        .collect::<Vec<_>>()
        .join("\n");

    let labels = intents
        .iter()
        .map(|(label, _)| label.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an intent classifier for a multi-agent assistant.

Available intents:
{intent_list}

Examples:
User: "Hello there"
{{"intent": "greeting", "confidence": 0.95, "entities": {{}}, "reasoning": "User is greeting"}}

User: "Calculate 5 + 3"
{{"intent": "calculate", "confidence": 0.98, "entities": {{"expression": "5 + 3"}}, "reasoning": "User wants arithmetic"}}

User: "Book me a flight to Rome"
{{"intent": "out_of_scope", "confidence": 0.90, "entities": {{"destination": "Rome"}}, "reasoning": "Travel booking is not supported"}}

Current user input: "{request}"

Classify the input as exactly one of: {labels}.
Output ONLY a JSON object with the fields intent, confidence, entities and reasoning.

JSON:"#
    )
}

/// Tool selection prompt for model-driven strategies
pub fn tool_selection_prompt(request: &str, tools: &ToolRegistry) -> String {
    let examples = tools
        .iter()
        .filter_map(|tool| {
            let param = tool.parameters().first()?;
            let example = quoted_example(&param.description)?;
            Some(format!(
                r#"User: "...{example}..."
{{"tool_name": "{}", "arguments": {{"{}": "{example}"}}}}"#,
                tool.name(),
                param.name
            ))
        })
        .collect::<Vec<_>>();

    let examples = if examples.is_empty() {
        "No examples available.".to_string()
    } else {
        examples.join("\n\n")
    };

    format!(
        r#"You are a tool selector. Choose the right tool for the user's request.

Available tools:
{}

Examples of correct tool selection:
{examples}

Rules:
1. Pick the single most appropriate tool, or "none" if no tool fits.
2. Copy the needed values EXACTLY from the user's request into "arguments".
3. Return ONLY JSON: {{"tool_name": "TOOL", "arguments": {{"PARAM": "VALUE"}}}}

Current user request: "{request}"

JSON:"#,
        tools.describe()
    )
}

/// Prompt asking the model to phrase a tool result as an answer
pub fn tool_response_prompt(request: &str, tool_output: &str) -> String {
    format!(
        r#"You are a helpful assistant. Answer the user's question using the tool result.

User: {request}

Tool result:
{tool_output}

Instructions:
- Give a clear, direct answer based on the result.
- Be concise (1-2 sentences).
- Do not mention the tool.

Answer:"#
    )
}

/// Direct answer in an agent's persona
pub fn persona_prompt(persona: &str, request: &str) -> String {
    format!(
        "{persona}\n\nUser: {request}\n\n\
         Instructions:\n\
         - Keep the reply concise (1-2 sentences).\n\
         - Write only what the assistant would say.\n\nAssistant:"
    )
}

/// Memory-backed chat prompt
pub fn chat_prompt(system_prompt: &str, context: &str, input: &str) -> String {
    let context = if context.trim().is_empty() {
        "No previous messages.\n".to_string()
    } else {
        context.to_string()
    };

    format!("{system_prompt}\n\nConversation so far:\n{context}\nUSER: {input}\nASSISTANT:")
}

/// Fixed reply of the fallback agent
pub fn capability_message(capabilities: &[(String, String)]) -> String {
    let mut message = String::from("Sorry, I can't help with that request. Here is what I can do:");
    if capabilities.is_empty() {
        message.push_str("\n- nothing yet, no agents are registered");
    }
    for (label, description) in capabilities {
        message.push_str(&format!("\n- {}: {}", label, description));
    }
    message
}

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(```|~~~)[a-zA-Z]*\s*$").expect("fence pattern is valid"));

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']+)'").expect("quote pattern is valid"));

fn quoted_example(description: &str) -> Option<String> {
    QUOTED
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the outermost JSON object from a model reply.
///
/// Code fences and stray backticks are ignored, as is any chatter before the
/// first `{` or after its matching `}`.
pub fn extract_json_object(reply: &str) -> Option<String> {
    let cleaned = FENCE.replace_all(reply, "");
    let cleaned = cleaned.trim().trim_matches(|c| c == '`' || c == '´');

    let start = cleaned.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in cleaned[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(cleaned[start..=start + offset].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
