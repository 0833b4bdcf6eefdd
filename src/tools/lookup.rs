//! Lookup tools backed by fixed in-process tables
//!
//! `weather` and `search` stand in for real services; the data never changes.

use crate::tools::tool::{contains_keyword, Tool, ToolArgs};

/// City, temperature in °C, condition
const WEATHER: &[(&str, i32, &str)] = &[
    ("buenos aires", 20, "Partly cloudy"),
    ("new york", 12, "Snowing"),
    ("london", 15, "Rainy"),
    ("paris", 18, "Sunny"),
    ("tokyo", 22, "Cloudy"),
    ("sydney", 25, "Clear"),
];

/// Topic, entry. More specific topics come first.
const KNOWLEDGE: &[(&str, &str)] = &[
    (
        "machine learning",
        "Machine Learning is a subset of AI where systems learn from data.",
    ),
    (
        "python",
        "Python is a versatile programming language known for readability and simplicity.",
    ),
    (
        "rust",
        "Rust is a systems programming language focused on safety and performance.",
    ),
    (
        "chatbot",
        "A chatbot is a conversational AI that simulates human conversation.",
    ),
    (
        "agent",
        "An agent is an autonomous system that can perceive, decide, and act.",
    ),
    ("tool", "A tool is a function that extends what an agent can do."),
    (
        "ai",
        "Artificial Intelligence is the simulation of human intelligence by computers.",
    ),
];

fn argument(args: &ToolArgs, name: &str) -> Result<String, String> {
    args.get(name)
        .map(|v| v.trim().to_lowercase())
        .ok_or_else(|| format!("missing {}", name))
}

/// Current conditions for a handful of cities
pub fn weather() -> Tool {
    Tool::builder("weather", "Gets the current weather for a city")
        .param("location", "City name such as 'London' or 'Tokyo'")
        .keywords(["weather", "temperature", "forecast", "raining", "sunny"])
        .handler(|args| {
            let location = argument(args, "location")?;
            let found = WEATHER
                .iter()
                .find(|(city, _, _)| contains_keyword(&location, city));

            Ok(match found {
                Some((city, temp, condition)) => {
                    format!("{}: {}°C, {}", title_case(city), temp, condition)
                }
                None => format!(
                    "No weather data for '{}'. Known cities: {}",
                    location,
                    WEATHER
                        .iter()
                        .map(|(city, _, _)| title_case(city))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        })
}

/// Short definitions of common AI topics
pub fn search() -> Tool {
    Tool::builder("search", "Looks up short definitions of programming and AI topics")
        .param("query", "Topic to look up such as 'python' or 'machine learning'")
        .keywords(["search", "look up", "tell me about", "what is", "define", "explain"])
        .handler(|args| {
            let query = argument(args, "query")?;
            let found = KNOWLEDGE
                .iter()
                .find(|(topic, _)| contains_keyword(&query, topic));

            Ok(match found {
                Some((_, entry)) => entry.to_string(),
                None => format!(
                    "No information found about '{}'. Try: {}",
                    query,
                    KNOWLEDGE
                        .iter()
                        .map(|(topic, _)| *topic)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        })
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
