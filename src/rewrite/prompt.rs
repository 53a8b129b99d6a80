pub const SYSTEM_PROMPT: &str = r#"You are a diagram modification assistant that helps users update mermaid.js diagrams based on natural language requests.

Your task is to modify the provided mermaid diagram code according to the user's request.

Guidelines:
1. Return ONLY the modified mermaid code, without any explanations, markdown formatting, or code blocks.
2. Ensure the modified code is valid mermaid syntax.
3. Preserve the existing structure and style of the diagram while making the requested changes.
4. If the request is unclear or cannot be implemented, return the original code unchanged.
5. Focus on making precise, targeted changes that fulfill the user's request.

Example:
If the user provides:
```
graph TD
A[Start] --> B{Is it working?}
B -->|Yes| C[Great!]
B -->|No| D[Debug]
```

And requests: "Add a node for error handling connected to Debug"

You should return:
```
graph TD
A[Start] --> B{Is it working?}
B -->|Yes| C[Great!]
B -->|No| D[Debug]
D --> E[Error Handling]
```
"#;

/// Responses shorter than this are treated as unusable.
pub const MIN_RESPONSE_LEN: usize = 10;

const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "mindmap",
    "timeline",
    "gitGraph",
    "quadrantChart",
];

pub fn user_message(current_code: &str, user_request: &str) -> String {
    format!("Here is my current diagram code:\n\n{current_code}\n\nRequest: {user_request}")
}

/// Trims the model output and removes a surrounding markdown code fence,
/// which models sometimes add despite the instructions.
pub fn clean_response(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string ("mermaid") on the opening fence line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return trimmed.to_string(),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

/// Cheap plausibility check: the first meaningful line must open with a
/// mermaid diagram keyword. `%%` comment and directive lines are skipped.
pub fn looks_like_mermaid(code: &str) -> bool {
    code.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"))
        .is_some_and(|first| DIAGRAM_KEYWORDS.iter().any(|kw| first.starts_with(kw)))
}
