use serde_json::Value;

/// Extract the JSON text from a model response
///
/// Tries in order:
/// 1. JSON in markdown code block: ```json ... ```
/// 2. Generic markdown code block: ``` ... ```
/// 3. The whole response, trimmed
///
/// No repair is attempted: what comes back is parsed exactly as written.
pub fn extract_json_string(text: &str) -> &str {
    if let Some(block) = text
        .split("```json")
        .nth(1)
        .and_then(|s| s.split("```").next())
    {
        return block.trim();
    }

    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        if let Some(newline_offset) = text[block_start..].find('\n') {
            let json_start = block_start + newline_offset + 1;
            if let Some(end_offset) = text[json_start..].find("```") {
                return text[json_start..json_start + end_offset].trim();
            }
        }
    }

    text.trim()
}

/// Parse model output as strict JSON. Malformed output is an error, never patched up.
pub fn parse_json(text: &str) -> Result<Value, String> {
    let json_str = extract_json_string(text);

    serde_json::from_str::<Value>(json_str).map_err(|e| {
        format!(
            "Failed to parse JSON: {}. Original: {}",
            e,
            json_str.chars().take(200).collect::<String>()
        )
    })
}
