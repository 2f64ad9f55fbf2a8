// Cross-cutting prompt fragments shared by every backend.
// Review-specific templates live in review/prompts.rs.

/// System prompt that asks for JSON-only output. Backends still ignore it often
/// enough that every response goes through the recovery chain.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
