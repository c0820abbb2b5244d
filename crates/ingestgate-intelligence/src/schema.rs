//! JSON Schema for the fixed `InteractionAnalysis` extraction shape
//! (§4.6.1), passed to `LlmClient::complete_structured`.

use serde_json::{json, Value};

pub fn interaction_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summaries": {
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "headline": {"type": "string"},
                    "brief": {"type": "string"},
                    "detailed": {"type": "string"},
                    "spotlight": {"type": "string"}
                },
                "required": ["title", "headline", "brief", "detailed", "spotlight"]
            },
            "action_items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "description": {"type": "string"},
                        "owner": {"type": ["string", "null"]},
                        "due_date": {"type": ["string", "null"]}
                    },
                    "required": ["description"]
                }
            },
            "decisions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "decision": {"type": "string"},
                        "rationale": {"type": ["string", "null"]}
                    },
                    "required": ["decision"]
                }
            },
            "risks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "risk": {"type": "string"},
                        "severity": {"type": "string", "enum": ["low", "medium", "high"]},
                        "mitigation": {"type": ["string", "null"]}
                    },
                    "required": ["risk", "severity"]
                }
            },
            "key_takeaways": {"type": "array", "items": {"type": "string"}},
            "product_feedback": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }
            },
            "market_intelligence": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }
            }
        },
        "required": ["summaries"]
    })
}
