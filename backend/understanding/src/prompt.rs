//! Prompt and structured-output schema sent with every license analysis.

use serde_json::{Value, json};

/// Jurisdiction the equivalency is computed against when none is configured.
pub use govsync_config::defaults::DEFAULT_TARGET_JURISDICTION;

/// Instruction text for the vision model.
pub fn analysis_prompt(target_jurisdiction: &str) -> String {
    format!(
        "You are assisting a driver licensing clerk in {target}. The image is a driver's \
licence issued by another jurisdiction.\n\
1. Extract the holder's first and last name, date of birth (YYYY-MM-DD), address, licence \
number, issuing province/state/country, licence class, expiry date (YYYY-MM-DD), condition \
codes and restriction codes exactly as printed.\n\
2. Assess whether the document appears authentic (security features, layout, fonts) and give \
a confidence between 0 and 1.\n\
3. Determine the equivalent {target} licence class, whether the licence can be exchanged \
directly, which knowledge/vision/road tests are still required, which supporting documents \
must be presented, the total fee in dollars, and cite the exchange policy or regulation that \
applies. Add short notes for the clerk.\n\
Respond only with JSON matching the provided schema. Use empty strings or empty lists for \
fields that cannot be read.",
        target = target_jurisdiction
    )
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// OpenAPI-subset schema for `generationConfig.responseSchema`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "licenseData": {
                "type": "OBJECT",
                "properties": {
                    "firstName": { "type": "STRING" },
                    "lastName": { "type": "STRING" },
                    "dob": { "type": "STRING" },
                    "address": { "type": "STRING" },
                    "licenseNumber": { "type": "STRING" },
                    "originProvince": { "type": "STRING" },
                    "currentClass": { "type": "STRING" },
                    "expiryDate": { "type": "STRING" },
                    "conditions": string_list(),
                    "restrictions": string_list(),
                    "isAuthentic": { "type": "BOOLEAN" },
                    "authenticityConfidence": { "type": "NUMBER" }
                },
                "required": [
                    "firstName", "lastName", "dob", "address", "licenseNumber",
                    "originProvince", "currentClass", "expiryDate", "conditions",
                    "restrictions", "isAuthentic", "authenticityConfidence"
                ]
            },
            "equivalency": {
                "type": "OBJECT",
                "properties": {
                    "targetClass": { "type": "STRING" },
                    "isDirectExchange": { "type": "BOOLEAN" },
                    "requiredTests": string_list(),
                    "requiredDocs": string_list(),
                    "fees": { "type": "NUMBER" },
                    "policyCitation": { "type": "STRING" },
                    "notes": { "type": "STRING" }
                },
                "required": [
                    "targetClass", "isDirectExchange", "requiredTests", "requiredDocs",
                    "fees", "policyCitation", "notes"
                ]
            }
        },
        "required": ["licenseData", "equivalency"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_target_jurisdiction() {
        let prompt = analysis_prompt("Nova Scotia");
        assert!(prompt.contains("clerk in Nova Scotia"));
        assert!(prompt.contains("equivalent Nova Scotia licence class"));
    }

    #[test]
    fn schema_requires_both_halves() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["licenseData", "equivalency"]));
        assert_eq!(
            schema["properties"]["licenseData"]["properties"]["conditions"]["type"],
            "ARRAY"
        );
    }
}
