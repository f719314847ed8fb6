use serde_json::{Value, json};

/// Tones requested for paraphrases, in the order the service is asked for them.
pub const PARAPHRASE_TONES: [&str; 7] = [
    "Professional",
    "Diplomatic",
    "Direct/Concise",
    "Persuasive",
    "Casual/Friendly",
    "Social Media (LinkedIn/Twitter) - include appropriate emojis and hashtags.",
    "Motivational/Inspiring - uplifting and encouraging.",
];

/// Tone used for email drafts when none is given.
pub const DEFAULT_EMAIL_TONE: &str = "Professional";

pub fn paraphrase_prompt(message: &str) -> String {
    let tones = PARAPHRASE_TONES
        .iter()
        .enumerate()
        .map(|(i, tone)| format!("{}. {}", i + 1, tone))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Paraphrase the following message into {count} variations suitable for software-industry communication.\n\
         The output must strictly be a JSON array.\n\
         \n\
         Message to paraphrase: \"{message}\"\n\
         \n\
         Ensure the tones vary:\n\
         {tones}\n",
        count = PARAPHRASE_TONES.len(),
    )
}

/// An array of `{tone, message}` objects, both fields required.
pub fn paraphrase_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "tone": {
                    "type": "STRING",
                    "description": "The tone of the paraphrased message (e.g. Professional, Social Media)"
                },
                "message": {
                    "type": "STRING",
                    "description": "The actual paraphrased text content"
                }
            },
            "required": ["tone", "message"]
        }
    })
}

pub fn email_prompt(message: &str, tone: &str) -> String {
    format!(
        "Draft a professional email for a software industry context based on the following key message.\n\
         \n\
         Key Message: \"{message}\"\n\
         Tone: {tone}\n\
         \n\
         The email should have a clear subject line and a structured body.\n\
         Use placeholders like [Name] or [Date] where appropriate.\n\
         Output must be a JSON object with 'subject' and 'body'.\n"
    )
}

/// A `{subject, body}` object, both fields required.
pub fn email_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subject": {
                "type": "STRING",
                "description": "The email subject line"
            },
            "body": {
                "type": "STRING",
                "description": "The email body text"
            }
        },
        "required": ["subject", "body"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paraphrase_prompt_lists_every_tone() {
        let prompt = paraphrase_prompt("ship it");

        assert!(prompt.contains("Message to paraphrase: \"ship it\""));
        assert!(prompt.contains("into 7 variations"));
        assert!(prompt.contains("1. Professional"));
        assert!(prompt.contains("7. Motivational/Inspiring"));
        assert!(prompt.contains("strictly be a JSON array"));
    }

    #[test]
    fn email_prompt_carries_message_and_tone() {
        let prompt = email_prompt("the build is green", "Direct/Concise");

        assert!(prompt.contains("Key Message: \"the build is green\""));
        assert!(prompt.contains("Tone: Direct/Concise"));
        assert!(prompt.contains("[Name]"));
    }

    #[test]
    fn schemas_require_every_field() {
        assert_eq!(paraphrase_schema()["type"], "ARRAY");
        assert_eq!(
            paraphrase_schema()["items"]["required"],
            json!(["tone", "message"])
        );
        assert_eq!(email_schema()["required"], json!(["subject", "body"]));
    }
}
