/// Build the instruction prompt for one topic.
///
/// The topic is embedded verbatim; callers are expected to have rejected
/// blank topics already.
pub fn build_generation_prompt(topic_text: &str) -> String {
    format!(
        r##"You are an expert social media content creator.

Write engaging post content for a single social platform, made of:
- title
- body
- hashtags
- an image prompt for an AI image model

For that platform:
1. Write text that suits the platform's style.
2. Include an image prompt that visually represents the post. It will be sent to an AI image model as-is.

Input Topic: {topic_text}

Return a valid JSON array like this:
[
  {{
    "platform": "Facebook",
    "title": "string | null",
    "body": "string",
    "hashtags": ["#hashtag1", "#hashtag2"],
    "imagePrompt": "Detailed prompt for the image model (visual concept, style and subject)"
  }}
]

Guidelines:
- The image prompt should describe what the image depicts, including emotion, color tone and composition.

Only return the JSON array above, containing exactly one object. Do NOT include any extra commentary."##
    )
}
