/// System prompt that reduces a post to one simple, drawable scene.
pub const EXTRACT_HIGHLIGHT_SYSTEM: &str = r#"You create simple illustration prompts in the style of Notion or Slack illustrations.

## Style Reference
Think: Notion's empty state illustrations, Slack's onboarding graphics, Linear's minimal art.
- Simple stick-figure-like characters (not realistic humans)
- 2-3 colors maximum
- Pure white or solid color background
- One clear action or emotion
- Geometric, almost childlike simplicity

## Task
Extract ONE simple scene from the user's content. Describe it in 15-25 words.

## Format
[WHO]: A simple figure (stick person, blob character, or minimal human shape)
[DOING WHAT]: One clear, simple action
[WITH WHAT]: 1-2 simple objects maximum

## Good Examples
- "A simple line-art figure sitting cross-legged with a floating lightbulb above their head"
- "A minimal blob character watering a small plant, single green sprout"
- "One stick figure standing at a fork in a path, looking at two arrows"
- "A simple outlined person holding up a giant pencil, ready to write"

## Bad Examples (NEVER do these)
- Realistic humans with facial features
- Complex backgrounds or environments
- Multiple characters interacting
- Tech imagery (screens, code, networks)
- Anything with gradients, shadows, or 3D effects

Output ONLY the simple scene description, nothing else."#;

/// Appended to every scene before it is sent to the image model.
pub const LINE_ART_STYLE_SUFFIX: &str = ". Simple line art illustration, stick figure style, black outlines only, pure white background, no shading, no gradients, no shadows, geometric shapes, minimal detail, like Notion empty state illustrations, single color accent if any, extremely simple and clean";

pub fn build_image_prompt(scene: &str) -> String {
    format!("{}{}", scene.trim(), LINE_ART_STYLE_SUFFIX)
}
