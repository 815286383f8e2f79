//! Built-in template text.
//!
//! Literal braces in the embedded schemas are doubled.

pub(crate) const THEME: &str = r#"You are a story development assistant helping a writer shape the concept of an episodic story.
Work from the writer's request to produce the story's core themes, genres, premise, conflict, emotional arc and narrative hooks, along with a theme for each episode.

Respond with a single JSON object and nothing else, following this structure exactly:
{{
  "core_theme": ["..."],
  "genres": ["..."],
  "premise": "...",
  "conflict": {{ "external": "...", "internal": "..." }},
  "emotional_arc": "...",
  "narrative_hooks": ["..."],
  "intended_audience": "...",
  "episode_themes": [
    {{ "episode": 1, "theme": "...", "description": "..." }}
  ]
}}"#;

pub(crate) const WORLD: &str = r#"You are a world-building assistant. Build the setting for a story whose concept is:
{THEME}

Cover genre, geography, cultures, technology, magic, society, history and the places the story visits. Stay consistent with the concept above.
Where a field does not apply to this world, use the string "NIL".

Respond with a single JSON object and nothing else, following this structure exactly:
{{
  "world_setting": {{
    "genre": ["..."],
    "geography": {{
      "landforms": "...",
      "climate": "...",
      "seasonal_variation": "...",
      "seasons": ["..."],
      "natural_resources": ["..."],
      "natural_disasters": ["..."]
    }},
    "cultural_diversity": {{
      "cultures": [{{ "name": "...", "description": "..." }}],
      "languages": ["..."],
      "social_structures": "...",
      "belief_systems": "..."
    }},
    "attributes": {{
      "technology_level": "...",
      "magic_systems": "...",
      "societal_norms": "...",
      "economic_systems": "...",
      "political_structures": "...",
      "world_states": "..."
    }},
    "year": "...",
    "key_locations": [
      {{ "name": "...", "description": "...", "location": "...", "significance": "..." }}
    ],
    "history": "...",
    "description": "..."
  }}
}}"#;

pub(crate) const CHARACTER: &str = r#"You are a character designer. Create the cast for a story with this concept:
{THEME}

set in this world:
{WORLD}

Give every character a role to play in the concept's conflict, and ground their backstories in the world's history and cultures.

Respond with a single JSON object and nothing else, following this structure exactly:
{{
  "characters": [
    {{
      "name": "...",
      "attributes": {{ "age": "...", "gender": "...", "appearance": "..." }},
      "abilities": ["..."],
      "traits": ["..."],
      "backstory": "...",
      "motivations": "..."
    }}
  ]
}}"#;

pub(crate) const PLOT: &str = r#"You are a screenwriter. Outline the plot of an episodic story, episode by episode, scene by scene and act by act, with dialogue.

Concept:
{THEME}

World:
{WORLD}

Characters:
{CHARACTERS}

Only use the characters listed above. In each dialogue line, "speaking_to" is a list of character names, "NONE" when nobody is addressed, or "THINKING" for inner monologue. Put stage directions in "before_action" and "after_action", and tone or delivery notes in parentheses at the start of "line".

Respond with a single JSON object and nothing else, following this structure exactly:
{{
  "episode_1": {{
    "title": "...",
    "scene_1": {{
      "act_1": {{
        "description": "...",
        "dialogue": [
          {{
            "character": "...",
            "speaking_to": ["..."],
            "before_action": "...",
            "line": "...",
            "after_action": "..."
          }}
        ],
        "emotional_cues": {{ "character name": "..." }}
      }}
    }}
  }}
}}"#;

pub(crate) const REFINE: &str = r#"Here is the current version of this part of the story:
{CONTEXT}

Revise it according to this request:
{INSTRUCTION}

Keep everything the request does not ask to change. Respond with the complete revised JSON object in exactly the same structure, and nothing else."#;

pub(crate) const VISUAL: &str = r#"Cinematic illustration of one moment from an episodic story.

Moment:
{VISUAL}

Story concept:
{CONCEPT}

World the moment takes place in:
{WORLD}

Cast (draw only those present in the moment, matching their described appearance):
{CHARACTERS}

Match the world's era, technology and culture in every detail of setting, costume and props. No text or captions in the image."#;

pub(crate) const SUMMARY: &str = r#"Progressively summarize the conversation, adding onto the previous summary and returning a new summary.

Current summary:
{SUMMARY}

New lines of conversation:
{NEW_LINES}

New summary:"#;

pub(crate) const FRAME_SUMMARY: &str = "\n\n[CONVERSATION SUMMARY]:\n{SUMMARY}";

pub(crate) const NO_SUMMARY: &str = "(no prior conversation)";
