//! Output rendering for song records.
//!
//! Handlebars templates over a complete, immutable [`SongRecord`]. Lyrics are
//! emitted as raw markup (triple-stash) since the record already carries the
//! source's inner HTML; everything else is escaped normally.

use anyhow::Result;
use handlebars::Handlebars;

use crate::core::song::SongRecord;

pub const PAGE_TEMPLATE: &str = "page";
pub const TEXT_TEMPLATE: &str = "text";

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{artist}} - {{title}}</title>
</head>
<body>
<header>
<h1>{{title}}</h1>
<h2>{{artist}}</h2>
{{#if image}}<img src="{{image}}" alt="{{title}} cover">{{/if}}
</header>
<section class="lyrics">
{{{lyrics}}}
</section>
{{#if about.full}}<section class="about">
<p>{{#if about.short}}{{about.short}}{{else}}{{about.full}}{{/if}}</p>
</section>
{{/if}}<section class="credits">
<ul>
{{#each credits}}<li>{{@key}}: {{this}}</li>
{{/each}}</ul>
</section>
</body>
</html>
"#;

const PLAIN_TEXT: &str = r#"{{title}}
{{artist}}

{{{lyrics}}}
{{#if about.full}}
{{#if about.short}}{{about.short}}{{else}}{{about.full}}{{/if}}
{{/if}}{{#each credits}}
{{@key}}: {{this}}{{/each}}
"#;

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_template_string(PAGE_TEMPLATE, PAGE_HTML)?;
        handlebars.register_template_string(TEXT_TEMPLATE, PLAIN_TEXT)?;

        Ok(Self { handlebars })
    }

    pub fn render(&self, template: &str, record: &SongRecord) -> Result<String> {
        Ok(self.handlebars.render(template, record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::song::About;
    use std::collections::HashMap;

    fn record() -> SongRecord {
        let mut credits = HashMap::new();
        credits.insert("Producer".to_string(), "B".to_string());

        SongRecord {
            artist: "Test Artist".to_string(),
            title: "Test Song".to_string(),
            image: "/images/photos/x.jpg".to_string(),
            lyrics: "<p>La la</p>".to_string(),
            credits,
            about: About {
                full: "short note".to_string(),
                short: String::new(),
            },
        }
    }

    #[test]
    fn page_template_keeps_lyrics_markup_unescaped() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine.render(PAGE_TEMPLATE, &record()).unwrap();

        assert!(html.contains("<p>La la</p>"));
        assert!(html.contains("Test Artist"));
        assert!(html.contains("Producer: B"));
        assert!(html.contains("src=\"/images/photos/x.jpg\""));
    }

    #[test]
    fn page_template_prefers_the_preview_when_present() {
        let engine = TemplateEngine::new().unwrap();
        let mut rec = record();
        rec.about = About {
            full: "x".repeat(300),
            short: format!("{}...", "x".repeat(250)),
        };

        let html = engine.render(PAGE_TEMPLATE, &rec).unwrap();
        assert!(html.contains(&format!("{}...", "x".repeat(250))));
        assert!(!html.contains(&"x".repeat(300)));
    }

    #[test]
    fn text_template_renders_empty_record() {
        let engine = TemplateEngine::new().unwrap();
        let text = engine.render(TEXT_TEMPLATE, &SongRecord::default()).unwrap();

        assert!(text.contains("\n"));
    }
}
