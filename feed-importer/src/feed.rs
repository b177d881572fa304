//! RSS feed parsing.

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use quick_xml::{Reader, events::BytesStart, events::Event};

/// The channel of an RSS feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPodcast {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub link: String,
    pub language: String,
    pub itunes_author: String,
    pub cover_url: String,
    pub episodes: Vec<ParsedEpisode>,
}

/// One `<item>` of an RSS feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEpisode {
    pub guid: String,
    pub title: String,
    pub description: String,
    pub published: Option<DateTime<Utc>>,
    /// Length in seconds, 0 when unknown.
    pub total_time: i32,
    pub audio_url: String,
}

/// Parse an RSS 2.0 document, including the common iTunes extensions.
pub fn parse_feed(xml: &str) -> anyhow::Result<ParsedPodcast> {
    let mut reader = Reader::from_str(xml);

    let mut podcast = ParsedPodcast::default();
    let mut episode: Option<ParsedEpisode> = None;
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        let event = reader.read_event().with_context(|| {
            format!("Malformed feed at byte {}", reader.buffer_position())
        })?;

        match event {
            Event::Start(element) => {
                let name = element_name(&element);
                if name == "item" {
                    episode = Some(ParsedEpisode::default());
                }
                apply_attributes(&element, &name, &mut podcast, episode.as_mut())?;

                path.push(name);
                text.clear();
            }
            Event::Empty(element) => {
                let name = element_name(&element);
                apply_attributes(&element, &name, &mut podcast, episode.as_mut())?;
            }
            Event::Text(content) => text.push_str(&String::from_utf8_lossy(content.as_ref())),
            Event::CData(content) => text.push_str(&String::from_utf8_lossy(&content.into_inner())),
            Event::GeneralRef(reference) => {
                let entity = reference.decode()?;
                match resolve_entity(&entity) {
                    Some(resolved) => text.push_str(&resolved),
                    None => {
                        text.push('&');
                        text.push_str(&entity);
                        text.push(';');
                    }
                }
            }
            Event::End(_) => {
                let Some(name) = path.pop() else {
                    continue;
                };
                let value = std::mem::take(&mut text).trim().to_string();

                if name == "item" {
                    if let Some(episode) = episode.take() {
                        podcast.episodes.push(episode);
                    }
                } else if let Some(episode) = episode.as_mut() {
                    apply_episode_field(episode, &name, value);
                } else {
                    let parent = path.last().map(String::as_str);
                    apply_channel_field(&mut podcast, parent, &name, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if podcast.title.is_empty() {
        bail!("Feed has no channel title");
    }

    Ok(podcast)
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn attribute(element: &BytesStart<'_>, name: &str) -> anyhow::Result<Option<String>> {
    let Some(attribute) = element.try_get_attribute(name)? else {
        return Ok(None);
    };
    let raw = String::from_utf8_lossy(&attribute.value);

    Ok(Some(quick_xml::escape::unescape(&raw)?.into_owned()))
}

fn apply_attributes(
    element: &BytesStart<'_>,
    name: &str,
    podcast: &mut ParsedPodcast,
    episode: Option<&mut ParsedEpisode>,
) -> anyhow::Result<()> {
    match (name, episode) {
        ("enclosure", Some(episode)) => {
            if let Some(url) = attribute(element, "url")? {
                episode.audio_url = url;
            }
        }
        ("itunes:image", None) => {
            if let Some(href) = attribute(element, "href")? {
                podcast.cover_url = href;
            }
        }
        _ => {}
    }

    Ok(())
}

fn apply_channel_field(
    podcast: &mut ParsedPodcast,
    parent: Option<&str>,
    name: &str,
    value: String,
) {
    match (parent, name) {
        (Some("channel"), "title") => podcast.title = value,
        (Some("channel"), "description") => podcast.description = value,
        (Some("channel"), "itunes:summary") if podcast.description.is_empty() => {
            podcast.description = value
        }
        (Some("channel"), "itunes:subtitle") => podcast.subtitle = value,
        (Some("channel"), "link") => podcast.link = value,
        (Some("channel"), "language") => podcast.language = value,
        (Some("channel"), "itunes:author") => podcast.itunes_author = value,
        // <itunes:image> wins over the plain RSS image.
        (Some("image"), "url") if podcast.cover_url.is_empty() => podcast.cover_url = value,
        _ => {}
    }
}

fn apply_episode_field(episode: &mut ParsedEpisode, name: &str, value: String) {
    match name {
        "title" => episode.title = value,
        "guid" => episode.guid = value,
        "description" => episode.description = value,
        "itunes:summary" | "content:encoded" if episode.description.is_empty() => {
            episode.description = value
        }
        "pubDate" => {
            episode.published = DateTime::parse_from_rfc2822(&value)
                .map(|published| published.with_timezone(&Utc))
                .ok()
        }
        "itunes:duration" => episode.total_time = parse_duration(&value).unwrap_or_default(),
        _ => {}
    }
}

/// Parse an `itunes:duration`: plain seconds, `MM:SS` or `HH:MM:SS`.
pub fn parse_duration(raw: &str) -> Option<i32> {
    let parts: Vec<&str> = raw.trim().split(':').collect();

    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    parts.iter().try_fold(0_i32, |total, part| {
        let value = i32::try_from(part.trim().parse::<u32>().ok()?).ok()?;
        total.checked_mul(60)?.checked_add(value)
    })
}

fn resolve_entity(entity: &str) -> Option<String> {
    let resolved = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = entity.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };

    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Talk &amp; Python</title>
    <link>https://talk.example.com</link>
    <language>en</language>
    <description><![CDATA[A show about <b>Python</b>.]]></description>
    <itunes:author>Jane Host</itunes:author>
    <itunes:subtitle>Weekly</itunes:subtitle>
    <image>
      <url>https://talk.example.com/small.png</url>
      <title>Talk &amp; Python</title>
    </image>
    <itunes:image href="https://talk.example.com/cover.png"/>
    <item>
      <title>Episode 2: Typing &#8212; deep dive</title>
      <guid>ep-2</guid>
      <description>Second</description>
      <pubDate>Tue, 05 Mar 2024 10:00:00 +0100</pubDate>
      <itunes:duration>1:02:03</itunes:duration>
      <enclosure url="https://cdn.example.com/2.mp3?a=1&amp;b=2" length="1" type="audio/mpeg"/>
    </item>
    <item>
      <title>Episode 1</title>
      <itunes:summary>First</itunes:summary>
      <itunes:duration>300</itunes:duration>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel() {
        let podcast = parse_feed(FEED).unwrap();

        assert_eq!(podcast.title, "Talk & Python");
        assert_eq!(podcast.link, "https://talk.example.com");
        assert_eq!(podcast.language, "en");
        assert_eq!(podcast.description, "A show about <b>Python</b>.");
        assert_eq!(podcast.itunes_author, "Jane Host");
        assert_eq!(podcast.subtitle, "Weekly");
        assert_eq!(podcast.cover_url, "https://talk.example.com/cover.png");
        assert_eq!(podcast.episodes.len(), 2);
    }

    #[test]
    fn test_parse_episodes() {
        let podcast = parse_feed(FEED).unwrap();
        let latest = &podcast.episodes[0];

        assert_eq!(latest.title, "Episode 2: Typing \u{2014} deep dive");
        assert_eq!(latest.guid, "ep-2");
        assert_eq!(latest.description, "Second");
        assert_eq!(
            latest.published,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap())
        );
        assert_eq!(latest.total_time, 3723);
        assert_eq!(latest.audio_url, "https://cdn.example.com/2.mp3?a=1&b=2");

        let first = &podcast.episodes[1];
        assert_eq!(first.description, "First");
        assert_eq!(first.total_time, 300);
        assert_eq!(first.published, None);
    }

    #[test]
    fn test_feed_without_title_is_rejected() {
        let result = parse_feed("<rss><channel><item><title>x</title></item></channel></rss>");

        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(parse_feed("<rss><channel><title>x</channel></rss>").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("45"), Some(45));
        assert_eq!(parse_duration("05:07"), Some(307));
        assert_eq!(parse_duration("1:00:00"), Some(3600));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration("-5"), None);
        assert_eq!(parse_duration("12.5"), None);
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp").as_deref(), Some("&"));
        assert_eq!(resolve_entity("#39").as_deref(), Some("'"));
        assert_eq!(resolve_entity("#x2014").as_deref(), Some("\u{2014}"));
        assert_eq!(resolve_entity("nbsp"), None);
    }
}
