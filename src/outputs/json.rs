//! JSON Feed v1 serialization.

use crate::models::{FeedItem, FeedMeta};
use crate::utils::guess_mime;
use serde_json::{Value, json};

/// Render a JSON Feed v1 document. `attachments` appears only when the
/// item carries media; `tags` only when it has a category.
pub fn render(meta: &FeedMeta, items: &[FeedItem]) -> Result<String, serde_json::Error> {
    let items_json: Vec<Value> = items.iter().map(item_json).collect();
    let feed = json!({
        "version": "https://jsonfeed.org/version/1",
        "title": meta.title,
        "home_page_url": meta.home_url,
        "feed_url": meta.json_url(),
        "items": items_json,
    });
    let mut doc = serde_json::to_string_pretty(&feed)?;
    doc.push('\n');
    Ok(doc)
}

fn item_json(item: &FeedItem) -> Value {
    let mut obj = json!({
        "id": item.guid,
        "url": item.link,
        "title": item.title,
        "content_text": item.description,
    });

    let mut attachments = Vec::new();
    if let Some(image) = &item.image {
        attachments.push(json!({
            "url": image,
            "mime_type": guess_mime(image, "image/jpeg"),
        }));
    }
    if let Some(video) = &item.video {
        attachments.push(json!({
            "url": video,
            "mime_type": guess_mime(video, "video/mp4"),
        }));
    }
    if !attachments.is_empty() {
        obj["attachments"] = Value::Array(attachments);
    }
    if let Some(category) = &item.category {
        obj["tags"] = json!([category]);
    }
    obj
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> FeedMeta {
        FeedMeta::for_slug(
            "robotics",
            "Robotics",
            "https://acme-feeds.github.io/acme-feeds/",
            "https://acme.example/",
        )
    }

    fn item() -> FeedItem {
        FeedItem {
            title: "Title".to_string(),
            link: "https://example.com/news/a".to_string(),
            guid: "https://example.com/news/a".to_string(),
            description: "Text".to_string(),
            pub_date: None,
            image: Some("https://example.com/a.webp".to_string()),
            video: Some("https://example.com/a.webm".to_string()),
            category: Some("robotics".to_string()),
        }
    }

    #[test]
    fn test_json_feed_structure() {
        let doc = render(&meta(), &[item()]).unwrap();
        let parsed: Value = serde_json::from_str(&doc).unwrap();

        assert_eq!(parsed["version"], "https://jsonfeed.org/version/1");
        assert_eq!(
            parsed["feed_url"],
            "https://acme-feeds.github.io/acme-feeds/feeds/robotics.json"
        );
        assert_eq!(parsed["home_page_url"], "https://acme.example/");

        let items = parsed["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "https://example.com/news/a");
        assert_eq!(items[0]["content_text"], "Text");
    }

    #[test]
    fn test_json_attachments_carry_guessed_mime() {
        let doc = render(&meta(), &[item()]).unwrap();
        let parsed: Value = serde_json::from_str(&doc).unwrap();
        let attachments = parsed["items"][0]["attachments"].as_array().unwrap();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0]["mime_type"], "image/webp");
        assert_eq!(attachments[1]["mime_type"], "video/webm");
    }

    #[test]
    fn test_json_omits_attachments_and_tags_when_absent() {
        let mut bare = item();
        bare.image = None;
        bare.video = None;
        bare.category = None;
        let doc = render(&meta(), &[bare]).unwrap();
        let parsed: Value = serde_json::from_str(&doc).unwrap();
        assert!(parsed["items"][0].get("attachments").is_none());
        assert!(parsed["items"][0].get("tags").is_none());
    }

    #[test]
    fn test_json_tags_carry_category() {
        let doc = render(&meta(), &[item()]).unwrap();
        let parsed: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(parsed["items"][0]["tags"], json!(["robotics"]));
    }

    #[test]
    fn test_json_empty_item_list_is_valid() {
        let doc = render(&meta(), &[]).unwrap();
        let parsed: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(parsed["items"], json!([]));
    }
}
