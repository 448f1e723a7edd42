//! Serialize a [`Catalog`] back to Qt Linguist `.ts` XML.

use crate::errors::{CatalogError, CatalogResult};
use crate::models::{Catalog, CompletionState, Context, Message};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn write_ts<W: Write>(catalog: &Catalog, out: W) -> CatalogResult<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped("TS")))?;

    let mut root = BytesStart::new("TS");
    root.push_attribute(("version", catalog.version.as_str()));
    if let Some(language) = &catalog.language {
        root.push_attribute(("language", language.as_str()));
    }
    if let Some(source_language) = &catalog.source_language {
        root.push_attribute(("sourcelanguage", source_language.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for context in &catalog.contexts {
        write_context(&mut writer, context)?;
    }

    writer.write_event(Event::End(BytesEnd::new("TS")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

pub fn to_ts_string(catalog: &Catalog) -> CatalogResult<String> {
    let mut buffer = Vec::new();
    write_ts(catalog, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| CatalogError::Format(e.to_string()))
}

pub fn save_path(catalog: &Catalog, path: &Path) -> CatalogResult<()> {
    let file = std::fs::File::create(path)?;
    write_ts(catalog, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), messages = catalog.message_count(), "Translation catalog written");
    Ok(())
}

fn write_context<W: Write>(writer: &mut Writer<W>, context: &Context) -> CatalogResult<()> {
    writer.write_event(Event::Start(BytesStart::new("context")))?;
    text_element(writer, "name", &context.name)?;
    for message in &context.messages {
        write_message(writer, message)?;
    }
    writer.write_event(Event::End(BytesEnd::new("context")))?;
    Ok(())
}

fn write_message<W: Write>(writer: &mut Writer<W>, message: &Message) -> CatalogResult<()> {
    let mut start = BytesStart::new("message");
    if message.numerus {
        start.push_attribute(("numerus", "yes"));
    }
    writer.write_event(Event::Start(start))?;

    for location in &message.locations {
        let mut element = BytesStart::new("location");
        if let Some(filename) = &location.filename {
            element.push_attribute(("filename", filename.as_str()));
        }
        if let Some(line) = &location.line {
            element.push_attribute(("line", line.as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }

    text_element(writer, "source", &message.source)?;
    if let Some(comment) = &message.comment {
        text_element(writer, "comment", comment)?;
    }
    if let Some(extra) = &message.extra_comment {
        text_element(writer, "extracomment", extra)?;
    }
    if let Some(note) = &message.translator_comment {
        text_element(writer, "translatorcomment", note)?;
    }

    let mut translation = BytesStart::new("translation");
    if message.state == CompletionState::Unfinished {
        translation.push_attribute(("type", "unfinished"));
    }
    if message.numerus {
        writer.write_event(Event::Start(translation))?;
        for form in &message.numerus_forms {
            text_element(writer, "numerusform", form)?;
        }
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    } else if message.translation.is_empty() {
        writer.write_event(Event::Empty(translation))?;
    } else {
        writer.write_event(Event::Start(translation))?;
        writer.write_event(Event::Text(text_event(&message.translation)))?;
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("message")))?;
    Ok(())
}

/// `<tag>text</tag>`, or `<tag/>` for empty text so the indenter never
/// injects whitespace into the element body.
fn text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> CatalogResult<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(tag)))?;
        writer.write_event(Event::Text(text_event(text)))?;
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }
    Ok(())
}

/// Escaped character data. Control characters XML 1.0 cannot hold become
/// `<byte value="xN"/>` and `\r` becomes `&#xd;`, so the loader reads back
/// exactly what was written.
fn text_event(text: &str) -> BytesText<'_> {
    if !text.chars().any(needs_reference) {
        return BytesText::new(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(pos) = rest.find(needs_reference) {
        escaped.push_str(&escape(&rest[..pos]));
        let c = rest[pos..].chars().next().unwrap_or_default();
        if c == '\r' {
            escaped.push_str("&#xd;");
        } else {
            escaped.push_str(&format!("<byte value=\"x{:x}\"/>", u32::from(c)));
        }
        rest = &rest[pos + c.len_utf8()..];
    }
    escaped.push_str(&escape(rest));
    BytesText::from_escaped(escaped)
}

fn needs_reference(c: char) -> bool {
    c == '\r' || (c < '\u{20}' && c != '\t' && c != '\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::loader::parse_ts;
    use crate::models::Message;
    use rstest::rstest;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new("zh", "en");
        catalog.contexts.push(
            Context::new("AddNewIdentitiesWorker").with_message(
                Message::new(
                    "Unable to parse this directory!\n\nReason:\n{}\n",
                    "无法解析此目录\n\n原因：\n{}\n",
                )
                .with_location("../../dialogs/identity_adder_worker.py", 46),
            ),
        );
        catalog.contexts.push(
            Context::new("PluginConfigDialog")
                .with_message(Message::new(
                    "You can't apply changes if the plugin <b>never</b> got set & \"saved\"!",
                    "如果从未设置插件，则无法应用更改！",
                ))
                .with_message(Message::unfinished("Uploading Identities: %p%")),
        );
        catalog.contexts.push(Context::new("Empty"));
        catalog
    }

    #[rstest]
    fn test_output_shape() {
        let xml = to_ts_string(&sample()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<!DOCTYPE TS>"));
        assert!(xml.contains("<TS version=\"2.1\" language=\"zh\" sourcelanguage=\"en\">"));
        assert!(xml.contains(
            "<location filename=\"../../dialogs/identity_adder_worker.py\" line=\"46\"/>"
        ));
        assert!(xml.contains("<translation type=\"unfinished\"/>"));
        assert!(xml.contains("&lt;b&gt;never&lt;/b&gt;"));
    }

    #[rstest]
    fn test_reload_preserves_entries() {
        // Arrange
        let catalog = sample();

        // Act
        let reloaded = parse_ts(&to_ts_string(&catalog).unwrap()).unwrap();

        // Assert
        assert_eq!(reloaded.entries(), catalog.entries());
        assert_eq!(reloaded, catalog);
    }

    #[rstest]
    fn test_numerus_and_comments_survive_reload() {
        let mut message = Message::new("%n stream(s)", "").with_comment("Toolbar");
        message.numerus = true;
        message.numerus_forms = vec!["%n 个视频流".to_string()];
        message.translation = "%n 个视频流".to_string();
        message.extra_comment = Some("count of streams".to_string());
        message.translator_comment = Some("measure word 个".to_string());
        let mut catalog = Catalog::new("zh", "en");
        catalog
            .contexts
            .push(Context::new("StreamList").with_message(message));

        let reloaded = parse_ts(&to_ts_string(&catalog).unwrap()).unwrap();

        assert_eq!(reloaded, catalog);
    }

    #[rstest]
    fn test_control_characters_are_written_as_byte_elements() {
        // Arrange
        let mut catalog = Catalog::new("zh", "en");
        catalog.contexts.push(Context::new("Terminal").with_message(Message::new(
            "Bell\u{7} & tab\there",
            "响铃\u{7}\r\n<b>",
        )));

        // Act
        let xml = to_ts_string(&catalog).unwrap();
        let reloaded = parse_ts(&xml).unwrap();

        // Assert
        assert!(xml.contains("<source>Bell<byte value=\"x7\"/> &amp; tab\there</source>"));
        assert!(xml.contains("&#xd;\n"));
        assert!(!xml.contains('\u{7}'));
        assert_eq!(reloaded, catalog);
    }
}
