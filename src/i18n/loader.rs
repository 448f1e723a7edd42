//! Qt Linguist `.ts` loader
//!
//! Parses a translation source document into a [`Catalog`]. Text inside
//! `source`, `comment` and `translation` is kept byte-for-byte after entity
//! decoding; no trimming happens anywhere.

use crate::errors::{CatalogError, CatalogResult, IssueKind, ValidationIssue};
use crate::i18n::lookup::MessageKey;
use crate::models::{normalize_comment, Catalog, CompletionState, Context, Location, Message};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Schema versions produced by the Qt tools we have seen in the wild.
const KNOWN_VERSIONS: &[&str] = &["2.0", "2.1"];

/// What to do with an entry that is missing a required field or collides
/// with an earlier entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Log a warning, skip the entry and keep loading.
    #[default]
    Drop,
    /// Abort the load with a validation error.
    Reject,
}

/// Everything the loader skipped or flagged while building a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub issues: Vec<ValidationIssue>,
    /// Finished messages whose translation is empty. They display as blanks.
    pub blank_translations: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogLoader {
    policy: MissingFieldPolicy,
}

impl CatalogLoader {
    pub fn new(policy: MissingFieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingFieldPolicy {
        self.policy
    }

    pub fn load_str(&self, xml: &str) -> CatalogResult<Catalog> {
        self.load_str_with_report(xml).map(|(catalog, _)| catalog)
    }

    pub fn load_str_with_report(&self, xml: &str) -> CatalogResult<(Catalog, LoadReport)> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        let mut assembler = Assembler::new(self.policy);
        let mut header: Option<Header> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    ensure_root(&e, header.is_some())?;
                    header = Some(Header::from_root(&e)?);
                    parse_root_children(&mut reader, &mut assembler)?;
                }
                Event::Empty(e) => {
                    ensure_root(&e, header.is_some())?;
                    header = Some(Header::from_root(&e)?);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let header =
            header.ok_or_else(|| CatalogError::Format("document has no TS root element".into()))?;
        Ok(assembler.finish(header))
    }

    pub fn load_path(&self, path: &Path) -> CatalogResult<Catalog> {
        self.load_path_with_report(path).map(|(catalog, _)| catalog)
    }

    pub fn load_path_with_report(&self, path: &Path) -> CatalogResult<(Catalog, LoadReport)> {
        let content = std::fs::read_to_string(path)?;
        let (catalog, report) = self.load_str_with_report(&content).map_err(|e| match e {
            CatalogError::Format(msg) => {
                CatalogError::Format(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        info!(
            path = %path.display(),
            language = catalog.language.as_deref().unwrap_or("?"),
            contexts = catalog.contexts.len(),
            messages = catalog.message_count(),
            dropped = report.issues.len(),
            "Translation catalog loaded"
        );
        Ok((catalog, report))
    }
}

/// Parse a `.ts` document with the default (lenient) policy.
pub fn parse_ts(xml: &str) -> CatalogResult<Catalog> {
    CatalogLoader::default().load_str(xml)
}

struct Header {
    version: String,
    language: Option<String>,
    source_language: Option<String>,
}

impl Header {
    fn from_root(e: &BytesStart) -> CatalogResult<Self> {
        let version = attr(e, b"version")?.ok_or_else(|| {
            CatalogError::Format("TS root element has no version attribute".into())
        })?;
        if version.split('.').next() != Some("2") {
            return Err(CatalogError::Format(format!(
                "unsupported TS version {version}"
            )));
        }
        if !KNOWN_VERSIONS.contains(&version.as_str()) {
            debug!(%version, "Accepting unrecognized TS minor version");
        }
        Ok(Self {
            version,
            language: attr(e, b"language")?,
            source_language: attr(e, b"sourcelanguage")?,
        })
    }
}

fn ensure_root(e: &BytesStart, seen: bool) -> CatalogResult<()> {
    if seen {
        return Err(CatalogError::Format(
            "content after the TS root element".into(),
        ));
    }
    if e.name().as_ref() != b"TS" {
        return Err(CatalogError::Format(format!(
            "expected TS root element, found <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        )));
    }
    Ok(())
}

fn parse_root_children(reader: &mut Reader<&[u8]>, out: &mut Assembler) -> CatalogResult<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"context" => {
                let context = parse_context(reader)?;
                out.add_context(context)?;
            }
            Event::Start(e) => skip(reader, &e)?,
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unexpected_eof("TS")),
            _ => {}
        }
    }
}

#[derive(Default)]
struct RawContext {
    name: Option<String>,
    messages: Vec<RawMessage>,
}

#[derive(Default)]
struct RawMessage {
    source: Option<String>,
    message: Message,
}

fn parse_context(reader: &mut Reader<&[u8]>) -> CatalogResult<RawContext> {
    let mut context = RawContext::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"name" => context.name = Some(read_text(reader, "name")?),
                b"message" => context.messages.push(parse_message(reader, &e)?),
                _ => skip(reader, &e)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"name" => context.name = Some(String::new()),
                b"message" => context.messages.push(RawMessage::default()),
                _ => {}
            },
            Event::End(_) => return Ok(context),
            Event::Eof => return Err(unexpected_eof("context")),
            _ => {}
        }
    }
}

fn parse_message(reader: &mut Reader<&[u8]>, start: &BytesStart) -> CatalogResult<RawMessage> {
    let mut raw = RawMessage::default();
    raw.message.numerus = attr(start, b"numerus")?.as_deref() == Some("yes");

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"location" => {
                    raw.message.locations.push(parse_location(&e)?);
                    skip(reader, &e)?;
                }
                b"source" => raw.source = Some(read_text(reader, "source")?),
                b"comment" => {
                    raw.message.comment = normalize_comment(Some(read_text(reader, "comment")?))
                }
                b"extracomment" => {
                    raw.message.extra_comment = Some(read_text(reader, "extracomment")?)
                }
                b"translatorcomment" => {
                    raw.message.translator_comment = Some(read_text(reader, "translatorcomment")?)
                }
                b"translation" => {
                    raw.message.state = completion_state(&e)?;
                    read_translation(reader, &mut raw.message)?;
                }
                _ => skip(reader, &e)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"location" => raw.message.locations.push(parse_location(&e)?),
                b"source" => raw.source = Some(String::new()),
                b"translation" => raw.message.state = completion_state(&e)?,
                _ => {}
            },
            Event::End(_) => return Ok(raw),
            Event::Eof => return Err(unexpected_eof("message")),
            _ => {}
        }
    }
}

fn parse_location(e: &BytesStart) -> CatalogResult<Location> {
    Ok(Location {
        filename: attr(e, b"filename")?,
        line: attr(e, b"line")?,
    })
}

fn completion_state(e: &BytesStart) -> CatalogResult<CompletionState> {
    match attr(e, b"type")?.as_deref() {
        Some("unfinished") => Ok(CompletionState::Unfinished),
        Some(marker @ ("obsolete" | "vanished")) => {
            debug!(marker, "Loading retired message as unfinished");
            Ok(CompletionState::Unfinished)
        }
        _ => Ok(CompletionState::Finished),
    }
}

/// Read the body of `<translation>`: plain text, or `<numerusform>` children
/// for numerus messages.
fn read_translation(reader: &mut Reader<&[u8]>, message: &mut Message) -> CatalogResult<()> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&text_content(&e)?),
            Event::CData(e) => text.push_str(&cdata_content(&e)),
            Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                message.numerus_forms.push(read_text(reader, "numerusform")?);
            }
            Event::Start(e) => skip(reader, &e)?,
            Event::Empty(e) => match e.name().as_ref() {
                b"numerusform" => message.numerus_forms.push(String::new()),
                b"byte" => text.extend(decode_byte(&e)?),
                _ => {}
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof("translation")),
            _ => {}
        }
    }

    message.translation = if message.numerus {
        message.numerus_forms.first().cloned().unwrap_or_default()
    } else {
        text
    };
    Ok(())
}

/// Collect the character content of the element just opened, up to its end
/// tag.
fn read_text(reader: &mut Reader<&[u8]>, element: &str) -> CatalogResult<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&text_content(&e)?),
            Event::CData(e) => text.push_str(&cdata_content(&e)),
            Event::Empty(e) if e.name().as_ref() == b"byte" => text.extend(decode_byte(&e)?),
            Event::Start(e) => skip(reader, &e)?,
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
    }
}

/// Character data with line endings normalized to `\n` before entity
/// decoding, so `\r\n` checkouts match `\n` keys while `&#xd;` survives.
fn text_content(raw: &[u8]) -> CatalogResult<String> {
    let raw = std::str::from_utf8(raw)
        .map_err(|e| CatalogError::Format(format!("invalid UTF-8 in text: {e}")))?;
    let text = unescape(&normalize_newlines(raw))
        .map_err(quick_xml::Error::from)?
        .into_owned();
    Ok(text)
}

fn cdata_content(raw: &[u8]) -> String {
    normalize_newlines(&String::from_utf8_lossy(raw)).into_owned()
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// `<byte value="x9"/>` carries one character that XML 1.0 cannot hold
/// literally. The value is decimal or hex with an `x` / `0x` prefix.
fn decode_byte(e: &BytesStart) -> CatalogResult<Option<char>> {
    let value = attr(e, b"value")?
        .ok_or_else(|| CatalogError::Format("<byte> element without a value".into()))?;
    let (radix, digits) = if let Some(hex) = value.strip_prefix("0x") {
        (16, hex)
    } else if let Some(hex) = value.strip_prefix('x') {
        (16, hex)
    } else {
        (10, value.as_str())
    };
    let code = u32::from_str_radix(digits, radix)
        .map_err(|_| CatalogError::Format(format!("invalid <byte> value {value:?}")))?;
    if code == 0 {
        return Ok(None);
    }
    char::from_u32(code)
        .map(Some)
        .ok_or_else(|| CatalogError::Format(format!("invalid <byte> value {value:?}")))
}

fn attr(e: &BytesStart, key: &[u8]) -> CatalogResult<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute
            .map_err(|err| CatalogError::Format(format!("malformed attribute: {err}")))?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn skip(reader: &mut Reader<&[u8]>, e: &BytesStart) -> CatalogResult<()> {
    reader.read_to_end(e.name())?;
    Ok(())
}

fn unexpected_eof(element: &str) -> CatalogError {
    CatalogError::Format(format!("unexpected end of document inside <{element}>"))
}

/// Applies the validation policy while contexts stream in.
struct Assembler {
    policy: MissingFieldPolicy,
    report: LoadReport,
    contexts: Vec<Context>,
    by_name: HashMap<String, usize>,
    keys: HashSet<MessageKey>,
}

impl Assembler {
    fn new(policy: MissingFieldPolicy) -> Self {
        Self {
            policy,
            report: LoadReport::default(),
            contexts: Vec::new(),
            by_name: HashMap::new(),
            keys: HashSet::new(),
        }
    }

    fn add_context(&mut self, raw: RawContext) -> CatalogResult<()> {
        let Some(name) = raw.name else {
            return self.issue(None, IssueKind::ContextWithoutName);
        };

        let existing = self.by_name.get(&name).copied();
        let index = match existing {
            Some(index) => {
                self.issue(Some(name.as_str()), IssueKind::DuplicateContext)?;
                index
            }
            None => {
                self.contexts.push(Context::new(name.clone()));
                self.by_name.insert(name.clone(), self.contexts.len() - 1);
                self.contexts.len() - 1
            }
        };

        for RawMessage { source, mut message } in raw.messages {
            let Some(source) = source else {
                self.issue(Some(name.as_str()), IssueKind::MessageWithoutSource)?;
                continue;
            };
            message.source = source;

            let key = MessageKey::new(&name, &message.source, message.comment.as_deref());
            if self.keys.contains(&key) {
                self.issue(
                    Some(name.as_str()),
                    IssueKind::DuplicateKey {
                        source: message.source,
                        comment: message.comment,
                    },
                )?;
                continue;
            }

            if message.is_finished() && message.is_blank() {
                warn!(
                    context = %name,
                    source = %message.source,
                    "Finished message has an empty translation; it will display blank"
                );
                self.report.blank_translations += 1;
            }

            self.keys.insert(key);
            self.contexts[index].messages.push(message);
        }
        Ok(())
    }

    fn issue(&mut self, context: Option<&str>, kind: IssueKind) -> CatalogResult<()> {
        let issue = ValidationIssue {
            context: context.map(str::to_string),
            kind,
        };
        match self.policy {
            MissingFieldPolicy::Reject => Err(CatalogError::Validation(issue)),
            MissingFieldPolicy::Drop => {
                warn!(%issue, "Skipping invalid catalog entry");
                self.report.issues.push(issue);
                Ok(())
            }
        }
    }

    fn finish(self, header: Header) -> (Catalog, LoadReport) {
        let catalog = Catalog {
            version: header.version,
            language: header.language,
            source_language: header.source_language,
            contexts: self.contexts,
        };
        (catalog, self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::lookup::Translator;
    use rstest::rstest;

    fn document(version: &str, body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n\
             <TS version=\"{version}\" language=\"zh\" sourcelanguage=\"en\">\n{body}</TS>\n"
        )
    }

    #[rstest]
    fn test_parse_header_and_messages() {
        // Arrange
        let xml = document(
            "2.1",
            r#"<context>
    <name>SplashScreen</name>
    <message>
        <location filename="../../main_window/splash_screen.ui" line="14"/>
        <source>Configure</source>
        <translation>配置</translation>
    </message>
</context>
"#,
        );

        // Act
        let catalog = parse_ts(&xml).unwrap();

        // Assert
        assert_eq!(catalog.version, "2.1");
        assert_eq!(catalog.language.as_deref(), Some("zh"));
        assert_eq!(catalog.source_language.as_deref(), Some("en"));
        let context = catalog.context("SplashScreen").unwrap();
        assert_eq!(context.messages.len(), 1);
        let message = &context.messages[0];
        assert_eq!(message.source, "Configure");
        assert_eq!(message.translation, "配置");
        assert_eq!(message.state, CompletionState::Finished);
        assert_eq!(
            message.locations,
            vec![Location {
                filename: Some("../../main_window/splash_screen.ui".to_string()),
                line: Some("14".to_string()),
            }]
        );
    }

    #[rstest]
    #[case("2.0")]
    #[case("2.1")]
    #[case("2.7")]
    fn test_accepts_version_2_family(#[case] version: &str) {
        let catalog = parse_ts(&document(version, "")).unwrap();
        assert_eq!(catalog.version, version);
    }

    #[rstest]
    #[case("<TS language=\"zh\"></TS>")]
    #[case("<TS version=\"3.0\"></TS>")]
    #[case("<TS version=\"2.1\"><context><name>A</name></TS>")]
    #[case("<TS version=\"2.1\"><context><name>A</name>")]
    #[case("<html version=\"2.1\"></html>")]
    #[case("")]
    fn test_format_errors(#[case] xml: &str) {
        let result = parse_ts(xml);
        assert!(
            matches!(result, Err(CatalogError::Format(_))),
            "expected format error for {xml:?}, got {result:?}"
        );
    }

    #[rstest]
    fn test_unknown_attributes_and_elements_are_ignored() {
        let xml = r#"<TS version="2.1" language="zh" future="yes">
<dependencies><dependency catalog="qtbase"/></dependencies>
<context encoding="UTF-8">
    <name>Paginator</name>
    <message id="x" future="1">
        <source>of</source>
        <userdata>whatever</userdata>
        <translation variants="no">中的</translation>
    </message>
</context>
</TS>"#;

        let catalog = parse_ts(xml).unwrap();

        assert_eq!(
            catalog.entries(),
            vec![("Paginator", "of", None, "中的", CompletionState::Finished)]
        );
    }

    #[rstest]
    fn test_text_is_preserved_verbatim() {
        // Arrange
        let xml = document(
            "2.1",
            r#"<context>
    <name>ZoneStatusPolygon</name>
    <message>
        <source>Entering: </source>
        <translation>进入： </translation>
    </message>
    <message>
        <source>You can&apos;t apply changes&lt;br&gt;{filepath} %p%</source>
        <translation>无法应用&lt;br&gt;{filepath} %p%
</translation>
    </message>
</context>
"#,
        );

        // Act
        let catalog = parse_ts(&xml).unwrap();

        // Assert
        let messages = &catalog.context("ZoneStatusPolygon").unwrap().messages;
        assert_eq!(messages[0].source, "Entering: ");
        assert_eq!(messages[0].translation, "进入： ");
        assert_eq!(
            messages[1].source,
            "You can't apply changes<br>{filepath} %p%"
        );
        assert_eq!(messages[1].translation, "无法应用<br>{filepath} %p%\n");
    }

    #[rstest]
    fn test_byte_elements_are_decoded() {
        let xml = document(
            "2.1",
            "<context><name>A</name><message><source>tab<byte value=\"x9\"/>here</source>\
             <translation>a<byte value=\"10\"/>b</translation></message></context>",
        );

        let catalog = parse_ts(&xml).unwrap();

        let message = &catalog.contexts[0].messages[0];
        assert_eq!(message.source, "tab\there");
        assert_eq!(message.translation, "a\nb");
    }

    #[rstest]
    #[case("unfinished", CompletionState::Unfinished)]
    #[case("obsolete", CompletionState::Unfinished)]
    #[case("vanished", CompletionState::Unfinished)]
    #[case("something-new", CompletionState::Finished)]
    fn test_translation_type_markers(#[case] marker: &str, #[case] expected: CompletionState) {
        let xml = document(
            "2.1",
            &format!(
                "<context><name>A</name><message><source>s</source>\
                 <translation type=\"{marker}\">t</translation></message></context>"
            ),
        );

        let catalog = parse_ts(&xml).unwrap();

        assert_eq!(catalog.contexts[0].messages[0].state, expected);
    }

    #[rstest]
    fn test_self_closing_translation_is_empty() {
        let xml = document(
            "2.1",
            "<context><name>A</name><message><source>s</source>\
             <translation type=\"unfinished\"/></message></context>",
        );

        let catalog = parse_ts(&xml).unwrap();

        let message = &catalog.contexts[0].messages[0];
        assert_eq!(message.translation, "");
        assert_eq!(message.state, CompletionState::Unfinished);
    }

    #[rstest]
    fn test_comments_are_part_of_the_key() {
        let xml = document(
            "2.1",
            r#"<context>
    <name>IdentityInfo</name>
    <message>
        <source>Unique Name:</source>
        <comment>Before setting</comment>
        <translation>唯一名称：</translation>
    </message>
    <message>
        <source>Unique Name:</source>
        <comment>After setting</comment>
        <translation>唯一名称（已设置）：</translation>
    </message>
    <message>
        <source>Nickname:</source>
        <comment></comment>
        <extracomment>Shown in the identity panel</extracomment>
        <translatorcomment>Keep short</translatorcomment>
        <translation>昵称：</translation>
    </message>
</context>
"#,
        );

        let catalog = parse_ts(&xml).unwrap();

        let messages = &catalog.context("IdentityInfo").unwrap().messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].comment.as_deref(), Some("Before setting"));
        assert_eq!(messages[1].comment.as_deref(), Some("After setting"));
        assert_eq!(messages[2].comment, None);
        assert_eq!(
            messages[2].extra_comment.as_deref(),
            Some("Shown in the identity panel")
        );
        assert_eq!(messages[2].translator_comment.as_deref(), Some("Keep short"));
    }

    #[rstest]
    fn test_numerus_forms() {
        let xml = document(
            "2.1",
            r#"<context>
    <name>IdentitySearch</name>
    <message numerus="yes">
        <source>%n identities found</source>
        <translation>
            <numerusform>找到 %n 个身份</numerusform>
        </translation>
    </message>
</context>
"#,
        );

        let catalog = parse_ts(&xml).unwrap();

        let message = &catalog.contexts[0].messages[0];
        assert!(message.numerus);
        assert_eq!(message.numerus_forms, vec!["找到 %n 个身份".to_string()]);
        assert_eq!(message.translation, "找到 %n 个身份");
    }

    #[rstest]
    fn test_missing_source_is_dropped_and_reported() {
        // Arrange
        let xml = document(
            "2.1",
            "<context><name>A</name>\
             <message><translation>orphan</translation></message>\
             <message><source>kept</source><translation>留</translation></message>\
             </context>\
             <context><message><source>x</source></message></context>",
        );

        // Act
        let (catalog, report) = CatalogLoader::new(MissingFieldPolicy::Drop)
            .load_str_with_report(&xml)
            .unwrap();

        // Assert
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.contexts[0].messages.len(), 1);
        assert_eq!(
            report.issues,
            vec![
                ValidationIssue {
                    context: Some("A".to_string()),
                    kind: IssueKind::MessageWithoutSource,
                },
                ValidationIssue {
                    context: None,
                    kind: IssueKind::ContextWithoutName,
                },
            ]
        );
    }

    #[rstest]
    fn test_missing_source_rejected_in_strict_mode() {
        let xml = document(
            "2.1",
            "<context><name>A</name><message><translation>orphan</translation></message></context>",
        );

        let result = CatalogLoader::new(MissingFieldPolicy::Reject).load_str(&xml);

        match result {
            Err(CatalogError::Validation(issue)) => {
                assert_eq!(issue.kind, IssueKind::MessageWithoutSource)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[rstest]
    fn test_duplicate_key_keeps_first() {
        let xml = document(
            "2.1",
            "<context><name>A</name>\
             <message><source>s</source><translation>first</translation></message>\
             <message><source>s</source><translation>second</translation></message>\
             </context>\
             <context><name>A</name>\
             <message><source>t</source><translation>merged</translation></message>\
             </context>",
        );

        let (catalog, report) = CatalogLoader::default().load_str_with_report(&xml).unwrap();

        assert_eq!(
            catalog.entries(),
            vec![
                ("A", "s", None, "first", CompletionState::Finished),
                ("A", "t", None, "merged", CompletionState::Finished),
            ]
        );
        assert_eq!(report.issues.len(), 2);
        assert!(matches!(
            report.issues[0].kind,
            IssueKind::DuplicateKey { .. }
        ));
        assert_eq!(report.issues[1].kind, IssueKind::DuplicateContext);
    }

    #[rstest]
    fn test_duplicate_key_rejected_in_strict_mode() {
        let xml = document(
            "2.1",
            "<context><name>A</name>\
             <message><source>s</source><translation>first</translation></message>\
             <message><source>s</source><translation>second</translation></message>\
             </context>",
        );

        let result = CatalogLoader::new(MissingFieldPolicy::Reject).load_str(&xml);

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[rstest]
    fn test_blank_finished_translation_is_kept() {
        let xml = document(
            "2.1",
            "<context><name>VideoThumbnailView</name><message>\
             <source>Inconsistent state with alert widgets.</source>\
             <translation></translation></message></context>",
        );

        let (catalog, report) = CatalogLoader::default().load_str_with_report(&xml).unwrap();

        let message = &catalog.contexts[0].messages[0];
        assert!(message.is_finished());
        assert_eq!(message.translation, "");
        assert_eq!(report.blank_translations, 1);
        assert!(report.issues.is_empty());
    }

    #[rstest]
    fn test_empty_context_is_legal() {
        let xml = document("2.1", "<context><name>Empty</name></context>");

        let catalog = parse_ts(&xml).unwrap();

        assert_eq!(catalog.contexts.len(), 1);
        assert!(catalog.contexts[0].messages.is_empty());
    }

    #[rstest]
    fn test_loading_twice_is_identical() {
        let xml = document(
            "2.0",
            "<context><name>A</name><message><source>s</source>\
             <translation type=\"unfinished\"></translation></message></context>",
        );

        assert_eq!(parse_ts(&xml).unwrap(), parse_ts(&xml).unwrap());
    }

    #[rstest]
    fn test_crlf_line_endings_resolve_through_lf_keys() {
        // Arrange
        let xml = "<TS version=\"2.1\">\r\n<context>\r\n    <name>AddNewIdentitiesWorker</name>\r\n\
                   <message>\r\n        <source>Unable to parse this directory!\r\n\r\nReason:\r\n{}</source>\r\n\
                   <translation>无法解析此目录\r\n\r原因：\r\n{}</translation>\r\n\
                   </message>\r\n</context>\r\n</TS>\r\n";

        // Act
        let translator = Translator::new(parse_ts(xml).unwrap());

        // Assert
        let display = translator
            .resolve(
                "AddNewIdentitiesWorker",
                "Unable to parse this directory!\n\nReason:\n{}",
                None,
            )
            .unwrap();
        assert_eq!(display.text, "无法解析此目录\n\n原因：\n{}");
    }

    #[rstest]
    fn test_carriage_return_reference_is_kept() {
        let xml = document(
            "2.1",
            "<context><name>A</name><message><source>a&#xd;\r\nb</source>\
             <translation><![CDATA[x\r\ny]]></translation></message></context>",
        );

        let catalog = parse_ts(&xml).unwrap();

        let message = &catalog.contexts[0].messages[0];
        assert_eq!(message.source, "a\r\nb");
        assert_eq!(message.translation, "x\ny");
    }

    #[rstest]
    fn test_byte_order_mark_is_skipped() {
        let xml = format!("\u{feff}{}", document("2.1", ""));
        assert!(parse_ts(&xml).is_ok());
    }
}
