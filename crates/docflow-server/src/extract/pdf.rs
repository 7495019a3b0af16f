//! PDF extraction via lopdf: one `{page, text}` record per page.

use lopdf::Document;
use serde_json::{json, Value};
use tracing::debug;

use super::ExtractError;

pub fn parse_pages(bytes: &[u8]) -> Result<Vec<Value>, ExtractError> {
    let doc = Document::load_mem(bytes)?;

    let mut pages = Vec::new();
    for (index, page_number) in doc.get_pages().keys().enumerate() {
        // A page whose content streams cannot be decoded still yields a
        // record, with empty text, so page numbering stays contiguous.
        let text = match doc.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page = index + 1, error = %e, "No extractable text on page");
                String::new()
            },
        };
        pages.push(json!({ "page": index + 1, "text": text }));
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn one_page_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_single_page_text() {
        let bytes = one_page_pdf("Quarterly Report");
        let pages = parse_pages(&bytes).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0]["page"], 1);
        assert!(pages[0]["text"]
            .as_str()
            .unwrap()
            .contains("Quarterly Report"));
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        assert!(parse_pages(b"definitely not a pdf").is_err());
    }
}
