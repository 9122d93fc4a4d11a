//! Synthetic PDFs for integration tests.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One line of text: content and font size in points.
pub type Line<'a> = (&'a str, i64);

/// Build a PDF where every line is its own text object in Courier.
pub fn build_pdf(pages: &[&[Line]]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        let mut y: i64 = 750;
        for &(text, size) in lines.iter() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
            operations.push(Operation::new("Td", vec![72.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
            operations.push(Operation::new("ET", vec![]));
            y -= size + 20;
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a synthetic PDF to `path`.
pub fn write_pdf(path: &Path, pages: &[&[Line]]) {
    build_pdf(pages).save(path).unwrap();
}

/// Serialize a synthetic PDF into memory.
pub fn pdf_bytes(pages: &[&[Line]]) -> Vec<u8> {
    let mut bytes = Vec::new();
    build_pdf(pages).save_to(&mut bytes).unwrap();
    bytes
}

/// The one-page document with a title, two sections and their bodies.
pub const TWO_SECTIONS: &[Line] = &[
    ("Big Title", 24),
    ("Section One", 18),
    ("This is body text.", 12),
    ("Section Two", 18),
    ("More body.", 12),
];
