#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;
use std::sync::{Arc, Mutex};

use pdf_summarizer::model::{GenerationParams, ModelError, SummarizationModel};
use pdf_summarizer::resources::Resources;
use pdf_summarizer::stopwords::Stopwords;
use pdf_summarizer::visualize::load_font;

/// Writes a PDF with one Courier text line per page.
pub fn write_pdf(path: &Path, pages: &[&str]) {
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

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![36.into(), 740.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
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
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Deterministic stand-in for the summarization model
pub struct ScriptedModel {
    reply: String,
    pub inputs: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl SummarizationModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError> {
        assert_eq!(*params, GenerationParams::SUMMARY);
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(self.reply.clone())
    }
}

pub fn resources_with(model: Arc<dyn SummarizationModel>) -> Arc<Resources> {
    let font = load_font(None).expect("a font is available with the gui feature");
    Arc::new(Resources::new(model, Stopwords::english(), font))
}
