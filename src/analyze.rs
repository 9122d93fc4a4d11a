//! Batch analysis: outlines for every document, then ranking and the report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::detect::has_pdf_extension;
use crate::error::Result;
use crate::model::{
    AnalysisRequest, DocumentOutline, Outline, PageText, ScoredSection, SubSectionHit,
};
use crate::outline::{build_outline, HeadingRules};
use crate::parser::{LopdfTextLayer, ParseOptions, TextLayer};
use crate::rank::{
    EncodedQuery, Embedder, HashingEmbedder, RankOptions, RelevanceScorer, SentenceSegmenter,
    SubSectionExtractor, UnicodeSentenceSegmenter,
};
use crate::render::{FailedDocument, Report, ReportMetadata};

/// Runs the whole pipeline over a set of documents.
///
/// # Example
///
/// ```no_run
/// use docrank::{AnalysisRequest, Analyzer};
///
/// let report = Analyzer::new()
///     .sequential()
///     .analyze(&["report.pdf"], &AnalysisRequest::default())?;
/// println!("{} sections ranked", report.extracted_sections.len());
/// # Ok::<(), docrank::Error>(())
/// ```
pub struct Analyzer {
    text_layer: Box<dyn TextLayer>,
    embedder: Box<dyn Embedder>,
    segmenter: Box<dyn SentenceSegmenter>,
    heading_rules: HeadingRules,
    rank_options: RankOptions,
    parallel: bool,
}

impl Analyzer {
    /// Analyzer with the lopdf text layer and the hashing embedder.
    pub fn new() -> Self {
        Self {
            text_layer: Box::new(LopdfTextLayer::new()),
            embedder: Box::new(HashingEmbedder::new()),
            segmenter: Box::new(UnicodeSentenceSegmenter),
            heading_rules: HeadingRules::default(),
            rank_options: RankOptions::default(),
            parallel: true,
        }
    }

    /// Replace the source of text lines.
    pub fn with_text_layer(mut self, text_layer: impl TextLayer + 'static) -> Self {
        self.text_layer = Box::new(text_layer);
        self
    }

    /// Replace the embedding backend.
    pub fn with_embedder(mut self, embedder: impl Embedder + 'static) -> Self {
        self.embedder = Box::new(embedder);
        self
    }

    /// Use an already boxed embedding backend.
    pub fn with_boxed_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    /// Replace the sentence segmenter.
    pub fn with_segmenter(mut self, segmenter: impl SentenceSegmenter + 'static) -> Self {
        self.segmenter = Box::new(segmenter);
        self
    }

    pub fn with_heading_rules(mut self, rules: HeadingRules) -> Self {
        self.heading_rules = rules;
        self
    }

    /// Replace the ranking limits. The analyzer's own parallelism setting is kept.
    pub fn with_rank_options(mut self, options: RankOptions) -> Self {
        self.rank_options = options.with_parallel(self.parallel);
        self
    }

    /// Use the lopdf text layer with custom parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parallel = options.parallel;
        self.rank_options = self.rank_options.with_parallel(options.parallel);
        self.text_layer = Box::new(LopdfTextLayer::with_options(options));
        self
    }

    /// Process documents one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self.rank_options = self.rank_options.with_parallel(false);
        self
    }

    pub fn heading_rules(&self) -> &HeadingRules {
        &self.heading_rules
    }

    pub fn rank_options(&self) -> &RankOptions {
        &self.rank_options
    }

    /// Outline of one document.
    pub fn outline(&self, path: impl AsRef<Path>) -> Result<Outline> {
        let path = path.as_ref();
        let pages = self.text_layer.open(path)?;
        let outline = self.outline_pages(&pages);
        log::debug!(
            "{}: {} pages, {} sections",
            path.display(),
            pages.len(),
            outline.len()
        );
        Ok(outline)
    }

    /// Outline of already extracted pages.
    pub fn outline_pages(&self, pages: &[PageText]) -> Outline {
        build_outline(pages, &self.heading_rules)
    }

    /// Outlines of many documents, in input order. Failures are collected, not raised.
    pub fn outlines<P>(&self, paths: &[P]) -> (Vec<DocumentOutline>, Vec<FailedDocument>)
    where
        P: AsRef<Path> + Sync,
    {
        let extract = |path: &P| {
            let path = path.as_ref();
            (document_name(path), self.outline(path))
        };
        let results: Vec<(String, Result<Outline>)> = if self.parallel {
            paths.par_iter().map(extract).collect()
        } else {
            paths.iter().map(extract).collect()
        };

        let mut outlines = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (document, result) in results {
            match result {
                Ok(outline) => outlines.push(DocumentOutline::new(document, outline)),
                Err(e) => {
                    log::warn!("Skipping {}: {}", document, e);
                    failed.push(FailedDocument {
                        document,
                        error: e.to_string(),
                    });
                }
            }
        }
        (outlines, failed)
    }

    /// Analyze the given documents for a persona and task.
    pub fn analyze<P>(&self, paths: &[P], request: &AnalysisRequest) -> Result<Report>
    where
        P: AsRef<Path> + Sync,
    {
        let start = Instant::now();
        let query = EncodedQuery::encode(request.query(), self.embedder.as_ref())?;

        let (outlines, failed) = self.outlines(paths);
        let (ranked, hits) = self.rank(&outlines, &query)?;

        let input_documents = paths.iter().map(|p| document_name(p.as_ref())).collect();
        let metadata = ReportMetadata::new(
            input_documents,
            request.persona.clone(),
            request.job_to_be_done.clone(),
        )
        .with_failures(failed)
        .finish(start.elapsed());

        let report = Report::new(metadata, &ranked, &hits);
        log::info!(
            "Analyzed {} documents ({} failed): {} sections, {} sub-sections in {:.2}s",
            report.metadata.input_documents.len(),
            report.metadata.failed_documents.len(),
            report.extracted_sections.len(),
            report.sub_section_analysis.len(),
            report.metadata.processing_time_seconds
        );
        Ok(report)
    }

    /// Analyze every PDF in `dir` with the request from its `persona.json`.
    pub fn analyze_dir(&self, dir: impl AsRef<Path>) -> Result<Report> {
        let dir = dir.as_ref();
        let request = AnalysisRequest::load_or_default(dir)?;
        let paths = collect_pdfs(dir)?;
        log::info!("Found {} PDF files in {}", paths.len(), dir.display());
        self.analyze(&paths, &request)
    }

    /// Rank sections across documents, then mine the best ones for sentences.
    pub fn rank(
        &self,
        outlines: &[DocumentOutline],
        query: &EncodedQuery,
    ) -> Result<(Vec<ScoredSection>, Vec<SubSectionHit>)> {
        let ranked = RelevanceScorer::new(self.embedder.as_ref())
            .with_parallel(self.parallel)
            .score(outlines, query)?;
        let hits = SubSectionExtractor::new(self.embedder.as_ref(), self.segmenter.as_ref())
            .with_options(self.rank_options)
            .extract(&ranked, query)?;
        Ok((ranked, hits))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// PDF files directly inside `dir`, sorted by file name.
pub fn collect_pdfs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// File name used to identify a document in reports.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{HeadingLevel, TextLine};
    use crate::rank::Embedding;
    use std::collections::HashMap;

    /// Serves fixed pages by file name.
    struct FixtureLayer(HashMap<String, Vec<PageText>>);

    impl TextLayer for FixtureLayer {
        fn open(&self, path: &Path) -> Result<Vec<PageText>> {
            self.0
                .get(&document_name(path))
                .cloned()
                .ok_or_else(|| Error::Corrupted(format!("cannot read {}", path.display())))
        }
    }

    struct KeywordEmbedder(Vec<&'static str>);

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    self.0
                        .iter()
                        .map(|k| lower.matches(k).count() as f32)
                        .collect()
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }
    }

    fn page(number: u32, lines: &[(&str, f32)]) -> PageText {
        PageText {
            number,
            lines: lines
                .iter()
                .map(|&(text, size)| TextLine::uniform(text, number, size))
                .collect(),
        }
    }

    fn fixtures() -> FixtureLayer {
        let mut docs = HashMap::new();
        docs.insert(
            "report.pdf".to_string(),
            vec![
                page(
                    1,
                    &[
                        ("Big Title", 24.0),
                        ("Section One", 18.0),
                        ("This is body text.", 12.0),
                    ],
                ),
                page(2, &[("Section Two", 18.0), ("More body.", 12.0)]),
            ],
        );
        docs.insert(
            "other.pdf".to_string(),
            vec![page(1, &[("Notes", 20.0), ("Two items", 14.0), ("Body two.", 10.0)])],
        );
        FixtureLayer(docs)
    }

    fn analyzer() -> Analyzer {
        Analyzer::new()
            .with_text_layer(fixtures())
            .with_embedder(KeywordEmbedder(vec!["two", "one", "body"]))
            .sequential()
    }

    #[test]
    fn test_outline_through_text_layer() {
        let outline = analyzer().outline("report.pdf").unwrap();
        assert_eq!(outline.title, "Big Title");
        assert_eq!(outline.len(), 2);
        assert!(outline.sections.iter().all(|s| s.level == HeadingLevel::H1));
    }

    #[test]
    fn test_failed_document_is_isolated() {
        let request = AnalysisRequest::default();
        let report = analyzer()
            .analyze(&["report.pdf", "broken.pdf", "other.pdf"], &request)
            .unwrap();

        assert_eq!(
            report.metadata.input_documents,
            vec!["report.pdf", "broken.pdf", "other.pdf"]
        );
        assert_eq!(report.metadata.failed_documents.len(), 1);
        assert_eq!(report.metadata.failed_documents[0].document, "broken.pdf");
        assert_eq!(report.extracted_sections.len(), 3);
    }

    #[test]
    fn test_ranking_follows_query() {
        let request = AnalysisRequest::from_json_str(
            r#"{"persona": {"role_description": "Reader", "focus_areas": ["section two"]},
                "job_to_be_done": {"task": "find two"}}"#,
        )
        .unwrap();
        let report = analyzer().analyze(&["report.pdf"], &request).unwrap();

        let titles: Vec<_> = report
            .extracted_sections
            .iter()
            .map(|s| s.section_title.as_str())
            .collect();
        assert_eq!(titles, vec!["Section Two", "Section One"]);
        assert_eq!(report.extracted_sections[0].page_number, 2);
        assert_eq!(report.extracted_sections[0].importance_rank, 1);
        assert_eq!(report.extracted_sections[1].importance_rank, 2);

        let sentences: Vec<_> = report
            .sub_section_analysis
            .iter()
            .map(|h| h.refined_text.as_str())
            .collect();
        assert_eq!(sentences.len(), 2);
        assert!(sentences.contains(&"This is body text."));
        assert!(sentences.contains(&"More body."));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let request = AnalysisRequest::default();
        let paths = ["report.pdf", "other.pdf", "report.pdf"];
        let sequential = analyzer().analyze(&paths, &request).unwrap();
        let parallel = Analyzer::new()
            .with_text_layer(fixtures())
            .with_embedder(KeywordEmbedder(vec!["two", "one", "body"]))
            .analyze(&paths, &request)
            .unwrap();
        assert_eq!(sequential.extracted_sections, parallel.extracted_sections);
        assert_eq!(sequential.sub_section_analysis, parallel.sub_section_analysis);
    }

    #[test]
    fn test_collect_pdfs_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "persona.json", "c.Pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<_> = collect_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| document_name(p))
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn test_analyze_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let report = Analyzer::new().analyze_dir(dir.path()).unwrap();
        assert!(report.metadata.input_documents.is_empty());
        assert!(report.extracted_sections.is_empty());
        assert!(report.sub_section_analysis.is_empty());
        assert_eq!(report.metadata.persona.role_description, "Investment Analyst");
    }

    /// Keyword embedder that logs every text it is asked to embed.
    struct RecordingEmbedder {
        inner: KeywordEmbedder,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl Embedder for RecordingEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            self.seen
                .lock()
                .unwrap()
                .extend(texts.iter().map(|t| t.to_string()));
            self.inner.embed(texts)
        }

        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }
    }

    #[test]
    fn test_query_is_embedded_once_per_run() {
        let embedder = std::sync::Arc::new(RecordingEmbedder {
            inner: KeywordEmbedder(vec!["two", "one", "body"]),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let request = AnalysisRequest::default();
        let query = request.query().as_str().to_string();

        let report = Analyzer::new()
            .with_text_layer(fixtures())
            .with_boxed_embedder(Box::new(SharedEmbedder(embedder.clone())))
            .analyze(&["report.pdf", "other.pdf"], &request)
            .unwrap();
        assert_eq!(report.extracted_sections.len(), 3);

        let seen = embedder.seen.lock().unwrap();
        assert_eq!(seen.iter().filter(|t| **t == query).count(), 1);
        assert_eq!(seen[0], query);
        // Three section titles and the sentences of their bodies follow the query.
        assert!(seen.len() > 4);
    }

    struct SharedEmbedder(std::sync::Arc<RecordingEmbedder>);

    impl Embedder for SharedEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            self.0.embed(texts)
        }

        fn dimensions(&self) -> usize {
            self.0.dimensions()
        }
    }

    #[test]
    fn test_rank_options_keep_sequential_setting() {
        let analyzer = Analyzer::new()
            .sequential()
            .with_rank_options(RankOptions::new().with_max_sub_sections(3));
        assert!(!analyzer.rank_options().parallel);
        assert_eq!(analyzer.rank_options().max_sub_sections, 3);

        let parallel = Analyzer::new().with_rank_options(RankOptions::new().with_parallel(false));
        assert!(parallel.rank_options().parallel);
    }
}
