use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Records that can be written to CSV and laid out for PDF.
pub trait Exportable {
    /// Used in file names and banners, e.g. `Athletes`.
    const SUBJECT: &'static str;

    fn csv_headers() -> Vec<&'static str>;
    fn csv_row(&self) -> Vec<String>;

    fn block_title(&self) -> String;
    /// `label: value` lines for the PDF block.
    fn pdf_block(&self) -> Vec<(String, String)>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn from_records<'a, T, I>(records: I) -> Self
    where
        T: Exportable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Self {
            headers: T::csv_headers().into_iter().map(String::from).collect(),
            rows: records.into_iter().map(T::csv_row).collect(),
        }
    }
}

/// RFC 4180 output: fields holding the delimiter, quotes or newlines are quoted.
pub fn csv_bytes(table: &CsvTable, delimiter: u8) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv buffer: {err}"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Text { x: f64, y: f64, size: f64, text: String },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PdfPage {
    pub commands: Vec<DrawCommand>,
}

impl PdfPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Page geometry in points, top-left origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PdfLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub line_height: f64,
    pub banner_height: f64,
    pub block_gap: f64,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 40.0,
            line_height: 16.0,
            banner_height: 64.0,
            block_gap: 10.0,
        }
    }
}

const TITLE_SIZE: f64 = 18.0;
const HEADING_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 10.0;

pub struct PdfBlock {
    pub title: String,
    pub lines: Vec<(String, String)>,
}

impl PdfLayout {
    fn bottom(&self) -> f64 {
        self.page_height - self.margin
    }

    /// Banner on the first page, then one block per record. A block that
    /// fits on a fresh page is never split.
    pub fn layout(&self, title: &str, subtitle: &str, blocks: &[PdfBlock]) -> Vec<PdfPage> {
        let mut pages = vec![PdfPage::default()];
        let banner = &mut pages[0].commands;
        banner.push(DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            w: self.page_width,
            h: self.banner_height,
        });
        banner.push(DrawCommand::Text {
            x: self.margin,
            y: self.banner_height * 0.45,
            size: TITLE_SIZE,
            text: title.to_string(),
        });
        banner.push(DrawCommand::Text {
            x: self.margin,
            y: self.banner_height * 0.8,
            size: BODY_SIZE,
            text: subtitle.to_string(),
        });

        let mut cursor = self.banner_height + self.margin;
        let fresh_room = self.bottom() - self.margin;

        for block in blocks {
            let height = (block.lines.len() + 1) as f64 * self.line_height;
            if cursor + height > self.bottom() && height <= fresh_room {
                pages.push(PdfPage::default());
                cursor = self.margin;
            }

            let heading = std::iter::once((HEADING_SIZE, block.title.clone()));
            let body = block
                .lines
                .iter()
                .map(|(label, value)| (BODY_SIZE, format!("{label}: {value}")));

            for (size, text) in heading.chain(body) {
                if cursor + self.line_height > self.bottom() {
                    pages.push(PdfPage::default());
                    cursor = self.margin;
                }
                if let Some(page) = pages.last_mut() {
                    page.commands.push(DrawCommand::Text {
                        x: self.margin,
                        y: cursor,
                        size,
                        text,
                    });
                }
                cursor += self.line_height;
            }

            if let Some(page) = pages.last_mut() {
                page.commands.push(DrawCommand::Line {
                    x1: self.margin,
                    y1: cursor,
                    x2: self.page_width - self.margin,
                    y2: cursor,
                });
            }
            cursor += self.block_gap;
        }

        pages
    }
}

pub fn pdf_blocks<'a, T, I>(records: I) -> Vec<PdfBlock>
where
    T: Exportable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .map(|record| PdfBlock {
            title: record.block_title(),
            lines: record.pdf_block(),
        })
        .collect()
}

/// `<Subject>_<YYYY-MM-DD>.<ext>`
pub fn export_file_name(subject: &str, date: NaiveDate, ext: &str) -> String {
    let subject: String = subject
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{subject}_{}.{ext}", date.format("%Y-%m-%d"))
}

/// Where finished exports go.
pub trait ExportSink {
    fn write_csv(&mut self, name: &str, table: &CsvTable) -> anyhow::Result<()>;
    fn write_pdf(&mut self, name: &str, pages: &[PdfPage]) -> anyhow::Result<()>;
    fn write_report(&mut self, name: &str, markdown: &str) -> anyhow::Result<()>;
}

/// Writes exports into a directory. PDF pages are stored as the JSON draw
/// command list consumed by the PDF builder.
pub struct DirectorySink {
    dir: PathBuf,
    delimiter: u8,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            dir: dir.into(),
            delimiter,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "export written");
        self.written.push(path);
        Ok(())
    }
}

impl ExportSink for DirectorySink {
    fn write_csv(&mut self, name: &str, table: &CsvTable) -> anyhow::Result<()> {
        let bytes = csv_bytes(table, self.delimiter)?;
        self.write(name, &bytes)
    }

    fn write_pdf(&mut self, name: &str, pages: &[PdfPage]) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(pages).context("failed to serialize pdf layout")?;
        self.write(name, &json)
    }

    fn write_report(&mut self, name: &str, markdown: &str) -> anyhow::Result<()> {
        self.write(name, markdown.as_bytes())
    }
}

/// Keeps artifacts in memory, keyed by file name.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub delimiter: Option<u8>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub pages: BTreeMap<String, Vec<PdfPage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.files
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl ExportSink for MemorySink {
    fn write_csv(&mut self, name: &str, table: &CsvTable) -> anyhow::Result<()> {
        let bytes = csv_bytes(table, self.delimiter.unwrap_or(b','))?;
        self.files.insert(name.to_string(), bytes);
        Ok(())
    }

    fn write_pdf(&mut self, name: &str, pages: &[PdfPage]) -> anyhow::Result<()> {
        self.pages.insert(name.to_string(), pages.to_vec());
        Ok(())
    }

    fn write_report(&mut self, name: &str, markdown: &str) -> anyhow::Result<()> {
        self.files
            .insert(name.to_string(), markdown.as_bytes().to_vec());
        Ok(())
    }
}
