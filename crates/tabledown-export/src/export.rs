//! The export commands.
//!
//! Both commands only run against a view in preview mode. Everything up to
//! the write is synchronous; the write is the single awaited step.

use tabledown::{TableAwareConverter, TurndownError, TurndownOptions};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::error::ExportError;
use crate::notice::Notice;
use crate::settings::ExportSettings;
use crate::vault::{Vault, VaultPath};
use crate::view::MarkdownView;

/// User-invokable commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Convert the rendered view to Markdown and replace the output file
    SaveRenderedMarkdown,
    /// Append the rendered view's plain text to the output file
    CopyRenderedText,
}

impl Command {
    pub fn id(&self) -> &'static str {
        match self {
            Command::SaveRenderedMarkdown => "save-rendered-markdown",
            Command::CopyRenderedText => "copy-rendered-text",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SaveRenderedMarkdown => "Save rendered view as Markdown",
            Command::CopyRenderedText => "Copy rendered text to file",
        }
    }
}

/// Markdown produced from a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markdown: String,
    /// False when the preview section was missing or empty
    pub content_found: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Created,
    Overwritten,
    Appended,
}

/// What a successful export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: String,
    pub bytes: usize,
    pub kind: WriteKind,
    pub content_found: bool,
}

/// Runs the export commands against a vault
pub struct PreviewExporter<V> {
    converter: TableAwareConverter,
    settings: ExportSettings,
    vault: V,
}

impl<V: Vault> PreviewExporter<V> {
    pub fn new(settings: ExportSettings, vault: V) -> Self {
        let converter = TableAwareConverter::with_options(TurndownOptions::from(&settings));
        Self {
            converter,
            settings,
            vault,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Convert the preview section of `view` to Markdown.
    ///
    /// A missing or empty preview section is not an error: the result is
    /// empty and `content_found` is false.
    pub fn render_markdown(&self, view: Option<&MarkdownView>) -> Result<Rendered, ExportError> {
        let view = require_preview(view)?;

        let Some(section) = view.content.find_by_class(&self.settings.section_class) else {
            warn!(class = %self.settings.section_class, "preview section not found");
            return Ok(Rendered {
                markdown: String::new(),
                content_found: false,
            });
        };

        let mut section = section.clone();
        if section
            .remove_first_by_class(&self.settings.header_class)
            .is_some()
        {
            debug!(class = %self.settings.header_class, "stripped header decoration");
        }

        match self.converter.convert(&section.inner_fragment()) {
            Ok(markdown) => Ok(Rendered {
                markdown,
                content_found: true,
            }),
            Err(TurndownError::EmptyInput) => {
                warn!("preview section is empty");
                Ok(Rendered {
                    markdown: String::new(),
                    content_found: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Save the rendered view as Markdown, replacing any earlier export.
    pub async fn save_rendered_markdown(
        &self,
        view: Option<&MarkdownView>,
    ) -> Result<ExportReport, ExportError> {
        let rendered = self.render_markdown(view)?;
        let path = VaultPath::parse(&self.settings.output_path)?;

        let existed = self
            .vault
            .exists(&path)
            .await
            .map_err(|source| persistence(&path, source))?;
        self.vault
            .write(&path, &rendered.markdown)
            .await
            .map_err(|source| persistence(&path, source))?;

        let report = ExportReport {
            path: path.to_string(),
            bytes: rendered.markdown.len(),
            kind: if existed {
                WriteKind::Overwritten
            } else {
                WriteKind::Created
            },
            content_found: rendered.content_found,
        };
        info!(path = %report.path, bytes = report.bytes, "saved rendered markdown");
        Ok(report)
    }

    /// Append the view's rendered text under the copied-text heading,
    /// creating the output file on first use.
    pub async fn copy_rendered_text(
        &self,
        view: Option<&MarkdownView>,
    ) -> Result<ExportReport, ExportError> {
        let view = require_preview(view)?;
        let text = view.content.text_content();
        let path = VaultPath::parse(&self.settings.output_path)?;
        let heading = &self.settings.copied_text_heading;

        let existed = self
            .vault
            .exists(&path)
            .await
            .map_err(|source| persistence(&path, source))?;

        let (contents, kind) = if existed {
            let current = self
                .vault
                .read(&path)
                .await
                .map_err(|source| persistence(&path, source))?;
            (format!("{current}\n\n{heading}\n{text}"), WriteKind::Appended)
        } else {
            (format!("{heading}\n{text}"), WriteKind::Created)
        };

        self.vault
            .write(&path, &contents)
            .await
            .map_err(|source| persistence(&path, source))?;

        let report = ExportReport {
            path: path.to_string(),
            bytes: contents.len(),
            kind,
            content_found: !text.trim().is_empty(),
        };
        info!(path = %report.path, bytes = report.bytes, kind = ?report.kind, "copied rendered text");
        Ok(report)
    }

    /// Run a command and describe the outcome in one notice.
    ///
    /// This is the command callback: no error escapes it.
    pub async fn run(&self, command: Command, view: Option<&MarkdownView>) -> Notice {
        let span = info_span!("command", id = command.id());
        async move {
            let result = match command {
                Command::SaveRenderedMarkdown => self.save_rendered_markdown(view).await,
                Command::CopyRenderedText => self.copy_rendered_text(view).await,
            };

            match result {
                Ok(report) => success_notice(command, &report),
                Err(err) => {
                    if err.is_precondition() {
                        warn!(%err, "command not run");
                    } else {
                        error!(%err, "command failed");
                    }
                    Notice::from(&err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn require_preview(view: Option<&MarkdownView>) -> Result<&MarkdownView, ExportError> {
    let view = view
        .filter(|v| v.file.is_some())
        .ok_or(ExportError::NoActiveDocument)?;
    if !view.is_preview() {
        return Err(ExportError::NotInPreviewMode);
    }
    Ok(view)
}

fn persistence(path: &VaultPath, source: std::io::Error) -> ExportError {
    ExportError::Persistence {
        path: path.to_string(),
        source,
    }
}

fn success_notice(command: Command, report: &ExportReport) -> Notice {
    match (command, report.kind) {
        (Command::SaveRenderedMarkdown, _) if !report.content_found => Notice::warning(format!(
            "No rendered content found; saved an empty {}",
            report.path
        )),
        (Command::SaveRenderedMarkdown, _) => {
            Notice::success(format!("Rendered view saved to {}", report.path))
        }
        (Command::CopyRenderedText, WriteKind::Appended) => {
            Notice::success(format!("Rendered text appended to {}", report.path))
        }
        (Command::CopyRenderedText, _) => {
            Notice::success(format!("Rendered text saved to {}", report.path))
        }
    }
}
