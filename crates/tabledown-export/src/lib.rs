//! # tabledown-export
//!
//! Save the rendered preview of a note as a Markdown file.
//!
//! The host hands over a snapshot of its active view ([`MarkdownView`]); the
//! exporter checks the view is in preview mode, strips the header decoration,
//! converts the preview section with [`tabledown::TableAwareConverter`] and
//! writes the result to the [`Vault`]. [`PreviewExporter::run`] turns any
//! outcome into a single [`Notice`] for the user.
//!
//! ```rust,no_run
//! use tabledown::parse_html;
//! use tabledown_export::{Command, ExportSettings, FsVault, MarkdownView, PreviewExporter};
//!
//! # async fn demo() {
//! let exporter = PreviewExporter::new(ExportSettings::default(), FsVault::new("vault"));
//! let view = MarkdownView::preview(
//!     "Daily.md",
//!     parse_html(r#"<div class="markdown-preview-section"><p>Hi</p></div>"#),
//! );
//! let notice = exporter.run(Command::SaveRenderedMarkdown, Some(&view)).await;
//! println!("{notice}");
//! # }
//! ```

mod error;
mod export;
mod notice;
mod settings;
mod vault;
mod view;

pub use error::{ExportError, SettingsError};
pub use export::{Command, ExportReport, PreviewExporter, Rendered, WriteKind};
pub use notice::{Notice, NoticeKind};
pub use settings::ExportSettings;
pub use vault::{FsVault, Vault, VaultPath};
pub use view::{MarkdownView, ViewMode};
