use tabledown::parse_html;
use tabledown_export::{
    Command, ExportError, ExportSettings, FsVault, MarkdownView, NoticeKind, PreviewExporter,
    ViewMode, WriteKind,
};
use tempfile::TempDir;

const PREVIEW: &str = r#"
<div class="markdown-preview-view">
  <div class="markdown-preview-sizer markdown-preview-section">
    <div class="mod-header"><div class="inline-title">Weekly review</div></div>
    <div><h2>Signals</h2></div>
    <div><p>Tracked <strong>daily</strong>.</p></div>
    <div>
      <table>
        <thead><tr><th>Name</th><th>Status</th></tr></thead>
        <tbody>
          <tr><td>air|ground</td><td>ok
            now</td></tr>
          <tr><td>radio</td></tr>
        </tbody>
      </table>
    </div>
  </div>
</div>
"#;

const EXPECTED: &str = "Signals\n-------\n\nTracked **daily**.\n\n\
| Name | Status |\n\
| --- | --- |\n\
| air\\|ground | ok now |\n\
| radio |  |";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn exporter(dir: &TempDir) -> PreviewExporter<FsVault> {
    init_tracing();
    PreviewExporter::new(ExportSettings::default(), FsVault::new(dir.path()))
}

fn preview_view() -> MarkdownView {
    MarkdownView::preview("Weekly review.md", parse_html(PREVIEW))
}

async fn read(dir: &TempDir, name: &str) -> String {
    tokio::fs::read_to_string(dir.path().join(name)).await.unwrap()
}

fn exists(dir: &TempDir, name: &str) -> bool {
    dir.path().join(name).exists()
}

#[tokio::test]
async fn saves_rendered_markdown_with_clean_tables() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);

    let report = exporter
        .save_rendered_markdown(Some(&preview_view()))
        .await
        .unwrap();

    assert_eq!(report.path, "output.md");
    assert_eq!(report.kind, WriteKind::Created);
    assert!(report.content_found);
    assert_eq!(read(&dir, "output.md").await, EXPECTED);
}

#[tokio::test]
async fn second_save_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);
    tokio::fs::write(dir.path().join("output.md"), "stale contents")
        .await
        .unwrap();

    let notice = exporter
        .run(Command::SaveRenderedMarkdown, Some(&preview_view()))
        .await;

    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Rendered view saved to output.md");
    assert_eq!(read(&dir, "output.md").await, EXPECTED);
}

#[tokio::test]
async fn edit_mode_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);
    let view = MarkdownView::new("Weekly review.md", ViewMode::Source, parse_html(PREVIEW));

    let notice = exporter.run(Command::SaveRenderedMarkdown, Some(&view)).await;

    assert_eq!(notice.kind, NoticeKind::Warning);
    assert!(notice.message.contains("not in preview mode"));
    assert!(!exists(&dir, "output.md"));
}

#[tokio::test]
async fn no_active_document_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);

    for command in [Command::SaveRenderedMarkdown, Command::CopyRenderedText] {
        let notice = exporter.run(command, None).await;
        assert_eq!(notice.message, "No active document");
    }
    assert!(!exists(&dir, "output.md"));
}

#[tokio::test]
async fn missing_section_saves_empty_file_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);
    let view = MarkdownView::preview("x.md", parse_html("<div class=\"other\"><p>x</p></div>"));

    let notice = exporter.run(Command::SaveRenderedMarkdown, Some(&view)).await;

    assert_eq!(notice.kind, NoticeKind::Warning);
    assert_eq!(read(&dir, "output.md").await, "");
}

#[tokio::test]
async fn copy_text_creates_then_appends() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter(&dir);
    let view = MarkdownView::preview("x.md", parse_html("<p>Hello</p>"));

    let first = exporter.copy_rendered_text(Some(&view)).await.unwrap();
    assert_eq!(first.kind, WriteKind::Created);
    assert_eq!(read(&dir, "output.md").await, "# Copied Text\nHello");

    let notice = exporter.run(Command::CopyRenderedText, Some(&view)).await;
    assert_eq!(notice.message, "Rendered text appended to output.md");
    assert_eq!(
        read(&dir, "output.md").await,
        "# Copied Text\nHello\n\n# Copied Text\nHello"
    );
}

#[tokio::test]
async fn custom_output_path_and_heading_style() {
    let dir = tempfile::tempdir().unwrap();
    init_tracing();
    let settings = ExportSettings {
        output_path: "exports/review.md".to_string(),
        heading_style: "atx".to_string(),
        ..Default::default()
    };
    let exporter = PreviewExporter::new(settings, FsVault::new(dir.path()));

    exporter
        .save_rendered_markdown(Some(&preview_view()))
        .await
        .unwrap();

    let saved = read(&dir, "exports/review.md").await;
    assert!(saved.starts_with("## Signals\n\nTracked **daily**."));
}

#[tokio::test]
async fn output_path_outside_vault_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ExportSettings {
        output_path: "../escape.md".to_string(),
        ..Default::default()
    };
    let exporter = PreviewExporter::new(settings, FsVault::new(dir.path().join("vault")));

    let err = exporter
        .save_rendered_markdown(Some(&preview_view()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::InvalidOutputPath { .. }));
    assert!(!exists(&dir, "escape.md"));
}

#[tokio::test]
async fn write_failure_is_reported_distinctly() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("blocked"), "a file, not a folder")
        .await
        .unwrap();
    let settings = ExportSettings {
        output_path: "blocked/output.md".to_string(),
        ..Default::default()
    };
    let exporter = PreviewExporter::new(settings, FsVault::new(dir.path()));

    let err = exporter
        .save_rendered_markdown(Some(&preview_view()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::Persistence { .. }));
    assert!(!err.is_precondition());

    let notice = exporter
        .run(Command::SaveRenderedMarkdown, Some(&preview_view()))
        .await;
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.message.starts_with("Failed to write blocked/output.md"));
}
