//! Implements InputPort. Inquire-based interactive catalog browser.

use crate::adapters::ui::progress::spinner;
use crate::domain::{DomainError, IntegrationDetail, IntegrationEntry};
use crate::ports::InputPort;
use crate::usecases::{CatalogService, ExportService};
use async_trait::async_trait;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::Select;
use std::fmt;
use std::sync::Arc;

/// Applies the prompt theme globally. Call once before the first prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("◆").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new("➜").with_fg(Color::LightCyan))
        .with_answered_prompt_prefix(Styled::new("✔").with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    List,
    Show,
    Export,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 4] = [
        MenuAction::List,
        MenuAction::Show,
        MenuAction::Export,
        MenuAction::Exit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::List => "List integrations",
            MenuAction::Show => "Show integration by name",
            MenuAction::Export => "Export snapshot",
            MenuAction::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// One card as a terminal line block.
pub fn format_entry(entry: &IntegrationEntry) -> String {
    let mut out = format!("■ {}", entry.name.as_deref().unwrap_or("(unnamed)"));
    if let Some(creator) = &entry.creator {
        out.push_str(&format!("  by {}", creator.name));
        if let Some(gh) = &creator.github {
            out.push_str(&format!(" (https://github.com/{})", gh));
        }
    }
    if let Some(desc) = entry.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("\n  {}", desc));
    }
    if !entry.link.is_empty() {
        out.push_str(&format!("\n  integration: {}", entry.link));
    }
    if !entry.platform.is_empty() {
        out.push_str(&format!("\n  platform:    {}", entry.platform));
    }
    out
}

pub fn format_detail(detail: &IntegrationDetail) -> String {
    let mut out = format_entry(&detail.entry);
    if let Some(image) = &detail.entry.image {
        out.push_str(&format!("\n  image:       {}", image.url));
    }
    if let Some(text) = detail.text.as_deref() {
        out.push_str("\n\n");
        out.push_str(text);
    }
    out
}

/// Cancel / Ctrl-C end the prompt without an error.
fn prompt_result<T>(res: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    catalog: Arc<CatalogService>,
    export: Arc<ExportService>,
}

impl TuiInputPort {
    pub fn new(catalog: Arc<CatalogService>, export: Arc<ExportService>) -> Self {
        Self { catalog, export }
    }

    async fn list(&self) -> Vec<IntegrationEntry> {
        let pb = spinner("Fetching integrations…");
        let entries = self.catalog.fetch_all_records().await;
        pb.finish_and_clear();
        entries
    }

    async fn show_list(&self) {
        let entries = self.list().await;
        if entries.is_empty() {
            println!("No integrations found.");
            return;
        }
        for entry in &entries {
            println!("{}\n", format_entry(entry));
        }
        println!("{} integration(s)", entries.len());
    }

    async fn show_detail(&self) -> Result<(), DomainError> {
        let names: Vec<String> = self
            .list()
            .await
            .into_iter()
            .filter_map(|e| e.name)
            .collect();
        if names.is_empty() {
            println!("No integrations found.");
            return Ok(());
        }
        let Some(name) = prompt_result(Select::new("Integration:", names).prompt())? else {
            return Ok(());
        };

        let pb = spinner(format!("Fetching {}…", name));
        let detail = self.catalog.fetch_record_by_name(&name).await;
        pb.finish_and_clear();
        match detail {
            Some(detail) => println!("{}", format_detail(&detail)),
            None => println!("Integration {:?} not found.", name),
        }
        Ok(())
    }

    async fn run_export(&self) -> Result<(), DomainError> {
        let pb = spinner("Exporting snapshot…");
        let report = self.export.export().await;
        pb.finish_and_clear();
        let report = report?;
        println!(
            "Wrote {} and {} detail file(s).",
            report.listing_path.display(),
            report.detail_paths.len()
        );
        if !report.skipped.is_empty() {
            println!("Skipped: {}", report.skipped.join(", "));
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = prompt_result(
                Select::new("What do you want to do?", MenuAction::ALL.to_vec()).prompt(),
            )?;
            match choice {
                Some(MenuAction::List) => self.show_list().await,
                Some(MenuAction::Show) => self.show_detail().await?,
                Some(MenuAction::Export) => self.run_export().await?,
                Some(MenuAction::Exit) | None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Creator, ImageReference};

    fn entry() -> IntegrationEntry {
        IntegrationEntry {
            id: "r1".to_string(),
            name: Some("Zapier".to_string()),
            description: Some("Automate NEAR".to_string()),
            image: Some(ImageReference {
                url: "https://img/z.png".to_string(),
                filename: None,
                width: None,
                height: None,
            }),
            creator: Some(Creator {
                id: "c1".to_string(),
                name: "Alice".to_string(),
                github: Some("alice".to_string()),
                image: None,
            }),
            link: "https://zap".to_string(),
            platform: "https://zapier.com".to_string(),
        }
    }

    #[test]
    fn test_format_entry() {
        let s = format_entry(&entry());
        assert!(s.starts_with("■ Zapier  by Alice (https://github.com/alice)"));
        assert!(s.contains("Automate NEAR"));
        assert!(s.contains("integration: https://zap"));
    }

    #[test]
    fn test_format_entry_unnamed_without_creator() {
        let mut e = entry();
        e.name = None;
        e.creator = None;
        let s = format_entry(&e);
        assert!(s.starts_with("■ (unnamed)"));
        assert!(!s.contains(" by "));
    }

    #[test]
    fn test_format_detail_includes_text() {
        let detail = IntegrationDetail {
            entry: entry(),
            text: Some("Long form".to_string()),
        };
        let s = format_detail(&detail);
        assert!(s.contains("image:       https://img/z.png"));
        assert!(s.ends_with("Long form"));
    }

    #[test]
    fn test_prompt_cancel_is_none() {
        let r: Result<Option<u8>, _> = prompt_result(Err(InquireError::OperationCanceled));
        assert!(matches!(r, Ok(None)));
    }
}
