//! Create a new post or draft

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use crate::content::SourceGroup;
use crate::Folio;

/// Create a new post (or draft) from the default scaffold.
///
/// The file is named after the slugified title, so its slug matches.
pub fn create_post(folio: &Folio, title: &str, draft: bool) -> Result<PathBuf> {
    let group = if draft {
        SourceGroup::Drafts
    } else {
        SourceGroup::Posts
    };
    let target_dir = folio
        .source_dir(group)
        .with_context(|| format!("No source directory configured for {}", group))?;

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable file name", title);
    }
    let file_path = target_dir.join(format!("{}.mdx", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(&target_dir)?;

    // Zone-less front-matter dates are read back as UTC
    let now = Utc::now();
    let content = format!(
        "---\ntitle: {}\ndate: {}\n---\n",
        yaml_string(title),
        now.format("%Y-%m-%d %H:%M:%S")
    );
    fs::write(&file_path, content)?;

    tracing::debug!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Quote a scalar so titles with `:` or `#` survive YAML parsing
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::FrontMatter;

    #[test]
    fn test_create_post_and_draft() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());

        let post = create_post(&folio, "Hello: \"World\"", false).unwrap();
        assert_eq!(post, dir.path().join("src/posts/hello-world.mdx"));

        let content = fs::read_to_string(&post).unwrap();
        let (fm, _) = FrontMatter::parse(&content).unwrap();
        let meta = fm.into_metadata().unwrap();
        assert_eq!(meta.title, "Hello: \"World\"");

        let age = Utc::now() - meta.date;
        assert!(age.num_seconds().abs() < 60, "scaffold date is off by {}", age);

        let draft = create_post(&folio, "Half baked", true).unwrap();
        assert_eq!(draft, dir.path().join("src/drafts/half-baked.mdx"));
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());

        create_post(&folio, "Twice", false).unwrap();
        assert!(create_post(&folio, "Twice", false).is_err());
    }
}
