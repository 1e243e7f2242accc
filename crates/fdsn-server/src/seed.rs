//! Startup seeding of configured data centres.

use fdsn_core::{model::NewSource, store::MetadataStore};

use crate::SourceSeed;

/// Insert every seed whose name and base URL are both unknown to `store`.
///
/// A seed that fails to insert is logged and skipped. Returns the number of
/// sources created.
pub async fn seed_sources<S>(store: &S, seeds: &[SourceSeed]) -> Result<usize, S::Error>
where
  S: MetadataStore,
{
  let existing = store.list_sources().await?;
  let mut created = 0;

  for seed in seeds {
    let known = existing
      .iter()
      .any(|s| s.source.name == seed.name || s.source.base_url == seed.base_url);
    if known {
      tracing::debug!(name = %seed.name, "source already present");
      continue;
    }

    let input = NewSource {
      name:        seed.name.clone(),
      base_url:    seed.base_url.trim_end_matches('/').to_string(),
      description: seed.description.clone(),
      enabled:     true,
    };
    match store.create_source(input).await {
      Ok(source) => {
        tracing::info!(name = %source.name, url = %source.base_url, "seeded source from config");
        created += 1;
      }
      Err(e) => tracing::warn!(name = %seed.name, error = %e, "failed to seed source"),
    }
  }

  Ok(created)
}
