//! Phase 5: future-clause lineage annotation.
//!
//! Pure fan-out over earlier keys; no randomness.

use aleth_types::{ArtifactKey, LineageRecord, unix_timestamp};
use tracing::info;

use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::config::LineageConfig;

/// Emit one lineage record per source key, keyed `<source>-future`.
///
/// Returns the new keys in input order.
///
/// # Errors
///
/// Returns the first [`ArtifactError`] raised by the writer.
pub fn run_lineage_phase(
    sources: &[ArtifactKey],
    config: &LineageConfig,
    writer: &mut impl ArtifactWriter,
) -> Result<Vec<ArtifactKey>, ArtifactError> {
    let mut artifacts = Vec::with_capacity(sources.len());

    for source in sources {
        let key = source.future();
        let record = LineageRecord {
            artifact_id: source.as_str().to_owned(),
            clause: config.clause.clone(),
            timestamp: unix_timestamp(),
        };
        writer.emit(&key, &record)?;
        info!(phase = 5, artifact = %key, source = %source, "Future clause injected");
        artifacts.push(key);
    }

    Ok(artifacts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::artifact::MemoryWriter;

    #[test]
    fn one_record_per_source_in_order() {
        let sources = vec![
            ArtifactKey::new("ZPE-Speculative-SpecNode-1"),
            ArtifactKey::new("ZPE-Grid-SpecNode-1"),
            ArtifactKey::new("anything at all"),
        ];
        let config = LineageConfig::default();
        let mut writer = MemoryWriter::new();

        let keys = run_lineage_phase(&sources, &config, &mut writer).unwrap();

        assert_eq!(keys.len(), sources.len());
        for (source, key) in sources.iter().zip(&keys) {
            assert_eq!(key.as_str(), format!("{source}-future"));
            let record: LineageRecord =
                serde_json::from_value(writer.get(key).unwrap().clone()).unwrap();
            assert_eq!(record.artifact_id, source.as_str());
            assert_eq!(record.clause, "Future ZPE scaling / sovereign deployment");
        }
    }

    #[test]
    fn no_sources_no_records() {
        let mut writer = MemoryWriter::new();
        let keys = run_lineage_phase(&[], &LineageConfig::default(), &mut writer).unwrap();
        assert!(keys.is_empty());
        assert!(writer.is_empty());
    }
}
