use candlebin_core::{ArtifactHandle, CandlebinError, Capability, Symbol, artifact_name, resolve};

use crate::Candlebin;

impl Candlebin {
    /// Produce the artifact for (`symbol`, `minutes`) and return its handle.
    ///
    /// An artifact that already exists is returned as-is, without touching the
    /// catalog or the store. Otherwise the series is computed and written once,
    /// even under concurrent requests for the same artifact.
    ///
    /// # Errors
    /// - `InvalidArg` if no artifact store was configured.
    /// - Everything [`Candlebin::candles`] can return.
    /// - `Artifact` if the artifact cannot be written.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlebin::export",
            skip(self),
            fields(symbol = %symbol, minutes = minutes),
        )
    )]
    pub async fn export(
        &self,
        symbol: &Symbol,
        minutes: i64,
    ) -> Result<ArtifactHandle, CandlebinError> {
        let artifacts = self.artifacts.as_ref().ok_or_else(|| {
            CandlebinError::InvalidArg(
                "no artifact store registered; add one via with_artifacts(...)".to_string(),
            )
        })?;
        let spec = resolve(minutes)?;
        let name = artifact_name(symbol, minutes);

        self.with_request_deadline(Capability::Export, async {
            if let Some(existing) = artifacts.locate(&name).await? {
                #[cfg(feature = "tracing")]
                tracing::debug!(artifact = %existing.name, "reusing existing artifact");
                return Ok(existing);
            }

            let written = self
                .exports
                .get_or_try_compute(name.clone(), async {
                    // A flight that finished just before this one may have written it already.
                    if let Some(existing) = artifacts.locate(&name).await? {
                        return Ok(existing);
                    }
                    let series = self.series_for(symbol, spec).await?;
                    artifacts.write(&name, &series).await
                })
                .await;
            self.exports.invalidate(&name).await;
            written
        })
        .await
    }
}
