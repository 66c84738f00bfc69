use std::sync::Arc;

use ptb_core::{config::Config, store::PhraseStore};

#[tokio::main]
async fn main() -> Result<(), ptb_core::Error> {
    ptb_core::logging::init("ptb")?;

    // Missing credentials end the process here, before any network call.
    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("{e}");
            return Err(e);
        }
    };

    let (store, outcome) = PhraseStore::load(&cfg.phrases_file).await;
    tracing::debug!("phrase file load outcome: {outcome:?}");

    ptb_telegram::router::run_polling(cfg, Arc::new(store))
        .await
        .map_err(|e| ptb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
