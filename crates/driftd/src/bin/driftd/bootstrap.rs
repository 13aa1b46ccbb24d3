use std::path::{Path, PathBuf};

use drift_core::{Address, Engine, Store};
use driftd::{DaemonConfig, Error, Result, Sha256Hasher};

pub(crate) struct BootstrapContext {
    pub(crate) engine: Engine,
    pub(crate) own_address: Address,
}

pub(crate) fn bootstrap(
    store_path: &Path,
    identity_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<BootstrapContext> {
    let config = match config_path {
        Some(path) => DaemonConfig::from_path(path).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?,
        None => DaemonConfig::default(),
    };

    let store = Store::open(store_path)?;

    let identity_path: PathBuf = identity_path.map(PathBuf::from).unwrap_or_else(|| {
        let mut path = store_path.to_path_buf();
        path.set_extension("identity");
        path
    });
    let own_address = driftd::identity_store::load_or_create_own_address(&identity_path, &Sha256Hasher)
        .map_err(|source| Error::Identity {
            path: identity_path.clone(),
            source,
        })?;
    store.insert_address(&own_address)?;

    let strategy = config.strategy()?;
    let mut engine = Engine::new(store, Box::new(Sha256Hasher), strategy, own_address.hashed)?;
    engine.set_rssi_threshold(config.rssi_threshold);

    Ok(BootstrapContext { engine, own_address })
}
