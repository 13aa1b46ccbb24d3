use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use rand_core::{OsRng, RngCore};

use drift_core::{Address, Hasher};

/// Load the persisted own address value from `path`, or generate and
/// persist a fresh one. Mirrors the daemon convention of keeping the
/// private material in a dedicated file next to the store rather than
/// inside the database itself.
pub fn load_or_create_own_address(path: &Path, hasher: &dyn Hasher) -> io::Result<Address> {
    match fs::read(path) {
        Ok(bytes) => {
            let value: [u8; 32] = bytes.try_into().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "identity file is not 32 bytes")
            })?;
            Ok(Address::from_value(hasher, value, true, None))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut value = [0u8; 32];
            OsRng.fill_bytes(&mut value);
            write_identity_file(path, &value)?;
            Ok(Address::from_value(hasher, value, true, None))
        }
        Err(err) => Err(err),
    }
}

fn write_identity_file(path: &Path, value: &[u8; 32]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = path.with_extension(format!("tmp-{unique}"));

    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value)?;
        file.sync_all()?;
    }

    #[cfg(windows)]
    if path.exists() {
        let _ = fs::remove_file(path);
    }

    fs::rename(&tmp_path, path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
