//! Kernel parameter control via `sysctl`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Result, SystemError};

/// Write a kernel parameter (`sysctl -w key=value`).
///
/// The underlying write is idempotent, so callers overwrite without
/// reading the current value first.
///
/// # Errors
///
/// * `Spawn` - the `sysctl` binary could not be executed
/// * `CommandFailed` - the kernel rejected the write (unknown key,
///   insufficient privileges)
pub fn set_parameter(key: &str, value: i64) -> Result<()> {
    debug!("sysctl -w {}={}", key, value);

    let output = Command::new("sysctl")
        .args(["-w", &format!("{key}={value}")])
        .stdout(Stdio::null())
        .output()
        .map_err(|e| SystemError::Spawn("sysctl", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SystemError::CommandFailed(
            "sysctl",
            stderr.trim().to_string(),
        ));
    }

    Ok(())
}

/// Read a kernel parameter back through `/proc/sys`.
///
/// # Errors
///
/// * `Io` - the parameter file does not exist or cannot be read
/// * `Parse` - the file content is not an integer
pub fn read_parameter(key: &str) -> Result<i64> {
    let path = proc_path(key);
    let raw = std::fs::read_to_string(&path)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|e| SystemError::Parse(format!("{}: {}", path.display(), e)))
}

fn proc_path(key: &str) -> PathBuf {
    Path::new("/proc/sys").join(key.replace('.', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_keys_map_to_proc_paths() {
        assert_eq!(
            proc_path("net.ipv4.conf.eth0.arp_ignore"),
            Path::new("/proc/sys/net/ipv4/conf/eth0/arp_ignore")
        );
    }

    #[test]
    fn missing_parameter_is_an_io_error() {
        let err = read_parameter("net.ipv4.no.such.parameter").unwrap_err();
        assert!(matches!(err, SystemError::Io(_)));
    }
}
