use anyhow::{bail, Result};

/// Architecture name used in artifact and bundle file names.
pub fn arch_name(rust_arch: &str) -> Result<&'static str> {
    match rust_arch {
        "x86_64" => Ok("x64"),
        "aarch64" => Ok("arm64"),
        other => bail!("unsupported architecture: {other}"),
    }
}

/// Architecture of the running host.
pub fn current_arch() -> Result<&'static str> {
    arch_name(std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_architectures() {
        assert_eq!(arch_name("x86_64").unwrap(), "x64");
        assert_eq!(arch_name("aarch64").unwrap(), "arm64");
    }

    #[test]
    fn rejects_unknown_architectures() {
        let err = arch_name("sparc").unwrap_err();
        assert_eq!(err.to_string(), "unsupported architecture: sparc");
    }
}
