//! The generate command

use super::util::{go_package_path, has_flag, parse_flag, parse_interfaces, write_output};
use mocker::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn cmd_generate(args: &[String]) -> Result<()> {
    let src = parse_flag(args, &["--src", "--model"]).map(PathBuf::from).ok_or_else(|| {
        Error::from("Usage: mocker generate --src <file.go|model.yaml> [--dst <file>] [interfaces...]")
    })?;
    let dst = parse_flag(args, &["--dst", "-o"]).map(PathBuf::from);

    let config = resolve_config(args, &src, dst.as_deref())?;
    debug!(?config, "resolved config");
    if config.include.is_empty() {
        eprintln!("Warning: no interfaces selected; the output will hold no mocks");
    }

    let pkg = load_package(
        &src,
        &SourceOptions {
            package_path: config.source_module.clone(),
        },
    )?;
    info!(
        package = %pkg.name,
        interfaces = pkg.interfaces.len(),
        "loaded model"
    );

    // Nothing is written unless generation succeeds
    let output = generate(&pkg, &config)?;
    write_output(&dst, &output)
}

/// File config, then command-line overrides, then values derived from the
/// surrounding Go module.
fn resolve_config(args: &[String], src: &Path, dst: Option<&Path>) -> Result<Config> {
    let dst_dir = dst.map(parent_dir);

    let file_config = match parse_flag(args, &["--config"]) {
        Some(path) => Config::load(Path::new(&path))?,
        None => {
            let dir = dst_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            Config::load_from_dir(&dir)?.unwrap_or_default()
        }
    };

    let overrides = ConfigOverrides {
        package_name: parse_flag(args, &["--pkg"]),
        prefix: parse_flag(args, &["--prefix"]),
        suffix: parse_flag(args, &["--suffix"]),
        destination_module: parse_flag(args, &["--selfpkg"]),
        source_module: parse_flag(args, &["--srcpkg"]),
        include: parse_interfaces(args),
        source_path: Some(src.display().to_string()),
        formatter: has_flag(args, "--gofmt").then_some(FormatterKind::Gofmt),
        template_dir: parse_flag(args, &["--template-dir"]).map(PathBuf::from),
    };
    let mut config = file_config.merge(overrides);

    if config.destination_module.is_empty() {
        if let Some(module) = dst_dir.as_deref().and_then(go_package_path) {
            debug!(module = %module, "destination module from go.mod");
            config.destination_module = module;
        }
    }
    if config.source_module.is_none() && src.extension().is_some_and(|e| e == "go") {
        config.source_module = go_package_path(&parent_dir(src));
    }
    Ok(config)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const GREETER: &str = "package greet\n\ntype Greeter interface {\n\tHello(name string) string\n}\n";

    #[test]
    fn test_resolve_config_from_go_mod() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();
        let src = dir.path().join("greet").join("greeter.go");
        let dst = dir.path().join("greet").join("mocks").join("greeter.go");

        let config = resolve_config(&args(&["Greeter", "--prefix", "Mock"]), &src, Some(&dst))
            .unwrap();
        assert_eq!(config.destination_module, "example.com/app/greet/mocks");
        assert_eq!(config.source_module.as_deref(), Some("example.com/app/greet"));
        assert_eq!(config.include, vec!["Greeter".to_string()]);
        assert_eq!(config.prefix, "Mock");
    }

    #[test]
    fn test_selfpkg_wins_over_go_mod() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();
        let dst = dir.path().join("mock.go");
        let config = resolve_config(
            &args(&["--selfpkg", "example.com/other"]),
            Path::new("model.yaml"),
            Some(&dst),
        )
        .unwrap();
        assert_eq!(config.destination_module, "example.com/other");
        assert_eq!(config.source_module, None);
    }

    #[test]
    fn test_config_file_next_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "prefix: Fake\ninclude: [Greeter]\n",
        )
        .unwrap();
        let dst = dir.path().join("mock.go");
        let config = resolve_config(&[], Path::new("model.yaml"), Some(&dst)).unwrap();
        assert_eq!(config.prefix, "Fake");
        assert_eq!(config.include, vec!["Greeter".to_string()]);
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("greeter.go");
        fs::write(&src, GREETER).unwrap();
        let dst = dir.path().join("out").join("mock_greeter.go");

        cmd_generate(&args(&[
            "--src",
            src.to_str().unwrap(),
            "--dst",
            dst.to_str().unwrap(),
            "--prefix",
            "Mock",
            "Greeter",
        ]))
        .unwrap();

        let output = fs::read_to_string(&dst).unwrap();
        assert!(output.contains("type MockGreeter struct {"));
    }

    #[test]
    fn test_failed_generation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("broken.go");
        fs::write(&src, "package greet\n\ntype Greeter interface {\n").unwrap();
        let dst = dir.path().join("mock.go");

        let err = cmd_generate(&args(&[
            "--src",
            src.to_str().unwrap(),
            "--dst",
            dst.to_str().unwrap(),
            "Greeter",
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), FailureKind::ModelLoadFailed);
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_src_is_usage_error() {
        assert!(cmd_generate(&args(&["Greeter"])).is_err());
    }
}
