//! CLI utility helpers

use mocker::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Options that consume the following argument as their value
pub const VALUE_FLAGS: &[&str] = &[
    "--src",
    "--model",
    "--dst",
    "-o",
    "--pkg",
    "--prefix",
    "--suffix",
    "--selfpkg",
    "--srcpkg",
    "--config",
    "--template-dir",
    "--intf",
];

/// Value of the first matching `--flag value` pair
pub fn parse_flag(args: &[String], names: &[&str]) -> Option<String> {
    for (i, arg) in args.iter().enumerate() {
        if names.contains(&arg.as_str()) {
            if let Some(value) = args.get(i + 1) {
                return Some(value.clone());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values
pub fn positional(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip = true;
        } else if !arg.starts_with('-') {
            out.push(arg.clone());
        }
    }
    out
}

/// `A,B` and `A B` both name two interfaces
pub fn parse_interfaces(args: &[String]) -> Option<Vec<String>> {
    let mut names: Vec<String> = parse_flag(args, &["--intf"])
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    names.extend(positional(args));
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Write content to file (creating parent directories) or stdout
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(Error::Io)?;
            }
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Import path of the Go package living in `dir`, from the nearest `go.mod`
/// above it. `dir` does not have to exist yet.
pub fn go_package_path(dir: &Path) -> Option<String> {
    let abs = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(dir)
    };
    let abs = lexical_normalize(&abs);

    for root in abs.ancestors() {
        let go_mod = root.join("go.mod");
        if !go_mod.is_file() {
            continue;
        }
        let module = fs::read_to_string(&go_mod)
            .ok()
            .and_then(|content| module_directive(&content))?;
        let rel = abs.strip_prefix(root).ok()?;
        let mut path = module;
        for part in rel.components() {
            if let Component::Normal(seg) = part {
                path.push('/');
                path.push_str(&seg.to_string_lossy());
            }
        }
        return Some(path);
    }
    None
}

/// The `module` directive of a go.mod file.
pub fn module_directive(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flag_and_positional() {
        let a = args(&["--src", "greeter.go", "Greeter", "--prefix", "Mock", "Store"]);
        assert_eq!(parse_flag(&a, &["--src"]).as_deref(), Some("greeter.go"));
        assert_eq!(parse_flag(&a, &["--dst", "-o"]), None);
        assert_eq!(positional(&a), vec!["Greeter", "Store"]);
    }

    #[test]
    fn test_parse_interfaces() {
        let a = args(&["--intf", "A, B", "C"]);
        assert_eq!(
            parse_interfaces(&a),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
        assert_eq!(parse_interfaces(&args(&["--gofmt"])), None);
    }

    #[rstest]
    #[case("module example.com/app\n\ngo 1.22\n", Some("example.com/app"))]
    #[case("// comment\nmodule \"example.com/quoted\" // trailing\n", Some("example.com/quoted"))]
    #[case("go 1.22\n", None)]
    #[case("modules x\n", None)]
    fn test_module_directive(#[case] content: &str, #[case] expected: Option<&str>) {
        assert_eq!(module_directive(content).as_deref(), expected);
    }

    #[test]
    fn test_go_package_path_for_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();

        let dst = dir.path().join("internal").join("mocks");
        assert_eq!(
            go_package_path(&dst).as_deref(),
            Some("example.com/app/internal/mocks")
        );
        assert_eq!(go_package_path(dir.path()).as_deref(), Some("example.com/app"));
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("mock.go");
        write_output(&Some(target.clone()), "package b\n").unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), "package b\n");
    }
}
