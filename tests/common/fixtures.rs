//! Fake external tools and episode files

use liftcup::ToolsConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Banner printed by the fake rar when run without arguments
pub const RAR_BANNER: &str = "RAR 5.61   Copyright (c) 1993-2018 Alexander Roshal   1 Oct 2018";

/// Shell-script stand-ins for rar, par2 and the uploader
///
/// Every invocation appends `<tool> <args...>` to a shared log. The scripts
/// check that the files they are given exist, relative to their working
/// directory, and write the outputs the real tools would.
pub struct FakeTools {
    dir: TempDir,
    pub log: PathBuf,
    pub rar: PathBuf,
    pub par2: PathBuf,
    pub uploader: PathBuf,
    pub failing_uploader: PathBuf,
}

impl FakeTools {
    pub fn install() -> Self {
        let dir = tempfile::tempdir().expect("tools dir");
        let log = dir.path().join("invocations.log");
        let log_str = log.display();

        let rar = dir.path().join("rar");
        write_script(
            &rar,
            &format!(
                r#"if [ $# -eq 0 ]; then echo "{RAR_BANNER}"; exit 0; fi
echo "rar $*" >> "{log_str}"
base="$2"
shift 2
for f in "$@"; do
  case "$f" in -*) ;; *) [ -f "$f" ] || {{ echo "missing $f"; exit 3; }} ;; esac
done
printf volume1 > "$base.part1.rar"
printf volume2 > "$base.part2.rar"
"#
            ),
        );

        let par2 = dir.path().join("par2");
        write_script(
            &par2,
            &format!(
                r#"echo "par2 $*" >> "{log_str}"
base="$4"
shift 4
for f in "$@"; do [ -f "$f" ] || {{ echo "missing $f"; exit 3; }}; done
printf par2 > "$base.par2"
printf par2 > "$base.vol000+01.par2"
"#
            ),
        );

        let uploader = dir.path().join("mangler.py");
        write_script(&uploader, &format!(r#"echo "upload $*" >> "{log_str}""#));

        let failing_uploader = dir.path().join("broken-mangler.py");
        write_script(
            &failing_uploader,
            &format!(
                r#"echo "upload $*" >> "{log_str}"
echo "NNTP connection refused" >&2
exit 1"#
            ),
        );

        Self {
            dir,
            log,
            rar,
            par2,
            uploader,
            failing_uploader,
        }
    }

    /// Tool settings pointing at the fake rar and par2, no PATH search
    pub fn config(&self) -> ToolsConfig {
        ToolsConfig {
            tools_root: self.dir.path().join("bundled"),
            rar_path: Some(self.rar.clone()),
            par2_path: Some(self.par2.clone()),
            search_path: false,
        }
    }

    /// Logged invocations, one per line
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// Create `<dir>/<name>` with `size` bytes of content
pub fn write_episode(dir: &Path, name: &str, size: usize) -> PathBuf {
    std::fs::create_dir_all(dir).expect("episode dir");
    let path = dir.join(name);
    std::fs::write(&path, vec![0x47u8; size]).expect("episode file");
    path
}
