//! Crate-level integration and BDD tests.

use std::fs;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use crate::environment::AppEnvironment;
use crate::manifest::Manifest;
use crate::source::RcFileSource;


#[test]
fn rc_file_on_disk_parses_into_manifest() {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp dir");
    fs::write(
        root.join("hearthrc.toml"),
        concat!(
            "preloads = [\"start/routes\"]\n",
            "\n",
            "[[providers]]\n",
            "file = \"providers/app\"\n",
            "environment = [\"web\"]\n",
            "\n",
            "[tests]\n",
            "timeout = 5000\n",
        ),
    )
    .expect("write rc file");

    let raw = RcFileSource::new(root).read().expect("read rc file");
    let manifest = Manifest::parse(&raw).expect("parse manifest");

    assert_eq!(manifest.preloads().len(), 1);
    assert_eq!(manifest.tests().timeout(), 5000);
    let provider = manifest.providers().first().expect("one provider");
    assert!(provider.is_active_in(AppEnvironment::Web));
    assert!(!provider.is_active_in(AppEnvironment::Console));
}
