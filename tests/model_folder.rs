use camino::Utf8PathBuf;
use modelview::{FsSource, ModelReader, ReaderOptions};
use std::fs;
use tempfile::tempdir;

fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
}

#[test]
fn only_visible_regular_files_are_listed() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("view.xml"), r#"<X id="1"/>"#).unwrap();
    fs::write(tmp.path().join(".hidden.xml"), r#"<X id="1"/>"#).unwrap();
    fs::create_dir_all(tmp.path().join("nested")).unwrap();
    fs::write(tmp.path().join("nested").join("inner.xml"), r#"<X id="1"/>"#).unwrap();

    let reader = ModelReader::new(utf8(tmp.path()), FsSource).unwrap();
    assert_eq!(reader.list_files(), vec!["view.xml"]);
}

#[cfg(unix)]
#[test]
fn symlinks_are_listed_by_their_target() {
    use std::os::unix::fs::symlink;

    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("real.xml"), r#"<X id="1" entityName="Real"/>"#).unwrap();
    symlink(tmp.path().join("real.xml"), tmp.path().join("link.xml")).unwrap();
    fs::create_dir_all(tmp.path().join("dir")).unwrap();
    symlink(tmp.path().join("dir"), tmp.path().join("dir_link")).unwrap();
    symlink(tmp.path().join("absent.xml"), tmp.path().join("dangling.xml")).unwrap();

    let mut reader = ModelReader::new(utf8(tmp.path()), FsSource).unwrap();
    assert_eq!(reader.list_files(), vec!["link.xml", "real.xml"]);
    let tree = reader.read_file("link.xml").unwrap().unwrap();
    assert_eq!(tree.entity(tree.root()).unwrap().name(), Some("Real"));
}

#[test]
fn listing_is_a_snapshot() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.xml"), r#"<X id="1"/>"#).unwrap();
    let mut reader = ModelReader::new(utf8(tmp.path()), FsSource).unwrap();
    fs::write(tmp.path().join("b.xml"), r#"<X id="1"/>"#).unwrap();

    assert_eq!(reader.list_files(), vec!["a.xml"]);
    assert!(reader.read_file("b.xml").is_err());
}

#[test]
fn missing_folder_fails_to_index() {
    let tmp = tempdir().unwrap();
    assert!(ModelReader::new(utf8(&tmp.path().join("absent")), FsSource).is_err());
}

#[test]
fn unreadable_file_is_cached_as_empty() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("gone.xml"), r#"<X id="1"/>"#).unwrap();
    let mut reader = ModelReader::new(utf8(tmp.path()), FsSource).unwrap();
    fs::remove_file(tmp.path().join("gone.xml")).unwrap();

    assert!(reader.read_file("gone.xml").unwrap().is_none());
    fs::write(tmp.path().join("gone.xml"), r#"<X id="1"/>"#).unwrap();
    assert!(reader.read_file("gone.xml").unwrap().is_none());
}

#[test]
fn parsing_is_deterministic_across_readers() {
    let tmp = tempdir().unwrap();
    fs::write(
        tmp.path().join("default.system"),
        r#"<system xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" id="sys" entityName="System">
  <assemblyContexts__ComposedStructure id="ctx2" entityName="Second">
    <encapsulatedComponent__AssemblyContext xsi:type="repository:BasicComponent" href="default.repository#c1"/>
  </assemblyContexts__ComposedStructure>
  <assemblyContexts__ComposedStructure id="ctx1" entityName="First"/>
  <connectors__ComposedStructure xsi:type="composition:AssemblyConnector" id="con"/>
</system>"#,
    )
    .unwrap();
    fs::write(
        tmp.path().join("default.repository"),
        r#"<repository id="repo" entityName="Repo"><components__Repository id="c1" entityName="Store"/></repository>"#,
    )
    .unwrap();

    let read = || {
        let mut reader = ModelReader::new(utf8(tmp.path()), FsSource).unwrap();
        reader.read_file("default.system").unwrap().unwrap()
    };
    let first = read();
    let second = read();
    assert_eq!(*first, *second);

    let ids: Vec<_> = first
        .children(first.root())
        .iter()
        .map(|&c| first.entity(c).unwrap().id())
        .collect();
    assert_eq!(ids, vec![Some("con"), Some("ctx1"), Some("ctx2")]);

    let ctx2 = first.find_by_id("ctx2").unwrap();
    let encapsulated = first.children(ctx2)[0];
    assert_eq!(
        first.entity(encapsulated).unwrap().name(),
        Some("default.repository→Store")
    );
}

#[test]
fn options_load_from_json() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("options.json");
    fs::write(&path, r#"{"hiddenPrefix": "_", "unnamedReferencePrefix": "Refs: "}"#).unwrap();
    let options = ReaderOptions::from_json_file(utf8(&path)).unwrap();
    assert_eq!(options.hidden_prefix, "_");
    assert_eq!(options.unnamed_reference_prefix.as_deref(), Some("Refs: "));

    fs::write(&path, "not json").unwrap();
    assert!(ReaderOptions::from_json_file(utf8(&path)).is_err());
}
