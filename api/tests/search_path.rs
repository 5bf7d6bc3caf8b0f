//! Search-path resolution, enumeration, and lifecycle behavior.

mod common;

use std::io::Read as _;

use common::{make_archive, utf8, write_native, Session};
use packfs::ErrorKind;

fn read_to_string(file: &mut packfs::File) -> String {
    let mut contents = String::new();
    file.read_to_string(&mut contents).expect("read");
    contents
}

#[test]
fn first_root_shadows_later_roots() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write_native(&a, "x.txt", b"A");
    write_native(&b, "x.txt", b"B");

    packfs::add_to_search_path(utf8(&a), true).expect("add first root");
    packfs::add_to_search_path(utf8(&b), true).expect("add second root");
    assert_eq!(
        packfs::search_path().expect("search path"),
        [utf8(&a), utf8(&b)]
    );

    let mut file = packfs::open_read("x.txt").expect("open");
    assert_eq!(read_to_string(&mut file), "A");
    assert_eq!(packfs::real_dir("x.txt").expect("real dir"), utf8(&a));
    file.close().expect("close");

    packfs::remove_from_search_path(utf8(&a)).expect("remove first root");
    let mut file = packfs::open_read("x.txt").expect("open after removal");
    assert_eq!(read_to_string(&mut file), "B");
    file.close().expect("close");
    drop(session);
}

#[test]
fn prepended_roots_win() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write_native(&a, "x.txt", b"A");
    write_native(&b, "x.txt", b"B");

    packfs::add_to_search_path(utf8(&a), true).expect("append");
    packfs::add_to_search_path(utf8(&b), false).expect("prepend");
    assert_eq!(packfs::real_dir("x.txt").expect("real dir"), utf8(&b));
    drop(session);
}

#[test]
fn matching_directories_interpolate_across_roots() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    for name in ["x", "y", "z"] {
        write_native(&a.join("saves"), name, b"");
    }
    for name in ["w", "y"] {
        write_native(&b.join("saves"), name, b"");
    }

    packfs::add_to_search_path(utf8(&a), true).expect("add first root");
    packfs::add_to_search_path(utf8(&b), true).expect("add second root");

    let names = packfs::enumerate_files("saves").expect("enumerate");
    assert_eq!(names, ["x", "y", "z", "w"]);
    drop(session);
}

#[test]
fn missing_files_and_bad_paths_fail_cleanly() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    packfs::add_to_search_path(utf8(tmp.path()), true).expect("add root");

    let err = packfs::open_read("absent.txt").expect_err("missing file");
    assert_eq!(err.kind(), ErrorKind::NoSuchFile);

    let err = packfs::open_read("../etc/passwd").expect_err("escaping path");
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
    assert_eq!(packfs::last_error().as_deref(), Some("invalid path"));

    let err = packfs::real_dir("nowhere").expect_err("unresolved");
    assert_eq!(err.kind(), ErrorKind::NoSuchPath);

    assert!(!packfs::exists("absent.txt").expect("exists"));
    drop(session);
}

#[cfg(unix)]
#[test]
fn symlink_visibility_follows_the_toggle() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let root = tmp.path().join("a");
    write_native(&root, "real", b"linked payload");
    std::os::unix::fs::symlink(root.join("real"), root.join("link")).expect("symlink");

    packfs::add_to_search_path(utf8(&root), true).expect("add root");

    assert!(!packfs::exists("link").expect("exists"));
    assert_eq!(packfs::enumerate_files("").expect("enumerate"), ["real"]);
    assert_eq!(
        packfs::open_read("link").expect_err("hidden").kind(),
        ErrorKind::NoSuchFile
    );

    packfs::permit_symbolic_links(true).expect("permit");
    assert!(packfs::exists("link").expect("exists"));
    assert!(packfs::is_symbolic_link("link").expect("is link"));
    assert!(!packfs::is_symbolic_link("real").expect("is link"));
    let mut file = packfs::open_read("link").expect("open via link");
    assert_eq!(read_to_string(&mut file), "linked payload");
    drop(file);
    drop(session);
}

#[test]
fn archives_resolve_like_directories() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let archive = tmp.path().join("a.zip");
    make_archive(
        &archive,
        &[
            ("inside/file.txt", b"zipped contents".as_slice()),
            ("inside/other.txt", b"more".as_slice()),
        ],
    );

    packfs::add_to_search_path(utf8(&archive), true).expect("add archive");

    let mut file = packfs::open_read("inside/file.txt").expect("open entry");
    assert_eq!(read_to_string(&mut file), "zipped contents");
    assert!(packfs::is_directory("inside").expect("is directory"));
    assert_eq!(
        packfs::real_dir("inside/file.txt").expect("real dir"),
        utf8(&archive)
    );
    assert_eq!(
        packfs::enumerate_files("inside").expect("enumerate"),
        ["file.txt", "other.txt"]
    );
    drop(file);
    drop(session);
}

#[test]
fn archives_and_directories_interpolate_together() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let dir = tmp.path().join("loose");
    write_native(&dir.join("maps"), "patch.map", b"patched");
    let archive = tmp.path().join("base.zip");
    make_archive(
        &archive,
        &[
            ("maps/base.map", b"base".as_slice()),
            ("maps/patch.map", b"stale".as_slice()),
        ],
    );

    packfs::add_to_search_path(utf8(&dir), true).expect("add dir");
    packfs::add_to_search_path(utf8(&archive), true).expect("add archive");

    let names = packfs::enumerate_files("maps").expect("enumerate");
    assert_eq!(names, ["patch.map", "base.map"]);
    let mut file = packfs::open_read("maps/patch.map").expect("open");
    assert_eq!(read_to_string(&mut file), "patched");
    drop(file);
    drop(session);
}

#[test]
fn unsupported_roots_are_rejected() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    write_native(tmp.path(), "plain.txt", b"not an archive");

    let err = packfs::add_to_search_path(utf8(&tmp.path().join("plain.txt")), true)
        .expect_err("plain file");
    assert_eq!(err.kind(), ErrorKind::UnsupportedArchive);

    let err = packfs::add_to_search_path(utf8(&tmp.path().join("missing")), true)
        .expect_err("missing root");
    assert_eq!(err.kind(), ErrorKind::NoSuchPath);

    let err = packfs::remove_from_search_path("/never/added").expect_err("unknown root");
    assert_eq!(err.kind(), ErrorKind::NotInSearchPath);
    drop(session);
}

#[test]
fn roots_with_open_files_cannot_be_removed() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    write_native(tmp.path(), "x.txt", b"X");
    packfs::add_to_search_path(utf8(tmp.path()), true).expect("add root");

    let file = packfs::open_read("x.txt").expect("open");
    let err = packfs::remove_from_search_path(utf8(tmp.path())).expect_err("busy root");
    assert_eq!(err.kind(), ErrorKind::FilesStillOpen);

    file.close().expect("close");
    packfs::remove_from_search_path(utf8(tmp.path())).expect("idle removal");
    drop(session);
}

#[test]
fn lifecycle_guards_reinit_and_open_handles() {
    let session = Session::new();
    let tmp = tempfile::TempDir::new().expect("tempdir");
    write_native(tmp.path(), "x.txt", b"X");

    assert_eq!(
        packfs::init("").expect_err("empty argv0").kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        packfs::init("/opt/app/bin/app").expect_err("double init").kind(),
        ErrorKind::IsInitialized
    );

    packfs::add_to_search_path(utf8(tmp.path()), true).expect("add root");
    let file = packfs::open_read("x.txt").expect("open");
    assert_eq!(
        packfs::deinit().expect_err("handle open").kind(),
        ErrorKind::FilesStillOpen
    );
    drop(file);

    packfs::deinit().expect("deinit");
    assert_eq!(
        packfs::open_read("x.txt").expect_err("torn down").kind(),
        ErrorKind::NotInitialized
    );
    assert_eq!(
        packfs::deinit().expect_err("double deinit").kind(),
        ErrorKind::NotInitialized
    );
    drop(session);
}

#[test]
fn last_error_reads_once() {
    let session = Session::new();
    assert_eq!(packfs::last_error(), None);

    let err = packfs::open_read("nope").expect_err("no roots");
    assert_eq!(err.kind(), ErrorKind::NoSuchFile);
    assert_eq!(packfs::last_error().as_deref(), Some("no such file"));
    assert_eq!(packfs::last_error(), None);

    packfs::search_path().expect("search path");
    assert_eq!(packfs::last_error(), None);
    drop(session);
}

#[test]
fn errors_stay_on_their_thread() {
    let session = Session::new();
    let _ = packfs::open_read("missing");

    std::thread::spawn(|| {
        assert_eq!(packfs::last_error(), None);
    })
    .join()
    .expect("worker thread");

    assert_eq!(packfs::last_error().as_deref(), Some("no such file"));
    drop(session);
}

#[test]
fn version_matches_the_crate() {
    let version = packfs::version();
    assert_eq!((version.major, version.minor, version.patch), (0, 1, 0));
}

#[test]
fn zip_backend_is_advertised() {
    let session = Session::new();
    let types = packfs::supported_archive_types().expect("archive types");
    assert!(types.iter().any(|info| info.extension == "ZIP"));
    drop(session);
}

#[test]
fn base_dir_comes_from_argv0() {
    let session = Session::new();
    assert_eq!(packfs::base_dir().expect("base dir"), "/opt/app/bin");
    assert!(!packfs::user_dir().expect("user dir").is_empty());
    drop(session);
}
