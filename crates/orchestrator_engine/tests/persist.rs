use std::fs;

use orchestrator_engine::{form_filename, DownloadedForm, FormStore, PersistError};
use tempfile::TempDir;

fn leave_form(bytes: &[u8]) -> DownloadedForm {
    let url = "/download/leave_request_form";
    DownloadedForm {
        url: url.to_string(),
        file_name: form_filename(url, Some("application/pdf; charset=binary")),
        bytes: bytes.to_vec(),
    }
}

#[test]
fn leave_form_is_saved_under_its_derived_name() {
    let temp = TempDir::new().unwrap();
    let downloads = temp.path().join("downloads");
    let store = FormStore::new(downloads.clone());

    let saved = store.save(&leave_form(b"%PDF-1.7")).unwrap();
    assert_eq!(saved, downloads.join("leave_request_form.pdf"));
    assert_eq!(fs::read(&saved).unwrap(), b"%PDF-1.7");
}

#[test]
fn downloading_again_replaces_the_earlier_copy() {
    let temp = TempDir::new().unwrap();
    let store = FormStore::new(temp.path().to_path_buf());

    let first = store.save(&leave_form(b"v1")).unwrap();
    let second = store.save(&leave_form(b"v2")).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"v2");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn names_that_leave_the_download_dir_are_refused() {
    let temp = TempDir::new().unwrap();
    let downloads = temp.path().join("downloads");
    let store = FormStore::new(downloads.clone());

    let mut form = leave_form(b"x");
    form.file_name = "../escape.pdf".to_string();
    assert!(matches!(store.save(&form), Err(PersistError::UnsafeName(_))));
    assert!(!temp.path().join("escape.pdf").exists());
    assert!(!downloads.exists());
}

#[test]
fn download_dir_that_is_a_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("downloads");
    fs::write(&blocker, "not a directory").unwrap();

    let result = FormStore::new(blocker.clone()).save(&leave_form(b"x"));
    assert!(matches!(result, Err(PersistError::DownloadDir(_))));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
}
