//! Files laid out the way gfortran writes them with `form='unformatted'`

use std::path::PathBuf;

use fortbin_engine::{ElementKind, ErrorKind, FortranBinaryFile, FortranError, Values};
use tempfile::{tempdir, TempDir};

/// Frame `data` with native-endian 4-byte markers
fn frame(data: &[u8]) -> Vec<u8> {
    let marker = (data.len() as u32).to_ne_bytes();
    let mut out = marker.to_vec();
    out.extend_from_slice(data);
    out.extend_from_slice(&marker);
    out
}

fn f64s(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn write_fixture(dir: &TempDir, name: &str, records: &[Vec<u8>]) -> PathBuf {
    let path = dir.path().join(name);
    let bytes: Vec<u8> = records.iter().flat_map(|r| frame(r)).collect();
    std::fs::write(&path, bytes).unwrap();
    path
}

/// ```fortran
/// integer, parameter :: n = 3
/// double precision x(n)
/// x = (/ 1.0D0, 2.0D0, 3.0D0 /)
/// write(1) n
/// write(1) x
/// ```
fn fort1(dir: &TempDir) -> PathBuf {
    write_fixture(
        dir,
        "fort.1",
        &[3i32.to_ne_bytes().to_vec(), f64s(&[1.0, 2.0, 3.0])],
    )
}

/// ```fortran
/// character*5 lab
/// integer n
/// lab = 'LABEL'
/// n = 0
/// write(1) n
/// write(1) lab
/// ```
fn fort2(dir: &TempDir) -> PathBuf {
    write_fixture(dir, "fort.2", &[0i32.to_ne_bytes().to_vec(), b"LABEL".to_vec()])
}

/// ```fortran
/// integer*8, parameter :: nx = 3, ny = 3
/// double precision x(nx), y(ny)
/// write(3) nx, ny
/// write(3) x
/// write(3) y
/// ```
fn fort3(dir: &TempDir) -> PathBuf {
    let mut header = 3i64.to_ne_bytes().to_vec();
    header.extend_from_slice(&3i64.to_ne_bytes());
    write_fixture(
        dir,
        "fort.3",
        &[header, f64s(&[1.0, 2.0, 3.0]), f64s(&[5.0, 6.0, 7.0])],
    )
}

/// ```fortran
/// character*3 x
/// x = 'ABC'
/// write(4) x
/// ```
fn fort4(dir: &TempDir) -> PathBuf {
    write_fixture(dir, "fort.4", &[b"ABC".to_vec()])
}

#[test]
fn read_int_then_floats() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort1(&dir)).unwrap();

    fb.advance().unwrap();
    let n = fb.read_buf::<i32>(1).unwrap()[0];
    assert_eq!(n, 3);

    fb.advance().unwrap();
    let x = fb.read_buf::<f64>(n as usize).unwrap();
    assert_eq!(x, vec![1.0, 2.0, 3.0]);
    fb.close().unwrap();
}

#[test]
fn read_int_then_floats_scoped() {
    let dir = tempdir().unwrap();
    let x = FortranBinaryFile::with_open(fort1(&dir), |fb| {
        let n = fb.advance()?.ok_or(FortranError::NoCurrentRecord)?.read::<i32>(1)?[0];
        fb.advance()?
            .ok_or(FortranError::NoCurrentRecord)?
            .read::<f64>(n as usize)
    })
    .unwrap();
    assert_eq!(x, vec![1.0, 2.0, 3.0]);
}

#[test]
fn last_record_as_float_array() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort1(&dir)).unwrap();

    let mut last = None;
    for record in &mut fb {
        last = Some(record.unwrap());
    }
    assert_eq!(last.unwrap().to_float_array().unwrap(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn find_label() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort2(&dir)).unwrap();
    let record = fb.find(b"LABEL").unwrap().unwrap();
    assert_eq!(record.data(), b"LABEL");
    assert_eq!(record.as_str(), Some("LABEL"));
}

#[test]
fn find_missing_label() {
    let dir = tempdir().unwrap();
    let path = fort2(&dir);
    let found = FortranBinaryFile::with_open(&path, |fb| fb.find(b"NOLABEL")).unwrap();
    assert!(found.is_none());

    let mut fb = FortranBinaryFile::open(&path).unwrap();
    assert!(fb.find("NOLABEL").unwrap().is_none());
    assert!(fb.is_at_end());
    assert!(fb.advance().unwrap().is_none());
}

#[test]
fn int64_header() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort3(&dir)).unwrap();
    let mut header = fb.advance().unwrap().unwrap();
    assert_eq!(header.decode(ElementKind::Int64, 2).unwrap(), Values::Int64(vec![3, 3]));
}

#[test]
fn read_vectors_while_iterating() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort3(&dir)).unwrap();
    fb.advance().unwrap();

    let mut x = Vec::new();
    while fb.advance().unwrap().is_some() {
        x.extend(fb.read_buf::<f64>(3).unwrap());
    }
    assert_eq!(x, vec![1.0, 2.0, 3.0, 5.0, 6.0, 7.0]);
}

#[test]
fn iterate_counts_records() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort3(&dir)).unwrap();
    assert_eq!(fb.records().count(), 3);
    assert!(fb.advance().unwrap().is_none());
    assert_eq!(fb.records().count(), 0);
}

#[test]
fn find_text_and_contains() {
    let dir = tempdir().unwrap();
    let path = fort4(&dir);

    let mut fb = FortranBinaryFile::open(&path).unwrap();
    let record = fb.find("ABC").unwrap().unwrap();
    assert!(record.contains(b"ABC"));

    let mut fb = FortranBinaryFile::open(&path).unwrap();
    let record = fb.find(b"ABC").unwrap().unwrap();
    assert!(record.contains("ABC"));
}

#[test]
fn length_is_bytes_not_elements() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort4(&dir)).unwrap();
    let record = fb.advance().unwrap().unwrap();
    assert_eq!(record.len(), 3);
}

#[test]
fn record_byte_lengths() {
    let dir = tempdir().unwrap();
    let path = fort3(&dir);

    let mut fb = FortranBinaryFile::open(&path).unwrap();
    assert_eq!(fb.record_byte_lengths().unwrap(), vec![16, 24, 24]);
    fb.close().unwrap();

    let lengths = FortranBinaryFile::with_open(&path, |fb| fb.record_byte_lengths()).unwrap();
    assert_eq!(lengths, vec![16, 24, 24]);
}

#[test]
fn open_missing_file_fails() {
    let dir = tempdir().unwrap();
    let err = FortranBinaryFile::open(dir.path().join("nofile")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OpenFailure);
    assert!(matches!(err, FortranError::Open { ref path, .. } if path.ends_with("nofile")));
}

#[test]
fn create_does_not_need_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("newfile");
    assert!(!path.exists());

    let fb = FortranBinaryFile::create(&path).unwrap();
    assert!(path.exists());
    drop(fb);
}

#[test]
fn scoped_error_still_closes() {
    let dir = tempdir().unwrap();
    let mut fb = FortranBinaryFile::open(fort4(&dir)).unwrap();

    let result = fb.scoped(|fb| {
        let mut record = fb.advance()?.ok_or(FortranError::NoCurrentRecord)?;
        record.read::<i64>(1)
    });
    assert_eq!(result.unwrap_err().kind(), ErrorKind::OutOfRange);
    assert!(fb.is_closed());
    assert_eq!(fb.advance().unwrap_err().kind(), ErrorKind::Closed);
}
